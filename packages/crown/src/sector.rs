use crate::{traits::EntropySource, CID_LEN, CSD_LEN, SECTOR_SIZE, SSR_LEN};

/// Marker the Xros Loader searches for, stored XOR-masked with the CID.
pub const CROWN_MAGIC: [u8; 16] = *b"BGSASTNHOD01A02I";

/// Window written into the sector: 16 masked magic bytes plus 3 checksum
/// and identity bytes.
pub const CROWN_WINDOW_LEN: usize = 0x13;

/// In-place byte-order reversal. Register data arrives MSB-first off the
/// bus; the loader expects it LSB-first. Reversal is its own inverse.
pub fn reverse_in_place(buf: &mut [u8]) {
    if buf.is_empty() {
        return;
    }
    let mut lo = 0;
    let mut hi = buf.len() - 1;
    while lo < hi {
        buf.swap(lo, hi);
        lo += 1;
        hi -= 1;
    }
}

/// 16-bit sum over SSR bytes 2..14.
pub fn ssr_checksum(ssr: &[u8; SSR_LEN]) -> u16 {
    let mut sum = 0u32;
    for &byte in &ssr[2..14] {
        sum += u32::from(byte);
    }
    (sum & 0xFFFF) as u16
}

/// Builds the 512-byte security sector from the card's identity registers.
///
/// Deterministic outside the padding: the same CID/CSD/SSR always produce
/// the same [`CROWN_WINDOW_LEN`]-byte window; only the padding varies with
/// the entropy source. `cid[0]` (after reversal) tops out at 0xFF, so the
/// window ends at byte 0x111 and always fits inside the sector.
pub fn generate_security_sector(
    cid: &[u8; CID_LEN],
    csd: &[u8; CSD_LEN],
    ssr: &[u8; SSR_LEN],
    entropy: &mut impl EntropySource,
) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    entropy.fill(&mut sector);

    let mut cid = *cid;
    let mut csd = *csd;
    reverse_in_place(&mut cid);
    reverse_in_place(&mut csd);

    let offset = usize::from(cid[0]);
    for (i, &magic) in CROWN_MAGIC.iter().enumerate() {
        sector[offset + i] = magic ^ cid[i];
    }

    let sum = ssr_checksum(ssr);
    sector[offset + 0x10] = (sum as u8) ^ cid[0];
    sector[offset + 0x11] = ((sum >> 8) as u8) ^ csd[0];
    sector[offset + 0x12] = cid[0] ^ csd[0];

    sector
}
