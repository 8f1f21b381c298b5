use crate::{
    error::CrownError,
    mbr, sector,
    session::RegisterSession,
    traits::{BlockDevice, CardBus, EntropySource},
};

/// Runs one full crown-write attempt against an initialized card.
///
/// Session open (CSD version gate), CID, CSD, SSR, locate, generate, one
/// sector write. The first failure wins and propagates unconverted; there
/// are no retries at this level, the insertion loop decides what happens
/// next. Returns the LBA the sector was written to.
pub fn write_crown_sector<C, E>(card: &mut C, entropy: &mut E) -> Result<u32, CrownError>
where
    C: CardBus + BlockDevice,
    E: EntropySource,
{
    let mut session = RegisterSession::open(card)?;
    let cid = session.read_cid()?;
    let csd = session.read_csd()?;
    let ssr = session.read_ssr()?;

    let lba = mbr::locate_free_lba(card)?;
    let payload = sector::generate_security_sector(&cid, &csd, &ssr, entropy);
    card.write_sector(lba, &payload).map_err(|_| CrownError::Io)?;
    Ok(lba)
}
