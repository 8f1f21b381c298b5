use crate::SECTOR_SIZE;

/// Raw command channel into an initialized SPI-mode card: numbered commands
/// answered by an R1 status byte, payloads framed behind a data token.
///
/// Implementations own the bus-select line. [`CardBus::deselect`] must be
/// callable at any point so callers can guarantee the card is never left
/// selected on an error path.
pub trait CardBus {
    type Error;

    /// 1-based CSD structure version learned during card bring-up
    /// (1 = CSD v1.0, 2 = CSD v2.0).
    fn csd_structure_version(&self) -> u8;

    /// Sends a command frame and returns the R1 status byte, keeping the
    /// card selected so a payload read can follow.
    fn send_command(&mut self, cmd: u8, arg: u32) -> Result<u8, Self::Error>;

    /// Reads `out.len()` payload bytes for the previous command and
    /// releases the bus.
    fn read_payload(&mut self, out: &mut [u8]) -> Result<(), Self::Error>;

    /// Consumes one filler byte. R2 responses carry a second status byte
    /// ahead of their payload.
    fn skip_filler(&mut self) -> Result<(), Self::Error>;

    /// Forces the bus-select line high, deselecting the card.
    fn deselect(&mut self);
}

/// 512-byte-sector block access to the same card.
pub trait BlockDevice {
    type Error;

    /// Total device size in 512-byte sectors.
    fn sector_count(&mut self) -> Result<u64, Self::Error>;

    fn read_sector(&mut self, lba: u32, out: &mut [u8; SECTOR_SIZE]) -> Result<(), Self::Error>;

    fn write_sector(&mut self, lba: u32, data: &[u8; SECTOR_SIZE]) -> Result<(), Self::Error>;
}

/// Non-deterministic filler for the sector padding. Obfuscation only, so
/// hardware RNG quality is more than enough.
pub trait EntropySource {
    fn fill(&mut self, buf: &mut [u8]);
}
