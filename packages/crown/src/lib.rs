#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod machine;
pub mod mbr;
pub mod sector;
pub mod session;
pub mod traits;
pub mod writer;

pub use error::CrownError;
pub use machine::{CardAction, CardEvent, InsertionEngine};
pub use traits::{BlockDevice, CardBus, EntropySource};
pub use writer::write_crown_sector;

pub const SECTOR_SIZE: usize = 512;
pub const CID_LEN: usize = 16;
pub const CSD_LEN: usize = 16;
pub const SSR_LEN: usize = 64;

/// Sectors that must stay free behind the write target. The loader reserves
/// a full 1 MB window plus the security sector itself, even though only
/// ~0x0E0200 bytes of it are ever read.
pub const RESERVED_SECTORS: u32 = 0x801;
