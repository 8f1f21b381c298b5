use heapless::Vec;

use crate::{error::CrownError, traits::BlockDevice, RESERVED_SECTORS, SECTOR_SIZE};

const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
const PARTITION_TABLE_OFFSET: usize = 0x1BE;
const PARTITION_ENTRY_LEN: usize = 16;
const PARTITION_SLOTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionSpan {
    pub start_lba: u32,
    /// First LBA past the partition.
    pub end_lba: u32,
}

/// Finds the write target: the first LBA after partition 1, provided at
/// least [`RESERVED_SECTORS`] sectors of free space follow it.
///
/// Only the gap up to partition 2 (or the end of the disk) is considered;
/// a third partition sitting closer to partition 1 goes unnoticed. The
/// 0x55AA boot marker is deliberately not required, non-bootable media
/// often omit it.
pub fn locate_free_lba<D: BlockDevice>(dev: &mut D) -> Result<u32, CrownError> {
    let mut sector = [0u8; SECTOR_SIZE];

    // GPT keeps its header at LBA 1. Refuse the whole disk on a match.
    dev.read_sector(1, &mut sector).map_err(|_| CrownError::Io)?;
    if &sector[..GPT_SIGNATURE.len()] == GPT_SIGNATURE {
        return Err(CrownError::IsGpt);
    }

    dev.read_sector(0, &mut sector).map_err(|_| CrownError::Io)?;
    let partitions = parse_partition_table(&sector)?;

    if partitions.len() == 1 {
        let disk_end = dev.sector_count().map_err(|_| CrownError::Io)?;
        if disk_end.saturating_sub(u64::from(partitions[0].end_lba)) < u64::from(RESERVED_SECTORS)
        {
            return Err(CrownError::NoSpace);
        }
    } else if partitions[1]
        .start_lba
        .saturating_sub(partitions[0].end_lba)
        < RESERVED_SECTORS
    {
        return Err(CrownError::NoSpace);
    }

    Ok(partitions[0].end_lba)
}

/// Parses the classic four-entry table at 0x1BE. An empty first entry is
/// rejected; the write target assumes partition 1 exists and precedes it.
pub fn parse_partition_table(
    sector: &[u8; SECTOR_SIZE],
) -> Result<Vec<PartitionSpan, PARTITION_SLOTS>, CrownError> {
    if entry_type(sector, 0) == 0 {
        return Err(CrownError::NoFirstPartition);
    }

    let mut partitions = Vec::new();
    for slot in 0..PARTITION_SLOTS {
        if entry_type(sector, slot) == 0 {
            continue;
        }
        let off = PARTITION_TABLE_OFFSET + slot * PARTITION_ENTRY_LEN + 8;
        let start_lba = u32::from_le_bytes([
            sector[off],
            sector[off + 1],
            sector[off + 2],
            sector[off + 3],
        ]);
        let sector_len = u32::from_le_bytes([
            sector[off + 4],
            sector[off + 5],
            sector[off + 6],
            sector[off + 7],
        ]);
        let span = PartitionSpan {
            start_lba,
            end_lba: start_lba.saturating_add(sector_len),
        };
        // Capacity equals the slot count, push cannot fail.
        let _ = partitions.push(span);
    }
    Ok(partitions)
}

fn entry_type(sector: &[u8; SECTOR_SIZE], slot: usize) -> u8 {
    sector[PARTITION_TABLE_OFFSET + slot * PARTITION_ENTRY_LEN + 4]
}
