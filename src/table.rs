//! The tool's view of the partition table: a validity flag plus a
//! fixed-capacity, zero-based slot array. All on-disk encoding, checksums
//! and backup-header placement are gptman's business.

use gptman::{GPTPartitionEntry, GPT};

use crate::device::Device;
use crate::region::Region;
use crate::{codec, Error, Result};

pub struct Table {
    gpt: Option<GPT>,
}

impl Table {
    /// Loads the table from the device. A device carrying no parseable GPT
    /// yields an invalid table rather than an error; only genuine I/O
    /// failures are fatal.
    pub fn init(device: &mut dyn Device) -> Result<Self> {
        let block_size = device.block_size();

        let mut reader: &mut dyn Device = device;
        match GPT::read_from(&mut reader, block_size) {
            Ok(gpt) => {
                debug!(
                    "loaded GPT: {} entry slots, usable {} - {}",
                    gpt.header.number_of_partition_entries,
                    gpt.header.first_usable_lba,
                    gpt.header.last_usable_lba
                );
                Ok(Self { gpt: Some(gpt) })
            }
            Err(gptman::Error::Io(e)) => Err(e.into()),
            Err(e) => {
                debug!("no valid GPT: {}", e);
                Ok(Self { gpt: None })
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.gpt.is_some()
    }

    /// Builds a fresh empty table sized to the device, with a newly drawn
    /// disk GUID. In memory only until the next commit.
    pub fn materialize(&mut self, device: &mut dyn Device) -> Result<()> {
        let block_size = device.block_size();

        let mut reader: &mut dyn Device = device;
        let gpt = GPT::new_from(&mut reader, block_size, codec::random_guid())?;
        self.gpt = Some(gpt);

        Ok(())
    }

    /// Maximum number of entry slots, 0 while the table is invalid.
    pub fn capacity(&self) -> u32 {
        self.gpt
            .as_ref()
            .map_or(0, |g| g.header.number_of_partition_entries)
    }

    /// The occupied entry at a zero-based slot position. `None` for an
    /// invalid table, a position beyond capacity or an unused slot.
    pub fn slot(&self, index: u32) -> Option<&GPTPartitionEntry> {
        let gpt = self.gpt.as_ref()?;
        if index >= gpt.header.number_of_partition_entries {
            return None;
        }

        let entry = &gpt[index + 1];
        if entry.is_unused() {
            None
        } else {
            Some(entry)
        }
    }

    /// All slots in positional order, unused ones included.
    pub fn slots(&self) -> Result<impl Iterator<Item = &GPTPartitionEntry> + '_> {
        let gpt = self.gpt.as_ref().ok_or(Error::NoValidTable)?;
        Ok(gpt.iter().map(|(_, e)| e))
    }

    /// Places a new entry into the first free slot and returns its zero-based
    /// position. The requested range must lie inside the usable region and
    /// must not overlap any occupied slot.
    pub fn add(
        &mut self,
        name: &str,
        type_guid: [u8; 16],
        unique_guid: [u8; 16],
        first_lba: u64,
        blocks: u64,
        flags: u64,
    ) -> Result<u32> {
        let gpt = self.gpt.as_mut().ok_or(Error::NoValidTable)?;

        if blocks == 0 {
            return Err(Error::InvalidSize);
        }
        let last_lba = first_lba
            .checked_add(blocks - 1)
            .ok_or(Error::DoesNotFit)?;
        let target = Region::new(first_lba, last_lba);

        let usable = Region::new(gpt.header.first_usable_lba, gpt.header.last_usable_lba);
        if !target.belongs(&usable) {
            return Err(Error::DoesNotFit);
        }

        for (i, p) in gpt.iter().filter(|(_, x)| x.is_used()) {
            if target.overlaps(&Region::new(p.starting_lba, p.ending_lba)) {
                return Err(Error::Overlap(i - 1));
            }
        }

        let free = gpt
            .iter()
            .find(|(_, x)| x.is_unused())
            .map(|(i, _)| i)
            .ok_or(Error::TableFull)?;

        gpt[free] = GPTPartitionEntry {
            partition_type_guid: type_guid,
            unique_partition_guid: unique_guid,
            starting_lba: target.start(),
            ending_lba: target.end(),
            attribute_bits: flags,
            partition_name: name.into(),
        };

        Ok(free - 1)
    }

    /// Removes the entry carrying `unique_guid` and returns it. The stable
    /// key is the GUID; slot positions shift meaning as entries come and go.
    pub fn remove(&mut self, unique_guid: [u8; 16]) -> Result<GPTPartitionEntry> {
        let gpt = self.gpt.as_mut().ok_or(Error::NoValidTable)?;

        let index = gpt
            .iter()
            .find(|(_, x)| x.is_used() && x.unique_partition_guid == unique_guid)
            .map(|(i, _)| i)
            .ok_or(Error::NotFound)?;

        let removed = gpt[index].clone();
        gpt[index] = GPTPartitionEntry::empty();

        Ok(removed)
    }

    /// Durable write-back through the table library, then a device flush.
    pub fn sync(&mut self, device: &mut dyn Device) -> Result<()> {
        let gpt = self.gpt.as_mut().ok_or(Error::NoValidTable)?;

        let mut writer: &mut dyn Device = &mut *device;
        gpt.write_into(&mut writer)?;
        device.flush()?;

        Ok(())
    }
}
