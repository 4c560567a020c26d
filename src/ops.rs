//! The three operations: dump, add, remove.

use crate::session::Session;
use crate::{codec, commit, Result};

/// Type GUID stamped on every partition this tool creates. A fixed marker,
/// not a standards-defined type.
pub const PART_TYPE_GUID: [u8; 16] = [0xff; 16];

pub struct PartitionRow {
    pub index: u32,
    pub name: String,
    pub first_lba: u64,
    pub last_lba: u64,
    pub blocks: u64,
    pub guid: String,
}

pub struct Added {
    pub slot: u32,
    pub first_lba: u64,
    pub last_lba: u64,
    pub blocks: u64,
}

pub struct Removed {
    pub index: u32,
    pub name: String,
}

/// Read-only listing. Walks slots in positional order and stops at the first
/// unused one, so the reported count assumes a gapless array.
pub fn dump(session: &Session) -> Result<Vec<PartitionRow>> {
    let mut rows = Vec::new();

    for (i, entry) in session.table.slots()?.enumerate() {
        if entry.is_unused() {
            break;
        }

        rows.push(PartitionRow {
            index: i as u32,
            name: codec::decode_name(entry.partition_name.as_str().encode_utf16()),
            first_lba: entry.starting_lba,
            last_lba: entry.ending_lba,
            blocks: entry.size()?,
            guid: codec::format_guid(&entry.unique_partition_guid),
        });
    }

    Ok(rows)
}

/// Creates a partition over `blocks` blocks starting at `first_lba`. On a
/// device with no valid table, an empty table is committed first so that add
/// can bootstrap a blank disk. The new entry is committed on success; any
/// failure leaves the durable state untouched.
pub fn add(session: &mut Session, first_lba: u64, blocks: u64, name: &str) -> Result<Added> {
    if !session.table.is_valid() {
        info!("no valid GPT found, committing a fresh empty table");
        session.table.materialize(session.device.as_mut())?;
        commit::commit(&mut session.table, session.device.as_mut())?;
    }

    let slot = session.table.add(
        name,
        PART_TYPE_GUID,
        codec::random_guid(),
        first_lba,
        blocks,
        0,
    )?;
    commit::commit(&mut session.table, session.device.as_mut())?;

    Ok(Added {
        slot,
        first_lba,
        last_lba: first_lba + blocks - 1,
        blocks,
    })
}

/// Deletes the partition at a zero-based slot position. An index beyond the
/// table's capacity, an empty slot, or a missing table is a silent no-op:
/// nothing is reported and nothing is committed. The actual removal is keyed
/// on the entry's unique GUID, not on the position.
pub fn remove(session: &mut Session, index: u32) -> Result<Option<Removed>> {
    let unique_guid = match session.table.slot(index) {
        Some(entry) => entry.unique_partition_guid,
        None => return Ok(None),
    };

    let removed = session.table.remove(unique_guid)?;
    commit::commit(&mut session.table, session.device.as_mut())?;

    Ok(Some(Removed {
        index,
        name: codec::decode_name(removed.partition_name.as_str().encode_utf16()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemDevice;
    use crate::table::Table;
    use crate::Error;

    fn blank_session() -> Session {
        Session::with_device(Box::new(MemDevice::new_zeroed(512, 2048))).unwrap()
    }

    #[test]
    fn test_dump_without_table() {
        crate::tests_init();

        let session = blank_session();
        assert!(matches!(dump(&session), Err(Error::NoValidTable)));
    }

    #[test]
    fn test_add_bootstraps_blank_device() {
        crate::tests_init();

        let mut session = blank_session();
        assert!(!session.table.is_valid());

        let added = add(&mut session, 100, 50, "sys").unwrap();
        assert!(session.table.is_valid());
        assert_eq!(added.slot, 0);
        assert_eq!(added.last_lba, 149);

        let rows = dump(&session).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].name, "sys");
        assert_eq!(rows[0].first_lba, 100);
        assert_eq!(rows[0].last_lba, 149);
        assert_eq!(rows[0].blocks, 50);

        // the bootstrap and the entry both hit the device, not just memory
        let reloaded = Table::init(session.device.as_mut()).unwrap();
        assert!(reloaded.is_valid());
        assert_eq!(reloaded.slot(0).unwrap().starting_lba, 100);
    }

    #[test]
    fn test_add_failure_commits_nothing() {
        crate::tests_init();

        let mut session = blank_session();
        add(&mut session, 100, 50, "sys").unwrap();

        assert!(matches!(
            add(&mut session, 120, 50, "clash"),
            Err(Error::Overlap(0))
        ));

        let reloaded = Table::init(session.device.as_mut()).unwrap();
        assert!(reloaded.slot(1).is_none());
    }

    #[test]
    fn test_remove_then_dump_is_empty() {
        crate::tests_init();

        let mut session = blank_session();
        add(&mut session, 100, 50, "sys").unwrap();

        let removed = remove(&mut session, 0).unwrap().unwrap();
        assert_eq!(removed.index, 0);
        assert_eq!(removed.name, "sys");

        assert_eq!(dump(&session).unwrap().len(), 0);
    }

    #[test]
    fn test_remove_noop_cases() {
        crate::tests_init();

        // no table at all
        let mut session = blank_session();
        assert!(remove(&mut session, 0).unwrap().is_none());
        assert!(!session.table.is_valid());

        // empty slot and out-of-capacity index
        add(&mut session, 100, 50, "sys").unwrap();
        assert!(remove(&mut session, 5).unwrap().is_none());
        assert!(remove(&mut session, 4096).unwrap().is_none());
        assert_eq!(dump(&session).unwrap().len(), 1);
    }

    #[test]
    fn test_dump_stops_at_first_empty_slot() {
        crate::tests_init();

        let mut session = blank_session();
        add(&mut session, 100, 10, "first").unwrap();
        add(&mut session, 200, 10, "second").unwrap();
        assert_eq!(dump(&session).unwrap().len(), 2);

        // removing the first entry leaves a gap; the walk stops there and the
        // trailing partition goes unreported
        remove(&mut session, 0).unwrap().unwrap();
        assert_eq!(dump(&session).unwrap().len(), 0);
        assert!(session.table.slot(1).is_some());
    }
}
