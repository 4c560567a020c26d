//! One open device plus its partition table, held for the life of a single
//! command.

use std::path::Path;

use crate::confirm::ConfirmationGate;
use crate::device::{Device, RawDevice};
use crate::table::Table;
use crate::{Error, Result};

pub struct Session {
    pub device: Box<dyn Device>,
    pub table: Table,
}

impl Session {
    /// Confirms (when a gate is supplied), opens the device read-write,
    /// queries geometry and loads the table. A declined confirmation aborts
    /// before anything is opened.
    pub fn open(
        path: &Path,
        sector_size: u64,
        gate: Option<&mut dyn ConfirmationGate>,
    ) -> Result<Self> {
        if let Some(gate) = gate {
            if !gate.confirm(path) {
                return Err(Error::Cancelled);
            }
        }

        let device = RawDevice::open(path, sector_size)?;
        debug!(
            "blocksize={} blocks={}",
            device.block_size(),
            device.block_count()
        );

        Self::with_device(Box::new(device))
    }

    pub fn with_device(mut device: Box<dyn Device>) -> Result<Self> {
        let table = Table::init(device.as_mut())?;
        Ok(Self { device, table })
    }
}
