use crate::device::Device;
use crate::table::Table;
use crate::Result;

/// Durably writes the table, then signals the hosting environment to re-read
/// the device's partition layout. Write-back must complete before the signal
/// goes out; the re-scan outcome itself is not verified.
pub fn commit(table: &mut Table, device: &mut dyn Device) -> Result<()> {
    debug!("committing partition table");
    table.sync(device)?;

    if let Err(e) = device.rescan_partitions() {
        warn!("partition re-scan failed: {}", e);
    }

    Ok(())
}
