//! Interactive confirmation before mutating a real device.

use std::io::{self, Read};
use std::path::Path;

/// A yes/no gate asked once before a destructive operation.
///
/// The CLI installs [`StdinGate`]; tests inject scripted implementations.
pub trait ConfirmationGate {
    fn confirm(&mut self, device: &Path) -> bool;
}

/// Blocks until one byte of standard input is available and reads exactly
/// that byte. A linefeed confirms; anything else, EOF or a read error
/// cancels.
pub struct StdinGate;

impl ConfirmationGate for StdinGate {
    fn confirm(&mut self, device: &Path) -> bool {
        println!(
            "Using {}... <enter> to continue, any other key to cancel",
            device.display()
        );

        let mut byte = [0u8; 1];
        match io::stdin().read(&mut byte) {
            Ok(1) => byte[0] == b'\n',
            _ => false,
        }
    }
}
