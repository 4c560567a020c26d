extern crate uuid;
#[macro_use]
extern crate log;
extern crate gptman;

pub mod codec;
pub mod commit;
pub mod confirm;
pub mod device;
mod error;
pub mod ops;
pub mod region;
pub mod session;
pub mod table;

pub use error::*;

#[cfg(test)]
extern crate better_panic;

#[cfg(test)]
pub(crate) fn tests_init() {
    better_panic::install();
}
