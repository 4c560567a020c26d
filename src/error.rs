use std::{io, result};

use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error("{0}")]
    Gpt(gptman::Error),
    #[error("no valid GPT found")]
    NoValidTable,
    #[error("partition table is full")]
    TableFull,
    #[error("new partition does not fit into usable region")]
    DoesNotFit,
    #[error("new partition would overlap with #{0}")]
    Overlap(u32),
    #[error("partition size must be at least one block")]
    InvalidSize,
    #[error("cancelled")]
    Cancelled,
    #[error("not supported")]
    NotSupported,
    #[error("not found")]
    NotFound,
}

impl From<gptman::Error> for Error {
    fn from(e: gptman::Error) -> Self {
        Error::Gpt(e)
    }
}
