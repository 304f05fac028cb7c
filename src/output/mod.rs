//! Output module
//!
//! Writes the complete record collection to disk once paging has finished.

mod writer;

pub use writer::{JsonFileWriter, RecordWriter};

#[cfg(test)]
mod tests;
