//! Reading and writing sample files.

#[cfg(feature = "csv")]
pub mod csv;
