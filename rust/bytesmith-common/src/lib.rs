//! Error and result definitions relied upon by the bytesmith crates.

pub mod error;
pub mod result;

pub use result::Result;
