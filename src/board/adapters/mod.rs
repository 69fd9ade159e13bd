//! Adapter implementations for the board repository port, plus decoding of
//! legacy board records.

pub mod memory;
pub mod records;
