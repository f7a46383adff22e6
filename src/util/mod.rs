//! Test support

pub mod testing;
