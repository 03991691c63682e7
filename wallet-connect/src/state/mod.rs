//! Application state

pub mod wallet;
