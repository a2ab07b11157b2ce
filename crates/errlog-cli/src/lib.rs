//! Support code for the `errlog` binary.

pub mod exit_codes;
pub mod logging;
