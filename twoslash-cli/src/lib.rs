//! Expose the twoslash CLI's internals for use in integration tests and the
//! `xtask` tooling. The binary is the supported interface.
pub mod cli;
pub mod convert;
pub mod utils;
