//! Command implementations behind the `gq` binary

pub mod ask;
