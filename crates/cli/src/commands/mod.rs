// Path: crates/cli/src/commands/mod.rs

pub mod discover;
pub mod mine;
pub mod status;
pub mod validate;
