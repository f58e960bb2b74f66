//! Command implementations for the deskext CLI.

pub mod inspect;
pub mod mappings;
pub mod simulate;
