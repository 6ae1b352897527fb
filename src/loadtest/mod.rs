//! Command handlers.
//!
//! `populate` runs the concurrent batch engine; `table` holds the table
//! administration commands.

pub mod populate;
pub mod table;
