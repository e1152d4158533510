//! Crate-level tests
//!
//! Exercise the filter end to end against a fake codec engine:
//! - Frame accumulation across calls
//! - S/PDIF framing of the output
//! - Reconfiguration and reopen behaviour
//! - Recovery after fatal calls

pub mod fixtures;

mod reconfigure;
