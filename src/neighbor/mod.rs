//! CDP neighbor records and the parser that extracts them.
//!
//! Input is the full text of `show cdp neighbors detail`. Output is one
//! [`NeighborRecord`] per `Device ID:` line, in source order.
//!
//! # Main Components
//!
//! - [`parse_neighbors`] - Turns raw command output into records
//! - [`NeighborRecord`] - One adjacent device
//! - [`classify_line`] - The ordered line classifier used by the parser

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use parser::{LineKind, classify_line, parse_neighbors};
pub use record::NeighborRecord;

mod parser;
mod record;
