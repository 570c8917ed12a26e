//! # cdpscan - CDP Neighbor Collector
//!
//! `cdpscan` turns the free-form output of `show cdp neighbors detail` into
//! typed neighbor records. It also ships the small session layer needed to
//! fetch that output from a device: SSH first, Telnet as a fallback.
//!
//! ## Features
//!
//! - **Tolerant Parsing**: Unknown lines are skipped, optional fields stay empty
//! - **Ordered Output**: Records come back in the order the device listed them
//! - **Transport Fallback**: SSH exec, then Telnet login when SSH is unavailable
//! - **Tabular Export**: Fixed five-column CSV, or JSON with every parsed field
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cdpscan::config::ReaderConfig;
//! use cdpscan::neighbor::parse_neighbors;
//! use cdpscan::session::{Credentials, fetch_neighbor_output};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("admin", "password");
//!     let raw = fetch_neighbor_output("192.168.1.1", &credentials, &ReaderConfig::default()).await?;
//!
//!     for neighbor in parse_neighbors(&raw) {
//!         println!("{} via {:?}", neighbor.device_id, neighbor.interface);
//!     }
//!
//!     let mut csv = Vec::new();
//!     cdpscan::export::write_csv(&parse_neighbors(&raw), &mut csv)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Main Components
//!
//! - [`neighbor::parse_neighbors`] - Parses raw command output into records
//! - [`session::SessionReader`] - Fetches raw output from a device
//! - [`export`] - CSV and JSON writers
//! - [`error::ConnectError`] - Error types for the session layer
//! - [`config`] - Reader settings and SSH algorithm profiles

pub mod config;
pub mod error;
pub mod export;
pub mod neighbor;
pub mod session;
