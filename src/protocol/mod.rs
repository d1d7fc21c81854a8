//! Protocol module for building commands and parsing replies.
//!
//! This module contains the implementations for:
//! - AT command construction
//! - Dash-separated hex encoding of characteristic values
//! - Reply status classification and payload parsing

pub mod commands;
pub mod hex;
pub mod reply;

pub use reply::{Reply, Status};
