//! CLI command implementations for hapbal.
//!
//! # Commands
//!
//! ## Pipeline
//! - [`phase`] - Phase, call consensus, clean, balance and merge every configured individual
//!
//! ## Balancing
//! - [`balance`] - Clean and balance one individual's existing consensus FASTAs
//! - [`merge`] - Interleave balanced haplotype files across individuals

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::uninlined_format_args
)]

pub mod balance;
pub mod command;
pub mod common;
pub mod merge;
pub mod phase;
