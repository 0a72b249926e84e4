//! Helper utilities for integration tests.

pub mod fake_tools;
pub mod fasta_files;

pub use fasta_files::*;
