#![deny(unsafe_code)]
// Clippy lint configuration for CI
// - cast_*: counts are u64 while collection sizes are usize
// - missing_*_doc: error documentation is kept on the public entry points only
// - needless_pass_by_value: command structs hand owned values to the library
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::needless_pass_by_value,
    clippy::module_name_repetitions,
    clippy::redundant_closure_for_method_calls,
    clippy::uninlined_format_args
)]

//! # hapbal - balanced, phased allele sequences per locus
//!
//! This library turns per-individual alignments into balanced haplotype consensus sequences
//! and interleaves them across individuals for paired phylogenetic analysis.
//!
//! ## Overview
//!
//! ### Core Functionality
//!
//! - **[`cleaner`]** - Masks ambiguity codes (and optionally lowercase bases) and records loci
//! - **[`balancer`]** - Keeps only loci present in both haplotypes and rewrites headers
//! - **[`merger`]** - Interleaves balanced haplotype pairs across individuals
//! - **[`resolver`]** - Maps configured individuals to reference and alignment files
//! - **[`tools`]** - Runs samtools, bcftools, vcfutils.pl and seqtk
//! - **[`pipeline`]** - Drives individuals through all of the above
//!
//! ### Utilities
//!
//! - **[`config`]** - INI-style configuration files
//! - **[`fasta`]** - FASTA reading and writing
//! - **[`haplotype`]** - Haplotype tags and file naming
//! - **[`validation`]** - Input validation utilities for parameters and files
//! - **[`logging`]** - Per-stage logging with formatting helpers
//! - **[`metrics`]** - Balance metrics and TSV writing
//! - **[`errors`]** - Typed errors
//!
//! ## Quick Start
//!
//! ### Cleaning and Balancing One Individual
//!
//! ```no_run
//! use hapbal_lib::haplotype::HaplotypeFiles;
//! use hapbal_lib::logging::StageLogger;
//! use hapbal_lib::pipeline::process_consensus;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = Path::new("out/bird1");
//! let consensus = HaplotypeFiles::in_dir(dir, "bird1", "fasta");
//! let logger = StageLogger::new("balance").for_individual("bird1");
//! let processed = process_consensus("bird1", &consensus, dir, false, &logger)?;
//! println!("{} balanced loci", processed.metric.balanced_loci);
//! # Ok(())
//! # }
//! ```
//!
//! ### Merging Balanced Files
//!
//! ```no_run
//! use hapbal_lib::logging::StageLogger;
//! use hapbal_lib::merger::{BalancedManifest, BalancedPair, merge_manifest};
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut manifest = BalancedManifest::new();
//! manifest.push(BalancedPair::new(
//!     "bird1",
//!     PathBuf::from("bird1.0.balanced.fasta"),
//!     PathBuf::from("bird1.1.balanced.fasta"),
//! ));
//! merge_manifest(&manifest, Path::new("joined.fasta"), &StageLogger::new("merge"))?;
//! # Ok(())
//! # }
//! ```

pub mod balancer;
pub mod cleaner;
pub mod config;
pub mod errors;
pub mod fasta;
pub mod haplotype;
pub mod logging;
pub mod merger;
pub mod metrics;
pub mod pipeline;
pub mod resolver;
pub mod tools;
pub mod validation;

pub use haplotype::{Haplotype, HaplotypeFiles};
pub use merger::{BalancedManifest, BalancedPair};
