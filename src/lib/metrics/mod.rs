//! Metrics collected while balancing haplotype files.
//!
//! - [`BalanceMetric`] - Per-individual locus counts before and after balancing
//! - [`writer`] - Metrics file I/O utilities
//!
//! # Traits
//!
//! - [`Metric`] - Core trait for serializable metrics

pub mod writer;

use serde::{Deserialize, Serialize};

pub use writer::{write_metrics, write_metrics_auto};

/// Core trait for metric rows written to delimited files.
pub trait Metric: Serialize + for<'de> Deserialize<'de> + Clone + Default {
    /// Human-readable name for this metric type.
    ///
    /// Used in error messages and logging when writing metrics files.
    fn metric_name() -> &'static str;
}

/// Locus counts for one individual's balancing step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceMetric {
    /// The individual these counts describe
    pub individual: String,

    /// Distinct loci in the cleaned haplotype 0 file
    pub hap0_loci: u64,

    /// Distinct loci in the cleaned haplotype 1 file
    pub hap1_loci: u64,

    /// Loci present in both haplotype files (written to both balanced allele files)
    pub balanced_loci: u64,

    /// Loci dropped because only haplotype 0 had them
    pub hap0_only: u64,

    /// Loci dropped because only haplotype 1 had them
    pub hap1_only: u64,

    /// Records written to the balanced unphased file
    pub unphased_records: u64,
}

impl BalanceMetric {
    /// Creates an empty metric row for an individual.
    #[must_use]
    pub fn new(individual: impl Into<String>) -> Self {
        Self { individual: individual.into(), ..Self::default() }
    }
}

impl Metric for BalanceMetric {
    fn metric_name() -> &'static str {
        "balance"
    }
}
