//! Custom error types for hapbal operations.

use thiserror::Error;

/// Result type alias for hapbal operations
pub type Result<T> = std::result::Result<T, HapbalError>;

/// Error type for hapbal operations
#[derive(Error, Debug)]
pub enum HapbalError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// The run configuration is unusable
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Explanation of the problem
        reason: String,
    },

    /// An expected input or intermediate file is absent
    #[error("{description} '{path}' does not exist")]
    MissingFile {
        /// Human-readable description of the file (e.g. "Cleaned haplotype 0 FASTA")
        description: String,
        /// Path to the file
        path: String,
    },

    /// No alignment could be found for an individual
    #[error("No alignment found for individual '{individual}' (tried: {})", tried.join(", "))]
    MissingAlignment {
        /// The individual identifier
        individual: String,
        /// Candidate paths that were checked, in order
        tried: Vec<String>,
    },

    /// Paired haplotype files do not describe the same loci
    #[error("Unbalanced haplotype files for '{individual}': {reason}")]
    UnbalancedFiles {
        /// The individual whose files disagree
        individual: String,
        /// Explanation of the disagreement
        reason: String,
    },

    /// An external tool exited unsuccessfully
    #[error("External tool '{tool}' failed ({status}): {stderr}")]
    ExternalTool {
        /// The program that was run
        tool: String,
        /// Exit status description
        status: String,
        /// Captured standard error, trimmed
        stderr: String,
    },
}
