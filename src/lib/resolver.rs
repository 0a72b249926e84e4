//! Maps individuals named in the configuration to their reference and alignment files.

use std::path::{Path, PathBuf};

use crate::config::IniConfig;
use crate::errors::{HapbalError, Result};

/// Section mapping each individual to its reference FASTA.
pub const REFERENCES_SECTION: &str = "references";

/// Optional section listing the individuals to process.
pub const INDIVIDUALS_SECTION: &str = "individuals";

/// Phasing needs at least this many per-sample references.
pub const MIN_REFERENCES: usize = 2;

/// Alignment file suffixes, most processed first.
pub const ALIGNMENT_SUFFIXES: [&str; 2] = ["-CL-RG-MD-M.bam", "-CL-RG-MD.bam"];

/// One sample to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    pub name: String,
    pub reference: PathBuf,
    pub alignment: PathBuf,
}

/// Finds the alignment for `individual` under `{bams}/{individual}/`.
///
/// # Errors
/// Returns [`HapbalError::MissingAlignment`] listing every candidate when none exists.
pub fn find_alignment(bams: &Path, individual: &str) -> Result<PathBuf> {
    let dir = bams.join(individual);
    let candidates: Vec<PathBuf> =
        ALIGNMENT_SUFFIXES.iter().map(|suffix| dir.join(format!("{individual}{suffix}"))).collect();

    if let Some(found) = candidates.iter().find(|path| path.is_file()) {
        return Ok(found.clone());
    }
    Err(HapbalError::MissingAlignment {
        individual: individual.to_string(),
        tried: candidates.iter().map(|p| p.display().to_string()).collect(),
    })
}

fn configuration(reason: String) -> HapbalError {
    HapbalError::Configuration { reason }
}

/// Resolves every individual of the configuration, in `[references]` order.
///
/// The reference count and the `[individuals]` cross-check happen before any file system
/// access.
///
/// # Errors
/// Returns [`HapbalError::Configuration`] for a missing or too-small `[references]` section,
/// an individual without a reference, an entry without a path, or a reference that does not
/// exist; [`HapbalError::MissingAlignment`] when an alignment cannot be found.
pub fn resolve_individuals(config: &IniConfig, bams: &Path) -> Result<Vec<Individual>> {
    let references = config
        .section(REFERENCES_SECTION)
        .ok_or_else(|| configuration(format!("missing [{REFERENCES_SECTION}] section")))?;

    if references.len() < MIN_REFERENCES {
        return Err(configuration(format!(
            "at least {MIN_REFERENCES} entries are required in [{REFERENCES_SECTION}], found {}",
            references.len()
        )));
    }

    if let Some(individuals) = config.section(INDIVIDUALS_SECTION) {
        if let Some(unknown) = individuals.keys().find(|name| !references.contains_key(name)) {
            return Err(configuration(format!(
                "individual '{unknown}' has no entry in [{REFERENCES_SECTION}]"
            )));
        }
    }

    let mut paths = Vec::with_capacity(references.len());
    for (name, value) in references.entries() {
        match value.filter(|v| !v.is_empty()) {
            Some(path) => paths.push((name, PathBuf::from(path))),
            None => {
                return Err(configuration(format!("reference for '{name}' has no path")));
            }
        }
    }

    paths
        .into_iter()
        .map(|(name, reference)| {
            if !reference.is_file() {
                return Err(configuration(format!(
                    "reference for '{name}' does not exist: {}",
                    reference.display()
                )));
            }
            let alignment = find_alignment(bams, name)?;
            Ok(Individual { name: name.to_string(), reference, alignment })
        })
        .collect()
}
