//! Interleaving of balanced haplotype files across individuals.
//!
//! The merger receives a [`BalancedManifest`], the ordered list of balanced haplotype-0 /
//! haplotype-1 file pairs produced for each individual, and writes a single FASTA in which
//! every haplotype-0 record is immediately followed by its haplotype-1 partner.
//!
//! Both files of a pair are streamed in lockstep. At every step the locus portion of the two
//! provenance annotations (`|{locus}_phased`) must agree, and both streams must end together.
//! Any disagreement aborts the whole merge with
//! [`HapbalError::UnbalancedFiles`](crate::errors::HapbalError::UnbalancedFiles).
//!
//! Output goes to a temporary file beside the destination and is renamed into place only
//! after every pair merged, so a failed merge leaves no output file behind.

use anyhow::{Context, Result};
use noodles::fasta;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::HapbalError;
use crate::fasta::{FastaWriter, open_fasta, record_description};
use crate::logging::{StageLogger, format_count};

/// File name of the combined output inside the shared FASTA directory.
pub const MERGED_FILE_NAME: &str = "joined_allele_sequences_all_samples.fasta";

/// The balanced allele files of one individual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedPair {
    pub individual: String,
    pub hap0: PathBuf,
    pub hap1: PathBuf,
}

impl BalancedPair {
    pub fn new(individual: impl Into<String>, hap0: PathBuf, hap1: PathBuf) -> Self {
        Self { individual: individual.into(), hap0, hap1 }
    }
}

/// Ordered, append-only list of balanced pairs handed from balancing to merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalancedManifest {
    pairs: Vec<BalancedPair>,
}

impl BalancedManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: BalancedPair) {
        self.pairs.push(pair);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalancedPair> {
        self.pairs.iter()
    }
}

impl FromIterator<BalancedPair> for BalancedManifest {
    fn from_iter<I: IntoIterator<Item = BalancedPair>>(iter: I) -> Self {
        Self { pairs: iter.into_iter().collect() }
    }
}

/// Locus pairs written for each individual, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub pairs_per_individual: Vec<(String, u64)>,
}

impl MergeSummary {
    /// Total locus pairs across all individuals.
    #[must_use]
    pub fn total_pairs(&self) -> u64 {
        self.pairs_per_individual.iter().map(|(_, n)| n).sum()
    }

    /// Total records in the merged file (two per locus pair).
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.total_pairs() * 2
    }
}

/// Extracts the locus from a provenance annotation such as `|uce-12_phased`.
///
/// Only the first whitespace-delimited token is considered; the locus is everything between
/// the leading `|` and the last `_`.
///
/// # Examples
///
/// ```
/// use hapbal_lib::merger::provenance_locus;
///
/// assert_eq!(provenance_locus("|uce-12_phased"), Some("uce-12"));
/// assert_eq!(provenance_locus("|chr1_part_2_phased"), Some("chr1_part_2"));
/// assert_eq!(provenance_locus("uce-12_phased"), None);
/// assert_eq!(provenance_locus("|uce-12"), None);
/// ```
#[must_use]
pub fn provenance_locus(description: &str) -> Option<&str> {
    let annotation = description.split_whitespace().next()?;
    let body = annotation.strip_prefix('|')?;
    let (locus, _suffix) = body.rsplit_once('_')?;
    Some(locus)
}

fn unbalanced(individual: &str, reason: String) -> anyhow::Error {
    HapbalError::UnbalancedFiles { individual: individual.to_string(), reason }.into()
}

/// Looks up the provenance locus of a balanced record.
fn locus_of(record: &fasta::Record, individual: &str, path: &Path) -> Result<String> {
    let description = record_description(record)
        .with_context(|| format!("In {}", path.display()))?
        .unwrap_or_default();
    provenance_locus(description).map(str::to_string).ok_or_else(|| {
        unbalanced(
            individual,
            format!(
                "record '{}' in {} has no provenance annotation",
                String::from_utf8_lossy(record.name()),
                path.display()
            ),
        )
    })
}

/// Streams one pair into `writer`, returning the number of locus pairs written.
fn merge_pair<W: std::io::Write>(pair: &BalancedPair, writer: &mut FastaWriter<W>) -> Result<u64> {
    let mut reader0 = open_fasta(&pair.hap0)?;
    let mut reader1 = open_fasta(&pair.hap1)?;
    let mut records0 = reader0.records();
    let mut records1 = reader1.records();

    let mut pairs = 0;
    loop {
        let next0 = records0
            .next()
            .transpose()
            .with_context(|| format!("Failed to parse FASTA record in {}", pair.hap0.display()))?;
        let next1 = records1
            .next()
            .transpose()
            .with_context(|| format!("Failed to parse FASTA record in {}", pair.hap1.display()))?;

        let (record0, record1) = match (next0, next1) {
            (None, None) => break,
            (Some(record0), Some(record1)) => (record0, record1),
            (Some(extra), None) | (None, Some(extra)) => {
                return Err(unbalanced(
                    &pair.individual,
                    format!(
                        "files differ in length: one ends after {pairs} records while the other \
                         continues with '{}'",
                        String::from_utf8_lossy(extra.name())
                    ),
                ));
            }
        };

        let locus0 = locus_of(&record0, &pair.individual, &pair.hap0)?;
        let locus1 = locus_of(&record1, &pair.individual, &pair.hap1)?;
        if locus0 != locus1 {
            return Err(unbalanced(
                &pair.individual,
                format!(
                    "record {} pairs locus '{locus0}' ({}) with '{locus1}' ({})",
                    pairs + 1,
                    pair.hap0.display(),
                    pair.hap1.display()
                ),
            ));
        }

        writer.write_record(&record0)?;
        writer.write_record(&record1)?;
        pairs += 1;
    }

    Ok(pairs)
}

/// Merges every pair of the manifest into `output`.
///
/// # Errors
/// Returns [`HapbalError::UnbalancedFiles`] on a provenance or length mismatch, or an I/O
/// error. In either case `output` is not created.
pub fn merge_manifest(
    manifest: &BalancedManifest,
    output: &Path,
    logger: &StageLogger,
) -> Result<MergeSummary> {
    let timer = logger.stage("Merging balanced allele files");

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    let mut writer = FastaWriter::new(staging);

    let mut summary = MergeSummary::default();
    for pair in manifest.iter() {
        let pairs = merge_pair(pair, &mut writer)?;
        logger.info(format_args!(
            "Wrote {} locus pairs for {}",
            format_count(pairs),
            pair.individual
        ));
        summary.pairs_per_individual.push((pair.individual.clone(), pairs));
    }

    let staging = writer.finish().context("Failed to flush merged FASTA")?;
    staging
        .persist(output)
        .with_context(|| format!("Failed to write merged FASTA: {}", output.display()))?;

    timer.log_completion(summary.total_records(), "records");
    Ok(summary)
}
