//! Locus balancing across the two haplotypes of one individual.
//!
//! Paired phylogenetic analyses need both alleles of every retained locus. A locus that only
//! made it into one haplotype file is dropped from both allele outputs, while the unphased
//! consensus is always kept in full.
//!
//! Balanced headers carry their provenance:
//!
//! | input       | header                        |
//! |-------------|-------------------------------|
//! | haplotype 0 | `{locus}_0 \|{locus}_phased`  |
//! | haplotype 1 | `{locus}_1 \|{locus}_phased`  |
//! | unphased    | `{locus} \|{locus}_hom`       |
//!
//! Any other header text from the consensus caller is dropped.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use crate::cleaner::LocusSets;
use crate::fasta::{FastaWriter, new_record, open_fasta, record_name};
use crate::haplotype::{Haplotype, HaplotypeFiles};
use crate::logging::{StageLogger, log_balance_summary};
use crate::metrics::BalanceMetric;
use crate::validation::validate_files_exist;

/// Provenance suffix for records that have a partner in the other haplotype.
pub const PHASED_SUFFIX: &str = "phased";

/// Provenance suffix for unphased (homozygous) records.
pub const HOMOZYGOUS_SUFFIX: &str = "hom";

/// Builds the balanced `(name, description)` for a locus.
///
/// # Examples
///
/// ```
/// use hapbal_lib::balancer::balanced_header;
/// use hapbal_lib::haplotype::Haplotype;
///
/// assert_eq!(
///     balanced_header("uce-12", Haplotype::One),
///     ("uce-12_1".to_string(), "|uce-12_phased".to_string())
/// );
/// assert_eq!(
///     balanced_header("uce-12", Haplotype::Unphased),
///     ("uce-12".to_string(), "|uce-12_hom".to_string())
/// );
/// ```
#[must_use]
pub fn balanced_header(locus: &str, haplotype: Haplotype) -> (String, String) {
    match haplotype.tag() {
        Some(tag) => (format!("{locus}_{tag}"), format!("|{locus}_{PHASED_SUFFIX}")),
        None => (locus.to_string(), format!("|{locus}_{HOMOZYGOUS_SUFFIX}")),
    }
}

/// Copies the records of `input` whose locus passes `keep` into `output`, rewriting headers.
/// Returns the number of records written.
fn write_balanced<F>(input: &Path, output: &Path, haplotype: Haplotype, keep: F) -> Result<u64>
where
    F: Fn(&str) -> bool,
{
    let mut reader = open_fasta(input)?;
    let mut writer = FastaWriter::create(output)?;

    for result in reader.records() {
        let record = result
            .with_context(|| format!("Failed to parse FASTA record in {}", input.display()))?;
        let locus = record_name(&record).with_context(|| format!("In {}", input.display()))?;
        if !keep(locus) {
            continue;
        }
        let (name, description) = balanced_header(locus, haplotype);
        let balanced = new_record(&name, Some(&description), record.sequence().as_ref().to_vec());
        writer
            .write_record(&balanced)
            .with_context(|| format!("Failed to write FASTA: {}", output.display()))?;
    }

    let count = writer.records();
    writer.finish().with_context(|| format!("Failed to flush FASTA: {}", output.display()))?;
    Ok(count)
}

/// Writes the three balanced files of one individual.
///
/// # Arguments
/// * `individual` - Identifier used in metrics and log lines
/// * `cleaned` - The cleaned haplotype 0, haplotype 1 and unphased FASTA files
/// * `loci` - The loci recorded while cleaning those files
/// * `outputs` - Where to write the balanced files
/// * `logger` - Logging handle for this individual
///
/// # Errors
/// Returns [`crate::errors::HapbalError::MissingFile`] if a cleaned input is absent, or an
/// I/O error from reading or writing.
pub fn balance_individual(
    individual: &str,
    cleaned: &HaplotypeFiles,
    loci: &LocusSets,
    outputs: &HaplotypeFiles,
    logger: &StageLogger,
) -> Result<BalanceMetric> {
    validate_files_exist(&[
        (&cleaned.hap0, "Cleaned haplotype 0 FASTA"),
        (&cleaned.hap1, "Cleaned haplotype 1 FASTA"),
        (&cleaned.unphased, "Cleaned unphased FASTA"),
    ])?;

    let timer = logger.stage("Balancing loci across haplotypes");
    let balanced: BTreeSet<String> = loci.balanced();

    let mut metric = BalanceMetric::new(individual);
    metric.hap0_loci = loci.loci(Haplotype::Zero).map_or(0, |l| l.len() as u64);
    metric.hap1_loci = loci.loci(Haplotype::One).map_or(0, |l| l.len() as u64);
    metric.balanced_loci = balanced.len() as u64;
    metric.hap0_only = loci.unmatched(Haplotype::Zero) as u64;
    metric.hap1_only = loci.unmatched(Haplotype::One) as u64;

    let mut written = 0;
    for haplotype in Haplotype::PHASED {
        written += write_balanced(
            cleaned.get(haplotype),
            outputs.get(haplotype),
            haplotype,
            |locus| balanced.contains(locus),
        )?;
    }
    metric.unphased_records =
        write_balanced(&cleaned.unphased, &outputs.unphased, Haplotype::Unphased, |_| true)?;
    written += metric.unphased_records;

    timer.log_completion(written, "records");
    log_balance_summary(logger, &metric);
    Ok(metric)
}
