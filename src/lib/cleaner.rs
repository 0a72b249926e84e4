//! Cleaning of raw consensus sequences.
//!
//! Consensus callers report uncertain calls in two ways: heterozygous positions become
//! two-base IUPAC ambiguity codes, and poorly supported positions are written in lowercase.
//! Downstream phylogenetic tools treat both as noise, so cleaning rewrites them to `N`:
//!
//! - `R Y K M S W` (either case) always become `N`.
//! - In conservative mode every lowercase base (including `n`) becomes `N`.
//! - Otherwise the sequence is simply uppercased.
//!
//! While cleaning, the locus identifier of every phased record is recorded in a
//! per-individual [`LocusSets`] accumulator, which the balancer later intersects.

use anyhow::{Context, Result};
use noodles::fasta;
use std::collections::BTreeSet;
use std::path::Path;

use crate::fasta::{FastaWriter, open_fasta, record_name};
use crate::haplotype::{Haplotype, HaplotypeFiles};
use crate::logging::StageLogger;
use crate::validation::validate_files_exist;

/// The sentinel written in place of any base that cannot be trusted.
pub const UNKNOWN_BASE: u8 = b'N';

/// The two-base IUPAC ambiguity codes (uppercase).
pub const AMBIGUITY_CODES: [u8; 6] = *b"RYKMSW";

/// Returns true for any of the six two-base ambiguity codes, in either case.
#[inline]
#[must_use]
pub fn is_ambiguity_code(base: u8) -> bool {
    AMBIGUITY_CODES.contains(&base.to_ascii_uppercase())
}

/// Cleans a single base.
///
/// # Examples
///
/// ```
/// use hapbal_lib::cleaner::clean_base;
///
/// assert_eq!(clean_base(b'r', false), b'N');
/// assert_eq!(clean_base(b'a', false), b'A');
/// assert_eq!(clean_base(b'a', true), b'N');
/// assert_eq!(clean_base(b'C', true), b'C');
/// ```
#[inline]
#[must_use]
pub fn clean_base(base: u8, conservative: bool) -> u8 {
    if is_ambiguity_code(base) || (conservative && base.is_ascii_lowercase()) {
        UNKNOWN_BASE
    } else {
        base.to_ascii_uppercase()
    }
}

/// Cleans a whole sequence; see the module documentation for the rules.
#[must_use]
pub fn clean_sequence(sequence: &[u8], conservative: bool) -> Vec<u8> {
    sequence.iter().map(|&base| clean_base(base, conservative)).collect()
}

/// Locus identifiers seen in each phased haplotype file of one individual.
///
/// Filled while cleaning and read-only afterwards. Unphased records are never recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocusSets {
    hap0: BTreeSet<String>,
    hap1: BTreeSet<String>,
}

impl LocusSets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a locus under a haplotype. Returns false for unphased input or a locus that
    /// was already recorded for that haplotype.
    pub fn insert(&mut self, haplotype: Haplotype, locus: &str) -> bool {
        match haplotype {
            Haplotype::Zero => self.hap0.insert(locus.to_string()),
            Haplotype::One => self.hap1.insert(locus.to_string()),
            Haplotype::Unphased => false,
        }
    }

    /// The loci recorded for a phased haplotype, `None` for unphased.
    #[must_use]
    pub fn loci(&self, haplotype: Haplotype) -> Option<&BTreeSet<String>> {
        match haplotype {
            Haplotype::Zero => Some(&self.hap0),
            Haplotype::One => Some(&self.hap1),
            Haplotype::Unphased => None,
        }
    }

    /// Loci present in both haplotypes.
    #[must_use]
    pub fn balanced(&self) -> BTreeSet<String> {
        self.hap0.intersection(&self.hap1).cloned().collect()
    }

    /// Number of loci recorded only for the given phased haplotype.
    #[must_use]
    pub fn unmatched(&self, haplotype: Haplotype) -> usize {
        match haplotype {
            Haplotype::Zero => self.hap0.difference(&self.hap1).count(),
            Haplotype::One => self.hap1.difference(&self.hap0).count(),
            Haplotype::Unphased => 0,
        }
    }
}

/// Rewrites consensus FASTA files according to the cleaning rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceCleaner {
    conservative: bool,
}

impl SequenceCleaner {
    #[must_use]
    pub fn new(conservative: bool) -> Self {
        Self { conservative }
    }

    /// Returns a copy of the record with a cleaned sequence and the original header.
    #[must_use]
    pub fn clean_record(&self, record: &fasta::Record) -> fasta::Record {
        let cleaned = clean_sequence(record.sequence().as_ref(), self.conservative);
        fasta::Record::new(record.definition().clone(), fasta::record::Sequence::from(cleaned))
    }

    /// Cleans one file, recording phased loci into `loci`. Returns the number of records.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read or the output cannot be written.
    pub fn clean_file(
        &self,
        input: &Path,
        output: &Path,
        haplotype: Haplotype,
        loci: &mut LocusSets,
    ) -> Result<u64> {
        let mut reader = open_fasta(input)?;
        let mut writer = FastaWriter::create(output)?;

        for result in reader.records() {
            let record = result
                .with_context(|| format!("Failed to parse FASTA record in {}", input.display()))?;
            let locus = record_name(&record).with_context(|| format!("In {}", input.display()))?;
            loci.insert(haplotype, locus);
            writer
                .write_record(&self.clean_record(&record))
                .with_context(|| format!("Failed to write FASTA: {}", output.display()))?;
        }

        let count = writer.records();
        writer.finish().with_context(|| format!("Failed to flush FASTA: {}", output.display()))?;
        Ok(count)
    }

    /// Cleans all three consensus files of one individual into `outputs`.
    ///
    /// All inputs are checked for existence before any file is written.
    ///
    /// # Errors
    /// Returns [`crate::errors::HapbalError::MissingFile`] if an input is absent, or an I/O
    /// error from reading or writing.
    pub fn clean_individual(
        &self,
        inputs: &HaplotypeFiles,
        outputs: &HaplotypeFiles,
        logger: &StageLogger,
    ) -> Result<LocusSets> {
        validate_files_exist(&[
            (&inputs.hap0, "Haplotype 0 consensus FASTA"),
            (&inputs.hap1, "Haplotype 1 consensus FASTA"),
            (&inputs.unphased, "Unphased consensus FASTA"),
        ])?;

        let mode = if self.conservative { "conservative" } else { "permissive" };
        let timer = logger.stage(&format!("Cleaning consensus sequences ({mode})"));

        let mut loci = LocusSets::new();
        let mut total = 0;
        for (haplotype, input) in inputs.iter() {
            let output = outputs.get(haplotype);
            let count = self.clean_file(input, output, haplotype, &mut loci)?;
            logger.debug(format_args!(
                "Cleaned {count} {haplotype} records: {} -> {}",
                input.display(),
                output.display()
            ));
            total += count;
        }

        timer.log_completion(total, "records");
        Ok(loci)
    }
}
