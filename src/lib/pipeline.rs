//! End-to-end orchestration: phase, call consensus, clean, balance, then merge.
//!
//! Individuals are processed strictly one after another. Each gets a working directory
//! `{output}/{individual}/`; the shared `{output}/fastas/` directory collects links to every
//! balanced file, the balance metrics table and the merged allele FASTA.
//!
//! Any failure aborts the run and leaves the files produced so far in place.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::balancer::balance_individual;
use crate::cleaner::SequenceCleaner;
use crate::haplotype::{Haplotype, HaplotypeFiles};
use crate::logging::{StageLogger, format_count};
use crate::merger::{BalancedManifest, BalancedPair, MERGED_FILE_NAME, MergeSummary, merge_manifest};
use crate::metrics::{BalanceMetric, write_metrics};
use crate::resolver::Individual;
use crate::tools::ExternalTools;

/// Shared directory for balanced files, metrics and the merged output.
pub const FASTA_DIR: &str = "fastas";

/// Balance metrics table inside [`FASTA_DIR`].
pub const METRICS_FILE_NAME: &str = "balance_metrics.txt";

/// File suffixes of each processing step.
pub const CONSENSUS_FASTQ_SUFFIX: &str = "fastq";
pub const CONSENSUS_SUFFIX: &str = "fasta";
pub const CLEANED_SUFFIX: &str = "cleaned.fasta";
pub const BALANCED_SUFFIX: &str = "balanced.fasta";
pub const SORTED_ALIGNMENT_SUFFIX: &str = "sorted.bam";

/// Outcome of cleaning and balancing one individual.
#[derive(Debug, Clone)]
pub struct ProcessedIndividual {
    pub metric: BalanceMetric,
    pub balanced: HaplotypeFiles,
}

impl ProcessedIndividual {
    /// The balanced allele pair handed to the merger.
    #[must_use]
    pub fn pair(&self) -> BalancedPair {
        BalancedPair::new(
            self.metric.individual.clone(),
            self.balanced.hap0.clone(),
            self.balanced.hap1.clone(),
        )
    }
}

/// Cleans and balances the three consensus FASTA files of one individual.
///
/// Cleaned files are written as `{dir}/{name}[.0|.1].cleaned.fasta` and balanced files as
/// `{dir}/{name}[.0|.1].balanced.fasta`.
///
/// # Errors
/// Returns an error if an input is missing or any file cannot be read or written.
pub fn process_consensus(
    name: &str,
    consensus: &HaplotypeFiles,
    dir: &Path,
    conservative: bool,
    logger: &StageLogger,
) -> Result<ProcessedIndividual> {
    let cleaned = HaplotypeFiles::in_dir(dir, name, CLEANED_SUFFIX);
    let balanced = HaplotypeFiles::in_dir(dir, name, BALANCED_SUFFIX);

    let loci = SequenceCleaner::new(conservative).clean_individual(consensus, &cleaned, logger)?;
    let metric = balance_individual(name, &cleaned, &loci, &balanced, logger)?;
    Ok(ProcessedIndividual { metric, balanced })
}

/// Places a link to each balanced file in `dir`, replacing any previous link.
fn link_balanced_files(dir: &Path, files: &HaplotypeFiles) -> Result<()> {
    for (_, source) in files.iter() {
        let Some(file_name) = source.file_name() else {
            anyhow::bail!("Balanced file has no file name: {}", source.display());
        };
        let target = dir.join(file_name);
        if target.symlink_metadata().is_ok() {
            fs::remove_file(&target)
                .with_context(|| format!("Failed to replace {}", target.display()))?;
        }
        link_file(source, &target)?;
    }
    Ok(())
}

#[cfg(unix)]
fn link_file(source: &Path, target: &Path) -> Result<()> {
    let source = source
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", source.display()))?;
    std::os::unix::fs::symlink(&source, target)
        .with_context(|| format!("Failed to link {} -> {}", target.display(), source.display()))
}

#[cfg(not(unix))]
fn link_file(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target)
        .map(|_| ())
        .with_context(|| format!("Failed to copy {} to {}", source.display(), target.display()))
}

/// Results of a complete run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub metrics: Vec<BalanceMetric>,
    pub merge: MergeSummary,
    pub merged_fasta: PathBuf,
}

/// Drives every individual through the external tools and the balancing steps.
pub struct PhasingPipeline<T: ExternalTools> {
    tools: T,
    output: PathBuf,
    conservative: bool,
    logger: StageLogger,
}

impl<T: ExternalTools> PhasingPipeline<T> {
    pub fn new(tools: T, output: impl Into<PathBuf>, conservative: bool, logger: StageLogger) -> Self {
        Self { tools, output: output.into(), conservative, logger }
    }

    /// The shared output directory for balanced files and merged results.
    #[must_use]
    pub fn fasta_dir(&self) -> PathBuf {
        self.output.join(FASTA_DIR)
    }

    /// Phases, calls consensus for, cleans and balances one individual.
    ///
    /// # Errors
    /// Returns the first tool, validation or I/O error encountered.
    pub fn process_individual(&self, individual: &Individual) -> Result<ProcessedIndividual> {
        let name = individual.name.as_str();
        let logger = self.logger.for_individual(name);
        let dir = self.output.join(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let timer = logger.stage("Phasing alignment");
        let phased = self.tools.phase(&individual.alignment, &dir.join(name))?;
        let alignments = HaplotypeFiles {
            hap0: dir.join(Haplotype::Zero.file_name(name, SORTED_ALIGNMENT_SUFFIX)),
            hap1: dir.join(Haplotype::One.file_name(name, SORTED_ALIGNMENT_SUFFIX)),
            unphased: individual.alignment.clone(),
        };
        self.tools.sort(&phased.hap0, &alignments.hap0)?;
        self.tools.sort(&phased.hap1, &alignments.hap1)?;
        timer.log_completion(2, "haplotype alignments");

        let timer = logger.stage("Calling consensus sequences");
        let fastq = HaplotypeFiles::in_dir(&dir, name, CONSENSUS_FASTQ_SUFFIX);
        let consensus = HaplotypeFiles::in_dir(&dir, name, CONSENSUS_SUFFIX);
        for (haplotype, alignment) in alignments.iter() {
            let raw = fastq.get(haplotype);
            self.tools.call_consensus(alignment, &individual.reference, raw)?;
            self.tools.fastq_to_fasta(raw, consensus.get(haplotype))?;
        }
        timer.log_completion(3, "consensus files");

        process_consensus(name, &consensus, &dir, self.conservative, &logger)
    }

    /// Processes every individual, then writes metrics and the merged allele FASTA.
    ///
    /// # Errors
    /// Returns the first error encountered; later individuals are not processed.
    pub fn run(&self, individuals: &[Individual]) -> Result<RunSummary> {
        let fasta_dir = self.fasta_dir();
        fs::create_dir_all(&fasta_dir)
            .with_context(|| format!("Failed to create directory: {}", fasta_dir.display()))?;

        let mut manifest = BalancedManifest::new();
        let mut metrics = Vec::with_capacity(individuals.len());
        for (index, individual) in individuals.iter().enumerate() {
            self.logger.info(format_args!(
                "Processing individual {}/{}: {}",
                index + 1,
                individuals.len(),
                individual.name
            ));
            let processed = self.process_individual(individual)?;
            link_balanced_files(&fasta_dir, &processed.balanced)?;
            manifest.push(processed.pair());
            metrics.push(processed.metric);
        }

        let metrics_path = fasta_dir.join(METRICS_FILE_NAME);
        write_metrics(&metrics_path, &metrics, "balance")?;
        self.logger.info(format_args!("Wrote balance metrics: {}", metrics_path.display()));

        let merged_fasta = fasta_dir.join(MERGED_FILE_NAME);
        let merge = merge_manifest(&manifest, &merged_fasta, &self.logger)?;
        self.logger.info(format_args!(
            "Merged {} locus pairs from {} individuals into {}",
            format_count(merge.total_pairs()),
            manifest.len(),
            merged_fasta.display()
        ));

        Ok(RunSummary { metrics, merge, merged_fasta })
    }
}
