//! Clean and balance the consensus sequences of a single individual.
//!
//! This is the per-individual half of `phase` for consensus FASTA files that were produced
//! elsewhere.

use anyhow::{Context, Result};
use clap::Parser;
use hapbal_lib::errors::HapbalError;
use hapbal_lib::haplotype::HaplotypeFiles;
use hapbal_lib::logging::StageLogger;
use hapbal_lib::metrics::write_metrics_auto;
use hapbal_lib::pipeline::{BALANCED_SUFFIX, CLEANED_SUFFIX, process_consensus};
use log::info;
use std::fs;
use std::path::PathBuf;

use crate::commands::command::Command;
use crate::commands::common::CleaningOptions;

/// Clean and balance one individual's consensus FASTA files.
#[derive(Debug, Parser)]
#[command(
    name = "balance",
    about = "\x1b[38;5;173m[BALANCE]\x1b[0m        \x1b[36mClean and balance one individual's consensus FASTAs\x1b[0m",
    long_about = r#"
Clean the haplotype 0, haplotype 1 and unphased consensus FASTA files of one individual,
then keep only the loci present in both haplotypes.

The haplotype of each input is taken from its file name: '<name>.0.<ext>' is haplotype 0,
'<name>.1.<ext>' is haplotype 1 and anything else is the unphased consensus. Exactly one
file of each kind must be given.

Cleaning replaces the ambiguity codes R, Y, K, M, S and W (in either case) with N and
uppercases all other bases. With --conservative, lowercase bases are masked to N instead.

Outputs written to the output directory:

  <name>.0.cleaned.fasta, <name>.1.cleaned.fasta, <name>.cleaned.fasta
  <name>.0.balanced.fasta  headers '<locus>_0 |<locus>_phased'
  <name>.1.balanced.fasta  headers '<locus>_1 |<locus>_phased'
  <name>.balanced.fasta    headers '<locus> |<locus>_hom' (every unphased record)

EXAMPLES:

  hapbal balance -n bird1 -i bird1.0.fasta bird1.1.fasta bird1.fasta -o balanced/
"#
)]
pub struct Balance {
    /// Identifier of the individual, used to name the outputs.
    #[arg(short = 'n', long = "name")]
    pub name: String,

    /// The three consensus FASTA files (haplotype 0, haplotype 1, unphased) in any order.
    #[arg(short = 'i', long = "inputs", num_args = 3, required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory; created if absent.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Optional TSV file for the balance metrics of this individual.
    #[arg(short = 'm', long = "metrics")]
    pub metrics: Option<PathBuf>,

    #[command(flatten)]
    pub cleaning: CleaningOptions,
}

impl Balance {
    /// Rejects runs that would overwrite one of their own inputs.
    fn check_outputs_distinct(&self, consensus: &HaplotypeFiles) -> Result<()> {
        for suffix in [CLEANED_SUFFIX, BALANCED_SUFFIX] {
            let outputs = HaplotypeFiles::in_dir(&self.output, &self.name, suffix);
            for (_, output) in outputs.iter() {
                if consensus.iter().any(|(_, input)| input == output) {
                    return Err(HapbalError::InvalidParameter {
                        parameter: "output".to_string(),
                        reason: format!("would overwrite input '{}'", output.display()),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

impl Command for Balance {
    fn execute(&self, _command_line: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HapbalError::InvalidParameter {
                parameter: "name".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        let consensus = HaplotypeFiles::from_paths(&self.inputs, "inputs")?;
        self.check_outputs_distinct(&consensus)?;

        info!("Individual: {}", self.name);
        for (haplotype, path) in consensus.iter() {
            info!("Input ({haplotype}): {}", path.display());
        }
        info!("Output: {}", self.output.display());
        info!("Cleaning mode: {}", self.cleaning.mode());

        fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create output directory: {}", self.output.display()))?;

        let logger = StageLogger::new("balance").for_individual(&self.name);
        let processed = process_consensus(
            &self.name,
            &consensus,
            &self.output,
            self.cleaning.conservative,
            &logger,
        )?;

        if let Some(path) = &self.metrics {
            write_metrics_auto(path, std::slice::from_ref(&processed.metric))?;
            info!("Wrote balance metrics: {}", path.display());
        }
        Ok(())
    }
}
