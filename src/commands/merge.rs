//! Interleave balanced haplotype files of several individuals into one FASTA.

use anyhow::Result;
use clap::Parser;
use hapbal_lib::logging::{StageLogger, format_count};
use hapbal_lib::merger::{BalancedManifest, BalancedPair, merge_manifest};
use hapbal_lib::validation::{validate_files_exist, validate_same_length};
use log::info;
use std::path::{Path, PathBuf};

use crate::commands::command::Command;

/// Merge balanced allele files across individuals.
#[derive(Debug, Parser)]
#[command(
    name = "merge",
    about = "\x1b[38;5;173m[BALANCE]\x1b[0m        \x1b[36mInterleave balanced haplotype files of many individuals\x1b[0m",
    long_about = r#"
Interleave balanced haplotype 0 and haplotype 1 files into a single FASTA in which every
haplotype 0 record is immediately followed by its haplotype 1 partner.

The i-th --hap0 file is paired with the i-th --hap1 file. Paired records must carry the same
locus in their '|<locus>_phased' annotation and both files must hold the same number of
records; otherwise the merge fails and no output is written.

Individual names default to the file name up to the first '.'.

EXAMPLES:

  hapbal merge \
    --hap0 bird1.0.balanced.fasta bird2.0.balanced.fasta \
    --hap1 bird1.1.balanced.fasta bird2.1.balanced.fasta \
    -o joined_allele_sequences_all_samples.fasta
"#
)]
pub struct Merge {
    /// Balanced haplotype 0 files, one per individual.
    #[arg(long = "hap0", num_args = 1.., required = true)]
    pub hap0: Vec<PathBuf>,

    /// Balanced haplotype 1 files, in the same order as --hap0.
    #[arg(long = "hap1", num_args = 1.., required = true)]
    pub hap1: Vec<PathBuf>,

    /// Individual names, in the same order as --hap0.
    #[arg(short = 'n', long = "names", num_args = 1..)]
    pub names: Vec<String>,

    /// Output FASTA file.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

/// Default individual name for a balanced file: its file name up to the first `.`.
fn individual_from_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .unwrap_or_else(|| path.display().to_string())
}

impl Merge {
    fn manifest(&self) -> Result<BalancedManifest> {
        validate_same_length(&self.hap0, &self.hap1, "hap0", "hap1")?;
        if !self.names.is_empty() {
            validate_same_length(&self.hap0, &self.names, "hap0", "names")?;
        }

        let mut files: Vec<(&PathBuf, &str)> = Vec::with_capacity(self.hap0.len() * 2);
        files.extend(self.hap0.iter().map(|p| (p, "Balanced haplotype 0 FASTA")));
        files.extend(self.hap1.iter().map(|p| (p, "Balanced haplotype 1 FASTA")));
        validate_files_exist(&files)?;

        Ok(self
            .hap0
            .iter()
            .zip(&self.hap1)
            .enumerate()
            .map(|(i, (hap0, hap1))| {
                let name =
                    self.names.get(i).cloned().unwrap_or_else(|| individual_from_path(hap0));
                BalancedPair::new(name, hap0.clone(), hap1.clone())
            })
            .collect())
    }
}

impl Command for Merge {
    fn execute(&self, _command_line: &str) -> Result<()> {
        let manifest = self.manifest()?;
        info!("Merging {} individuals into {}", manifest.len(), self.output.display());

        let summary = merge_manifest(&manifest, &self.output, &StageLogger::new("merge"))?;
        info!(
            "Wrote {} records ({} locus pairs)",
            format_count(summary.total_records()),
            format_count(summary.total_pairs())
        );
        Ok(())
    }
}
