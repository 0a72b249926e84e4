//! Run the whole pipeline for every configured individual.

use anyhow::{Context, Result};
use clap::Parser;
use hapbal_lib::config::IniConfig;
use hapbal_lib::logging::{StageLogger, format_count};
use hapbal_lib::pipeline::PhasingPipeline;
use hapbal_lib::resolver::resolve_individuals;
use hapbal_lib::tools::SamtoolsToolkit;
use hapbal_lib::validation::{validate_file_exists, validate_output_absent, validate_positive};
use log::info;
use std::fs;
use std::path::PathBuf;

use crate::commands::command::Command;
use crate::commands::common::{CleaningOptions, ToolOptions};

/// Phase alignments and produce balanced allele sequences for all individuals.
#[derive(Debug, Parser)]
#[command(
    name = "phase",
    about = "\x1b[38;5;72m[PIPELINE]\x1b[0m       \x1b[36mPhase, call, clean, balance and merge all individuals\x1b[0m",
    long_about = r#"
Phase the alignment of every configured individual into two haplotypes, call a consensus
sequence for each haplotype and for the unphased alignment, clean and balance the consensus
sequences, and interleave the balanced alleles of all individuals into one FASTA.

The configuration file is INI-style. [references] maps each individual to its reference
FASTA; individuals are processed in the order listed there. An optional [individuals]
section may list identifiers, each of which must have a reference entry:

  [references]
  bird1 = /refs/bird1.fasta
  bird2 = /refs/bird2.fasta

Alignments are looked up as BAMS/<individual>/<individual>-CL-RG-MD-M.bam, falling back to
BAMS/<individual>/<individual>-CL-RG-MD.bam.

The output directory must not exist. It receives one directory per individual with the
intermediate files, and a 'fastas' directory holding links to every balanced file,
balance_metrics.txt and joined_allele_sequences_all_samples.fasta.

Requires samtools, bcftools, vcfutils.pl and seqtk (see the tool path options).

EXAMPLES:

  hapbal phase -c phasing.conf -b alignments/ -o phased/ -@ 8
  hapbal phase -c phasing.conf -b alignments/ -o phased/ --conservative
"#
)]
pub struct Phase {
    /// INI-style configuration with a [references] section.
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    /// Directory containing one sub-directory of alignments per individual.
    #[arg(short = 'b', long = "bams")]
    pub bams: PathBuf,

    /// Output directory (must not exist).
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Cores passed to samtools sort.
    #[arg(short = '@', short_alias = 't', long = "cores", default_value = "1")]
    pub cores: usize,

    #[command(flatten)]
    pub cleaning: CleaningOptions,

    #[command(flatten)]
    pub tools: ToolOptions,
}

impl Command for Phase {
    fn execute(&self, command_line: &str) -> Result<()> {
        validate_positive(self.cores, "cores")?;
        validate_file_exists(&self.config, "Configuration file")?;
        validate_output_absent(&self.output, "output")?;

        let config = IniConfig::from_path(&self.config)?;
        let individuals = resolve_individuals(&config, &self.bams)?;

        let logger = StageLogger::new("phase");
        info!("Command line: {command_line}");
        info!("Configuration: {}", self.config.display());
        info!("Alignments: {}", self.bams.display());
        info!("Output: {}", self.output.display());
        info!("Cores: {}", self.cores);
        info!("Cleaning mode: {}", self.cleaning.mode());
        info!(
            "Individuals ({}): {}",
            individuals.len(),
            individuals.iter().map(|i| i.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create output directory: {}", self.output.display()))?;

        let timer = logger.stage("Processing individuals");
        let toolkit = SamtoolsToolkit::new(self.tools.to_paths(), self.cores, logger.clone());
        let pipeline =
            PhasingPipeline::new(toolkit, &self.output, self.cleaning.conservative, logger);
        let summary = pipeline.run(&individuals)?;
        timer.log_completion(summary.metrics.len() as u64, "individuals");

        info!(
            "Wrote {} balanced records to {}",
            format_count(summary.merge.total_records()),
            summary.merged_fasta.display()
        );
        Ok(())
    }
}
