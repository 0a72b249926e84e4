//! Options shared across commands.
//!
//! These are composed into command structs with `#[command(flatten)]`.

use std::path::PathBuf;

use clap::Args;

use hapbal_lib::tools::ToolPaths;

/// Sequence cleaning options.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct CleaningOptions {
    /// Also mask lowercase (low-confidence) bases as N instead of uppercasing them
    #[arg(long = "conservative", default_value = "false")]
    pub conservative: bool,
}

impl CleaningOptions {
    #[must_use]
    pub fn mode(&self) -> &'static str {
        if self.conservative { "conservative" } else { "permissive" }
    }
}

/// Locations of the external programs used for phasing and consensus calling.
#[derive(Debug, Clone, Args)]
pub struct ToolOptions {
    /// samtools executable
    #[arg(long = "samtools", default_value = "samtools")]
    pub samtools: PathBuf,

    /// bcftools executable
    #[arg(long = "bcftools", default_value = "bcftools")]
    pub bcftools: PathBuf,

    /// vcfutils.pl script (ships with bcftools)
    #[arg(long = "vcfutils", default_value = "vcfutils.pl")]
    pub vcfutils: PathBuf,

    /// seqtk executable
    #[arg(long = "seqtk", default_value = "seqtk")]
    pub seqtk: PathBuf,
}

impl Default for ToolOptions {
    fn default() -> Self {
        let paths = ToolPaths::default();
        Self {
            samtools: paths.samtools,
            bcftools: paths.bcftools,
            vcfutils: paths.vcfutils,
            seqtk: paths.seqtk,
        }
    }
}

impl ToolOptions {
    #[must_use]
    pub fn to_paths(&self) -> ToolPaths {
        ToolPaths {
            samtools: self.samtools.clone(),
            bcftools: self.bcftools.clone(),
            vcfutils: self.vcfutils.clone(),
            seqtk: self.seqtk.clone(),
        }
    }
}
