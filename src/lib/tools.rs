//! Driving the external alignment and consensus tools.
//!
//! Phasing, sorting, consensus calling and FASTQ conversion are delegated to `samtools`,
//! `bcftools`, `vcfutils.pl` and `seqtk`. [`ExternalTools`] is the seam between the pipeline
//! and those programs; [`SamtoolsToolkit`] is the implementation that actually spawns them.
//!
//! Every invocation blocks until all processes of its pipeline have exited. Standard error of
//! each process is captured to an anonymous temporary file and attached to the
//! [`HapbalError::ExternalTool`] raised when that process exits unsuccessfully.

use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::errors::HapbalError;
use crate::logging::StageLogger;

/// Minimum base quality passed to `samtools phase -Q`.
pub const PHASE_MIN_BASE_QUALITY: u8 = 20;

/// The two haplotype alignments written by a phasing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasedAlignments {
    pub hap0: PathBuf,
    pub hap1: PathBuf,
}

impl PhasedAlignments {
    /// Paths `samtools phase -b {prefix}` writes to.
    #[must_use]
    pub fn for_prefix(prefix: &Path) -> Self {
        Self { hap0: with_suffix(prefix, ".0.bam"), hap1: with_suffix(prefix, ".1.bam") }
    }
}

/// Appends `suffix` to the final component of `path`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Operations the pipeline needs from the outside world.
pub trait ExternalTools {
    /// Splits `alignment` into two haplotype alignments named after `prefix`.
    fn phase(&self, alignment: &Path, prefix: &Path) -> Result<PhasedAlignments>;

    /// Coordinate-sorts `alignment` into `output`.
    fn sort(&self, alignment: &Path, output: &Path) -> Result<()>;

    /// Calls a consensus FASTQ for `alignment` against `reference`.
    fn call_consensus(&self, alignment: &Path, reference: &Path, output: &Path) -> Result<()>;

    /// Converts a (possibly multi-line) FASTQ into FASTA.
    fn fastq_to_fasta(&self, fastq: &Path, fasta: &Path) -> Result<()>;
}

/// Executables used by [`SamtoolsToolkit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub samtools: PathBuf,
    pub bcftools: PathBuf,
    pub vcfutils: PathBuf,
    pub seqtk: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            samtools: PathBuf::from("samtools"),
            bcftools: PathBuf::from("bcftools"),
            vcfutils: PathBuf::from("vcfutils.pl"),
            seqtk: PathBuf::from("seqtk"),
        }
    }
}

/// A single process invocation.
#[derive(Debug, Clone)]
struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    fn new(program: &Path) -> Self {
        Self { program: program.to_path_buf(), args: Vec::new() }
    }

    fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, Self::arg)
    }

    /// Short name for error messages, e.g. `bcftools`.
    fn name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

struct RunningStage<'a> {
    command: &'a ToolCommand,
    child: Child,
    stderr: File,
}

fn read_stderr(file: &mut File) -> String {
    let mut text = String::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.read_to_string(&mut text);
    }
    text.trim().to_string()
}

/// Spawns one stage reading from `upstream`. Its stdout is piped when `piped` is set, otherwise
/// it goes to `stdout` if given and is discarded if not.
fn spawn_stage<'a>(
    stage: &'a ToolCommand,
    upstream: Option<ChildStdout>,
    piped: bool,
    stdout: Option<&Path>,
) -> Result<RunningStage<'a>> {
    let stderr = tempfile::tempfile().context("Failed to create stderr capture file")?;
    let mut command = Command::new(&stage.program);
    command.args(&stage.args).stderr(stderr.try_clone()?);

    match upstream {
        Some(pipe) => command.stdin(pipe),
        None => command.stdin(Stdio::null()),
    };

    if piped {
        command.stdout(Stdio::piped());
    } else if let Some(path) = stdout {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        command.stdout(file);
    } else {
        command.stdout(Stdio::null());
    }

    let child = command
        .spawn()
        .with_context(|| format!("Failed to start '{}'", stage.program.display()))?;
    Ok(RunningStage { command: stage, child, stderr })
}

/// Kills and reaps stages that were started before a later stage failed to start.
fn abort_stages(running: Vec<RunningStage<'_>>) {
    for mut stage in running {
        let _ = stage.child.kill();
        let _ = stage.child.wait();
    }
}

/// Runs `stages` as a shell-style pipeline, each stage's stdout feeding the next stage's
/// stdin. The final stage's stdout goes to `stdout` if given, otherwise it is discarded.
fn run_pipeline(stages: &[ToolCommand], stdout: Option<&Path>, logger: &StageLogger) -> Result<()> {
    logger.debug(format_args!(
        "Running: {}",
        stages.iter().map(ToolCommand::command_line).collect::<Vec<_>>().join(" | ")
    ));

    let mut running: Vec<RunningStage<'_>> = Vec::with_capacity(stages.len());
    let mut upstream: Option<ChildStdout> = None;

    for (index, stage) in stages.iter().enumerate() {
        let piped = index + 1 < stages.len();
        match spawn_stage(stage, upstream.take(), piped, stdout) {
            Ok(mut spawned) => {
                upstream = spawned.child.stdout.take();
                running.push(spawned);
            }
            Err(error) => {
                abort_stages(running);
                return Err(error);
            }
        }
    }

    let mut failure: Option<HapbalError> = None;
    for mut stage in running {
        let status = stage
            .child
            .wait()
            .with_context(|| format!("Failed to wait for '{}'", stage.command.name()))?;
        if !status.success() && failure.is_none() {
            failure = Some(HapbalError::ExternalTool {
                tool: stage.command.name(),
                status: status.to_string(),
                stderr: read_stderr(&mut stage.stderr),
            });
        }
    }

    match failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Fails unless a tool actually produced `path`.
fn expect_output(command: &ToolCommand, path: &Path) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(HapbalError::ExternalTool {
        tool: command.name(),
        status: "exit status: 0".to_string(),
        stderr: format!("expected output '{}' was not created", path.display()),
    }
    .into())
}

/// [`ExternalTools`] backed by samtools, bcftools, vcfutils.pl and seqtk.
#[derive(Debug, Clone)]
pub struct SamtoolsToolkit {
    paths: ToolPaths,
    cores: usize,
    logger: StageLogger,
}

impl SamtoolsToolkit {
    #[must_use]
    pub fn new(paths: ToolPaths, cores: usize, logger: StageLogger) -> Self {
        Self { paths, cores, logger }
    }

    fn phase_command(&self, alignment: &Path, prefix: &Path) -> ToolCommand {
        ToolCommand::new(&self.paths.samtools)
            .args(["phase", "-A", "-F", "-Q"])
            .arg(PHASE_MIN_BASE_QUALITY.to_string())
            .arg("-b")
            .arg(prefix)
            .arg(alignment)
    }

    fn sort_command(&self, alignment: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.paths.samtools)
            .args(["sort", "-@"])
            .arg(self.cores.to_string())
            .arg("-o")
            .arg(output)
            .arg(alignment)
    }

    fn consensus_commands(&self, alignment: &Path, reference: &Path) -> Vec<ToolCommand> {
        vec![
            ToolCommand::new(&self.paths.bcftools)
                .args(["mpileup", "-Ou", "-f"])
                .arg(reference)
                .arg(alignment),
            ToolCommand::new(&self.paths.bcftools).args(["call", "-c"]),
            ToolCommand::new(&self.paths.vcfutils).arg("vcf2fq"),
        ]
    }

    fn fasta_command(&self, fastq: &Path) -> ToolCommand {
        ToolCommand::new(&self.paths.seqtk).args(["seq", "-a"]).arg(fastq)
    }
}

impl ExternalTools for SamtoolsToolkit {
    fn phase(&self, alignment: &Path, prefix: &Path) -> Result<PhasedAlignments> {
        let command = self.phase_command(alignment, prefix);
        let report = with_suffix(prefix, ".phase.txt");
        run_pipeline(std::slice::from_ref(&command), Some(&report), &self.logger)?;

        let phased = PhasedAlignments::for_prefix(prefix);
        expect_output(&command, &phased.hap0)?;
        expect_output(&command, &phased.hap1)?;
        Ok(phased)
    }

    fn sort(&self, alignment: &Path, output: &Path) -> Result<()> {
        let command = self.sort_command(alignment, output);
        run_pipeline(std::slice::from_ref(&command), None, &self.logger)?;
        expect_output(&command, output)
    }

    fn call_consensus(&self, alignment: &Path, reference: &Path, output: &Path) -> Result<()> {
        let commands = self.consensus_commands(alignment, reference);
        run_pipeline(&commands, Some(output), &self.logger)?;
        match commands.last() {
            Some(last) => expect_output(last, output),
            None => Ok(()),
        }
    }

    fn fastq_to_fasta(&self, fastq: &Path, fasta: &Path) -> Result<()> {
        let command = self.fasta_command(fastq);
        run_pipeline(std::slice::from_ref(&command), Some(fasta), &self.logger)?;
        expect_output(&command, fasta)
    }
}
