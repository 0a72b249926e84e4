//! Integration tests for the phase command.

use std::fs;
use tempfile::TempDir;

use crate::helpers::fake_tools::write_project;
use crate::helpers::{path_str, read_names, run_hapbal};

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use crate::helpers::fake_tools::{FAKE_SEQUENCE, SHARED_LOCI, install_fake_tools};
    use crate::helpers::read_records;
    use std::path::Path;

    fn phase_args(config: &Path, bams: &Path, output: &Path, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "phase".to_string(),
            "--config".to_string(),
            config.display().to_string(),
            "--bams".to_string(),
            bams.display().to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| (*s).to_string()));
        args
    }

    #[test]
    fn test_two_individuals_end_to_end() {
        let dir = TempDir::new().unwrap();
        let tools = install_fake_tools(&dir.path().join("bin"), false);
        let (config, bams) = write_project(dir.path(), &["bird1", "bird2"]);
        let output = dir.path().join("phased");

        let mut args = phase_args(&config, &bams, &output, &["--cores", "2"]);
        args.extend(tools.args());
        let result = run_hapbal(&args);
        assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

        let merged = read_records(
            &output.join("fastas").join("joined_allele_sequences_all_samples.fasta"),
        );
        assert_eq!(merged.len(), 20);
        assert!(merged.iter().all(|(name, _, _)| !name.starts_with("only")));
        for (i, pair) in merged.chunks(2).enumerate() {
            let locus = SHARED_LOCI[i % SHARED_LOCI.len()];
            assert_eq!(pair[0].0, format!("{locus}_0"));
            assert_eq!(pair[1].0, format!("{locus}_1"));
            assert_eq!(pair[0].1.as_deref(), Some(format!("|{locus}_phased").as_str()));
            assert_eq!(pair[0].2, FAKE_SEQUENCE.to_uppercase().replace(['R', 'Y'], "N"));
        }

        for name in ["bird1", "bird2"] {
            let sample = output.join(name);
            for file in [
                format!("{name}.0.fasta"),
                format!("{name}.1.cleaned.fasta"),
                format!("{name}.balanced.fasta"),
                format!("{name}.0.sorted.bam"),
            ] {
                assert!(sample.join(&file).is_file(), "missing {file}");
            }
            let link = output.join("fastas").join(format!("{name}.1.balanced.fasta"));
            assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
            assert_eq!(read_names(&link).len(), SHARED_LOCI.len());

            let unphased = read_names(&output.join("fastas").join(format!("{name}.balanced.fasta")));
            assert_eq!(unphased.len(), SHARED_LOCI.len() + 2);
        }

        let metrics = fs::read_to_string(output.join("fastas").join("balance_metrics.txt")).unwrap();
        let lines: Vec<_> = metrics.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("individual\thap0_loci\thap1_loci\tbalanced_loci"));
        assert_eq!(lines[1], "bird1\t6\t6\t5\t1\t1\t7");
        assert_eq!(lines[2], "bird2\t6\t6\t5\t1\t1\t7");
    }

    #[test]
    fn test_conservative_masks_lowercase() {
        let dir = TempDir::new().unwrap();
        let tools = install_fake_tools(&dir.path().join("bin"), false);
        let (config, bams) = write_project(dir.path(), &["bird1", "bird2"]);
        let output = dir.path().join("phased");

        let mut args = phase_args(&config, &bams, &output, &["--conservative"]);
        args.extend(tools.args());
        assert!(run_hapbal(&args).status.success());

        let merged = read_records(
            &output.join("fastas").join("joined_allele_sequences_all_samples.fasta"),
        );
        assert!(merged.iter().all(|(_, _, sequence)| sequence == "ACGTNNANNN"));
    }

    #[test]
    fn test_tool_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let tools = install_fake_tools(&dir.path().join("bin"), true);
        let (config, bams) = write_project(dir.path(), &["bird1", "bird2"]);
        let output = dir.path().join("phased");

        let mut args = phase_args(&config, &bams, &output, &[]);
        args.extend(tools.args());
        let result = run_hapbal(&args);
        assert!(!result.status.success());

        let stderr = String::from_utf8_lossy(&result.stderr);
        assert!(stderr.contains("External tool 'samtools' failed"), "{stderr}");
        assert!(stderr.contains("EOF marker is absent"), "{stderr}");
        assert!(!output.join("fastas").join("joined_allele_sequences_all_samples.fasta").exists());
    }
}

#[test]
fn test_single_reference_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let (config, bams) = write_project(dir.path(), &["bird1"]);
    let output = dir.path().join("phased");

    let result = run_hapbal([
        "phase",
        "--config",
        path_str(&config),
        "--bams",
        path_str(&bams),
        "--output",
        path_str(&output),
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Configuration error"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn test_existing_output_is_refused() {
    let dir = TempDir::new().unwrap();
    let (config, bams) = write_project(dir.path(), &["bird1", "bird2"]);

    let result = run_hapbal([
        "phase",
        "-c",
        path_str(&config),
        "-b",
        path_str(&bams),
        "-o",
        path_str(dir.path()),
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("already exists"));
}
