//! Integration tests for the merge command.

use hapbal_lib::haplotype::Haplotype;
use tempfile::TempDir;

use crate::helpers::{path_str, read_names, run_hapbal, write_balanced};

#[test]
fn test_merge_interleaves_individuals() {
    let dir = TempDir::new().unwrap();
    let a0 = write_balanced(&dir.path().join("a.0.balanced.fasta"), &["l1", "l2"], Haplotype::Zero);
    let a1 = write_balanced(&dir.path().join("a.1.balanced.fasta"), &["l1", "l2"], Haplotype::One);
    let b0 = write_balanced(&dir.path().join("b.0.balanced.fasta"), &["l3"], Haplotype::Zero);
    let b1 = write_balanced(&dir.path().join("b.1.balanced.fasta"), &["l3"], Haplotype::One);
    let output = dir.path().join("joined.fasta");

    let result = run_hapbal([
        "merge",
        "--hap0",
        path_str(&a0),
        path_str(&b0),
        "--hap1",
        path_str(&a1),
        path_str(&b1),
        "--output",
        path_str(&output),
    ]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    assert_eq!(read_names(&output), vec!["l1_0", "l1_1", "l2_0", "l2_1", "l3_0", "l3_1"]);
}

#[test]
fn test_merge_length_mismatch_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let a0 = write_balanced(&dir.path().join("a.0.balanced.fasta"), &["l1", "l2"], Haplotype::Zero);
    let a1 = write_balanced(&dir.path().join("a.1.balanced.fasta"), &["l1"], Haplotype::One);
    let output = dir.path().join("joined.fasta");

    let result = run_hapbal([
        "merge",
        "--hap0",
        path_str(&a0),
        "--hap1",
        path_str(&a1),
        "-o",
        path_str(&output),
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Unbalanced haplotype files for 'a'"), "{stderr}");
    assert!(!output.exists());
}
