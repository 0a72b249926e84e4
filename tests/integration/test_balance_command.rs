//! Integration tests for the balance command.

use std::fs;
use tempfile::TempDir;

use crate::helpers::{path_str, read_records, run_hapbal, write_consensus};

#[test]
fn test_balance_writes_three_balanced_files() {
    let dir = TempDir::new().unwrap();
    let unphased = write_consensus(&dir.path().join("lizard.fasta"), &["a", "b", "c", "d"], b"acgtk");
    let hap1 = write_consensus(&dir.path().join("lizard.1.fasta"), &["b", "c", "d"], b"acgtk");
    let hap0 = write_consensus(&dir.path().join("lizard.0.fasta"), &["a", "b", "c"], b"acgtk");
    let output = dir.path().join("balanced");

    let result = run_hapbal([
        "balance",
        "--name",
        "lizard",
        "--inputs",
        path_str(&unphased),
        path_str(&hap1),
        path_str(&hap0),
        "--output",
        path_str(&output),
    ]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let hap0 = read_records(&output.join("lizard.0.balanced.fasta"));
    assert_eq!(
        hap0,
        vec![
            ("b_0".to_string(), Some("|b_phased".to_string()), "ACGTN".to_string()),
            ("c_0".to_string(), Some("|c_phased".to_string()), "ACGTN".to_string()),
        ]
    );
    let hap1 = read_records(&output.join("lizard.1.balanced.fasta"));
    assert_eq!(hap1.iter().map(|r| r.0.as_str()).collect::<Vec<_>>(), vec!["b_1", "c_1"]);

    let unphased = read_records(&output.join("lizard.balanced.fasta"));
    assert_eq!(unphased.len(), 4);
    assert_eq!(unphased[3].1.as_deref(), Some("|d_hom"));

    let cleaned = fs::read_to_string(output.join("lizard.cleaned.fasta")).unwrap();
    assert!(cleaned.starts_with(">a vcf2fq\nACGTN\n"), "{cleaned}");
}

#[test]
fn test_balance_requires_three_inputs() {
    let dir = TempDir::new().unwrap();
    let hap0 = write_consensus(&dir.path().join("x.0.fasta"), &["a"], b"A");
    let result = run_hapbal([
        "balance",
        "-n",
        "x",
        "-i",
        path_str(&hap0),
        "-o",
        path_str(dir.path()),
    ]);
    assert!(!result.status.success());
}
