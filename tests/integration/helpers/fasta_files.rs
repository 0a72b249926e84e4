//! FASTA fixtures and a runner for the compiled binary.

#![allow(dead_code)]

use hapbal_lib::balancer::balanced_header;
use hapbal_lib::fasta::{new_record, read_fasta, record_description, record_name, write_fasta};
use hapbal_lib::haplotype::Haplotype;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Runs the hapbal binary with `args`, capturing its output.
pub fn run_hapbal<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_hapbal"))
        .args(args)
        .output()
        .expect("Failed to run hapbal")
}

/// A path as a command-line argument.
pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("Test paths are valid UTF-8")
}

/// Writes a consensus FASTA whose records are named by `loci`.
pub fn write_consensus(path: &Path, loci: &[&str], sequence: &[u8]) -> PathBuf {
    let records: Vec<_> =
        loci.iter().map(|locus| new_record(locus, Some("vcf2fq"), sequence.to_vec())).collect();
    write_fasta(path, &records).expect("Failed to write consensus FASTA");
    path.to_path_buf()
}

/// Writes a balanced haplotype file for `loci`.
pub fn write_balanced(path: &Path, loci: &[&str], haplotype: Haplotype) -> PathBuf {
    let records: Vec<_> = loci
        .iter()
        .map(|locus| {
            let (name, description) = balanced_header(locus, haplotype);
            new_record(&name, Some(&description), b"ACGTN".to_vec())
        })
        .collect();
    write_fasta(path, &records).expect("Failed to write balanced FASTA");
    path.to_path_buf()
}

/// `(name, description, sequence)` of every record in a FASTA file.
pub fn read_records(path: &Path) -> Vec<(String, Option<String>, String)> {
    read_fasta(path)
        .expect("Failed to read FASTA")
        .iter()
        .map(|record| {
            (
                record_name(record).expect("Invalid record name").to_string(),
                record_description(record).expect("Invalid description").map(str::to_string),
                String::from_utf8_lossy(record.sequence().as_ref()).into_owned(),
            )
        })
        .collect()
}

/// Record names of a FASTA file.
pub fn read_names(path: &Path) -> Vec<String> {
    read_records(path).into_iter().map(|(name, _, _)| name).collect()
}
