//! Shell-script stand-ins for samtools, bcftools, vcfutils.pl and seqtk.
//!
//! The fake `samtools phase` writes `0` and `1` into the two haplotype alignments, and the
//! fake consensus caller emits five shared loci plus one locus unique to that haplotype
//! (`only-0` / `only-1`). The unphased alignment yields both unique loci.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Loci every fake consensus contains.
pub const SHARED_LOCI: [&str; 5] = ["uce-1", "uce-2", "uce-3", "uce-4", "uce-5"];

/// Sequence of every fake shared-locus record.
pub const FAKE_SEQUENCE: &str = "ACGTryAcgt";

const SAMTOOLS: &str = r#"#!/bin/sh
cmd="$1"; shift
case "$cmd" in
  phase)
    prefix=""
    while [ $# -gt 1 ]; do
      if [ "$1" = "-b" ]; then prefix="$2"; shift; fi
      shift
    done
    echo 0 > "$prefix.0.bam"
    echo 1 > "$prefix.1.bam"
    echo "phased $1"
    ;;
  sort)
    out=""
    while [ $# -gt 1 ]; do
      if [ "$1" = "-o" ]; then out="$2"; shift; fi
      shift
    done
    cp "$1" "$out"
    ;;
  *)
    echo "unexpected samtools command: $cmd" >&2
    exit 1
    ;;
esac
"#;

const FAILING_SAMTOOLS: &str = r#"#!/bin/sh
echo "[bam_header_read] EOF marker is absent" >&2
exit 2
"#;

const BCFTOOLS: &str = r#"#!/bin/sh
case "$1" in
  mpileup) for last; do :; done; cat "$last" ;;
  call) cat ;;
  *) exit 1 ;;
esac
"#;

const VCFUTILS: &str = r#"#!/bin/sh
[ "$1" = "vcf2fq" ] || exit 1
tag=$(cat | tr -d '[:space:]')
for locus in uce-1 uce-2 uce-3 uce-4 uce-5; do
  printf '>%s\nACGTryAcgt\n' "$locus"
done
case "$tag" in
  0) printf '>only-0\nAAAA\n' ;;
  1) printf '>only-1\nCCCC\n' ;;
  *) printf '>only-0\nAAAA\n>only-1\nCCCC\n' ;;
esac
"#;

const SEQTK: &str = r#"#!/bin/sh
[ "$1" = "seq" ] && [ "$2" = "-a" ] || exit 1
cat "$3"
"#;

/// Paths of the installed fake tools.
pub struct FakeTools {
    pub samtools: PathBuf,
    pub bcftools: PathBuf,
    pub vcfutils: PathBuf,
    pub seqtk: PathBuf,
}

impl FakeTools {
    /// The `--samtools ... --seqtk ...` arguments selecting these tools.
    pub fn args(&self) -> Vec<String> {
        vec![
            "--samtools".to_string(),
            self.samtools.display().to_string(),
            "--bcftools".to_string(),
            self.bcftools.display().to_string(),
            "--vcfutils".to_string(),
            self.vcfutils.display().to_string(),
            "--seqtk".to_string(),
            self.seqtk.display().to_string(),
        ]
    }
}

#[cfg(unix)]
fn install(dir: &Path, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, script).expect("Failed to write fake tool");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake tool executable");
    path
}

/// Installs the fake tools into `dir`; with `failing_samtools` every samtools call fails.
#[cfg(unix)]
pub fn install_fake_tools(dir: &Path, failing_samtools: bool) -> FakeTools {
    fs::create_dir_all(dir).expect("Failed to create tool directory");
    FakeTools {
        samtools: install(dir, "samtools", if failing_samtools { FAILING_SAMTOOLS } else { SAMTOOLS }),
        bcftools: install(dir, "bcftools", BCFTOOLS),
        vcfutils: install(dir, "vcfutils.pl", VCFUTILS),
        seqtk: install(dir, "seqtk", SEQTK),
    }
}

/// Creates references, alignments and a configuration for `individuals` under `root`.
/// Returns `(config, bams)`.
pub fn write_project(root: &Path, individuals: &[&str]) -> (PathBuf, PathBuf) {
    let bams = root.join("bams");
    let mut config = String::from("# test project\n[references]\n");
    for name in individuals {
        let reference = root.join(format!("{name}.reference.fasta"));
        fs::write(&reference, ">uce-1\nACGT\n").expect("Failed to write reference");
        config.push_str(&format!("{name} = {}\n", reference.display()));

        let sample = bams.join(name);
        fs::create_dir_all(&sample).expect("Failed to create alignment directory");
        fs::write(sample.join(format!("{name}-CL-RG-MD-M.bam")), "unphased\n")
            .expect("Failed to write alignment");
    }
    config.push_str("\n[individuals]\n");
    for name in individuals {
        config.push_str(&format!("{name}\n"));
    }

    let config_path = root.join("phasing.conf");
    fs::write(&config_path, config).expect("Failed to write configuration");
    (config_path, bams)
}
