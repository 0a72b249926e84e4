//! Haplotype tags and the file-name conventions that carry them.
//!
//! Phased files are named `<individual>.0.<ext>` / `<individual>.1.<ext>`; anything else is
//! the unphased consensus of the original alignment.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::{HapbalError, Result};

/// Which copy of a diploid locus a file or record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Haplotype {
    Zero,
    One,
    Unphased,
}

impl Haplotype {
    /// The two phased haplotypes, in output order.
    pub const PHASED: [Haplotype; 2] = [Haplotype::Zero, Haplotype::One];

    /// All three tags in processing order.
    pub const ALL: [Haplotype; 3] = [Haplotype::Zero, Haplotype::One, Haplotype::Unphased];

    /// The numeric tag for phased haplotypes, `None` for unphased.
    #[must_use]
    pub fn tag(self) -> Option<u8> {
        match self {
            Haplotype::Zero => Some(0),
            Haplotype::One => Some(1),
            Haplotype::Unphased => None,
        }
    }

    /// Builds a file name `<stem>[.<tag>].<suffix>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hapbal_lib::haplotype::Haplotype;
    ///
    /// assert_eq!(Haplotype::One.file_name("bird1", "cleaned.fasta"), "bird1.1.cleaned.fasta");
    /// assert_eq!(Haplotype::Unphased.file_name("bird1", "fasta"), "bird1.fasta");
    /// ```
    #[must_use]
    pub fn file_name(self, stem: &str, suffix: &str) -> String {
        match self.tag() {
            Some(tag) => format!("{stem}.{tag}.{suffix}"),
            None => format!("{stem}.{suffix}"),
        }
    }

    /// Infers the haplotype from a file name of the form `<stem>.<0|1>.<ext...>`.
    ///
    /// The first dot-separated component after the stem that is exactly `0` or `1` decides;
    /// with none present the file is unphased.
    ///
    /// # Examples
    ///
    /// ```
    /// use hapbal_lib::haplotype::Haplotype;
    ///
    /// assert_eq!(Haplotype::from_path("out/bird1.0.fasta"), Haplotype::Zero);
    /// assert_eq!(Haplotype::from_path("bird1.1.cleaned.fasta"), Haplotype::One);
    /// assert_eq!(Haplotype::from_path("bird1.fasta"), Haplotype::Unphased);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Haplotype {
        let Some(name) = path.as_ref().file_name().and_then(|n| n.to_str()) else {
            return Haplotype::Unphased;
        };
        name.split('.')
            .skip(1)
            .find_map(|component| match component {
                "0" => Some(Haplotype::Zero),
                "1" => Some(Haplotype::One),
                _ => None,
            })
            .unwrap_or(Haplotype::Unphased)
    }
}

/// One path per haplotype for a single individual and processing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaplotypeFiles {
    pub hap0: PathBuf,
    pub hap1: PathBuf,
    pub unphased: PathBuf,
}

impl HaplotypeFiles {
    /// Names all three files `<dir>/<stem>[.<tag>].<suffix>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hapbal_lib::haplotype::HaplotypeFiles;
    /// use std::path::Path;
    ///
    /// let files = HaplotypeFiles::in_dir(Path::new("out/bird1"), "bird1", "cleaned.fasta");
    /// assert_eq!(files.hap1, Path::new("out/bird1/bird1.1.cleaned.fasta"));
    /// assert_eq!(files.unphased, Path::new("out/bird1/bird1.cleaned.fasta"));
    /// ```
    #[must_use]
    pub fn in_dir(dir: &Path, stem: &str, suffix: &str) -> Self {
        Self {
            hap0: dir.join(Haplotype::Zero.file_name(stem, suffix)),
            hap1: dir.join(Haplotype::One.file_name(stem, suffix)),
            unphased: dir.join(Haplotype::Unphased.file_name(stem, suffix)),
        }
    }

    /// Assigns each path to the haplotype its file name carries.
    ///
    /// # Errors
    ///
    /// Returns [`HapbalError::InvalidParameter`] unless exactly one path maps to each
    /// haplotype.
    pub fn from_paths(paths: &[PathBuf], parameter: &str) -> Result<Self> {
        let mut slots: [Option<PathBuf>; 3] = [None, None, None];
        for path in paths {
            let haplotype = Haplotype::from_path(path);
            let slot = &mut slots[haplotype as usize];
            if let Some(existing) = slot {
                return Err(HapbalError::InvalidParameter {
                    parameter: parameter.to_string(),
                    reason: format!(
                        "both '{}' and '{}' look like {haplotype} files",
                        existing.display(),
                        path.display()
                    ),
                });
            }
            *slot = Some(path.clone());
        }

        let [hap0, hap1, unphased] = slots;
        match (hap0, hap1, unphased) {
            (Some(hap0), Some(hap1), Some(unphased)) => Ok(Self { hap0, hap1, unphased }),
            _ => Err(HapbalError::InvalidParameter {
                parameter: parameter.to_string(),
                reason: "expected one '<name>.0.*', one '<name>.1.*' and one unphased file"
                    .to_string(),
            }),
        }
    }

    #[must_use]
    pub fn get(&self, haplotype: Haplotype) -> &Path {
        match haplotype {
            Haplotype::Zero => &self.hap0,
            Haplotype::One => &self.hap1,
            Haplotype::Unphased => &self.unphased,
        }
    }

    /// Iterates `(haplotype, path)` in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (Haplotype, &Path)> {
        Haplotype::ALL.into_iter().map(move |haplotype| (haplotype, self.get(haplotype)))
    }
}

impl fmt::Display for Haplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "haplotype {tag}"),
            None => write!(f, "unphased"),
        }
    }
}
