//! Input validation utilities
//!
//! This module provides common validation functions for command-line parameters and
//! file paths with consistent error messages.
//!
//! All validation functions use structured error types from [`crate::errors`] so callers
//! can tell a missing input apart from a bad parameter.

use crate::errors::{HapbalError, Result};
use std::fmt::Display;
use std::path::Path;

/// Validate that a file exists
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description of the file (e.g., "Input file", "Reference")
///
/// # Errors
/// Returns [`HapbalError::MissingFile`] if the file does not exist
///
/// # Example
/// ```
/// use hapbal_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.fasta", "Input FASTA");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(HapbalError::MissingFile {
            description: description.to_string(),
            path: path_ref.display().to_string(),
        });
    }
    Ok(())
}

/// Validate that multiple files exist
///
/// Every file is checked before anything is returned to the caller, so a batch of inputs
/// either passes as a whole or fails on the first missing entry.
///
/// # Arguments
/// * `files` - Slice of (path, description) tuples
///
/// # Errors
/// Returns an error for the first file that doesn't exist
///
/// # Example
/// ```no_run
/// use hapbal_lib::validation::validate_files_exist;
/// use std::path::PathBuf;
///
/// let files = vec![
///     (PathBuf::from("bird1.0.fasta"), "Haplotype 0 consensus"),
///     (PathBuf::from("bird1.1.fasta"), "Haplotype 1 consensus"),
/// ];
/// validate_files_exist(&files).unwrap();
/// ```
pub fn validate_files_exist<P: AsRef<Path>>(files: &[(P, &str)]) -> Result<()> {
    for (path, desc) in files {
        validate_file_exists(path, desc)?;
    }
    Ok(())
}

/// Validate that an output location does not exist yet
///
/// # Errors
/// Returns [`HapbalError::InvalidParameter`] if something is already present at `path`
///
/// # Example
/// ```
/// use hapbal_lib::validation::validate_output_absent;
///
/// validate_output_absent("/nonexistent/output", "output").unwrap();
/// ```
pub fn validate_output_absent<P: AsRef<Path>>(path: P, name: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        return Err(HapbalError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("'{}' already exists", path_ref.display()),
        });
    }
    Ok(())
}

/// Validate that a value is positive (> 0)
///
/// # Arguments
/// * `value` - Value to validate
/// * `name` - Name of the parameter for error messages
///
/// # Errors
/// Returns an error if the value is not positive
///
/// # Example
/// ```
/// use hapbal_lib::validation::validate_positive;
///
/// validate_positive(4, "cores").unwrap();
///
/// let result = validate_positive(0, "cores");
/// assert!(result.is_err());
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(HapbalError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Must be positive (> 0), got: {value}"),
        });
    }
    Ok(())
}

/// Validate that two parallel argument lists have the same length
///
/// # Errors
/// Returns [`HapbalError::InvalidParameter`] naming both parameters when the lengths differ
pub fn validate_same_length<A, B>(
    first: &[A],
    second: &[B],
    first_name: &str,
    second_name: &str,
) -> Result<()> {
    if first.len() != second.len() {
        return Err(HapbalError::InvalidParameter {
            parameter: second_name.to_string(),
            reason: format!(
                "{second_name} has {} values but {first_name} has {}",
                second.len(),
                first.len()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_validate_file_exists_valid() {
        let temp_file = NamedTempFile::new().unwrap();
        validate_file_exists(temp_file.path(), "Test file").unwrap();
    }

    #[test]
    fn test_validate_file_exists_invalid() {
        let result = validate_file_exists("/nonexistent/file.fasta", "Input file");
        let err = result.unwrap_err();
        assert!(matches!(err, HapbalError::MissingFile { .. }));
        let err_msg = err.to_string();
        assert!(err_msg.contains("Input file"));
        assert!(err_msg.contains("does not exist"));
    }

    #[test]
    fn test_validate_files_exist_all_valid() {
        let temp1 = NamedTempFile::new().unwrap();
        let temp2 = NamedTempFile::new().unwrap();

        let files =
            vec![(temp1.path().to_path_buf(), "File 1"), (temp2.path().to_path_buf(), "File 2")];

        validate_files_exist(&files).unwrap();
    }

    #[test]
    fn test_validate_files_exist_one_invalid() {
        let temp1 = NamedTempFile::new().unwrap();

        let files = vec![
            (temp1.path().to_path_buf(), "File 1"),
            (PathBuf::from("/nonexistent.fasta"), "File 2"),
        ];

        let result = validate_files_exist(&files);
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("File 2"));
    }

    #[test]
    fn test_validate_output_absent() {
        let dir = TempDir::new().unwrap();
        validate_output_absent(dir.path().join("fresh"), "output").unwrap();

        let err = validate_output_absent(dir.path(), "output").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[rstest]
    #[case(1, true)]
    #[case(16, true)]
    #[case(0, false)]
    #[case(-2, false)]
    fn test_validate_positive(#[case] value: i64, #[case] should_succeed: bool) {
        let result = validate_positive(value, "cores");
        if should_succeed {
            assert!(result.is_ok(), "Failed for: {value}");
        } else {
            let err_msg = result.unwrap_err().to_string();
            assert!(err_msg.contains("Invalid parameter 'cores'"));
            assert!(err_msg.contains(&format!("got: {value}")));
        }
    }

    #[test]
    fn test_validate_same_length() {
        validate_same_length(&[1, 2], &["a", "b"], "hap0", "hap1").unwrap();

        let err = validate_same_length(&[1, 2, 3], &["a"], "hap0", "hap1").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("hap1 has 1 values but hap0 has 3"));
    }
}
