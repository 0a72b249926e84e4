//! FASTA reading and writing helpers shared by the cleaning, balancing and merging steps.
//!
//! Readers and writers are opened for the duration of one block and closed when they go out
//! of scope. Writers are buffered and must be [`FastaWriter::finish`]ed so that flush errors
//! surface instead of being swallowed on drop.

use anyhow::{Context, Result};
use noodles::fasta;
use noodles::fasta::record::{Definition, Sequence};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

/// A FASTA reader over any buffered source.
pub type FastaReader = fasta::io::Reader<Box<dyn BufRead>>;

/// Opens a FASTA file for streaming.
///
/// # Errors
/// Returns an error if the file cannot be opened.
pub fn open_fasta<P: AsRef<Path>>(path: P) -> Result<FastaReader> {
    let path = path.as_ref();
    fasta::io::reader::Builder
        .build_from_path(path)
        .with_context(|| format!("Failed to open FASTA: {}", path.display()))
}

/// Reads every record of a FASTA file into memory.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<fasta::Record>> {
    let path = path.as_ref();
    let mut reader = open_fasta(path)?;
    let mut records = Vec::new();
    for result in reader.records() {
        records.push(
            result.with_context(|| format!("Failed to parse FASTA record in {}", path.display()))?,
        );
    }
    Ok(records)
}

/// Builds a record from a name, optional description and bases.
#[must_use]
pub fn new_record(name: &str, description: Option<&str>, sequence: Vec<u8>) -> fasta::Record {
    let definition = Definition::new(name, description.map(|d| d.as_bytes().to_vec().into()));
    fasta::Record::new(definition, Sequence::from(sequence))
}

/// The record name (the first whitespace-delimited token of the header).
///
/// # Errors
/// Returns an error if the name is not valid UTF-8.
pub fn record_name(record: &fasta::Record) -> Result<&str> {
    let name = record.name();
    std::str::from_utf8(name).with_context(|| {
        format!("FASTA record name is not valid UTF-8: '{}'", String::from_utf8_lossy(name))
    })
}

/// The header text following the name, if any.
///
/// # Errors
/// Returns an error if the description is not valid UTF-8.
pub fn record_description(record: &fasta::Record) -> Result<Option<&str>> {
    record
        .description()
        .map(|description| {
            std::str::from_utf8(description).with_context(|| {
                format!(
                    "Description of FASTA record '{}' is not valid UTF-8",
                    String::from_utf8_lossy(record.name())
                )
            })
        })
        .transpose()
}

/// Buffered FASTA writer that counts records and reports flush failures.
pub struct FastaWriter<W: Write> {
    inner: BufWriter<W>,
    records: u64,
}

impl FastaWriter<File> {
    /// Creates (or truncates) a FASTA file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create FASTA: {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> FastaWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner: BufWriter::new(inner), records: 0 }
    }

    /// Writes one record.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_record(&mut self, record: &fasta::Record) -> io::Result<()> {
        fasta::io::Writer::new(&mut self.inner).write_record(record)?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flushes buffered output and returns the underlying writer.
    ///
    /// # Errors
    /// Returns an error if the final flush fails.
    pub fn finish(self) -> io::Result<W> {
        self.inner.into_inner().map_err(io::IntoInnerError::into_error)
    }
}

/// Writes records to a new FASTA file, returning how many were written.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_fasta<P: AsRef<Path>>(path: P, records: &[fasta::Record]) -> Result<u64> {
    let path = path.as_ref();
    let mut writer = FastaWriter::create(path)?;
    for record in records {
        writer
            .write_record(record)
            .with_context(|| format!("Failed to write FASTA: {}", path.display()))?;
    }
    let count = writer.records();
    writer.finish().with_context(|| format!("Failed to flush FASTA: {}", path.display()))?;
    Ok(count)
}
