use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use error_stack::{Report, Result, ResultExt};
use thiserror::Error;

use crate::{config::StorageConfig, domain::Record};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to create output directory")]
    FailedToCreateDirectory,
    #[error("Failed to serialize records")]
    FailedToSerialize,
    #[error("Failed to open dataset file")]
    FailedToOpen,
    #[error("Failed to append to dataset file")]
    FailedToWrite,
}

/// Append-only CSV dataset of captured records.
///
/// The header is written only when the file is absent or empty. Existing
/// bytes are never rewritten: each call renders its rows in memory and then
/// issues a single append.
#[derive(Debug, Clone)]
pub struct AppendingStore {
    destination: PathBuf,
}

impl AppendingStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self::at(config.output_path.clone())
    }

    pub fn at(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Appends `records` in order and returns how many rows were written.
    pub fn persist(&self, records: &[Record]) -> Result<usize, PersistenceError> {
        persist(records, &self.destination)
    }
}

pub fn persist(records: &[Record], destination: &Path) -> Result<usize, PersistenceError> {
    if records.is_empty() {
        log::info!("No data to save.");
        return Ok(0);
    }

    let header_needed = needs_header(destination)?;
    let mut contents = render_rows(records, header_needed)?;

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .change_context(PersistenceError::FailedToCreateDirectory)
                .attach_printable_lazy(|| format!("Directory: {}", parent.display()))?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(destination)
        .change_context(PersistenceError::FailedToOpen)
        .attach_printable_lazy(|| format!("Path: {}", destination.display()))?;

    if !header_needed
        && !ends_with_newline(&mut file)
            .change_context(PersistenceError::FailedToOpen)
            .attach_printable_lazy(|| format!("Path: {}", destination.display()))?
    {
        log::warn!(
            "{} does not end with a newline, terminating its last line",
            destination.display()
        );
        contents.insert(0, b'\n');
    }

    file.write_all(&contents)
        .and_then(|()| file.flush())
        .change_context(PersistenceError::FailedToWrite)
        .attach_printable_lazy(|| format!("Path: {}", destination.display()))?;

    log::info!(
        "Data successfully saved to {} ({} rows)",
        destination.display(),
        records.len()
    );
    Ok(records.len())
}

fn needs_header(destination: &Path) -> Result<bool, PersistenceError> {
    match fs::metadata(destination) {
        Ok(metadata) => Ok(metadata.len() == 0),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(true),
        Err(error) => Err(Report::new(error)
            .change_context(PersistenceError::FailedToOpen)
            .attach_printable(format!("Path: {}", destination.display()))),
    }
}

fn ends_with_newline(file: &mut fs::File) -> std::io::Result<bool> {
    if file.seek(SeekFrom::End(0))? == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn render_rows(records: &[Record], with_header: bool) -> Result<Vec<u8>, PersistenceError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());

    for record in records {
        writer
            .serialize(record)
            .change_context(PersistenceError::FailedToSerialize)
            .attach_printable_lazy(|| format!("Record: {}", record.name()))?;
    }

    writer.into_inner().map_err(|error| {
        Report::new(PersistenceError::FailedToSerialize).attach_printable(error.to_string())
    })
}
