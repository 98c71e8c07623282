//! Per-domain output contract.
//!
//! Models own their output objects; the framework only fixes the
//! lifecycle: open before timestepping, a header, one record per
//! requested timestep, close during post-processing.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ebb_core::Timestep;

/// Lifecycle contract for a domain output.
pub trait Output {
    /// Open the output target.
    fn open(&mut self) -> io::Result<()>;

    /// Write the header once, after opening.
    fn write_header(&mut self) -> io::Result<()>;

    /// Write one record for timestep `ts`.
    fn write_output(&mut self, ts: Timestep) -> io::Result<()>;

    /// Flush and close the output target.
    fn close(&mut self) -> io::Result<()>;
}

/// File-backed helper implementing the open/close half of [`Output`].
///
/// Concrete outputs embed a `FileOutput` and implement the two write
/// methods; `writer()` hands them the open stream.
pub struct FileOutput {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileOutput {
    /// Create an output that will write `file_name` under `dir`.
    pub fn new(dir: &str, file_name: &str) -> Self {
        Self {
            path: Path::new(dir).join(file_name),
            writer: None,
        }
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is currently open.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Create the output directory if needed and open the file.
    pub fn open(&mut self) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        self.writer = Some(BufWriter::new(File::create(&self.path)?));
        Ok(())
    }

    /// The open stream.
    ///
    /// Fails with [`io::ErrorKind::NotConnected`] before `open`.
    pub fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "output file is not open"))
    }

    /// Flush and close the file.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
