//! File access shim.
//!
//! Reader and writer plugged into the codec's file factories so that every
//! file the codec touches goes through here. Unlike the codec's stock writer,
//! [`BridgeFileWriter`] never creates directories: a missing parent directory
//! makes the open fail.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Once;

use draco_core::file_utils::split_path;
use draco_core::{FileReaderFactory, FileReaderInterface, FileWriterFactory, FileWriterInterface};
use tracing::{debug, warn};

/// Whole-file reader. The file is closed when the reader is dropped.
#[derive(Debug)]
pub struct BridgeFileReader {
    file: File,
}

impl BridgeFileReader {
    /// `None` for an empty name or when the file cannot be opened.
    pub fn open(file_name: &str) -> Option<Box<dyn FileReaderInterface>> {
        if file_name.is_empty() {
            return None;
        }
        match File::open(file_name) {
            Ok(file) => Some(Box::new(BridgeFileReader { file })),
            Err(err) => {
                debug!(file = file_name, %err, "open for read failed");
                None
            }
        }
    }

    fn read_all(&mut self) -> Option<Vec<u8>> {
        let file_size = self.file_size();
        if file_size == 0 {
            warn!("Unable to obtain file size or file empty");
            return None;
        }
        let mut data = vec![0u8; file_size];
        match self.file.read_exact(&mut data) {
            Ok(()) => Some(data),
            Err(err) => {
                warn!(%err, expected = file_size, "short read");
                None
            }
        }
    }
}

impl FileReaderInterface for BridgeFileReader {
    fn read_file_to_buffer(&mut self, buffer: &mut Vec<u8>) -> bool {
        buffer.clear();
        match self.read_all() {
            Some(data) => {
                *buffer = data;
                true
            }
            None => false,
        }
    }

    fn read_file_to_char_buffer(&mut self, buffer: &mut Vec<i8>) -> bool {
        buffer.clear();
        match self.read_all() {
            Some(data) => {
                buffer.extend(data.into_iter().map(|b| b as i8));
                true
            }
            None => false,
        }
    }

    fn file_size(&mut self) -> usize {
        let size = match self.file.seek(SeekFrom::End(0)) {
            Ok(size) => size as usize,
            Err(err) => {
                warn!(%err, "Seek to EoF failed");
                return 0;
            }
        };
        if self.file.rewind().is_err() {
            return 0;
        }
        size
    }
}

/// Whole-buffer writer. The file is closed when the writer is dropped.
#[derive(Debug)]
pub struct BridgeFileWriter {
    file: File,
}

/// Checks the directory part of `file_name` without creating anything.
/// A name without separators lives in the current directory.
pub fn parent_directory_exists(file_name: &str) -> bool {
    let (folder, _) = split_path(file_name);
    if folder.is_empty() {
        // Separator at position 0: the file sits in the root.
        return true;
    }
    Path::new(&folder).is_dir()
}

impl BridgeFileWriter {
    /// `None` for an empty name, a missing parent directory or a failed create.
    pub fn open(file_name: &str) -> Option<Box<dyn FileWriterInterface>> {
        if file_name.is_empty() {
            return None;
        }
        if !parent_directory_exists(file_name) {
            warn!(file = file_name, "parent directory does not exist");
            return None;
        }
        match File::create(file_name) {
            Ok(file) => Some(Box::new(BridgeFileWriter { file })),
            Err(err) => {
                warn!(file = file_name, %err, "open for write failed");
                None
            }
        }
    }
}

impl FileWriterInterface for BridgeFileWriter {
    fn write(&mut self, buffer: &[u8]) -> bool {
        self.file.write_all(buffer).is_ok()
    }
}

static REGISTER_FILE_IO: Once = Once::new();

/// Registers the shim with the codec's reader and writer factories.
///
/// Idempotent; returns `true` only for the call that did the registration.
pub fn register_file_io() -> bool {
    let mut performed = false;
    REGISTER_FILE_IO.call_once(|| {
        let reader = FileReaderFactory::register_reader(BridgeFileReader::open);
        let writer = FileWriterFactory::register_writer(BridgeFileWriter::open);
        debug!(reader, writer, "registered file shim");
        performed = true;
    });
    performed
}
