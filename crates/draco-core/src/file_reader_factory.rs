//! Pluggable file reading.
//!
//! Everything in the library that reads a file goes through
//! [`FileReaderFactory::open_reader`]. Hosts register their own open function
//! to route those reads through their file layer; until one is registered the
//! built-in [`StdioFileReader`] is used.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::Mutex;

use tracing::warn;

pub trait FileReaderInterface: Send {
    /// Reads the entire file into `buffer`. Empty files are an error.
    fn read_file_to_buffer(&mut self, buffer: &mut Vec<u8>) -> bool;

    /// Same as [`read_file_to_buffer`](Self::read_file_to_buffer) for signed bytes.
    fn read_file_to_char_buffer(&mut self, buffer: &mut Vec<i8>) -> bool {
        let mut bytes = Vec::new();
        let ok = self.read_file_to_buffer(&mut bytes);
        buffer.clear();
        buffer.extend(bytes.into_iter().map(|b| b as i8));
        ok
    }

    /// Size of the file in bytes, 0 when unknown.
    fn file_size(&mut self) -> usize;
}

pub type OpenReaderFn = fn(&str) -> Option<Box<dyn FileReaderInterface>>;

static READERS: Mutex<Vec<OpenReaderFn>> = Mutex::new(Vec::new());

pub struct FileReaderFactory;

impl FileReaderFactory {
    /// Adds `open_function` to the list tried by [`open_reader`](Self::open_reader).
    pub fn register_reader(open_function: OpenReaderFn) -> bool {
        match READERS.lock() {
            Ok(mut readers) => {
                readers.push(open_function);
                true
            }
            Err(_) => false,
        }
    }

    /// Number of registered open functions.
    pub fn num_registered() -> usize {
        READERS.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Tries each registered open function in registration order.
    pub fn open_reader(file_name: &str) -> Option<Box<dyn FileReaderInterface>> {
        let readers = match READERS.lock() {
            Ok(readers) => readers.clone(),
            Err(_) => return None,
        };
        if readers.is_empty() {
            return StdioFileReader::open(file_name);
        }
        readers.iter().find_map(|open| open(file_name))
    }
}

/// Default reader over `std::fs::File`.
#[derive(Debug)]
pub struct StdioFileReader {
    file: File,
}

impl StdioFileReader {
    pub fn open(file_name: &str) -> Option<Box<dyn FileReaderInterface>> {
        if file_name.is_empty() {
            return None;
        }
        let file = File::open(file_name).ok()?;
        Some(Box::new(StdioFileReader { file }))
    }
}

impl FileReaderInterface for StdioFileReader {
    fn read_file_to_buffer(&mut self, buffer: &mut Vec<u8>) -> bool {
        buffer.clear();
        let file_size = self.file_size();
        if file_size == 0 {
            warn!("Unable to obtain file size or file empty");
            return false;
        }
        buffer.resize(file_size, 0);
        self.file.read_exact(buffer).is_ok()
    }

    fn file_size(&mut self) -> usize {
        let size = match self.file.seek(SeekFrom::End(0)) {
            Ok(size) => size as usize,
            Err(_) => {
                warn!("Seek to EoF failed");
                return 0;
            }
        };
        if self.file.rewind().is_err() {
            return 0;
        }
        size
    }
}
