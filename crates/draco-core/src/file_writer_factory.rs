//! Pluggable file writing, mirroring [`crate::file_reader_factory`].

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

pub trait FileWriterInterface: Send {
    /// Writes all of `buffer`. True only when every byte was written.
    fn write(&mut self, buffer: &[u8]) -> bool;
}

pub type OpenWriterFn = fn(&str) -> Option<Box<dyn FileWriterInterface>>;

static WRITERS: Mutex<Vec<OpenWriterFn>> = Mutex::new(Vec::new());

pub struct FileWriterFactory;

impl FileWriterFactory {
    pub fn register_writer(open_function: OpenWriterFn) -> bool {
        match WRITERS.lock() {
            Ok(mut writers) => {
                writers.push(open_function);
                true
            }
            Err(_) => false,
        }
    }

    pub fn num_registered() -> usize {
        WRITERS.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Tries each registered open function in registration order. The stdio
    /// writer is only used while nothing is registered.
    pub fn open_writer(file_name: &str) -> Option<Box<dyn FileWriterInterface>> {
        let writers = match WRITERS.lock() {
            Ok(writers) => writers.clone(),
            Err(_) => return None,
        };
        if writers.is_empty() {
            return StdioFileWriter::open(file_name);
        }
        writers.iter().find_map(|open| open(file_name))
    }
}

/// Default writer over `std::fs::File`. Creates missing parent directories.
#[derive(Debug)]
pub struct StdioFileWriter {
    file: File,
}

impl StdioFileWriter {
    pub fn open(file_name: &str) -> Option<Box<dyn FileWriterInterface>> {
        if file_name.is_empty() {
            return None;
        }
        if let Some(parent) = Path::new(file_name).parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                fs::create_dir_all(parent).ok()?;
            }
        }
        let file = File::create(file_name).ok()?;
        Some(Box::new(StdioFileWriter { file }))
    }
}

impl FileWriterInterface for StdioFileWriter {
    fn write(&mut self, buffer: &[u8]) -> bool {
        self.file.write_all(buffer).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdio_writer_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.drc");

        let mut writer = StdioFileWriter::open(path.to_str().unwrap()).unwrap();
        assert!(writer.write(b"abc"));
        drop(writer);
        assert_eq!(fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn test_stdio_writer_empty_name() {
        assert!(StdioFileWriter::open("").is_none());
    }
}
