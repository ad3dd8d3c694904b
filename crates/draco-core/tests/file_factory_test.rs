//! Registration changes process-wide state, so these tests live in their own
//! test binary and run as a single test.

use std::collections::HashMap;
use std::sync::Mutex;

use draco_core::file_utils::{read_file_to_buffer, write_buffer_to_file};
use draco_core::{FileReaderFactory, FileReaderInterface, FileWriterFactory, FileWriterInterface};

static MEMORY_FS: Mutex<Option<HashMap<String, Vec<u8>>>> = Mutex::new(None);

struct MemoryReader {
    data: Vec<u8>,
}

impl FileReaderInterface for MemoryReader {
    fn read_file_to_buffer(&mut self, buffer: &mut Vec<u8>) -> bool {
        buffer.clear();
        buffer.extend_from_slice(&self.data);
        !buffer.is_empty()
    }

    fn file_size(&mut self) -> usize {
        self.data.len()
    }
}

struct MemoryWriter {
    name: String,
}

impl FileWriterInterface for MemoryWriter {
    fn write(&mut self, buffer: &[u8]) -> bool {
        let mut fs = MEMORY_FS.lock().unwrap();
        fs.get_or_insert_with(HashMap::new)
            .insert(self.name.clone(), buffer.to_vec());
        true
    }
}

fn open_memory_reader(name: &str) -> Option<Box<dyn FileReaderInterface>> {
    let name = name.strip_prefix("mem://")?;
    let fs = MEMORY_FS.lock().unwrap();
    let data = fs.as_ref()?.get(name)?.clone();
    Some(Box::new(MemoryReader { data }))
}

fn open_memory_writer(name: &str) -> Option<Box<dyn FileWriterInterface>> {
    let name = name.strip_prefix("mem://")?;
    Some(Box::new(MemoryWriter { name: name.to_string() }))
}

fn open_nothing(_name: &str) -> Option<Box<dyn FileReaderInterface>> {
    None
}

#[test]
fn test_registered_openers_replace_stdio() {
    let dir = tempfile::tempdir().unwrap();
    let disk_path = dir.path().join("disk.bin");
    let disk_name = disk_path.to_str().unwrap();

    // Nothing registered yet: the stdio fallbacks are used.
    assert_eq!(FileReaderFactory::num_registered(), 0);
    write_buffer_to_file(b"on disk", disk_name).unwrap();
    assert_eq!(read_file_to_buffer(disk_name).unwrap(), b"on disk");

    assert!(FileReaderFactory::register_reader(open_nothing));
    assert!(FileReaderFactory::register_reader(open_memory_reader));
    assert!(FileWriterFactory::register_writer(open_memory_writer));
    assert_eq!(FileReaderFactory::num_registered(), 2);
    assert_eq!(FileWriterFactory::num_registered(), 1);

    // Openers are tried in order; the first declines, the second serves.
    write_buffer_to_file(b"in memory", "mem://a.drc").unwrap();
    assert_eq!(read_file_to_buffer("mem://a.drc").unwrap(), b"in memory");
    assert!(read_file_to_buffer("mem://missing.drc").is_err());

    // Once something is registered the stdio fallback is no longer consulted.
    assert!(read_file_to_buffer(disk_name).is_err());
    assert!(write_buffer_to_file(b"x", disk_name).is_err());
}
