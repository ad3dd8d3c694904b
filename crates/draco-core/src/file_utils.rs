use crate::file_reader_factory::FileReaderFactory;
use crate::file_writer_factory::FileWriterFactory;
use crate::status::{DracoError, Status, StatusOr};

/// Splits `full_path` at the last `/` or `\`. A bare file name lives in `.`.
pub fn split_path(full_path: &str) -> (String, String) {
    match full_path.rfind(&['/', '\\'][..]) {
        Some(pos) => (full_path[..pos].to_string(), full_path[pos + 1..].to_string()),
        None => (".".to_string(), full_path.to_string()),
    }
}

/// Lower-cased extension without the dot, empty when there is none.
pub fn lowercase_file_extension(file_name: &str) -> String {
    let (_, base) = split_path(file_name);
    match base.rfind('.') {
        Some(pos) if pos + 1 < base.len() => base[pos + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// Reads `file_name` through the registered file readers.
pub fn read_file_to_buffer(file_name: &str) -> StatusOr<Vec<u8>> {
    let mut reader = FileReaderFactory::open_reader(file_name)
        .ok_or_else(|| DracoError::IoError(format!("Unable to open {}", file_name)))?;
    let mut buffer = Vec::new();
    if !reader.read_file_to_buffer(&mut buffer) {
        return Err(DracoError::IoError(format!("Unable to read {}", file_name)));
    }
    Ok(buffer)
}

/// Writes `buffer` to `file_name` through the registered file writers.
pub fn write_buffer_to_file(buffer: &[u8], file_name: &str) -> Status {
    let mut writer = FileWriterFactory::open_writer(file_name)
        .ok_or_else(|| DracoError::IoError(format!("Unable to open {} for writing", file_name)))?;
    if !writer.write(buffer) {
        return Err(DracoError::IoError(format!("Unable to write {}", file_name)));
    }
    Ok(())
}
