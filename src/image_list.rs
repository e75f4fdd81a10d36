//! Newline-delimited list of converted images.
//!
//! One entry per line. Blank lines and lines starting with `#` are ignored;
//! anything after the first whitespace on a line is ignored too, so entries
//! may carry trailing notes.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use log::debug;

use crate::error::StorageError;
use crate::storage::{SinkStream, SourceStream, Storage};

/// Extract the file names from list text.
pub fn parse_image_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(String::from)
        .collect()
}

/// Read the list stored at `list_path`.
///
/// A missing list is [`StorageError::NotFound`]. Invalid UTF-8 is replaced
/// rather than rejected.
pub fn read_image_list<S: Storage>(
    storage: &mut S,
    list_path: &str,
) -> Result<Vec<String>, StorageError> {
    let mut source = storage.open_read(list_path)?;
    let mut bytes = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        match source.read_bytes(&mut chunk)? {
            0 => break,
            n => bytes.extend_from_slice(&chunk[..n]),
        }
    }
    Ok(parse_image_list(&String::from_utf8_lossy(&bytes)))
}

/// Replace the list at `list_path` with `files`, one per line.
pub fn write_image_list<S: Storage>(
    storage: &mut S,
    list_path: &str,
    files: &[String],
) -> Result<(), StorageError> {
    let mut sink = storage.create(list_path)?;
    for name in files {
        sink.write_all_bytes(name.as_bytes())?;
        sink.write_all_bytes(b"\n")?;
    }
    sink.flush_bytes()
}

/// Move `filename` to the end of the list, adding it if absent.
///
/// The name is stored with a leading `/`. A missing list counts as empty.
/// Returns the list as written.
pub fn upsert_image_in_list<S: Storage>(
    storage: &mut S,
    list_path: &str,
    filename: &str,
) -> Result<Vec<String>, StorageError> {
    let mut files = match read_image_list(storage, list_path) {
        Ok(files) => files,
        Err(StorageError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    let clean = if filename.starts_with('/') {
        String::from(filename)
    } else {
        format!("/{filename}")
    };
    files.retain(|name| *name != clean);
    debug!("{list_path}: {clean} is entry {}", files.len() + 1);
    files.push(clean);

    write_image_list(storage, list_path, &files)?;
    Ok(files)
}

/// Names of the `.bmp` files in the storage root.
pub fn list_bmp_files<S: Storage>(storage: &mut S) -> Result<Vec<String>, StorageError> {
    let mut files: Vec<String> = storage
        .list_dir("/")?
        .into_iter()
        .filter(|name| name.ends_with(".bmp"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStorage;
    use alloc::vec;

    #[test]
    fn parse_skips_comments_and_notes() {
        let text = "# staff images\n\n/a.bmp\n  /b.bmp   shown at 3pm\n/c.bmp\tnote\r\n   \n#/d.bmp\n";
        assert_eq!(parse_image_list(text), vec!["/a.bmp", "/b.bmp", "/c.bmp"]);
    }

    #[test]
    fn upsert_moves_to_end() {
        let mut storage = MemStorage::new();
        upsert_image_in_list(&mut storage, "/images.txt", "a.bmp").unwrap();
        upsert_image_in_list(&mut storage, "/images.txt", "b.bmp").unwrap();
        let files = upsert_image_in_list(&mut storage, "/images.txt", "a.bmp").unwrap();
        assert_eq!(files, vec!["/b.bmp", "/a.bmp"]);
        assert_eq!(storage.get("/images.txt").unwrap(), b"/b.bmp\n/a.bmp\n");
    }

    #[test]
    fn read_missing_list() {
        let mut storage = MemStorage::new();
        assert!(matches!(
            read_image_list(&mut storage, "/images.txt"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn lists_only_bmp() {
        let mut storage = MemStorage::new();
        storage.insert("/b.bmp", vec![]);
        storage.insert("/a.bmp", vec![]);
        storage.insert("/images.txt", vec![]);
        storage.insert("/photo.BMP", vec![]);
        assert_eq!(list_bmp_files(&mut storage).unwrap(), vec!["a.bmp", "b.bmp"]);
    }
}
