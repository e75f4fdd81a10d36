//! Storage capability used by the transcoder and the image list.
//!
//! A [`Storage`] opens files by `/`-rooted path and hands out a seekable
//! [`SourceStream`] for reading and a [`SinkStream`] for writing. Two
//! implementations ship with the crate: [`MemStorage`] (always available)
//! and [`FsStorage`] (`std` feature), rooted at a host directory.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::StorageError;

/// Seekable read side of an opened file.
pub trait SourceStream {
    /// Move the read position to `pos` bytes from the start.
    ///
    /// Seeking past the end of the file is an error.
    fn seek_to(&mut self, pos: u64) -> Result<(), StorageError>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    /// `Ok(0)` means end of file.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Fill `buf` completely or fail with [`StorageError::UnexpectedEof`].
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), StorageError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_bytes(&mut buf[filled..])? {
                0 => return Err(StorageError::UnexpectedEof),
                n => filled += n,
            }
        }
        Ok(())
    }
}

/// Write side of a created file.
pub trait SinkStream {
    /// Write some of `buf`, returning how many bytes were accepted.
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, StorageError>;

    /// Push buffered bytes to the medium.
    fn flush_bytes(&mut self) -> Result<(), StorageError>;

    /// Write all of `buf`; a write that accepts nothing is
    /// [`StorageError::WriteZero`].
    fn write_all_bytes(&mut self, mut buf: &[u8]) -> Result<(), StorageError> {
        while !buf.is_empty() {
            match self.write_bytes(buf)? {
                0 => return Err(StorageError::WriteZero),
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }
}

/// File operations the crate needs from the medium.
pub trait Storage {
    type Source: SourceStream;
    type Sink: SinkStream;

    /// Open an existing file for reading.
    fn open_read(&mut self, path: &str) -> Result<Self::Source, StorageError>;

    /// Create (or truncate) a file for writing.
    fn create(&mut self, path: &str) -> Result<Self::Sink, StorageError>;

    /// Delete a file.
    fn remove(&mut self, path: &str) -> Result<(), StorageError>;

    /// Names of the files directly inside directory `path`.
    fn list_dir(&mut self, path: &str) -> Result<Vec<String>, StorageError>;
}

fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

type FileMap = Rc<RefCell<BTreeMap<String, Vec<u8>>>>;

/// In-memory storage.
///
/// Clones share the same files, so a test can keep a handle while the
/// transcoder writes through another. Writes land in the map immediately,
/// which makes partially written files observable.
#[derive(Clone, Debug, Default)]
pub struct MemStorage {
    files: FileMap,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` at `path`, replacing any existing file.
    pub fn insert(&self, path: &str, data: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(normalize(path), data.into());
    }

    /// Copy of the file at `path`.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(&normalize(path)).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.borrow().contains_key(&normalize(path))
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl Storage for MemStorage {
    type Source = MemSource;
    type Sink = MemSink;

    fn open_read(&mut self, path: &str) -> Result<MemSource, StorageError> {
        let path = normalize(path);
        if !self.files.borrow().contains_key(&path) {
            return Err(StorageError::NotFound(path));
        }
        Ok(MemSource {
            files: Rc::clone(&self.files),
            path,
            pos: 0,
        })
    }

    fn create(&mut self, path: &str) -> Result<MemSink, StorageError> {
        let path = normalize(path);
        if path.ends_with('/') {
            return Err(StorageError::InvalidPath(path));
        }
        self.files.borrow_mut().insert(path.clone(), Vec::new());
        Ok(MemSink {
            files: Rc::clone(&self.files),
            path,
        })
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path);
        match self.files.borrow_mut().remove(&path) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(path)),
        }
    }

    fn list_dir(&mut self, path: &str) -> Result<Vec<String>, StorageError> {
        let mut prefix = normalize(path);
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Ok(self
            .files
            .borrow()
            .keys()
            .filter_map(|k| k.strip_prefix(prefix.as_str()))
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .map(String::from)
            .collect())
    }
}

/// Reader returned by [`MemStorage::open_read`].
#[derive(Debug)]
pub struct MemSource {
    files: FileMap,
    path: String,
    pos: u64,
}

impl SourceStream for MemSource {
    fn seek_to(&mut self, pos: u64) -> Result<(), StorageError> {
        let files = self.files.borrow();
        let data = files
            .get(&self.path)
            .ok_or_else(|| StorageError::NotFound(self.path.clone()))?;
        if pos > data.len() as u64 {
            return Err(StorageError::UnexpectedEof);
        }
        self.pos = pos;
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let files = self.files.borrow();
        let data = files
            .get(&self.path)
            .ok_or_else(|| StorageError::NotFound(self.path.clone()))?;
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

/// Writer returned by [`MemStorage::create`].
#[derive(Debug)]
pub struct MemSink {
    files: FileMap,
    path: String,
}

impl SinkStream for MemSink {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, StorageError> {
        let mut files = self.files.borrow_mut();
        let data = files
            .get_mut(&self.path)
            .ok_or_else(|| StorageError::NotFound(self.path.clone()))?;
        data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush_bytes(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(feature = "std")]
pub use fs::{FsSink, FsSource, FsStorage};

#[cfg(feature = "std")]
mod fs {
    use super::{SinkStream, SourceStream, Storage};
    use crate::error::StorageError;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::path::{Component, Path, PathBuf};

    /// Storage rooted at a host directory; `/name` maps to `root/name`.
    #[derive(Clone, Debug)]
    pub struct FsStorage {
        root: PathBuf,
    }

    impl FsStorage {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        pub fn root(&self) -> &Path {
            &self.root
        }

        /// Host path for a storage path. `..` and prefixes are rejected.
        pub fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
            let relative = Path::new(path.trim_start_matches('/'));
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(StorageError::InvalidPath(path.to_string()));
            }
            Ok(self.root.join(relative))
        }
    }

    impl Storage for FsStorage {
        type Source = FsSource;
        type Sink = FsSink;

        fn open_read(&mut self, path: &str) -> Result<FsSource, StorageError> {
            let file = File::open(self.resolve(path)?)?;
            let len = file.metadata()?.len();
            Ok(FsSource { file, len })
        }

        fn create(&mut self, path: &str) -> Result<FsSink, StorageError> {
            let file = File::create(self.resolve(path)?)?;
            Ok(FsSink { file })
        }

        fn remove(&mut self, path: &str) -> Result<(), StorageError> {
            std::fs::remove_file(self.resolve(path)?)?;
            Ok(())
        }

        fn list_dir(&mut self, path: &str) -> Result<Vec<String>, StorageError> {
            let mut names = Vec::new();
            for entry in std::fs::read_dir(self.resolve(path)?)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            names.sort();
            Ok(names)
        }
    }

    /// Reader returned by [`FsStorage::open_read`].
    #[derive(Debug)]
    pub struct FsSource {
        file: File,
        len: u64,
    }

    impl SourceStream for FsSource {
        fn seek_to(&mut self, pos: u64) -> Result<(), StorageError> {
            if pos > self.len {
                return Err(StorageError::UnexpectedEof);
            }
            self.file.seek(SeekFrom::Start(pos))?;
            Ok(())
        }

        fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
            loop {
                match self.file.read(buf) {
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    other => return Ok(other?),
                }
            }
        }
    }

    /// Writer returned by [`FsStorage::create`].
    #[derive(Debug)]
    pub struct FsSink {
        file: File,
    }

    impl SinkStream for FsSink {
        fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, StorageError> {
            loop {
                match self.file.write(buf) {
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    other => return Ok(other?),
                }
            }
        }

        fn flush_bytes(&mut self) -> Result<(), StorageError> {
            self.file.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn mem_read_seek() {
        let mut storage = MemStorage::new();
        storage.insert("a.bin", vec![1u8, 2, 3, 4, 5]);

        let mut src = storage.open_read("/a.bin").unwrap();
        let mut buf = [0u8; 2];
        src.seek_to(3).unwrap();
        src.read_exact_bytes(&mut buf).unwrap();
        assert_eq!(buf, [4, 5]);

        src.seek_to(4).unwrap();
        assert!(matches!(
            src.read_exact_bytes(&mut buf),
            Err(StorageError::UnexpectedEof)
        ));
        assert!(matches!(src.seek_to(6), Err(StorageError::UnexpectedEof)));
        assert!(matches!(
            storage.open_read("/missing"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn mem_writes_are_visible_immediately() {
        let mut storage = MemStorage::new();
        let mut sink = storage.create("/out.bmp").unwrap();
        sink.write_all_bytes(b"BM").unwrap();
        assert_eq!(storage.get("/out.bmp").unwrap(), b"BM");

        storage.remove("/out.bmp").unwrap();
        assert!(!storage.contains("/out.bmp"));
        assert!(sink.write_all_bytes(b"x").is_err());
        assert!(matches!(
            storage.remove("/out.bmp"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn mem_list_dir_is_flat() {
        let mut storage = MemStorage::new();
        storage.insert("/b.bmp", vec![]);
        storage.insert("/a.bmp", vec![]);
        storage.insert("/sub/c.bmp", vec![]);
        assert_eq!(storage.list_dir("/").unwrap(), vec!["a.bmp", "b.bmp"]);
        assert_eq!(storage.list_dir("/sub").unwrap(), vec!["c.bmp"]);
    }
}
