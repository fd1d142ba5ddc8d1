//! Native OS directory backend.
//!
//! Serves one directory tree. Read opens pull the whole file into a
//! [`ReadBuffer`] in one shot; later reads are memory copies and survive
//! whatever happens to the file on disk. Write opens stream straight through
//! a `std::fs::File`.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::backend::Backend;
use crate::buffer::ReadBuffer;
use crate::error::{Result, VfsError};
use crate::file::FileOps;
use crate::mode::{AccessMode, OpenMode};

/// Backend over a native directory tree.
pub struct OsBackend {
    root: PathBuf,
    label: String,
}

impl OsBackend {
    /// Bind to an existing directory.
    ///
    /// Fails when the path cannot be stat'ed or is not a directory, so a
    /// bad search-path entry is caught at mount time, not first use.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let label = root.to_string_lossy().into_owned();
        let meta = std::fs::metadata(&root)?;
        if !meta.is_dir() {
            return Err(VfsError::NotADirectory(label));
        }
        Ok(OsBackend { root, label })
    }

    fn full_path(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl Backend for OsBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn open(&self, path: &str, mode: OpenMode) -> Option<Box<dyn FileOps>> {
        let full = self.full_path(path);
        match mode {
            OpenMode::Read => {
                let data = std::fs::read(full).ok()?;
                Some(Box::new(ReadBuffer::new(data)))
            }
            OpenMode::Write => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(full)
                    .ok()?;
                Some(Box::new(OsWriter { file }))
            }
            OpenMode::Append => unimplemented!("append mode"),
        }
    }

    fn access(&self, path: &str, mode: AccessMode) -> bool {
        match std::fs::metadata(self.full_path(path)) {
            Ok(meta) => match mode {
                AccessMode::Read => true,
                AccessMode::Write => !meta.permissions().readonly(),
            },
            Err(_) => false,
        }
    }

    fn list_dir(&self, path: &str) -> Option<Vec<String>> {
        let entries = std::fs::read_dir(self.full_path(path)).ok()?;
        Some(
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
        )
    }

    fn read_only(&self) -> bool {
        false
    }
}

impl fmt::Debug for OsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsBackend").field("root", &self.root).finish()
    }
}

/// Streaming write handle over an OS file.
pub(crate) struct OsWriter {
    file: File,
}

impl FileOps for OsWriter {
    fn write(&mut self, data: &[u8], size: usize, count: usize) -> usize {
        write_elements(&mut self.file, data, size, count)
    }

    fn put_str(&mut self, s: &str) -> Result<usize> {
        self.file.write_all(s.as_bytes())?;
        Ok(s.len())
    }

    fn put_char(&mut self, byte: u8) -> Result<usize> {
        self.file.write_all(&[byte])?;
        Ok(1)
    }

    fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> Result<usize> {
        let text = args.to_string();
        self.file.write_all(text.as_bytes())?;
        Ok(text.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}

/// Element-wise write shared by the streaming writers.
///
/// Mirrors the read-side law: an element is written completely or not at
/// all, and `size == 1` merges the request into one `count`-byte element.
pub(crate) fn write_elements<W: Write>(out: &mut W, data: &[u8], size: usize, count: usize) -> usize {
    let (size, count, merged) = if size == 1 {
        (count, 1, true)
    } else {
        (size, count, false)
    };
    if size == 0 || count == 0 {
        return 0;
    }
    for i in 0..count {
        let chunk = &data[i * size..(i + 1) * size];
        if out.write_all(chunk).is_err() {
            return if merged { 0 } else { i };
        }
    }
    if merged {
        size
    } else {
        count
    }
}
