//! In-memory backend.
//!
//! A writable store over a plain path-to-bytes map. Handy as a mounted package
//! for tools and as a fixture for tests that should not touch the disk.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::Backend;
use crate::buffer::ReadBuffer;
use crate::error::Result;
use crate::file::FileOps;
use crate::mode::{AccessMode, OpenMode};

type FileMap = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

/// Backend over an in-memory path-to-bytes map.
///
/// Clones share the same store, so a test can keep a view of a mounted
/// backend's contents.
#[derive(Clone)]
pub struct MemBackend {
    label: String,
    files: FileMap,
}

impl MemBackend {
    pub fn new(label: impl Into<String>) -> Self {
        MemBackend {
            label: label.into(),
            files: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Seed a file, replacing any previous contents.
    pub fn insert(&self, path: impl Into<String>, contents: &[u8]) {
        self.files.lock().insert(path.into(), contents.to_vec());
    }
}

impl Backend for MemBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn open(&self, path: &str, mode: OpenMode) -> Option<Box<dyn FileOps>> {
        match mode {
            OpenMode::Read => {
                let data = self.files.lock().get(path)?.clone();
                Some(Box::new(ReadBuffer::new(data)))
            }
            OpenMode::Write => Some(Box::new(MemWriter {
                files: Arc::clone(&self.files),
                path: path.to_string(),
                buf: Vec::new(),
            })),
            OpenMode::Append => unimplemented!("append mode"),
        }
    }

    fn access(&self, path: &str, _mode: AccessMode) -> bool {
        // The store itself is always writable, so both checks reduce to
        // existence.
        self.files.lock().contains_key(path)
    }

    fn list_dir(&self, path: &str) -> Option<Vec<String>> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };
        let files = self.files.lock();
        let mut out: Vec<String> = files
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').find(|c| !c.is_empty()))
            .map(str::to_string)
            .collect();
        out.sort();
        out.dedup();
        if out.is_empty() && !path.is_empty() {
            return None;
        }
        Some(out)
    }

    fn read_only(&self) -> bool {
        false
    }
}

impl fmt::Debug for MemBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemBackend")
            .field("label", &self.label)
            .field("files", &self.files.lock().len())
            .finish()
    }
}

/// Write handle that commits its bytes to the map on flush or drop.
struct MemWriter {
    files: FileMap,
    path: String,
    buf: Vec<u8>,
}

impl MemWriter {
    fn commit(&mut self) {
        self.files
            .lock()
            .insert(self.path.clone(), self.buf.clone());
    }
}

impl FileOps for MemWriter {
    fn write(&mut self, data: &[u8], size: usize, count: usize) -> usize {
        super::os::write_elements(&mut self.buf, data, size, count)
    }

    fn put_str(&mut self, s: &str) -> Result<usize> {
        self.buf.extend_from_slice(s.as_bytes());
        Ok(s.len())
    }

    fn put_char(&mut self, byte: u8) -> Result<usize> {
        self.buf.push(byte);
        Ok(1)
    }

    fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> Result<usize> {
        let text = args.to_string();
        self.buf.extend_from_slice(text.as_bytes());
        Ok(text.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
