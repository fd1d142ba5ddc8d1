//! Zip archive backend.
//!
//! Read-only. Entry lookups are case-insensitive, the way the game's asset
//! archives were authored. Opening an entry inflates it completely into a
//! [`ReadBuffer`]; the archive handle is only touched at open time, so
//! handles stay valid no matter what happens to the archive afterwards.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use parking_lot::Mutex;
use zip::ZipArchive;

use crate::backend::Backend;
use crate::buffer::ReadBuffer;
use crate::error::Result;
use crate::file::FileOps;
use crate::mode::{AccessMode, OpenMode};

/// Backend over a zip archive.
pub struct ZipBackend {
    label: String,
    archive: Mutex<ZipArchive<File>>,
    /// Entry names in index order, snapshotted at mount time.
    names: Vec<String>,
}

impl ZipBackend {
    /// Open an archive from disk.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let label = path.to_string_lossy().into_owned();
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            names.push(archive.by_index_raw(i)?.name().to_string());
        }
        Ok(ZipBackend {
            label,
            archive: Mutex::new(archive),
            names,
        })
    }

    /// Entry index for `path`, exact match first, then case-insensitive.
    fn locate(&self, path: &str) -> Option<usize> {
        let is_file = |n: &str| !n.ends_with('/');
        self.names
            .iter()
            .position(|n| n == path && is_file(n))
            .or_else(|| {
                self.names
                    .iter()
                    .position(|n| n.eq_ignore_ascii_case(path) && is_file(n))
            })
    }
}

impl Backend for ZipBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn open(&self, path: &str, mode: OpenMode) -> Option<Box<dyn FileOps>> {
        match mode {
            OpenMode::Read => {
                let index = self.locate(path)?;
                let mut archive = self.archive.lock();
                let mut entry = archive.by_index(index).ok()?;
                let mut data = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut data).ok()?;
                Some(Box::new(ReadBuffer::new(data)))
            }
            OpenMode::Write => unimplemented!("writing into a zip archive"),
            OpenMode::Append => unimplemented!("append mode"),
        }
    }

    fn access(&self, path: &str, mode: AccessMode) -> bool {
        match mode {
            AccessMode::Read => self.locate(path).is_some(),
            // Archives are immutable once mounted.
            AccessMode::Write => false,
        }
    }

    fn list_dir(&self, path: &str) -> Option<Vec<String>> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };
        let mut out: Vec<String> = self
            .names
            .iter()
            .filter_map(|n| n.strip_prefix(&prefix))
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
}

impl fmt::Debug for ZipBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipBackend")
            .field("label", &self.label)
            .field("entries", &self.names.len())
            .finish()
    }
}
