//! Mount chain and dispatcher façade.
//!
//! A [`Vfs`] owns an ordered list of backend mounts built from a delimited
//! search-path list. Path-based operations (open, access, open_dir) walk the
//! chain in order and the first backend to satisfy the request wins, so
//! earlier mounts shadow later ones. Handle-bound operations never come back
//! here; an open [`File`] carries its backend binding with it.
//!
//! There is no negative caching: probing for a file that exists nowhere
//! re-scans every mount on every call. Fine for a load-once asset pipeline;
//! think twice before putting this on a hot path.

use tracing::{debug, info, warn};

use crate::backend::{Backend, DirIter};
use crate::backends::{OsBackend, ZipBackend};
use crate::error::{Result, VfsError};
use crate::file::File;
use crate::mode::{AccessMode, OpenMode};
use crate::resolve::locate_correct_case;

/// The virtual filesystem: an ordered chain of backend mounts.
pub struct Vfs {
    mounts: Vec<Box<dyn Backend>>,
    /// Destination mount for write opens.
    write_index: Option<usize>,
}

impl Vfs {
    /// Mount every root in a `;`- or `:`-delimited search-path list.
    ///
    /// A `.zip` suffix (any case) selects the archive backend; anything else
    /// must be a directory. Entries that fail to mount are logged and
    /// skipped. An empty resulting chain is fatal: the engine cannot run
    /// without at least one asset root. The first writable mount becomes the
    /// write root.
    pub fn new(search_paths: &str) -> Result<Self> {
        let mut mounts: Vec<Box<dyn Backend>> = Vec::new();
        for spec in search_paths
            .split([';', ':'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let mounted: Result<Box<dyn Backend>> =
                if spec.to_ascii_lowercase().ends_with(".zip") {
                    ZipBackend::open_path(spec).map(|b| Box::new(b) as Box<dyn Backend>)
                } else {
                    OsBackend::new(spec).map(|b| Box::new(b) as Box<dyn Backend>)
                };
            match mounted {
                Ok(backend) => {
                    info!("search path: {}", backend.label());
                    mounts.push(backend);
                }
                Err(e) => {
                    warn!("skipping search path {}: {}", spec, e);
                }
            }
        }
        Self::with_mounts(mounts)
            .map_err(|_| VfsError::NoSearchPath(search_paths.to_string()))
    }

    /// Mount the roots named by an environment variable, defaulting to the
    /// current directory when the variable is unset.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(paths) => Self::new(&paths),
            Err(_) => {
                info!("{} is not set, assuming '.'", var);
                Self::new(".")
            }
        }
    }

    /// Build a chain from pre-constructed backends, in shadowing order.
    ///
    /// This is the seam tests use to assemble independent instances without
    /// touching process-wide state.
    pub fn with_mounts(mounts: Vec<Box<dyn Backend>>) -> Result<Self> {
        if mounts.is_empty() {
            return Err(VfsError::NoSearchPath(String::new()));
        }
        let write_index = mounts.iter().position(|m| !m.read_only());
        if let Some(i) = write_index {
            info!("write path: {}", mounts[i].label());
        }
        Ok(Vfs {
            mounts,
            write_index,
        })
    }

    /// Mount labels in shadowing order.
    pub fn mount_labels(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|m| m.label())
    }

    /// Open a file.
    ///
    /// The mode string follows `fopen` conventions; see
    /// [`OpenMode::parse`]. Read opens walk the chain, falling back to
    /// case-corrected retries on a miss. Write opens go to the write root
    /// only. Append panics: no backend implements it, and silently
    /// truncating instead has caused data-loss bugs before.
    pub fn open(&self, path: &str, mode: &str) -> Option<File> {
        let mode = OpenMode::parse(mode)?;
        let path = normalize(path);
        match mode {
            OpenMode::Read => {
                for backend in &self.mounts {
                    if let Some(ops) = backend.open(&path, mode) {
                        return Some(File::new(ops, mode));
                    }
                    if let Some(corrected) = locate_correct_case(backend.as_ref(), &path) {
                        if let Some(ops) = backend.open(&corrected, mode) {
                            return Some(File::new(ops, mode));
                        }
                    }
                }
                None
            }
            OpenMode::Write => {
                let index = match self.write_index {
                    Some(i) => i,
                    None => {
                        debug!("write open of {} with no write root", path);
                        return None;
                    }
                };
                let backend = &self.mounts[index];
                // Overwrite an existing file that differs only in case
                // instead of creating a second spelling next to it.
                let target =
                    locate_correct_case(backend.as_ref(), &path).unwrap_or(path);
                backend.open(&target, mode).map(|ops| File::new(ops, mode))
            }
            OpenMode::Append => {
                let index = self.write_index.unwrap_or(0);
                self.mounts[index]
                    .open(&path, mode)
                    .map(|ops| File::new(ops, mode))
            }
        }
    }

    /// Check whether `path` exists (and is writable, for
    /// [`AccessMode::Write`]) in any mount.
    pub fn access(&self, path: &str, mode: AccessMode) -> bool {
        let path = normalize(path);
        for backend in &self.mounts {
            if backend.access(&path, mode) {
                return true;
            }
            if let Some(corrected) = locate_correct_case(backend.as_ref(), &path) {
                if backend.access(&corrected, mode) {
                    return true;
                }
            }
        }
        false
    }

    /// Enumerate a directory from the first mount that has it.
    pub fn open_dir(&self, path: &str) -> Option<DirIter> {
        let path = normalize(path);
        for backend in &self.mounts {
            if let Some(names) = backend.list_dir(&path) {
                return Some(DirIter::new(names));
            }
            if let Some(corrected) = locate_correct_case(backend.as_ref(), &path) {
                if let Some(names) = backend.list_dir(&corrected) {
                    return Some(DirIter::new(names));
                }
            }
        }
        None
    }

    /// Designate the mount serving `path` as the destination for write
    /// opens, mounting the directory first if it is not in the chain.
    pub fn set_write_root(&mut self, path: &str) -> Result<()> {
        if let Some(i) = self.mounts.iter().position(|m| m.label() == path) {
            self.write_index = Some(i);
        } else {
            let backend = OsBackend::new(path)?;
            self.mounts.push(Box::new(backend));
            self.write_index = Some(self.mounts.len() - 1);
        }
        info!("write path: {}", path);
        Ok(())
    }

    /// Change the working directory. Not implemented by any backend; fails
    /// loudly rather than silently no-oping.
    pub fn change_dir(&self, path: &str) -> Result<()> {
        self.mounts[0].change_dir(path)
    }

    /// Delete a file. Not implemented; fails loudly.
    pub fn remove(&self, _path: &str) -> Result<()> {
        unimplemented!("remove")
    }

    /// Rename a file. Not implemented; fails loudly.
    pub fn rename(&self, _from: &str, _to: &str) -> Result<()> {
        unimplemented!("rename")
    }
}

impl std::fmt::Debug for Vfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vfs")
            .field("mounts", &self.mounts.len())
            .field("write_index", &self.write_index)
            .finish()
    }
}

/// Normalize a caller path: forward slashes, no leading slash.
fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}
