//! Layered Virtual Filesystem
//!
//! A uniform file-access layer for game asset loading. Engine code opens,
//! reads, and enumerates assets through one API and never learns whether a
//! file lives in a plain directory, inside a zip archive, or in memory.
//!
//! ## Features
//!
//! - **Ordered mount chain**: roots are searched in order; the first mount
//!   with a matching name wins, so patch directories shadow base archives
//! - **Stable handle model**: a handle stays bound to the backend that
//!   opened it; later mounts cannot capture it
//! - **Fully-buffered reads**: read opens pull the whole file into memory
//!   once, then every read is a memory copy with exact `stdio`-style
//!   semantics (EOF sentinel, single-slot pushback, partial-read counts)
//! - **Streamed writes** routed to one designated write root
//! - **Case-insensitive fallback** for asset references authored on a
//!   case-insensitive filesystem
//!
//! ## Modules
//!
//! - [`vfs`] - Mount chain and the dispatching façade
//! - [`backend`] - The backend contract and directory iteration
//! - [`backends`] - Drivers: OS directory, zip archive, in-memory
//! - [`buffer`] - Buffered read payload and its cursor/EOF rules
//! - [`file`] - File handles and the per-handle operation table
//! - [`scan`] - Formatted parsing with exact consumed-byte tracking
//! - [`mode`] - Open modes, access checks, seek origins
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use assetfs::Vfs;
//!
//! let vfs = Vfs::new("patches;assets.zip;base")?;
//! let mut file = vfs.open("data/cars/eagle.txt", "r").expect("missing asset");
//! while let Some(line) = file.read_line(256) {
//!     println!("{}", line.trim_end());
//! }
//! # Ok::<(), assetfs::VfsError>(())
//! ```
//!
//! ## Data flow
//!
//! ```text
//! caller ──▶ Vfs (walk mount chain / route by handle)
//!               ├─▶ OsBackend   ── std::fs
//!               ├─▶ ZipBackend  ── zip archive, inflated at open
//!               └─▶ MemBackend  ── in-memory map
//! ```
//!
//! The layer is single-threaded and synchronous: every call blocks until
//! the storage primitive completes, handles are exclusively owned, and the
//! chain is immutable once built.

pub mod backend;
pub mod backends;
pub mod buffer;
pub mod error;
pub mod file;
pub mod mode;
mod resolve;
pub mod scan;
pub mod vfs;

// Re-export commonly used types
pub use backend::{Backend, DirIter};
pub use backends::{MemBackend, OsBackend, ZipBackend};
pub use buffer::ReadBuffer;
pub use error::{Result, VfsError};
pub use file::{File, FileOps};
pub use mode::{AccessMode, OpenMode, Whence};
pub use scan::ScanValue;
pub use vfs::Vfs;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
