//! Storage backend drivers.
//!
//! One driver per backing store kind. Each is self-contained and knows
//! nothing about the others; the mount chain composes them.

pub mod mem;
pub mod os;
pub mod zip;

pub use mem::MemBackend;
pub use os::OsBackend;
pub use zip::ZipBackend;
