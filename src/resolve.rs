//! Case-insensitive path correction.
//!
//! Asset references were authored on a case-insensitive filesystem; when the
//! backing store enforces case, a direct miss gets one fallback pass that
//! rebuilds the path component by component from the backend's own directory
//! listings.

use crate::backend::Backend;

/// Find the stored spelling of `path`, differing only in letter case.
///
/// Walks the path one component at a time: an exact entry wins, otherwise
/// the first case-insensitive match substitutes its stored spelling. Returns
/// `None` when a component has no match at all, or when the corrected path
/// is identical to the request (nothing to retry).
pub(crate) fn locate_correct_case(backend: &dyn Backend, path: &str) -> Option<String> {
    let mut corrected = String::new();
    for component in path.split('/').filter(|c| !c.is_empty()) {
        let entries = backend.list_dir(&corrected)?;
        let found = if entries.iter().any(|e| e == component) {
            component.to_string()
        } else {
            entries
                .iter()
                .find(|e| e.eq_ignore_ascii_case(component))?
                .clone()
        };
        if !corrected.is_empty() {
            corrected.push('/');
        }
        corrected.push_str(&found);
    }
    if corrected == path {
        None
    } else {
        Some(corrected)
    }
}
