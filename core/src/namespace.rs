//! Column namespacing for joined relation data.
//!
//! A related column survives the flat result row as
//! `<relation>_TEMP_<field>`, e.g. `category_TEMP_name`. The marker is
//! reserved: no model, field or relation name may contain it.

use compact_str::{CompactString, format_compact};

use crate::error::{JoineryError, Result};

/// Token separating the relation segment from the field in a namespaced column.
pub const TEMP_MARKER: &str = "_TEMP_";

/// Builds the namespaced alias for `field` of relation `segment`.
pub fn alias(segment: &str, field: &str) -> CompactString {
    format_compact!("{segment}{TEMP_MARKER}{field}")
}

/// Splits a namespaced column into `(segment, field)` at the first marker.
pub fn split(column: &str) -> Option<(&str, &str)> {
    column.split_once(TEMP_MARKER)
}

/// Returns `true` if `column` is a namespaced column of `segment`.
pub fn belongs_to(column: &str, segment: &str) -> bool {
    split(column).is_some_and(|(prefix, _)| prefix == segment)
}

/// Replaces every marker in `column` with a single underscore.
///
/// `category_TEMP_name` becomes `category_name`.
pub fn flatten(column: &str) -> CompactString {
    if column.contains(TEMP_MARKER) {
        CompactString::from(column.replace(TEMP_MARKER, "_"))
    } else {
        CompactString::from(column)
    }
}

/// Rejects names that would be ambiguous inside a namespaced column.
pub fn ensure_unreserved(name: &str) -> Result<()> {
    if name.contains(TEMP_MARKER) {
        return Err(JoineryError::ReservedMarker(name.into()));
    }
    Ok(())
}
