//! Insertion-ordered column bags for flat rows and model instances.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::value::Value;

/// An ordered set of `column => value` pairs.
///
/// Column order is the order of first insertion; overwriting a column keeps
/// its position. Lookups are linear, which is cheaper than hashing for the
/// handful of columns a joined row carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: SmallVec<[(CompactString, Value); 8]>,
}

impl Attributes {
    pub const fn new() -> Self {
        Self {
            entries: SmallVec::new_const(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Sets `column`, returning the previous value if it was already present.
    pub fn insert(
        &mut self,
        column: impl Into<CompactString>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.entries.push((column, value));
                None
            }
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(name, _)| name == column)?;
        Some(self.entries.remove(index).1)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.entries.retain(|(name, value)| keep(name, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<CompactString>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        attributes.extend(iter);
        attributes
    }
}

impl<K: Into<CompactString>, V: Into<Value>> Extend<(K, V)> for Attributes {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (column, value) in iter {
            self.insert(column, value);
        }
    }
}

impl IntoIterator for Attributes {
    type Item = (CompactString, Value);
    type IntoIter = smallvec::IntoIter<[(CompactString, Value); 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Attributes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Builds [`Attributes`] from `"column" => value` pairs.
///
/// ```
/// use joinery_core::{attributes, Value};
///
/// let row = attributes! { "id" => 1, "name" => "x", "deleted_at" => Value::Null };
/// assert_eq!(row.len(), 3);
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut attributes = $crate::Attributes::new();
        $(
            attributes.insert($column, $value);
        )+
        attributes
    }};
}
