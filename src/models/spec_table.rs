use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Label the source site uses for rows without a title of their own
/// (a lone `&nbsp;` cell). Such rows continue the row above them.
pub const CONTINUATION_LABEL: &str = "\u{a0}";

/// Normalize a lookup key so callers can address the continuation label
/// with plain spaces: every pair of consecutive spaces becomes one NBSP.
pub fn normalize_label(key: &str) -> String {
    key.replace("  ", CONTINUATION_LABEL)
}

/// One titled block of a spec table ("BODY", "DISPLAY", ...).
///
/// Entries keep source order. Writing a label that already exists replaces
/// the value in place, so the position of the first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCategory {
    name: String,
    entries: Vec<(String, String)>,
}

impl SpecCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }
}

/// Two-level ordered map: category -> label -> raw text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecTable {
    categories: Vec<SpecCategory>,
}

impl SpecTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn category(&self, name: &str) -> Option<&SpecCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Returns the named category, creating it at the end if needed.
    pub fn category_mut(&mut self, name: &str) -> &mut SpecCategory {
        let index = match self.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.categories.push(SpecCategory::new(name));
                self.categories.len() - 1
            }
        };
        &mut self.categories[index]
    }

    pub fn insert(
        &mut self,
        category: &str,
        label: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.category_mut(category).insert(label, value);
    }

    /// Resolve `(category, key)` to its raw value, or `default`.
    ///
    /// The key goes through [`normalize_label`] first. A missing category
    /// and a missing key are treated the same way.
    pub fn lookup<'a>(&'a self, category: &str, key: &str, default: &'a str) -> &'a str {
        let key = normalize_label(key);
        self.category(category)
            .and_then(|c| c.get(&key))
            .unwrap_or(default)
    }

    /// [`SpecTable::lookup`] with an empty default.
    pub fn get(&self, category: &str, key: &str) -> &str {
        self.lookup(category, key, "")
    }

    /// First non-empty value among `keys`, tried in order.
    pub fn first_non_empty<S: AsRef<str>>(&self, category: &str, keys: &[S]) -> &str {
        keys.iter()
            .map(|key| self.get(category, key.as_ref()))
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }
}

impl<C, L, V> FromIterator<(C, L, V)> for SpecTable
where
    C: AsRef<str>,
    L: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, L, V)>>(iter: I) -> Self {
        let mut table = SpecTable::new();
        for (category, label, value) in iter {
            table.insert(category.as_ref(), label, value);
        }
        table
    }
}

impl Serialize for SpecCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl Serialize for SpecTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, category)?;
        }
        map.end()
    }
}

/// Label/value pairs of one category, in document order.
struct EntryList(Vec<(String, String)>);

impl<'de> Deserialize<'de> for EntryList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryListVisitor;

        impl<'de> Visitor<'de> for EntryListVisitor {
            type Value = EntryList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of spec labels to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EntryList, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, value)) = access.next_entry::<String, String>()? {
                    entries.push((label, value));
                }
                Ok(EntryList(entries))
            }
        }

        deserializer.deserialize_map(EntryListVisitor)
    }
}

impl<'de> Deserialize<'de> for SpecTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecTableVisitor;

        impl<'de> Visitor<'de> for SpecTableVisitor {
            type Value = SpecTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of spec categories")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SpecTable, A::Error> {
                let mut table = SpecTable::new();
                while let Some((name, EntryList(entries))) =
                    access.next_entry::<String, EntryList>()?
                {
                    let category = table.category_mut(&name);
                    for (label, value) in entries {
                        category.insert(label, value);
                    }
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(SpecTableVisitor)
    }
}
