//! The ordered, per-class field table.

use indexmap::IndexMap;

use crate::field::FieldSpec;

/// Ordered mapping from field name to [`FieldSpec`].
///
/// Built once per class at reification time, in declaration order, and never
/// mutated afterward. Instances share it through their class descriptor.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: IndexMap<String, FieldSpec>,
}

impl FieldTable {
    pub(crate) fn from_entries(fields: IndexMap<String, FieldSpec>) -> Self {
        Self { fields }
    }

    /// Looks up a field's spec by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Returns `true` if `name` is a field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the class declared no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(name, spec)` pairs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn preserves_insertion_order() {
        let mut entries = IndexMap::new();
        entries.insert("zeta".to_string(), FieldSpec::new(1));
        entries.insert("alpha".to_string(), FieldSpec::new(2));
        entries.insert("mid".to_string(), FieldSpec::new(3));

        let table = FieldTable::from_entries(entries);
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(table.len(), 3);
        assert!(table.contains("alpha"));
        assert!(!table.contains("omega"));
    }
}
