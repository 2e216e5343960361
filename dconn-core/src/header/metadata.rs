//! Key/value metadata attached to the file header
//!
//! Mirrors the metadata block of the CIFTI XML header. Map content takes a
//! snapshot of this on every row load.

use hashbrown::HashMap;

/// Free-form name/value metadata.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetaData {
    entries: HashMap<String, String>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut md = MetaData::new();
        md.set("Provenance", "generated");
        assert_eq!(md.get("Provenance"), Some("generated"));
        assert_eq!(md.len(), 1);
        assert_eq!(md.remove("Provenance"), Some("generated".to_string()));
        assert!(md.is_empty());
    }
}
