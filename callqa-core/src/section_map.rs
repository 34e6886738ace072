//! Insertion-ordered map keyed by section name.
//!
//! Rubric sections and per-section verdicts are JSON objects on the wire, but
//! their order is what the supervisor sees, so the map keeps insertion order
//! and refuses duplicate keys when decoding.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Ordered `name -> V` map. Names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for SectionMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> SectionMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Insert or replace. New names are appended; replaced names keep their slot.
    ///
    /// # Returns
    /// The previous value stored under `name`, if any
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        match self.position(&name) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Remove `name`, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        let index = self.position(name)?;
        Some(self.entries.remove(index).1)
    }

    /// Change the key of an entry in place.
    ///
    /// Returns false if `old` is absent or `new` is already taken by another entry.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> bool {
        let new = new.into();
        if old != new && self.contains_key(&new) {
            return false;
        }
        match self.position(old) {
            Some(index) => {
                self.entries[index].0 = new;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries
            .iter_mut()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl<V> FromIterator<(String, V)> for SectionMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = SectionMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<V> IntoIterator for SectionMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for SectionMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct SectionMapVisitor<V> {
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for SectionMapVisitor<V> {
    type Value = SectionMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of section names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = SectionMap {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        while let Some((name, value)) = access.next_entry::<String, V>()? {
            if map.contains_key(&name) {
                return Err(de::Error::custom(format!("duplicate section `{}`", name)));
            }
            map.entries.push((name, value));
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for SectionMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SectionMapVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SectionMap<u32> {
        vec![
            ("Greeting".to_string(), 1),
            ("Verification".to_string(), 2),
            ("Closing".to_string(), 3),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_appends_and_replaces_in_place() {
        let mut map = sample();
        assert_eq!(map.insert("Verification", 20), Some(2));
        assert_eq!(map.insert("Hold", 4), None);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["Greeting", "Verification", "Closing", "Hold"]);
        assert_eq!(map.get("Verification"), Some(&20));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map = sample();
        assert_eq!(map.remove("Verification"), Some(2));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["Greeting", "Closing"]);
        assert_eq!(map.remove("Verification"), None);
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut map = sample();
        assert!(map.rename("Verification", "Identity Check"));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["Greeting", "Identity Check", "Closing"]);
        assert_eq!(map.get("Identity Check"), Some(&2));
    }

    #[test]
    fn test_rename_refuses_collision() {
        let mut map = sample();
        assert!(!map.rename("Greeting", "Closing"));
        assert_eq!(map, sample());
        assert!(!map.rename("Missing", "Other"));
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let json = r#"{"Zeta":1,"Alpha":2,"Mid":3}"#;
        let map: SectionMap<u32> = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(serde_json::to_string(&map).unwrap(), json);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let json = r#"{"Greeting":1,"Greeting":2}"#;
        let err = serde_json::from_str::<SectionMap<u32>>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate section"));
    }
}
