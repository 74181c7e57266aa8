use duel_replays::Side;
use kinded::Kinded;
use serde::Serialize;
use std::collections::BTreeMap;
use variantly::Variantly;

use crate::error::{Error, Result};

/// A single named feature: one value, or one value per frame of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Kinded, Variantly)]
#[serde(untagged)]
pub enum FeatureValue {
    Scalar(f64),
    /// One value per frame, oldest first
    Sequence(Vec<f64>),
    /// Categorical value such as an item name
    Category(String),
    /// One categorical value per frame, oldest first
    Categories(Vec<String>),
}

impl FeatureValue {
    pub fn flag(value: bool) -> Self {
        FeatureValue::Scalar(if value { 1.0 } else { 0.0 })
    }

    /// Whether the value carries one entry per frame.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self.kind(),
            FeatureValueKind::Sequence | FeatureValueKind::Categories
        )
    }

    /// Number of frames covered; 1 for single values.
    pub fn frames(&self) -> usize {
        match self {
            FeatureValue::Scalar(_) | FeatureValue::Category(_) => 1,
            FeatureValue::Sequence(values) => values.len(),
            FeatureValue::Categories(values) => values.len(),
        }
    }

    /// Keeps only the last frame of a per-frame value. Empty sequences stay as they are.
    pub fn into_last(self) -> Self {
        match self {
            FeatureValue::Sequence(mut values) => match values.pop() {
                Some(last) => FeatureValue::Scalar(last),
                None => FeatureValue::Sequence(values),
            },
            FeatureValue::Categories(mut values) => match values.pop() {
                Some(last) => FeatureValue::Category(last),
                None => FeatureValue::Categories(values),
            },
            single => single,
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Scalar(v)
    }
}

impl From<Vec<f64>> for FeatureValue {
    fn from(v: Vec<f64>) -> Self {
        FeatureValue::Sequence(v)
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Category(v)
    }
}

impl From<Vec<String>> for FeatureValue {
    fn from(v: Vec<String>) -> Self {
        FeatureValue::Categories(v)
    }
}

/// Named features of one sample, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature. A name can only be used once per record.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FeatureValue>,
    ) -> Result<()> {
        let name = name.into();
        if self.values.contains_key(&name) {
            return Err(Error::KeyCollision { key: name });
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Moves every feature of `other` into this record. Fails without
    /// modifying `self` if any name is already present.
    pub fn merge(&mut self, other: FeatureRecord) -> Result<()> {
        let mut names = other.values.keys();
        if let Some(key) = names.find(|key| self.values.contains_key(*key)) {
            return Err(Error::KeyCollision { key: key.clone() });
        }
        self.values.extend(other.values);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every per-frame value with its last frame.
    pub fn collapse_to_last(self) -> Self {
        Self {
            values: self
                .values
                .into_iter()
                .map(|(name, value)| (name, value.into_last()))
                .collect(),
        }
    }

    /// Splits into (per-frame features, single-value features).
    pub fn split_temporal(self) -> (FeatureRecord, FeatureRecord) {
        let (temporal, snapshot) = self
            .values
            .into_iter()
            .partition(|(_, value)| value.is_temporal());
        (
            FeatureRecord { values: temporal },
            FeatureRecord { values: snapshot },
        )
    }
}

impl IntoIterator for FeatureRecord {
    type Item = (String, FeatureValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FeatureValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Feature records and their labels, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub features: Vec<FeatureRecord>,
    /// Side of the player who won each duel
    pub labels: Vec<Side>,
}

impl Extraction {
    pub fn push(&mut self, features: FeatureRecord, label: Side) {
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn append(&mut self, other: Extraction) {
        self.features.extend(other.features);
        self.labels.extend(other.labels);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureRecord, Side)> {
        self.features.iter().zip(self.labels.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, FeatureValue)]) -> FeatureRecord {
        let mut record = FeatureRecord::new();
        for (name, value) in pairs {
            record.insert(*name, value.clone()).unwrap();
        }
        record
    }

    #[test]
    fn merge_disjoint_groups() {
        let mut a = record(&[("attacker_hp", vec![100.0, 90.0].into())]);
        let b = record(&[("defender_hp", vec![100.0, 100.0].into())]);
        a.merge(b).unwrap();
        let names: Vec<_> = a.names().collect();
        assert_eq!(names, vec!["attacker_hp", "defender_hp"]);
    }

    #[test]
    fn merge_collision_leaves_record_untouched() {
        let mut a = record(&[("attacker_hp", 1.0.into())]);
        let b = record(&[("attacker_hp", 2.0.into()), ("zzz", 3.0.into())]);
        let err = a.merge(b).unwrap_err();
        assert!(matches!(err, Error::KeyCollision { key } if key == "attacker_hp"));
        assert_eq!(a.len(), 1);
        assert_eq!(a.get("attacker_hp"), Some(&FeatureValue::Scalar(1.0)));
    }

    #[test]
    fn insert_rejects_duplicate_name() {
        let mut a = record(&[("cash", 1.0.into())]);
        assert!(a.insert("cash", 2.0).is_err());
    }

    #[test]
    fn collapse_keeps_last_frame() {
        let collapsed = record(&[
            ("hp", vec![100.0, 80.0, 40.0].into()),
            ("item", vec!["knife".to_string(), "awp".to_string()].into()),
            ("kd", 1.5.into()),
        ])
        .collapse_to_last();
        assert_eq!(collapsed.get("hp"), Some(&FeatureValue::Scalar(40.0)));
        assert_eq!(
            collapsed.get("item"),
            Some(&FeatureValue::Category("awp".to_string()))
        );
        assert_eq!(collapsed.get("kd"), Some(&FeatureValue::Scalar(1.5)));
    }

    #[test]
    fn split_temporal_from_snapshot() {
        let (temporal, snapshot) = record(&[
            ("hp", vec![100.0, 80.0].into()),
            ("kd", 1.5.into()),
            ("item", "awp".to_string().into()),
        ])
        .split_temporal();
        assert_eq!(temporal.names().collect::<Vec<_>>(), vec!["hp"]);
        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["item", "kd"]);
        assert!(temporal.get("hp").unwrap().is_sequence());
    }

    #[test]
    fn serializes_as_plain_map() {
        let json = serde_json::to_value(record(&[
            ("hp", vec![100.0, 80.0].into()),
            ("kd", 1.5.into()),
        ]))
        .unwrap();
        assert_eq!(json, serde_json::json!({ "hp": [100.0, 80.0], "kd": 1.5 }));
    }
}
