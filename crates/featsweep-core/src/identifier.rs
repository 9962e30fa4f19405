use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifier for one unit of work (a feature index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u64);

impl FeatureId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered, duplicate-free sequence of feature identifiers.
///
/// Built in a single pass: the first occurrence of a value fixes its position
/// and later occurrences are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentifierSequence {
    ids: Vec<FeatureId>,
}

impl IdentifierSequence {
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureId> {
        self.ids.iter()
    }
}

impl FromIterator<FeatureId> for IdentifierSequence {
    fn from_iter<I: IntoIterator<Item = FeatureId>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let ids = iter.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { ids }
    }
}

impl FromIterator<u64> for IdentifierSequence {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        iter.into_iter().map(FeatureId).collect()
    }
}
