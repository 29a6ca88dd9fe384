use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{MatchTag, RuleId};

/// Row counts per final tag. Every tag 0–11 is present, zeros included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub by_tag: BTreeMap<u8, usize>,
    pub preset: usize,
}

impl Default for MatchStats {
    fn default() -> Self {
        Self {
            by_tag: (0..=RuleId::MAX).map(|t| (t, 0)).collect(),
            preset: 0,
        }
    }
}

impl MatchStats {
    pub fn from_tags(tags: &[MatchTag]) -> Self {
        let mut stats = Self::default();
        for tag in tags {
            match tag.number() {
                Some(n) => *stats.by_tag.entry(n).or_default() += 1,
                None => stats.preset += 1,
            }
        }
        stats
    }

    pub fn count(&self, tag: u8) -> usize {
        self.by_tag.get(&tag).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.by_tag.values().sum::<usize>() + self.preset
    }

    /// Rows carrying a rule tag 1–11.
    pub fn matched(&self) -> usize {
        self.by_tag.iter().filter(|(t, _)| **t != 0).map(|(_, n)| n).sum()
    }

    pub fn unmatched(&self) -> usize {
        self.count(0)
    }
}
