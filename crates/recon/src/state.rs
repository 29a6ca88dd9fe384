use crate::model::{MatchTag, RuleId};
use crate::normalize::NormalizedRow;

/// Shared per-row match state the rules operate on.
///
/// A tag moves from `Unmatched` to `Rule(id)` at most once; `claim` refuses to
/// touch any row that already carries a tag.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    rows: Vec<NormalizedRow>,
}

impl MatchState {
    pub fn new(rows: Vec<NormalizedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn tag(&self, idx: usize) -> Option<&MatchTag> {
        self.rows.get(idx).map(|r| &r.tag)
    }

    pub fn is_unmatched(&self, idx: usize) -> bool {
        self.rows.get(idx).is_some_and(|r| r.tag.is_unmatched())
    }

    /// Rows still tagged 0, in original order.
    pub fn unmatched(&self) -> impl Iterator<Item = (usize, &NormalizedRow)> {
        self.rows.iter().enumerate().filter(|(_, r)| r.tag.is_unmatched())
    }

    /// Tag an unmatched row. Returns false (and changes nothing) otherwise.
    pub fn claim(&mut self, idx: usize, rule: RuleId) -> bool {
        match self.rows.get_mut(idx) {
            Some(row) if row.tag.is_unmatched() => {
                row.tag = MatchTag::Rule(rule);
                true
            }
            _ => false,
        }
    }

    /// Claim every index; returns how many were actually tagged.
    pub fn claim_all(&mut self, indices: &[usize], rule: RuleId) -> usize {
        indices.iter().filter(|&&idx| self.claim(idx, rule)).count()
    }

    pub fn into_tags(self) -> Vec<MatchTag> {
        self.rows.into_iter().map(|r| r.tag).collect()
    }
}
