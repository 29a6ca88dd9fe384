//! Header resolution: map a dataset's actual headers onto canonical fields.
//!
//! Resolution order is a compatibility contract with existing spreadsheets:
//! exact matches win (candidate order), then the first header containing a
//! candidate as a substring (candidate order, then header order).

use crate::config::{AuxColumnAliases, ColumnAliases};

/// Resolve one canonical field. Returns the header index, or `None` when unresolved.
pub fn resolve_column<S: AsRef<str>>(headers: &[String], candidates: &[S]) -> Option<usize> {
    for candidate in candidates {
        if let Some(idx) = headers.iter().position(|h| h == candidate.as_ref()) {
            return Some(idx);
        }
    }
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate.is_empty() {
            continue;
        }
        if let Some(idx) = headers.iter().position(|h| h.contains(candidate)) {
            return Some(idx);
        }
    }
    None
}

/// Resolved column indices of the primary (statement + books) dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryColumns {
    pub match_tag: Option<usize>,
    pub code: Option<usize>,
    pub bank_amount: Option<usize>,
    pub books_amount: Option<usize>,
    pub ref1: Option<usize>,
    pub ref2: Option<usize>,
    pub date: Option<usize>,
    pub details: Option<usize>,
}

impl PrimaryColumns {
    pub fn resolve(headers: &[String], aliases: &ColumnAliases) -> Self {
        Self {
            match_tag: resolve_column(headers, &aliases.match_tag),
            code: resolve_column(headers, &aliases.code),
            bank_amount: resolve_column(headers, &aliases.bank_amount),
            books_amount: resolve_column(headers, &aliases.books_amount),
            ref1: resolve_column(headers, &aliases.ref1),
            ref2: resolve_column(headers, &aliases.ref2),
            date: resolve_column(headers, &aliases.date),
            details: resolve_column(headers, &aliases.details),
        }
    }

    /// Names of canonical fields that did not resolve, for diagnostics.
    pub fn unresolved(&self) -> Vec<&'static str> {
        [
            ("match", self.match_tag),
            ("code", self.code),
            ("bank_amount", self.bank_amount),
            ("books_amount", self.books_amount),
            ("ref1", self.ref1),
            ("ref2", self.ref2),
            ("date", self.date),
            ("details", self.details),
        ]
        .into_iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Resolved column indices of the auxiliary (transfer batches) dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxColumns {
    pub date: Option<usize>,
    pub amount: Option<usize>,
    pub payment_ref: Option<usize>,
}

impl AuxColumns {
    pub fn resolve(headers: &[String], aliases: &AuxColumnAliases) -> Self {
        Self {
            date: resolve_column(headers, &aliases.date),
            amount: resolve_column(headers, &aliases.amount),
            payment_ref: resolve_column(headers, &aliases.payment_ref),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_beats_substring() {
        let h = headers(&["תאריך ערך ישן", "תאריך"]);
        // "תאריך מאזן" absent, "תאריך ערך" only as substring, "תאריך" exact
        assert_eq!(resolve_column(&h, &["תאריך מאזן", "תאריך ערך", "תאריך"]), Some(1));
    }

    #[test]
    fn substring_follows_candidate_order_then_header_order() {
        let h = headers(&["x Ref2 x", "x Ref1 x", "Ref1 again"]);
        assert_eq!(resolve_column(&h, &["Ref1", "Ref2"]), Some(1));
        assert_eq!(resolve_column(&h, &["Ref2", "Ref1"]), Some(0));
    }

    #[test]
    fn unresolved_returns_none() {
        let h = headers(&["a", "b"]);
        assert_eq!(resolve_column(&h, &["Date"]), None);
        assert_eq!(resolve_column::<&str>(&h, &[]), None);
    }

    #[test]
    fn empty_candidate_never_matches_as_substring() {
        let h = headers(&["a"]);
        assert_eq!(resolve_column(&h, &[""]), None);
    }

    #[test]
    fn primary_columns_from_english_headers() {
        let h = headers(&["Bank Code", "Bank Amount", "Books Amount", "Ref1", "Ref2", "Date", "Details"]);
        let cols = PrimaryColumns::resolve(&h, &ColumnAliases::default());
        assert_eq!(cols.code, Some(0));
        assert_eq!(cols.bank_amount, Some(1));
        assert_eq!(cols.books_amount, Some(2));
        assert_eq!(cols.ref1, Some(3));
        assert_eq!(cols.ref2, Some(4));
        assert_eq!(cols.date, Some(5));
        assert_eq!(cols.details, Some(6));
        assert_eq!(cols.match_tag, None);
        assert_eq!(cols.unresolved(), vec!["match"]);
    }

    #[test]
    fn primary_columns_from_hebrew_headers() {
        let h = headers(&["מס.התאמה", "קוד פעולה", "סכום בדף", "סכום בספרים", "אסמכתא 1", "אסמכתא 2", "תאריך ערך", "פרטים"]);
        let cols = PrimaryColumns::resolve(&h, &ColumnAliases::default());
        assert_eq!(cols.match_tag, Some(0));
        assert_eq!(cols.code, Some(1));
        assert_eq!(cols.ref1, Some(4));
        assert_eq!(cols.ref2, Some(5));
        assert_eq!(cols.date, Some(6));
        assert!(cols.unresolved().is_empty());
    }
}
