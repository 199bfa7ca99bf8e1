//! Gap-filling invoice number allocation
//!
//! Invoice numbers follow the format `FV/{year}/{MM}/{NNN}` and are scoped
//! to an owner, year, and month derived from the issue date. Allocation
//! returns the lowest unused sequence within the scope so that soft-deleted
//! invoices do not permanently waste numbers and the sequence stays dense.
//!
//! The allocator itself is a pure read-compute step and is not safe under
//! concurrent generation; the writer inserts under a unique index on
//! `(owner_id, invoice_number)` and retries allocation when the insert is
//! rejected as a duplicate.

use chrono::{Datelike, NaiveDate};

/// Prefix of every generated invoice number
pub const NUMBER_PREFIX: &str = "FV";

/// The (year, month) scope an invoice number is allocated in
///
/// Derived from the issue date the caller picked, not from "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberScope {
    pub year: i32,
    pub month: u32,
}

impl NumberScope {
    /// Derives the numbering scope from an issue date
    pub fn from_issue_date(issue_date: NaiveDate) -> Self {
        Self {
            year: issue_date.year(),
            month: issue_date.month(),
        }
    }

    /// SQL LIKE pattern matching every number in this scope
    pub fn like_pattern(&self) -> String {
        format!("{}/{}/{:02}/%", NUMBER_PREFIX, self.year, self.month)
    }
}

/// Formats an invoice number for a scope and sequence
///
/// Sequences are zero-padded to three digits; values above 999 simply widen.
pub fn format_invoice_number(scope: NumberScope, sequence: u32) -> String {
    format!(
        "{}/{}/{:02}/{:03}",
        NUMBER_PREFIX, scope.year, scope.month, sequence
    )
}

/// Parses the trailing sequence component of an invoice number
///
/// Returns `None` for numbers that do not end in a positive integer
/// component (manually renamed invoices may carry arbitrary numbers; they
/// simply do not participate in gap-filling).
pub fn parse_sequence(invoice_number: &str) -> Option<u32> {
    let tail = invoice_number.rsplit('/').next()?;
    let seq: u32 = tail.parse().ok()?;
    if seq == 0 {
        return None;
    }
    Some(seq)
}

/// Returns the first missing positive integer in a set of sequences
///
/// `{1,2,4}` yields 3, `{}` yields 1, `{1,2,3}` yields 4, `{2,3}` yields 1.
pub fn first_free_sequence(existing: &[u32]) -> u32 {
    let mut taken: Vec<u32> = existing.to_vec();
    taken.sort_unstable();
    taken.dedup();

    let mut expected = 1u32;
    for seq in taken {
        if seq > expected {
            break;
        }
        if seq == expected {
            expected += 1;
        }
    }
    expected
}

/// Allocates the next invoice number for a scope
///
/// `existing_numbers` must be the invoice numbers of all non-deleted
/// invoices in the scope; numbers that do not parse are ignored.
pub fn allocate(scope: NumberScope, existing_numbers: &[String]) -> String {
    let sequences: Vec<u32> = existing_numbers
        .iter()
        .filter_map(|n| parse_sequence(n))
        .collect();
    format_invoice_number(scope, first_free_sequence(&sequences))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> NumberScope {
        NumberScope {
            year: 2026,
            month: 8,
        }
    }

    #[test]
    fn fills_first_gap() {
        assert_eq!(first_free_sequence(&[1, 2, 4, 5]), 3);
    }

    #[test]
    fn empty_scope_starts_at_one() {
        assert_eq!(first_free_sequence(&[]), 1);
    }

    #[test]
    fn dense_sequence_appends() {
        assert_eq!(first_free_sequence(&[1, 2, 3]), 4);
    }

    #[test]
    fn missing_one_is_filled_first() {
        assert_eq!(first_free_sequence(&[2, 3]), 1);
    }

    #[test]
    fn duplicates_are_ignored() {
        assert_eq!(first_free_sequence(&[1, 1, 2, 2]), 3);
    }

    #[test]
    fn formats_with_three_digit_padding() {
        assert_eq!(format_invoice_number(scope(), 7), "FV/2026/08/007");
    }

    #[test]
    fn sequences_above_999_widen() {
        assert_eq!(format_invoice_number(scope(), 1234), "FV/2026/08/1234");
        assert_eq!(parse_sequence("FV/2026/08/1234"), Some(1234));
    }

    #[test]
    fn parse_rejects_non_numeric_tails() {
        assert_eq!(parse_sequence("FV/2026/08/abc"), None);
        assert_eq!(parse_sequence("FV/2026/08/000"), None);
        assert_eq!(parse_sequence(""), None);
    }

    #[test]
    fn scope_derives_from_issue_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let scope = NumberScope::from_issue_date(date);
        assert_eq!(scope, NumberScope { year: 2026, month: 3 });
        assert_eq!(scope.like_pattern(), "FV/2026/03/%");
    }

    #[test]
    fn allocate_end_to_end() {
        let existing = vec![
            "FV/2026/08/001".to_string(),
            "FV/2026/08/002".to_string(),
            "FV/2026/08/004".to_string(),
        ];
        assert_eq!(allocate(scope(), &existing), "FV/2026/08/003");
    }

    #[test]
    fn allocate_ignores_unparseable_numbers() {
        let existing = vec!["FV/2026/08/001".to_string(), "KOREKTA-17".to_string()];
        assert_eq!(allocate(scope(), &existing), "FV/2026/08/002");
    }
}
