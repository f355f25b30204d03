//! Epoch policy: calendar-quarter labels used to rotate the identity
//! signal without rekeying.

use chrono::{Datelike, Utc};

/// Returns the current epoch label, e.g. `"2025-Q3"`, computed from the
/// current UTC instant.
pub fn current_epoch() -> String {
    let now = Utc::now();
    format_epoch(now.year(), quarter_of(now.month()))
}

/// Returns the current epoch followed by `n - 1` prior epochs
/// (decrementing quarters, rolling the year), most recent first.
pub fn previous_epochs(n: usize) -> Vec<String> {
    let now = Utc::now();
    previous_epochs_from(now.year(), quarter_of(now.month()), n)
}

fn previous_epochs_from(mut year: i32, mut quarter: u32, n: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(format_epoch(year, quarter));
        if quarter == 1 {
            quarter = 4;
            year -= 1;
        } else {
            quarter -= 1;
        }
    }
    out
}

fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

fn format_epoch(year: i32, quarter: u32) -> String {
    format!("{year}-Q{quarter}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_of_month_is_correct() {
        assert_eq!(quarter_of(1), 1);
        assert_eq!(quarter_of(3), 1);
        assert_eq!(quarter_of(4), 2);
        assert_eq!(quarter_of(9), 3);
        assert_eq!(quarter_of(12), 4);
    }

    #[test]
    fn previous_epochs_rolls_year_boundary() {
        let epochs = previous_epochs_from(2025, 1, 4);
        assert_eq!(
            epochs,
            vec!["2025-Q1", "2024-Q4", "2024-Q3", "2024-Q2"]
        );
    }

    #[test]
    fn previous_epochs_includes_current_first() {
        let epochs = previous_epochs_from(2025, 3, 3);
        assert_eq!(epochs[0], "2025-Q3");
        assert_eq!(epochs.len(), 3);
    }

    #[test]
    fn current_epoch_has_expected_shape() {
        let e = current_epoch();
        assert!(e.len() == 7, "unexpected epoch shape: {e}");
        assert!(e.contains('Q'));
    }
}
