// SPDX-License-Identifier: MIT OR Apache-2.0
//! Decimal separator auto-detection for tabular extractors (§4.5).

use rust_decimal::Decimal;
use std::str::FromStr;

/// Which character a column uses as its decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalSeparator {
    /// `1.23`
    Dot,
    /// `1,23`
    Comma,
}

/// Inspect a column's raw values and decide whether it uses `,` or `.` as
/// the decimal separator, by counting which character most often appears
/// as the *last* separator with exactly 1-2 trailing digits (a comma or
/// dot deeper inside a number, e.g. a thousands group, has 3 digits after
/// it). Defaults to [`DecimalSeparator::Dot`] when no value is decisive.
#[must_use]
pub fn detect_column_separator<'a>(values: impl IntoIterator<Item = &'a str>) -> DecimalSeparator {
    let mut comma_votes = 0;
    let mut dot_votes = 0;
    for raw in values {
        match last_separator_with_short_tail(raw) {
            Some(',') => comma_votes += 1,
            Some('.') => dot_votes += 1,
            _ => {}
        }
    }
    if comma_votes > dot_votes {
        DecimalSeparator::Comma
    } else {
        DecimalSeparator::Dot
    }
}

fn last_separator_with_short_tail(raw: &str) -> Option<char> {
    let bytes: Vec<char> = raw.chars().collect();
    let pos = raw.rfind([',', '.'])?;
    let sep = bytes[raw[..pos].chars().count()];
    let tail_len = raw[pos + sep.len_utf8()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if tail_len == 1 || tail_len == 2 {
        Some(sep)
    } else {
        None
    }
}

/// Parse a raw cell value as a [`Decimal`] using the given column
/// separator convention, stripping the non-decimal separator as a
/// thousands grouping character.
#[must_use]
pub fn parse_decimal(raw: &str, separator: DecimalSeparator) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = match separator {
        DecimalSeparator::Dot => trimmed.replace(',', ""),
        DecimalSeparator::Comma => trimmed.replace('.', "").replace(',', "."),
    };
    Decimal::from_str(&normalized).ok()
}
