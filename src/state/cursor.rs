//! Cursor derivation
//!
//! The cursor is the largest `report_date` consumed so far. Pages are
//! requested in ascending `report_date` order, so this watermark is safe to
//! checkpoint after any page.

use crate::models::{parse_fda_date, CURSOR_FIELD};
use crate::types::JsonValue;
use chrono::NaiveDate;

/// Largest parseable `report_date` in a batch
pub fn max_report_date<'a, I>(records: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a JsonValue>,
{
    records
        .into_iter()
        .filter_map(|record| record.get(CURSOR_FIELD)?.as_str())
        .filter_map(parse_fda_date)
        .max()
}

/// Advance `prior` over a batch; never moves backwards
pub fn advance<'a, I>(prior: Option<NaiveDate>, records: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a JsonValue>,
{
    match (prior, max_report_date(records)) {
        (Some(prior), Some(seen)) => Some(prior.max(seen)),
        (prior, seen) => prior.or(seen),
    }
}
