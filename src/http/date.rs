//! HTTP date parsing and formatting.
//!
//! Accepts IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`) and the dashed
//! variant browsers send in cookies (`Sun, 06-Nov-1994 08:49:37 GMT`).

use crate::base::neterror::NetError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

const IMF_FIXDATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

const SPACED: &[BorrowedFormatItem<'static>] =
    format_description!("[day] [month repr:short] [year] [hour]:[minute]:[second] GMT");

const DASHED: &[BorrowedFormatItem<'static>] =
    format_description!("[day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT");

pub fn parse(text: &str) -> Result<OffsetDateTime, NetError> {
    let trimmed = text.trim();
    // The weekday is redundant; skip it instead of validating it.
    let rest = trimmed
        .split_once(',')
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or(trimmed);

    [SPACED, DASHED]
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(rest, *format).ok())
        .map(PrimitiveDateTime::assume_utc)
        .ok_or_else(|| NetError::InvalidDate(text.to_string()))
}

pub fn format(at: OffsetDateTime) -> String {
    at.to_offset(UtcOffset::UTC)
        .format(IMF_FIXDATE)
        .unwrap_or_default()
}
