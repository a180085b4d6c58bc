//! Decoding of stingray response bodies and the few reshaping helpers built on them.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Every JSON body starts with this many characters of anti-hijacking preamble (`{}&&`).
pub(crate) const PREAMBLE_LEN: usize = 4;

/// Number of month labels generated for the historical estimate series.
pub const ESTIMATE_WINDOW: usize = 61;

const SEARCH_ID: &str = "/payload/sections/0/rows/0/id";
const PHOTOS: &str = "/payload/mediaBrowserInfo/photos";
const PHOTO_URL: &str = "/photoUrls/nonFullScreenPhotoUrlCompressed";
const TIME_SERIES: &str = "/payload/propertyTimeSeries";

/// Drops the first [`PREAMBLE_LEN`] characters, whatever they are.
pub(crate) fn strip_preamble(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    for _ in 0..PREAMBLE_LEN {
        chars.next()?;
    }
    Some(chars.as_str())
}

pub(crate) fn decode(url: &str, text: &str) -> Result<Value> {
    let body = strip_preamble(text).ok_or_else(|| Error::Decode {
        url: url.to_string(),
        reason: format!(
            "body is {} character(s), shorter than the {PREAMBLE_LEN}-character preamble",
            text.chars().count()
        ),
    })?;
    serde_json::from_str(body).map_err(|e| Error::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Region id of the best autocomplete match.
///
/// Reads `payload.sections[0].rows[0].id` (e.g. `"2_8729"`) and returns the part
/// after the first underscore. A query that matched nothing has no sections or no
/// rows and yields [`Error::Extraction`].
pub fn region_id_from_search(search: &Value) -> Result<String> {
    let id = search
        .pointer(SEARCH_ID)
        .ok_or_else(|| Error::extraction(SEARCH_ID, "search returned no matches"))?;
    let id = match id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(Error::extraction(
                SEARCH_ID,
                format!("expected a string id, found {other}"),
            ));
        }
    };
    id.split_once('_')
        .map(|(_, region)| region.to_string())
        .ok_or_else(|| Error::extraction(SEARCH_ID, format!("id `{id}` has no `_` separator")))
}

/// Compressed, non-full-screen photo URLs from an `aboveTheFold` payload, in listing order.
pub fn photo_urls(above_the_fold: &Value) -> Result<Vec<String>> {
    let photos = above_the_fold
        .pointer(PHOTOS)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::extraction(PHOTOS, "property has no photo list"))?;

    photos
        .iter()
        .enumerate()
        .map(|(i, photo)| {
            photo
                .pointer(PHOTO_URL)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::extraction(format!("{PHOTOS}/{i}{PHOTO_URL}"), "photo has no compressed URL")
                })
        })
        .collect()
}

/// One point of the historical estimate series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyEstimate {
    /// `"Mon YY"`, e.g. `"Oct 26"`.
    pub month: String,
    /// Estimate as sent by Redfin: usually a number, sometimes `null`.
    pub estimate: Value,
}

/// Month labels for the estimate series, oldest first.
///
/// Covers 58 months back through two months ahead of `today`.
pub fn month_labels(today: NaiveDate) -> Vec<String> {
    let first = today.with_day(1).unwrap_or(today);
    (-2..=58i32)
        .rev()
        .filter_map(|back| shift_months(first, -back))
        .map(|d| d.format("%b %y").to_string())
        .collect()
}

fn shift_months(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    if delta >= 0 {
        date.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(delta.unsigned_abs()))
    }
}

/// Pairs `labels` with `payload.propertyTimeSeries` by position.
///
/// The payload carries no dates; alignment assumes Redfin returns the series
/// oldest first over the same window the labels describe.
pub fn label_estimates(labels: &[String], avm_history: &Value) -> Result<Vec<MonthlyEstimate>> {
    let estimates = avm_history
        .pointer(TIME_SERIES)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::extraction(TIME_SERIES, "payload has no estimate series"))?;

    if estimates.len() > labels.len() {
        return Err(Error::extraction(
            TIME_SERIES,
            format!(
                "{} estimates but only {} month labels",
                estimates.len(),
                labels.len()
            ),
        ));
    }

    Ok(labels
        .iter()
        .zip(estimates)
        .map(|(month, estimate)| MonthlyEstimate {
            month: month.clone(),
            estimate: estimate.clone(),
        })
        .collect())
}
