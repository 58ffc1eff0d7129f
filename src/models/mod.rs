pub mod agreements;
pub mod farms;
pub mod notifications;
pub mod users;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    /// `(page, limit)` when the caller asked for a page, `None` for "everything".
    ///
    /// Fails when the page's row offset does not fit a signed 64-bit integer,
    /// the widest OFFSET the supported databases accept.
    pub fn requested(&self) -> Result<Option<(u64, u64)>, String> {
        if self.page.is_none() && self.limit.is_none() {
            return Ok(None);
        }

        let (page, limit) = (self.page(), self.limit());
        (page - 1)
            .checked_mul(limit)
            .filter(|offset| *offset <= i64::MAX as u64)
            .map(|_| Some((page, limit)))
            .ok_or_else(|| "Page number is too large.".to_string())
    }
}

// ── Lenient field decoding ──
//
// The web client posts form values, so numbers arrive either as JSON numbers
// or as strings, and an untouched input arrives as "". Both mean "absent".

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrText {
    Id(i64),
    Text(String),
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => parse_text(&s),
    }
}

pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<IdOrText>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(IdOrText::Id(n)) => n,
        Some(IdOrText::Text(s)) => match parse_text::<i64, D::Error>(&s)? {
            Some(n) => n,
            None => return Ok(None),
        },
    };

    i32::try_from(raw)
        .map(Some)
        .map_err(|_| de::Error::custom(format!("id {raw} is out of range")))
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(non_blank))
}

fn parse_text<T, E>(raw: &str) -> Result<Option<T>, E>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    E: de::Error,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(E::custom)
}

/// Trim a string, treating a blank one as missing.
pub(crate) fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
