//! Shared guardrails for connection page sizes.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub const DEFAULT_PAGE_SIZE: i64 = 15;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MIN_PAGE_SIZE: i64 = 1;

pub fn clamp_int(value: i64, minimum: i64, maximum: i64) -> i64 {
    value.max(minimum).min(maximum)
}

/// Resolve the effective page size for a `first` argument.
///
/// A missing `first` falls back to `default_size`; zero and negative values
/// are lifted to [`MIN_PAGE_SIZE`].
#[cfg_attr(feature = "python", pyfunction)]
#[cfg_attr(feature = "python", pyo3(signature = (first=None, default_size=DEFAULT_PAGE_SIZE, maximum=MAX_PAGE_SIZE)))]
pub fn clamp_page_size(first: Option<i64>, default_size: i64, maximum: i64) -> i64 {
    let maximum = maximum.max(MIN_PAGE_SIZE);
    clamp_int(first.unwrap_or(default_size), MIN_PAGE_SIZE, maximum)
}
