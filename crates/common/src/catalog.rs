//! Catalog paging and matching primitives
//!
//! Shared by every listing endpoint: 1-based page requests, the paged
//! envelope returned to clients, case-insensitive substring matching and
//! inclusive price ranges. Postgres repositories translate the same
//! semantics into SQL; in-memory stores use the helpers directly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a page request, rejecting non-positive pages and out-of-range sizes
    pub fn new(page: i64, limit: i64) -> Result<Self> {
        if page < 1 {
            return Err(Error::BadRequest("page must be a positive number".to_string()));
        }
        if limit < 1 || limit > i64::from(MAX_PAGE_SIZE) {
            return Err(Error::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        let page = u32::try_from(page)
            .map_err(|_| Error::BadRequest("page is too large".to_string()))?;
        Ok(Self {
            page,
            limit: limit as u32,
        })
    }

    /// Resolve raw query parameters against a default page size
    pub fn from_query(query: PageQuery, default_limit: u32) -> Result<Self> {
        Self::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(i64::from(default_limit)),
        )
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Paged list envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

impl<T> Paginated<T> {
    /// Wrap one page of items; `current_page` echoes the request unclamped
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            total_pages: total.div_ceil(u64::from(request.limit)),
            current_page: request.page,
        }
    }

    /// Cut one page out of an already filtered and ordered record set
    pub fn from_records(records: Vec<T>, request: PageRequest) -> Self {
        let total = records.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = records
            .into_iter()
            .skip(offset)
            .take(request.limit as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
            current_page: self.current_page,
        }
    }
}

/// Normalise a free-text search term; blank terms are rejected
pub fn search_term(raw: Option<&str>) -> Result<String> {
    match raw.map(str::trim) {
        Some(term) if !term.is_empty() => Ok(term.to_string()),
        _ => Err(Error::BadRequest("search query 'q' is required".to_string())),
    }
}

/// Case-insensitive substring test
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Build an `ILIKE ... ESCAPE '\'` pattern matching `term` anywhere
pub fn ilike_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Decimal places a stored price keeps (`NUMERIC(12, 2)`)
pub const PRICE_SCALE: u32 = 2;

/// Whether `price` is stored without rounding. Trailing zeros do not count
/// against the scale, so `24.990` fits.
pub fn price_fits_scale(price: &Decimal) -> bool {
    price.normalize().scale() <= PRICE_SCALE
}

/// Parse a non-negative decimal price with at most two decimal places
pub fn parse_price(raw: &str) -> Result<Decimal> {
    let price: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| Error::BadRequest(format!("Invalid price '{}'", raw)))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::BadRequest("Price must not be negative".to_string()));
    }
    if !price_fits_scale(&price) {
        return Err(Error::BadRequest(format!(
            "Price '{}' has more than {} decimal places",
            raw.trim(),
            PRICE_SCALE
        )));
    }
    Ok(price)
}

/// Inclusive price bounds; an absent bound imposes no constraint
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Result<Self> {
        for bound in [min, max].into_iter().flatten() {
            if bound.is_sign_negative() && !bound.is_zero() {
                return Err(Error::BadRequest(
                    "price bounds must not be negative".to_string(),
                ));
            }
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::BadRequest(
                    "min_price must not exceed max_price".to_string(),
                ));
            }
        }
        Ok(Self { min, max })
    }

    /// Build from raw query values; blank values count as absent
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        let bound = |raw: Option<&str>| {
            raw.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(parse_price)
                .transpose()
        };
        Self::new(bound(min)?, bound(max)?)
    }

    pub fn contains(&self, price: Decimal) -> bool {
        self.min.map_or(true, |lo| price >= lo) && self.max.map_or(true, |hi| price <= hi)
    }
}
