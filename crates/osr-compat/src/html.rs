//! ---
//! osr_section: "02-version-compatibility"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Compatibility matrix loading and version resolution."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Extraction of the compatibility table from the OpenStudio wiki page.
//!
//! The page is rendered HTML; only the first `<table>` is read. Its first
//! column holds the OpenStudio version (`v3.7.0`, sometimes starred), the
//! `E+` column the EnergyPlus version and `Released` the release date.

use chrono::NaiveDate;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::{CompatError, Result};
use crate::matrix::{CompatibilityMatrix, CompatibilityRow};

static TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table>").expect("valid table regex"));
static ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("valid row regex"));
static CELL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(th|td)\b[^>]*>(.*?)</(?:th|td)>").expect("valid cell regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));
static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x?[0-9a-fA-F]+);").expect("valid entity regex"));
static TRIPLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("valid version regex"));

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

struct Cell {
    header: bool,
    text: String,
}

/// Parse the wiki page into a [`CompatibilityMatrix`], preserving page order.
pub fn parse_compatibility_html(html: &str) -> Result<CompatibilityMatrix> {
    let table = TABLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or(CompatError::MissingTable)?
        .as_str();

    let mut rows = ROW_RE
        .captures_iter(table)
        .filter_map(|c| c.get(1))
        .map(|m| parse_cells(m.as_str()))
        .filter(|cells| !cells.is_empty());

    let header_cells = rows.next().ok_or(CompatError::EmptyMatrix)?;
    if !header_cells.iter().any(|c| c.header) {
        debug!("first table row has no <th> cells, treating it as the header anyway");
    }
    let headers: Vec<String> = header_cells.into_iter().map(|c| c.text).collect();

    let energyplus_idx = headers
        .iter()
        .position(|h| is_energyplus_header(h))
        .ok_or(CompatError::MissingColumn("E+"))?;
    let released_idx = headers
        .iter()
        .position(|h| h.to_lowercase().contains("released"));

    let mut parsed = Vec::new();
    for cells in rows {
        let values: Vec<String> = cells.into_iter().map(|c| c.text).collect();
        if values.len() <= energyplus_idx {
            continue;
        }
        let openstudio = clean_openstudio_version(&values[0]);
        if openstudio.is_empty() {
            continue;
        }
        let energyplus = TRIPLET_RE
            .find(&values[energyplus_idx])
            .map(|m| m.as_str().to_owned())
            .unwrap_or_else(|| values[energyplus_idx].trim().to_owned());

        let mut row = CompatibilityRow::new(openstudio, energyplus);
        row.released = released_idx
            .and_then(|idx| values.get(idx))
            .and_then(|raw| parse_release_date(raw));

        let mut extra = IndexMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == 0
                || idx == energyplus_idx
                || Some(idx) == released_idx
                || header.eq_ignore_ascii_case("gemfile")
            {
                continue;
            }
            if let Some(value) = values.get(idx) {
                extra.insert(header.clone(), value.clone());
            }
        }
        row.extra = extra;
        parsed.push(row);
    }

    if parsed.is_empty() {
        return Err(CompatError::EmptyMatrix);
    }
    debug!(rows = parsed.len(), "parsed compatibility table");
    Ok(CompatibilityMatrix::new(parsed))
}

fn parse_cells(row_html: &str) -> Vec<Cell> {
    CELL_RE
        .captures_iter(row_html)
        .map(|c| Cell {
            header: c
                .get(1)
                .map(|m| m.as_str().eq_ignore_ascii_case("th"))
                .unwrap_or(false),
            text: c.get(2).map(|m| cell_text(m.as_str())).unwrap_or_default(),
        })
        .collect()
}

fn cell_text(inner_html: &str) -> String {
    let stripped = TAG_RE.replace_all(inner_html, " ");
    let decoded = decode_entities(&stripped);
    SPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    NUMERIC_ENTITY_RE
        .replace_all(&named, |caps: &regex::Captures<'_>| {
            let raw = &caps[1];
            let code = match raw.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => raw.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

fn is_energyplus_header(header: &str) -> bool {
    let normalized: String = header
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    normalized == "e+" || normalized.starts_with("energyplus") || normalized.starts_with("e+")
}

/// `v3.7.0*` -> `3.7.0`.
pub fn clean_openstudio_version(raw: &str) -> String {
    raw.replace(['v', '*'], "").trim().to_owned()
}

/// Parse a release date in any of the formats seen on the wiki.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}
