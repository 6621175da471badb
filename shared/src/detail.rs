//! Presentation model for the detail panel. Pure formatting, no lookups.

use crate::catalog::{CountryRecord, Currency};
use crate::resolver::ResolvedRecord;

pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_TITLE: &str = "Country Information";
pub const DEGRADED_NOTE: &str = "Detailed information not available in the local dataset.";
pub const MAP_LINK_TEXT: &str = "View on Google Maps";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagImage {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullDetail {
    pub title: String,
    pub official_name: Option<String>,
    pub flag: Option<FlagImage>,
    pub capital: String,
    pub population: String,
    pub region: String,
    pub currency: String,
    pub languages: String,
    pub area: Option<String>,
    pub map_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedDetail {
    pub title: String,
    pub note: &'static str,
    pub map_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Full(FullDetail),
    Degraded(DegradedDetail),
}

/// Where a click inside the panel overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelClick {
    Backdrop,
    Body,
    CloseButton,
}

impl PanelClick {
    pub fn closes_panel(self) -> bool {
        !matches!(self, Self::Body)
    }
}

pub fn present(record: Option<&ResolvedRecord>) -> Option<DetailView> {
    match record? {
        ResolvedRecord::Full(record) => Some(DetailView::Full(present_full(record))),
        ResolvedRecord::Degraded(degraded) => Some(DetailView::Degraded(DegradedDetail {
            title: degraded.name.clone(),
            note: DEGRADED_NOTE,
            map_link: degraded.map_link.clone(),
        })),
    }
}

fn present_full(record: &CountryRecord) -> FullDetail {
    let title = record
        .name
        .common
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    // SVG preferred, raster as fallback.
    let flag = record
        .flags
        .svg
        .as_ref()
        .or(record.flags.png.as_ref())
        .map(|src| FlagImage {
            src: src.clone(),
            alt: record
                .flags
                .alt
                .clone()
                .unwrap_or_else(|| format!("Flag of {title}")),
        });
    FullDetail {
        official_name: record.name.official.clone(),
        flag,
        capital: format_capital(&record.capital),
        population: format_population(record.population),
        region: format_region(record.region.as_deref(), record.subregion.as_deref()),
        currency: format_currency(&record.currencies),
        languages: format_languages(&record.languages),
        area: record.area.map(|a| format!("{} km²", format_decimal(a))),
        map_link: record.maps.google_maps.clone(),
        title,
    }
}

/// Insert `,` every three digits.
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Grouped integer part with up to three trimmed fraction digits.
pub fn format_decimal(value: f64) -> String {
    let rounded = (value.abs() * 1000.0).round() as u64;
    let (whole, frac) = (rounded / 1000, rounded % 1000);
    let sign = if value < 0.0 && rounded > 0 { "-" } else { "" };
    let mut out = format!("{sign}{}", group_digits(whole));
    if frac > 0 {
        let frac = format!("{frac:03}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

pub fn format_population(population: Option<u64>) -> String {
    population.map_or_else(|| NOT_AVAILABLE.to_string(), group_digits)
}

pub fn format_capital(capital: &[String]) -> String {
    capital
        .first()
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `name (symbol)` of the first listed currency, the code standing in for a missing symbol.
pub fn format_currency(currencies: &[(String, Currency)]) -> String {
    let Some((code, currency)) = currencies.first() else {
        return NOT_AVAILABLE.to_string();
    };
    format!(
        "{} ({})",
        currency.name.as_deref().unwrap_or(NOT_AVAILABLE),
        currency.symbol.as_deref().unwrap_or(code)
    )
}

pub fn format_languages(languages: &[(String, String)]) -> String {
    if languages.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    languages
        .iter()
        .map(|(_, name)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_region(region: Option<&str>, subregion: Option<&str>) -> String {
    format!(
        "{} ({})",
        region.unwrap_or(NOT_AVAILABLE),
        subregion.unwrap_or(NOT_AVAILABLE)
    )
}
