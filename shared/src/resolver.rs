use std::sync::Arc;

use crate::catalog::{CountryCatalog, CountryRecord};

/// Placeholder used when no canonical record matches a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedRecord {
    pub name: String,
    pub identifier: Option<String>,
    pub map_link: Option<String>,
    pub degraded: bool,
}

impl DegradedRecord {
    pub fn new(name: &str, identifier: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            identifier: identifier.map(str::to_string),
            map_link: None,
            degraded: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRecord {
    Full(Arc<CountryRecord>),
    Degraded(DegradedRecord),
}

impl ResolvedRecord {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn as_full(&self) -> Option<&CountryRecord> {
        match self {
            Self::Full(record) => Some(record),
            Self::Degraded(_) => None,
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Code lookup, then common-name lookup, then a degraded record when a name
/// is known. Returns `None` when nothing identifies the selection.
pub fn resolve(
    catalog: &CountryCatalog,
    identifier: Option<&str>,
    name: Option<&str>,
) -> Option<ResolvedRecord> {
    let identifier = present(identifier);
    let name = present(name);
    if identifier.is_none() && name.is_none() {
        return None;
    }

    if let Some(code) = identifier
        && let Some(record) = catalog.find_by_code(code)
    {
        tracing::debug!(identifier = code, "found country data by code");
        return Some(ResolvedRecord::Full(record.clone()));
    }

    let name = name?;
    tracing::debug!(identifier = ?identifier, name, "code lookup failed, trying name lookup");
    if let Some(record) = catalog.find_by_common_name(name) {
        return Some(ResolvedRecord::Full(record.clone()));
    }

    tracing::warn!(
        identifier = ?identifier,
        name,
        "no detailed data found, returning basic info"
    );
    Some(ResolvedRecord::Degraded(DegradedRecord::new(name, identifier)))
}
