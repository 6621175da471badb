use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountryName {
    #[serde(deserialize_with = "lenient_string")]
    pub common: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub official: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Currency {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Flags {
    #[serde(deserialize_with = "lenient_string")]
    pub svg: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub png: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapLinks {
    #[serde(rename = "googleMaps", deserialize_with = "lenient_string")]
    pub google_maps: Option<String>,
}

/// Canonical country metadata. Every field is optional in the source data;
/// malformed values deserialize as absent instead of failing the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountryRecord {
    #[serde(deserialize_with = "lenient_object")]
    pub name: CountryName,
    #[serde(deserialize_with = "lenient_string")]
    pub cca3: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub capital: Vec<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub population: Option<u64>,
    #[serde(deserialize_with = "lenient_string")]
    pub region: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub subregion: Option<String>,
    /// Source order is preserved; the first entry is the primary currency.
    #[serde(deserialize_with = "ordered_map")]
    pub currencies: Vec<(String, Currency)>,
    #[serde(deserialize_with = "ordered_strings")]
    pub languages: Vec<(String, String)>,
    #[serde(deserialize_with = "lenient_object")]
    pub flags: Flags,
    #[serde(deserialize_with = "lenient_object")]
    pub maps: MapLinks,
    #[serde(deserialize_with = "lenient_f64")]
    pub area: Option<f64>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string))
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

fn lenient_object<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(d)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::String(s) => vec![serde_json::Value::String(s)],
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.trim().is_empty())
        .collect())
}

fn ordered_map<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, Currency)>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    let serde_json::Value::Object(map) = value else {
        return Ok(Vec::new());
    };
    Ok(map
        .into_iter()
        .map(|(code, v)| (code, serde_json::from_value(v).unwrap_or_default()))
        .collect())
}

fn ordered_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, String)>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    let serde_json::Value::Object(map) = value else {
        return Ok(Vec::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(code, v)| v.as_str().map(|s| (code, s.to_string())))
        .collect())
}

/// Read-only country metadata with case-insensitive code and name indices.
/// On duplicate keys the first record wins.
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    records: Vec<Arc<CountryRecord>>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

impl CountryCatalog {
    pub fn from_records(records: impl IntoIterator<Item = CountryRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            let idx = catalog.records.len();
            if let Some(code) = record.cca3.as_deref() {
                catalog.by_code.entry(fold(code)).or_insert(idx);
            }
            if let Some(name) = record.name.common.as_deref() {
                catalog.by_name.entry(fold(name)).or_insert(idx);
            }
            catalog.records.push(Arc::new(record));
        }
        catalog
    }

    /// Parse a JSON array of records. Entries that are not objects are skipped.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        let total = values.len();
        let records: Vec<CountryRecord> = values
            .into_iter()
            .filter(serde_json::Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if records.len() != total {
            tracing::warn!(
                skipped = total - records.len(),
                "skipped malformed country records"
            );
        }
        Ok(Self::from_records(records))
    }

    pub fn find_by_code(&self, code: &str) -> Option<&Arc<CountryRecord>> {
        self.by_code
            .get(&fold(code))
            .map(|&idx| &self.records[idx])
    }

    pub fn find_by_common_name(&self, name: &str) -> Option<&Arc<CountryRecord>> {
        self.by_name
            .get(&fold(name))
            .map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
