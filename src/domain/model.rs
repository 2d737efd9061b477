use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque bearer credential issued by `/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// One location entry exactly as `/stock` sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationPayload {
    pub resource_name: String,
    pub quantity: f64,
    /// Any JSON shape is accepted; the normalizer decides what it means.
    #[serde(default)]
    pub last_update_date: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of a successful `/stock` call: variant key → location payloads,
/// kept in the order the server wrote the keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStockResponse {
    entries: Vec<(String, Vec<LocationPayload>)>,
}

impl RawStockResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, records: Vec<LocationPayload>) {
        self.entries.push((key.into(), records));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(String, Vec<LocationPayload>)> {
        self.entries
    }
}

impl<'de> Deserialize<'de> for RawStockResponse {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawStockVisitor;

        impl<'de> Visitor<'de> for RawStockVisitor {
            type Value = RawStockResponse;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping variant keys to arrays of location records")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, records)) = map.next_entry::<String, Vec<LocationPayload>>()? {
                    entries.push((key, records));
                }
                Ok(RawStockResponse { entries })
            }
        }

        deserializer.deserialize_map(RawStockVisitor)
    }
}

/// Attributes encoded in a `<baseCode>#<color>#<size>` variant key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedVariant {
    pub base_code: String,
    pub color: String,
    pub size: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateDate {
    Known(NaiveDate),
    Unknown,
}

impl fmt::Display for UpdateDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateDate::Known(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            UpdateDate::Unknown => f.write_str("unknown date"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    pub resource_name: String,
    pub quantity: f64,
    pub last_update: UpdateDate,
    /// Timestamp as received, for display when parsing failed.
    pub last_update_raw: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantGroup {
    pub key: String,
    pub parsed: ParsedVariant,
    pub description: Option<String>,
    pub records: Vec<LocationRecord>,
}

impl VariantGroup {
    pub fn total_quantity(&self) -> f64 {
        self.records.iter().map(|r| r.quantity).sum()
    }
}

/// Normalized answer to one stock query. Rebuilt per query, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockResult {
    pub groups: Vec<VariantGroup>,
}

impl StockResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariantGroup> {
        self.groups.iter()
    }

    pub fn total_quantity(&self) -> f64 {
        self.groups.iter().map(VariantGroup::total_quantity).sum()
    }
}

impl<'a> IntoIterator for &'a StockResult {
    type Item = &'a VariantGroup;
    type IntoIter = std::slice::Iter<'a, VariantGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
