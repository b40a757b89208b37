use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered sequence of records describing the catalog at one point in time.
pub type Snapshot = Vec<Record>;

/// A record emitted by change detection: either a new item or a price drop.
pub type Difference = Record;

/// Identifier assigned by the catalog.
///
/// Stored blobs may carry ids as JSON strings or numbers; both forms compare
/// by value, so `"42"` and `42` are the same id. Ids always serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => ItemId::new(text),
            RawId::Number(number) => ItemId(number_text(&number)),
        })
    }
}

// Integral floats such as `42.0` name the same item as `42`.
fn number_text(number: &serde_json::Number) -> String {
    if let Some(n) = number.as_u64() {
        return n.to_string();
    }
    if let Some(n) = number.as_i64() {
        return n.to_string();
    }
    match number.as_f64() {
        Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => format!("{n:.0}"),
        _ => number.to_string(),
    }
}

/// One catalog item, either freshly observed or stored in the baseline.
///
/// `name` is the key used to match observed items against the baseline;
/// `id` is only used for mute lookups and ignore links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub name: String,
    pub id: ItemId,
    pub price: f64,
    /// Previously known price. Only set on records emitted as price drops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<f64>,
    #[serde(default)]
    pub original_price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub url: String,
    /// Epoch milliseconds of the last insertion or price drop in the baseline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_timestamp: Option<i64>,
}

impl Record {
    pub fn new(name: impl Into<String>, id: impl Into<ItemId>, price: f64) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            price,
            old_price: None,
            original_price: 0.0,
            image: String::new(),
            url: String::new(),
            change_timestamp: None,
        }
    }

    pub fn with_original_price(mut self, original_price: f64) -> Self {
        self.original_price = original_price;
        self
    }

    pub fn with_links(mut self, url: impl Into<String>, image: impl Into<String>) -> Self {
        self.url = url.into();
        self.image = image.into();
        self
    }

    /// True for a difference that reports a lower price than the baseline.
    pub fn is_price_drop(&self) -> bool {
        self.old_price.is_some()
    }
}
