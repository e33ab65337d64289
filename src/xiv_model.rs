use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Price estimate used when a quality tier has no recent sales.
pub const NO_RECENT_SALES: i64 = -1;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Realm(pub String);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ID")]
    pub id: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct MarketHistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    #[serde(rename = "PricePerUnit")]
    pub price_per_unit: u64,
    #[serde(rename = "IsHQ")]
    pub is_hq: bool,
    #[serde(rename = "PurchaseDate", with = "chrono::serde::ts_seconds")]
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub price_per_unit: u64,
    pub is_high_quality: bool,
    pub purchase_timestamp: DateTime<Utc>,
}

impl From<HistoryEntry> for TransactionRecord {
    fn from(entry: HistoryEntry) -> Self {
        TransactionRecord {
            price_per_unit: entry.price_per_unit,
            is_high_quality: entry.is_hq,
            purchase_timestamp: entry.purchase_date,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub nq_price: i64,
    pub hq_price: i64,
}
