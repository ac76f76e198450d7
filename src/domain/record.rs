use chrono::NaiveDateTime;
use serde::Serializer;

/// Textual encoding of [`Record::captured_at`] in the dataset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header of the dataset, in column order.
pub const HEADER: [&str; 5] = ["Timestamp", "Name", "Price", "24h Change", "Market Cap"];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
/// One row of the ranking table captured at a given instant.
///
/// Every text field is kept exactly as rendered by the page (currency symbols,
/// separators and suffixes included). Field order here is the column order of
/// the dataset.
pub struct Record {
    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
    captured_at: NaiveDateTime,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Price")]
    price: String,
    #[serde(rename = "24h Change")]
    change_24h: String,
    #[serde(rename = "Market Cap")]
    market_cap: String,
}

impl Record {
    pub fn new(
        captured_at: NaiveDateTime,
        name: impl Into<String>,
        price: impl Into<String>,
        change_24h: impl Into<String>,
        market_cap: impl Into<String>,
    ) -> Self {
        Self {
            captured_at,
            name: name.into(),
            price: price.into(),
            change_24h: change_24h.into(),
            market_cap: market_cap.into(),
        }
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    pub fn timestamp(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn change_24h(&self) -> &str {
        &self.change_24h
    }

    pub fn market_cap(&self) -> &str {
        &self.market_cap
    }
}

fn serialize_timestamp<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}
