use std::sync::LazyLock;

use regex::Regex;

use crate::config::ColumnLayout;

/// Text fields read from a ranking row, in dataset column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Field {
    Name,
    Price,
    #[strum(serialize = "24h Change")]
    Change24h,
    #[strum(serialize = "Market Cap")]
    MarketCap,
}

// Currency symbol or ISO code, then digits. Subscript digits appear in
// compressed sub-cent prices ("$0.0₅8123").
static PRICE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[$€£¥₩₹₽฿]|[A-Z]{3}\s?)?\s?\d[\d,.\s₀-₉]*$").expect("valid price regex")
});

static CHANGE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+▲▼]?\s?\d[\d,]*(?:\.\d+)?\s?%$").expect("valid change regex")
});

static MARKET_CAP_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("valid market cap regex"));

impl Field {
    pub fn index(&self, layout: &ColumnLayout) -> usize {
        match self {
            Field::Name => layout.name,
            Field::Price => layout.price,
            Field::Change24h => layout.change_24h,
            Field::MarketCap => layout.market_cap,
        }
    }

    /// Normalizes rendered cell text: trims it and, for the name, joins its
    /// lines (name and ticker are separate elements) with single spaces.
    /// Blank lines come from layout whitespace between those elements and are
    /// dropped.
    pub fn normalize(&self, text: &str) -> String {
        match self {
            Field::Name => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            _ => text.trim().to_string(),
        }
    }

    /// Whether normalized text looks like what this field renders.
    pub fn has_expected_shape(&self, text: &str) -> bool {
        match self {
            Field::Name => !text.is_empty(),
            Field::Price => PRICE_SHAPE.is_match(text),
            Field::Change24h => CHANGE_SHAPE.is_match(text),
            Field::MarketCap => MARKET_CAP_SHAPE.is_match(text),
        }
    }
}
