use std::{num::NonZeroUsize, time::Duration};

const DEFAULT_ROW_LIMIT: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(limit) => limit,
    None => unreachable!(),
};

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScrapingConfig {
    pub target_url: Box<str>,
    /// Candidate rows of the ranking table body.
    pub row_selector: Box<str>,
    /// Cells within a candidate row.
    pub cell_selector: Box<str>,
    pub row_limit: NonZeroUsize,
    pub page_load_timeout_secs: u64,
    pub table_timeout_secs: u64,
    pub settle_scroll_px: i64,
    pub settle_pause_millis: u64,
    pub layout: ColumnLayout,
    pub validate_field_shapes: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            target_url: "https://coinmarketcap.com/".into(),
            row_selector: "table.cmc-table tbody tr".into(),
            cell_selector: "td".into(),
            row_limit: DEFAULT_ROW_LIMIT,
            page_load_timeout_secs: 30,
            table_timeout_secs: 10,
            settle_scroll_px: 500,
            settle_pause_millis: 2000,
            layout: ColumnLayout::default(),
            validate_field_shapes: false,
        }
    }
}

impl ScrapingConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn table_timeout(&self) -> Duration {
        Duration::from_secs(self.table_timeout_secs)
    }

    pub fn settle_pause(&self) -> Duration {
        Duration::from_millis(self.settle_pause_millis)
    }
}

/// Zero-based cell positions of each field in a ranking row (desktop layout).
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnLayout {
    /// Rows with fewer cells are ads or promotional rows.
    pub min_cells: usize,
    pub name: usize,
    pub price: usize,
    pub change_24h: usize,
    pub market_cap: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            min_cells: 8,
            name: 2,
            price: 3,
            change_24h: 5,
            market_cap: 7,
        }
    }
}

impl ColumnLayout {
    pub fn max_index(&self) -> usize {
        self.name
            .max(self.price)
            .max(self.change_24h)
            .max(self.market_cap)
    }
}
