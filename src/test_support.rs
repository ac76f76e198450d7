//! In-memory stand-ins for the rendered ranking page.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{NaiveDate, NaiveDateTime};
use error_stack::Report;

use crate::domain::{
    AcquisitionError, DocumentCell, DocumentError, DocumentProvider, DocumentRow, PageTarget,
    RankingDocument,
};

pub fn fixed_instant() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|date| date.and_hms_opt(12, 30, 45))
        .unwrap()
}

#[derive(Debug, Clone)]
pub struct FakeCell(Option<String>);

#[async_trait::async_trait]
impl DocumentCell for FakeCell {
    async fn text(&self) -> error_stack::Result<String, DocumentError> {
        self.0
            .clone()
            .ok_or_else(|| Report::new(DocumentError::TextUnavailable))
    }
}

#[derive(Debug, Clone)]
pub struct FakeRow(Option<Vec<FakeCell>>);

impl FakeRow {
    /// A desktop ranking row: star, rank, name, price, 1h, 24h, 7d, market cap.
    pub fn coin(rank: usize, name: &str, symbol: &str, price: &str) -> Self {
        Self::from_cells(&[
            "",
            &rank.to_string(),
            &format!("{}\n{}", name, symbol),
            price,
            "0.10%",
            "1.25%",
            "-3.40%",
            "$1.32T$1,320,512,000,000",
            "$31,002,113,504",
        ])
    }

    pub fn from_cells(cells: &[&str]) -> Self {
        Self(Some(
            cells
                .iter()
                .map(|text| FakeCell(Some(text.to_string())))
                .collect(),
        ))
    }

    /// Promotional row spanning the table.
    pub fn ad() -> Self {
        Self::from_cells(&["Sponsored", "Trade now"])
    }

    /// Enough cells, but the cell at `index` cannot be read.
    pub fn with_unreadable_cell(mut self, index: usize) -> Self {
        if let Some(cells) = self.0.as_mut() {
            cells[index] = FakeCell(None);
        }
        self
    }

    pub fn detached() -> Self {
        Self(None)
    }
}

#[async_trait::async_trait]
impl DocumentRow for FakeRow {
    type Cell = FakeCell;

    async fn cells(&self, _selector: &str) -> error_stack::Result<Vec<FakeCell>, DocumentError> {
        self.0
            .clone()
            .ok_or_else(|| Report::new(DocumentError::QueryFailed))
    }
}

#[derive(Debug, Default)]
pub struct FakeDocument {
    pub rows: Vec<FakeRow>,
    pub table_missing: bool,
    pub settle_fails: bool,
    pub settled: AtomicBool,
}

impl FakeDocument {
    pub fn new(rows: Vec<FakeRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn with_coins(count: usize) -> Self {
        Self::new(
            (1..=count)
                .map(|rank| FakeRow::coin(rank, &format!("Coin{}", rank), "CN", "$1.00"))
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl RankingDocument for FakeDocument {
    type Row = FakeRow;

    async fn settle(
        &self,
        _scroll_px: i64,
        _pause: Duration,
    ) -> error_stack::Result<(), DocumentError> {
        self.settled.store(true, Ordering::SeqCst);
        if self.settle_fails {
            return Err(Report::new(DocumentError::ScriptFailed));
        }
        Ok(())
    }

    async fn rows(&self, _selector: &str) -> error_stack::Result<Vec<FakeRow>, DocumentError> {
        if self.table_missing {
            return Err(Report::new(DocumentError::QueryFailed));
        }
        Ok(self.rows.clone())
    }
}

/// Hands out one prepared document, or times out when there is none, and
/// counts releases.
pub struct FakeProvider {
    pub document: std::sync::Mutex<Option<FakeDocument>>,
    pub releases: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn serving(document: FakeDocument) -> Self {
        Self {
            document: std::sync::Mutex::new(Some(document)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            document: std::sync::Mutex::new(None),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl DocumentProvider for FakeProvider {
    type Document = FakeDocument;

    async fn load(
        &self,
        _target: PageTarget<'_>,
    ) -> error_stack::Result<FakeDocument, AcquisitionError> {
        self.document
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Report::new(AcquisitionError::Timeout))
    }

    async fn release(self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
