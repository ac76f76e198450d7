use std::{fmt, num::NonZeroUsize};

use error_stack::{Report, ResultExt};
use thiserror::Error;

use super::field::Field;
use crate::{
    config::ScrapingConfig,
    domain::{Clock, DocumentCell, DocumentRow, RankingDocument, Record, SystemClock},
};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Ranking table rows could not be queried")]
    TableUnavailable,
}

/// Why a candidate row produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    CellsUnavailable,
    TooFewCells { found: usize, required: usize },
    FieldUnreadable { field: Field },
    EmptyField { field: Field },
    ShapeMismatch { field: Field, text: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CellsUnavailable => write!(f, "cells could not be queried"),
            SkipReason::TooFewCells { found, required } => {
                write!(f, "{} cells, at least {} required", found, required)
            }
            SkipReason::FieldUnreadable { field } => write!(f, "{} cell text unavailable", field),
            SkipReason::EmptyField { field } => write!(f, "{} cell is empty", field),
            SkipReason::ShapeMismatch { field, text } => {
                write!(f, "{:?} does not look like a {} value", text, field)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(Record),
    Skipped(SkipReason),
}

/// Result of one pass over the ranking table.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Accepted records in document order, never more than the row limit.
    pub records: Vec<Record>,
    pub skipped: usize,
    /// Set when the table itself could not be queried; `records` is then empty.
    pub table_failure: Option<Report<ExtractionError>>,
}

pub struct RowExtractor<'a, C = SystemClock> {
    config: &'a ScrapingConfig,
    clock: C,
}

impl<'a> RowExtractor<'a> {
    pub fn new(config: &'a ScrapingConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<'a, C: Clock> RowExtractor<'a, C> {
    pub fn with_clock(config: &'a ScrapingConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub async fn extract<D: RankingDocument>(&self, document: &D) -> Extraction {
        self.extract_at_most(document, self.config.row_limit).await
    }

    pub async fn extract_at_most<D: RankingDocument>(
        &self,
        document: &D,
        limit: NonZeroUsize,
    ) -> Extraction {
        if let Err(report) = document
            .settle(self.config.settle_scroll_px, self.config.settle_pause())
            .await
        {
            log::warn!("Settle action failed, extracting rendered rows as-is: {:?}", report);
        }

        log::info!("Extracting data...");
        let rows = match document
            .rows(&self.config.row_selector)
            .await
            .change_context(ExtractionError::TableUnavailable)
            .attach_printable_lazy(|| format!("Row selector: {}", self.config.row_selector))
        {
            Ok(rows) => rows,
            Err(report) => {
                log::error!("Error locating ranking table: {:?}", report);
                return Extraction {
                    table_failure: Some(report),
                    ..Default::default()
                };
            }
        };

        log::debug!("Found {} candidate rows", rows.len());

        let mut extraction = Extraction::default();
        for (position, row) in rows.iter().enumerate() {
            if extraction.records.len() >= limit.get() {
                break;
            }

            match self.parse_row(row).await {
                RowOutcome::Accepted(record) => {
                    log::info!("Scraped: {} - {}", record.name(), record.price());
                    extraction.records.push(record);
                }
                RowOutcome::Skipped(reason) => {
                    log::debug!("Skipping row {}: {}", position, reason);
                    extraction.skipped += 1;
                }
            }
        }

        extraction
    }

    /// Turns one candidate row into a record, or says why it cannot be one.
    pub async fn parse_row<R: DocumentRow>(&self, row: &R) -> RowOutcome {
        match self.read_record(row).await {
            Ok(record) => RowOutcome::Accepted(record),
            Err(reason) => RowOutcome::Skipped(reason),
        }
    }

    async fn read_record<R: DocumentRow>(&self, row: &R) -> Result<Record, SkipReason> {
        let cells = row
            .cells(&self.config.cell_selector)
            .await
            .map_err(|report| {
                log::trace!("Cell query failed: {:?}", report);
                SkipReason::CellsUnavailable
            })?;

        let required = self.config.layout.min_cells;
        if cells.len() < required {
            return Err(SkipReason::TooFewCells {
                found: cells.len(),
                required,
            });
        }

        let name = self.read_field(&cells, Field::Name).await?;
        let price = self.read_field(&cells, Field::Price).await?;
        let change_24h = self.read_field(&cells, Field::Change24h).await?;
        let market_cap = self.read_field(&cells, Field::MarketCap).await?;

        Ok(Record::new(
            self.clock.now(),
            name,
            price,
            change_24h,
            market_cap,
        ))
    }

    async fn read_field<T: DocumentCell>(
        &self,
        cells: &[T],
        field: Field,
    ) -> Result<String, SkipReason> {
        let index = field.index(&self.config.layout);
        let cell = cells.get(index).ok_or(SkipReason::TooFewCells {
            found: cells.len(),
            required: index + 1,
        })?;

        let text = cell.text().await.map_err(|report| {
            log::trace!("{} text read failed: {:?}", field, report);
            SkipReason::FieldUnreadable { field }
        })?;

        let text = field.normalize(&text);
        if text.is_empty() {
            return Err(SkipReason::EmptyField { field });
        }

        if self.config.validate_field_shapes && !field.has_expected_shape(&text) {
            return Err(SkipReason::ShapeMismatch { field, text });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::domain::FixedClock;
    use crate::test_support::{fixed_instant, FakeDocument, FakeRow};

    fn config() -> ScrapingConfig {
        ScrapingConfig {
            settle_pause_millis: 0,
            ..Default::default()
        }
    }

    fn extractor(config: &ScrapingConfig) -> RowExtractor<'_, FixedClock> {
        RowExtractor::with_clock(config, FixedClock(fixed_instant()))
    }

    fn names(extraction: &Extraction) -> Vec<&str> {
        extraction.records.iter().map(Record::name).collect()
    }

    #[tokio::test]
    async fn test_stops_at_row_limit() {
        let config = config();
        let document = FakeDocument::with_coins(12);

        let extraction = extractor(&config).extract(&document).await;

        assert_eq!(extraction.records.len(), 10);
        assert_eq!(extraction.records[0].name(), "Coin1 CN");
        assert_eq!(extraction.records[9].name(), "Coin10 CN");
        assert!(extraction.table_failure.is_none());
    }

    #[tokio::test]
    async fn test_malformed_rows_do_not_consume_slots() {
        let config = config();
        let document = FakeDocument::new(vec![
            FakeRow::ad(),
            FakeRow::coin(1, "Bitcoin", "BTC", "$67,012.40"),
            FakeRow::coin(2, "Ethereum", "ETH", "$3,512.08").with_unreadable_cell(3),
            FakeRow::coin(3, "Tether", "USDT", "$1.00"),
            FakeRow::coin(4, "BNB", "BNB", "$598.10"),
        ]);

        let extraction = extractor(&config)
            .extract_at_most(&document, NonZeroUsize::new(3).unwrap())
            .await;

        assert_eq!(names(&extraction), vec!["Bitcoin BTC", "Tether USDT", "BNB BNB"]);
        assert_eq!(extraction.skipped, 2);
    }

    #[tokio::test]
    async fn test_leading_malformed_rows_with_default_limit() {
        let config = config();
        let document = FakeDocument::new(vec![
            FakeRow::ad(),
            FakeRow::from_cells(&["", "1", "Bitcoin\nBTC", "$67,012.40"]),
            FakeRow::coin(1, "Bitcoin", "BTC", "$67,012.40"),
            FakeRow::coin(2, "Ethereum", "ETH", "$3,512.08"),
            FakeRow::coin(3, "Tether", "USDT", "$1.00"),
        ]);

        let extraction = extractor(&config).extract(&document).await;

        assert_eq!(
            names(&extraction),
            vec!["Bitcoin BTC", "Ethereum ETH", "Tether USDT"]
        );
        assert_eq!(extraction.skipped, 2);
        assert!(extraction.table_failure.is_none());
    }

    #[tokio::test]
    async fn test_fewer_valid_rows_than_limit() {
        let config = config();
        let document = FakeDocument::new(vec![
            FakeRow::coin(1, "Bitcoin", "BTC", "$67,012.40"),
            FakeRow::ad(),
            FakeRow::detached(),
        ]);

        let extraction = extractor(&config).extract(&document).await;

        assert_eq!(names(&extraction), vec!["Bitcoin BTC"]);
        assert_eq!(extraction.skipped, 2);
    }

    #[tokio::test]
    async fn test_empty_table_yields_no_records() {
        let config = config();
        let extraction = extractor(&config).extract(&FakeDocument::new(vec![])).await;

        assert!(extraction.records.is_empty());
        assert!(extraction.table_failure.is_none());
    }

    #[tokio::test]
    async fn test_missing_table_is_reported_not_raised() {
        let config = config();
        let document = FakeDocument {
            table_missing: true,
            ..FakeDocument::with_coins(3)
        };

        let extraction = extractor(&config).extract(&document).await;

        assert!(extraction.records.is_empty());
        let report = extraction.table_failure.expect("table failure");
        assert!(matches!(
            report.current_context(),
            ExtractionError::TableUnavailable
        ));
    }

    #[tokio::test]
    async fn test_failed_settle_still_extracts() {
        let config = config();
        let document = FakeDocument {
            settle_fails: true,
            ..FakeDocument::with_coins(2)
        };

        let extraction = extractor(&config).extract(&document).await;

        assert!(document.settled.load(Ordering::SeqCst));
        assert_eq!(extraction.records.len(), 2);
    }

    #[tokio::test]
    async fn test_record_fields_are_taken_by_position() {
        let config = config();
        let row = FakeRow::coin(1, "Bitcoin", "BTC", "$67,012.40");

        let outcome = extractor(&config).parse_row(&row).await;

        let expected = Record::new(
            fixed_instant(),
            "Bitcoin BTC",
            "$67,012.40",
            "1.25%",
            "$1.32T$1,320,512,000,000",
        );
        assert_eq!(outcome, RowOutcome::Accepted(expected));
    }

    #[tokio::test]
    async fn test_short_row_is_skipped_whatever_its_content() {
        let config = config();
        let row = FakeRow::from_cells(&["", "1", "Bitcoin\nBTC", "$67,012.40", "0.1%", "1.2%", "3%"]);

        let outcome = extractor(&config).parse_row(&row).await;

        assert_eq!(
            outcome,
            RowOutcome::Skipped(SkipReason::TooFewCells {
                found: 7,
                required: 8
            })
        );
    }

    #[tokio::test]
    async fn test_unreadable_field_discards_whole_row() {
        let config = config();
        let row = FakeRow::coin(1, "Bitcoin", "BTC", "$67,012.40").with_unreadable_cell(7);

        let outcome = extractor(&config).parse_row(&row).await;

        assert_eq!(
            outcome,
            RowOutcome::Skipped(SkipReason::FieldUnreadable {
                field: Field::MarketCap
            })
        );
    }

    #[tokio::test]
    async fn test_empty_field_discards_whole_row() {
        let config = config();
        let row = FakeRow::from_cells(&["", "1", "Bitcoin\nBTC", "  ", "0.1%", "1.2%", "3%", "$1T"]);

        let outcome = extractor(&config).parse_row(&row).await;

        assert_eq!(
            outcome,
            RowOutcome::Skipped(SkipReason::EmptyField {
                field: Field::Price
            })
        );
    }

    #[tokio::test]
    async fn test_shape_validation_is_opt_in() {
        let row = FakeRow::from_cells(&["", "1", "Bitcoin\nBTC", "1.2%", "0.1%", "$67,012", "3%", "$1T"]);

        let lenient = config();
        assert!(matches!(
            extractor(&lenient).parse_row(&row).await,
            RowOutcome::Accepted(_)
        ));

        let strict = ScrapingConfig {
            validate_field_shapes: true,
            ..config()
        };
        assert_eq!(
            extractor(&strict).parse_row(&row).await,
            RowOutcome::Skipped(SkipReason::ShapeMismatch {
                field: Field::Price,
                text: "1.2%".to_string()
            })
        );
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::TooFewCells {
            found: 2,
            required: 8,
        };
        assert_eq!(reason.to_string(), "2 cells, at least 8 required");
    }
}
