// CSV repository implementation
use crate::application::sales_repository::SalesRepository;
use crate::domain::sales::{Region, SalesRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("sales data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read sales data: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("line {line}: invalid date '{value}'")]
    InvalidDate { line: u64, value: String },
    #[error("line {line}: invalid sales amount '{value}'")]
    InvalidAmount { line: u64, value: String },
    #[error("line {line}: empty region")]
    EmptyRegion { line: u64 },
}

#[derive(Debug, Clone)]
pub struct CsvSalesRepository {
    path: PathBuf,
}

struct ColumnIndex {
    date: usize,
    region: usize,
    sales: usize,
}

impl CsvSalesRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Vec<SalesRecord>, DataError> {
        if !self.path.is_file() {
            return Err(DataError::NotFound(self.path.clone()));
        }
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        parse_records(reader)
    }
}

/// Parse a CSV with `date`, `region` and `sales` columns (any case, any order)
pub fn parse_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<SalesRecord>, DataError> {
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect::<Vec<_>>();
    tracing::debug!("CSV headers: {:?}", headers);

    let idx = |name: &'static str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(DataError::MissingColumn(name))
    };
    let columns = ColumnIndex {
        date: idx("date")?,
        region: idx("region")?,
        sales: idx("sales")?,
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let field = |i: usize| row.get(i).unwrap_or("");

        let raw_date = field(columns.date);
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
            DataError::InvalidDate {
                line,
                value: raw_date.to_string(),
            }
        })?;

        let region = Region::new(field(columns.region));
        if region.as_str().is_empty() {
            return Err(DataError::EmptyRegion { line });
        }

        let raw_amount = field(columns.sales);
        let amount = parse_amount(raw_amount).ok_or_else(|| DataError::InvalidAmount {
            line,
            value: raw_amount.to_string(),
        })?;

        records.push(SalesRecord::new(date, region, amount));
    }

    Ok(records)
}

/// Accepts `123.45`, `$123.45` and `$1,234.50`; rejects negatives,
/// non-finite values and misplaced thousands separators
fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.strip_prefix('$').unwrap_or(raw);
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let digits = if whole.contains(',') {
        if !valid_grouping(whole) {
            return None;
        }
        whole.replace(',', "")
    } else {
        whole.to_string()
    };
    let normalized = match fraction {
        Some(fraction) => format!("{digits}.{fraction}"),
        None => digits,
    };

    let value: f64 = normalized.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// `1,234,567`: a lead group of 1-3 digits, then groups of exactly 3
fn valid_grouping(whole: &str) -> bool {
    let mut groups = whole.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    lead_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

#[async_trait]
impl SalesRepository for CsvSalesRepository {
    async fn load_records(&self) -> anyhow::Result<Vec<SalesRecord>> {
        let repository = self.clone();
        let records = tokio::task::spawn_blocking(move || repository.read_file()).await??;
        Ok(records)
    }
}
