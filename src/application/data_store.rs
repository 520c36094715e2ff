// Data store - Read-only, date-sorted dataset shared by every request
use crate::application::sales_repository::SalesRepository;
use crate::domain::sales::{Region, SalesRecord};
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct DataStore {
    records: Vec<SalesRecord>,
}

impl DataStore {
    pub fn new(mut records: Vec<SalesRecord>) -> Self {
        // Stable: rows sharing a date keep source order
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub async fn load(repository: &dyn SalesRepository) -> anyhow::Result<Self> {
        let records = repository.load_records().await?;
        let store = Self::new(records);

        match store.date_span() {
            Some((first, last)) => tracing::info!(
                "Loaded {} sales records across {} regions ({} to {})",
                store.len(),
                store.regions().len(),
                first,
                last
            ),
            None => tracing::warn!("Sales dataset is empty"),
        }

        Ok(store)
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct region labels present in the data
    pub fn regions(&self) -> BTreeSet<Region> {
        self.records.iter().map(|r| r.region.clone()).collect()
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}
