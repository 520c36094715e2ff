// Dashboard service - Use case for rendering the chart for a selector
use crate::application::chart_builder::{ChartOptions, build_chart};
use crate::application::data_store::DataStore;
use crate::domain::chart::ChartDescription;
use crate::domain::sales::{RegionSelector, filter_records};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<DataStore>,
    reference_date: NaiveDate,
    options: ChartOptions,
}

impl DashboardService {
    pub fn new(store: Arc<DataStore>, reference_date: NaiveDate, options: ChartOptions) -> Self {
        Self {
            store,
            reference_date,
            options,
        }
    }

    /// Filter the store by `selector` and build its chart
    pub fn render(&self, selector: &RegionSelector) -> ChartDescription {
        let subset = filter_records(self.store.records(), selector);
        if subset.is_empty() {
            tracing::debug!("Selector {} matched no records", selector);
        }
        build_chart(&subset, self.reference_date, &self.options)
    }

    #[cfg(test)]
    pub fn store(&self) -> &DataStore {
        &self.store
    }
}
