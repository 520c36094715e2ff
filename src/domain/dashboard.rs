// Dashboard page domain model
use super::chart::ChartKind;
use super::sales::ALL_REGIONS;

#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub header: String,
    pub description: String,
    pub kind: ChartKind,
    /// Radio options, wildcard first
    pub options: Vec<String>,
}

impl DashboardPage {
    pub fn new(header: String, description: String, kind: ChartKind, regions: &[String]) -> Self {
        let mut options = vec![ALL_REGIONS.to_string()];
        options.extend(
            regions
                .iter()
                .map(|r| r.trim().to_lowercase())
                .filter(|r| r != ALL_REGIONS && !r.is_empty()),
        );
        Self {
            header,
            description,
            kind,
            options,
        }
    }

    pub fn chart_element_id(&self) -> &'static str {
        self.kind.element_id()
    }
}
