// Chart description domain models
use super::sales::Region;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Line3d,
}

impl ChartKind {
    /// DOM id of the chart element for this kind
    pub fn element_id(&self) -> &'static str {
        match self {
            ChartKind::Line => "sales-line-chart",
            ChartKind::Line3d => "sales-3d-chart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

impl SalesPoint {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub region: Region,
    pub color: String,
    /// Depth lane on the 3D chart; `None` for flat line charts
    pub lane: Option<u32>,
    pub points: Vec<SalesPoint>,
}

impl SeriesData {
    pub fn new(region: Region, color: String, lane: Option<u32>, points: Vec<SalesPoint>) -> Self {
        Self {
            region,
            color,
            lane,
            points,
        }
    }
}

/// Vertical guide drawn at the reference date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMarker {
    pub date: NaiveDate,
    pub low: f64,
    pub high: f64,
    pub color: String,
    pub width: u32,
    pub dash: String,
}

#[cfg(test)]
impl ReferenceMarker {
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    pub legend: String,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            x: "Date".to_string(),
            y: "Total Sales ($)".to_string(),
            legend: "Region".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub plot_background: String,
    pub paper_background: String,
    pub font_family: String,
    pub font_color: String,
    pub title_font_size: u32,
    pub title_x: f64,
    pub hover_mode: String,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            plot_background: "#f9f9f9".to_string(),
            paper_background: "#ffffff".to_string(),
            font_family: "Arial".to_string(),
            font_color: "#333".to_string(),
            title_font_size: 24,
            title_x: 0.5,
            hover_mode: "x unified".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescription {
    pub title: String,
    pub kind: ChartKind,
    pub axis: AxisLabels,
    pub layout: ChartLayout,
    pub series: Vec<SeriesData>,
    pub marker: Option<ReferenceMarker>,
}

impl ChartDescription {
    pub fn new(
        title: String,
        kind: ChartKind,
        series: Vec<SeriesData>,
        marker: Option<ReferenceMarker>,
    ) -> Self {
        Self {
            title,
            kind,
            axis: AxisLabels::default(),
            layout: ChartLayout::default(),
            series,
            marker,
        }
    }

    #[cfg(test)]
    pub fn series_for(&self, region: &Region) -> Option<&SeriesData> {
        self.series.iter().find(|s| &s.region == region)
    }
}
