// Chart builder - Turns a record subset into a chart description
use crate::domain::chart::{ChartDescription, ChartKind, ReferenceMarker, SalesPoint, SeriesData};
use crate::domain::sales::{Region, SalesRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Qualitative palette shared by every chart
pub const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// Regions shipped with the dataset, in palette and lane order
const KNOWN_REGIONS: [&str; 4] = ["north", "south", "east", "west"];

const MARKER_COLOR: &str = "red";
const MARKER_DASH: &str = "dash";
const MARKER_WIDTH: u32 = 2;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub title: String,
    pub kind: ChartKind,
    pub max_points_per_series: Option<usize>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Pink Morsel Sales Over Time".to_string(),
            kind: ChartKind::Line,
            max_points_per_series: None,
        }
    }
}

/// Build a chart description for `subset`.
///
/// Every region in the subset becomes one series with its points in date
/// order; series are ordered by region label. The reference marker spans the
/// observed amount range: it collapses to a single value when every amount is
/// equal and is omitted entirely for an empty subset.
pub fn build_chart(
    subset: &[SalesRecord],
    reference_date: NaiveDate,
    options: &ChartOptions,
) -> ChartDescription {
    let mut grouped: BTreeMap<&Region, Vec<SalesPoint>> = BTreeMap::new();
    for record in subset {
        grouped
            .entry(&record.region)
            .or_default()
            .push(SalesPoint::new(record.date, record.amount));
    }

    let series: Vec<SeriesData> = grouped
        .into_iter()
        .map(|(region, mut points)| {
            points.sort_by_key(|p| p.date);
            let points = match options.max_points_per_series {
                Some(max_points) if points.len() > max_points => {
                    downsample_points(points, max_points)
                }
                _ => points,
            };
            let lane = match options.kind {
                ChartKind::Line => None,
                ChartKind::Line3d => Some(region_lane(region)),
            };
            SeriesData::new(region.clone(), region_color(region).to_string(), lane, points)
        })
        .collect();

    let marker = value_range(subset).map(|(low, high)| ReferenceMarker {
        date: reference_date,
        low,
        high,
        color: MARKER_COLOR.to_string(),
        width: MARKER_WIDTH,
        dash: MARKER_DASH.to_string(),
    });

    ChartDescription::new(options.title.clone(), options.kind, series, marker)
}

/// Color for a region, derived from its label only
pub fn region_color(region: &Region) -> &'static str {
    let slot = match KNOWN_REGIONS.iter().position(|r| *r == region.as_str()) {
        Some(idx) => idx,
        None => (fnv1a(region.as_str()) % PALETTE.len() as u64) as usize,
    };
    PALETTE[slot]
}

/// Depth lane on the 3D chart, derived from the label only
pub fn region_lane(region: &Region) -> u32 {
    match KNOWN_REGIONS.iter().position(|r| *r == region.as_str()) {
        Some(idx) => idx as u32,
        None => KNOWN_REGIONS.len() as u32 + (fnv1a(region.as_str()) % 16) as u32,
    }
}

fn fnv1a(label: &str) -> u64 {
    label.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn value_range(subset: &[SalesRecord]) -> Option<(f64, f64)> {
    subset.iter().map(|r| r.amount).fold(None, |range, amount| match range {
        None => Some((amount, amount)),
        Some((low, high)) => Some((low.min(amount), high.max(amount))),
    })
}

/// Downsample points using bucket averaging
fn downsample_points(points: Vec<SalesPoint>, max_points: usize) -> Vec<SalesPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = (points.len() as f64 / max_points as f64).ceil() as usize;
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in points.chunks(bucket_size) {
        // Middle point's date, average amount
        let mid_idx = chunk.len() / 2;
        let avg_amount = chunk.iter().map(|p| p.amount).sum::<f64>() / chunk.len() as f64;
        downsampled.push(SalesPoint::new(chunk[mid_idx].date, avg_amount));
    }

    downsampled
}
