// Sales domain model
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wildcard selector value
pub const ALL_REGIONS: &str = "all";

/// Region label, normalized to trimmed lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(label: &str) -> Self {
        Self(label.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub region: Region,
    pub amount: f64,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, region: Region, amount: f64) -> Self {
        Self {
            date,
            region,
            amount,
        }
    }
}

/// User-chosen region filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RegionSelector {
    #[default]
    All,
    Region(Region),
}

impl RegionSelector {
    pub fn matches(&self, region: &Region) -> bool {
        match self {
            RegionSelector::All => true,
            RegionSelector::Region(selected) => selected == region,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RegionSelector::All => ALL_REGIONS,
            RegionSelector::Region(region) => region.as_str(),
        }
    }
}

impl From<&str> for RegionSelector {
    // Any label parses; labels absent from the data simply match nothing.
    fn from(s: &str) -> Self {
        let region = Region::new(s);
        if region.as_str() == ALL_REGIONS {
            RegionSelector::All
        } else {
            RegionSelector::Region(region)
        }
    }
}

impl FromStr for RegionSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RegionSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RegionSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RegionSelector::from(raw.as_str()))
    }
}

/// Return the records matching `selector`, preserving input order.
///
/// The wildcard returns every record. A region that does not occur in
/// `records` yields an empty subset rather than falling back to the wildcard.
pub fn filter_records(records: &[SalesRecord], selector: &RegionSelector) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|record| selector.matches(&record.region))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub(crate) fn record(d: &str, region: &str, amount: f64) -> SalesRecord {
        SalesRecord::new(date(d), Region::new(region), amount)
    }

    pub(crate) fn scenario_records() -> Vec<SalesRecord> {
        vec![
            record("2021-01-10", "north", 100.0),
            record("2021-01-20", "north", 200.0),
            record("2021-01-10", "south", 50.0),
        ]
    }

    fn mixed_records() -> Vec<SalesRecord> {
        vec![
            record("2021-01-01", "east", 10.0),
            record("2021-01-01", "west", 20.0),
            record("2021-01-02", "north", 30.0),
            record("2021-01-02", "east", 40.0),
            record("2021-01-03", "south", 50.0),
            record("2021-01-03", "west", 60.0),
            record("2021-01-04", "east", 70.0),
        ]
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(RegionSelector::from("all"), RegionSelector::All);
        assert_eq!(RegionSelector::from(" ALL "), RegionSelector::All);
        assert_eq!(
            RegionSelector::from("North"),
            RegionSelector::Region(Region::new("north"))
        );
        assert_eq!(RegionSelector::from("north").to_string(), "north");
    }

    #[test]
    fn test_filter_only_returns_selected_region() {
        let records = mixed_records();
        for label in ["north", "south", "east", "west"] {
            let selector = RegionSelector::from(label);
            let subset = filter_records(&records, &selector);
            assert!(!subset.is_empty(), "{label} should have rows");
            assert!(subset.iter().all(|r| r.region.as_str() == label));
        }
        assert_eq!(filter_records(&records, &RegionSelector::All), records);
    }

    #[test]
    fn test_filter_preserves_order() {
        let records = mixed_records();
        let subset = filter_records(&records, &RegionSelector::from("east"));
        let amounts: Vec<f64> = subset.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![10.0, 40.0, 70.0]);
    }

    #[test]
    fn test_refilter_to_all_reproduces_dataset() {
        let records = mixed_records();
        let _west = filter_records(&records, &RegionSelector::from("west"));
        let all = filter_records(&records, &RegionSelector::All);
        assert_eq!(all, records);
    }

    #[test]
    fn test_unknown_region_yields_empty_subset() {
        let records = scenario_records();
        assert!(filter_records(&records, &RegionSelector::from("west")).is_empty());
        assert!(filter_records(&records, &RegionSelector::from("atlantis")).is_empty());
    }

    #[test]
    fn test_north_scenario() {
        let records = scenario_records();
        let north = filter_records(&records, &RegionSelector::from("north"));
        assert_eq!(north, vec![records[0].clone(), records[1].clone()]);
    }
}
