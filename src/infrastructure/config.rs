use crate::application::chart_builder::ChartOptions;
use crate::domain::chart::ChartKind;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid server.bind address '{0}'")]
    InvalidBind(String),
    #[error("chart.max_points_per_series must be greater than zero")]
    ZeroMaxPoints,
    #[error("session.idle_ttl_secs must be greater than zero")]
    ZeroSessionTtl,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    #[serde(default)]
    pub kind: ChartKind,
    #[serde(default = "default_reference_date")]
    pub reference_date: NaiveDate,
    #[serde(default = "default_title")]
    pub title: String,
    pub max_points_per_series: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageSettings {
    pub header: Option<String>,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
}

/// Per-page controller lifetime
#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:8050".to_string()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("processed_data.csv")
}

fn default_idle_ttl_secs() -> u64 {
    30 * 60
}

fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 15).unwrap_or_default()
}

fn default_title() -> String {
    "Pink Morsel Sales Over Time".to_string()
}

fn default_description() -> String {
    "This dashboard visualizes the daily sales of Pink Morsels. The red dashed line \
     indicates the date of the price increase on ${reference_date}."
        .to_string()
}

fn default_regions() -> Vec<String> {
    ["north", "south", "east", "west"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            kind: ChartKind::default(),
            reference_date: default_reference_date(),
            title: default_title(),
            max_points_per_series: None,
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            header: None,
            description: default_description(),
            regions: default_regions(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_idle_ttl_secs(),
        }
    }
}

impl Settings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.server
            .bind
            .parse()
            .map_err(|_| SettingsError::InvalidBind(self.server.bind.clone()))
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            title: self.chart.title.clone(),
            kind: self.chart.kind,
            max_points_per_series: self.chart.max_points_per_series,
        }
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session.idle_ttl_secs)
    }

    /// Page header, defaulting per chart kind
    pub fn header(&self) -> String {
        match (&self.page.header, self.chart.kind) {
            (Some(header), _) => header.clone(),
            (None, ChartKind::Line) => "Soul Foods - Pink Morsel Sales Performance".to_string(),
            (None, ChartKind::Line3d) => "3D Pink Morsel Sales Analysis".to_string(),
        }
    }

    pub fn description(&self) -> String {
        let mut vars = HashMap::new();
        vars.insert(
            "reference_date".to_string(),
            long_date(self.chart.reference_date),
        );
        render_template(&self.page.description, &vars)
    }

    fn validate(self) -> Result<Self, SettingsError> {
        self.bind_addr()?;
        if self.chart.max_points_per_series == Some(0) {
            return Err(SettingsError::ZeroMaxPoints);
        }
        if self.session.idle_ttl_secs == 0 {
            return Err(SettingsError::ZeroSessionTtl);
        }
        Ok(self)
    }
}

/// `January 15th, 2021`
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Load settings from `file` (optional, any format the config crate knows)
/// overlaid with `DASHBOARD__SECTION__KEY` environment variables.
pub fn load_settings(file: &str) -> Result<Settings, SettingsError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(file).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()
}

/// Replace template variables in a string
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
