// Domain layer - Records, selectors and chart descriptions
pub mod chart;
pub mod dashboard;
pub mod sales;
