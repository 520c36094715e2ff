// Repository trait for sales data access
use crate::domain::sales::SalesRecord;
use async_trait::async_trait;

#[async_trait]
pub trait SalesRepository: Send + Sync {
    /// Load every sales record, in source order
    async fn load_records(&self) -> anyhow::Result<Vec<SalesRecord>>;
}
