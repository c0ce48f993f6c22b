//! Driving port for reading spin outcomes.

use async_trait::async_trait;

use crate::domain::{Error, SpinId, SpinOutcome};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpinQuery: Send + Sync {
    /// Fetch one outcome; unknown ids are `not_found`.
    async fn get_spin(&self, spin_id: SpinId) -> Result<SpinOutcome, Error>;
}
