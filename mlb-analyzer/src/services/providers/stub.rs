//! Default provider: empty but well-formed data.

use super::{DataProvider, ProviderError};
use crate::models::{Hitter, Pitcher};
use async_trait::async_trait;
use chrono::NaiveDate;

pub struct StubProvider;

#[async_trait]
impl DataProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn hitters(&self, _date: NaiveDate) -> Result<Vec<Hitter>, ProviderError> {
        Ok(Vec::new())
    }

    async fn pitchers(&self, _date: NaiveDate) -> Result<Vec<Pitcher>, ProviderError> {
        Ok(Vec::new())
    }
}
