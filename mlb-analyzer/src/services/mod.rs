pub mod dates;
pub mod filters;
pub mod matchups;
pub mod metrics;
pub mod providers;

pub use metrics::{get_metrics, init_metrics};
pub use providers::{load_provider, DataProvider, ProviderError, ProviderSlot};
