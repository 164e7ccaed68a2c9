pub mod config;
pub mod dates;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ShowScoutError;
pub use types::{ShowCandidate, ShowRecord};
