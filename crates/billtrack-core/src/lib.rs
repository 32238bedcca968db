pub mod commands;
pub mod config;
pub mod contracts;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod events;
pub mod matching;
pub mod model;
pub mod payday;
pub mod query;
pub mod templates;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use engine::{BillEngine, MatchMode};
pub use error::{CoreError, CoreResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
