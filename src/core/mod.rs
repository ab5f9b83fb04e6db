pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use config::ExperimentConfig;
pub use error::{Result, SprError};
pub use session::{parse_start_time, SessionContext, SessionSeed};
pub use types::{ItemId, Phase, Provenance, QuestionKind};
