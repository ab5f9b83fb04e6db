//! Trial records, session summary, submission and local export

pub mod export;
pub mod record;
pub mod save;
pub mod submit;
pub mod summary;

pub use export::{read_jsonl, records_to_csv, write_download_files, ExportPaths};
pub use record::{ComprehensionRecord, ReadingRecord, TrialRecord, WordTiming};
pub use save::{save_session, SaveReport};
pub use submit::{SubmitError, SubmitOutcome, Submitter};
pub use summary::{SessionResult, SessionStats};
