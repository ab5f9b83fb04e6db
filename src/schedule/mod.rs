pub mod builder;
pub mod scheduler;
pub mod shuffle;
pub mod trial;

pub use builder::{TaggedItem, TrialPlan, TrialSequenceBuilder};
pub use scheduler::{extract_delayed, schedule_inline, InlineSchedule, ScheduledEntry};
pub use shuffle::{shuffle_with_seed, SeededRandom, ShuffleStrategy};
pub use trial::{QuestionTrial, ReadingTrial, TrialUnit};
