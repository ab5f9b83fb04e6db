//! SPR Experiment - self-paced reading with reproducible trial scheduling

pub mod core;
pub mod loader;
pub mod results;
pub mod runner;
pub mod schedule;
pub mod stimuli;
