//! Driving a trial sequence through a presentation layer
//!
//! [`Presenter`] is the seam between scheduling and whatever shows words on
//! screen. [`ExperimentRunner`] walks the units of a [`TrialPlan`] through a
//! presenter and turns the measurements into [`TrialRecord`]s.

pub mod scripted;
pub mod terminal;

pub use scripted::{PresenterEvent, ScriptedPresenter};
pub use terminal::TerminalPresenter;

use std::time::Duration;

use crate::core::error::Result;
use crate::core::types::{Millis, Phase};
use crate::results::record::{ComprehensionRecord, ReadingRecord, TrialRecord, WordTiming};
use crate::schedule::builder::TrialPlan;
use crate::schedule::trial::{QuestionTrial, ReadingTrial, TrialUnit};

/// Measurements from reading one sentence
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceReading {
    /// Advance key times, relative to sentence onset, one per word
    pub advances: Vec<Millis>,
    pub total_reading_time: Millis,
}

/// Answer to a two-alternative question
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionResponse {
    /// 0-based chosen option
    pub choice: usize,
    pub rt: Millis,
}

/// Presentation layer for the experiment
pub trait Presenter {
    fn show_fixation(&mut self, duration: Duration) -> Result<()>;

    /// Block until the participant signals readiness
    fn wait_ready(&mut self, message: &str) -> Result<()>;

    /// Show the sentence word by word. There is no timeout.
    fn read_sentence(&mut self, trial: &ReadingTrial) -> Result<SentenceReading>;

    fn ask_question(&mut self, trial: &QuestionTrial) -> Result<QuestionResponse>;

    /// Practice only
    fn show_feedback(&mut self, trial: &QuestionTrial, correct: bool) -> Result<()>;

    /// Block instructions between phases
    fn show_message(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

pub const PRACTICE_INTRO: &str = "Practice: read each sentence word by word, then answer the question.";
pub const MAIN_INTRO: &str = "Practice complete. The main experiment will now begin.";
pub const COMPLETION_MESSAGE: &str = "Experiment complete. Thank you for participating!";

/// Runs trial units through a presenter
pub struct ExperimentRunner<P: Presenter> {
    presenter: P,
}

impl<P: Presenter> ExperimentRunner<P> {
    pub fn new(presenter: P) -> Self {
        Self { presenter }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Practice block, then main block
    pub fn run_plan(&mut self, plan: &TrialPlan) -> Result<Vec<TrialRecord>> {
        let mut records = Vec::new();
        if !plan.practice.is_empty() {
            self.presenter.show_message(PRACTICE_INTRO)?;
            records.extend(self.run_block(&plan.practice)?);
            self.presenter.show_message(MAIN_INTRO)?;
        }
        records.extend(self.run_block(&plan.main)?);
        self.presenter.show_message(COMPLETION_MESSAGE)?;
        Ok(records)
    }

    /// Present every unit in order
    pub fn run_block(&mut self, units: &[TrialUnit]) -> Result<Vec<TrialRecord>> {
        let mut records = Vec::new();
        for unit in units {
            match unit {
                TrialUnit::Fixation { duration_ms } => {
                    self.presenter.show_fixation(Duration::from_millis(*duration_ms))?;
                }
                TrialUnit::ReadyPrompt { message } => self.presenter.wait_ready(message)?,
                TrialUnit::ReadingTrial(trial) => {
                    let reading = self.presenter.read_sentence(trial)?;
                    let timings = WordTiming::from_advances(&trial.words, &reading.advances);
                    tracing::debug!(id = %trial.id, total = reading.total_reading_time, "Sentence read");
                    records.push(TrialRecord::Reading(ReadingRecord::new(
                        trial,
                        timings,
                        reading.total_reading_time,
                    )));
                }
                TrialUnit::QuestionTrial(trial) => {
                    let response = self.presenter.ask_question(trial)?;
                    let record = ComprehensionRecord::new(trial, response.choice, response.rt);
                    if trial.phase == Phase::Practice {
                        self.presenter.show_feedback(trial, record.correct)?;
                    }
                    records.push(TrialRecord::Comprehension(record));
                }
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::SessionSeed;
    use crate::schedule::builder::TrialSequenceBuilder;
    use crate::stimuli::builtin;

    fn plan() -> TrialPlan {
        TrialSequenceBuilder::default().build_plan(
            &builtin::default_experimental_items(),
            &builtin::default_filler_items(),
            &builtin::default_practice_items(),
            SessionSeed(2024),
        )
    }

    #[test]
    fn test_records_per_trial() {
        let mut runner = ExperimentRunner::new(ScriptedPresenter::new(100.0));
        let records = runner.run_plan(&plan()).unwrap();

        let readings = records.iter().filter(|r| r.as_reading().is_some()).count();
        let answers = records.iter().filter(|r| r.as_comprehension().is_some()).count();
        // 2 practice + 11 main sentences; 2 practice + 8 main questions
        assert_eq!(readings, 13);
        assert_eq!(answers, 10);
    }

    #[test]
    fn test_feedback_only_in_practice() {
        let mut runner = ExperimentRunner::new(ScriptedPresenter::new(100.0));
        runner.run_plan(&plan()).unwrap();
        let feedback = runner
            .presenter()
            .events()
            .iter()
            .filter(|e| matches!(e, PresenterEvent::Feedback { .. }))
            .count();
        assert_eq!(feedback, 2);
    }

    #[test]
    fn test_reading_times_from_presenter() {
        let mut runner = ExperimentRunner::new(ScriptedPresenter::new(250.0));
        let units = TrialSequenceBuilder::default().build_practice(&builtin::default_practice_items()[..1]);
        let records = runner.run_block(&units).unwrap();
        let reading = records[0].as_reading().unwrap();
        assert_eq!(reading.word_timings.len(), reading.word_count);
        assert!(reading.word_timings.iter().all(|t| t.reading_time == 250.0));
        assert_eq!(reading.total_reading_time, 250.0 * reading.word_count as f64);
    }

    #[test]
    fn test_scripted_wrong_answer_recorded() {
        let presenter = ScriptedPresenter::new(100.0).with_answers(vec![1]);
        let mut runner = ExperimentRunner::new(presenter);
        let units = TrialSequenceBuilder::default().build_practice(&builtin::default_practice_items()[..1]);
        let records = runner.run_block(&units).unwrap();
        let answer = records[1].as_comprehension().unwrap();
        assert_eq!(answer.response, 1);
        assert!(!answer.correct);
    }
}
