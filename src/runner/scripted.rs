//! Deterministic presenter for headless runs and tests

use std::collections::VecDeque;
use std::time::Duration;

use crate::core::error::Result;
use crate::core::types::{ItemId, Millis};
use crate::runner::{Presenter, QuestionResponse, SentenceReading};
use crate::schedule::trial::{QuestionTrial, ReadingTrial};

/// Something the presenter was asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Fixation(Duration),
    Ready,
    Sentence(ItemId),
    Question(String),
    Feedback { question: String, correct: bool },
    Message(String),
}

/// Reads every word in a fixed time and answers from a script
///
/// Once the scripted answers run out, every question is answered correctly.
#[derive(Debug, Clone)]
pub struct ScriptedPresenter {
    word_ms: Millis,
    answer_ms: Millis,
    answers: VecDeque<usize>,
    events: Vec<PresenterEvent>,
}

impl ScriptedPresenter {
    pub fn new(word_ms: Millis) -> Self {
        Self {
            word_ms,
            answer_ms: 500.0,
            answers: VecDeque::new(),
            events: Vec::new(),
        }
    }

    pub fn with_answers(mut self, answers: Vec<usize>) -> Self {
        self.answers = answers.into();
        self
    }

    pub fn events(&self) -> &[PresenterEvent] {
        &self.events
    }
}

impl Presenter for ScriptedPresenter {
    fn show_fixation(&mut self, duration: Duration) -> Result<()> {
        self.events.push(PresenterEvent::Fixation(duration));
        Ok(())
    }

    fn wait_ready(&mut self, _message: &str) -> Result<()> {
        self.events.push(PresenterEvent::Ready);
        Ok(())
    }

    fn read_sentence(&mut self, trial: &ReadingTrial) -> Result<SentenceReading> {
        self.events.push(PresenterEvent::Sentence(trial.id.clone()));
        let advances: Vec<Millis> = (1..=trial.words.len()).map(|n| n as f64 * self.word_ms).collect();
        let total_reading_time = advances.last().copied().unwrap_or(0.0);
        Ok(SentenceReading {
            advances,
            total_reading_time,
        })
    }

    fn ask_question(&mut self, trial: &QuestionTrial) -> Result<QuestionResponse> {
        self.events.push(PresenterEvent::Question(trial.id.clone()));
        let choice = self.answers.pop_front().unwrap_or(trial.correct_index);
        Ok(QuestionResponse {
            choice,
            rt: self.answer_ms,
        })
    }

    fn show_feedback(&mut self, trial: &QuestionTrial, correct: bool) -> Result<()> {
        self.events.push(PresenterEvent::Feedback {
            question: trial.id.clone(),
            correct,
        });
        Ok(())
    }

    fn show_message(&mut self, text: &str) -> Result<()> {
        self.events.push(PresenterEvent::Message(text.to_string()));
        Ok(())
    }
}
