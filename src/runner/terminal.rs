//! Interactive terminal presenter (crossterm)
//!
//! Words are shown one at a time, centred on an alternate screen. The
//! advance key reveals the next word; the two option keys answer questions.
//! Every other key is ignored, so a session only ends when the last trial
//! is done or the process is closed.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use crate::core::config::KeyBindings;
use crate::core::error::{Result, SprError};
use crate::core::types::Millis;
use crate::runner::{Presenter, QuestionResponse, SentenceReading};
use crate::schedule::trial::{QuestionTrial, ReadingTrial};

fn presentation_error(e: io::Error) -> SprError {
    SprError::Presentation(e.to_string())
}

fn elapsed_ms(since: Instant) -> Millis {
    since.elapsed().as_secs_f64() * 1000.0
}

/// What a key press means during a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Advance,
    Choose(usize),
    Ignored,
}

/// Map a key to its trial action under `keys`
fn key_action(code: KeyCode, keys: &KeyBindings) -> KeyAction {
    match code {
        KeyCode::Char(c) if c == keys.advance => KeyAction::Advance,
        KeyCode::Char(c) if c == keys.option_a => KeyAction::Choose(0),
        KeyCode::Char(c) if c == keys.option_b => KeyAction::Choose(1),
        _ => KeyAction::Ignored,
    }
}

pub struct TerminalPresenter {
    out: Stdout,
    keys: KeyBindings,
}

impl TerminalPresenter {
    /// Take over the terminal until the presenter is dropped
    pub fn new(keys: KeyBindings) -> Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode().map_err(presentation_error)?;
        execute!(out, EnterAlternateScreen, Hide).map_err(presentation_error)?;
        Ok(Self { out, keys })
    }

    /// Clear the screen and draw `lines` centred
    fn draw(&mut self, lines: &[String]) -> Result<()> {
        let (cols, rows) = terminal::size().map_err(presentation_error)?;
        let top = (rows / 2).saturating_sub(lines.len() as u16 / 2);

        queue!(self.out, Clear(ClearType::All)).map_err(presentation_error)?;
        for (offset, line) in lines.iter().enumerate() {
            let width = line.chars().count() as u16;
            let x = (cols / 2).saturating_sub(width / 2);
            queue!(self.out, MoveTo(x, top + offset as u16), Print(line)).map_err(presentation_error)?;
        }
        self.out.flush().map_err(presentation_error)
    }

    /// Next key press, ignoring releases and repeats
    fn next_key(&mut self) -> Result<KeyCode> {
        loop {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read().map_err(presentation_error)? {
                if kind != KeyEventKind::Press {
                    continue;
                }
                return Ok(code);
            }
        }
    }

    fn wait_for_advance(&mut self) -> Result<()> {
        loop {
            let code = self.next_key()?;
            if key_action(code, &self.keys) == KeyAction::Advance {
                return Ok(());
            }
        }
    }

    fn key_label(key: char) -> String {
        if key == ' ' {
            "space".into()
        } else {
            key.to_string()
        }
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Presenter for TerminalPresenter {
    fn show_fixation(&mut self, duration: Duration) -> Result<()> {
        self.draw(&["+".to_string()])?;
        std::thread::sleep(duration);
        Ok(())
    }

    fn wait_ready(&mut self, message: &str) -> Result<()> {
        self.draw(&[message.to_string()])?;
        self.next_key()?;
        Ok(())
    }

    fn read_sentence(&mut self, trial: &ReadingTrial) -> Result<SentenceReading> {
        let onset = Instant::now();
        let mut advances = Vec::with_capacity(trial.words.len());
        for word in &trial.words {
            self.draw(&[word.clone()])?;
            self.wait_for_advance()?;
            advances.push(elapsed_ms(onset));
        }
        Ok(SentenceReading {
            advances,
            total_reading_time: elapsed_ms(onset),
        })
    }

    fn ask_question(&mut self, trial: &QuestionTrial) -> Result<QuestionResponse> {
        let (a, b) = (self.keys.option_a, self.keys.option_b);
        self.draw(&[
            trial.question.clone(),
            String::new(),
            format!("[{}] {}        [{}] {}", a, trial.options[0], b, trial.options[1]),
        ])?;

        let onset = Instant::now();
        loop {
            let code = self.next_key()?;
            let choice = match key_action(code, &self.keys) {
                KeyAction::Choose(choice) => choice,
                _ => continue,
            };
            return Ok(QuestionResponse {
                choice,
                rt: elapsed_ms(onset),
            });
        }
    }

    fn show_feedback(&mut self, trial: &QuestionTrial, correct: bool) -> Result<()> {
        let verdict = if correct { "Correct!" } else { "Incorrect." };
        let answer = trial
            .options
            .get(trial.correct_index)
            .cloned()
            .unwrap_or_default();
        self.draw(&[
            verdict.to_string(),
            format!("The correct answer is: {}", answer),
            String::new(),
            format!("Press {} to continue", Self::key_label(self.keys.advance)),
        ])?;
        self.wait_for_advance()
    }

    fn show_message(&mut self, text: &str) -> Result<()> {
        self.draw(&[
            text.to_string(),
            String::new(),
            format!("Press {} to continue", Self::key_label(self.keys.advance)),
        ])?;
        self.wait_for_advance()
    }
}
