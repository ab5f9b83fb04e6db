//! Final trial sequence construction
//!
//! Main block: stimuli and fillers are merged, shuffled with the session
//! seed, and every delayed question is deferred to the very end. Inline
//! positions would be meaningless after shuffling.
//!
//! Practice block: never shuffled, so delayed questions are placed inline
//! at their target positions.

use serde::{Deserialize, Serialize};

use crate::core::config::ExperimentConfig;
use crate::core::session::SessionSeed;
use crate::core::types::{Phase, Provenance};
use crate::schedule::scheduler::{extract_delayed, schedule_inline, sort_by_origin, ScheduledEntry};
use crate::schedule::shuffle::ShuffleStrategy;
use crate::schedule::trial::{QuestionTrial, ReadingTrial, TrialUnit};
use crate::stimuli::item::Item;

/// An item tagged with the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedItem {
    pub item: Item,
    pub provenance: Provenance,
}

/// Both blocks of one participant's experiment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPlan {
    pub practice: Vec<TrialUnit>,
    pub main: Vec<TrialUnit>,
}

/// Expands classified items into trial units
#[derive(Debug, Clone)]
pub struct TrialSequenceBuilder {
    fixation_duration_ms: u64,
    ready_message: String,
    shuffle: ShuffleStrategy,
}

impl Default for TrialSequenceBuilder {
    fn default() -> Self {
        Self::from_config(&ExperimentConfig::default())
    }
}

impl TrialSequenceBuilder {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            fixation_duration_ms: config.fixation_duration_ms,
            ready_message: config.ready_message.clone(),
            shuffle: config.shuffle,
        }
    }

    pub fn with_shuffle(mut self, shuffle: ShuffleStrategy) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Build the practice and main blocks
    pub fn build_plan(&self, main: &[Item], fillers: &[Item], practice: &[Item], seed: SessionSeed) -> TrialPlan {
        TrialPlan {
            practice: self.build_practice(practice),
            main: self.build_main(main, fillers, seed),
        }
    }

    /// Main block: shuffled sentences, then all delayed questions
    pub fn build_main(&self, main: &[Item], fillers: &[Item], seed: SessionSeed) -> Vec<TrialUnit> {
        let tagged: Vec<TaggedItem> = main
            .iter()
            .map(|item| TaggedItem {
                item: item.clone(),
                provenance: Provenance::Stimulus,
            })
            .chain(fillers.iter().map(|item| TaggedItem {
                item: item.clone(),
                provenance: Provenance::Filler,
            }))
            .collect();

        let shuffled = self.shuffle.shuffle(&tagged, seed);

        let mut deferred = extract_delayed(main);
        sort_by_origin(&mut deferred);
        let mut filler_deferred = extract_delayed(fillers);
        sort_by_origin(&mut filler_deferred);
        deferred.extend(filler_deferred);

        tracing::info!(
            stimuli = main.len(),
            fillers = fillers.len(),
            delayed = deferred.len(),
            seed = seed.value(),
            "Built main block"
        );

        let total = shuffled.len();
        let mut units = Vec::with_capacity(total * 4 + deferred.len());
        for (index, tagged) in shuffled.iter().enumerate() {
            self.push_sentence(&mut units, &tagged.item, tagged.provenance, Phase::Main, index + 1, total);
        }
        units.extend(
            deferred
                .iter()
                .map(|q| TrialUnit::QuestionTrial(QuestionTrial::delayed(q, Phase::Main))),
        );
        units
    }

    /// Practice block: source order, delayed questions inline
    pub fn build_practice(&self, practice: &[Item]) -> Vec<TrialUnit> {
        let total = practice.len();
        let mut sentence_number = 0;
        let mut units = Vec::with_capacity(total * 4);

        for entry in schedule_inline(practice).into_sequence() {
            match entry {
                ScheduledEntry::Item(item) => {
                    sentence_number += 1;
                    self.push_sentence(&mut units, &item, Provenance::Practice, Phase::Practice, sentence_number, total);
                }
                ScheduledEntry::Delayed(q) => {
                    units.push(TrialUnit::QuestionTrial(QuestionTrial::delayed(&q, Phase::Practice)));
                }
            }
        }
        units
    }

    /// Fixation, ready prompt, reading trial, and the immediate question if any
    fn push_sentence(
        &self,
        units: &mut Vec<TrialUnit>,
        item: &Item,
        provenance: Provenance,
        phase: Phase,
        sentence_number: usize,
        total_sentences: usize,
    ) {
        units.push(TrialUnit::Fixation {
            duration_ms: self.fixation_duration_ms,
        });
        units.push(TrialUnit::ReadyPrompt {
            message: self.ready_message.clone(),
        });
        units.push(TrialUnit::ReadingTrial(ReadingTrial::from_item(
            item,
            provenance,
            phase,
            sentence_number,
            total_sentences,
        )));
        if let Some(question) = item.immediate_question() {
            units.push(TrialUnit::QuestionTrial(QuestionTrial::immediate(item.id(), question, phase)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ItemId, QuestionKind};
    use crate::stimuli::builtin;
    use crate::stimuli::item::{DelayedQuestion, Question};

    fn delayed_item(id: i64, delay: usize) -> Item {
        Item::SentenceWithDelayedQuestion {
            id: ItemId::from(id),
            text: format!("Sentence number {}", id),
            condition: "main".into(),
            pending_question: DelayedQuestion::new(ItemId::from(id), Question::new("Q?", "A", "B"), delay, 0),
        }
    }

    #[test]
    fn test_sentence_expansion_shape() {
        let builder = TrialSequenceBuilder::default();
        let units = builder.build_practice(&builtin::default_practice_items()[..1]);
        assert_eq!(units.len(), 4);
        assert_eq!(units[0], TrialUnit::Fixation { duration_ms: 800 });
        assert!(matches!(units[1], TrialUnit::ReadyPrompt { .. }));
        let reading = units[2].as_reading().unwrap();
        assert_eq!(reading.sentence_number, 1);
        assert_eq!(reading.total_sentences, 1);
        assert_eq!(reading.phase, Phase::Practice);
        assert_eq!(units[3].as_question().unwrap().kind, QuestionKind::Immediate);
    }

    #[test]
    fn test_main_block_numbers_sentences() {
        let builder = TrialSequenceBuilder::default();
        let units = builder.build_main(
            &builtin::default_experimental_items(),
            &builtin::default_filler_items(),
            SessionSeed(1234),
        );
        let numbers: Vec<usize> = units.iter().filter_map(|u| u.as_reading()).map(|r| r.sentence_number).collect();
        assert_eq!(numbers, (1..=11).collect::<Vec<_>>());
        assert!(units
            .iter()
            .filter_map(|u| u.as_reading())
            .all(|r| r.total_sentences == 11));
    }

    #[test]
    fn test_chacha_shuffle_builds_full_main_block() {
        let main = builtin::default_experimental_items();
        let fillers = builtin::default_filler_items();
        let chacha = TrialSequenceBuilder::default().with_shuffle(ShuffleStrategy::ChaCha);
        let lcg = TrialSequenceBuilder::default();

        let units = chacha.build_main(&main, &fillers, SessionSeed(1234));
        assert_eq!(units, chacha.build_main(&main, &fillers, SessionSeed(1234)));

        let ids = |units: &[TrialUnit]| -> Vec<ItemId> {
            let mut ids: Vec<ItemId> = units.iter().filter_map(|u| u.as_reading()).map(|r| r.id.clone()).collect();
            ids.sort();
            ids
        };
        let lcg_units = lcg.build_main(&main, &fillers, SessionSeed(1234));
        assert_eq!(ids(&units), ids(&lcg_units));
        assert_eq!(
            units.iter().filter(|u| u.as_question().is_some()).count(),
            lcg_units.iter().filter(|u| u.as_question().is_some()).count()
        );
    }

    #[test]
    fn test_main_block_tags_provenance() {
        let builder = TrialSequenceBuilder::default();
        let units = builder.build_main(
            &builtin::default_experimental_items(),
            &builtin::default_filler_items(),
            SessionSeed(99),
        );
        let fillers = units
            .iter()
            .filter_map(|u| u.as_reading())
            .filter(|r| r.provenance == Provenance::Filler)
            .count();
        assert_eq!(fillers, 3);
    }

    #[test]
    fn test_main_block_defers_delayed_questions_to_end() {
        let builder = TrialSequenceBuilder::default();
        let main = vec![delayed_item(9, 1), delayed_item(2, 1), delayed_item(5, 7)];
        let units = builder.build_main(&main, &builtin::default_filler_items(), SessionSeed(3105));

        let tail: Vec<&QuestionTrial> = units[units.len() - 3..]
            .iter()
            .map(|u| u.as_question().expect("question at tail"))
            .collect();
        let origins: Vec<ItemId> = tail.iter().map(|q| q.origin_id.clone()).collect();
        assert_eq!(origins, vec![ItemId::from(2), ItemId::from(5), ItemId::from(9)]);
        assert!(tail.iter().all(|q| q.kind == QuestionKind::Delayed));
        assert_eq!(tail[0].id, "delayed_q_2");

        // nothing but reading-related units before the tail
        assert!(units[..units.len() - 3].iter().all(|u| u.as_question().is_none()));
    }

    #[test]
    fn test_practice_overdue_appended() {
        let builder = TrialSequenceBuilder::default();
        let units = builder.build_practice(&[delayed_item(1, 4), delayed_item(2, 1)]);
        let steps: Vec<String> = units
            .iter()
            .filter_map(|u| match u {
                TrialUnit::ReadingTrial(r) => Some(format!("S{}", r.id)),
                TrialUnit::QuestionTrial(q) => Some(format!("Q{}", q.origin_id)),
                _ => None,
            })
            .collect();
        assert_eq!(steps, vec!["S1", "S2", "Q2", "Q1"]);
    }

    #[test]
    fn test_same_seed_same_plan() {
        let builder = TrialSequenceBuilder::default();
        let main = builtin::default_experimental_items();
        let fillers = builtin::default_filler_items();
        let practice = builtin::default_practice_items();
        assert_eq!(
            builder.build_plan(&main, &fillers, &practice, SessionSeed(17)),
            builder.build_plan(&main, &fillers, &practice, SessionSeed(17))
        );
    }
}
