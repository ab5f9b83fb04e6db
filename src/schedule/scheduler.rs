//! Delayed-question scheduling
//!
//! Replays items in source order and inserts each delayed question once its
//! target position is reached. After the sentence at index `i` has been
//! emitted, every question with `target_position == i + 1` becomes due. Due
//! questions surface in ascending origin id order, regardless of delay or
//! the order they were collected in.
//!
//! Questions whose target lies past the end of the items are never reached
//! inline; they are returned as `overdue` for the caller to append.

use std::collections::BTreeMap;

use crate::stimuli::item::{DelayedQuestion, Item};

/// One step of an inline schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledEntry {
    /// A sentence, carrying its immediate question if it has one
    Item(Item),
    Delayed(DelayedQuestion),
}

/// Result of inline scheduling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineSchedule {
    pub entries: Vec<ScheduledEntry>,
    /// Targets beyond the last item, in ascending origin id order
    pub overdue: Vec<DelayedQuestion>,
}

impl InlineSchedule {
    /// Entries followed by the overdue questions
    pub fn into_sequence(self) -> Vec<ScheduledEntry> {
        let mut entries = self.entries;
        entries.extend(self.overdue.into_iter().map(ScheduledEntry::Delayed));
        entries
    }
}

/// Pull every pending question out of `items`, targeted by source position
pub fn extract_delayed(items: &[Item]) -> Vec<DelayedQuestion> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            item.delayed_question().map(|pending| {
                let mut delayed = pending.clone();
                delayed.retarget(index);
                delayed
            })
        })
        .collect()
}

/// Sort by origin id, keeping collection order between equal ids
pub fn sort_by_origin(questions: &mut [DelayedQuestion]) {
    questions.sort_by(|a, b| a.origin_id.cmp(&b.origin_id));
}

/// Interleave items with their delayed questions
pub fn schedule_inline(items: &[Item]) -> InlineSchedule {
    let mut by_target: BTreeMap<usize, Vec<DelayedQuestion>> = BTreeMap::new();
    for delayed in extract_delayed(items) {
        by_target.entry(delayed.target_position).or_default().push(delayed);
    }

    let mut entries = Vec::with_capacity(items.len() + by_target.len());
    for (index, item) in items.iter().enumerate() {
        entries.push(ScheduledEntry::Item(item.clone()));

        if let Some(mut due) = by_target.remove(&(index + 1)) {
            sort_by_origin(&mut due);
            tracing::debug!(after = index, count = due.len(), "Inserting delayed questions");
            entries.extend(due.into_iter().map(ScheduledEntry::Delayed));
        }
    }

    let mut overdue: Vec<DelayedQuestion> = by_target.into_values().flatten().collect();
    sort_by_origin(&mut overdue);
    if !overdue.is_empty() {
        tracing::debug!(count = overdue.len(), "Delayed questions overrun the item list");
    }

    InlineSchedule { entries, overdue }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ItemId;
    use crate::stimuli::item::Question;

    fn sentence(id: i64) -> Item {
        Item::Sentence {
            id: ItemId::from(id),
            text: format!("Sentence {}", id),
            condition: "main".into(),
        }
    }

    fn delayed(id: i64, delay: usize) -> Item {
        Item::SentenceWithDelayedQuestion {
            id: ItemId::from(id),
            text: format!("Sentence {}", id),
            condition: "main".into(),
            pending_question: DelayedQuestion::new(
                ItemId::from(id),
                Question::new(format!("Question {}?", id), "A", "B"),
                delay,
                0,
            ),
        }
    }

    fn labels(schedule: &[ScheduledEntry]) -> Vec<String> {
        schedule
            .iter()
            .map(|e| match e {
                ScheduledEntry::Item(item) => format!("S{}", item.id()),
                ScheduledEntry::Delayed(q) => format!("Q{}", q.origin_id),
            })
            .collect()
    }

    #[test]
    fn test_no_delayed_questions_preserves_order() {
        let items = vec![sentence(1), sentence(2), sentence(3)];
        let schedule = schedule_inline(&items);
        assert_eq!(labels(&schedule.entries), vec!["S1", "S2", "S3"]);
        assert!(schedule.overdue.is_empty());
    }

    #[test]
    fn test_extract_retargets_by_position() {
        // classified at index 0, now sits at index 2
        let items = vec![sentence(1), sentence(2), delayed(3, 1)];
        let extracted = extract_delayed(&items);
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].target_position, 3);
    }

    #[test]
    fn test_delayed_inserted_after_target() {
        let items = vec![sentence(1), delayed(2, 2), sentence(3), sentence(4), sentence(5)];
        let schedule = schedule_inline(&items);
        // index 1 + delay 2 = target 3, due after the sentence at index 2
        assert_eq!(labels(&schedule.entries), vec!["S1", "S2", "S3", "Q2", "S4", "S5"]);
    }

    #[test]
    fn test_ties_ordered_by_origin_id() {
        // index 0 delay 2 and index 1 delay 1 both target 2
        let items = vec![delayed(5, 2), delayed(3, 1), sentence(9)];
        let schedule = schedule_inline(&items);
        assert_eq!(labels(&schedule.entries), vec!["S5", "S3", "Q3", "Q5", "S9"]);
    }

    #[test]
    fn test_target_at_end_is_inline() {
        let items = vec![delayed(1, 2), sentence(2)];
        let schedule = schedule_inline(&items);
        assert_eq!(labels(&schedule.entries), vec!["S1", "S2", "Q1"]);
        assert!(schedule.overdue.is_empty());
    }

    #[test]
    fn test_overrun_goes_to_overdue() {
        let items = vec![sentence(1), delayed(4, 5), delayed(2, 9)];
        let schedule = schedule_inline(&items);
        assert_eq!(labels(&schedule.entries), vec!["S1", "S4", "S2"]);
        let overdue: Vec<_> = schedule.overdue.iter().map(|q| q.origin_id.clone()).collect();
        assert_eq!(overdue, vec![ItemId::from(2), ItemId::from(4)]);

        let sequence = schedule.into_sequence();
        assert_eq!(labels(&sequence), vec!["S1", "S4", "S2", "Q2", "Q4"]);
    }
}
