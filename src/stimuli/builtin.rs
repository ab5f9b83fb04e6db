//! Built-in stimuli
//!
//! Used when a stimulus file cannot be loaded, and as sample data.

use crate::core::types::ItemId;
use crate::stimuli::item::{Item, Question};

fn with_question(id: ItemId, text: &str, condition: &str, question: Question) -> Item {
    Item::SentenceWithImmediateQuestion {
        id,
        text: text.into(),
        condition: condition.into(),
        question,
    }
}

/// Practice items shown when the practice file fails to load
pub fn default_practice_items() -> Vec<Item> {
    vec![
        with_question(
            ItemId::from("practice1"),
            "The quick brown fox jumps over the lazy dog.",
            "practice",
            Question::new("Did the fox jump over the dog?", "Yes", "No"),
        ),
        with_question(
            ItemId::from("practice2"),
            "The girl that the boy likes sits in the front row.",
            "practice",
            Question::new("Did the girl sit in the front row?", "Yes", "No"),
        ),
    ]
}

/// Experimental stimuli used when the main stimulus file fails to load
pub fn default_experimental_items() -> Vec<Item> {
    let rows: [(i64, &str, &str, &str, &str, usize, &str); 8] = [
        (1, "The cat that the dog chased ran quickly across the busy street yesterday.",
            "What animal was being chased?", "Cat", "Dog", 0, "complex"),
        (2, "The student read the book carefully before the important exam next week.",
            "When is the exam?", "Yesterday", "Next week", 1, "simple"),
        (3, "The teacher who helped the students with their homework stayed late at school.",
            "Who stayed late at school?", "Students", "Teacher", 1, "complex"),
        (4, "The bird flew over the tall mountain during the beautiful sunset.",
            "What flew over the mountain?", "Bird", "Airplane", 0, "simple"),
        (5, "The doctor that the nurse called arrived immediately to treat the patient.",
            "Who called the doctor?", "Patient", "Nurse", 1, "complex"),
        (6, "The children played happily in the park all afternoon long.",
            "Where did the children play?", "School", "Park", 1, "simple"),
        (7, "The scientist who discovered the new species published the findings in a journal.",
            "What did the scientist discover?", "New species", "New journal", 0, "complex"),
        (8, "The baker made fresh bread early in the morning for customers.",
            "When did the baker make bread?", "Evening", "Morning", 1, "simple"),
    ];

    rows.into_iter()
        .map(|(id, text, question, a, b, correct, condition)| {
            with_question(
                ItemId::from(id),
                text,
                condition,
                Question::new(question, a, b).with_correct_index(correct),
            )
        })
        .collect()
}

/// Filler sentences that accompany the built-in experimental stimuli
pub fn default_filler_items() -> Vec<Item> {
    [
        ("filler1", "The weather today is absolutely beautiful and perfect for outdoor activities."),
        ("filler2", "Technology continues to advance rapidly in our modern digital world."),
        ("filler3", "Music has the power to bring people together across different cultures."),
    ]
    .into_iter()
    .map(|(id, text)| Item::Sentence {
        id: ItemId::from(id),
        text: text.into(),
        condition: "filler".into(),
    })
    .collect()
}

/// Five-row sample file: one immediate question (row 1), one question
/// delayed by two sentences (row 3) and another immediate question (row 5)
pub fn sample_stimuli_csv() -> &'static str {
    concat!(
        "item_id,sentence,with_question,question,answer1,answer2,question_delay\n",
        "1,\"The cat sat on the mat\",true,\"What sat on the mat?\",\"Cat\",\"Dog\",0\n",
        "2,\"The dog ran in the park\",false,\"\",\"\",\"\",0\n",
        "3,\"The bird flew over the house\",true,\"What flew over the house?\",\"Bird\",\"Plane\",2\n",
        "4,\"The sun was shining brightly\",false,\"\",\"\",\"\",0\n",
        "5,\"The children played outside\",true,\"Where did the children play?\",\"Inside\",\"Outside\",0\n",
    )
}
