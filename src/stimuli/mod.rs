//! Stimulus ingestion: delimited text -> raw records -> classified items

pub mod builtin;
pub mod classifier;
pub mod item;
pub mod parser;

pub use classifier::StimulusClassifier;
pub use item::{split_sentence, DelayedQuestion, Item, Question};
pub use parser::{ParsedTable, RawRecord, RecordParser};

use crate::core::types::Provenance;

/// Parse and classify one stimulus file
pub fn items_from_text(text: &str, delimiter: char, provenance: Provenance) -> Vec<Item> {
    let table = RecordParser::new(delimiter).parse(text);
    if table.dropped_rows > 0 {
        tracing::debug!(
            ?provenance,
            dropped = table.dropped_rows,
            "Skipped malformed stimulus rows"
        );
    }
    StimulusClassifier::new(provenance).classify_all(&table.records)
}
