use proptest::prelude::*;
use rebuild_core::models::ProcessingOutcome;

/// Any casing of `word`, with optional surrounding whitespace
pub fn any_case_strategy(word: &'static str) -> impl Strategy<Value = String> {
    (
        prop::collection::vec(any::<bool>(), word.len()),
        "[ \t]{0,2}",
        "[ \t]{0,2}",
    )
        .prop_map(move |(upper, lead, trail)| {
            let cased: String = word
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect();
            format!("{lead}{cased}{trail}")
        })
}

/// File type names the classifier could plausibly return for managed content
pub fn managed_file_type_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{1,11}".prop_filter("reserved type names", |name| {
        !matches!(name.to_ascii_lowercase().as_str(), "error" | "unmanaged" | "unknown")
    })
}

pub fn outcome_strategy() -> impl Strategy<Value = ProcessingOutcome> {
    prop_oneof![
        Just(ProcessingOutcome::Unknown),
        Just(ProcessingOutcome::Rebuilt),
        Just(ProcessingOutcome::Failed),
        Just(ProcessingOutcome::Error),
        Just(ProcessingOutcome::Unmanaged),
    ]
}

/// Stored status text, including values no outcome parses from
pub fn file_status_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        outcome_strategy().prop_map(|outcome| outcome.to_string()),
        "[A-Za-z]{0,10}",
    ]
}
