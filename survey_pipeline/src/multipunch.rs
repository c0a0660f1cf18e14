// Descriptive path for multi-punch questions.
//
// Multi-punch answers (comma-separated selections in one cell) are never fed
// to the classifier. This module turns them into frequency counts for the
// dashboard's descriptive tables.

use std::collections::HashMap;

use log::debug;

use crate::SurveyRecord;

/// Frequency count per distinct trimmed token over a set of raw answers.
///
/// Splits each value on commas, trims whitespace, drops empty tokens and
/// counts duplicates as repeated occurrences. The result is ordered by
/// descending count, ties broken by token, so the display is stable.
pub fn token_counts<'a, I>(values: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for value in values {
        for token in value.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }
    let mut res: Vec<(String, u64)> = counts.into_iter().collect();
    res.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    res
}

/// Token counts for one question across all records.
pub fn question_token_counts(records: &[SurveyRecord], question: &str) -> Vec<(String, u64)> {
    token_counts(records.iter().filter_map(|r| r.answer(question)))
}

/// The question identifiers with at least one comma-joined answer, in table
/// order. These are the candidates for the descriptive visualization.
pub fn multi_select_questions(records: &[SurveyRecord]) -> Vec<String> {
    let mut questions: Vec<String> = Vec::new();
    for record in records.iter() {
        for (q, answer) in record.answers.iter() {
            if answer.contains(',') && !questions.iter().any(|x| x == q) {
                questions.push(q.clone());
            }
        }
    }
    debug!(
        "multi_select_questions: detected {:?} over {} records",
        questions,
        records.len()
    );
    questions
}
