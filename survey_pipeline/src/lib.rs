mod config;
pub mod multipunch;
pub mod quick_start;
pub mod session;

use log::{debug, info};

use std::time::{Duration, SystemTime};

pub use crate::config::*;
use crate::session::SessionContext;

// **** Pipeline data shapes ****

/// A fixed-arity ordered row of the feature matrix, one slot per schema
/// feature.
pub type FeatureVector = Vec<i64>;

/// The normalized fields of one record, keyed by question identifier.
/// Only exists for records where every schema slot normalized.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizedFields {
    values: Vec<(String, i64)>,
}

impl NormalizedFields {
    pub fn value(&self, question: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|(q, _)| q == question)
            .map(|(_, v)| *v)
    }
}

/// The pre-trained satisfaction classifier.
///
/// Implementations are opaque and deterministic: one label per input row,
/// in input order. A column layout that disagrees with the model artifact
/// must surface as [PipelineErrors::ShapeMismatch], never be coerced.
pub trait SatisfactionModel {
    fn predict(&self, matrix: &[FeatureVector]) -> Result<Vec<PredictionLabel>, PipelineErrors>;
}

/// Everything a run of the prediction pipeline produces.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PipelineOutcome {
    /// Records that survived normalization, with their predicted labels.
    pub enriched: Vec<EnrichedRecord>,
    /// Records dropped because a field could not be normalized. They remain
    /// part of the raw table view, only the prediction path dropped them.
    pub excluded: usize,
}

// **** Stages ****

/// Maps the raw fields of a record to the numeric domain the classifier
/// expects. Returns `None` when any slot fails: the record is dropped, not
/// defaulted, so the classifier is never fed a fabricated category.
pub fn normalize_record(record: &SurveyRecord, schema: &FeatureSchema) -> Option<NormalizedFields> {
    let mut values: Vec<(String, i64)> = Vec::with_capacity(schema.len());
    for spec in schema.features.iter() {
        let raw = match record.answer(&spec.question) {
            Some(s) => s.trim(),
            None => {
                debug!(
                    "normalize_record: {:?} missing, dropping record",
                    spec.question
                );
                return None;
            }
        };
        let value = match &spec.kind {
            FeatureKind::Categorical(table) => {
                match table.iter().find(|(s, _)| s == raw) {
                    Some((_, v)) => *v,
                    None => {
                        debug!(
                            "normalize_record: {:?} value {:?} outside its enumeration, dropping record",
                            spec.question, raw
                        );
                        return None;
                    }
                }
            }
            FeatureKind::Integer => match raw.parse::<i64>() {
                Ok(v) => v,
                Err(_) => {
                    debug!(
                        "normalize_record: {:?} value {:?} is not an integer, dropping record",
                        spec.question, raw
                    );
                    return None;
                }
            },
        };
        values.push((spec.question.clone(), value));
    }
    Some(NormalizedFields { values })
}

/// Orders the normalized fields into the exact vector shape the classifier
/// was trained on. Pure and deterministic: the schema fixes the slot order
/// for every run.
///
/// Cannot fail on a record produced by [normalize_record] with the same
/// schema; a missing slot is an internal defect.
pub fn assemble_features(fields: &NormalizedFields, schema: &FeatureSchema) -> FeatureVector {
    schema
        .features
        .iter()
        .map(|spec| {
            fields.value(&spec.question).unwrap_or_else(|| {
                panic!(
                    "assemble_features: no normalized slot for {:?}",
                    spec.question
                )
            })
        })
        .collect()
}

/// Zips each surviving record with its label by positional index and derives
/// the human-readable indicator.
///
/// A length mismatch between records and labels is an internal consistency
/// defect, not a recoverable condition.
pub fn aggregate(records: Vec<SurveyRecord>, labels: &[PredictionLabel]) -> Vec<EnrichedRecord> {
    assert_eq!(
        records.len(),
        labels.len(),
        "aggregate: {} records zipped with {} labels",
        records.len(),
        labels.len()
    );
    records
        .into_iter()
        .zip(labels.iter())
        .map(|(record, label)| EnrichedRecord {
            record,
            label: *label,
            indicator: label.indicator().to_string(),
        })
        .collect()
}

/// Filters the enriched records down to predicted-satisfied customers with a
/// contactable address and renders one coupon message per target.
///
/// Delivery is someone else's job: this ends at producing the triples.
pub fn select_coupon_targets(
    enriched: &[EnrichedRecord],
    template: &CouponTemplate,
) -> Vec<CouponMessage> {
    let mut targets: Vec<CouponMessage> = Vec::new();
    for e in enriched.iter() {
        if e.label != PredictionLabel::Satisfied {
            continue;
        }
        let recipient = match &e.record.contact {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => continue,
        };
        targets.push(CouponMessage {
            subject: template.subject.clone(),
            body: template.render(&recipient),
            recipient,
        });
    }
    debug!(
        "select_coupon_targets: {} targets from {} enriched records",
        targets.len(),
        enriched.len()
    );
    targets
}

/// Runs the full prediction pipeline over a freshly loaded snapshot of the
/// response source: normalize, assemble, predict, aggregate.
///
/// The session context is checked before any stage executes; an expired
/// session aborts the run. Single-threaded and synchronous, no state is kept
/// across runs.
pub fn run_prediction_pipeline(
    session: &SessionContext,
    now: SystemTime,
    timeout: Duration,
    records: &[SurveyRecord],
    schema: &FeatureSchema,
    model: &dyn SatisfactionModel,
) -> Result<PipelineOutcome, PipelineErrors> {
    if session::is_expired(now, session.last_active, timeout) {
        return Err(PipelineErrors::SessionExpired);
    }
    if records.is_empty() {
        return Err(PipelineErrors::EmptySurvey);
    }
    info!(
        "run_prediction_pipeline: {} records, {} feature slots, session {:?}",
        records.len(),
        schema.len(),
        session.username
    );

    let mut kept: Vec<SurveyRecord> = Vec::with_capacity(records.len());
    let mut matrix: Vec<FeatureVector> = Vec::with_capacity(records.len());
    let mut excluded: usize = 0;
    for record in records.iter() {
        match normalize_record(record, schema) {
            Some(fields) => {
                matrix.push(assemble_features(&fields, schema));
                kept.push(record.clone());
            }
            None => {
                excluded += 1;
            }
        }
    }
    if excluded > 0 {
        info!(
            "run_prediction_pipeline: excluded {} of {} records during normalization",
            excluded,
            records.len()
        );
    }

    let labels = model.predict(&matrix)?;
    let enriched = aggregate(kept, &labels);
    info!(
        "run_prediction_pipeline: {} predictions, {} satisfied",
        enriched.len(),
        enriched
            .iter()
            .filter(|e| e.label == PredictionLabel::Satisfied)
            .count()
    );
    Ok(PipelineOutcome { enriched, excluded })
}
