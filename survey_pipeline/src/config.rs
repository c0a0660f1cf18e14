// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One respondent's submission, as produced by a response source.
///
/// The answers are kept in the order of the source table. The contact field
/// is carried separately from the question answers: it identifies the
/// respondent and is never fed to the classifier.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyRecord {
    /// Email address of the respondent, when one was provided.
    pub contact: Option<String>,
    /// Ordered (question identifier, raw answer) pairs.
    pub answers: Vec<(String, String)>,
}

impl SurveyRecord {
    pub fn new(contact: Option<String>, answers: Vec<(String, String)>) -> SurveyRecord {
        SurveyRecord { contact, answers }
    }

    /// The raw answer for a question identifier, if the question was asked.
    pub fn answer(&self, question: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|(q, _)| q == question)
            .map(|(_, a)| a.as_str())
    }

    /// True when the contact field is present and non-blank.
    pub fn has_contact(&self) -> bool {
        matches!(&self.contact, Some(c) if !c.trim().is_empty())
    }
}

// ******** Feature schema *********

/// How one raw field is mapped to a numeric feature slot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FeatureKind {
    /// A finite enumeration table from raw answer to its numeric code.
    /// Answers outside the table exclude the whole record.
    Categorical(Vec<(String, i64)>),
    /// An already-ordinal field, coerced to an integer.
    Integer,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeatureSpec {
    pub question: String,
    pub kind: FeatureKind,
}

/// The fixed, ordered list of feature slots the classifier was trained on.
///
/// The order is load-bearing: it must match the layout of the model artifact
/// on every run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeatureSchema {
    pub features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The question identifiers, in feature-slot order.
    pub fn questions(&self) -> Vec<String> {
        self.features.iter().map(|f| f.question.clone()).collect()
    }

    /// The schema of the original retail satisfaction survey:
    /// visit frequency and spend bracket as enumerations, four
    /// integer-coded rating questions.
    pub fn retail_default() -> FeatureSchema {
        let categorical = |question: &str, table: &[(&str, i64)]| FeatureSpec {
            question: question.to_string(),
            kind: FeatureKind::Categorical(
                table.iter().map(|(s, v)| (s.to_string(), *v)).collect(),
            ),
        };
        let integer = |question: &str| FeatureSpec {
            question: question.to_string(),
            kind: FeatureKind::Integer,
        };
        FeatureSchema {
            features: vec![
                categorical(
                    "Q1",
                    &[
                        ("Once a week", 1),
                        ("2-3 times a week", 2),
                        ("Once a month", 3),
                        ("Rarely", 4),
                    ],
                ),
                categorical(
                    "Q3",
                    &[
                        ("₹100-₹500", 1),
                        ("₹500-₹1000", 2),
                        ("₹1000-₹2000", 3),
                        ("₹2000+", 4),
                    ],
                ),
                integer("Q4"),
                integer("Q8"),
                integer("Q9"),
                integer("Q10"),
            ],
        }
    }
}

// ******** Output data structures *********

/// The binary output of the satisfaction classifier.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum PredictionLabel {
    Satisfied,
    NotSatisfied,
}

impl PredictionLabel {
    /// The human-readable indicator. Exactly two renderings exist,
    /// one per label value.
    pub fn indicator(&self) -> &'static str {
        match self {
            PredictionLabel::Satisfied => "🟢 😊",
            PredictionLabel::NotSatisfied => "🔴 😞",
        }
    }

    /// The numeric code used in exports: 1 for satisfied, 0 otherwise.
    pub fn as_code(&self) -> i64 {
        match self {
            PredictionLabel::Satisfied => 1,
            PredictionLabel::NotSatisfied => 0,
        }
    }

    pub fn from_code(code: i64) -> PredictionLabel {
        if code == 1 {
            PredictionLabel::Satisfied
        } else {
            PredictionLabel::NotSatisfied
        }
    }
}

/// A survey record enriched with its predicted label.
///
/// Exists only for records that survived normalization, 1:1 with the source
/// record. The original fields are carried unmodified.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EnrichedRecord {
    pub record: SurveyRecord,
    pub label: PredictionLabel,
    pub indicator: String,
}

// ******** Notifications *********

/// The static coupon template. The recipient address is the only
/// per-customer variation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CouponTemplate {
    pub subject: String,
    pub body: String,
}

impl CouponTemplate {
    /// The template of the original dashboard, with its fixed coupon code.
    pub fn retail_default() -> CouponTemplate {
        CouponTemplate {
            subject: "Thank you for your positive feedback!".to_string(),
            body: "We are thrilled to inform you that our prediction model has \
                   identified you as a satisfied customer!\n\n\
                   Here is the coupon code for your next purchase: COUPON123\n\n\
                   Thank you for your positive feedback in the recent survey. \
                   We appreciate your satisfaction and hope to continue serving \
                   you well.\n\nBest regards,\nCustomer Service Team"
                .to_string(),
        }
    }

    /// The full message body for one recipient.
    pub fn render(&self, recipient: &str) -> String {
        format!("Dear {},\n\n{}", recipient, self.body)
    }
}

/// One coupon notification, ready for a transport. Derived each run,
/// never persisted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CouponMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

// ******** Errors *********

/// Errors that abort the prediction stage.
///
/// Per-record normalization failures are not errors: those records are
/// excluded and counted, and the pipeline proceeds with the rest.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PipelineErrors {
    /// No survey records were supplied at all.
    EmptySurvey,
    /// The feature matrix does not have the column layout the model
    /// artifact was trained on.
    ShapeMismatch { expected: usize, actual: usize },
    /// The session context handed to the pipeline has expired.
    SessionExpired,
}

impl Error for PipelineErrors {}

impl Display for PipelineErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineErrors::EmptySurvey => write!(f, "no survey records to process"),
            PipelineErrors::ShapeMismatch { expected, actual } => write!(
                f,
                "feature matrix has {} columns, the model expects {}",
                actual, expected
            ),
            PipelineErrors::SessionExpired => write!(f, "the session has expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_answer_lookup() {
        let r = SurveyRecord::new(
            Some("a@b.com".to_string()),
            vec![
                ("Q1".to_string(), "Once a week".to_string()),
                ("Q2".to_string(), "Price, Quality".to_string()),
            ],
        );
        assert_eq!(r.answer("Q1"), Some("Once a week"));
        assert_eq!(r.answer("Q9"), None);
        assert!(r.has_contact());
    }

    #[test]
    fn blank_contact_is_not_contactable() {
        let r = SurveyRecord::new(Some("   ".to_string()), vec![]);
        assert!(!r.has_contact());
        let r2 = SurveyRecord::new(None, vec![]);
        assert!(!r2.has_contact());
    }

    #[test]
    fn exactly_two_indicator_renderings() {
        assert_ne!(
            PredictionLabel::Satisfied.indicator(),
            PredictionLabel::NotSatisfied.indicator()
        );
        assert_eq!(
            PredictionLabel::from_code(PredictionLabel::Satisfied.as_code()),
            PredictionLabel::Satisfied
        );
        assert_eq!(
            PredictionLabel::from_code(PredictionLabel::NotSatisfied.as_code()),
            PredictionLabel::NotSatisfied
        );
    }

    #[test]
    fn retail_schema_order_is_fixed() {
        let schema = FeatureSchema::retail_default();
        assert_eq!(schema.questions(), ["Q1", "Q3", "Q4", "Q8", "Q9", "Q10"]);
    }
}
