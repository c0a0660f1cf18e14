use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use survey_pipeline::{CouponTemplate, FeatureKind, FeatureSchema, FeatureSpec};

use crate::dashboard::{DashResult, OpeningJsonSnafu, ParsingJsonSnafu};

/// Where and how the survey table is read.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// csv or xlsx.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(rename = "filePath", default)]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName", default)]
    pub excel_worksheet_name: Option<String>,
    /// A non-semantic index column dropped at ingestion, found by name.
    #[serde(rename = "indexColumn", default = "default_index_column")]
    pub index_column: Option<String>,
    /// The column identifying the respondent. Required in the header.
    #[serde(rename = "contactColumn", default = "default_contact_column")]
    pub contact_column: String,
}

impl Default for SourceSettings {
    fn default() -> SourceSettings {
        SourceSettings {
            provider: default_provider(),
            file_path: None,
            excel_worksheet_name: None,
            index_column: default_index_column(),
            contact_column: default_contact_column(),
        }
    }
}

/// One feature slot of the classifier, in training order. A value map makes
/// the field categorical; without one the raw value is coerced to an integer.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSetting {
    pub question: String,
    #[serde(rename = "valueMap", default)]
    pub value_map: Option<HashMap<String, i64>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_body")]
    pub body: String,
}

impl Default for NotificationSettings {
    fn default() -> NotificationSettings {
        NotificationSettings {
            subject: default_subject(),
            body: default_body(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub source: SourceSettings,
    /// Feature slots in training order. Empty means the built-in retail
    /// survey schema.
    #[serde(default)]
    pub features: Vec<FeatureSetting>,
    /// Path to the pre-trained model artifact. Empty means the built-in
    /// retail model.
    #[serde(rename = "modelFile", default)]
    pub model_file: Option<String>,
    /// Human-readable labels for presentation only, never for processing.
    #[serde(rename = "questionLabels", default = "default_question_labels")]
    pub question_labels: HashMap<String, String>,
    #[serde(default)]
    pub notification: NotificationSettings,
    #[serde(rename = "sessionTimeoutSecs", default = "default_session_timeout")]
    pub session_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> DashboardConfig {
        DashboardConfig {
            source: SourceSettings::default(),
            features: Vec::new(),
            model_file: None,
            question_labels: default_question_labels(),
            notification: NotificationSettings::default(),
            session_timeout_secs: default_session_timeout(),
        }
    }
}

impl DashboardConfig {
    /// The feature schema in the declared order. The declaration order is
    /// the training order of the model artifact, so it matters.
    pub fn feature_schema(&self) -> FeatureSchema {
        if self.features.is_empty() {
            return FeatureSchema::retail_default();
        }
        FeatureSchema {
            features: self
                .features
                .iter()
                .map(|f| FeatureSpec {
                    question: f.question.clone(),
                    kind: match &f.value_map {
                        Some(m) => {
                            let mut entries: Vec<(String, i64)> =
                                m.iter().map(|(k, v)| (k.clone(), *v)).collect();
                            entries.sort();
                            FeatureKind::Categorical(entries)
                        }
                        None => FeatureKind::Integer,
                    },
                })
                .collect(),
        }
    }

    pub fn coupon_template(&self) -> CouponTemplate {
        CouponTemplate {
            subject: self.notification.subject.clone(),
            body: self.notification.body.clone(),
        }
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn question_label<'a>(&'a self, question: &'a str) -> &'a str {
        self.question_labels
            .get(question)
            .map(|s| s.as_str())
            .unwrap_or(question)
    }
}

pub fn read_dashboard_config(path: &str) -> DashResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

fn default_provider() -> String {
    "csv".to_string()
}

fn default_index_column() -> Option<String> {
    Some("Timestamp".to_string())
}

fn default_contact_column() -> String {
    "Email Address".to_string()
}

fn default_session_timeout() -> u64 {
    1800
}

fn default_subject() -> String {
    CouponTemplate::retail_default().subject
}

fn default_body() -> String {
    CouponTemplate::retail_default().body
}

fn default_question_labels() -> HashMap<String, String> {
    [
        ("Q2", "Factors influencing customers decision to shop"),
        ("Q5", "What would make customers more likely to shop"),
        ("Q6", "Preferred payment methods"),
        ("Q7", "Promotional activities customers find appealing"),
    ]
    .iter()
    .map(|(q, label)| (q.to_string(), label.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_pipeline::FeatureKind;

    #[test]
    fn empty_config_gets_all_defaults() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.source.contact_column, "Email Address");
        assert_eq!(config.session_timeout_secs, 1800);
        assert_eq!(
            config.feature_schema().questions(),
            ["Q1", "Q3", "Q4", "Q8", "Q9", "Q10"]
        );
        assert!(config.coupon_template().body.contains("COUPON123"));
    }

    #[test]
    fn declared_features_keep_their_order() {
        let raw = r#"{
            "source": {"contactColumn": "Email"},
            "features": [
                {"question": "F2", "valueMap": {"low": 1, "high": 2}},
                {"question": "F1"}
            ],
            "sessionTimeoutSecs": 60
        }"#;
        let config: DashboardConfig = serde_json::from_str(raw).unwrap();
        let schema = config.feature_schema();
        assert_eq!(schema.questions(), ["F2", "F1"]);
        match &schema.features[0].kind {
            FeatureKind::Categorical(table) => assert_eq!(table.len(), 2),
            other => panic!("expected a categorical slot, got {:?}", other),
        }
        assert_eq!(schema.features[1].kind, FeatureKind::Integer);
        assert_eq!(config.session_timeout().as_secs(), 60);
    }

    #[test]
    fn question_label_falls_back_to_the_identifier() {
        let config = DashboardConfig::default();
        assert_eq!(config.question_label("Q6"), "Preferred payment methods");
        assert_eq!(config.question_label("Q99"), "Q99");
    }
}
