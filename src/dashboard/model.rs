// The pre-trained satisfaction model artifact.
//
// The original dashboard loads an opaque pickled classifier; the Rust
// counterpart is a JSON scorecard: ordered feature names, one weight per
// feature, a bias and a decision threshold. Deterministic by construction,
// and the artifact stays an opaque function as far as the pipeline is
// concerned.

use std::fs;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use survey_pipeline::{FeatureVector, PipelineErrors, PredictionLabel, SatisfactionModel};

use crate::dashboard::{DashResult, OpeningJsonSnafu, ParsingJsonSnafu};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardModel {
    /// Question identifiers in training order. Must match the feature
    /// schema exactly.
    #[serde(rename = "featureNames")]
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub threshold: f64,
}

impl ScorecardModel {
    /// The shipped model for the retail satisfaction survey. Lower visit
    /// frequency codes mean more frequent visits, hence the negative weight.
    pub fn retail_default() -> ScorecardModel {
        ScorecardModel {
            feature_names: ["Q1", "Q3", "Q4", "Q8", "Q9", "Q10"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            weights: vec![-0.45, 0.20, 0.35, 0.40, 0.30, 0.25],
            bias: -2.2,
            threshold: 0.0,
        }
    }

    fn decision_function(&self, row: &[i64]) -> f64 {
        self.weights
            .iter()
            .zip(row.iter())
            .map(|(w, v)| w * (*v as f64))
            .sum::<f64>()
            + self.bias
    }
}

impl SatisfactionModel for ScorecardModel {
    fn predict(&self, matrix: &[FeatureVector]) -> Result<Vec<PredictionLabel>, PipelineErrors> {
        let mut labels: Vec<PredictionLabel> = Vec::with_capacity(matrix.len());
        for row in matrix.iter() {
            if row.len() != self.weights.len() {
                return Err(PipelineErrors::ShapeMismatch {
                    expected: self.weights.len(),
                    actual: row.len(),
                });
            }
            let score = self.decision_function(row);
            labels.push(if score >= self.threshold {
                PredictionLabel::Satisfied
            } else {
                PredictionLabel::NotSatisfied
            });
        }
        Ok(labels)
    }
}

/// Loads the artifact once per run.
pub fn load_model(path: &str) -> DashResult<ScorecardModel> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let model: ScorecardModel =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    if model.weights.len() != model.feature_names.len() {
        whatever!(
            "model artifact {:?} is inconsistent: {} features for {} weights",
            path,
            model.feature_names.len(),
            model.weights.len()
        );
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn known_good_vector_is_satisfied() {
        let model = ScorecardModel::retail_default();
        let labels = model.predict(&[vec![1, 2, 4, 3, 5, 2]]).unwrap();
        assert_eq!(labels, vec![PredictionLabel::Satisfied]);
    }

    #[test]
    fn low_ratings_are_not_satisfied() {
        let model = ScorecardModel::retail_default();
        let labels = model.predict(&[vec![4, 1, 1, 1, 1, 1]]).unwrap();
        assert_eq!(labels, vec![PredictionLabel::NotSatisfied]);
    }

    #[test]
    fn prediction_is_deterministic_and_ordered() {
        let model = ScorecardModel::retail_default();
        let matrix = vec![vec![1, 2, 4, 3, 5, 2], vec![4, 1, 1, 1, 1, 1]];
        let first = model.predict(&matrix).unwrap();
        let second = model.predict(&matrix).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), matrix.len());
    }

    #[test]
    fn wrong_column_count_is_a_shape_mismatch() {
        let model = ScorecardModel::retail_default();
        let res = model.predict(&[vec![1, 2, 4]]);
        assert_eq!(
            res,
            Err(PipelineErrors::ShapeMismatch {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn artifact_round_trips_through_json() {
        let model = ScorecardModel::retail_default();
        let path = std::env::temp_dir().join("satdash_model_artifact.json");
        fs::write(&path, serde_json::to_string_pretty(&model).unwrap()).unwrap();
        let loaded = load_model(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn inconsistent_artifact_is_rejected() {
        let path = std::env::temp_dir().join("satdash_model_bad.json");
        fs::write(
            &path,
            r#"{"featureNames": ["Q1", "Q3"], "weights": [0.5], "bias": 0.0, "threshold": 0.0}"#,
        )
        .unwrap();
        assert!(load_model(path.to_str().unwrap()).is_err());
    }
}
