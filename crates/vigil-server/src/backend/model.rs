//! Linear multi-class classifier loaded from a JSON parameter file.
//!
//! Scores are `w_c · x + b_c` per class and the arg-max class wins, which is
//! what a fitted logistic regression predicts.

use std::fs;

use serde::Deserialize;
use vigil_core::error::{Result, VigilError};

use super::{Classifier, ModelInfo, FEATURE_COUNT};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub accuracy: String,
    pub classes: Vec<i64>,
    pub coefficients: Vec<[f64; FEATURE_COUNT]>,
    pub intercepts: Vec<f64>,
}

fn default_name() -> String {
    "Logistic Regression".into()
}

impl LinearModel {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)
            .map_err(|e| VigilError::Internal(format!("read model failed ({path}): {e}")))?;
        Self::from_json(&s)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let model: LinearModel = serde_json::from_str(s)
            .map_err(|e| VigilError::BadRequest(format!("invalid model file: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let n = self.classes.len();
        if n == 0 {
            return Err(VigilError::BadRequest("model must declare at least one class".into()));
        }
        if self.coefficients.len() != n || self.intercepts.len() != n {
            return Err(VigilError::BadRequest(format!(
                "model has {n} classes but {} coefficient rows and {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        let finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !finite {
            return Err(VigilError::BadRequest("model parameters must be finite".into()));
        }
        Ok(())
    }
}

impl Classifier for LinearModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<i64> {
        if features.iter().any(|v| !v.is_finite()) {
            return Err(VigilError::Backend("features must be finite numbers".into()));
        }
        let best = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| w.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .enumerate()
            .filter(|(_, score)| score.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
            .ok_or_else(|| VigilError::Backend("model produced no finite score".into()))?;
        Ok(self.classes[best])
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            model: self.name.clone(),
            dataset: self.dataset.clone(),
            accuracy: self.accuracy.clone(),
            features: FEATURE_COUNT,
            classes: self.classes.clone(),
        }
    }
}
