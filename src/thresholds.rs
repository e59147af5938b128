use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdSet {
    #[serde(flatten)]
    maxima: HashMap<String, Value>,
}

impl ThresholdSet {
    pub fn max_temperature(&self, key: &str) -> Option<i64> {
        match self.maxima.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_maxima(maxima: HashMap<String, Value>) -> Self {
        Self { maxima }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    models: HashMap<String, ThresholdSet>,
}

impl ThresholdStore {
    /// Best effort: a missing path, unreadable file, or undecodable YAML
    /// yields an empty store, never an error.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path,
            None => {
                warn!("no controller thresholds file configured");
                return Self::default();
            }
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read thresholds file");
                return Self::default();
            }
        };
        match serde_yaml::from_str(&text) {
            Ok(models) => Self { models },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse thresholds file");
                Self::default()
            }
        }
    }

    pub fn for_model(&self, model: &str) -> ThresholdSet {
        if self.models.is_empty() {
            return ThresholdSet::default();
        }
        match self.models.get(model) {
            Some(set) => set.clone(),
            None => {
                warn!(model, "no thresholds entry for controller model");
                ThresholdSet::default()
            }
        }
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../thresholds.yaml.example")
    }
}
