//! Sweep-job document schema
//!
//! Declarative description of a hyperparameter sweep, relayed verbatim to
//! the external job scheduler. The scheduler owns all semantics; nothing
//! here is validated beyond parsing.

use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A sweep-job document
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepJob {
    pub trial: Trial,
    #[serde(default)]
    pub inputs: IndexMap<String, JobInput>,
    pub compute: String,
    pub sampling_algorithm: SamplingAlgorithm,
    pub search_space: IndexMap<String, Distribution>,
    pub objective: Objective,
    #[serde(default)]
    pub limits: Limits,
}

impl SweepJob {
    /// Load a sweep-job document from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        let job: SweepJob = toml::from_str(&contents)?;
        Ok(job)
    }
}

/// Trial definition: code path, command template and environment
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Trial {
    pub code: String,
    pub command: String,
    pub environment: String,
}

/// A named data source
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobInput {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingAlgorithm {
    Random,
    Grid,
    Bayesian,
}

/// Per-parameter search distribution
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    Uniform { min_value: f64, max_value: f64 },
    Choice { values: Vec<ChoiceValue> },
}

/// Scalar value in a choice distribution
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Objective {
    pub goal: Goal,
    pub primary_metric: String,
}

/// Trial count and runtime limits
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_trials: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_trials: Option<u32>,
    /// Overall timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
compute = "gpu-cluster"
sampling_algorithm = "random"

[trial]
code = "./src"
command = "python train.py --lr ${{search_space.learning_rate}}"
environment = "training-env:12"

[inputs.training_data]
path = "data/cifar10"

[search_space.learning_rate]
type = "uniform"
min_value = 0.0001
max_value = 0.1

[search_space.batch_size]
type = "choice"
values = [16, 32, 64]

[objective]
goal = "maximize"
primary_metric = "accuracy"

[limits]
max_total_trials = 20
max_concurrent_trials = 4
timeout = 7200
"#;

    #[test]
    fn test_parse_sweep_job() {
        let job: SweepJob = toml::from_str(SAMPLE).unwrap();
        assert_eq!(job.compute, "gpu-cluster");
        assert_eq!(job.sampling_algorithm, SamplingAlgorithm::Random);
        assert_eq!(job.objective.goal, Goal::Maximize);
        assert_eq!(job.limits.max_total_trials, Some(20));

        assert_eq!(
            job.search_space.get("learning_rate"),
            Some(&Distribution::Uniform {
                min_value: 0.0001,
                max_value: 0.1
            })
        );
        match job.search_space.get("batch_size") {
            Some(Distribution::Choice { values }) => {
                assert_eq!(values.len(), 3);
                assert_eq!(values[0], ChoiceValue::Int(16));
            }
            other => panic!("unexpected distribution: {:?}", other),
        }
    }

    #[test]
    fn test_choice_values_mixed() {
        let toml_str = r#"
type = "choice"
values = ["sgd", "adam"]
"#;
        let dist: Distribution = toml::from_str(toml_str).unwrap();
        assert_eq!(
            dist,
            Distribution::Choice {
                values: vec![
                    ChoiceValue::String("sgd".to_string()),
                    ChoiceValue::String("adam".to_string()),
                ]
            }
        );
    }
}
