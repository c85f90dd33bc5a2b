use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Traffic,
    Cost,
    Scalability,
    Ops,
    Control,
    Latency,
}

impl Factor {
    pub const ALL: [Self; 6] = [
        Self::Traffic,
        Self::Cost,
        Self::Scalability,
        Self::Ops,
        Self::Control,
        Self::Latency,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Cost => "cost",
            Self::Scalability => "scalability",
            Self::Ops => "ops",
            Self::Control => "control",
            Self::Latency => "latency",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    BurstyLowCost,
    SteadyHighTraffic,
}

impl Scenario {
    pub const ALL: [Self; 2] = [Self::BurstyLowCost, Self::SteadyHighTraffic];

    pub fn parse(id: &str) -> Result<Self, EngineError> {
        match id {
            "bursty_low_cost" => Ok(Self::BurstyLowCost),
            "steady_high_traffic" => Ok(Self::SteadyHighTraffic),
            other => Err(EngineError::InvalidScenario(other.to_string())),
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::BurstyLowCost => "bursty_low_cost",
            Self::SteadyHighTraffic => "steady_high_traffic",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::BurstyLowCost => "Bursty traffic, cost sensitive, beginner team",
            Self::SteadyHighTraffic => "Steady high traffic, performance focused",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(BTreeMap<Factor, f64>);

impl WeightVector {
    pub fn value(&self, factor: Factor) -> Option<f64> {
        self.0.get(&factor).copied()
    }

    pub fn set(&mut self, factor: Factor, value: f64) {
        self.0.insert(factor, value);
    }

    pub fn add(&mut self, factor: Factor, delta: f64) {
        *self.0.entry(factor).or_insert(0.0) += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        self.0.iter().map(|(&factor, &value)| (factor, value))
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Factor, f64)> for WeightVector {
    fn from_iter<I: IntoIterator<Item = (Factor, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub fn initial_weights(scenario: Scenario) -> WeightVector {
    let base = match scenario {
        Scenario::BurstyLowCost => [
            (Factor::Traffic, 0.30),
            (Factor::Cost, 0.25),
            (Factor::Scalability, 0.20),
            (Factor::Ops, 0.15),
            (Factor::Control, 0.05),
            (Factor::Latency, 0.05),
        ],
        Scenario::SteadyHighTraffic => [
            (Factor::Traffic, 0.20),
            (Factor::Cost, 0.15),
            (Factor::Scalability, 0.25),
            (Factor::Ops, 0.10),
            (Factor::Control, 0.20),
            (Factor::Latency, 0.10),
        ],
    };
    base.into_iter().collect()
}

pub fn normalize_weights(weights: &WeightVector) -> WeightVector {
    let clamped: WeightVector = weights
        .iter()
        .map(|(factor, value)| (factor, value.max(0.0)))
        .collect();

    let total = clamped.total();
    if total == 0.0 {
        return clamped;
    }

    clamped
        .iter()
        .map(|(factor, value)| (factor, round3(value / total)))
        .collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
