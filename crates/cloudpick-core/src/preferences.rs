use serde::Serialize;

use crate::error::EngineError;
use crate::weights::{Factor, WeightVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostPriority {
    VeryImportant,
    Moderate,
    NotImportant,
}

impl CostPriority {
    pub fn from_code(code: u8) -> Result<Self, EngineError> {
        match code {
            1 => Ok(Self::VeryImportant),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::NotImportant),
            other => Err(EngineError::InvalidChoice {
                axis: "cost",
                code: other,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpsPreference {
    MinimalOps,
    Balanced,
    FullControl,
}

impl OpsPreference {
    pub fn from_code(code: u8) -> Result<Self, EngineError> {
        match code {
            1 => Ok(Self::MinimalOps),
            2 => Ok(Self::Balanced),
            3 => Ok(Self::FullControl),
            other => Err(EngineError::InvalidChoice {
                axis: "ops",
                code: other,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformancePriority {
    LatencyCritical,
    Balanced,
    ScalabilityCritical,
}

impl PerformancePriority {
    pub fn from_code(code: u8) -> Result<Self, EngineError> {
        match code {
            1 => Ok(Self::LatencyCritical),
            2 => Ok(Self::Balanced),
            3 => Ok(Self::ScalabilityCritical),
            other => Err(EngineError::InvalidChoice {
                axis: "performance",
                code: other,
            }),
        }
    }
}

pub fn apply_cost_preference(weights: &WeightVector, choice: CostPriority) -> WeightVector {
    let mut next = weights.clone();
    match choice {
        CostPriority::VeryImportant => {
            next.add(Factor::Cost, 0.10);
            next.add(Factor::Control, -0.05);
            next.add(Factor::Latency, -0.05);
        }
        CostPriority::Moderate => {
            next.add(Factor::Cost, 0.05);
            next.add(Factor::Control, -0.02);
        }
        CostPriority::NotImportant => {
            next.add(Factor::Cost, -0.10);
            next.add(Factor::Control, 0.05);
            next.add(Factor::Latency, 0.05);
        }
    }
    next
}

pub fn apply_ops_control_preference(weights: &WeightVector, choice: OpsPreference) -> WeightVector {
    let mut next = weights.clone();
    match choice {
        OpsPreference::MinimalOps => {
            next.add(Factor::Ops, 0.20);
            next.add(Factor::Control, -0.15);
        }
        OpsPreference::Balanced => {
            next.add(Factor::Ops, 0.05);
            next.add(Factor::Control, 0.05);
        }
        OpsPreference::FullControl => {
            next.add(Factor::Control, 0.25);
            next.add(Factor::Ops, -0.20);
        }
    }
    next
}

pub fn apply_latency_scalability_preference(
    weights: &WeightVector,
    choice: PerformancePriority,
) -> WeightVector {
    let mut next = weights.clone();
    match choice {
        PerformancePriority::LatencyCritical => {
            next.add(Factor::Latency, 0.25);
            next.add(Factor::Scalability, -0.20);
        }
        PerformancePriority::Balanced => {
            next.add(Factor::Latency, 0.05);
            next.add(Factor::Scalability, 0.05);
        }
        PerformancePriority::ScalabilityCritical => {
            next.add(Factor::Scalability, 0.25);
            next.add(Factor::Latency, -0.20);
        }
    }
    next
}
