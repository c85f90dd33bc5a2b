use serde::Serialize;

use crate::capability::{CapabilityTable, Service};
use crate::error::EngineError;
use crate::explain::{generate_explanations, recommendation_bundle, Explanations, RecommendationBundle};
use crate::preferences::{
    apply_cost_preference, apply_latency_scalability_preference, apply_ops_control_preference,
    CostPriority, OpsPreference, PerformancePriority,
};
use crate::ranking::{decision_confidence, rank_services, Confidence, ServiceScore};
use crate::scoring::{evaluate_services, ScoreMap};
use crate::weights::{initial_weights, normalize_weights, Scenario, WeightVector};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightStages {
    pub initial: WeightVector,
    pub adjusted: WeightVector,
    pub normalized: WeightVector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub scenario: Scenario,
    pub cost: CostPriority,
    pub ops: OpsPreference,
    pub performance: PerformancePriority,
    pub weights: WeightStages,
    pub scores: ScoreMap,
    pub ranked: Vec<ServiceScore>,
    pub best: Service,
    pub confidence: Confidence,
    pub explanations: Explanations,
    pub bundle: RecommendationBundle,
}

#[must_use]
pub fn weight_stages(
    scenario: Scenario,
    cost: CostPriority,
    ops: OpsPreference,
    performance: PerformancePriority,
) -> WeightStages {
    let initial = initial_weights(scenario);
    let after_cost = apply_cost_preference(&initial, cost);
    let after_ops = apply_ops_control_preference(&after_cost, ops);
    let adjusted = apply_latency_scalability_preference(&after_ops, performance);
    let normalized = normalize_weights(&adjusted);
    WeightStages {
        initial,
        adjusted,
        normalized,
    }
}

pub fn evaluate(
    table: &CapabilityTable,
    scenario: Scenario,
    cost: CostPriority,
    ops: OpsPreference,
    performance: PerformancePriority,
) -> Result<Evaluation, EngineError> {
    let weights = weight_stages(scenario, cost, ops, performance);
    let scores = evaluate_services(table, &weights.normalized)?;
    let ranked = rank_services(&scores);
    let bundle = recommendation_bundle(&scores).ok_or_else(|| first_missing_service(table))?;
    let best = bundle.recommended;
    let confidence = decision_confidence(&scores);
    let explanations = generate_explanations(best, &scores, &weights.normalized, table)?;
    Ok(Evaluation {
        scenario,
        cost,
        ops,
        performance,
        weights,
        scores,
        ranked,
        best,
        confidence,
        explanations,
        bundle,
    })
}

fn first_missing_service(table: &CapabilityTable) -> EngineError {
    let service = Service::ALL
        .into_iter()
        .find(|service| table.row(*service).is_none())
        .unwrap_or(Service::Lambda);
    EngineError::MissingService(service)
}
