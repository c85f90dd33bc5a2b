use std::collections::BTreeMap;

use crate::capability::{CapabilityTable, Service};
use crate::error::EngineError;
use crate::weights::WeightVector;

pub type ScoreMap = BTreeMap<Service, f64>;

pub fn evaluate_services(
    table: &CapabilityTable,
    weights: &WeightVector,
) -> Result<ScoreMap, EngineError> {
    let mut scores = ScoreMap::new();
    for (service, row) in table.iter() {
        let mut total = 0.0;
        for (factor, weight) in weights.iter() {
            let value = row
                .score(factor)
                .ok_or(EngineError::MissingFactor { service, factor })?;
            total += value * weight;
        }
        scores.insert(service, round2(total));
    }
    Ok(scores)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
