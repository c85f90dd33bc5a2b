use std::collections::BTreeMap;

use serde::Serialize;

use crate::capability::{CapabilityTable, Service};
use crate::error::EngineError;
use crate::ranking::rank_services;
use crate::scoring::ScoreMap;
use crate::weights::{Factor, WeightVector};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanations {
    pub why_best: String,
    pub why_not: BTreeMap<Service, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecommendationBundle {
    pub recommended: Service,
    pub alternative: Service,
    pub rejected: Service,
}

pub fn generate_explanations(
    best: Service,
    scores: &ScoreMap,
    weights: &WeightVector,
    table: &CapabilityTable,
) -> Result<Explanations, EngineError> {
    let mut ordered: Vec<(Factor, f64)> = weights.iter().collect();
    ordered.sort_by(|(_, a), (_, b)| b.total_cmp(a));
    let leading = ordered
        .iter()
        .take(2)
        .map(|(factor, _)| factor.as_str())
        .collect::<Vec<_>>()
        .join(" and ");
    let why_best = format!(
        "{best} aligns best with your priorities because {leading} had the strongest influence on the decision."
    );

    let mut why_not = BTreeMap::new();
    for service in scores.keys().copied() {
        if service == best {
            continue;
        }
        let row = table
            .row(service)
            .ok_or(EngineError::MissingService(service))?;
        let Some(weakest) = row.weakest_factor() else {
            continue;
        };
        why_not.insert(
            service,
            format!("Weaker performance in {weakest} compared to {best}."),
        );
    }

    Ok(Explanations { why_best, why_not })
}

#[must_use]
pub fn recommendation_bundle(scores: &ScoreMap) -> Option<RecommendationBundle> {
    let ranked = rank_services(scores);
    match ranked.as_slice() {
        [first, second, third, ..] => Some(RecommendationBundle {
            recommended: first.service,
            alternative: second.service,
            rejected: third.service,
        }),
        _ => None,
    }
}
