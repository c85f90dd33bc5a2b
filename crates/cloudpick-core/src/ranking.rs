use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::Service;
use crate::scoring::{round2, ScoreMap};

pub const CLOSE_GAP: f64 = 0.5;
pub const CLEAR_GAP: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceScore {
    pub service: Service,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    #[serde(rename = "Low (Close trade-off)")]
    Low,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low (Close trade-off)",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[must_use]
pub fn rank_services(scores: &ScoreMap) -> Vec<ServiceScore> {
    let mut ranked: Vec<ServiceScore> = scores
        .iter()
        .map(|(service, score)| ServiceScore {
            service: *service,
            score: *score,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.service.cmp(&b.service))
    });
    ranked
}

#[must_use]
pub fn best_service(scores: &ScoreMap) -> Option<Service> {
    rank_services(scores).first().map(|entry| entry.service)
}

#[must_use]
pub fn decision_confidence(scores: &ScoreMap) -> Confidence {
    let ranked = rank_services(scores);
    match ranked.as_slice() {
        [] | [_] => Confidence::High,
        [top, second, ..] => {
            let gap = round2(top.score - second.score);
            if gap < CLOSE_GAP {
                Confidence::Low
            } else if gap < CLEAR_GAP {
                Confidence::Medium
            } else {
                Confidence::High
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores_of(entries: &[(Service, f64)]) -> ScoreMap {
        entries.iter().copied().collect()
    }

    fn ranked_services(scores: &ScoreMap) -> Vec<Service> {
        rank_services(scores)
            .into_iter()
            .map(|entry| entry.service)
            .collect()
    }

    #[test]
    fn services_rank_by_descending_score() {
        let scores = scores_of(&[
            (Service::Lambda, 8.12),
            (Service::Ecs, 6.64),
            (Service::Ec2, 5.20),
        ]);
        let ranked = rank_services(&scores);
        assert_eq!(
            ranked,
            vec![
                ServiceScore { service: Service::Lambda, score: 8.12 },
                ServiceScore { service: Service::Ecs, score: 6.64 },
                ServiceScore { service: Service::Ec2, score: 5.20 },
            ]
        );
    }

    #[test]
    fn equal_scores_rank_in_declaration_order() {
        let scores = scores_of(&[
            (Service::Ec2, 7.0),
            (Service::Lambda, 7.0),
            (Service::Ecs, 7.0),
        ]);
        assert_eq!(
            ranked_services(&scores),
            vec![Service::Lambda, Service::Ecs, Service::Ec2]
        );
    }

    #[test]
    fn best_service_returns_the_top_ranked_entry() {
        let scores = scores_of(&[
            (Service::Ecs, 7.36),
            (Service::Ec2, 7.12),
            (Service::Lambda, 6.96),
        ]);
        assert_eq!(best_service(&scores), Some(Service::Ecs));
    }

    #[test]
    fn best_service_of_empty_map_is_none() {
        assert_eq!(best_service(&ScoreMap::new()), None);
    }

    #[test]
    fn gap_below_half_point_is_low_confidence() {
        let scores = scores_of(&[(Service::Lambda, 7.0), (Service::Ecs, 6.51)]);
        assert_eq!(decision_confidence(&scores), Confidence::Low);
    }

    #[test]
    fn gap_of_exactly_half_a_point_is_medium_confidence() {
        let scores = scores_of(&[(Service::Lambda, 7.0), (Service::Ecs, 6.5)]);
        assert_eq!(decision_confidence(&scores), Confidence::Medium);
    }

    #[test]
    fn gap_just_under_the_clear_threshold_is_medium_confidence() {
        let scores = scores_of(&[(Service::Lambda, 7.0), (Service::Ecs, 5.51)]);
        assert_eq!(decision_confidence(&scores), Confidence::Medium);
    }

    #[test]
    fn gap_of_exactly_the_clear_threshold_is_high_confidence() {
        let scores = scores_of(&[(Service::Lambda, 7.0), (Service::Ecs, 5.5)]);
        assert_eq!(decision_confidence(&scores), Confidence::High);
    }

    #[test]
    fn wide_gap_is_high_confidence() {
        let scores = scores_of(&[
            (Service::Lambda, 7.0),
            (Service::Ecs, 5.4),
            (Service::Ec2, 5.39),
        ]);
        assert_eq!(decision_confidence(&scores), Confidence::High);
    }

    #[test]
    fn confidence_ignores_everything_below_the_top_two() {
        let scores = scores_of(&[
            (Service::Lambda, 7.0),
            (Service::Ecs, 6.9),
            (Service::Ec2, 1.0),
        ]);
        assert_eq!(decision_confidence(&scores), Confidence::Low);
    }

    #[test]
    fn fewer_than_two_services_is_high_confidence() {
        assert_eq!(decision_confidence(&ScoreMap::new()), Confidence::High);
        let single = scores_of(&[(Service::Ec2, 4.2)]);
        assert_eq!(decision_confidence(&single), Confidence::High);
    }

    #[test]
    fn low_confidence_label_names_the_close_trade_off() {
        assert_eq!(Confidence::Low.to_string(), "Low (Close trade-off)");
        assert_eq!(Confidence::High.to_string(), "High");
        assert_eq!(
            serde_json::to_string(&Confidence::Low).unwrap(),
            "\"Low (Close trade-off)\""
        );
    }
}
