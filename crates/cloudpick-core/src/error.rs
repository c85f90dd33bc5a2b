use thiserror::Error;

use crate::capability::Service;
use crate::weights::Factor;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("unknown scenario: {0}")]
    InvalidScenario(String),
    #[error("invalid {axis} choice {code}: expected 1, 2, or 3")]
    InvalidChoice { axis: &'static str, code: u8 },
    #[error("capability row for {service} is missing factor {factor}")]
    MissingFactor { service: Service, factor: Factor },
    #[error("capability table is missing service {0}")]
    MissingService(Service),
    #[error("capability score for {service} {factor} must be within 1..=10, got {value}")]
    InvalidScore {
        service: Service,
        factor: Factor,
        value: f64,
    },
}
