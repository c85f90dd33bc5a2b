use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::weights::Factor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Service {
    Lambda,
    #[serde(rename = "ECS")]
    Ecs,
    #[serde(rename = "EC2")]
    Ec2,
}

impl Service {
    pub const ALL: [Self; 3] = [Self::Lambda, Self::Ecs, Self::Ec2];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lambda => "Lambda",
            Self::Ecs => "ECS",
            Self::Ec2 => "EC2",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityRow(BTreeMap<Factor, f64>);

impl CapabilityRow {
    #[must_use]
    pub fn score(&self, factor: Factor) -> Option<f64> {
        self.0.get(&factor).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        self.0.iter().map(|(factor, value)| (*factor, *value))
    }

    #[must_use]
    pub fn weakest_factor(&self) -> Option<Factor> {
        self.iter()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(factor, _)| factor)
    }
}

impl FromIterator<(Factor, f64)> for CapabilityRow {
    fn from_iter<I: IntoIterator<Item = (Factor, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityTable(BTreeMap<Service, CapabilityRow>);

impl CapabilityTable {
    #[must_use]
    pub fn row(&self, service: Service) -> Option<&CapabilityRow> {
        self.0.get(&service)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Service, &CapabilityRow)> + '_ {
        self.0.iter().map(|(service, row)| (*service, row))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for service in Service::ALL {
            let row = self
                .row(service)
                .ok_or(EngineError::MissingService(service))?;
            for factor in Factor::ALL {
                let value = row
                    .score(factor)
                    .ok_or(EngineError::MissingFactor { service, factor })?;
                if !(1.0..=10.0).contains(&value) {
                    return Err(EngineError::InvalidScore {
                        service,
                        factor,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(Service, CapabilityRow)> for CapabilityTable {
    fn from_iter<I: IntoIterator<Item = (Service, CapabilityRow)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
