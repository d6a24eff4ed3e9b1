use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::ID_GENERATOR;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// The immutable identifier of a document, assigned at insert time.
///
/// Ids generated in one process increase monotonically, so id order is
/// insertion order.
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct PotashId {
    id_value: u64,
}

impl PotashId {
    pub fn new() -> Self {
        PotashId {
            id_value: ID_GENERATOR.get_id(),
        }
    }

    pub fn create_id(id_value: u64) -> PotashResult<PotashId> {
        if id_value == 0 {
            log::error!("Id value must be positive");
            return Err(PotashError::new("Id value must be positive", ErrorKind::InvalidId));
        }
        Ok(PotashId { id_value })
    }

    pub fn id_value(&self) -> u64 {
        self.id_value
    }
}

impl Default for PotashId {
    fn default() -> Self {
        PotashId::new()
    }
}

impl FromStr for PotashId {
    type Err = PotashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        match trimmed.parse::<u64>() {
            Ok(value) => PotashId::create_id(value),
            Err(e) => {
                log::error!("Invalid id {}: {}", s, e);
                Err(PotashError::new(&format!("Invalid id {}", s), ErrorKind::InvalidId))
            }
        }
    }
}

impl Debug for PotashId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.id_value)
    }
}

impl Display for PotashId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.id_value)
    }
}
