use crate::utils::error::DcfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Growth-rate case selected for a valuation run.
///
/// Parses from the numeric codes `1` (base), `2` (bull) and `3` (bear), or from the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Base,
    Bull,
    Bear,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Base, Scenario::Bull, Scenario::Bear];

    pub fn code(&self) -> u8 {
        match self {
            Scenario::Base => 1,
            Scenario::Bull => 2,
            Scenario::Bear => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Base => "base",
            Scenario::Bull => "bull",
            Scenario::Bear => "bear",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = DcfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "base" => Ok(Scenario::Base),
            "2" | "bull" => Ok(Scenario::Bull),
            "3" | "bear" => Ok(Scenario::Bear),
            _ => Err(DcfError::invalid_input(
                "case",
                format!("must be 1, 2, or 3 (got '{}')", s),
            )),
        }
    }
}
