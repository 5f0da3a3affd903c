//! Governance split model.
//!
//! A split is optional on a project. Absence means "not yet defined"; when
//! present the three shares must total exactly 100.

use serde::{Deserialize, Serialize};

/// Required total for a complete split, in percent.
pub const GOVERNANCE_TOTAL: i64 = 100;

/// Percentage allocation across contributors, community and sustainability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceSplit {
    pub contributors_share: i32,
    pub community_share: i32,
    pub sustainability_share: i32,
}

impl GovernanceSplit {
    pub fn new(contributors_share: i32, community_share: i32, sustainability_share: i32) -> Self {
        Self {
            contributors_share,
            community_share,
            sustainability_share,
        }
    }

    /// Sum of all shares, widened so extreme inputs cannot overflow.
    pub fn total(&self) -> i64 {
        i64::from(self.contributors_share)
            + i64::from(self.community_share)
            + i64::from(self.sustainability_share)
    }

    pub fn is_complete(&self) -> bool {
        self.total() == GOVERNANCE_TOTAL
    }
}
