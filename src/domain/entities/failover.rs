//! Failover attempt records

use serde::Serialize;

use crate::domain::value_objects::NodeAddr;

/// Response a node gives to a failover request once it is no longer a
/// replica; any other answer means the promotion may still be in progress.
pub const NOT_A_SLAVE_RESPONSE: &str = "ERR You should send CLUSTER FAILOVER to a slave";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailoverOutcome {
    /// Node now holds the master role
    Promoted,
    /// Node still answers as a slave; failover not complete
    NotYetSlave,
    /// Request could not be issued or answered
    Error(String),
}

impl FailoverOutcome {
    pub fn is_promoted(&self) -> bool {
        matches!(self, FailoverOutcome::Promoted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailoverAttempt {
    pub target: NodeAddr,
    pub attempt: u32,
    pub outcome: FailoverOutcome,
}

/// How a round decides whether a target was promoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionCheck {
    /// Trust the synchronous textual response of the failover request
    #[default]
    Response,
    /// Query the node's role after the request
    Role,
}

/// Classify a failover response under [`PromotionCheck::Response`]
pub fn classify_response(response: &str, promoted_response: &str) -> FailoverOutcome {
    if response.trim() == promoted_response {
        FailoverOutcome::Promoted
    } else {
        FailoverOutcome::NotYetSlave
    }
}
