//! Caller context threaded through mutating operations.

use serde::{Deserialize, Serialize};

use crate::id::{CorrelationId, UserId};

/// Who is asking, and under which request.
///
/// Mutating operations accept this explicitly so an audit trail can be attached
/// later without changing call sites. It carries no business rules today; it
/// only tags log spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    actor: Option<UserId>,
    correlation_id: CorrelationId,
}

impl RequestContext {
    /// Context for an authenticated actor.
    pub fn new(actor: UserId) -> Self {
        Self {
            actor: Some(actor),
            correlation_id: CorrelationId::new(),
        }
    }

    /// Context with no known actor (system jobs, tests).
    pub fn anonymous() -> Self {
        Self {
            actor: None,
            correlation_id: CorrelationId::new(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn actor(&self) -> Option<UserId> {
        self.actor
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
