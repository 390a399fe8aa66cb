//! Audit stamping.
//!
//! Entities never carry caller-supplied audit data. Writes ask an
//! [`Auditor`] for an [`AuditStamp`] and the store applies it: the creation
//! pair is written once on insert, the modification pair on every write.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who performed a write, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStamp {
    pub actor: String,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn new(actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            at,
        }
    }
}

/// Creation and last-modification metadata of a persisted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

impl AuditFields {
    /// Audit fields for a row inserted under `stamp`.
    pub fn created(stamp: &AuditStamp) -> Self {
        Self {
            created_at: stamp.at,
            created_by: stamp.actor.clone(),
            modified_at: stamp.at,
            modified_by: stamp.actor.clone(),
        }
    }

    /// Record a modification. The creation pair is left untouched.
    pub fn touch(&mut self, stamp: &AuditStamp) {
        self.modified_at = stamp.at;
        self.modified_by = stamp.actor.clone();
    }
}

/// Supplies the actor and timestamp for writes.
///
/// Identity resolution lives outside the engine; the application hands in
/// whichever auditor matches the current request.
pub trait Auditor: Send + Sync {
    fn stamp(&self) -> AuditStamp;
}

/// Stamps every write with a fixed actor and the current wall-clock time.
#[derive(Debug, Clone)]
pub struct ActorAuditor {
    actor: String,
}

impl ActorAuditor {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl Auditor for ActorAuditor {
    fn stamp(&self) -> AuditStamp {
        AuditStamp::new(self.actor.clone(), Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_touch_keeps_creation_pair() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut audit = AuditFields::created(&AuditStamp::new("alice", t0));
        audit.touch(&AuditStamp::new("bob", t1));

        assert_eq!(audit.created_by, "alice");
        assert_eq!(audit.created_at, t0);
        assert_eq!(audit.modified_by, "bob");
        assert_eq!(audit.modified_at, t1);
    }

    #[test]
    fn test_actor_auditor_uses_actor() {
        let auditor = ActorAuditor::new("system");
        let stamp = auditor.stamp();
        assert_eq!(stamp.actor, "system");
        assert_eq!(auditor.actor(), "system");
    }
}
