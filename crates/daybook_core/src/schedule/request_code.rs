//! Deterministic wakeup slot allocation.
//!
//! # Responsibility
//! - Map `(kind, owner id)` to the integer slot used to install and later
//!   cancel one specific scheduled wakeup.
//!
//! # Invariants
//! - Pure and deterministic: the same inputs produce the same code across
//!   calls and across process restarts, with no persisted lookup table.
//! - Kind namespaces never collide: each kind owns a disjoint
//!   `[offset, offset + 100_000)` range and the stride equals the bucket
//!   count.
//!
//! Two distinct owners *within* one kind can hash to the same bucket.
//! With 100_000 buckets and a handful of reminders per device this is an
//! accepted limitation, not a handled case: the later install silently
//! replaces the earlier slot.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Buckets per kind namespace.
const BUCKETS: u32 = 100_000;

/// What a scheduled wakeup will do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlarmKind {
    /// Main writing reminder.
    Writing,
    /// Goal check-in reminder.
    Goal,
    /// Did-you-write fallback check, 30 minutes after the main reminder.
    Fallback,
    /// One-shot user-requested snooze of a writing reminder.
    Snooze,
}

impl AlarmKind {
    pub const ALL: [AlarmKind; 4] = [Self::Writing, Self::Goal, Self::Fallback, Self::Snooze];

    /// Stable name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Goal => "goal",
            Self::Fallback => "fallback",
            Self::Snooze => "snooze",
        }
    }

    fn namespace_offset(self) -> u32 {
        let index = match self {
            Self::Writing => 0,
            Self::Goal => 1,
            Self::Fallback => 2,
            Self::Snooze => 3,
        };
        index * BUCKETS
    }
}

/// Integer slot addressing one installed wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestCode(i32);

impl RequestCode {
    pub fn value(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for RequestCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives the wakeup slot for `(kind, owner)`.
///
/// Hashes the hyphenated UUID text with SHA-256 so the mapping survives
/// process restarts and app upgrades, then buckets into the kind's range.
pub fn request_code(kind: AlarmKind, owner: &Uuid) -> RequestCode {
    let digest = Sha256::digest(owner.hyphenated().to_string().as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    let bucket = (u64::from_be_bytes(word) % u64::from(BUCKETS)) as u32;
    RequestCode((kind.namespace_offset() + bucket) as i32)
}
