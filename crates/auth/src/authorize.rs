//! Ownership authorization predicate.
//!
//! Every non-uniformly-scoped read or mutation goes through [`owns`] before
//! touching a record, keeping the rule in one place instead of scattered
//! query filters.

use caremap_core::{Owned, UserId};

/// Whether `user` is the owner of `entity`.
pub fn owns<T: Owned>(user: UserId, entity: &T) -> bool {
    entity.owner() == user
}
