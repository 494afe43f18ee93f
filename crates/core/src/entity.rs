//! Ownership seam for domain entities.

use crate::id::UserId;

/// An entity owned by exactly one user.
///
/// Authorization predicates are written against this trait so they stay
/// independent of any concrete record type.
pub trait Owned {
    fn owner(&self) -> UserId;
}
