//! # rbac-service
//!
//! The RBAC cache/sync layer and its natural-language front end.
//!
//! [`RbacCache`] owns the in-process [`Mirror`] of the remote store and
//! routes every mutation through an [`RbacStore`](rbac_database::RbacStore):
//! remote call first, then a pure reconciliation of the mirror on
//! success. [`dispatch`] turns structured assistant actions into the same
//! cache operations.

pub mod busy;
pub mod cache;
pub mod dispatch;
pub mod mirror;

pub use cache::RbacCache;
pub use dispatch::{ActionKind, Assistant, AssistantAction, DispatchOutcome};
pub use mirror::{Mirror, RbacSummary, RoleGrants};
