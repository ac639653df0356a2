//! Pure reward computation core.
//!
//! # Design Principles
//!
//! This is a **pure function crate**: no state, no wallets mutated, no
//! transfers. Every function takes read-only snapshots and returns new
//! collections.
//! - Input: earned points, wallet snapshots, settings, teams
//! - Output: per-identity allocated amounts and informational rows
//! - Side effects: none
//!
//! The pipeline is:
//! 1. Screen participants (wallet state, threshold, defect detection)
//! 2. Allocate the budget (flat, per-member, per-point, or pooled)
//! 3. Merge the result into the period's report, preserving
//!    transaction history
//!
//! Conservation holds for pooled budget types: the sum of allocated
//! amounts equals the total budget whenever total points are positive.

pub mod allocation;
pub mod eligibility;
pub mod pools;
pub mod report;

pub use allocation::allocate;
pub use eligibility::{screen_participants, Screening};
pub use pools::{allocate_pooled, build_pools, Pool, PooledAllocation};
pub use report::merge_report;
