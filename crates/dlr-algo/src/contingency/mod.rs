//! N-1 contingency screening by topological adjacency.
//!
//! This is a heuristic, not a power-flow solution. When a line trips, every
//! line sharing one of its buses is assumed to pick up a fixed fraction of
//! extra flow:
//!
//! ```text
//! stress_post(ℓ) = stress_pct(actual(ℓ) · (1 + uplift), rating(ℓ))
//! ```
//!
//! Neighbors above the reporting threshold become issues; the worst issue is the
//! contingency's severity. Outages whose neighbors all stay below threshold, and
//! lines with no neighbors at all, are not reported.
//!
//! Each outage is evaluated independently, so the screen runs across lines in
//! parallel with rayon. Final ordering is by descending severity, ties broken
//! by ascending outage line id.

pub mod n_1;

pub use n_1::{
    screen_n1, ContingencyConfig, ContingencyIssue, ContingencyReport, ContingencyResult,
};
