pub mod completions;
pub mod conductors;
pub mod graph;
pub mod nminus1;
pub mod outage;
pub mod rate;
pub mod stress;
pub mod util;
