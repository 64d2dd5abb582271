//! Seam between the engine and whatever supplies the grid.

use crate::{DlrResult, Network};

/// Source of grid topology.
///
/// A failed load means the analysis cannot run at all. Implementations return
/// [`crate::DlrError::TopologyUnavailable`] (or an I/O error) rather than an
/// empty network, so callers can tell "nothing wrong" from "don't know".
pub trait TopologyProvider: Send + Sync {
    fn load(&self) -> DlrResult<Network>;

    /// Short human-readable origin, used in logs.
    fn describe(&self) -> String {
        "topology".to_string()
    }
}

impl<T: TopologyProvider + ?Sized> TopologyProvider for Box<T> {
    fn load(&self) -> DlrResult<Network> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
