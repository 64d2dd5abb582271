//! Tunable constants of the engine, grouped the way the `[engine]` table of
//! the CLI configuration file lays them out.

use dlr_core::{DlrError, DlrResult};
use serde::{Deserialize, Serialize};

use crate::contingency::ContingencyConfig;
use crate::outage::OutageConfig;
use crate::stress::OverloadSearch;
use crate::summary::BandEdges;
use crate::thermal::ThermalParams;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thermal: ThermalParams,
    pub overload: OverloadSearch,
    pub contingency: ContingencyConfig,
    pub outage: OutageConfig,
    pub bands: BandEdges,
}

impl EngineConfig {
    /// Reject settings that would make results meaningless.
    pub fn validate(&self) -> DlrResult<()> {
        let t = &self.thermal;
        let positive = [
            ("thermal.air_conductivity", t.air_conductivity),
            ("thermal.kinematic_viscosity", t.kinematic_viscosity),
            ("thermal.nusselt_coefficient", t.nusselt_coefficient),
            ("thermal.min_wind_speed", t.min_wind_speed),
            ("thermal.rating_floor_a", t.rating_floor_a),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DlrError::Config(format!("{field} must be positive, got {value}")));
            }
        }

        let o = &self.overload;
        if !(o.min_ambient_c.is_finite()
            && o.max_ambient_c.is_finite()
            && o.min_ambient_c < o.max_ambient_c)
        {
            return Err(DlrError::Config(format!(
                "overload search range [{}, {}] is empty",
                o.min_ambient_c, o.max_ambient_c
            )));
        }
        if o.iterations == 0 {
            return Err(DlrError::Config("overload.iterations must be at least 1".into()));
        }

        let non_negative = [
            ("contingency.uplift", self.contingency.uplift),
            ("contingency.issue_threshold_pct", self.contingency.issue_threshold_pct),
            ("outage.per_cut_uplift", self.outage.per_cut_uplift),
            ("outage.max_uplift", self.outage.max_uplift),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(DlrError::Config(format!(
                    "{field} must be non-negative, got {value}"
                )));
            }
        }

        let b = &self.bands;
        if !(b.medium_pct <= b.high_pct && b.high_pct <= b.overload_pct) {
            return Err(DlrError::Config(format!(
                "stress bands must be ascending, got {}/{}/{}",
                b.medium_pct, b.high_pct, b.overload_pct
            )));
        }
        Ok(())
    }
}
