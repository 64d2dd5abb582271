//! Facade tying ratings, stress, aggregation, N-1 and outages together.

use dlr_core::{
    Amperes, ConductorCatalog, Diagnostics, DlrError, DlrResult, Environment, Line, Network,
    TopologyProvider,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::contingency::{screen_n1, ContingencyReport};
use crate::outage::{simulate, OutageSet, OutageView};
use crate::stress::{actual_current, solve_overload_temperature, stress_pct, LineStress};
use crate::summary::{summarize, SystemSummary};
use crate::thermal::{ampacity, RatingInputs};

/// Stress of every line under one environment.
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub environment: Environment,
    pub lines: Vec<LineStress>,
    pub summary: SystemSummary,
    #[serde(skip_serializing_if = "Diagnostics::is_empty")]
    pub diagnostics: Diagnostics,
}

impl StressReport {
    /// Display copy with stresses rounded to one decimal.
    pub fn rounded(&self) -> StressReport {
        StressReport {
            environment: self.environment,
            lines: self.lines.iter().map(LineStress::rounded).collect(),
            summary: self.summary.rounded(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// Rating engine bound to a conductor catalog and a configuration.
#[derive(Debug, Clone, Default)]
pub struct StressEngine {
    catalog: ConductorCatalog,
    config: EngineConfig,
}

impl StressEngine {
    pub fn new(catalog: ConductorCatalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(ConductorCatalog::builtin(), config)
    }

    pub fn catalog(&self) -> &ConductorCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rating of a named conductor; the flag is true when the default conductor
    /// stood in for an unknown name.
    pub fn rate(&self, conductor: &str, inputs: &RatingInputs) -> (Amperes, bool) {
        let resolved = self.catalog.resolve(conductor);
        if resolved.fallback {
            warn!(
                conductor,
                fallback = %resolved.conductor.name,
                "unknown conductor, using default"
            );
        }
        (
            ampacity(resolved.conductor, &self.config.thermal, inputs),
            resolved.fallback,
        )
    }

    /// Rating, current, stress and overload temperature for one line.
    pub fn evaluate_line(&self, line: &Line, env: &Environment) -> LineStress {
        let resolved = self.catalog.resolve(&line.conductor);
        let inputs = RatingInputs {
            ambient: env.ambient,
            wind_speed: env.wind_speed,
            wind_direction: env.wind_direction,
            line_azimuth: line.azimuth,
            mot: line.mot,
        };
        let rating = ampacity(resolved.conductor, &self.config.thermal, &inputs);
        let actual = actual_current(line.flow, env.scenario.multiplier(), line.voltage);
        let overload = solve_overload_temperature(
            resolved.conductor,
            &self.config.thermal,
            line.azimuth,
            line.mot,
            env.wind_speed,
            env.wind_direction,
            actual,
            &self.config.overload,
        );
        let stress = LineStress {
            id: line.id.clone(),
            name: line.name.clone(),
            rating_a: rating.value(),
            actual_a: actual.value(),
            stress_pct: stress_pct(actual, rating),
            overload_temp_c: overload.map(|t| t.value()),
            conductor_fallback: resolved.fallback,
        };
        debug!(
            line = %line.id,
            rating_a = stress.rating_a,
            actual_a = stress.actual_a,
            stress_pct = stress.stress_pct,
            "line evaluated"
        );
        stress
    }

    /// Evaluate every line in network order and aggregate.
    pub fn evaluate(&self, network: &Network, env: &Environment) -> StressReport {
        let mut diagnostics = Diagnostics::new();
        network.validate_into(&mut diagnostics);

        let lines: Vec<LineStress> = network
            .lines()
            .map(|line| {
                let stress = self.evaluate_line(line, env);
                if stress.conductor_fallback {
                    warn!(
                        line = %line.id,
                        conductor = %line.conductor,
                        "unknown conductor, rated as {}",
                        self.catalog.default_conductor().name
                    );
                    diagnostics.add_warning_with_entity(
                        "conductor",
                        &format!(
                            "unknown conductor '{}', using {}",
                            line.conductor,
                            self.catalog.default_conductor().name
                        ),
                        &format!("Line {}", line.id),
                    );
                }
                stress
            })
            .collect();

        let summary = summarize(lines.iter().map(|s| s.stress_pct), &self.config.bands);
        info!(
            lines = summary.line_count,
            ssi = summary.ssi,
            max_stress = summary.max_stress,
            overloads = summary.bands.overload,
            "stress evaluated"
        );
        StressReport {
            environment: *env,
            lines,
            summary,
            diagnostics,
        }
    }

    /// N-1 screen against baseline stresses under `env`.
    pub fn contingencies(&self, network: &Network, env: &Environment) -> ContingencyReport {
        let report = self.evaluate(network, env);
        self.contingencies_for(network, &report)
    }

    /// N-1 screen reusing an existing stress report.
    pub fn contingencies_for(&self, network: &Network, report: &StressReport) -> ContingencyReport {
        let contingencies = screen_n1(network, &report.lines, &self.config.contingency);
        info!("{}", contingencies.summary());
        contingencies
    }

    /// Load topology and run the N-1 screen.
    ///
    /// A provider failure is reported as [`DlrError::TopologyUnavailable`],
    /// never as an empty contingency list.
    pub fn contingencies_from(
        &self,
        provider: &dyn TopologyProvider,
        env: &Environment,
    ) -> DlrResult<ContingencyReport> {
        let network = provider.load().map_err(|err| match err {
            DlrError::TopologyUnavailable(_) => err,
            other => DlrError::TopologyUnavailable(format!("{}: {}", provider.describe(), other)),
        })?;
        Ok(self.contingencies(&network, env))
    }

    /// Outage-adjusted stresses for a cut set under `env`.
    pub fn outage_view(&self, network: &Network, env: &Environment, cuts: &OutageSet) -> OutageView {
        let report = self.evaluate(network, env);
        self.outage_view_for(network, &report, cuts)
    }

    /// Outage-adjusted stresses reusing an existing stress report.
    pub fn outage_view_for(
        &self,
        network: &Network,
        report: &StressReport,
        cuts: &OutageSet,
    ) -> OutageView {
        for id in cuts.unknown_in(network) {
            warn!(line = %id, "cut line is not in the network; ignored");
        }
        let view = simulate(
            network,
            &report.lines,
            cuts,
            &self.config.outage,
            &self.config.bands,
        );
        info!(
            cut = cuts.len(),
            active = view.summary.line_count,
            max_stress = view.summary.max_stress,
            "outage scenario evaluated"
        );
        view
    }
}
