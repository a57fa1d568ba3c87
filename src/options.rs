//! Every tunable the CLI exposes via `--param name value`, bundled into one struct
//! with sensible defaults so an embedder can override just the fields it cares
//! about.

use crate::basic_types::BranchStrategyKind;
use crate::basic_types::GeneratorStrategy;
use crate::basic_types::NodeSelectionRule;

#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub integer_tol: f64,
    pub cone_tol: f64,
    pub dense_con_cutoff: f64,
    pub cut_max_age: u32,
    pub cut_seed: u64,
    pub branch_strategy: BranchStrategyKind,
    pub node_selection_rule: NodeSelectionRule,
    pub reliability_min_observations: u32,
    pub num_strong: usize,
    pub feasibility_pump_max_iterations: u32,
    /// Whether conic infeasibility is resolved by outer-approximation cuts before
    /// falling back to branching on the cone's apex variable.
    pub use_outer_approximation: bool,
    pub node_limit: Option<u64>,
    pub time_limit: Option<u64>,
    pub optimal_rel_gap: f64,
    pub optimal_abs_gap: f64,
    /// Global override applied uniformly to every registered cut generator.
    pub cut_strategy: GeneratorStrategy,
    pub cut_frequency: u32,
    /// Global override applied uniformly to every registered heuristic.
    pub heur_strategy: GeneratorStrategy,
    pub heur_frequency: u32,
    pub max_passes_per_node: u32,
    /// Branching strategy an embedder's ramp-up phase should install in place of
    /// `branch_strategy` before handing control back to the normal search; the
    /// ramp-up orchestration itself (parallel worker start, synchronization) is not
    /// this engine's concern, only the strategy override it would switch to.
    pub ramp_up_branch_strategy: Option<BranchStrategyKind>,
    /// Raw hot-start mode: `0` off, `1` reorder children toward the incumbent's
    /// value, `2` additionally prune away siblings that can't reconstruct it. Any
    /// other value is accepted but ignored (logged once).
    pub hot_start_strategy: u32,
    pub log_level: String,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            integer_tol: 1e-6,
            cone_tol: 1e-6,
            dense_con_cutoff: 0.5,
            cut_max_age: 20,
            cut_seed: 0x5eed,
            branch_strategy: BranchStrategyKind::PseudoCost,
            node_selection_rule: NodeSelectionRule::BestBound,
            reliability_min_observations: 4,
            num_strong: 5,
            feasibility_pump_max_iterations: 20,
            use_outer_approximation: true,
            node_limit: None,
            time_limit: None,
            optimal_rel_gap: 1e-4,
            optimal_abs_gap: 1e-6,
            cut_strategy: GeneratorStrategy::Auto,
            cut_frequency: 1,
            heur_strategy: GeneratorStrategy::Auto,
            heur_frequency: 1,
            max_passes_per_node: 5,
            ramp_up_branch_strategy: None,
            hot_start_strategy: 0,
            log_level: "info".to_owned(),
        }
    }
}

impl SolverOptions {
    /// Applies one `--param name value` override. Mirrors the scalar fields above;
    /// unrecognized names are rejected rather than silently ignored.
    pub fn set_param(&mut self, name: &str, value: &str) -> crate::basic_types::Result<()> {
        use crate::basic_types::BranchConeError;

        let parse_f64 = |value: &str| {
            value
                .parse::<f64>()
                .map_err(|_| BranchConeError::UnknownEnumValue {
                    name: "param-value",
                    value: value.to_owned(),
                })
        };
        let parse_u64 = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|_| BranchConeError::UnknownEnumValue {
                    name: "param-value",
                    value: value.to_owned(),
                })
        };
        let parse_generator_strategy = |value: &str| match value {
            "none" => Ok(GeneratorStrategy::None),
            "root" => Ok(GeneratorStrategy::Root),
            "auto" => Ok(GeneratorStrategy::Auto),
            "periodic" => Ok(GeneratorStrategy::Periodic),
            other => Err(BranchConeError::UnknownEnumValue {
                name: "cutStrategy",
                value: other.to_owned(),
            }),
        };
        let parse_branch_strategy_kind = |value: &str| match value {
            "most-fractional" => Ok(BranchStrategyKind::MostFractional),
            "pseudo-cost" => Ok(BranchStrategyKind::PseudoCost),
            "strong-branching" => Ok(BranchStrategyKind::StrongBranching),
            "reliability" => Ok(BranchStrategyKind::Reliability),
            other => Err(BranchConeError::UnknownEnumValue {
                name: "branchStrategy",
                value: other.to_owned(),
            }),
        };

        match name {
            "integerTol" => self.integer_tol = parse_f64(value)?,
            "coneTol" => self.cone_tol = parse_f64(value)?,
            "denseConCutoff" => self.dense_con_cutoff = parse_f64(value)?,
            "cutMaxAge" => self.cut_max_age = parse_u64(value)? as u32,
            "cutSeed" => self.cut_seed = parse_u64(value)?,
            "reliabilityMinObservations" => {
                self.reliability_min_observations = parse_u64(value)? as u32
            }
            "numStrong" => self.num_strong = parse_u64(value)? as usize,
            "feasibilityPumpMaxIterations" => {
                self.feasibility_pump_max_iterations = parse_u64(value)? as u32
            }
            "useOuterApproximation" => {
                self.use_outer_approximation =
                    value.parse::<bool>().map_err(|_| BranchConeError::UnknownEnumValue {
                        name: "useOuterApproximation",
                        value: value.to_owned(),
                    })?
            }
            "nodeLimit" => self.node_limit = Some(parse_u64(value)?),
            "timeLimit" => self.time_limit = Some(parse_u64(value)?),
            "optimalRelGap" => self.optimal_rel_gap = parse_f64(value)?,
            "optimalAbsGap" => self.optimal_abs_gap = parse_f64(value)?,
            "cutStrategy" => self.cut_strategy = parse_generator_strategy(value)?,
            "cutFrequency" => self.cut_frequency = parse_u64(value)? as u32,
            "heurStrategy" => {
                self.heur_strategy = parse_generator_strategy(value).map_err(|_| {
                    BranchConeError::UnknownEnumValue {
                        name: "heurStrategy",
                        value: value.to_owned(),
                    }
                })?
            }
            "heurFrequency" => self.heur_frequency = parse_u64(value)? as u32,
            "maxPassesPerNode" => self.max_passes_per_node = parse_u64(value)? as u32,
            "branchStrategy" => self.branch_strategy = parse_branch_strategy_kind(value)?,
            "rampUpBranchStrategy" => {
                self.ramp_up_branch_strategy = match value {
                    "none" => None,
                    other => Some(parse_branch_strategy_kind(other)?),
                }
            }
            "hotStartStrategy" => self.hot_start_strategy = parse_u64(value)? as u32,
            "logLevel" => self.log_level = value.to_owned(),
            "nodeSelectionRule" => {
                self.node_selection_rule = match value {
                    "best-bound" => NodeSelectionRule::BestBound,
                    "depth-first" => NodeSelectionRule::DepthFirst,
                    "best-estimate" => NodeSelectionRule::BestEstimate,
                    other => {
                        return Err(BranchConeError::UnknownEnumValue {
                            name: "nodeSelectionRule",
                            value: other.to_owned(),
                        })
                    }
                }
            }
            other => {
                return Err(BranchConeError::UnknownEnumValue {
                    name: "param",
                    value: other.to_owned(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_a_known_scalar_param() {
        let mut options = SolverOptions::default();
        options.set_param("integerTol", "0.001").unwrap();
        assert!((options.integer_tol - 0.001).abs() < 1e-12);
    }

    #[test]
    fn overrides_cut_strategy_and_frequency() {
        let mut options = SolverOptions::default();
        options.set_param("cutStrategy", "periodic").unwrap();
        options.set_param("cutFrequency", "3").unwrap();
        assert_eq!(options.cut_strategy, GeneratorStrategy::Periodic);
        assert_eq!(options.cut_frequency, 3);
    }

    #[test]
    fn rejects_unknown_params() {
        let mut options = SolverOptions::default();
        assert!(options.set_param("doesNotExist", "1").is_err());
    }
}
