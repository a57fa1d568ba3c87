//! Search statistics and the `%%`-prefixed statistic log line convention.
//!
//! The prefix/printing convention mirrors the way the constraint solver this engine
//! is descended from reports end-of-run statistics: one line per statistic, all
//! sharing a common prefix so they can be grepped out of a larger log.

use std::time::Duration;

use fnv::FnvHashMap;

use crate::basic_types::GeneratorStrategy;

#[derive(Debug, Clone, Default)]
pub struct GeneratorStatistics {
    pub calls: u64,
    pub cuts_produced: u64,
    pub cuts_accepted: u64,
    pub time_spent: Duration,
    /// The strategy the generator was configured with as of its most recent call;
    /// kept alongside the counters so a log line can show what produced them.
    pub current_strategy: GeneratorStrategy,
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicStatistics {
    pub calls: u64,
    pub solutions_found: u64,
    pub time_spent: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub nodes_processed: u64,
    pub nodes_fathomed: u64,
    pub nodes_infeasible: u64,
    pub relaxations_solved: u64,
    pub relaxation_iterations: u64,
    pub incumbents_found: u64,
    pub max_depth_reached: u32,
    pub generators: FnvHashMap<String, GeneratorStatistics>,
    pub heuristics: FnvHashMap<String, HeuristicStatistics>,
}

impl Statistics {
    pub fn generator_mut(&mut self, name: &str) -> &mut GeneratorStatistics {
        self.generators.entry(name.to_owned()).or_default()
    }

    pub fn heuristic_mut(&mut self, name: &str) -> &mut HeuristicStatistics {
        self.heuristics.entry(name.to_owned()).or_default()
    }

    /// Emits every statistic as a single `log::info!` line behind the given prefix,
    /// `name=value` style. Used by the driver when a run concludes.
    pub fn log(&self, prefix: &str) {
        log::info!("{prefix}nodesProcessed={}", self.nodes_processed);
        log::info!("{prefix}nodesFathomed={}", self.nodes_fathomed);
        log::info!("{prefix}nodesInfeasible={}", self.nodes_infeasible);
        log::info!("{prefix}relaxationsSolved={}", self.relaxations_solved);
        log::info!(
            "{prefix}relaxationIterations={}",
            self.relaxation_iterations
        );
        log::info!("{prefix}incumbentsFound={}", self.incumbents_found);
        log::info!("{prefix}maxDepthReached={}", self.max_depth_reached);
        for (name, stats) in &self.generators {
            log::info!(
                "{prefix}generator.{name}.calls={} cuts={} accepted={} timeMs={} strategy={:?}",
                stats.calls,
                stats.cuts_produced,
                stats.cuts_accepted,
                stats.time_spent.as_millis(),
                stats.current_strategy
            );
        }
        for (name, stats) in &self.heuristics {
            log::info!(
                "{prefix}heuristic.{name}.calls={} solutions={} timeMs={}",
                stats.calls,
                stats.solutions_found,
                stats.time_spent.as_millis()
            );
        }
    }
}
