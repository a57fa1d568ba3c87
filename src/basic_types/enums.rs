//! Small enumerations shared across module boundaries.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConeType {
    /// `x_1 >= sqrt(x_2^2 + ... + x_n^2)`, size `n >= 1`.
    Lorentz,
    /// `2 x_1 x_2 >= x_3^2 + ... + x_n^2`, `x_1, x_2 >= 0`, size `n >= 3`.
    RotatedLorentz,
}

impl ConeType {
    pub fn name(&self) -> &'static str {
        match self {
            ConeType::Lorentz => "lorentz",
            ConeType::RotatedLorentz => "rotated-lorentz",
        }
    }

    pub fn minimum_size(&self) -> usize {
        match self {
            ConeType::Lorentz => 1,
            ConeType::RotatedLorentz => 3,
        }
    }
}

/// Outcome of a relaxation resolve, reported back to the search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelaxationStatus {
    Optimal,
    Infeasible,
    CutoffReached,
    IterationLimit,
    Unbounded,
    #[default]
    Failed,
}

/// Which bound a child node tightens relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

/// Lifecycle state of a search node; see [`crate::node::Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Candidate,
    Active,
    Branched,
    Fathomed,
    Infeasible,
}

/// When a cut generator or heuristic is invoked during the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorStrategy {
    /// Never invoked.
    None,
    /// Only at the root node.
    Root,
    /// At every node, subject to `frequency`.
    #[default]
    Auto,
    /// Every `frequency` nodes, starting from the root.
    Periodic,
}

impl GeneratorStrategy {
    pub fn should_run(&self, depth: u32, node_count: u64, frequency: u32) -> bool {
        match self {
            GeneratorStrategy::None => false,
            GeneratorStrategy::Root => depth == 0,
            GeneratorStrategy::Auto => frequency == 0 || node_count % u64::from(frequency) == 0,
            GeneratorStrategy::Periodic => {
                frequency > 0 && node_count % u64::from(frequency) == 0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchStrategyKind {
    MostFractional,
    #[default]
    PseudoCost,
    StrongBranching,
    Reliability,
}

impl fmt::Display for BranchStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BranchStrategyKind::MostFractional => "most-fractional",
            BranchStrategyKind::PseudoCost => "pseudo-cost",
            BranchStrategyKind::StrongBranching => "strong-branching",
            BranchStrategyKind::Reliability => "reliability",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelectionRule {
    #[default]
    BestBound,
    DepthFirst,
    BestEstimate,
}

/// Final outcome reported by the search driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    GapLimitReached,
    TimeLimitReached,
    NodeLimitReached,
}

impl SolverStatus {
    /// The exit code the CLI reports for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            SolverStatus::Optimal => 0,
            SolverStatus::Infeasible => 1,
            SolverStatus::GapLimitReached
            | SolverStatus::TimeLimitReached
            | SolverStatus::NodeLimitReached => 2,
        }
    }
}
