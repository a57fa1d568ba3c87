//! Named codes for the messages the engine emits, matching the external-interface
//! numbering.

pub const ROOT_RELAXATION_SOLVED: u32 = 30;
pub const INCUMBENT_FOUND: u32 = 31;
pub const NODE_FATHOMED: u32 = 32;
pub const SEARCH_CONCLUDED: u32 = 33;
pub const ROOT_RELAXATION_TIMING: u32 = 35;
pub const CUTOFF_INCREMENT: u32 = 43;
pub const CUT_STATS_PRODUCED: u32 = 53;
pub const CUT_STATS_ACCEPTED: u32 = 55;
pub const GAP_ABSOLUTE: u32 = 57;
pub const GAP_RELATIVE: u32 = 58;
pub const HEURISTIC_HIT: u32 = 60;
pub const HEURISTIC_STATS_CALLS: u32 = 63;
pub const HEURISTIC_STATS_SOLUTIONS: u32 = 65;
pub const CONE_STATS_COUNT: u32 = 101;
pub const CONE_STATS_BRANCHED: u32 = 102;

pub const HOT_START_HINT_IGNORED: u32 = 3002;

pub const RELAXATION_ITERATION_LIMIT: u32 = 6001;

pub const INVALID_CONE_SIZE: u32 = 9002;
pub const BRANCHED_ON_INTEGER: u32 = 9201;
pub const UNEXPECTED_NODE_STATUS: u32 = 9202;
pub const INVALID_CUT_FREQUENCY: u32 = 9301;
pub const UNKNOWN_RELAXATION_STATUS: u32 = 9401;
pub const RELAXATION_FAILED: u32 = 9402;
pub const OUT_OF_MEMORY: u32 = 9901;
pub const UNKNOWN_CONE_TYPE: u32 = 9903;
pub const UNKNOWN_BRANCH_STRATEGY: u32 = 9904;
pub const UNKNOWN_CUT_STRATEGY: u32 = 9905;
