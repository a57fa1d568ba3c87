//! The minimal CLI surface: `branchcone <instance> [--param name value]...`.
//!
//! The instance file format read here is a small line-oriented text format, not
//! the conic-MPS dialect the broker-facing interfaces describe — MPS parsing is
//! out of scope for this engine. This loader exists only so the CLI can exercise
//! the full problem-to-result pipeline for manual runs and smoke tests.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::solve_problem;
use crate::basic_types::BranchConeError;
use crate::basic_types::ConeType;
use crate::basic_types::Sense;
use crate::basic_types::Statistics;
use crate::messages::LoggingMessageHandler;
use crate::model::Problem;
use crate::model::ProblemBuilder;
use crate::options::SolverOptions;
use crate::relaxation::reference_simplex::ReferenceSimplex;
use crate::termination::Combinator;
use crate::termination::Indefinite;
use crate::termination::NodeBudget;
use crate::termination::TerminationCondition;
use crate::termination::TimeBudget;

/// `0` solved-optimal, `1` solved-infeasible, `2` limit-reached, `3` input-error,
/// `>=4` internal error — matching the exit-code table the external broker assumes.
pub const EXIT_INPUT_ERROR: i32 = 3;
pub const EXIT_INTERNAL_ERROR: i32 = 4;

#[derive(Debug, Parser)]
#[command(name = "branchcone", about = "Branch-and-bound search over MILP/MISOCO instances")]
pub struct Cli {
    /// Path to the instance file.
    pub instance: PathBuf,

    /// Overrides one solver parameter by name; may be repeated. Every tunable,
    /// including `timeLimit` and `logLevel`, is set this way rather than through a
    /// dedicated flag.
    #[arg(long = "param", num_args = 2, value_names = ["NAME", "VALUE"])]
    pub param: Vec<String>,
}

enum CliTermination {
    Indefinite(Indefinite),
    Time(TimeBudget),
    Node(NodeBudget),
    TimeAndNode(Combinator<TimeBudget, NodeBudget>),
}

impl TerminationCondition for CliTermination {
    fn should_stop(&mut self, statistics: &Statistics) -> bool {
        match self {
            CliTermination::Indefinite(c) => c.should_stop(statistics),
            CliTermination::Time(c) => c.should_stop(statistics),
            CliTermination::Node(c) => c.should_stop(statistics),
            CliTermination::TimeAndNode(c) => c.should_stop(statistics),
        }
    }
}

fn build_termination(options: &SolverOptions) -> CliTermination {
    match (options.time_limit, options.node_limit) {
        (Some(seconds), Some(limit)) => CliTermination::TimeAndNode(Combinator::new(
            TimeBudget::new(Duration::from_secs(seconds)),
            NodeBudget::new(limit),
        )),
        (Some(seconds), None) => CliTermination::Time(TimeBudget::new(Duration::from_secs(seconds))),
        (None, Some(limit)) => CliTermination::Node(NodeBudget::new(limit)),
        (None, None) => CliTermination::Indefinite(Indefinite),
    }
}

/// Runs the engine for the parsed CLI arguments and returns the process exit code.
pub fn run(cli: &Cli) -> i32 {
    let mut options = SolverOptions::default();
    for pair in cli.param.chunks_exact(2) {
        if let Err(error) = options.set_param(&pair[0], &pair[1]) {
            log::error!("{error}");
            return EXIT_INPUT_ERROR;
        }
    }

    if env_logger::Builder::new().parse_filters(&options.log_level).try_init().is_err() {
        log::warn!("logger already initialized");
    }

    let problem = match load_instance(&cli.instance) {
        Ok(problem) => problem,
        Err(error) => {
            log::error!("{error}");
            return EXIT_INPUT_ERROR;
        }
    };

    let mut termination = build_termination(&options);
    let mut message_handler = LoggingMessageHandler;
    let result = solve_problem(
        problem,
        &options,
        ReferenceSimplex::new(),
        &mut termination,
        &mut message_handler,
    );

    match result {
        Ok(solved) => solved.status.exit_code(),
        Err(error) => {
            log::error!("{error}");
            EXIT_INTERNAL_ERROR
        }
    }
}

/// Parses the small line-oriented instance format:
///
/// ```text
/// SENSE MIN|MAX
/// VAR <lower> <upper> INT|CONT <objective-coefficient>
/// ROW <lower> <upper> <var-index>:<coefficient> ...
/// CONE LORENTZ|ROTATED <var-index> <var-index> ...
/// ```
///
/// Blank lines and lines starting with `#` are ignored.
fn load_instance(path: &Path) -> crate::basic_types::Result<Problem> {
    let text = fs::read_to_string(path)
        .map_err(|error| BranchConeError::InstanceReadError(format!("reading {}: {error}", path.display())))?;

    let mut builder = ProblemBuilder::new();
    for (line_number, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();
        let rest: Vec<&str> = tokens.collect();
        let parse_error =
            |message: String| BranchConeError::InstanceReadError(format!("line {}: {message}", line_number + 1));

        match keyword {
            "SENSE" => {
                let sense = match rest.first().copied() {
                    Some("MIN") => Sense::Minimize,
                    Some("MAX") => Sense::Maximize,
                    other => return Err(parse_error(format!("expected MIN or MAX, found {other:?}"))),
                };
                builder.set_sense(sense);
            }
            "VAR" => {
                if rest.len() != 4 {
                    return Err(parse_error("VAR needs lower, upper, INT|CONT, objective".into()));
                }
                let lower_bound = parse_f64(rest[0], &parse_error)?;
                let upper_bound = parse_f64(rest[1], &parse_error)?;
                let integer = match rest[2] {
                    "INT" => true,
                    "CONT" => false,
                    other => return Err(parse_error(format!("expected INT or CONT, found {other}"))),
                };
                let coefficient = parse_f64(rest[3], &parse_error)?;
                let variable = builder.add_variable(lower_bound, upper_bound, integer)?;
                builder.set_objective_coefficient(variable, coefficient);
            }
            "ROW" => {
                if rest.len() < 3 {
                    return Err(parse_error("ROW needs lower, upper, and at least one entry".into()));
                }
                let lower_bound = parse_f64(rest[0], &parse_error)?;
                let upper_bound = parse_f64(rest[1], &parse_error)?;
                let mut entries = Vec::with_capacity(rest.len() - 2);
                for token in &rest[2..] {
                    let (index, coefficient) = token
                        .split_once(':')
                        .ok_or_else(|| parse_error(format!("expected var-index:coefficient, found {token}")))?;
                    let index: u32 = index
                        .parse()
                        .map_err(|_| parse_error(format!("invalid variable index {index}")))?;
                    let coefficient = parse_f64(coefficient, &parse_error)?;
                    entries.push((crate::basic_types::VariableId(index), coefficient));
                }
                builder.add_linear_constraint(entries, lower_bound, upper_bound)?;
            }
            "CONE" => {
                if rest.len() < 2 {
                    return Err(parse_error("CONE needs a type and at least one member".into()));
                }
                let cone_type = match rest[0] {
                    "LORENTZ" => ConeType::Lorentz,
                    "ROTATED" => ConeType::RotatedLorentz,
                    other => return Err(parse_error(format!("unknown cone type {other}"))),
                };
                let mut members = Vec::with_capacity(rest.len() - 1);
                for token in &rest[1..] {
                    let index: u32 = token
                        .parse()
                        .map_err(|_| parse_error(format!("invalid variable index {token}")))?;
                    members.push(crate::basic_types::VariableId(index));
                }
                builder.add_conic_constraint(cone_type, members)?;
            }
            other => return Err(parse_error(format!("unknown keyword {other}"))),
        }
    }

    builder.build()
}

fn parse_f64(token: &str, parse_error: &impl Fn(String) -> BranchConeError) -> crate::basic_types::Result<f64> {
    match token {
        "inf" | "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        other => other.parse().map_err(|_| parse_error(format!("invalid number {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_small_instance() {
        let mut file = tempfile_with_content(
            "SENSE MAX\n\
             VAR 0 10 INT 2\n\
             VAR 0 10 CONT 1\n\
             ROW 0 6.5 0:1 1:1\n",
        );
        let problem = load_instance(file.path()).unwrap();
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.linear_constraints.len(), 1);
        file.flush().ok();
    }

    #[test]
    fn rejects_an_unknown_keyword() {
        let file = tempfile_with_content("FOO 1 2 3\n");
        assert!(load_instance(file.path()).is_err());
    }

    fn tempfile_with_content(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }
}
