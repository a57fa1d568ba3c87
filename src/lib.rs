//! A branch-and-bound engine for mixed-integer second-order conic optimization
//! (MISOCO): mixed-integer linear programs plus Lorentz and rotated-Lorentz cone
//! constraints.
//!
//! The pieces compose roughly bottom-up:
//! - [`model`] describes a problem (variables, linear rows, conic rows).
//! - [`objects`] gives a uniform infeasibility/branching view over the three kinds
//!   of thing the search can act on.
//! - [`relaxation`] is the external-collaborator contract an LP/conic solver
//!   backend implements; [`relaxation::reference_simplex`] ships one.
//! - [`cuts`], [`branching`], and [`heuristics`] are pluggable strategy layers the
//!   [`driver::SearchDriver`] consults during the search.
//! - [`api`] is the embedding surface most callers want; [`runner`] is the CLI
//!   built on top of it.

pub mod api;
pub mod basic_types;
pub mod branching;
pub mod codec;
pub mod cuts;
pub mod driver;
pub mod heuristics;
pub mod messages;
pub mod model;
pub mod node;
pub mod objects;
pub mod options;
pub mod relaxation;
pub mod runner;
pub mod termination;

#[cfg(any(test, doc))]
pub mod testing;
