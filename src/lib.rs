/*!

IC3/PDR model checker specialized for the pebble game on a DAG (§1). The six components build in
dependency order: [`literal`] → [`transition_system`] → [`solver`] → [`frame`] → [`pdr`] →
[`incremental`]. [`dag`], [`cube`], [`obligation`], [`state`], [`generalize`], and [`result`] are
the data types and algorithms those six components are built out of; [`config`], [`errors`], and
[`data_structures`] are the ambient stack (configuration, error kinds, statistics) shared across
all of them.

*/

mod config;
mod cube;
mod dag;
mod data_structures;
mod errors;
mod frame;
mod generalize;
mod incremental;
mod lifted_bool;
mod literal;
mod model;
mod obligation;
mod pdr;
mod result;
mod solver;
mod state;
mod transition_system;

pub use config::{Config, Tactic};
pub use cube::{Clause, Cube};
pub use dag::{Dag, InMemoryDag, InMemoryDagBuilder};
pub use data_structures::{Statistic, Statistics};
pub use errors::{BackendFailure, Error};
pub use frame::{Encoding, FrameStore};
pub use generalize::{generalize, highest_inductive_frame};
pub use incremental::{decrement, increment_strategy, shortest_strategy, solve, DecrementOutcome};
pub use lifted_bool::LiftedBool;
pub use literal::{BoolVariable, Literal, LiteralRegistry, LiteralVector};
pub use model::Model;
pub use obligation::{Obligation, ObligationQueue};
pub use pdr::{Deadline, Pdr};
pub use result::{pebbled_counts, render_trace, Outcome};
pub use solver::{CheckOutcome, CnfSolver, SolverHandle};
pub use state::State;
pub use transition_system::TransitionSystem;
