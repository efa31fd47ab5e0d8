/*!

  Error kinds for the PDR engine, per §7: algorithmic outcomes (refutation, proof, infeasibility)
  are ordinary return values (see [`crate::result::Outcome`]); only contract violations and
  backend failures are errors.

*/

use thiserror::Error as DeriveError;

/// A failure in the solver backend itself, as opposed to a contract violation by the engine.
#[derive(Clone, Eq, PartialEq, Debug, Hash, DeriveError)]
pub enum BackendFailure {
  #[error("solver exceeded its configured deadline")]
  TimedOut,
  #[error("solver backend crashed: {0}")]
  Crashed(String),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, DeriveError)]
pub enum Error {
  /// A postcondition of the Frame Store or Solver Handle was broken: a duplicate insert of a
  /// subsumption-equal cube outside `block_in`, the solver returned `Unknown`, or an unsat core
  /// was requested when none is available. Fatal; the driver must not continue.
  #[error("PDR invariant violated: {0}")]
  Invariant(String),

  /// The requested pebble bound is below `final_pebbles()`. Most callers see this as
  /// [`crate::result::Outcome::Infeasible`] rather than this variant; it exists so that API
  /// boundaries which only want `Invariant`/`Backend` to be fatal can still `?`-propagate it.
  #[error("pebble bound {requested} is below the minimum of {minimum} output pebbles")]
  Infeasible { requested: u32, minimum: u32 },

  /// The solver backend failed outright. The engine's state becomes undefined; the instance
  /// that produced this error must be discarded, never reused.
  #[error("solver backend failure: {0}")]
  Backend(#[from] BackendFailure),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invariant_error_carries_its_message() {
    let err = Error::Invariant("duplicate block of subsumption-equal cube".to_string());
    assert!(err.to_string().contains("duplicate block"));
  }

  #[test]
  fn backend_failure_converts_via_from() {
    let err: Error = BackendFailure::TimedOut.into();
    matches!(err, Error::Backend(BackendFailure::TimedOut));
  }
}
