/*!

  Configuration (§6): every knob the core exposes, kept small and serde-derived. This engine runs
  one algorithm, not a tunable portfolio of restart/phase-selection/GC strategies, so the config
  surface is exactly what §9's open questions and §4's component contracts reference.

*/

use serde::{Deserialize, Serialize};

/// Which restart strategy the Incremental Controller uses when a bound proves infeasible or an
/// invariant is found and a different bound is to be tried next.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
  /// Run once at the configured `max_pebbles`, no restart.
  Basic,
  /// On finding an invariant, decrement the bound and retry (optionally reusing frames).
  Decrement,
  /// On finding a trace, increment the bound and retry, capped by the DAG's node count.
  Increment,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Select [`crate::frame::Encoding::Delta`] over [`crate::frame::Encoding::PerFrame`].
  pub delta_encoding: bool,
  /// `MIC`'s drop-attempt budget (§4.6).
  pub mic_retries: u32,
  /// Propagated to the solver for reproducible tie-breaking; `None` means a fresh seed is drawn.
  pub rng_seed: Option<u64>,
  /// The initial cardinality bound.
  pub max_pebbles: u32,
  pub tactic: Tactic,
}

impl Default for Config {
  fn default() -> Self {
    Config { delta_encoding: false, mic_retries: 3, rng_seed: None, max_pebbles: 1, tactic: Tactic::Basic }
  }
}
