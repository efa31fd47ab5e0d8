/*!

  The PDR Driver (§4.5): initiation, the blocking/extension/propagation main loop, and the
  obligation-queue inner loop, built directly over this crate's [`FrameStore`]/[`TransitionSystem`]
  types.

*/

use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::cube::Cube;
use crate::data_structures::statistics::Statistics;
use crate::errors::{BackendFailure, Error};
use crate::frame::{Encoding, FrameStore};
use crate::generalize::{generalize, highest_inductive_frame};
use crate::obligation::{Obligation, ObligationQueue};
use crate::result::Outcome;
use crate::state::State;
use crate::transition_system::TransitionSystem;

/// An externally imposed cutoff (§5): `None` never expires. Checked before dequeuing each
/// obligation and before each major loop iteration; once passed, `run` returns
/// `Error::Backend(BackendFailure::TimedOut)` and the driver must be discarded, not reused.
#[derive(Clone, Copy, Debug, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
  pub fn none() -> Self {
    Deadline(None)
  }

  pub fn at(instant: Instant) -> Self {
    Deadline(Some(instant))
  }

  pub fn has_passed(&self) -> bool {
    self.0.is_some_and(|t| Instant::now() >= t)
  }

  fn check(&self) -> Result<(), Error> {
    if self.has_passed() {
      Err(Error::Backend(BackendFailure::TimedOut))
    } else {
      Ok(())
    }
  }
}

pub struct Pdr {
  frames: FrameStore,
  transition: TransitionSystem,
  config: Config,
  k: usize,
  bad: Option<Rc<State>>,
  /// True when `bad`'s cube already *is* the literal `¬P` assignment (the goal reached with no
  /// remaining transition), rather than merely a one-step predecessor of it. `trace_outcome`
  /// appends the goal cube to `bad`'s chain unless this is set.
  bad_is_goal: bool,
  statistics: Statistics,
}

impl Pdr {
  pub fn new(transition: TransitionSystem, config: Config) -> Self {
    let encoding = if config.delta_encoding { Encoding::Delta } else { Encoding::PerFrame };
    let frames = FrameStore::with_seed(
      encoding,
      transition.literals.clone(),
      transition.initial().to_vec(),
      transition.base_assertions(),
      transition.num_vars(),
      config.rng_seed,
    );
    Pdr { frames, transition, config, k: 0, bad: None, bad_is_goal: false, statistics: Statistics::new() }
  }

  /// Per-level timed counters: CTIs found, obligations handled, and propagation passes run.
  pub fn statistics(&self) -> &Statistics {
    &self.statistics
  }

  fn bump(&mut self, key: &'static str) {
    let counter = self.statistics.entry(key).or_insert(0usize.into());
    if let crate::data_structures::statistics::Statistic::Integer(n) = counter {
      *n += 1;
    }
  }

  /// Runs `init` then `iterate` to completion, translating the driver's internal state into an
  /// [`Outcome`]. `deadline` is consulted before each major loop iteration and before dequeuing
  /// each obligation; on expiry this returns `Err(Error::Backend(BackendFailure::TimedOut))` and
  /// `self` must not be reused.
  #[instrument(skip(self, deadline), fields(max_pebbles = self.transition.max_pebbles()))]
  pub fn run(&mut self, deadline: Deadline) -> Result<Outcome, Error> {
    if self.transition.max_pebbles() < self.transition.final_pebbles() {
      return Ok(Outcome::Infeasible);
    }

    if !self.init()? {
      return Ok(self.trace_outcome());
    }

    if self.iterate(deadline)? {
      Ok(self.invariant_outcome())
    } else {
      Ok(self.trace_outcome())
    }
  }

  fn invariant_outcome(&self) -> Outcome {
    let frame_index = self.frames.frontier();
    let invariant_cubes = self.frames.frame(frame_index).cubes().to_vec();
    Outcome::Invariant { frame_index, invariant_cubes }
  }

  fn trace_outcome(&self) -> Outcome {
    let bad = self.bad.clone().expect("trace_outcome called without a counterexample");
    let mut states: Vec<Cube> = bad.trace().into_iter().map(|s| s.cube.clone()).collect();
    if !self.bad_is_goal {
      states.push(Cube::new(self.transition.negated_property_cube()));
    }
    let pebbled_counts = crate::result::pebbled_counts(&states);
    Outcome::Trace { states, pebbled_counts }
  }

  /// §4.5 `init`. Returns `false` (with `self.bad` set) if the property already fails within one
  /// step of `I`.
  #[instrument(skip(self))]
  fn init(&mut self) -> Result<bool, Error> {
    let not_p = self.transition.negated_property_cube();
    if self.frames.check_initiation(&not_p)?.is_sat() {
      info!("I does not imply P");
      self.bad = Some(State::new(Cube::new(self.transition.initial().to_vec())));
      self.bad_is_goal = true;
      return Ok(false);
    }

    let not_p_next = self.transition.negated_property_primed();
    if let Some(cti) = self.frames.get_trans_from_init(&not_p_next)? {
      info!("I & T does not imply P'");
      self.bad = Some(State::new(cti));
      return Ok(false);
    }

    self.frames.extend();
    self.k = 1;
    Ok(true)
  }

  /// §4.5 `iterate`: the blocking/extension/propagation main loop.
  #[instrument(skip(self, deadline))]
  fn iterate(&mut self, deadline: Deadline) -> Result<bool, Error> {
    loop {
      deadline.check()?;
      debug!(level = self.k, "start iteration");
      loop {
        let target_primed = self.transition.negated_property_primed();
        let cti_current = match self.frames.get_trans_from_to(self.k, &target_primed)? {
          Some(cti) => cti,
          None => break,
        };
        self.bump("ctis_found");

        let (n, core) = highest_inductive_frame(&mut self.frames, &cti_current, self.k as i64 - 1, self.k)?;
        let n = usize::try_from(n).map_err(|_| {
          Error::Invariant("highest_inductive_frame returned a negative level for a CTI found at the frontier".into())
        })?;

        let smaller_cti = generalize(&mut self.frames, &core, n, self.config.mic_retries)?;
        self.frames.remove_state(&smaller_cti, n + 1);

        if !self.block(cti_current, n + 1, self.k, deadline)? {
          return Ok(false);
        }
      }

      self.frames.extend();
      self.bump("propagation_passes");
      let converged = self.frames.propagate(self.k)?;
      self.k += 1;

      if converged.is_some() {
        return Ok(true);
      }
    }
  }

  /// §4.5's obligation queue. Returns `false` (with `self.bad` set) if a state is ever found to
  /// intersect `I`.
  fn block(&mut self, cti: Cube, n: usize, level: usize, deadline: Deadline) -> Result<bool, Error> {
    let root = State::new(cti);
    let mut queue = ObligationQueue::new();
    if n <= level {
      queue.push(Obligation::new(n, Rc::clone(&root), 0));
    }

    while let Some(Obligation { frame_level: n, state, depth }) = {
      deadline.check()?;
      queue.pop()
    } {
      self.bump("obligations_handled");
      match self.frames.counter_to_inductiveness(&state.cube, n)? {
        Some(pred_cube) => {
          let pred = State::with_parent(pred_cube, Rc::clone(&state));
          let (m, core) = highest_inductive_frame(&mut self.frames, &pred.cube, n as i64 - 1, level)?;

          if m < 0 {
            self.bad = Some(pred);
            return Ok(false);
          }

          let m = m as usize;
          let smaller_pred = generalize(&mut self.frames, &core, m, self.config.mic_retries)?;
          self.frames.remove_state(&smaller_pred, m + 1);

          // The original obligation is not discharged by finding a predecessor — it is
          // re-queued unchanged, and will be reprocessed once the new blocking clauses at
          // `m + 1` have had a chance to change the outcome of its own induction check.
          queue.push(Obligation::new(n, Rc::clone(&state), depth));
          if m + 1 <= level {
            queue.push(Obligation::new(m + 1, pred, depth + 1));
          }
        }
        None => {
          let (m, core) = highest_inductive_frame(&mut self.frames, &state.cube, n as i64 + 1, level)?;

          if m < 0 {
            self.bad = Some(state);
            return Ok(false);
          }

          let m = m as usize;
          let smaller_state = generalize(&mut self.frames, &core, m, self.config.mic_retries)?;
          self.frames.remove_state(&smaller_state, m + 1);

          if m + 1 <= level {
            queue.push(Obligation::new(m + 1, state, depth));
          }
        }
      }
    }

    Ok(true)
  }

  pub fn frontier(&self) -> usize {
    self.k
  }

  pub fn transition(&self) -> &TransitionSystem {
    &self.transition
  }

  pub fn frames(&self) -> &FrameStore {
    &self.frames
  }

  /// Used by the Incremental Controller to tear down and rebuild against a new `Card(N)` while
  /// optionally reusing the current frame set (§4.7).
  pub fn into_parts(self) -> (FrameStore, TransitionSystem, Config, usize) {
    (self.frames, self.transition, self.config, self.k)
  }

  pub fn from_parts(frames: FrameStore, transition: TransitionSystem, config: Config, k: usize) -> Self {
    Pdr { frames, transition, config, k, bad: None, bad_is_goal: false, statistics: Statistics::new() }
  }
}
