/*!

  The Incremental Controller (§4.7): decrements or increments the pebble bound and restarts the
  driver, optionally reusing learned frames. Built over this crate's value-typed
  `Pdr`/`TransitionSystem`/`FrameStore`, so a bound change consumes and rebuilds these by value
  rather than mutating shared state in place.

*/

use tracing::{info, instrument};

use crate::config::{Config, Tactic};
use crate::cube::Cube;
use crate::dag::Dag;
use crate::errors::Error;
use crate::pdr::{Deadline, Pdr};
use crate::result::{pebbled_counts, Outcome};
use crate::transition_system::TransitionSystem;

/// What `decrement` learned about the tighter bound.
#[derive(Debug)]
pub enum DecrementOutcome {
  /// `shortest_strategy - 1` is below `final_pebbles()`: no tighter bound can ever succeed.
  Infeasible,
  /// The reused frames already furnish an invariant at the tighter bound without re-running
  /// `iterate` — `frame_index` is the level at which the frames converged.
  ImmediateInvariant { pdr: Pdr, frame_index: usize },
  /// A driver ready for `run` at the tighter bound, either fresh (`reuse = false`) or seeded with
  /// the prior run's blocked cubes (`reuse = true`).
  Continue(Pdr),
}

/// The largest number of simultaneously pebbled nodes at any step of `states` — the tightest `N`
/// the found strategy actually required. `decrement` retries one pebble below this.
pub fn shortest_strategy(states: &[Cube]) -> u32 {
  pebbled_counts(states).into_iter().max().unwrap_or(0) as u32
}

/// §4.7 `decrement(reuse)`. `pdr` must have just produced [`Outcome::Trace`] via `run`; `states`
/// is that trace. Consumes `pdr` and the DAG it was built against — a bound change rebuilds the
/// transition system's `Card(N)`, and, when `reuse` is false, `I`/`T`/`P` from scratch too.
#[instrument(skip(pdr, dag, states))]
pub fn decrement(pdr: Pdr, dag: &impl Dag, states: &[Cube], reuse: bool) -> Result<DecrementOutcome, Error> {
  let (frames, mut transition, config, _k) = pdr.into_parts();
  let new_pebbles = shortest_strategy(states).saturating_sub(1);

  if new_pebbles < transition.final_pebbles() {
    info!(new_pebbles, "tighter bound cannot pebble the outputs at all");
    return Ok(DecrementOutcome::Infeasible);
  }

  transition.set_max_pebbles(new_pebbles);
  info!(new_pebbles, "retrying with tighter bound");

  if !reuse {
    let fresh = Pdr::new(TransitionSystem::new(dag, new_pebbles), config);
    return Ok(DecrementOutcome::Continue(fresh));
  }

  let mut frames = frames;
  let prior_k = frames.frontier();
  frames.reset_frames(transition.base_assertions(), transition.num_vars(), true);

  let check_level = prior_k.saturating_sub(1).max(1).min(frames.frontier().max(1));
  if let Some(frame_index) = frames.propagate(check_level)? {
    let rebuilt = Pdr::from_parts(frames, transition, config, prior_k);
    return Ok(DecrementOutcome::ImmediateInvariant { pdr: rebuilt, frame_index });
  }

  Ok(DecrementOutcome::Continue(Pdr::from_parts(frames, transition, config, prior_k)))
}

/// §4.7 `increment_strategy`: starting at `N = final_pebbles()`, runs `Pdr` and increments `N`
/// on every `Trace` until either a strategy is found (the minimal feasible `N`) or `N` reaches
/// `node_count` — pebbling every node at once is always sufficient and always achievable, so
/// `N = |nodes|` is a hard upper bound on the search rather than an unbounded loop.
#[instrument(skip(dag, config))]
pub fn increment_strategy(dag: &impl Dag, config: Config, deadline: Deadline) -> Result<(u32, Outcome), Error> {
  let node_count = dag.nodes().len() as u32;
  let mut n = TransitionSystem::new(dag, 0).final_pebbles();

  loop {
    let mut pdr = Pdr::new(TransitionSystem::new(dag, n), config.clone());
    let outcome = pdr.run(deadline)?;
    // `Outcome::Trace` is a found pebbling strategy; `Outcome::Invariant` means the goal state is
    // unreachable at this bound (`N` is too tight).
    if matches!(outcome, Outcome::Trace { .. }) {
      info!(n, "minimal feasible pebble bound found");
      return Ok((n, outcome));
    }

    if n >= node_count {
      info!(n, "reached node count without finding a feasible bound");
      return Ok((n, outcome));
    }
    n += 1;
  }
}

/// Top-level entry point that dispatches on `config.tactic` (§6): `Basic` runs once at
/// `config.max_pebbles`; `Increment` delegates to [`increment_strategy`] (ignoring
/// `max_pebbles`, which `increment_strategy` derives its own starting bound from); `Decrement`
/// runs once at `max_pebbles` and, on every `Trace`, repeatedly reuses frames at the next tighter
/// bound until `decrement` reports `Infeasible`, settling on the minimal feasible bound found.
#[instrument(skip(dag, config))]
pub fn solve(dag: &impl Dag, config: Config, deadline: Deadline) -> Result<Outcome, Error> {
  match config.tactic {
    Tactic::Basic => {
      let mut pdr = Pdr::new(TransitionSystem::new(dag, config.max_pebbles), config);
      pdr.run(deadline)
    }

    Tactic::Increment => {
      let (_, outcome) = increment_strategy(dag, config, deadline)?;
      Ok(outcome)
    }

    Tactic::Decrement => {
      let mut pdr = Pdr::new(TransitionSystem::new(dag, config.max_pebbles), config);
      let mut outcome = pdr.run(deadline)?;

      loop {
        let states = match &outcome {
          Outcome::Trace { states, .. } => states.clone(),
          _ => break,
        };

        match decrement(pdr, dag, &states, true)? {
          DecrementOutcome::Infeasible => break,
          DecrementOutcome::ImmediateInvariant { pdr: rebuilt, frame_index } => {
            let invariant_cubes = rebuilt.frames().frame(frame_index).cubes().to_vec();
            outcome = Outcome::Invariant { frame_index, invariant_cubes };
            break;
          }
          DecrementOutcome::Continue(mut next) => {
            outcome = next.run(deadline)?;
            pdr = next;
          }
        }
      }

      Ok(outcome)
    }
  }
}
