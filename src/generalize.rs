/*!

  Generalization (§4.6): `highest_inductive_frame`, `MIC`, `down`, restated over [`Cube`]/
  [`FrameStore`] rather than a symbolic `expr_vector`/`solver` pair.

*/

use crate::cube::Cube;
use crate::errors::Error;
use crate::frame::FrameStore;

/// `highest_inductive_frame(cube, lo, hi)`: the greatest `i ∈ [max(1, lo), hi]` such that `cube`
/// is inductive relative to `F_i`, or `-1` if `cube` already intersects `I` (checked only when
/// `lo ≤ 0`). Returns `(highest, reduced_cube)`: `reduced_cube` is the unsat-core-shrunk cube when
/// a reduction was found to survive initiation, else the original `cube`.
pub fn highest_inductive_frame(
  frames: &mut FrameStore,
  cube: &Cube,
  lo: i64,
  hi: usize,
) -> Result<(i64, Cube), Error> {
  if lo <= 0 {
    let initiation_holds = {
      let assumptions: Vec<_> = cube.iter().copied().collect();
      !frames.check_initiation(&assumptions)?.is_sat()
    };
    if !initiation_holds {
      return Ok((-1, cube.clone()));
    }
  }

  let start = lo.max(1) as usize;
  let mut highest = hi as i64;
  for i in start..=hi {
    if !frames.inductive(cube, i)? {
      highest = i as i64 - 1;
      break;
    }
  }

  // `highest` is the greatest level at which `cube` was (or would be) found inductive; re-query
  // that level for the unsat core that witnessed it.
  if highest >= lo && highest >= 1 {
    if let Some(core) = frames.inductive_core(cube, highest as usize)? {
      let initiation_holds = !frames.check_initiation(core.as_slice())?.is_sat();
      if initiation_holds {
        return Ok((highest, core));
      }
    }
  }

  Ok((highest, cube.clone()))
}

/// `generalize(state, level)`: `MIC(state, level)`.
pub fn generalize(frames: &mut FrameStore, state: &Cube, level: usize, mic_retries: u32) -> Result<Cube, Error> {
  mic(frames, state, level, mic_retries)
}

/// Minimal inductive clause: repeatedly try to drop the literal at index `i` from the cube,
/// keeping the drop iff the result still survives `down`. Gives up on index `i` (advancing to
/// `i + 1`) after `mic_retries` consecutive failed attempts.
fn mic(frames: &mut FrameStore, cube: &Cube, level: usize, mic_retries: u32) -> Result<Cube, Error> {
  let mut cube = cube.clone();
  let mut i = 0;
  let mut attempts = 0;
  while i < cube.len() && attempts < mic_retries {
    let candidate = cube.without(i);
    if down(frames, &candidate, level)? {
      cube = candidate;
      attempts = 0;
      // i is left unchanged: it now indexes the next literal after the dropped one.
    } else {
      i += 1;
      attempts += 1;
    }
  }
  Ok(cube)
}

/// Strengthens `state` by iteratively intersecting it with counterexample-to-induction witnesses,
/// rejecting any candidate that intersects `I`.
fn down(frames: &mut FrameStore, state: &Cube, level: usize) -> Result<bool, Error> {
  let mut state = state.clone();
  loop {
    let intersects_initial = frames.check_initiation(state.as_slice())?.is_sat();
    if intersects_initial {
      return Ok(false);
    }

    match frames.counter_to_inductiveness(&state, level)? {
      Some(witness) => {
        state = witness.intersect(state.as_slice());
      }
      None => return Ok(true),
    }
  }
}
