/*!

  The Result type the core hands back to its caller (§6): either the property holds, witnessed by
  an inductive invariant, or it doesn't, witnessed by a concrete pebbling trace.

*/

use crate::cube::Cube;
use crate::literal::LiteralRegistry;

#[derive(Clone, Debug)]
pub enum Outcome {
  /// The property holds: `frame_index` is the level at which an inductive invariant was found,
  /// `invariant_cubes` the blocked cubes comprising it.
  Invariant { frame_index: usize, invariant_cubes: Vec<Cube> },
  /// The property fails: the counter-trace from the initial state to the violation, and the
  /// pebble count at each step.
  Trace { states: Vec<Cube>, pebbled_counts: Vec<usize> },
  /// `set_max_pebbles(N)` was below `final_pebbles()`: unreachable without a backend query.
  Infeasible,
}

impl Outcome {
  pub fn is_property_verified(&self) -> bool {
    matches!(self, Outcome::Invariant { .. })
  }
}

/// Renders a trace the way §6 specifies: `I | [ … ] ; 1 | [ … ] ; … ; F | [ … ]`, left-aligned
/// step indices, each bracket listing the pebbled (non-negated) node names at that step. The
/// index column width is `⌈log10(trace_len)⌉`, matching the largest index actually printed.
pub fn render_trace(states: &[Cube], registry: &LiteralRegistry) -> String {
  if states.is_empty() {
    return String::new();
  }

  let last = states.len() - 1;
  let index_width = last.to_string().len().max(1);

  let mut lines = Vec::with_capacity(states.len());
  for (i, cube) in states.iter().enumerate() {
    let label = if i == 0 {
      "I".to_string()
    } else if i == last {
      "F".to_string()
    } else {
      i.to_string()
    };

    let mut names: Vec<&str> = cube.iter().filter(|l| !l.is_negated()).map(|l| registry.name(l.var())).collect();
    names.sort_unstable();

    lines.push(format!("{label:<index_width$} | [ {} ]", names.join(", ")));
  }

  lines.join(" ; ")
}

/// The per-step pebble count (number of non-negated literals) used alongside a rendered trace.
pub fn pebbled_counts(states: &[Cube]) -> Vec<usize> {
  states.iter().map(|cube| cube.iter().filter(|l| !l.is_negated()).count()).collect()
}
