/*!

  A `State` is one node of the backward counter-trace: the cube that must be shown unreachable,
  plus a link (`parent`) to the state it transitions *to* in the bad path. `bad` sits at the
  chain's far end — its own cube already intersects `I` — and walking `parent` from `bad` moves
  forward in time, one transition closer to the property violation at each step, until reaching
  the state with no parent: the CTI nearest the violation that `block` started from.

*/

use std::rc::Rc;

use crate::cube::Cube;

#[derive(Clone, Debug)]
pub struct State {
  pub cube: Cube,
  pub parent: Option<Rc<State>>,
}

impl State {
  pub fn new(cube: Cube) -> Rc<State> {
    Rc::new(State { cube, parent: None })
  }

  pub fn with_parent(cube: Cube, parent: Rc<State>) -> Rc<State> {
    Rc::new(State { cube, parent: Some(parent) })
  }

  /// Walks the chain from `self` toward its parent-less end, returning states in the order
  /// `self, self.parent, self.parent.parent, …`. Called on `bad`, this is already chronological
  /// order (earliest state first) — the order the trace is printed in, per §6:
  /// `I | … ; 1 | … ; … ; F | …`.
  pub fn trace(self: &Rc<State>) -> Vec<Rc<State>> {
    let mut states = Vec::new();
    let mut current = Some(Rc::clone(self));
    while let Some(state) = current {
      current = state.parent.clone();
      states.push(state);
    }
    states
  }
}
