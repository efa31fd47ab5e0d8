/*!

  A `Model` maps `BoolVariable`s to their respective truth values, indexed densely by variable. It
  is the satisfying assignment a [`CnfSolver`](crate::solver::CnfSolver) hands back after a `Sat`
  result; the PDR driver never inspects it directly, instead calling [`Model::filter_witness`] to
  pull out the cube of current- or next-state literals it actually needs (a CTI or a predecessor).

*/

use crate::cube::Cube;
use crate::lifted_bool::LiftedBool;
use crate::literal::{BoolVariable, Literal};

#[derive(Clone, Debug, Default)]
pub struct Model {
  assignments: Vec<LiftedBool>,
}

impl Model {
  pub fn new(assignments: Vec<LiftedBool>) -> Self {
    Model { assignments }
  }

  pub fn value(&self, var: BoolVariable) -> LiftedBool {
    self.assignments.get(var).copied().unwrap_or(LiftedBool::Undefined)
  }

  /// True iff the model assigns `lit` (i.e. `lit`'s underlying variable is not `Undefined` and
  /// agrees with `lit`'s sign).
  pub fn satisfies(&self, lit: Literal) -> bool {
    match self.value(lit.var()) {
      LiftedBool::True => !lit.is_negated(),
      LiftedBool::False => lit.is_negated(),
      LiftedBool::Undefined => false,
    }
  }

  /// Returns the sorted cube of every literal the model assigns (consistently, i.e. not
  /// `Undefined`) such that `pred` holds of that literal. This is how both CTIs and predecessors
  /// are extracted: `pred` is typically `LiteralRegistry::atom_is_current`.
  pub fn filter_witness(&self, pred: impl Fn(Literal) -> bool) -> Cube {
    let mut lits = Vec::new();
    for (var, value) in self.assignments.iter().enumerate() {
      let lit = match value {
        LiftedBool::True => Literal::new(var, false),
        LiftedBool::False => Literal::new(var, true),
        LiftedBool::Undefined => continue,
      };
      if pred(lit) {
        lits.push(lit);
      }
    }
    Cube::new(lits)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filter_witness_respects_predicate_and_sign() {
    let model = Model::new(vec![LiftedBool::True, LiftedBool::False, LiftedBool::Undefined]);
    let cube = model.filter_witness(|_| true);
    assert_eq!(cube.len(), 2);
    assert!(cube.contains(Literal::new(0, false)));
    assert!(cube.contains(Literal::new(1, true)));
  }

  #[test]
  fn satisfies_checks_sign_agreement() {
    let model = Model::new(vec![LiftedBool::True]);
    assert!(model.satisfies(Literal::new(0, false)));
    assert!(!model.satisfies(Literal::new(0, true)));
  }
}
