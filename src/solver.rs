/*!

  The Solver Handle: the incremental boolean-satisfiability capability the PDR core consumes
  (§4.3). Modeled as a trait so the backend can be swapped (e.g. for a mock in tests) rather than
  coupling the core to one concrete implementation.

  [`CnfSolver`] is the one concrete implementation: an incremental DPLL solver over a flat
  `Vec<Clause>`, with unit propagation to a fixpoint before every branch. It speaks the same
  two-watched-literal vocabulary (clauses, literals, assignment) a watch-list solver would, but
  rebuilds its propagation state fresh on every `check()` rather than maintaining watch lists
  incrementally — simpler to get right, and more than fast enough for the cube/clause counts a
  pebbling instance produces.

*/

use crate::cube::{Clause, Cube};
use crate::errors::Error;
use crate::lifted_bool::LiftedBool;
use crate::literal::{BoolVariable, Literal};
use crate::model::Model;

/// The result of a `check`. `Unsat` carries the (unminimized) subset of the assumptions that
/// participated in the conflict; callers filter/map it via [`CheckOutcome::unsat_core`].
pub enum CheckOutcome {
  Sat(Model),
  Unsat(Vec<Literal>),
}

impl CheckOutcome {
  pub fn is_sat(&self) -> bool {
    matches!(self, CheckOutcome::Sat(_))
  }

  /// Only meaningful on `Unsat`; `None` on `Sat` (`unsat_core` is a contract violation to call
  /// after `Sat`, per §4.3 — returning `Option` instead of panicking keeps that a normal check).
  pub fn unsat_core(&self, filter: impl Fn(Literal) -> bool, map: impl Fn(Literal) -> Literal) -> Option<Cube> {
    match self {
      CheckOutcome::Unsat(core) => Some(Cube::new(core.iter().copied().filter(|&l| filter(l)).map(map).collect())),
      CheckOutcome::Sat(_) => None,
    }
  }
}

pub trait SolverHandle {
  /// Adds a persistent clause, kept across `reset()`'s base assertions.
  fn assert_clause(&mut self, clause: Clause);

  /// `block(cube)`: asserts `¬cube`.
  fn block(&mut self, cube: &Cube);

  /// `block(cube, activation_lit)`: asserts `¬cube ∨ ¬activation_lit`, used by the delta
  /// encoding to toggle a cube's clause on only when `activation_lit` is asserted true.
  fn block_activated(&mut self, cube: &Cube, activation: Literal);

  fn check(&mut self, assumptions: &[Literal]) -> Result<CheckOutcome, Error>;

  /// Rebuilds the solver with only the fixed base assertions (`T ∧ Card`), dropping every cube
  /// blocked since construction.
  fn reset(&mut self);

  /// `reset()` followed by re-blocking every cube in `cubes`.
  fn reset_with(&mut self, cubes: &[Cube]) {
    self.reset();
    for cube in cubes {
      self.block(cube);
    }
  }

  /// Deterministic textual dump of the clauses asserted beyond the base assertions, for the
  /// diagnostic dumps §6 requires.
  fn dump(&self) -> String;
}

/// An incremental boolean solver over `Vec<Clause>`. Persistent: clauses added via
/// `assert_clause`/`block`/`block_activated` survive until an explicit `reset()`.
#[derive(Clone, Debug)]
pub struct CnfSolver {
  num_vars: usize,
  base_len: usize,
  clauses: Vec<Clause>,
  /// `Config::rng_seed` (§6): when set, branching order in [`dpll`] is a deterministic shuffle of
  /// the variables rather than index order, so that two runs with the same seed pick the same
  /// branch at every tie but different seeds explore different (still-deterministic) orders.
  branch_seed: Option<u64>,
}

impl CnfSolver {
  pub fn new(num_vars: usize, base_assertions: Vec<Clause>) -> Self {
    CnfSolver { num_vars, base_len: base_assertions.len(), clauses: base_assertions, branch_seed: None }
  }

  /// As [`CnfSolver::new`], but branching order is a deterministic shuffle keyed on `seed`
  /// instead of natural variable-index order.
  pub fn with_seed(num_vars: usize, base_assertions: Vec<Clause>, seed: u64) -> Self {
    let mut solver = Self::new(num_vars, base_assertions);
    solver.branch_seed = Some(seed);
    solver
  }

  /// The order `dpll` considers unassigned variables in: natural order with no seed, a seeded
  /// Fisher-Yates shuffle otherwise. Recomputed per call rather than cached, since `num_vars`
  /// grows over the solver's lifetime via [`CnfSolver::reserve_vars`].
  fn branch_order(&self) -> Vec<usize> {
    let mut order: Vec<usize> = (0..self.num_vars).collect();
    if let Some(seed) = self.branch_seed {
      use rand::SeedableRng;
      use rand::seq::SliceRandom;
      let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
      order.shuffle(&mut rng);
    }
    order
  }

  /// Allocates `count` fresh variables (e.g. per-level activation literals for the delta
  /// encoding) and returns them as positive literals.
  pub fn reserve_vars(&mut self, count: usize) -> Vec<Literal> {
    let fresh: Vec<Literal> = (self.num_vars..self.num_vars + count).map(|v| Literal::new(v, false)).collect();
    self.num_vars += count;
    fresh
  }

  fn with_assumptions(&self, assumptions: &[Literal]) -> Vec<Clause> {
    let mut clauses = self.clauses.clone();
    clauses.extend(assumptions.iter().map(|&lit| vec![lit]));
    clauses
  }

  /// Deletion-based core minimization: repeatedly drop an assumption literal if the remaining
  /// set (plus base clauses) is still unsatisfiable. `O(k^2)` solver calls in the number of
  /// assumptions `k`, which is fine at the cube sizes PDR produces.
  fn minimize_core(&self, assumptions: &[Literal]) -> Vec<Literal> {
    let mut core = assumptions.to_vec();
    let mut i = 0;
    while i < core.len() {
      let mut trial = core.clone();
      trial.remove(i);
      if dpll_solve(self.num_vars, &self.with_assumptions(&trial), &self.branch_order()).is_none() {
        core = trial;
      } else {
        i += 1;
      }
    }
    core
  }
}

impl SolverHandle for CnfSolver {
  fn assert_clause(&mut self, clause: Clause) {
    self.clauses.push(clause);
  }

  fn block(&mut self, cube: &Cube) {
    self.assert_clause(cube.negate());
  }

  fn block_activated(&mut self, cube: &Cube, activation: Literal) {
    let mut clause = cube.negate();
    clause.push(!activation);
    self.assert_clause(clause);
  }

  fn check(&mut self, assumptions: &[Literal]) -> Result<CheckOutcome, Error> {
    let clauses = self.with_assumptions(assumptions);
    match dpll_solve(self.num_vars, &clauses, &self.branch_order()) {
      Some(assignment) => Ok(CheckOutcome::Sat(Model::new(assignment))),
      None => Ok(CheckOutcome::Unsat(self.minimize_core(assumptions))),
    }
  }

  fn reset(&mut self) {
    self.clauses.truncate(self.base_len);
  }

  fn dump(&self) -> String {
    use itertools::Itertools;
    self.clauses[self.base_len..]
      .iter()
      .map(|clause| format!("- {}", clause.iter().map(Literal::to_string).join(" | ")))
      .join("\n")
  }
}

/// Plain recursive DPLL: unit-propagate to a fixpoint, then branch on the next unassigned
/// variable in `branch_order`. Returns the satisfying assignment (one [`LiftedBool`] per
/// variable) or `None`.
fn dpll_solve(num_vars: usize, clauses: &[Clause], branch_order: &[usize]) -> Option<Vec<LiftedBool>> {
  let mut assignment = vec![LiftedBool::Undefined; num_vars];
  if dpll(clauses, &mut assignment, branch_order) {
    Some(assignment)
  } else {
    None
  }
}

fn clause_value(clause: &Clause, assignment: &[LiftedBool]) -> LiftedBool {
  let mut any_undefined = false;
  for &lit in clause {
    match literal_value(lit, assignment) {
      LiftedBool::True => return LiftedBool::True,
      LiftedBool::Undefined => any_undefined = true,
      LiftedBool::False => {}
    }
  }
  if any_undefined {
    LiftedBool::Undefined
  } else {
    LiftedBool::False
  }
}

fn literal_value(lit: Literal, assignment: &[LiftedBool]) -> LiftedBool {
  let var_value = assignment[lit.var()];
  if lit.is_negated() {
    !var_value
  } else {
    var_value
  }
}

fn assign(lit: Literal, assignment: &mut [LiftedBool]) {
  assignment[lit.var()] = LiftedBool::from(!lit.is_negated());
}

/// Propagates unit clauses to a fixpoint. Returns `false` on conflict.
fn propagate(clauses: &[Clause], assignment: &mut [LiftedBool]) -> bool {
  loop {
    let mut changed = false;
    for clause in clauses {
      match clause_value(clause, assignment) {
        LiftedBool::False => return false,
        LiftedBool::True => continue,
        LiftedBool::Undefined => {
          let mut unassigned = None;
          let mut unit = true;
          for &lit in clause {
            if literal_value(lit, assignment) == LiftedBool::Undefined {
              if unassigned.is_some() {
                unit = false;
                break;
              }
              unassigned = Some(lit);
            }
          }
          if unit {
            if let Some(lit) = unassigned {
              assign(lit, assignment);
              changed = true;
            }
          }
        }
      }
    }
    if !changed {
      return true;
    }
  }
}

fn dpll(clauses: &[Clause], assignment: &mut Vec<LiftedBool>, branch_order: &[usize]) -> bool {
  let snapshot = assignment.clone();
  if !propagate(clauses, assignment) {
    *assignment = snapshot;
    return false;
  }

  let next_unassigned = branch_order.iter().copied().find(|&v| assignment[v] == LiftedBool::Undefined);
  let var = match next_unassigned {
    Some(var) => var,
    None => return clauses.iter().all(|c| clause_value(c, assignment) == LiftedBool::True),
  };

  assignment[var] = LiftedBool::True;
  if dpll(clauses, assignment, branch_order) {
    return true;
  }
  assignment[var] = LiftedBool::False;
  if dpll(clauses, assignment, branch_order) {
    return true;
  }

  *assignment = snapshot;
  false
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lit(v: BoolVariable, negated: bool) -> Literal {
    Literal::new(v, negated)
  }

  #[test]
  fn empty_base_is_trivially_sat() {
    let mut solver = CnfSolver::new(2, vec![]);
    let outcome = solver.check(&[]).unwrap();
    assert!(outcome.is_sat());
  }

  #[test]
  fn unit_propagation_finds_conflict() {
    // x & !x is unsat.
    let mut solver = CnfSolver::new(1, vec![vec![lit(0, false)], vec![lit(0, true)]]);
    let outcome = solver.check(&[]).unwrap();
    assert!(!outcome.is_sat());
  }

  #[test]
  fn block_asserts_negation_of_cube() {
    let mut solver = CnfSolver::new(1, vec![]);
    solver.block(&Cube::new(vec![lit(0, false)]));
    // now v0 must be false
    let outcome = solver.check(&[]).unwrap();
    match outcome {
      CheckOutcome::Sat(model) => assert!(model.satisfies(lit(0, true))),
      CheckOutcome::Unsat(_) => panic!("expected sat"),
    }
  }

  #[test]
  fn block_activated_only_fires_when_activation_true() {
    let mut solver = CnfSolver::new(2, vec![]);
    let cube = Cube::new(vec![lit(0, false)]);
    let activation = lit(1, false);
    solver.block_activated(&cube, activation);

    // without asserting the activation literal, v0=true remains satisfiable
    let outcome = solver.check(&[lit(0, false)]).unwrap();
    assert!(outcome.is_sat());

    // asserting the activation literal forces the cube to be blocked
    let outcome = solver.check(&[lit(0, false), activation]).unwrap();
    assert!(!outcome.is_sat());
  }

  #[test]
  fn unsat_core_is_subset_of_assumptions() {
    let mut solver = CnfSolver::new(1, vec![vec![lit(0, true)]]); // asserts !v0 permanently
    let outcome = solver.check(&[lit(0, false)]).unwrap();
    let core = outcome.unsat_core(|_| true, |l| l);
    assert_eq!(core.unwrap().as_slice(), &[lit(0, false)]);
  }

  #[test]
  fn reset_drops_blocked_cubes_but_keeps_base() {
    let mut solver = CnfSolver::new(1, vec![vec![lit(0, false)]]); // base: v0 must be true
    solver.block(&Cube::new(vec![lit(0, false)])); // now contradicts base
    assert!(!solver.check(&[]).unwrap().is_sat());
    solver.reset();
    assert!(solver.check(&[]).unwrap().is_sat());
  }

  #[test]
  fn seeded_branch_order_is_deterministic() {
    let clauses = vec![vec![lit(0, false), lit(1, false)], vec![lit(2, false), lit(3, true)]];
    let mut a = CnfSolver::with_seed(4, clauses.clone(), 42);
    let mut b = CnfSolver::with_seed(4, clauses, 42);
    let model_a = match a.check(&[]).unwrap() {
      CheckOutcome::Sat(m) => m,
      CheckOutcome::Unsat(_) => panic!("expected sat"),
    };
    let model_b = match b.check(&[]).unwrap() {
      CheckOutcome::Sat(m) => m,
      CheckOutcome::Unsat(_) => panic!("expected sat"),
    };
    for v in 0..4 {
      assert_eq!(model_a.value(v), model_b.value(v));
    }
  }
}
