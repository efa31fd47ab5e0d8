/*!

  The immutable `(I, T, P, ¬P, Card(N))` bundle the Frame Store and PDR Driver consume. Built once
  from a [`Dag`] and a pebble bound; only `Card` changes, rebuilt by [`TransitionSystem::set_max_pebbles`]
  when the Incremental Controller tightens or loosens the bound.

  The transition relation encodes: flipping the pebble on `n` (from unpebbled to pebbled, or the
  reverse) requires every child of `n` to be pebbled both now and next.

*/

use crate::cube::Clause;
use crate::dag::Dag;
use crate::literal::{BoolVariable, Literal, LiteralRegistry};

/// `atmost(vars, n)`: at most `n` of `vars` may be true. Encoded via the sequential-counter
/// construction, which is linear in `vars.len() * n` and needs no native cardinality theory from
/// the backend — see [`at_most_sequential`].
fn at_most_sequential(vars: &[Literal], bound: usize, next_var: &mut BoolVariable) -> Vec<Clause> {
  let n = vars.len();
  if bound >= n {
    return Vec::new(); // constraint is vacuous
  }
  if bound == 0 {
    return vars.iter().map(|&v| vec![!v]).collect();
  }

  // Auxiliary registers s[i][j]: "at least j+1 of vars[0..=i] are true", for j in 0..bound.
  let mut s: Vec<Vec<Literal>> = Vec::with_capacity(n);
  for _ in 0..n {
    let mut row = Vec::with_capacity(bound);
    for _ in 0..bound {
      row.push(Literal::new(*next_var, false));
      *next_var += 1;
    }
    s.push(row);
  }

  let mut clauses = Vec::new();
  // x_0 -> s[0][0]
  clauses.push(vec![!vars[0], s[0][0]]);
  for j in 1..bound {
    clauses.push(vec![!s[0][j]]); // s[0][j] false for j>0: only one literal seen so far
  }

  for i in 1..n {
    clauses.push(vec![!vars[i], s[i][0]]);
    clauses.push(vec![!s[i - 1][0], s[i][0]]);
    for j in 1..bound {
      clauses.push(vec![!vars[i], !s[i - 1][j - 1], s[i][j]]);
      clauses.push(vec![!s[i - 1][j], s[i][j]]);
    }
    // if i-th register already saturated (bound-th count reached) and x_i true, contradiction
    clauses.push(vec![!vars[i], !s[i - 1][bound - 1]]);
  }

  clauses
}

#[derive(Clone, Debug)]
pub struct TransitionSystem {
  pub literals: LiteralRegistry,
  initial: Vec<Literal>,
  transition: Vec<Clause>,
  property: Vec<Clause>,
  negated_property: Vec<Clause>,
  cardinality: Vec<Clause>,
  max_pebbles: u32,
  final_pebbles: u32,
  next_aux_var: BoolVariable,
}

impl TransitionSystem {
  pub fn new(dag: &impl Dag, max_pebbles: u32) -> Self {
    let mut registry = LiteralRegistry::new();
    for node in dag.nodes() {
      registry.add(node.clone());
    }
    registry.finish();

    // I: every current-state atom false (no pebbles).
    let initial: Vec<Literal> = registry.cur_vec().into_iter().map(|l| !l).collect();

    let mut transition = Vec::new();
    for node in dag.nodes() {
      let i = registry.index_of(node).expect("node interned above");
      for child in dag.children(node) {
        let c = registry.index_of(child).expect("child interned above");
        let (n_i, n_c) = (registry.cur(i), registry.cur(c));
        let (p_i, p_c) = (registry.nxt(i), registry.nxt(c));
        transition.push(vec![n_i, !p_i, n_c]);
        transition.push(vec![!n_i, p_i, n_c]);
        transition.push(vec![n_i, !p_i, p_c]);
        transition.push(vec![!n_i, p_i, p_c]);
      }
    }

    // ¬P: some output unpebbled, or some non-output pebbled — this IS the pebbling goal's
    // negation. P's clausal form (`property`) is the disjunction of the same literals, which we
    // keep as a single clause per §3; `negated_property` stores the same atoms as a cube-shaped
    // assumption set for `check`.
    let mut property_disjuncts = Vec::new();
    let mut negated_property = Vec::new();
    for i in 0..registry.node_count() {
      let cur = registry.cur(i);
      if dag.is_output(dag.nodes()[i].as_str()) {
        property_disjuncts.push(!cur);
        negated_property.push(vec![cur]);
      } else {
        property_disjuncts.push(cur);
        negated_property.push(vec![!cur]);
      }
    }

    let final_pebbles = dag.outputs().len() as u32;
    let next_aux_var = registry.node_count() * 2;

    let mut system = TransitionSystem {
      literals: registry,
      initial,
      transition,
      property: vec![property_disjuncts],
      negated_property,
      cardinality: Vec::new(),
      max_pebbles,
      final_pebbles,
      next_aux_var,
    };
    system.set_max_pebbles(max_pebbles);
    system
  }

  /// Rebuilds only `Card(N)`; `T`, `I`, `P`, `¬P` never change after construction.
  pub fn set_max_pebbles(&mut self, max_pebbles: u32) {
    self.max_pebbles = max_pebbles;
    let bound = max_pebbles as usize;
    let mut next_var = self.literals.node_count() * 2;
    let mut clauses = at_most_sequential(&self.literals.cur_vec(), bound, &mut next_var);
    clauses.extend(at_most_sequential(&self.literals.nxt_vec(), bound, &mut next_var));
    self.next_aux_var = next_var;
    self.cardinality = clauses;
  }

  pub fn max_pebbles(&self) -> u32 {
    self.max_pebbles
  }

  pub fn final_pebbles(&self) -> u32 {
    self.final_pebbles
  }

  pub fn initial(&self) -> &[Literal] {
    &self.initial
  }

  pub fn transition(&self) -> &[Clause] {
    &self.transition
  }

  pub fn property(&self) -> &[Clause] {
    &self.property
  }

  /// `¬P` as an assumption cube: asserting all of these literals forces the goal state.
  pub fn negated_property_cube(&self) -> Vec<Literal> {
    self.negated_property.iter().map(|clause| clause[0]).collect()
  }

  /// `¬P` with every literal primed — the assumption set for checking `I ∧ T ⊨ ¬(¬P)'` and
  /// `F_i ∧ T ⊨ ¬(¬P)'`.
  pub fn negated_property_primed(&self) -> Vec<Literal> {
    self.negated_property_cube().into_iter().map(|l| self.literals.primed(l)).collect()
  }

  pub fn cardinality(&self) -> &[Clause] {
    &self.cardinality
  }

  /// All clauses an incremental solver needs as its fixed base assertions: `T ∧ Card`.
  pub fn base_assertions(&self) -> Vec<Clause> {
    let mut base = self.transition.clone();
    base.extend(self.cardinality.iter().cloned());
    base
  }

  /// Total number of boolean variables in play, including cardinality auxiliaries — needed to
  /// size a solver's assignment vector.
  pub fn num_vars(&self) -> usize {
    self.next_aux_var
  }
}
