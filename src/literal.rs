/*!

  A `Literal` is a signed reference to a boolean variable: the variable `v` is represented by
  `2*v`, and its negation by `2*v + 1`.

  The `LiteralRegistry` doubles the variable space into a *current-state* half and a *next-state*
  half: a DAG node `n` occupies variable index `i` in the current half and `i + node_count` in the
  next half. `primed`/`unprimed` just shift by `node_count` — the bookkeeping a single-timeframe
  boolean solver has no need for on its own.

*/

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

pub type BoolVariable = usize;
pub type LiteralVector = Vec<Literal>;

/// A signed reference to a [`BoolVariable`]. The sign is stored in the low bit.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct Literal(BoolVariable);

impl Literal {
  pub const fn new(variable: BoolVariable, negated: bool) -> Literal {
    if negated {
      Literal((variable << 1) + 1)
    } else {
      Literal(variable << 1)
    }
  }

  /// The underlying variable, with sign stripped.
  pub const fn var(&self) -> BoolVariable {
    self.0 >> 1
  }

  pub const fn is_negated(&self) -> bool {
    (self.0 & 1) != 0
  }

  /// A stable total order key, used to keep cubes sorted. Identical to `self`'s natural order,
  /// named to document intent at call sites.
  pub const fn id(&self) -> usize {
    self.0
  }

  pub const fn negated(&self) -> Literal {
    Literal(self.0 ^ 1)
  }
}

impl std::ops::Not for Literal {
  type Output = Literal;

  fn not(self) -> Self::Output {
    self.negated()
  }
}

impl Display for Literal {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if self.is_negated() {
      write!(f, "!v{}", self.var())
    } else {
      write!(f, "v{}", self.var())
    }
  }
}

/// Bijection between DAG node names and the pair of literals `(cur(n), nxt(n))`.
///
/// Construction is two-phase: [`LiteralRegistry::add`] node names in DAG order, then
/// [`LiteralRegistry::finish`] freezes the mapping. Every lookup after `finish` is `O(1)`.
#[derive(Clone, Debug, Default)]
pub struct LiteralRegistry {
  names: Vec<String>,
  index_of: HashMap<String, BoolVariable>,
  finished: bool,
}

impl LiteralRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Interns `name`, returning its dense current-state index. Panics if called after `finish`.
  pub fn add(&mut self, name: impl Into<String>) -> BoolVariable {
    assert!(!self.finished, "LiteralRegistry::add called after finish()");
    let name = name.into();
    if let Some(&i) = self.index_of.get(&name) {
      return i;
    }
    let i = self.names.len();
    self.index_of.insert(name.clone(), i);
    self.names.push(name);
    i
  }

  pub fn finish(&mut self) {
    self.finished = true;
  }

  /// Number of DAG nodes (the size of the current-state half of the variable space).
  pub fn node_count(&self) -> usize {
    self.names.len()
  }

  pub fn name(&self, i: BoolVariable) -> &str {
    &self.names[i]
  }

  pub fn index_of(&self, name: &str) -> Option<BoolVariable> {
    self.index_of.get(name).copied()
  }

  /// The positive current-state literal for node `i`.
  pub fn cur(&self, i: BoolVariable) -> Literal {
    debug_assert!(i < self.node_count());
    Literal::new(i, false)
  }

  /// The positive next-state literal for node `i`.
  pub fn nxt(&self, i: BoolVariable) -> Literal {
    debug_assert!(i < self.node_count());
    Literal::new(i + self.node_count(), false)
  }

  pub fn cur_vec(&self) -> LiteralVector {
    (0..self.node_count()).map(|i| self.cur(i)).collect()
  }

  pub fn nxt_vec(&self) -> LiteralVector {
    (0..self.node_count()).map(|i| self.nxt(i)).collect()
  }

  pub fn is_current(&self, lit: Literal) -> bool {
    lit.var() < self.node_count()
  }

  pub fn is_next(&self, lit: Literal) -> bool {
    !self.is_current(lit)
  }

  /// True iff `lit`, ignoring sign, is a current-state atom (used to filter model witnesses).
  pub fn atom_is_current(&self, lit: Literal) -> bool {
    self.is_current(lit)
  }

  /// Maps a current-state literal to its next-state counterpart.
  pub fn primed(&self, lit: Literal) -> Literal {
    assert!(self.is_current(lit), "primed() called on a non-current literal");
    Literal::new(lit.var() + self.node_count(), lit.is_negated())
  }

  /// Maps a next-state literal back to its current-state counterpart.
  pub fn unprimed(&self, lit: Literal) -> Literal {
    assert!(self.is_next(lit), "unprimed() called on a non-next literal");
    Literal::new(lit.var() - self.node_count(), lit.is_negated())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dense_indices_starting_at_zero() {
    let mut reg = LiteralRegistry::new();
    assert_eq!(reg.add("a"), 0);
    assert_eq!(reg.add("b"), 1);
    assert_eq!(reg.add("a"), 0); // re-adding is idempotent
    reg.finish();
    assert_eq!(reg.node_count(), 2);
  }

  #[test]
  fn primed_unprimed_round_trip() {
    let mut reg = LiteralRegistry::new();
    reg.add("a");
    reg.add("b");
    reg.finish();

    let cur_a = reg.cur(0);
    let nxt_a = reg.primed(cur_a);
    assert!(reg.is_next(nxt_a));
    assert_eq!(reg.unprimed(nxt_a), cur_a);
    assert_eq!(nxt_a, reg.nxt(0));
  }

  #[test]
  fn sign_is_preserved_across_priming() {
    let mut reg = LiteralRegistry::new();
    reg.add("a");
    reg.finish();

    let neg_cur = !reg.cur(0);
    let neg_nxt = reg.primed(neg_cur);
    assert!(neg_nxt.is_negated());
    assert_eq!(reg.unprimed(neg_nxt), neg_cur);
  }

  #[test]
  fn atom_is_current_ignores_sign() {
    let mut reg = LiteralRegistry::new();
    reg.add("a");
    reg.finish();
    assert!(reg.atom_is_current(reg.cur(0)));
    assert!(reg.atom_is_current(!reg.cur(0)));
    assert!(!reg.atom_is_current(reg.nxt(0)));
  }
}
