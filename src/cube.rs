/*!

  A `Cube` is a conjunction of literals, stored sorted by [`Literal::id`]. The sorted
  representation is what makes `subsumes` linear instead of quadratic, and is required for
  [`Frame::equals`](crate::frame::Frame::equals) to be a straightforward element-wise comparison.

  A `Clause` is not a separate type: frames store cubes to block, and a cube's clause is simply
  its negation, computed on demand by [`Cube::negate`] when a cube is handed to the solver as a
  blocking clause.

*/

use crate::literal::Literal;

pub type Clause = Vec<Literal>;

/// A conjunction of literals, always kept sorted by [`Literal::id`] with no duplicates.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Default)]
pub struct Cube {
  literals: Vec<Literal>,
}

impl Cube {
  pub fn new(mut literals: Vec<Literal>) -> Self {
    literals.sort_by_key(Literal::id);
    literals.dedup();
    Cube { literals }
  }

  pub fn empty() -> Self {
    Cube { literals: Vec::new() }
  }

  pub fn as_slice(&self) -> &[Literal] {
    &self.literals
  }

  pub fn len(&self) -> usize {
    self.literals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.literals.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Literal> {
    self.literals.iter()
  }

  pub fn contains(&self, lit: Literal) -> bool {
    self.literals.binary_search_by_key(&lit.id(), Literal::id).is_ok()
  }

  /// `subsumes(a, b)` iff `as_set(a) ⊆ as_set(b)`: every literal in `self` also appears in
  /// `other`. Both cubes are sorted, so this is a linear merge.
  pub fn subsumes(&self, other: &Cube) -> bool {
    if self.literals.len() > other.literals.len() {
      return false;
    }
    let mut j = 0;
    for lit in &self.literals {
      while j < other.literals.len() && other.literals[j].id() < lit.id() {
        j += 1;
      }
      if j >= other.literals.len() || other.literals[j].id() != lit.id() {
        return false;
      }
      j += 1;
    }
    true
  }

  /// The clause obtained by negating every literal: `¬(l_1 ∧ … ∧ l_n) = ¬l_1 ∨ … ∨ ¬l_n`.
  pub fn negate(&self) -> Clause {
    self.literals.iter().map(|l| !*l).collect()
  }

  /// Intersects `self` with the literals in `other`, preserving sort order. Used by `down` to
  /// tighten a candidate cube against a counterexample-to-induction witness.
  pub fn intersect(&self, other: &[Literal]) -> Cube {
    let other_sorted: Vec<Literal> = {
      let mut v = other.to_vec();
      v.sort_by_key(Literal::id);
      v
    };
    let mut out = Vec::new();
    let mut j = 0;
    for lit in &self.literals {
      while j < other_sorted.len() && other_sorted[j].id() < lit.id() {
        j += 1;
      }
      if j < other_sorted.len() && other_sorted[j].id() == lit.id() {
        out.push(*lit);
      }
    }
    Cube { literals: out }
  }

  /// All literals of `self` except the one at `index`.
  pub fn without(&self, index: usize) -> Cube {
    let mut literals = self.literals.clone();
    literals.remove(index);
    Cube { literals }
  }
}

impl From<Vec<Literal>> for Cube {
  fn from(literals: Vec<Literal>) -> Self {
    Cube::new(literals)
  }
}

impl std::fmt::Display for Cube {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use itertools::Itertools;
    write!(f, "{}", self.literals.iter().map(|l| l.to_string()).join(" & "))
  }
}

impl<'a> IntoIterator for &'a Cube {
  type Item = &'a Literal;
  type IntoIter = std::slice::Iter<'a, Literal>;

  fn into_iter(self) -> Self::IntoIter {
    self.literals.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lit(id: usize) -> Literal {
    Literal::new(id, false)
  }

  #[test]
  fn subsumes_matches_subset_semantics() {
    let a = Cube::new(vec![lit(0), lit(1)]);
    let b = Cube::new(vec![lit(0), lit(1), lit(2)]);
    assert!(a.subsumes(&b));
    assert!(!b.subsumes(&a));

    let c = Cube::new(vec![lit(0), lit(3)]);
    assert!(!a.subsumes(&c));
    assert!(!c.subsumes(&a));
  }

  #[test]
  fn subsumes_is_reflexive() {
    let a = Cube::new(vec![lit(0), lit(5)]);
    assert!(a.subsumes(&a));
  }

  #[test]
  fn negate_flips_every_literal() {
    let cube = Cube::new(vec![lit(0), !lit(1)]);
    let clause = cube.negate();
    assert_eq!(clause, vec![!lit(0), lit(1)]);
  }

  #[test]
  fn intersect_keeps_common_literals_sorted() {
    let cube = Cube::new(vec![lit(0), lit(2), lit(4)]);
    let result = cube.intersect(&[lit(4), lit(0), lit(9)]);
    assert_eq!(result.as_slice(), &[lit(0), lit(4)]);
  }

  #[test]
  fn new_deduplicates_and_sorts() {
    let cube = Cube::new(vec![lit(3), lit(1), lit(3), lit(0)]);
    assert_eq!(cube.as_slice(), &[lit(0), lit(1), lit(3)]);
  }
}
