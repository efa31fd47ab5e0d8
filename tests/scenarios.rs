//! End-to-end scenarios (§8): seed DAGs run through the full engine, checked against the
//! behavior the property list in §8 describes rather than against internal frame/solver state.

use pebbling_pdr::{
  decrement, increment_strategy, solve, Config, Dag, DecrementOutcome, InMemoryDagBuilder, Outcome,
  Pdr, Tactic, TransitionSystem,
};
use pebbling_pdr::Deadline;

fn run_basic(dag: &impl Dag, max_pebbles: u32) -> Outcome {
  let ts = TransitionSystem::new(dag, max_pebbles);
  let mut pdr = Pdr::new(ts, Config { max_pebbles, ..Config::default() });
  pdr.run(Deadline::none()).expect("run must not error on a well-formed instance")
}

/// No cube in `cubes` is subsumed by another distinct cube in the set — testable property 3.
fn no_internal_subsumption(cubes: &[pebbling_pdr::Cube]) -> bool {
  for (i, a) in cubes.iter().enumerate() {
    for (j, b) in cubes.iter().enumerate() {
      if i != j && a.subsumes(b) {
        return false;
      }
    }
  }
  true
}

// S1: single-node DAG (one output, no children), N=1. The sole node has no children, so the
// transition relation places no constraint on it at all; it can flip from unpebbled to pebbled in
// one step, and nothing in I rules that transition out. Expect a Trace whose final state pebbles
// the output.
#[test]
fn s1_single_node_is_pebbled_in_one_step() {
  let dag = InMemoryDagBuilder::new().node("a").output("a").build();
  let outcome = run_basic(&dag, 1);
  match outcome {
    Outcome::Trace { states, pebbled_counts } => {
      assert!(!states.is_empty());
      assert_eq!(states.len(), pebbled_counts.len());
      // the output must end up pebbled somewhere in the trace
      assert!(pebbled_counts.iter().any(|&c| c >= 1));
    }
    other => panic!("expected a trace for a trivially pebbled single node, got {other:?}"),
  }
}

// S2: two-node chain a -> b, b is output. Flipping b's pebble requires a pebbled both now and
// next; at that step a and b are simultaneously pebbled, which exceeds N=1. So N=1 can never reach
// the goal: the engine must prove the property (no trace exists), i.e. Outcome::Invariant. At
// N=2 the simultaneous pebbling is within bound and a Trace must be found.
#[test]
fn s2_chain_requires_two_pebbles_simultaneously() {
  let dag = InMemoryDagBuilder::new().node("a").node("b").edge("a", "b").output("b").build();

  let outcome_n1 = run_basic(&dag, 1);
  assert!(
    matches!(outcome_n1, Outcome::Invariant { .. } | Outcome::Infeasible),
    "N=1 must not find a pebbling strategy for a->b, got {outcome_n1:?}"
  );

  let outcome_n2 = run_basic(&dag, 2);
  match outcome_n2 {
    Outcome::Trace { pebbled_counts, .. } => {
      assert!(pebbled_counts.iter().any(|&c| c >= 2), "must pass through a step with both a and b pebbled");
    }
    other => panic!("expected a trace at N=2 for a->b, got {other:?}"),
  }
}

// S3: diamond a -> b, a -> c, b -> d, c -> d, d is output, N=3. A strategy must exist (pebbling
// every node simultaneously is always sufficient, and 3 is the node count minus one output-only
// requirement), and increment_strategy must find some minimal N not exceeding the node count.
#[test]
fn s3_diamond_has_a_strategy_and_a_minimal_bound() {
  let dag = InMemoryDagBuilder::new()
    .node("a")
    .node("b")
    .node("c")
    .node("d")
    .edge("a", "b")
    .edge("a", "c")
    .edge("b", "d")
    .edge("c", "d")
    .output("d")
    .build();

  let outcome = run_basic(&dag, 3);
  assert!(matches!(outcome, Outcome::Trace { .. }), "expected a strategy at N=3, got {outcome:?}");

  let (n, outcome) = increment_strategy(&dag, Config::default(), Deadline::none()).unwrap();
  assert!(n >= 1 && n <= 4, "minimal bound must be within [1, node_count], got {n}");
  assert!(matches!(outcome, Outcome::Trace { .. }));
}

// S4: a small combinational-style DAG with fan-in, standing in for the ISCAS-class benchmark
// family. A loose bound must refute (or at least not exceed the trivial upper bound) while the
// full-width bound always succeeds, and increment_strategy's answer must be reproducible.
#[test]
fn s4_small_combinational_dag_boundary_is_deterministic() {
  let dag = InMemoryDagBuilder::new()
    .node("i1")
    .node("i2")
    .node("i3")
    .node("g1")
    .node("g2")
    .node("g3")
    .edge("g1", "i1")
    .edge("g1", "i2")
    .edge("g2", "i2")
    .edge("g2", "i3")
    .edge("g3", "g1")
    .edge("g3", "g2")
    .output("g3")
    .build();

  let node_count = dag.nodes().len() as u32;

  let wide = run_basic(&dag, node_count);
  assert!(matches!(wide, Outcome::Trace { .. }), "pebbling every node must always succeed");

  let (n1, outcome1) = increment_strategy(&dag, Config::default(), Deadline::none()).unwrap();
  let (n2, outcome2) = increment_strategy(&dag, Config::default(), Deadline::none()).unwrap();
  assert_eq!(n1, n2, "identical inputs must find the same minimal bound (§5 determinism)");
  assert!(matches!(outcome1, Outcome::Trace { .. }));
  assert!(matches!(outcome2, Outcome::Trace { .. }));
}

// S5: decrement reuse on the diamond DAG from S3. After finding a strategy at N=3,
// decrement(reuse=true) must either find a strategy at a tighter bound or prove infeasibility —
// it must never error, and it must never be handed a bound below final_pebbles() as "continue".
#[test]
fn s5_decrement_reuse_on_diamond() {
  let dag = InMemoryDagBuilder::new()
    .node("a")
    .node("b")
    .node("c")
    .node("d")
    .edge("a", "b")
    .edge("a", "c")
    .edge("b", "d")
    .edge("c", "d")
    .output("d")
    .build();

  let ts = TransitionSystem::new(&dag, 3);
  let mut pdr = Pdr::new(ts, Config { max_pebbles: 3, ..Config::default() });
  let outcome = pdr.run(Deadline::none()).unwrap();

  let states = match outcome {
    Outcome::Trace { states, .. } => states,
    other => panic!("expected a trace at N=3 to seed the decrement, got {other:?}"),
  };

  match decrement(pdr, &dag, &states, true).unwrap() {
    DecrementOutcome::Infeasible => {}
    DecrementOutcome::ImmediateInvariant { .. } => {}
    DecrementOutcome::Continue(mut next) => {
      let tighter = next.run(Deadline::none()).unwrap();
      assert!(matches!(tighter, Outcome::Trace { .. } | Outcome::Invariant { .. }));
    }
  }
}

// S6: the chain a -> b from S2 at N=1 is exactly the case where no strategy can ever exist
// (reaching "b pebbled, a cleared" always passes through a state with both simultaneously
// pebbled, which N=1 forbids) — the property is provable, and whatever frame the search converges
// at, its cube set must carry no internal subsumption (testable property 3).
#[test]
fn s6_propagation_converges_without_internal_subsumption() {
  let dag = InMemoryDagBuilder::new().node("a").node("b").edge("a", "b").output("b").build();
  let outcome = run_basic(&dag, 1);
  match outcome {
    Outcome::Invariant { invariant_cubes, .. } => {
      assert!(no_internal_subsumption(&invariant_cubes));
    }
    other => panic!("N=1 can never pebble a->b, expected an Invariant, got {other:?}"),
  }
}

// Determinism (testable property 6): two runs with identical (DAG, N, seed, tactic) must agree on
// the outcome's shape (Trace vs Invariant) and, for a Trace, on the pebble-count profile.
#[test]
fn determinism_across_identical_runs() {
  let dag = InMemoryDagBuilder::new()
    .node("a")
    .node("b")
    .node("c")
    .edge("a", "b")
    .edge("b", "c")
    .output("c")
    .build();

  let config = Config { max_pebbles: 3, rng_seed: Some(7), tactic: Tactic::Basic, ..Config::default() };

  let outcome_a = solve(&dag, config.clone(), Deadline::none()).unwrap();
  let outcome_b = solve(&dag, config, Deadline::none()).unwrap();

  match (outcome_a, outcome_b) {
    (Outcome::Trace { pebbled_counts: a, .. }, Outcome::Trace { pebbled_counts: b, .. }) => {
      assert_eq!(a, b, "identical seeded runs must produce identical pebble-count profiles");
    }
    (Outcome::Invariant { frame_index: a, .. }, Outcome::Invariant { frame_index: b, .. }) => {
      assert_eq!(a, b, "identical seeded runs must converge at the same frame");
    }
    (a, b) => panic!("identical seeded runs diverged in outcome shape: {a:?} vs {b:?}"),
  }
}
