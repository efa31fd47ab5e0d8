/*!

  The DAG accessor the Transition System consumes. Parsing DAG input formats is explicitly out of
  scope (§1); this module supplies the accessor trait plus one plain in-memory implementation
  (`InMemoryDag`), since the data type itself — as opposed to the parser that produces one — is in
  scope per §1's own carve-out ("the DAG data type itself beyond the accessors the core
  requires").

*/

/// Read-only access to a pebbling DAG. Nodes are strings at this boundary; the
/// [`LiteralRegistry`](crate::literal::LiteralRegistry) interns them into dense indices once, at
/// `TransitionSystem` construction.
pub trait Dag {
  fn nodes(&self) -> &[String];
  fn children(&self, node: &str) -> &[String];
  fn is_output(&self, node: &str) -> bool;
  fn outputs(&self) -> Vec<&str> {
    self.nodes().iter().filter(|n| self.is_output(n)).map(String::as_str).collect()
  }
  fn inputs(&self) -> Vec<&str> {
    self.nodes().iter().filter(|n| self.children(n).is_empty()).map(String::as_str).collect()
  }
}

/// A plain owned adjacency-list DAG. Built with [`InMemoryDagBuilder`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryDag {
  nodes: Vec<String>,
  children: std::collections::HashMap<String, Vec<String>>,
  outputs: std::collections::HashSet<String>,
}

impl Dag for InMemoryDag {
  fn nodes(&self) -> &[String] {
    &self.nodes
  }

  fn children(&self, node: &str) -> &[String] {
    self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
  }

  fn is_output(&self, node: &str) -> bool {
    self.outputs.contains(node)
  }
}

/// Builds an [`InMemoryDag`] node-by-node; nodes must be declared with [`InMemoryDagBuilder::node`]
/// before they can appear as an edge endpoint or be marked as an output.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDagBuilder {
  dag: InMemoryDag,
}

impl InMemoryDagBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn node(mut self, name: impl Into<String>) -> Self {
    let name = name.into();
    if !self.dag.nodes.contains(&name) {
      self.dag.nodes.push(name);
    }
    self
  }

  /// Declares that `parent` depends on `child` (the pebbling precondition direction: `parent`
  /// can only be pebbled once `child` is pebbled).
  pub fn edge(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
    let parent = parent.into();
    let child = child.into();
    assert!(self.dag.nodes.contains(&parent), "unknown node {parent}");
    assert!(self.dag.nodes.contains(&child), "unknown node {child}");
    self.dag.children.entry(parent).or_default().push(child);
    self
  }

  pub fn output(mut self, name: impl Into<String>) -> Self {
    let name = name.into();
    assert!(self.dag.nodes.contains(&name), "unknown node {name}");
    self.dag.outputs.insert(name);
    self
  }

  pub fn build(self) -> InMemoryDag {
    self.dag
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_node_dag() {
    let dag = InMemoryDagBuilder::new().node("a").output("a").build();
    assert_eq!(dag.nodes(), &["a".to_string()]);
    assert!(dag.is_output("a"));
    assert!(dag.children("a").is_empty());
    assert_eq!(dag.inputs(), vec!["a"]);
  }

  #[test]
  fn chain_dag_tracks_children_and_outputs() {
    // a -> b, b is output
    let dag = InMemoryDagBuilder::new()
      .node("a")
      .node("b")
      .edge("a", "b")
      .output("b")
      .build();

    assert_eq!(dag.children("a"), &["b".to_string()]);
    assert!(dag.children("b").is_empty());
    assert_eq!(dag.outputs(), vec!["b"]);
    assert_eq!(dag.inputs(), vec!["b"]);
  }

  #[test]
  fn diamond_dag() {
    // a -> b, a -> c, b -> d, c -> d; d is output
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

    assert_eq!(dag.children("a").len(), 2);
    assert_eq!(dag.outputs(), vec!["d"]);
  }
}
