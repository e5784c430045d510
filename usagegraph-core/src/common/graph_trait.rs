//! Shared backward graph traversal abstraction.
//!
//! Provides a common interface for "who depends on me" walks, used by both
//! the class dependency graph and the method call hierarchy.

use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

/// Trait for walking a graph against the direction of its edges.
///
/// Implementors only say who the direct dependents of a node are; the
/// provided [`DependentWalk::witness_paths`] does the transitive walk.
///
/// # Example
/// ```ignore
/// impl DependentWalk for CallerIndex {
///     type Node = String;
///
///     fn dependents(&self, node: &String) -> Vec<String> {
///         self.callers.get(node).cloned().unwrap_or_default()
///     }
/// }
///
/// let paths = index.witness_paths("com.x.A.run".to_string());
/// ```
pub trait DependentWalk {
    /// The type used to identify nodes in the graph.
    type Node: Clone + Eq + Hash;

    /// Returns the direct dependents of a node, in a deterministic order.
    fn dependents(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Walks dependents transitively from `root` and records one witness
    /// path per dependent.
    ///
    /// Each path starts at the dependent and ends at `root`. Every node is
    /// visited at most once per call and the root itself is never reported,
    /// so cycles terminate. Nodes are visited in depth-first pre-order over
    /// the `dependents` order: the first path that reaches a node is kept
    /// (first path wins, which is not necessarily the shortest one).
    ///
    /// Uses an explicit stack, so deep graphs do not grow the call stack.
    ///
    /// # Returns
    /// `(dependent, path)` pairs in discovery order
    fn witness_paths(&self, root: Self::Node) -> Vec<(Self::Node, Vec<Self::Node>)> {
        let mut visited: HashSet<Self::Node> = HashSet::new();
        let mut found = Vec::new();
        let mut stack: Vec<(Self::Node, Rc<Vec<Self::Node>>)> = Vec::new();

        visited.insert(root.clone());
        let root_path = Rc::new(vec![root.clone()]);

        // Reverse so the first dependent is popped first
        for dependent in self.dependents(&root).into_iter().rev() {
            stack.push((dependent, Rc::clone(&root_path)));
        }

        while let Some((node, parent_path)) = stack.pop() {
            if !visited.insert(node.clone()) {
                continue;
            }

            let mut path = Vec::with_capacity(parent_path.len() + 1);
            path.push(node.clone());
            path.extend(parent_path.iter().cloned());
            let path = Rc::new(path);

            for dependent in self.dependents(&node).into_iter().rev() {
                if !visited.contains(&dependent) {
                    stack.push((dependent, Rc::clone(&path)));
                }
            }

            found.push((node, path.as_ref().clone()));
        }

        found
    }
}
