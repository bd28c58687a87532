// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A generic, depth-first topological sort that is stable with respect to
//! declaration order.

use std::collections::HashMap;
use std::hash::Hash;

/// An error indicating that a cycle was detected in the graph.
///
/// `members` lists the nodes of one cycle in walk order, starting with the
/// first node of the cycle that was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<T> {
    /// The nodes forming the cycle.
    pub members: Vec<T>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Performs a topological sort on a generic directed graph.
///
/// The graph is defined by a collection of nodes and a set of directed edges
/// representing dependencies (from parent to child: the parent must come
/// first).
///
/// Nodes are visited in the order given, and each node's parents in the order
/// their edges were given, so independent nodes keep their relative order and
/// the result is deterministic for a given input. Edges naming a node outside
/// `nodes` are ignored.
///
/// # Type Parameters
///
/// * `T`: The type of the nodes in the graph. It must be hashable and equatable
///   to be used in internal maps.
///
/// # Arguments
///
/// * `nodes`: An iterator over the unique nodes in the graph.
/// * `edges`: An iterator over the directed edges, represented as `(parent, child)` tuples.
///
/// # Returns
///
/// * `Ok(Vec<T>)`: A vector of nodes in a valid topological order.
/// * `Err(CycleError)`: If the graph contains a cycle, naming its members.
pub fn topological_sort<T>(
    nodes: impl IntoIterator<Item = T>,
    edges: impl IntoIterator<Item = (T, T)>,
) -> Result<Vec<T>, CycleError<T>>
where
    T: Copy + Eq + Hash,
{
    let node_list: Vec<T> = nodes.into_iter().collect();
    if node_list.is_empty() {
        return Ok(Vec::new());
    }

    let position: HashMap<T, usize> = node_list
        .iter()
        .enumerate()
        .map(|(index, node)| (*node, index))
        .collect();

    // 1. Build, for every node, the list of its parents in edge order.
    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); node_list.len()];
    for (parent, child) in edges {
        if let (Some(&parent), Some(&child)) = (position.get(&parent), position.get(&child)) {
            parents[child].push(parent);
        }
    }

    // 2. Walk every node depth-first, emitting a node once all its parents are emitted.
    let mut marks = vec![Mark::Unvisited; node_list.len()];
    let mut sorted_list = Vec::with_capacity(node_list.len());
    let mut path: Vec<usize> = Vec::new();
    // Explicit stack of (node, index of the next parent to visit).
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..node_list.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        path.push(root);
        stack.push((root, 0));

        while let Some((node, next_parent)) = stack.last_mut() {
            let node = *node;
            if let Some(&parent) = parents[node].get(*next_parent) {
                *next_parent += 1;
                match marks[parent] {
                    Mark::Done => {}
                    Mark::Unvisited => {
                        marks[parent] = Mark::InProgress;
                        path.push(parent);
                        stack.push((parent, 0));
                    }
                    Mark::InProgress => {
                        // 3. A back edge: the cycle is the path suffix starting at `parent`.
                        let start = path.iter().rposition(|&n| n == parent).unwrap_or(0);
                        return Err(CycleError {
                            members: path[start..].iter().map(|&n| node_list[n]).collect(),
                        });
                    }
                }
            } else {
                marks[node] = Mark::Done;
                sorted_list.push(node_list[node]);
                path.pop();
                stack.pop();
            }
        }
    }

    Ok(sorted_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_before(order: &[&str], first: &str, second: &str) {
        let a = order.iter().position(|n| *n == first).unwrap();
        let b = order.iter().position(|n| *n == second).unwrap();
        assert!(a < b, "{first} should come before {second} in {order:?}");
    }

    #[test]
    fn test_empty_graph() {
        let sorted = topological_sort(Vec::<u32>::new(), Vec::new()).unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_chain() {
        let sorted = topological_sort(
            ["mouse", "display", "logger"],
            [("logger", "display"), ("display", "mouse"), ("logger", "mouse")],
        )
        .unwrap();
        assert_eq!(sorted, vec!["logger", "display", "mouse"]);
    }

    #[test]
    fn test_independent_nodes_keep_declaration_order() {
        let sorted = topological_sort(["c", "a", "b"], Vec::new()).unwrap();
        assert_eq!(sorted, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_diamond() {
        let sorted = topological_sort(
            ["top", "left", "right", "bottom"],
            [
                ("left", "top"),
                ("right", "top"),
                ("bottom", "left"),
                ("bottom", "right"),
            ],
        )
        .unwrap();
        assert_eq!(sorted.len(), 4);
        assert_before(&sorted, "bottom", "left");
        assert_before(&sorted, "bottom", "right");
        assert_before(&sorted, "left", "top");
        assert_before(&sorted, "right", "top");
    }

    #[test]
    fn test_two_cycle_names_both_members() {
        let err = topological_sort(
            ["mouse", "display"],
            [("display", "mouse"), ("mouse", "display")],
        )
        .unwrap_err();
        assert_eq!(err.members, vec!["mouse", "display"]);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let err = topological_sort(["solo"], [("solo", "solo")]).unwrap_err();
        assert_eq!(err.members, vec!["solo"]);
    }

    #[test]
    fn test_cycle_excludes_the_acyclic_prefix() {
        // entry -> a -> b -> c -> a
        let err = topological_sort(
            ["entry", "a", "b", "c"],
            [("a", "entry"), ("b", "a"), ("c", "b"), ("a", "c")],
        )
        .unwrap_err();
        assert_eq!(err.members, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_edges_to_unknown_nodes_are_ignored() {
        let sorted = topological_sort(["a"], [("ghost", "a")]).unwrap();
        assert_eq!(sorted, vec!["a"]);
    }
}
