//! Tree Builder
//!
//! Turns the flat class -> parent mapping into a forest for navigation UIs.
//!
//! Roots are the names that have no declared parent: names only ever used
//! on the right of `extends`, plus classes declared without `extends`.
//! Each root is expanded depth-first on an explicit stack, so chain depth is
//! bounded by memory rather than the call stack; children keep mapping order.
//!
//! Classes whose parent chain loops never hang off a root. They are found
//! after expansion by checking that every declared class was placed, then
//! grouped into cycles with an SCC pass.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SchemaError};
use crate::schema::ClassMapping;

/// A node in the navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, children: Vec<TreeNode>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            children,
        }
    }

    pub fn leaf(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including self
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Depth-first search for a node by id
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// What to do with classes caught in an inheritance cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleHandling {
    /// Return [`SchemaError::Cycle`]
    #[default]
    Fail,
    /// Leave the cyclic classes out of the forest and log a warning
    Omit,
}

/// A node under construction during expansion
struct Frame<'a> {
    name: &'a str,
    /// index of the next child to visit
    next: usize,
    children: Vec<TreeNode>,
}

/// Two-pass forest builder over a [`ClassMapping`]
pub struct TreeBuilder<'a> {
    classes: &'a ClassMapping,
    /// parent name -> direct children, in mapping order
    children: IndexMap<&'a str, Vec<&'a str>>,
    roots: Vec<&'a str>,
    cycles: CycleHandling,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(classes: &'a ClassMapping) -> Self {
        let mut children: IndexMap<&str, Vec<&str>> = IndexMap::new();
        let mut referenced: IndexSet<&str> = IndexSet::new();
        let mut has_parent: HashSet<&str> = HashSet::new();

        for class in classes.iter() {
            match class.parent.as_deref() {
                Some(parent) => {
                    children.entry(parent).or_default().push(class.name.as_str());
                    referenced.insert(parent);
                    has_parent.insert(class.name.as_str());
                }
                None => {
                    referenced.insert(class.name.as_str());
                }
            }
        }

        let roots: Vec<&str> = referenced
            .into_iter()
            .filter(|name| !has_parent.contains(name))
            .collect();

        debug!(roots = roots.len(), parents = children.len(), "computed forest roots");

        Self {
            classes,
            children,
            roots,
            cycles: CycleHandling::default(),
        }
    }

    pub fn with_cycle_handling(mut self, cycles: CycleHandling) -> Self {
        self.cycles = cycles;
        self
    }

    /// Root names in discovery order
    pub fn roots(&self) -> &[&'a str] {
        &self.roots
    }

    /// Direct children of a name, in mapping order
    pub fn children_of(&self, name: &str) -> &[&'a str] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn build(&self) -> Result<Vec<TreeNode>> {
        let mut placed: HashSet<&str> = HashSet::new();
        let mut forest = Vec::with_capacity(self.roots.len());

        for &root in &self.roots {
            forest.push(self.expand(root, &mut placed)?);
        }

        let unplaced: Vec<&str> = self
            .classes
            .names()
            .filter(|name| !placed.contains(name))
            .collect();

        if !unplaced.is_empty() {
            let cycles = self.cycle_chains(&unplaced);
            match self.cycles {
                CycleHandling::Fail => {
                    let members = cycles.into_iter().next().unwrap_or_default();
                    return Err(SchemaError::Cycle { members });
                }
                CycleHandling::Omit => {
                    for chain in &cycles {
                        warn!(cycle = %chain.join(" -> "), "omitting classes in inheritance cycle");
                    }
                    warn!(omitted = unplaced.len(), "classes left out of the tree");
                }
            }
        }

        Ok(forest)
    }

    /// Depth-first expansion of one root on an explicit stack.
    ///
    /// `path` holds the names from the root down to the frame on top, so a
    /// name seen twice on it is a cycle. Nodes are assembled bottom-up as
    /// their frames are popped.
    fn expand(&self, root: &'a str, placed: &mut HashSet<&'a str>) -> Result<TreeNode> {
        let mut path: IndexSet<&'a str> = IndexSet::new();
        let mut stack: Vec<Frame<'a>> = Vec::new();
        Self::enter(root, &mut path, &mut stack)?;
        placed.insert(root);

        while let Some(frame) = stack.last_mut() {
            match self.children_of(frame.name).get(frame.next).copied() {
                Some(child) => {
                    frame.next += 1;
                    Self::enter(child, &mut path, &mut stack)?;
                    placed.insert(child);
                }
                None => {
                    let Some(done) = stack.pop() else { break };
                    path.pop();
                    let node = TreeNode::new(done.name, done.children);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }
            }
        }

        Ok(TreeNode::leaf(root))
    }

    fn enter(name: &'a str, path: &mut IndexSet<&'a str>, stack: &mut Vec<Frame<'a>>) -> Result<()> {
        if let Some(index) = path.get_index_of(name) {
            let mut members: Vec<String> = path.iter().skip(index).map(|n| n.to_string()).collect();
            members.push(name.to_string());
            return Err(SchemaError::Cycle { members });
        }

        path.insert(name);
        stack.push(Frame {
            name,
            next: 0,
            children: Vec::new(),
        });
        Ok(())
    }

    /// Group unplaced classes into cycles, each rendered `A -> B -> A`.
    ///
    /// Classes that merely descend from a cycle are unplaced too but form
    /// no cycle of their own.
    fn cycle_chains(&self, unplaced: &[&'a str]) -> Vec<Vec<String>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let indices: HashMap<&str, NodeIndex> =
            unplaced.iter().map(|&name| (name, graph.add_node(name))).collect();

        for &name in unplaced {
            let parent = self.classes.get(name).and_then(|c| c.parent.as_deref());
            if let Some(&to) = parent.and_then(|p| indices.get(p)) {
                graph.add_edge(indices[name], to, ());
            }
        }

        let order: HashMap<&str, usize> = unplaced.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let mut chains: Vec<(usize, Vec<String>)> = kosaraju_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .filter_map(|scc| {
                let start = scc.iter().map(|&idx| graph[idx]).min_by_key(|n| order[n])?;
                Some((order[start], self.walk_parents(start)))
            })
            .collect();

        chains.sort_by_key(|(position, _)| *position);
        chains.into_iter().map(|(_, chain)| chain).collect()
    }

    /// Follow parents from `start` until it comes around again
    fn walk_parents(&self, start: &str) -> Vec<String> {
        let mut chain = vec![start.to_string()];
        let mut current = start;
        while let Some(parent) = self.classes.get(current).and_then(|c| c.parent.as_deref()) {
            chain.push(parent.to_string());
            if parent == start || chain.len() > self.classes.len() + 1 {
                break;
            }
            current = parent;
        }
        chain
    }
}

/// Build the navigation forest, failing on inheritance cycles
pub fn build_forest(classes: &ClassMapping) -> Result<Vec<TreeNode>> {
    TreeBuilder::new(classes).build()
}
