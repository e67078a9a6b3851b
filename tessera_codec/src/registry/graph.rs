use crate::codec::CodecRef;
use crate::error::CompileError;
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::{HashMap, VecDeque};
use tessera_types::Schema;

/// Named nodes of one submitted schema tree, and which named nodes each directly contains.
///
/// A node already registered by an earlier compile is not part of the graph. It is
/// neither walked nor ordered, only looked up.
#[derive(Debug, Default)]
pub struct DependencyGraph<'s> {
    nodes: IndexMap<&'s str, &'s Schema>,
    deps: IndexMap<&'s str, Vec<&'s str>>,
    references: Vec<&'s str>,
}

impl<'s> DependencyGraph<'s> {
    /// @return Err if a `$ref` names a node that is neither in the tree nor registered.
    pub fn build(
        root: &'s Schema,
        registered: &HashMap<String, CodecRef>,
    ) -> Result<Self, CompileError> {
        let mut graph = Self::default();
        graph.visit(root, None, registered);

        let unknown = graph
            .references
            .iter()
            .find(|id| !graph.nodes.contains_key(*id) && !registered.contains_key(**id));
        if let Some(id) = unknown {
            return Err(CompileError::UnknownReference(id.to_string()));
        }
        Ok(graph)
    }

    fn visit(
        &mut self,
        schema: &'s Schema,
        owner: Option<&'s str>,
        registered: &HashMap<String, CodecRef>,
    ) {
        if let Some(reference) = schema.reference.as_deref() {
            self.references.push(reference);
            if let Some(owner) = owner {
                self.add_dep(owner, reference);
            }
            return;
        }

        let owner = match schema.id.as_deref() {
            None => owner,
            Some(id) => {
                if let Some(owner) = owner {
                    self.add_dep(owner, id);
                }
                if self.nodes.contains_key(id) || registered.contains_key(id) {
                    return;
                }
                self.nodes.insert(id, schema);
                self.deps.entry(id).or_default();
                Some(id)
            }
        };
        for child in schema.children() {
            self.visit(child, owner, registered);
        }
    }

    fn add_dep(&mut self, owner: &'s str, dep: &'s str) {
        self.deps.entry(owner).or_default().push(dep);
    }

    pub fn node(&self, id: &str) -> Option<&'s Schema> {
        self.nodes.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Kahn's algorithm. Dependencies come before their dependents, and otherwise
    /// nodes keep the order they were discovered in.
    ///
    /// @return Err listing every node that never reached in-degree zero.
    pub fn order(&self) -> Result<Vec<&'s str>, CompileError> {
        let mut in_degree = self
            .nodes
            .keys()
            .map(|id| (*id, 0usize))
            .collect::<HashMap<_, _>>();
        let mut dependents = HashMap::<&str, Vec<&str>>::new();
        for (owner, deps) in self.deps.iter() {
            for dep in deps.iter().unique() {
                if !self.nodes.contains_key(dep) {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(owner) {
                    *degree += 1;
                }
                dependents.entry(*dep).or_default().push(*owner);
            }
        }

        let mut queue = self
            .nodes
            .keys()
            .filter(|id| in_degree.get(*id) == Some(&0))
            .copied()
            .collect::<VecDeque<_>>();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for dependent in dependents.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let stuck = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(id, _)| id.to_string())
                .sorted()
                .collect();
            return Err(CompileError::Cycle(stuck));
        }
        Ok(order)
    }
}
