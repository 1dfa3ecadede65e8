//! Topological ordering of the nuclides in a dataset.
//!
//! Every parent precedes all of its progeny, which makes the decay-rate matrix
//! and its eigenvector matrices lower triangular. The order is computed once
//! per dataset; afterwards nuclides are addressed by dense integer position.

use std::collections::{BinaryHeap, HashMap, HashSet};

use nucdecay_core::{DatasetError, Nuclide, NuclideId};

/// Bijection between nuclide ids and matrix positions in topological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuclideIndex {
    order: Vec<NuclideId>,
    positions: HashMap<NuclideId, usize>,
}

impl NuclideIndex {
    /// Order `nuclides` so parents come before progeny (Kahn's algorithm).
    ///
    /// Among nuclides that are ready at the same time the heaviest goes first
    /// (descending A, then Z, then metastable state), so the order does not
    /// depend on input order.
    pub fn build(nuclides: &[Nuclide]) -> Result<Self, DatasetError> {
        let known: HashSet<NuclideId> = nuclides.iter().map(|n| n.id).collect();

        let mut edges: HashSet<(NuclideId, NuclideId)> = HashSet::new();
        let mut in_degree: HashMap<NuclideId, usize> = known.iter().map(|id| (*id, 0)).collect();
        let mut children: HashMap<NuclideId, Vec<NuclideId>> = HashMap::new();

        for nuclide in nuclides {
            for branch in &nuclide.progeny {
                if !known.contains(&branch.id) {
                    return Err(DatasetError::UnknownProgeny {
                        parent: nuclide.id.to_string(),
                        progeny: branch.id.to_string(),
                    });
                }
                if edges.insert((nuclide.id, branch.id)) {
                    *in_degree.entry(branch.id).or_default() += 1;
                    children.entry(nuclide.id).or_default().push(branch.id);
                }
            }
        }

        let priority = |id: NuclideId| (id.a(), id.z(), id.state(), id);
        let mut ready: BinaryHeap<_> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| priority(*id))
            .collect();

        let mut order = Vec::with_capacity(known.len());
        while let Some((_, _, _, id)) = ready.pop() {
            order.push(id);
            for child in children.get(&id).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(child) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(priority(*child));
                    }
                }
            }
        }

        if order.len() < known.len() {
            let mut stuck: Vec<NuclideId> = in_degree
                .into_iter()
                .filter(|(_, deg)| *deg > 0)
                .map(|(id, _)| id)
                .collect();
            stuck.sort();
            let names: Vec<String> = stuck.iter().map(|id| id.to_string()).collect();
            return Err(DatasetError::CyclicChain(names.join(", ")));
        }

        let positions = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Ok(Self { order, positions })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Matrix position of `id`.
    pub fn position(&self, id: NuclideId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Nuclide at matrix position `pos`.
    pub fn id(&self, pos: usize) -> Option<NuclideId> {
        self.order.get(pos).copied()
    }

    /// All ids in topological order.
    pub fn ids(&self) -> &[NuclideId] {
        &self.order
    }
}
