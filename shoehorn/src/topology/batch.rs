use super::{Arc, ArcEnd, ArcId, End, Node, NodeId, PolygonRecord};
use crate::{
    core::{
        math::{Precision, Vector2},
        traits::Real,
    },
    geometry::PolygonId,
};
use log::debug;
use std::collections::BTreeMap;

/// Two nodes to merge when an arc collapses, `absorb` is folded into `keep`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NodeMerge {
    pub keep: NodeId,
    pub absorb: NodeId,
}

/// Bookkeeping for collapsing one arc, computed without touching the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsePlan {
    pub arc: ArcId,
    /// `(polygon, arc)` pairs to remove from polygon arc lists.
    pub removals: Vec<(PolygonId, ArcId)>,
    /// `None` for loop arcs (head and tail already the same node).
    pub merge: Option<NodeMerge>,
}

/// Result of applying a [CollapsePlan].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseOutcome {
    /// Polygons that lost the arc.
    pub affected: Vec<PolygonId>,
    /// Polygons whose arc list emptied, removed from the batch.
    pub destroyed: Vec<PolygonId>,
    /// Node remaining at the collapsed arc's position.
    pub surviving_node: Option<NodeId>,
}

/// Arc/node topology of one survey area.
///
/// Nodes and arcs live in dense tables addressed by integer id. Collapsed arcs leave a `None`
/// slot, merged nodes stay in the table with no ends and are redirected through the merge map.
#[derive(Debug, Clone)]
pub struct TopologyBatch<T = f64> {
    pub(crate) precision: Precision<T>,
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) arcs: Vec<Option<Arc<T>>>,
    pub(crate) polygons: BTreeMap<PolygonId, PolygonRecord>,
    pub(crate) merges: BTreeMap<NodeId, NodeId>,
}

impl<T> TopologyBatch<T>
where
    T: Real,
{
    pub(crate) fn new(precision: Precision<T>, arc_capacity: usize) -> Self {
        Self {
            precision,
            nodes: Vec::new(),
            arcs: vec![None; arc_capacity],
            polygons: BTreeMap::new(),
            merges: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn precision(&self) -> Precision<T> {
        self.precision
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.nodes.get_mut(id)
    }

    /// Ids of nodes that were not merged away, ascending.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter(move |id| !self.merges.contains_key(id))
    }

    /// Total size of the node table including merged nodes.
    #[inline]
    pub fn node_table_len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn arc(&self, id: ArcId) -> Option<&Arc<T>> {
        self.arcs.get(id).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn arc_mut(&mut self, id: ArcId) -> Option<&mut Arc<T>> {
        self.arcs.get_mut(id).and_then(Option::as_mut)
    }

    /// Ids of live arcs, ascending.
    pub fn arc_ids(&self) -> impl Iterator<Item = ArcId> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.as_ref().map(|_| i))
    }

    pub fn arcs(&self) -> impl Iterator<Item = (ArcId, &Arc<T>)> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.as_ref().map(|a| (i, a)))
    }

    #[inline]
    pub fn arc_count(&self) -> usize {
        self.arc_ids().count()
    }

    #[inline]
    pub fn polygon(&self, id: PolygonId) -> Option<&PolygonRecord> {
        self.polygons.get(&id)
    }

    pub fn polygons(&self) -> impl Iterator<Item = &PolygonRecord> + '_ {
        self.polygons.values()
    }

    pub fn polygon_ids(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.polygons.keys().copied()
    }

    /// Total vertex count over all live arcs (shared node vertices counted per arc).
    pub fn vertex_count(&self) -> usize {
        self.arcs().map(|(_, a)| a.vertices.len()).sum()
    }

    /// Node id `id` was merged into, following the merge chain.
    pub fn resolve_node(&self, id: NodeId) -> NodeId {
        let mut current = id;
        // merge chains are acyclic, bound the walk by the table size anyway
        for _ in 0..=self.nodes.len() {
            match self.merges.get(&current) {
                Some(&next) => current = next,
                None => break,
            }
        }

        current
    }

    /// Node merge map (absorbed node to the node it was merged into).
    #[inline]
    pub fn merge_map(&self) -> &BTreeMap<NodeId, NodeId> {
        &self.merges
    }

    /// Live node at `pos` after rounding, if any.
    pub fn node_at(&self, pos: Vector2<T>) -> Option<NodeId> {
        let key = self.precision.key(pos)?;
        self.node_ids()
            .find(|&id| self.precision.key(self.nodes[id].pos) == Some(key))
    }

    /// Compute the bookkeeping for collapsing `arc`, `None` if the arc does not exist.
    ///
    /// The frozen node is kept when exactly one of the two nodes is frozen, otherwise the lower
    /// id is kept.
    pub fn plan_collapse(&self, arc: ArcId) -> Option<CollapsePlan> {
        let a = self.arc(arc)?;
        let removals = a.polygons().map(|p| (p, arc)).collect();

        let head = self.resolve_node(a.head);
        let tail = self.resolve_node(a.tail);
        let merge = if head == tail {
            None
        } else {
            let head_frozen = self.nodes[head].frozen;
            let tail_frozen = self.nodes[tail].frozen;
            let (keep, absorb) = if tail_frozen && !head_frozen {
                (tail, head)
            } else if head_frozen && !tail_frozen {
                (head, tail)
            } else {
                (head.min(tail), head.max(tail))
            };
            Some(NodeMerge { keep, absorb })
        };

        Some(CollapsePlan {
            arc,
            removals,
            merge,
        })
    }

    /// Apply a plan from [TopologyBatch::plan_collapse].
    ///
    /// Removes the arc and its polygon references, destroys polygons left without arcs, and merges
    /// the arc's nodes. Arcs touching the absorbed node are re-pointed at the kept node and their
    /// end vertex set to its position.
    pub fn apply_collapse(&mut self, plan: &CollapsePlan) -> CollapseOutcome {
        let mut outcome = CollapseOutcome::default();
        let Some(removed) = self.arcs.get_mut(plan.arc).and_then(Option::take) else {
            return outcome;
        };

        for id in [removed.head, removed.tail] {
            let id = self.resolve_node(id);
            self.nodes[id].ends.retain(|e| e.arc != plan.arc);
        }

        for &(polygon, arc) in &plan.removals {
            let Some(record) = self.polygons.get_mut(&polygon) else {
                continue;
            };
            record.arcs.retain(|&(a, _)| a != arc);
            outcome.affected.push(polygon);
            if record.arcs.is_empty() {
                self.polygons.remove(&polygon);
                outcome.destroyed.push(polygon);
            }
        }

        match plan.merge {
            Some(NodeMerge { keep, absorb }) => {
                let ends = std::mem::take(&mut self.nodes[absorb].ends);
                let keep_pos = self.nodes[keep].pos;
                for ArcEnd { arc, end } in ends.iter().copied() {
                    if let Some(a) = self.arc_mut(arc) {
                        match end {
                            End::Head => a.head = keep,
                            End::Tail => a.tail = keep,
                        }
                        a.set_end_vertex(end, keep_pos);
                    }
                }

                let (frozen, pinned) = (self.nodes[absorb].frozen, self.nodes[absorb].pinned);
                let kept = &mut self.nodes[keep];
                kept.ends.extend(ends);
                kept.frozen |= frozen;
                kept.pinned |= pinned;
                self.merges.insert(absorb, keep);
                outcome.surviving_node = Some(keep);
                debug!("arc {} collapsed, node {absorb} merged into {keep}", plan.arc);
            }
            None => {
                outcome.surviving_node = Some(self.resolve_node(removed.head));
                debug!("loop arc {} collapsed", plan.arc);
            }
        }

        outcome
    }
}
