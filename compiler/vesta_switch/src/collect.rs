//! Collection: read a `Switch` terminator into simple clusters.
//!
//! The label table is already sorted and non-overlapping, so collection
//! is a single pass: each label becomes one [`SimpleCluster`], and each
//! label's probability is its target edge's probability split evenly
//! across the labels sharing that edge.

use rustc_hash::FxHashMap;

use vesta_ir::{BlockId, EdgeId, Function, IntType, Operand, Probability, Terminator};

use crate::cluster::SimpleCluster;
use crate::SkipReason;

/// Everything the lowerer needs to know about one switch, read out
/// before any surgery happens.
#[derive(Clone, Debug)]
pub struct CollectedSwitch {
    /// Simple clusters, one per label, sorted ascending.
    pub clusters: Vec<SimpleCluster>,
    /// The dispatched value.
    pub index: Operand,
    pub index_ty: IntType,
    pub default_block: BlockId,
    pub default_edge: EdgeId,
    pub default_prob: Probability,
}

/// Read the switch terminating `switch_bb` into simple clusters.
///
/// Fails with [`SkipReason::Degenerate`] when there are fewer than two
/// case labels; such switches are left for trivial branch folding.
///
/// # Panics
///
/// Panics if `switch_bb` is not terminated by a `Switch`.
pub fn collect_simple_clusters(
    func: &Function,
    switch_bb: BlockId,
) -> Result<CollectedSwitch, SkipReason> {
    let Terminator::Switch {
        index,
        index_ty,
        labels,
        default_edge,
    } = &func.blocks[switch_bb.index()].terminator
    else {
        panic!("bb{} does not end in a switch", switch_bb.raw());
    };

    if labels.len() < 2 {
        return Err(SkipReason::Degenerate);
    }

    // Each case edge's probability is shared evenly by the labels that
    // dispatch through it.
    let mut labels_per_edge: FxHashMap<EdgeId, u64> = FxHashMap::default();
    let edges: Vec<EdgeId> = labels
        .iter()
        .map(|label| {
            func.find_edge(switch_bb, label.target).unwrap_or_else(|| {
                panic!(
                    "switch in bb{} has no edge to case target bb{}",
                    switch_bb.raw(),
                    label.target.raw()
                )
            })
        })
        .collect();
    for &e in &edges {
        *labels_per_edge.entry(e).or_insert(0) += 1;
    }

    let mut clusters: Vec<SimpleCluster> = Vec::with_capacity(labels.len());
    for (label_index, (label, &edge)) in labels.iter().zip(&edges).enumerate() {
        debug_assert!(label.low <= label.high, "inverted label range");
        let share = labels_per_edge[&edge];
        let prob = func.edge(edge).probability.apply_scale(1, share);
        if let Some(prev) = clusters.last() {
            debug_assert!(prev.high < label.low, "label table not sorted/disjoint");
        }
        clusters.push(SimpleCluster {
            low: label.low,
            high: label.high,
            target: label.target,
            label_index,
            prob,
        });
    }

    let default_edge = *default_edge;
    Ok(CollectedSwitch {
        clusters,
        index: *index,
        index_ty: *index_ty,
        default_block: func.edge(default_edge).dst,
        default_edge,
        default_prob: func.edge(default_edge).probability,
    })
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests {
    use pretty_assertions::assert_eq;

    use vesta_ir::FunctionBuilder;

    use super::*;

    fn build_switch(labels: &[(i128, i128, u32)]) -> (Function, BlockId) {
        let mut b = FunctionBuilder::new("t");
        let entry = b.entry();
        let ty = IntType::signed(32);
        let x = b.new_value(ty);
        let max_target = labels.iter().map(|&(_, _, t)| t).max().unwrap_or(0);
        let mut blocks = Vec::new();
        for _ in 0..=max_target + 1 {
            blocks.push(b.new_block());
        }
        let table: Vec<(i128, i128, BlockId)> = labels
            .iter()
            .map(|&(lo, hi, t)| (lo, hi, blocks[t as usize]))
            .collect();
        let default = blocks[max_target as usize + 1];
        b.switch(entry, Operand::Value(x), ty, &table, default);
        for &bb in &blocks {
            b.ret(bb);
        }
        (b.finish(), entry)
    }

    #[test]
    fn single_label_is_degenerate() {
        let (f, entry) = build_switch(&[(1, 1, 1)]);
        assert_eq!(
            collect_simple_clusters(&f, entry).unwrap_err(),
            SkipReason::Degenerate
        );
    }

    #[test]
    fn collects_sorted_clusters() {
        let (f, entry) = build_switch(&[(1, 1, 1), (5, 8, 2), (20, 20, 3)]);
        let c = collect_simple_clusters(&f, entry).unwrap();
        let bounds: Vec<(i128, i128)> = c.clusters.iter().map(|s| (s.low, s.high)).collect();
        assert_eq!(bounds, vec![(1, 1), (5, 8), (20, 20)]);
        assert_eq!(c.clusters[1].value_count(), 4);
    }

    #[test]
    fn adjacent_labels_with_same_target_stay_separate() {
        // Grouping is the finders' decision, not the collector's.
        let (f, entry) = build_switch(&[(1, 1, 1), (2, 2, 1), (3, 3, 1), (9, 9, 2)]);
        let c = collect_simple_clusters(&f, entry).unwrap();
        let bounds: Vec<(i128, i128)> = c.clusters.iter().map(|s| (s.low, s.high)).collect();
        assert_eq!(bounds, vec![(1, 1), (2, 2), (3, 3), (9, 9)]);
    }

    #[test]
    fn splits_edge_probability_across_shared_labels() {
        // Labels 1 and 9 share a target (and thus an edge); each gets
        // half the edge's mass.
        let (f, entry) = build_switch(&[(1, 1, 1), (5, 5, 2), (9, 9, 1)]);
        let c = collect_simple_clusters(&f, entry).unwrap();
        assert_eq!(c.clusters.len(), 3);
        assert_eq!(c.clusters[0].prob, c.clusters[2].prob);
        // Two case edges plus default split evenly three ways; a shared
        // edge's mass halves again.
        assert_eq!(c.clusters[0].prob, Probability::guessed(1, 3).apply_scale(1, 2));
    }

    #[test]
    fn records_default_edge_and_probability() {
        let (f, entry) = build_switch(&[(1, 1, 1), (2, 2, 2)]);
        let c = collect_simple_clusters(&f, entry).unwrap();
        assert_eq!(c.default_block, f.edge(c.default_edge).dst);
        assert_eq!(c.default_prob, Probability::guessed(1, 3));
    }
}
