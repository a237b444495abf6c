//! Switch lowering: replace multi-way `Switch` terminators with a mix
//! of comparison trees, dense jump tables, and bit-mask membership
//! tests.
//!
//! The pipeline per switch:
//!
//! 1. **Collect** ([`collect`]) — read the sorted label table into
//!    simple clusters, one per label, splitting edge probabilities
//!    across labels that share an edge.
//! 2. **Plan** ([`jump_table`], [`bit_test`]) — two dynamic programs
//!    group runs of neighbouring clusters into jump-table or bit-test
//!    clusters wherever that shape is feasible and worth it. Pure
//!    analysis; the CFG is untouched and any refusal leaves the switch
//!    exactly as it was.
//! 3. **Balance** ([`tree`]) — build a comparison-balanced binary tree
//!    over the final cluster sequence.
//! 4. **Emit** — rewrite the switch block into the planned shape,
//!    eliminating comparisons the tree context proves redundant, and
//!    expand each grouped cluster in its own dispatch block.
//! 5. **Repair** — re-key PHI operands from the destroyed switch edges
//!    onto the emitted edges and invalidate the dominator cache.
//!
//! [`lower_switch`] drives one switch through all five stages;
//! [`lower_switches`] sweeps a whole function.

pub mod cluster;
pub mod collect;
pub mod config;
pub mod gate;
pub mod jump_table;
pub mod tree;

mod emit;
mod repair;

use thiserror::Error;
use tracing::debug;

use vesta_ir::{BlockId, EdgeId, EdgeKind, Function, Probability, Terminator};

use crate::cluster::Cluster;
use crate::config::{BranchCostModel, LoweringConfig};
use crate::emit::SwitchEmitter;
use crate::tree::{CaseTree, TreeItem};

pub use crate::collect::CollectedSwitch;
pub use crate::config::DefaultCostModel;

/// Why a switch was left in place. Every variant is "declined to
/// transform": the original switch remains valid, so none of these is
/// a compile error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// Fewer than two case labels; nothing worth restructuring.
    #[error("fewer than two case labels, nothing to lower")]
    Degenerate,

    /// Case targets do not converge on one merge block. Required by
    /// whole-switch array conversion, not by cluster lowering.
    #[error("case targets do not converge on a common successor")]
    NoCommonSuccessor,

    /// The spanned value range overflows the cost arithmetic.
    #[error("spanned value range too large for cost comparison")]
    RangeTooLarge,

    /// Too sparse for whole-switch array conversion.
    #[error("range {range} too sparse for {count} covered values")]
    RatioExceeded { range: u64, count: u64 },

    /// A case target block computes something and cannot be treated as
    /// a bare jump target.
    #[error("case target block carries code of its own")]
    NonEmptyIntermediateBlock,
}

/// Lower the switch terminating `switch_bb`.
///
/// On success the block's `Switch` terminator has been replaced by the
/// planned comparison/dispatch structure, PHI nodes at every former
/// case target carry operands for the new incoming edges, and the
/// dominator cache is invalidated. On `Err` the CFG is untouched.
pub fn lower_switch(
    func: &mut Function,
    switch_bb: BlockId,
    config: &LoweringConfig,
    cost_model: &dyn BranchCostModel,
) -> Result<(), SkipReason> {
    let collected = collect::collect_simple_clusters(func, switch_bb)?;
    let low = collected.clusters[0].low;
    let high = collected.clusters[collected.clusters.len() - 1].high;
    let span = high.checked_sub(low).ok_or(SkipReason::RangeTooLarge)?;
    if u64::try_from(span).is_err() {
        return Err(SkipReason::RangeTooLarge);
    }

    let clusters: Vec<Cluster> = collected
        .clusters
        .iter()
        .copied()
        .map(Cluster::Simple)
        .collect();
    let clusters = jump_table::find_jump_tables(clusters, config);
    let mut clusters = bit_test::find_bit_tests(clusters, config);
    debug!(
        block = switch_bb.raw(),
        cases = collected.clusters.len(),
        shapes = clusters.len(),
        "lowering switch"
    );

    // Commit point. Analysis is done; everything below mutates the CFG
    // and must run to completion.

    let mut case_blocks: Vec<BlockId> = collected.clusters.iter().map(|c| c.target).collect();
    case_blocks.push(collected.default_block);
    case_blocks.sort_unstable();
    case_blocks.dedup();
    let recorded = repair::record_phi_operands(func, &case_blocks, switch_bb);

    for cluster in &mut clusters {
        if let Cluster::JumpTable(g) | Cluster::BitTest(g) = cluster {
            g.dispatch_block = Some(func.new_block());
        }
    }
    let items: Vec<TreeItem> = clusters
        .iter()
        .map(|c| TreeItem {
            low: c.low(),
            high: c.high(),
            prob: c.probability(),
            target: match c {
                Cluster::Simple(s) => s.target,
                Cluster::JumpTable(g) | Cluster::BitTest(g) => g
                    .dispatch_block
                    .unwrap_or_else(|| panic!("dispatch block not assigned")),
            },
        })
        .collect();
    let tree = CaseTree::build(&items);
    debug!(shape = %tree.dump(), "balanced comparison tree");

    // Detach the switch and seed a fallthrough chain toward default;
    // every comparison is emitted by splitting that chain.
    let old_succs: Vec<EdgeId> = func.blocks[switch_bb.index()].succs.to_vec();
    for e in old_succs {
        func.remove_edge(e);
    }
    let fall = func.make_edge(
        switch_bb,
        collected.default_block,
        EdgeKind::Fallthrough,
        Probability::always(),
    );
    func.blocks[switch_bb.index()].terminator = Terminator::Goto { edge: fall };

    let mut emitter = SwitchEmitter::new(
        func,
        collected.index,
        collected.index_ty,
        collected.default_block,
        config.word_bits,
    );
    emitter.emit_decision_tree(switch_bb, &tree, collected.default_prob);
    for cluster in &clusters {
        match cluster {
            Cluster::Simple(_) => {}
            Cluster::JumpTable(g) => {
                let dispatch = g
                    .dispatch_block
                    .unwrap_or_else(|| panic!("dispatch block not assigned"));
                emitter.emit_jump_table(g, dispatch);
            }
            Cluster::BitTest(g) => {
                let dispatch = g
                    .dispatch_block
                    .unwrap_or_else(|| panic!("dispatch block not assigned"));
                // The default mass reaching the dispatch block has
                // already been halved by the tree tests above it.
                emitter.emit_bit_test(
                    g,
                    dispatch,
                    collected.default_prob.apply_scale(1, 2),
                    cost_model,
                );
            }
        }
    }

    repair::fix_phi_operands(func, &case_blocks, &recorded);
    func.invalidate_dominators();
    Ok(())
}

/// Lower every switch in `func`, each to completion before the next.
/// Returns how many were transformed; skipped switches are logged at
/// `debug` level and left untouched.
pub fn lower_switches(
    func: &mut Function,
    config: &LoweringConfig,
    cost_model: &dyn BranchCostModel,
) -> usize {
    // Snapshot the block count: jump-table expansion emits fresh
    // `Switch` terminators in new blocks, and those must not be
    // re-lowered.
    let original_blocks = func.blocks.len();
    let mut lowered = 0;
    for raw in 0..original_blocks {
        let bb = func.blocks[raw].id;
        if !matches!(func.blocks[raw].terminator, Terminator::Switch { .. }) {
            continue;
        }
        match lower_switch(func, bb, config, cost_model) {
            Ok(()) => lowered += 1,
            Err(reason) => {
                debug!(block = bb.raw(), %reason, "switch left in place");
            }
        }
    }
    lowered
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use vesta_ir::{FunctionBuilder, IntType, Operand};

    use super::*;

    #[test]
    fn skip_reasons_render_for_logs() {
        assert_eq!(
            SkipReason::Degenerate.to_string(),
            "fewer than two case labels, nothing to lower"
        );
        assert_eq!(
            SkipReason::RatioExceeded {
                range: 100,
                count: 3
            }
            .to_string(),
            "range 100 too sparse for 3 covered values"
        );
    }

    #[test]
    fn degenerate_switch_leaves_cfg_untouched() {
        let mut b = FunctionBuilder::new("t");
        let entry = b.entry();
        let ty = IntType::signed(32);
        let x = b.new_value(ty);
        let a = b.new_block();
        let d = b.new_block();
        b.switch(entry, Operand::Value(x), ty, &[(1, 1, a)], d);
        b.ret(a);
        b.ret(d);
        let mut f = b.finish();
        let before = f.clone();

        let result = lower_switch(
            &mut f,
            entry,
            &LoweringConfig::default(),
            &DefaultCostModel,
        );
        assert_eq!(result, Err(SkipReason::Degenerate));
        assert_eq!(f.blocks, before.blocks);
        assert!(f.dominators_valid());
    }

    #[test]
    fn sweep_counts_transformed_switches() {
        let mut b = FunctionBuilder::new("t");
        let entry = b.entry();
        let ty = IntType::signed(32);
        let x = b.new_value(ty);
        let a = b.new_block();
        let c = b.new_block();
        let d = b.new_block();
        b.switch(entry, Operand::Value(x), ty, &[(1, 1, a), (4, 4, c)], d);
        b.ret(a);
        b.ret(c);
        b.ret(d);
        let mut f = b.finish();

        let lowered = lower_switches(&mut f, &LoweringConfig::default(), &DefaultCostModel);
        assert_eq!(lowered, 1);
        assert!(!f.dominators_valid());
        assert!(!matches!(
            f.blocks[entry.index()].terminator,
            Terminator::Switch { .. }
        ));
    }
}
