//! PHI repair around CFG surgery.
//!
//! Lowering replaces the switch's case and default edges with a web of
//! branch edges reaching the same target blocks. A PHI node in a target
//! block keys its operands by incoming edge, so the operand that used
//! to flow along the switch edge must be recorded *before* the edges
//! are torn down and re-attached to every new edge afterwards. Values
//! flowing in along unrelated predecessor edges are untouched.

use rustc_hash::FxHashMap;

use vesta_ir::{BlockId, Function, Operand, ValueId};

/// Per-PHI operands that used to arrive from the switch block.
pub type RecordedPhis = FxHashMap<ValueId, Operand>;

/// Record, for every PHI in `case_blocks`, the operand flowing in from
/// `switch_bb`. Call before detaching the switch's outgoing edges.
pub fn record_phi_operands(
    func: &Function,
    case_blocks: &[BlockId],
    switch_bb: BlockId,
) -> RecordedPhis {
    let mut recorded = RecordedPhis::default();
    for &bb in case_blocks {
        for phi in &func.blocks[bb.index()].phis {
            let from_switch = phi
                .args
                .iter()
                .find(|&&(e, _)| func.edge_exists(e) && func.edge(e).src == switch_bb);
            if let Some(&(_, op)) = from_switch {
                recorded.insert(phi.dst, op);
            }
        }
    }
    recorded
}

/// Re-attach recorded operands: every predecessor edge of a case block
/// that lacks a PHI argument gets the operand the switch edge carried.
/// Stale arguments for removed edges are dropped.
pub fn fix_phi_operands(func: &mut Function, case_blocks: &[BlockId], recorded: &RecordedPhis) {
    for &bb in case_blocks {
        let preds = func.blocks[bb.index()].preds.clone();
        let live: Vec<_> = preds
            .iter()
            .copied()
            .filter(|&e| func.edge_exists(e))
            .collect();
        for phi in &mut func.blocks[bb.index()].phis {
            phi.args.retain(|&(e, _)| live.contains(&e));
            let Some(&op) = recorded.get(&phi.dst) else {
                continue;
            };
            for &e in &live {
                if phi.arg_for_edge(e).is_none() {
                    phi.args.push((e, op));
                }
            }
        }
    }
}
