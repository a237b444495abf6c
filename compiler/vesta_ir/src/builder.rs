//! Convenience builder for constructing [`Function`]s.
//!
//! Follows the "allocate blocks, emit, terminate" pattern of LLVM-style
//! IR builders. The builder keeps edge bookkeeping (succ/pred lists,
//! switch case edges) consistent so callers describe only the shape.

use crate::cfg::{
    BlockId, CaseLabel, EdgeId, EdgeKind, Function, Operand, Phi, Terminator, ValueId,
};
use crate::prob::Probability;
use crate::ty::IntType;

/// Builder for an in-progress [`Function`].
pub struct FunctionBuilder {
    func: Function,
}

impl FunctionBuilder {
    /// Create a builder with an entry block already allocated.
    pub fn new(name: impl Into<String>) -> Self {
        let mut func = Function::new(name);
        let entry = func.new_block();
        func.entry = entry;
        Self { func }
    }

    /// The entry block.
    pub fn entry(&self) -> BlockId {
        self.func.entry
    }

    /// Append a fresh block.
    pub fn new_block(&mut self) -> BlockId {
        self.func.new_block()
    }

    /// Allocate a fresh SSA value.
    pub fn new_value(&mut self, ty: IntType) -> ValueId {
        self.func.new_value(ty)
    }

    /// Terminate `bb` with an unconditional jump to `dst`.
    pub fn goto(&mut self, bb: BlockId, dst: BlockId) -> EdgeId {
        let e = self
            .func
            .make_edge(bb, dst, EdgeKind::Fallthrough, Probability::always());
        self.func.blocks[bb.index()].terminator = Terminator::Goto { edge: e };
        e
    }

    /// Terminate `bb` with `return`.
    pub fn ret(&mut self, bb: BlockId) {
        self.func.blocks[bb.index()].terminator = Terminator::Return { value: None };
    }

    /// Terminate `bb` with `return value`.
    pub fn ret_value(&mut self, bb: BlockId, value: Operand) {
        self.func.blocks[bb.index()].terminator = Terminator::Return { value: Some(value) };
    }

    /// Terminate `bb` with a switch over `index`.
    ///
    /// `labels` are `(low, high, target)` triples, sorted ascending and
    /// non-overlapping. One `Case` edge is created per distinct target
    /// (labels sharing a target share the edge) plus one `Default` edge;
    /// outgoing probability is split evenly across the distinct edges.
    pub fn switch(
        &mut self,
        bb: BlockId,
        index: Operand,
        index_ty: IntType,
        labels: &[(i128, i128, BlockId)],
        default: BlockId,
    ) {
        debug_assert!(
            labels.windows(2).all(|w| w[0].1 < w[1].0),
            "switch labels must be sorted and non-overlapping"
        );
        debug_assert!(labels.iter().all(|&(low, high, _)| low <= high));

        let mut targets: Vec<BlockId> = Vec::new();
        for &(_, _, t) in labels {
            if !targets.contains(&t) {
                targets.push(t);
            }
        }
        let n_edges = targets.len() as u64 + 1;
        let prob = Probability::guessed(1, n_edges);
        for &t in &targets {
            self.func.make_edge(bb, t, EdgeKind::Case, prob);
        }
        let default_edge = self.func.make_edge(bb, default, EdgeKind::Default, prob);

        self.func.blocks[bb.index()].terminator = Terminator::Switch {
            index,
            index_ty,
            labels: labels
                .iter()
                .map(|&(low, high, target)| CaseLabel { low, high, target })
                .collect(),
            default_edge,
        };
    }

    /// Add a PHI node to `bb` with operands keyed by incoming edge.
    /// Returns the freshly allocated result value.
    pub fn phi(&mut self, bb: BlockId, ty: IntType, args: &[(EdgeId, Operand)]) -> ValueId {
        let dst = self.func.new_value(ty);
        self.func.blocks[bb.index()].phis.push(Phi {
            dst,
            args: args.to_vec(),
        });
        dst
    }

    /// Finish building and return the function.
    pub fn finish(self) -> Function {
        self.func
    }
}
