//! Emission: rewrite the CFG to the shapes the planner chose.
//!
//! The switch block is first re-terminated as a plain goto to the
//! default block; every comparison is then emitted by splitting that
//! fallthrough chain one conditional at a time. The tree walk threads
//! two probability quantities through the recursion: `subtree_prob`,
//! the mass still reachable below the current node, and `default_prob`,
//! the default mass still plausible on this path — the latter halves at
//! every branch point where the default could lie on either side. Each
//! emitted conditional converts its absolute probability into one
//! conditional on the mass that actually reaches it.
//!
//! Redundant comparisons are eliminated by consulting the enclosing
//! tree context: a node whose bounds are already established by parent
//! comparisons (or by the index type's own limits) gets an
//! unconditional jump, and a leaf range with neither bound known gets
//! the unsigned wrap-around trick — `(index - low) > (high - low)` as
//! an unsigned compare — testing both bounds at once.

use vesta_ir::{
    BinOp, BlockId, CaseLabel, CmpOp, Cond, EdgeKind, Function, IntType, Operand, Probability,
    Rvalue, Stmt, Terminator,
};

use crate::cluster::GroupCluster;
use crate::config::BranchCostModel;
use crate::tree::{CaseTree, NodeId};

pub struct SwitchEmitter<'a> {
    func: &'a mut Function,
    index: Operand,
    index_ty: IntType,
    default_block: BlockId,
    word_bits: u32,
}

impl<'a> SwitchEmitter<'a> {
    pub fn new(
        func: &'a mut Function,
        index: Operand,
        index_ty: IntType,
        default_block: BlockId,
        word_bits: u32,
    ) -> Self {
        Self {
            func,
            index,
            index_ty,
            default_block,
            word_bits,
        }
    }

    // ── Branch primitives ───────────────────────────────────────

    /// Emit `if lhs op rhs goto target` at the end of `bb` and return
    /// the block that control falls through to otherwise.
    ///
    /// `bb` must end in an unconditional goto; the fallthrough chain is
    /// split so emission can continue in the returned block.
    fn emit_cmp_and_jump(
        &mut self,
        bb: BlockId,
        lhs: Operand,
        op: CmpOp,
        rhs: Operand,
        target: BlockId,
        probability: Probability,
    ) -> BlockId {
        let fall = self.func.single_succ_edge(bb);
        let cont = self.func.split_edge(fall);
        let true_edge = self.func.make_edge(bb, target, EdgeKind::True, probability);
        {
            let e = self.func.edge_mut(fall);
            e.kind = EdgeKind::False;
            e.probability = probability.invert();
        }
        self.func.blocks[bb.index()].terminator = Terminator::CondBranch {
            cond: Cond { op, lhs, rhs },
            true_edge,
            false_edge: fall,
        };
        cont
    }

    /// `if index op value goto target`, falling through otherwise.
    fn cmp_index(
        &mut self,
        bb: BlockId,
        op: CmpOp,
        value: i128,
        target: BlockId,
        probability: Probability,
    ) -> BlockId {
        self.emit_cmp_and_jump(bb, self.index, op, Operand::Const(value), target, probability)
    }

    /// `if index == value goto target`, falling through otherwise.
    fn jump_if_equal(
        &mut self,
        bb: BlockId,
        value: i128,
        target: BlockId,
        probability: Probability,
    ) -> BlockId {
        self.cmp_index(bb, CmpOp::Eq, value, target, probability)
    }

    /// Retarget the unconditional exit of `bb` at `target`.
    fn emit_jump(&mut self, bb: BlockId, target: BlockId) {
        let e = self.func.single_succ_edge(bb);
        self.func.redirect_edge(e, target);
    }

    /// A fresh block falling through to wherever `bb` currently falls
    /// through to. Used to park the right-hand subtree while the left
    /// half of a split is emitted.
    fn fresh_branch_block(&mut self, bb: BlockId) -> BlockId {
        let dest = self.func.edge(self.func.single_succ_edge(bb)).dst;
        let nb = self.func.new_block();
        let e = self
            .func
            .make_edge(nb, dest, EdgeKind::Fallthrough, Probability::always());
        self.func.blocks[nb.index()].terminator = Terminator::Goto { edge: e };
        nb
    }

    // ── Bound elimination ───────────────────────────────────────

    /// Is the lower bound of `id` already established — by the index
    /// type's minimum, or by a parent whose high bound is adjacent?
    fn node_has_low_bound(&self, tree: &CaseTree, id: NodeId) -> bool {
        let node = tree.node(id);
        if node.item.low == self.index_ty.min_value() {
            return true;
        }
        // A left child holds smaller values, so the bound is not
        // established here.
        if node.left.is_some() {
            return false;
        }
        if node.item.low == i128::MIN {
            return false;
        }
        let low_minus_one = node.item.low - 1;
        let mut parent = node.parent;
        while let Some(pid) = parent {
            let pn = tree.node(pid);
            if pn.item.high == low_minus_one {
                return true;
            }
            parent = pn.parent;
        }
        false
    }

    /// Mirror image of [`Self::node_has_low_bound`].
    fn node_has_high_bound(&self, tree: &CaseTree, id: NodeId) -> bool {
        let node = tree.node(id);
        if node.item.high == self.index_ty.max_value() {
            return true;
        }
        if node.right.is_some() {
            return false;
        }
        if node.item.high == i128::MAX {
            return false;
        }
        let high_plus_one = node.item.high + 1;
        let mut parent = node.parent;
        while let Some(pid) = parent {
            let pn = tree.node(pid);
            if pn.item.low == high_plus_one {
                return true;
            }
            parent = pn.parent;
        }
        false
    }

    fn node_is_bounded(&self, tree: &CaseTree, id: NodeId) -> bool {
        self.node_has_low_bound(tree, id) && self.node_has_high_bound(tree, id)
    }

    // ── Tree walk ───────────────────────────────────────────────

    /// Emit the whole comparison tree starting from `bb`, which must
    /// end in a goto to the default block.
    pub fn emit_decision_tree(
        &mut self,
        bb: BlockId,
        tree: &CaseTree,
        default_prob: Probability,
    ) {
        let Some(root) = tree.root else { return };
        if let Some(tail) = self.emit_case_nodes(bb, root, default_prob, tree) {
            let default_block = self.default_block;
            self.emit_jump(tail, default_block);
        }
    }

    /// Emit comparisons for `id` and its subtrees, continuing from
    /// `bb`. Returns the block still falling toward the default, or
    /// `None` when every path below has been dispatched.
    #[allow(clippy::too_many_lines)]
    fn emit_case_nodes(
        &mut self,
        mut bb: BlockId,
        id: NodeId,
        mut default_prob: Probability,
        tree: &CaseTree,
    ) -> Option<BlockId> {
        let node = tree.node(id).clone();
        let prob = node.item.prob;
        let mut subtree_prob = node.subtree_prob;

        // Parents have already pinned both bounds: nothing to test.
        if self.node_is_bounded(tree, id) {
            self.emit_jump(bb, node.item.target);
            return None;
        }

        if node.is_single() {
            let probability = prob.conditional(subtree_prob + default_prob);
            bb = self.jump_if_equal(bb, node.item.low, node.item.target, probability);
            subtree_prob = subtree_prob.saturating_sub(prob);

            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    if self.node_is_bounded(tree, right) {
                        // Everything above this value belongs to the
                        // right child; go there directly.
                        let right_node = tree.node(right);
                        let probability =
                            right_node.item.prob.conditional(subtree_prob + default_prob);
                        let target = right_node.item.target;
                        bb = self.cmp_index(bb, CmpOp::Gt, node.item.high, target, probability);
                        self.emit_case_nodes(bb, left, default_prob, tree)
                    } else if self.node_is_bounded(tree, left) {
                        let left_node = tree.node(left);
                        let probability =
                            left_node.item.prob.conditional(subtree_prob + default_prob);
                        let target = left_node.item.target;
                        bb = self.cmp_index(bb, CmpOp::Lt, node.item.high, target, probability);
                        self.emit_case_nodes(bb, right, default_prob, tree)
                    } else if tree.node(left).is_leaf()
                        && tree.node(left).is_single()
                        && tree.node(right).is_leaf()
                        && tree.node(right).is_single()
                    {
                        // Three values total: two more equality tests
                        // beat a bounds split.
                        let right_node = tree.node(right);
                        let probability =
                            right_node.item.prob.conditional(subtree_prob + default_prob);
                        bb = self.jump_if_equal(
                            bb,
                            right_node.item.low,
                            right_node.item.target,
                            probability,
                        );
                        let left_node = tree.node(left);
                        let probability =
                            left_node.item.prob.conditional(subtree_prob + default_prob);
                        bb = self.jump_if_equal(
                            bb,
                            left_node.item.low,
                            left_node.item.target,
                            probability,
                        );
                        Some(bb)
                    } else {
                        // Split: values above go to a parked block for
                        // the right subtree, the rest continue left.
                        let test_bb = self.fresh_branch_block(bb);
                        let probability = (tree.node(right).subtree_prob
                            + default_prob.apply_scale(1, 2))
                        .conditional(subtree_prob + default_prob);
                        bb = self.cmp_index(bb, CmpOp::Gt, node.item.high, test_bb, probability);
                        default_prob = default_prob.apply_scale(1, 2);

                        let tail = self.emit_case_nodes(bb, left, default_prob, tree);
                        if let Some(tail) = tail {
                            let default_block = self.default_block;
                            self.emit_jump(tail, default_block);
                        }
                        self.emit_case_nodes(test_bb, right, default_prob, tree)
                    }
                }
                (None, Some(right)) => {
                    let right_node = tree.node(right);
                    if !right_node.is_leaf() || !right_node.is_single() {
                        if !self.node_has_low_bound(tree, id) {
                            let probability = default_prob
                                .apply_scale(1, 2)
                                .conditional(subtree_prob + default_prob);
                            let default_block = self.default_block;
                            bb = self.cmp_index(
                                bb,
                                CmpOp::Lt,
                                node.item.high,
                                default_block,
                                probability,
                            );
                            default_prob = default_prob.apply_scale(1, 2);
                        }
                        self.emit_case_nodes(bb, right, default_prob, tree)
                    } else {
                        // One single-valued child: a branch to default
                        // saves too little to be worth its space.
                        let probability =
                            right_node.subtree_prob.conditional(subtree_prob + default_prob);
                        bb = self.jump_if_equal(
                            bb,
                            right_node.item.low,
                            right_node.item.target,
                            probability,
                        );
                        Some(bb)
                    }
                }
                (Some(left), None) => {
                    let left_node = tree.node(left);
                    if !left_node.is_leaf() || !left_node.is_single() {
                        if !self.node_has_high_bound(tree, id) {
                            let probability = default_prob
                                .apply_scale(1, 2)
                                .conditional(subtree_prob + default_prob);
                            let default_block = self.default_block;
                            bb = self.cmp_index(
                                bb,
                                CmpOp::Gt,
                                node.item.high,
                                default_block,
                                probability,
                            );
                            default_prob = default_prob.apply_scale(1, 2);
                        }
                        self.emit_case_nodes(bb, left, default_prob, tree)
                    } else {
                        let probability =
                            left_node.subtree_prob.conditional(subtree_prob + default_prob);
                        bb = self.jump_if_equal(
                            bb,
                            left_node.item.low,
                            left_node.item.target,
                            probability,
                        );
                        Some(bb)
                    }
                }
                (None, None) => Some(bb),
            }
        } else {
            // Range node.
            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    let mut test_bb = None;
                    if self.node_is_bounded(tree, right) {
                        let right_node = tree.node(right);
                        let probability =
                            right_node.subtree_prob.conditional(subtree_prob + default_prob);
                        let target = right_node.item.target;
                        bb = self.cmp_index(bb, CmpOp::Gt, node.item.high, target, probability);
                    } else {
                        let parked = self.fresh_branch_block(bb);
                        let probability = (tree.node(right).subtree_prob
                            + default_prob.apply_scale(1, 2))
                        .conditional(subtree_prob + default_prob);
                        bb = self.cmp_index(bb, CmpOp::Gt, node.item.high, parked, probability);
                        default_prob = default_prob.apply_scale(1, 2);
                        test_bb = Some(parked);
                    }

                    // Not above: this node's range or the left subtree.
                    let probability = prob.conditional(subtree_prob + default_prob);
                    bb = self.cmp_index(bb, CmpOp::Ge, node.item.low, node.item.target, probability);

                    let tail = self.emit_case_nodes(bb, left, default_prob, tree);
                    match test_bb {
                        Some(parked) => {
                            if let Some(tail) = tail {
                                let default_block = self.default_block;
                                self.emit_jump(tail, default_block);
                            }
                            self.emit_case_nodes(parked, right, default_prob, tree)
                        }
                        None => tail,
                    }
                }
                (None, Some(right)) => {
                    if !self.node_has_low_bound(tree, id) {
                        let probability = default_prob
                            .apply_scale(1, 2)
                            .conditional(subtree_prob + default_prob);
                        let default_block = self.default_block;
                        bb = self.cmp_index(bb, CmpOp::Lt, node.item.low, default_block, probability);
                        default_prob = default_prob.apply_scale(1, 2);
                    }
                    let probability = prob.conditional(subtree_prob + default_prob);
                    bb = self.cmp_index(bb, CmpOp::Le, node.item.high, node.item.target, probability);
                    self.emit_case_nodes(bb, right, default_prob, tree)
                }
                (Some(left), None) => {
                    if !self.node_has_high_bound(tree, id) {
                        let probability = default_prob
                            .apply_scale(1, 2)
                            .conditional(subtree_prob + default_prob);
                        let default_block = self.default_block;
                        bb = self.cmp_index(bb, CmpOp::Gt, node.item.high, default_block, probability);
                        default_prob = default_prob.apply_scale(1, 2);
                    }
                    let probability = prob.conditional(subtree_prob + default_prob);
                    bb = self.cmp_index(bb, CmpOp::Ge, node.item.low, node.item.target, probability);
                    self.emit_case_nodes(bb, left, default_prob, tree)
                }
                (None, None) => {
                    // Leaf range: drop whichever bound the context has
                    // already pinned. At most one can be missing here,
                    // or the bounded case above would have fired.
                    let high_bound = self.node_has_high_bound(tree, id);
                    let low_bound = self.node_has_low_bound(tree, id);
                    let default_block = self.default_block;
                    if !high_bound && low_bound {
                        let probability = default_prob.conditional(subtree_prob + default_prob);
                        bb = self.cmp_index(
                            bb,
                            CmpOp::Gt,
                            node.item.high,
                            default_block,
                            probability,
                        );
                    } else if high_bound && !low_bound {
                        let probability = default_prob.conditional(subtree_prob + default_prob);
                        bb = self.cmp_index(
                            bb,
                            CmpOp::Lt,
                            node.item.low,
                            default_block,
                            probability,
                        );
                    } else if !high_bound && !low_bound {
                        // Both bounds in one unsigned compare:
                        // (unsigned)(index - low) > high - low.
                        let biased = self.bias_index(bb, node.item.low);
                        let probability = default_prob.conditional(subtree_prob + default_prob);
                        bb = self.emit_cmp_and_jump(
                            bb,
                            Operand::Value(biased),
                            CmpOp::Gt,
                            Operand::Const(node.item.high - node.item.low),
                            default_block,
                            probability,
                        );
                    }
                    self.emit_jump(bb, node.item.target);
                    None
                }
            }
        }
    }

    /// Append `(unsigned)(index - low)` to `bb` and return the result.
    fn bias_index(&mut self, bb: BlockId, low: i128) -> vesta_ir::ValueId {
        let unsigned_ty = self.index_ty.as_unsigned();
        let diff = self.func.new_value(self.index_ty);
        let biased = self.func.new_value(unsigned_ty);
        let stmts = &mut self.func.blocks[bb.index()].stmts;
        stmts.push(Stmt::Assign {
            dst: diff,
            rhs: Rvalue::BinOp {
                op: BinOp::Sub,
                lhs: self.index,
                rhs: Operand::Const(low),
            },
        });
        stmts.push(Stmt::Assign {
            dst: biased,
            rhs: Rvalue::Cast {
                ty: unsigned_ty,
                value: Operand::Value(diff),
            },
        });
        biased
    }

    // ── Group expansion ─────────────────────────────────────────

    /// Fill a jump-table cluster's dispatch block with a dense switch.
    pub fn emit_jump_table(&mut self, group: &GroupCluster, dispatch: BlockId) {
        let base = group.total_prob();
        let labels: Vec<CaseLabel> = group
            .cases
            .iter()
            .map(|c| CaseLabel {
                low: c.low,
                high: c.high,
                target: c.target,
            })
            .collect();

        // One case edge per distinct target.
        let mut targets: Vec<BlockId> = group.cases.iter().map(|c| c.target).collect();
        targets.sort_unstable();
        targets.dedup();
        let mut dispatched = Probability::never();
        for &target in &targets {
            let mass = group
                .cases
                .iter()
                .filter(|c| c.target == target)
                .fold(Probability::never(), |acc, c| acc + c.prob);
            let probability = mass.conditional(base);
            dispatched += probability;
            self.func.make_edge(dispatch, target, EdgeKind::Case, probability);
        }
        // Gaps inside the spanned range fall out to default.
        let default_edge = self.func.make_edge(
            dispatch,
            self.default_block,
            EdgeKind::Default,
            dispatched.invert(),
        );
        self.func.blocks[dispatch.index()].terminator = Terminator::Switch {
            index: self.index,
            index_ty: self.index_ty,
            labels,
            default_edge,
        };
    }

    /// Fill a bit-test cluster's dispatch block with mask membership
    /// tests: bias the index, range-check it, then AND a shifted bit
    /// against one mask per distinct target.
    pub fn emit_bit_test(
        &mut self,
        group: &GroupCluster,
        dispatch: BlockId,
        default_prob: Probability,
        cost_model: &dyn BranchCostModel,
    ) {
        let low = group.low();
        let high = group.high();
        let range = high - low;
        debug_assert!(range < i128::from(self.word_bits));

        // Masks can be pre-shifted by `low` only when the absolute
        // values themselves fit a word.
        let fold_bias = low >= 0
            && high < i128::from(self.word_bits)
            && cost_model.prefer_shifted_masks(low, high);

        struct MaskTest {
            mask: u64,
            target: BlockId,
            prob: Probability,
            first_label: usize,
        }
        let mut tests: Vec<MaskTest> = Vec::new();
        for case in &group.cases {
            let bit_base = if fold_bias { 0 } else { low };
            let slot = match tests.iter().position(|t| t.target == case.target) {
                Some(slot) => slot,
                None => {
                    tests.push(MaskTest {
                        mask: 0,
                        target: case.target,
                        prob: Probability::never(),
                        first_label: case.label_index,
                    });
                    tests.len() - 1
                }
            };
            let entry = &mut tests[slot];
            let mut value = case.low;
            while value <= case.high {
                let bit = u32::try_from(value - bit_base)
                    .unwrap_or_else(|_| panic!("bit-test value out of word range"));
                entry.mask |= 1u64 << bit;
                value += 1;
            }
            entry.prob += case.prob;
            entry.first_label = entry.first_label.min(case.label_index);
        }
        // Most populous mask first; label order as a deterministic tie
        // break.
        tests.sort_by(|a, b| {
            b.mask
                .count_ones()
                .cmp(&a.mask.count_ones())
                .then(a.first_label.cmp(&b.first_label))
        });

        let base = group.total_prob() + default_prob;

        // Seed the fallthrough chain toward default.
        let fall = self.func.make_edge(
            dispatch,
            self.default_block,
            EdgeKind::Fallthrough,
            Probability::always(),
        );
        self.func.blocks[dispatch.index()].terminator = Terminator::Goto { edge: fall };

        let word_ty = IntType::unsigned(
            u8::try_from(self.word_bits).unwrap_or_else(|_| panic!("word width exceeds u8")),
        );
        let biased = if fold_bias {
            None
        } else {
            let diff = self.func.new_value(self.index_ty);
            let idx = self.func.new_value(word_ty);
            let stmts = &mut self.func.blocks[dispatch.index()].stmts;
            stmts.push(Stmt::Assign {
                dst: diff,
                rhs: Rvalue::BinOp {
                    op: BinOp::Sub,
                    lhs: self.index,
                    rhs: Operand::Const(low),
                },
            });
            stmts.push(Stmt::Assign {
                dst: idx,
                rhs: Rvalue::Cast {
                    ty: word_ty,
                    value: Operand::Value(diff),
                },
            });
            Some(idx)
        };

        // Values outside the spanned range leave for default before any
        // mask is consulted.
        let default_block = self.default_block;
        let probability = default_prob.conditional(base);
        let mut bb = match biased {
            Some(idx) => self.emit_cmp_and_jump(
                dispatch,
                Operand::Value(idx),
                CmpOp::Gt,
                Operand::Const(range),
                default_block,
                probability,
            ),
            None => {
                let lower = self.cmp_index(dispatch, CmpOp::Lt, low, default_block, probability);
                self.cmp_index(lower, CmpOp::Gt, high, default_block, probability)
            }
        };

        let bit = self.func.new_value(word_ty);
        let shift_by = match biased {
            Some(idx) => Operand::Value(idx),
            None => self.index,
        };
        self.func.blocks[bb.index()].stmts.push(Stmt::Assign {
            dst: bit,
            rhs: Rvalue::BinOp {
                op: BinOp::Shl,
                lhs: Operand::Const(1),
                rhs: shift_by,
            },
        });

        let mut remaining = base;
        for test in tests {
            let masked = self.func.new_value(word_ty);
            self.func.blocks[bb.index()].stmts.push(Stmt::Assign {
                dst: masked,
                rhs: Rvalue::BinOp {
                    op: BinOp::BitAnd,
                    lhs: Operand::Value(bit),
                    rhs: Operand::Const(i128::from(test.mask)),
                },
            });
            let probability = test.prob.conditional(remaining);
            remaining = remaining.saturating_sub(test.prob);
            bb = self.emit_cmp_and_jump(
                bb,
                Operand::Value(masked),
                CmpOp::Ne,
                Operand::Const(0),
                test.target,
                probability,
            );
        }
        // The residual chain already falls through to default.
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use vesta_ir::{FunctionBuilder, Probability};

    use crate::tree::{CaseTree, TreeItem};

    use super::*;

    fn item(low: i128, high: i128, target: BlockId) -> TreeItem {
        TreeItem {
            low,
            high,
            prob: Probability::guessed(1, 4),
            target,
        }
    }

    /// A function with `bb1` gotoing to a default block, ready for
    /// tree emission, plus `n` case target blocks.
    fn emission_fixture(n: usize) -> (Function, BlockId, BlockId, Vec<BlockId>, Operand) {
        let mut b = FunctionBuilder::new("t");
        let entry = b.entry();
        let x = b.new_value(IntType::signed(32));
        let default = b.new_block();
        b.ret(default);
        let targets: Vec<BlockId> = (0..n)
            .map(|_| {
                let t = b.new_block();
                b.ret(t);
                t
            })
            .collect();
        let mut f = b.finish();
        let e = f.make_edge(entry, default, EdgeKind::Fallthrough, Probability::always());
        f.blocks[entry.index()].terminator = Terminator::Goto { edge: e };
        (f, entry, default, targets, Operand::Value(x))
    }

    #[test]
    fn full_type_range_leaf_needs_no_comparison() {
        // One node covering the whole u8 domain: both bounds come from
        // the type, so the emitter jumps straight to the target.
        let ty = IntType::unsigned(8);
        let (mut f, entry, default, targets, index) = emission_fixture(1);
        let tree = CaseTree::build(&[item(0, 255, targets[0])]);
        let mut emitter = SwitchEmitter::new(&mut f, index, ty, default, 64);
        emitter.emit_decision_tree(entry, &tree, Probability::never());
        assert_eq!(
            f.blocks[entry.index()].terminator,
            Terminator::Goto {
                edge: f.single_succ_edge(entry)
            }
        );
        assert_eq!(f.edge(f.single_succ_edge(entry)).dst, targets[0]);
    }

    #[test]
    fn low_bound_at_type_min_drops_lower_test() {
        // [0, 5] over u8: only `index > 5 -> default` is needed.
        let ty = IntType::unsigned(8);
        let (mut f, entry, default, targets, index) = emission_fixture(1);
        let tree = CaseTree::build(&[item(0, 5, targets[0])]);
        let mut emitter = SwitchEmitter::new(&mut f, index, ty, default, 64);
        emitter.emit_decision_tree(entry, &tree, Probability::guessed(1, 4));
        let Terminator::CondBranch { cond, .. } = &f.blocks[entry.index()].terminator else {
            panic!("expected a single conditional branch");
        };
        assert_eq!(cond.op, CmpOp::Gt);
        assert_eq!(cond.rhs, Operand::Const(5));
        // No further comparison blocks: one conditional in the whole fn.
        let conds = f
            .blocks
            .iter()
            .filter(|b| matches!(b.terminator, Terminator::CondBranch { .. }))
            .count();
        assert_eq!(conds, 1);
    }

    #[test]
    fn unbounded_leaf_range_uses_biased_compare() {
        // [10, 20] over i32 with no context: subtract, cast unsigned,
        // single Gt against the range width.
        let ty = IntType::signed(32);
        let (mut f, entry, default, targets, index) = emission_fixture(1);
        let tree = CaseTree::build(&[item(10, 20, targets[0])]);
        let mut emitter = SwitchEmitter::new(&mut f, index, ty, default, 64);
        emitter.emit_decision_tree(entry, &tree, Probability::guessed(1, 4));
        assert_eq!(f.blocks[entry.index()].stmts.len(), 2);
        let Terminator::CondBranch { cond, .. } = &f.blocks[entry.index()].terminator else {
            panic!("expected a conditional branch");
        };
        assert_eq!(cond.op, CmpOp::Gt);
        assert_eq!(cond.rhs, Operand::Const(10));
    }

    #[test]
    fn jump_table_dispatch_gets_one_edge_per_target_plus_default() {
        use crate::cluster::SimpleCluster;
        let (mut f, _entry, default, targets, index) = emission_fixture(3);
        let dispatch = f.new_block();
        let group = GroupCluster {
            cases: (0..3)
                .map(|i| SimpleCluster {
                    low: i128::from(i),
                    high: i128::from(i),
                    target: targets[i as usize],
                    label_index: i as usize,
                    prob: Probability::guessed(1, 4),
                })
                .collect(),
            dispatch_block: Some(dispatch),
        };
        let mut emitter =
            SwitchEmitter::new(&mut f, index, IntType::signed(32), default, 64);
        emitter.emit_jump_table(&group, dispatch);
        assert_eq!(f.blocks[dispatch.index()].succs.len(), 4);
        assert!(matches!(
            f.blocks[dispatch.index()].terminator,
            Terminator::Switch { .. }
        ));
    }

    #[test]
    fn bit_test_orders_masks_by_popcount() {
        use crate::cluster::SimpleCluster;
        let (mut f, _entry, default, targets, index) = emission_fixture(2);
        let dispatch = f.new_block();
        // Target 0 covers one value, target 1 covers three.
        let cases = vec![
            SimpleCluster {
                low: 0,
                high: 0,
                target: targets[0],
                label_index: 0,
                prob: Probability::guessed(1, 8),
            },
            SimpleCluster {
                low: 2,
                high: 4,
                target: targets[1],
                label_index: 1,
                prob: Probability::guessed(3, 8),
            },
        ];
        let group = GroupCluster {
            cases,
            dispatch_block: Some(dispatch),
        };
        let mut emitter =
            SwitchEmitter::new(&mut f, index, IntType::signed(32), default, 64);
        emitter.emit_bit_test(&group, dispatch, Probability::guessed(1, 8), &crate::config::DefaultCostModel);

        // Dispatch block: bias stmts then the range check.
        assert_eq!(f.blocks[dispatch.index()].stmts.len(), 2);
        let Terminator::CondBranch {
            true_edge,
            false_edge,
            ..
        } = f.blocks[dispatch.index()].terminator.clone()
        else {
            panic!("expected range check");
        };
        assert_eq!(f.edge(true_edge).dst, default);

        // First mask test goes to the three-value target.
        let mask_bb = f.edge(false_edge).dst;
        let Terminator::CondBranch { true_edge, .. } = &f.blocks[mask_bb.index()].terminator
        else {
            panic!("expected mask test");
        };
        assert_eq!(f.edge(*true_edge).dst, targets[1]);
    }
}
