//! Control-flow graph: blocks, explicit edges, statements, PHI nodes.
//!
//! Unlike a block-parameter IR, edges here are first-class objects with
//! identity, a kind, and a profile probability. PHI operands are keyed
//! by incoming [`EdgeId`], and the surgery primitives (`split_block`,
//! `split_edge`, `redirect_edge`, `remove_edge`) keep the `preds`/`succs`
//! lists and PHI argument lists consistent. Edge IDs are never reused:
//! a removed edge leaves a tombstone, so a stale `EdgeId` can be
//! detected rather than silently aliasing a new edge.

use std::fmt;
use std::mem;

use smallvec::SmallVec;

use crate::prob::Probability;
use crate::ty::IntType;

// ── ID newtypes ─────────────────────────────────────────────────────

/// Basic block ID within a [`Function`]. Allocated sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// Create a block ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Edge ID within a [`Function`]. Allocated sequentially, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Create an edge ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// SSA value ID within a [`Function`]. Allocated sequentially from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    /// Create a value ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Operands, statements, conditions ────────────────────────────────

/// A statement or comparison operand: an SSA value or an integer constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Reference to an SSA value.
    Value(ValueId),
    /// Integer constant, held exactly in `i128`.
    Const(i128),
}

/// Binary operation kinds needed by switch lowering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// Integer subtraction.
    Sub,
    /// Left shift.
    Shl,
    /// Bitwise AND.
    BitAnd,
}

/// Right-hand side of an assignment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rvalue {
    /// Copy of an operand.
    Use(Operand),
    /// Binary operation over two operands.
    BinOp {
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
    /// Truncating/reinterpreting cast into `ty` (two's-complement wrap).
    Cast { ty: IntType, value: Operand },
}

/// A block-body statement. The lowerer only ever emits assignments;
/// richer statement kinds live in later pipeline stages.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stmt {
    /// `dst = rhs`.
    Assign { dst: ValueId, rhs: Rvalue },
}

/// Comparison operator for conditional branches.
///
/// Signedness comes from the compared type: operands are evaluated as
/// exact `i128` integers, and unsigned comparisons are expressed by
/// casting into an unsigned type first (which maps the operand into
/// `0..2^bits`), so a plain integer ordering is always correct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Condition of a [`Terminator::CondBranch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cond {
    pub op: CmpOp,
    pub lhs: Operand,
    pub rhs: Operand,
}

// ── Terminators ─────────────────────────────────────────────────────

/// One entry of a switch label table: the inclusive value range
/// `[low, high]` and the block it jumps to. A singleton case has
/// `high == low`. The label table is sorted ascending by `low` and the
/// ranges are non-overlapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaseLabel {
    pub low: i128,
    pub high: i128,
    pub target: BlockId,
}

/// How control leaves a basic block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// Unconditional jump along `edge`.
    Goto { edge: EdgeId },

    /// Two-way branch: `true_edge` if `cond` holds, else `false_edge`.
    CondBranch {
        cond: Cond,
        true_edge: EdgeId,
        false_edge: EdgeId,
    },

    /// Multi-way dispatch on an integer index. Each label's target block
    /// is reached through the `Case`-kind edge from this block to it
    /// (labels sharing a target share the edge); values matching no
    /// label leave through `default_edge`.
    Switch {
        index: Operand,
        index_ty: IntType,
        labels: Vec<CaseLabel>,
        default_edge: EdgeId,
    },

    /// Return from the function.
    Return { value: Option<Operand> },

    /// No successors; also the placeholder for blocks under construction.
    Unreachable,
}

// ── Edges ───────────────────────────────────────────────────────────

/// Classification of a CFG edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Straight-line flow (goto, block split remainder).
    Fallthrough,
    /// Taken side of a conditional branch.
    True,
    /// Not-taken side of a conditional branch.
    False,
    /// One switch case target.
    Case,
    /// The switch default target.
    Default,
}

/// A CFG edge with identity, kind, and profile weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub src: BlockId,
    pub dst: BlockId,
    pub kind: EdgeKind,
    /// Probability of leaving `src` along this edge.
    pub probability: Probability,
}

// ── PHI nodes ───────────────────────────────────────────────────────

/// A dataflow merge: `dst` takes the operand paired with whichever
/// incoming edge control arrived by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phi {
    pub dst: ValueId,
    /// Operands keyed by incoming edge. Every live predecessor edge of
    /// the owning block must appear exactly once.
    pub args: Vec<(EdgeId, Operand)>,
}

impl Phi {
    /// The operand flowing in along `edge`, if any.
    pub fn arg_for_edge(&self, edge: EdgeId) -> Option<Operand> {
        self.args
            .iter()
            .find(|(e, _)| *e == edge)
            .map(|&(_, op)| op)
    }
}

// ── Blocks ──────────────────────────────────────────────────────────

/// Predecessor/successor edge list. Two inline slots cover the common
/// conditional-branch shape without allocating.
pub type EdgeList = SmallVec<[EdgeId; 2]>;

/// A basic block: PHI nodes, then statements, then one terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub phis: Vec<Phi>,
    pub stmts: Vec<Stmt>,
    pub terminator: Terminator,
    /// Incoming edges, in insertion order.
    pub preds: EdgeList,
    /// Outgoing edges, in insertion order.
    pub succs: EdgeList,
}

// ── Functions ───────────────────────────────────────────────────────

/// A function body: blocks, edges, and per-value types.
///
/// The dominator tree itself is owned by a separate analysis; this
/// struct only tracks whether that cached analysis is still valid.
/// Transformations that change the CFG shape call
/// [`invalidate_dominators`](Function::invalidate_dominators).
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub blocks: Vec<Block>,
    pub entry: BlockId,
    edges: Vec<Option<Edge>>,
    value_types: Vec<IntType>,
    dominators_valid: bool,
}

impl Function {
    /// Create an empty function. The entry is block 0 once created.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            entry: BlockId::new(0),
            edges: Vec::new(),
            value_types: Vec::new(),
            dominators_valid: true,
        }
    }

    // ── Allocation ──────────────────────────────────────────────

    /// Append a fresh, empty, unreachable-terminated block.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId::new(
            u32::try_from(self.blocks.len()).unwrap_or_else(|_| panic!("block count exceeds u32")),
        );
        self.blocks.push(Block {
            id,
            phis: Vec::new(),
            stmts: Vec::new(),
            terminator: Terminator::Unreachable,
            preds: EdgeList::new(),
            succs: EdgeList::new(),
        });
        id
    }

    /// Allocate a fresh SSA value of type `ty`.
    pub fn new_value(&mut self, ty: IntType) -> ValueId {
        let id = ValueId::new(
            u32::try_from(self.value_types.len())
                .unwrap_or_else(|_| panic!("value count exceeds u32")),
        );
        self.value_types.push(ty);
        id
    }

    /// Type of an SSA value.
    #[inline]
    pub fn value_type(&self, v: ValueId) -> IntType {
        self.value_types[v.index()]
    }

    // ── Edge queries ────────────────────────────────────────────

    /// Borrow an edge.
    ///
    /// # Panics
    ///
    /// Panics if the edge has been removed.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("edge {} has been removed", id.raw()))
    }

    /// Mutably borrow an edge.
    ///
    /// # Panics
    ///
    /// Panics if the edge has been removed.
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        self.edges[id.index()]
            .as_mut()
            .unwrap_or_else(|| panic!("edge {} has been removed", id.raw()))
    }

    /// Whether `id` refers to a live (not removed) edge.
    #[inline]
    pub fn edge_exists(&self, id: EdgeId) -> bool {
        self.edges.get(id.index()).is_some_and(Option::is_some)
    }

    /// The edge from `src` to `dst`, if one exists.
    pub fn find_edge(&self, src: BlockId, dst: BlockId) -> Option<EdgeId> {
        self.blocks[src.index()]
            .succs
            .iter()
            .copied()
            .find(|&e| self.edge(e).dst == dst)
    }

    /// The single outgoing edge of `bb`.
    ///
    /// # Panics
    ///
    /// Debug-panics if `bb` does not have exactly one successor.
    pub fn single_succ_edge(&self, bb: BlockId) -> EdgeId {
        let succs = &self.blocks[bb.index()].succs;
        debug_assert_eq!(succs.len(), 1, "block {} has {} succs", bb.raw(), succs.len());
        succs[0]
    }

    /// The single incoming edge of `bb`.
    ///
    /// # Panics
    ///
    /// Debug-panics if `bb` does not have exactly one predecessor.
    pub fn single_pred_edge(&self, bb: BlockId) -> EdgeId {
        let preds = &self.blocks[bb.index()].preds;
        debug_assert_eq!(preds.len(), 1, "block {} has {} preds", bb.raw(), preds.len());
        preds[0]
    }

    // ── Surgery ─────────────────────────────────────────────────

    /// Create an edge from `src` to `dst`.
    pub fn make_edge(
        &mut self,
        src: BlockId,
        dst: BlockId,
        kind: EdgeKind,
        probability: Probability,
    ) -> EdgeId {
        let id = EdgeId::new(
            u32::try_from(self.edges.len()).unwrap_or_else(|_| panic!("edge count exceeds u32")),
        );
        self.edges.push(Some(Edge {
            src,
            dst,
            kind,
            probability,
        }));
        self.blocks[src.index()].succs.push(id);
        self.blocks[dst.index()].preds.push(id);
        id
    }

    /// Remove an edge, detaching it from both endpoints and dropping any
    /// PHI arguments keyed by it. The ID becomes a tombstone.
    pub fn remove_edge(&mut self, id: EdgeId) {
        let edge = *self.edge(id);
        self.blocks[edge.src.index()].succs.retain(|e| *e != id);
        let dst = &mut self.blocks[edge.dst.index()];
        dst.preds.retain(|e| *e != id);
        for phi in &mut dst.phis {
            phi.args.retain(|&(e, _)| e != id);
        }
        self.edges[id.index()] = None;
    }

    /// Point an existing edge at a new destination. PHI arguments keyed
    /// by this edge at the old destination are dropped; the caller is
    /// responsible for adding arguments at the new destination.
    pub fn redirect_edge(&mut self, id: EdgeId, new_dst: BlockId) {
        let old_dst = self.edge(id).dst;
        if old_dst == new_dst {
            return;
        }
        let old = &mut self.blocks[old_dst.index()];
        old.preds.retain(|e| *e != id);
        for phi in &mut old.phis {
            phi.args.retain(|&(e, _)| e != id);
        }
        self.blocks[new_dst.index()].preds.push(id);
        self.edge_mut(id).dst = new_dst;
    }

    /// Split `bb` after its statements: the terminator and all outgoing
    /// edges move to a fresh block, and `bb` falls through to it.
    /// Returns the new block and the fallthrough edge.
    pub fn split_block(&mut self, bb: BlockId) -> (BlockId, EdgeId) {
        let nb = self.new_block();
        let terminator = mem::replace(
            &mut self.blocks[bb.index()].terminator,
            Terminator::Unreachable,
        );
        let succs = mem::take(&mut self.blocks[bb.index()].succs);
        for &e in &succs {
            self.edge_mut(e).src = nb;
        }
        self.blocks[nb.index()].terminator = terminator;
        self.blocks[nb.index()].succs = succs;
        let fall = self.make_edge(bb, nb, EdgeKind::Fallthrough, Probability::always());
        self.blocks[bb.index()].terminator = Terminator::Goto { edge: fall };
        (nb, fall)
    }

    /// Insert an empty forwarding block in the middle of an edge.
    /// The edge keeps its ID, kind, and probability but now ends at the
    /// new block; PHI arguments at the old destination are re-keyed to
    /// the new fallthrough edge.
    pub fn split_edge(&mut self, id: EdgeId) -> BlockId {
        let old_dst = self.edge(id).dst;
        let nb = self.new_block();
        self.blocks[old_dst.index()].preds.retain(|e| *e != id);
        self.edge_mut(id).dst = nb;
        self.blocks[nb.index()].preds.push(id);
        let fall = self.make_edge(nb, old_dst, EdgeKind::Fallthrough, Probability::always());
        self.blocks[nb.index()].terminator = Terminator::Goto { edge: fall };
        for phi in &mut self.blocks[old_dst.index()].phis {
            for arg in &mut phi.args {
                if arg.0 == id {
                    arg.0 = fall;
                }
            }
        }
        nb
    }

    // ── Dominator cache ─────────────────────────────────────────

    /// Whether the cached dominator analysis is still usable.
    #[inline]
    pub fn dominators_valid(&self) -> bool {
        self.dominators_valid
    }

    /// Mark the cached dominator analysis stale. Called by any pass that
    /// changes the CFG shape; a later analysis pass recomputes it.
    pub fn invalidate_dominators(&mut self) {
        self.dominators_valid = false;
    }

    /// Record that the dominator analysis has been recomputed.
    pub fn mark_dominators_valid(&mut self) {
        self.dominators_valid = true;
    }
}

// ── Dump ────────────────────────────────────────────────────────────

fn fmt_operand(op: Operand) -> String {
    match op {
        Operand::Value(v) => format!("v{}", v.raw()),
        Operand::Const(c) => c.to_string(),
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn {} (entry bb{}):", self.name, self.entry.raw())?;
        for block in &self.blocks {
            writeln!(f, "bb{}:", block.id.raw())?;
            for phi in &block.phis {
                let args: Vec<String> = phi
                    .args
                    .iter()
                    .map(|&(e, op)| format!("e{}: {}", e.raw(), fmt_operand(op)))
                    .collect();
                writeln!(f, "  v{} = phi [{}]", phi.dst.raw(), args.join(", "))?;
            }
            for stmt in &block.stmts {
                let Stmt::Assign { dst, rhs } = stmt;
                let rhs = match rhs {
                    Rvalue::Use(op) => fmt_operand(*op),
                    Rvalue::BinOp { op, lhs, rhs } => {
                        let sym = match op {
                            BinOp::Sub => "-",
                            BinOp::Shl => "<<",
                            BinOp::BitAnd => "&",
                        };
                        format!("{} {sym} {}", fmt_operand(*lhs), fmt_operand(*rhs))
                    }
                    Rvalue::Cast { ty, value } => format!("({ty}) {}", fmt_operand(*value)),
                };
                writeln!(f, "  v{} = {rhs}", dst.raw())?;
            }
            match &block.terminator {
                Terminator::Goto { edge } => {
                    writeln!(f, "  goto bb{}", self.edge(*edge).dst.raw())?;
                }
                Terminator::CondBranch {
                    cond,
                    true_edge,
                    false_edge,
                } => {
                    let sym = match cond.op {
                        CmpOp::Eq => "==",
                        CmpOp::Ne => "!=",
                        CmpOp::Lt => "<",
                        CmpOp::Le => "<=",
                        CmpOp::Gt => ">",
                        CmpOp::Ge => ">=",
                    };
                    writeln!(
                        f,
                        "  if {} {sym} {} -> bb{} ({}) else bb{}",
                        fmt_operand(cond.lhs),
                        fmt_operand(cond.rhs),
                        self.edge(*true_edge).dst.raw(),
                        self.edge(*true_edge).probability,
                        self.edge(*false_edge).dst.raw(),
                    )?;
                }
                Terminator::Switch {
                    index,
                    labels,
                    default_edge,
                    ..
                } => {
                    writeln!(f, "  switch {} {{", fmt_operand(*index))?;
                    for label in labels {
                        if label.low == label.high {
                            writeln!(f, "    {} -> bb{}", label.low, label.target.raw())?;
                        } else {
                            writeln!(
                                f,
                                "    {}..={} -> bb{}",
                                label.low,
                                label.high,
                                label.target.raw()
                            )?;
                        }
                    }
                    writeln!(
                        f,
                        "    default -> bb{}",
                        self.edge(*default_edge).dst.raw()
                    )?;
                    writeln!(f, "  }}")?;
                }
                Terminator::Return { value } => match value {
                    Some(op) => writeln!(f, "  return {}", fmt_operand(*op))?,
                    None => writeln!(f, "  return")?,
                },
                Terminator::Unreachable => writeln!(f, "  unreachable")?,
            }
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn two_block_fn() -> (Function, BlockId, BlockId) {
        let mut f = Function::new("t");
        let a = f.new_block();
        let b = f.new_block();
        (f, a, b)
    }

    #[test]
    fn id_basics() {
        assert_eq!(BlockId::new(3).raw(), 3);
        assert_eq!(EdgeId::new(4).index(), 4);
        assert_eq!(ValueId::new(5).raw(), 5);
    }

    #[test]
    fn make_edge_links_both_endpoints() {
        let (mut f, a, b) = two_block_fn();
        let e = f.make_edge(a, b, EdgeKind::Fallthrough, Probability::always());
        assert_eq!(f.blocks[a.index()].succs.as_slice(), &[e]);
        assert_eq!(f.blocks[b.index()].preds.as_slice(), &[e]);
        assert_eq!(f.edge(e).src, a);
        assert_eq!(f.edge(e).dst, b);
    }

    #[test]
    fn find_edge_hits_and_misses() {
        let (mut f, a, b) = two_block_fn();
        let c = f.new_block();
        let e = f.make_edge(a, b, EdgeKind::True, Probability::always());
        assert_eq!(f.find_edge(a, b), Some(e));
        assert_eq!(f.find_edge(a, c), None);
        assert_eq!(f.find_edge(b, a), None);
    }

    #[test]
    fn remove_edge_detaches_and_tombstones() {
        let (mut f, a, b) = two_block_fn();
        let e = f.make_edge(a, b, EdgeKind::Case, Probability::always());
        f.remove_edge(e);
        assert!(f.blocks[a.index()].succs.is_empty());
        assert!(f.blocks[b.index()].preds.is_empty());
        assert!(!f.edge_exists(e));
    }

    #[test]
    fn remove_edge_drops_phi_args() {
        let (mut f, a, b) = two_block_fn();
        let e = f.make_edge(a, b, EdgeKind::Case, Probability::always());
        let v = f.new_value(IntType::signed(32));
        f.blocks[b.index()].phis.push(Phi {
            dst: v,
            args: vec![(e, Operand::Const(7))],
        });
        f.remove_edge(e);
        assert!(f.blocks[b.index()].phis[0].args.is_empty());
    }

    #[test]
    fn redirect_edge_moves_destination() {
        let (mut f, a, b) = two_block_fn();
        let c = f.new_block();
        let e = f.make_edge(a, b, EdgeKind::Fallthrough, Probability::always());
        f.redirect_edge(e, c);
        assert_eq!(f.edge(e).dst, c);
        assert!(f.blocks[b.index()].preds.is_empty());
        assert_eq!(f.blocks[c.index()].preds.as_slice(), &[e]);
        // Source side untouched.
        assert_eq!(f.blocks[a.index()].succs.as_slice(), &[e]);
    }

    #[test]
    fn split_block_moves_terminator_and_succs() {
        let (mut f, a, b) = two_block_fn();
        let e = f.make_edge(a, b, EdgeKind::True, Probability::always());
        f.blocks[a.index()].terminator = Terminator::Goto { edge: e };

        let (nb, fall) = f.split_block(a);
        assert_eq!(f.blocks[a.index()].terminator, Terminator::Goto { edge: fall });
        assert_eq!(f.blocks[nb.index()].terminator, Terminator::Goto { edge: e });
        assert_eq!(f.edge(e).src, nb);
        assert_eq!(f.edge(fall).src, a);
        assert_eq!(f.edge(fall).dst, nb);
    }

    #[test]
    fn split_edge_inserts_forwarding_block() {
        let (mut f, a, b) = two_block_fn();
        let e = f.make_edge(a, b, EdgeKind::Default, Probability::guessed(1, 4));
        let nb = f.split_edge(e);
        assert_eq!(f.edge(e).src, a);
        assert_eq!(f.edge(e).dst, nb);
        assert_eq!(f.edge(e).probability, Probability::guessed(1, 4));
        let fall = f.single_succ_edge(nb);
        assert_eq!(f.edge(fall).dst, b);
        assert_eq!(f.blocks[b.index()].preds.as_slice(), &[fall]);
    }

    #[test]
    fn split_edge_rekeys_phi_args() {
        let (mut f, a, b) = two_block_fn();
        let e = f.make_edge(a, b, EdgeKind::Case, Probability::always());
        let v = f.new_value(IntType::signed(32));
        f.blocks[b.index()].phis.push(Phi {
            dst: v,
            args: vec![(e, Operand::Const(3))],
        });
        let nb = f.split_edge(e);
        let fall = f.single_succ_edge(nb);
        assert_eq!(
            f.blocks[b.index()].phis[0].arg_for_edge(fall),
            Some(Operand::Const(3))
        );
        assert_eq!(f.blocks[b.index()].phis[0].arg_for_edge(e), None);
    }

    #[test]
    fn dominator_cache_flag() {
        let mut f = Function::new("t");
        assert!(f.dominators_valid());
        f.invalidate_dominators();
        assert!(!f.dominators_valid());
        f.mark_dominators_valid();
        assert!(f.dominators_valid());
    }

    #[test]
    fn phi_arg_lookup() {
        let phi = Phi {
            dst: ValueId::new(0),
            args: vec![
                (EdgeId::new(0), Operand::Const(1)),
                (EdgeId::new(1), Operand::Value(ValueId::new(2))),
            ],
        };
        assert_eq!(phi.arg_for_edge(EdgeId::new(0)), Some(Operand::Const(1)));
        assert_eq!(phi.arg_for_edge(EdgeId::new(9)), None);
    }

    #[test]
    fn display_dumps_blocks() {
        let (mut f, a, b) = two_block_fn();
        let e = f.make_edge(a, b, EdgeKind::Fallthrough, Probability::always());
        f.blocks[a.index()].terminator = Terminator::Goto { edge: e };
        f.blocks[b.index()].terminator = Terminator::Return { value: None };
        let dump = f.to_string();
        assert!(dump.contains("bb0:"));
        assert!(dump.contains("goto bb1"));
        assert!(dump.contains("return"));
    }
}
