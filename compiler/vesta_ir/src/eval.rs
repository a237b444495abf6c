//! Concrete CFG evaluator, used for differential testing.
//!
//! Routes a set of input values through a function's control flow,
//! executing statements over an integer environment and resolving PHI
//! nodes per traversed edge. Transformation passes are validated by
//! routing the same inputs through the function before and after the
//! rewrite and comparing where control ends up and what every PHI
//! resolved to.
//!
//! This is test support: it panics on malformed CFGs (undefined values,
//! dangling edges, non-terminating walks) instead of reporting errors,
//! so a broken transformation fails loudly.

use rustc_hash::FxHashMap;

use crate::cfg::{BinOp, BlockId, CmpOp, EdgeId, Function, Operand, Rvalue, Stmt, Terminator};

/// Everything observed while routing one set of inputs through a CFG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    /// The block the walk stopped in (`Return` or `Unreachable`).
    pub exit_block: BlockId,
    /// Number of conditional branches executed. Multi-way switch
    /// dispatch counts as zero comparisons.
    pub comparisons: u32,
    /// The value each traversed PHI node resolved to.
    pub phi_values: FxHashMap<crate::cfg::ValueId, i128>,
}

struct Walker<'a> {
    func: &'a Function,
    env: FxHashMap<crate::cfg::ValueId, i128>,
    trace: Trace,
}

impl Walker<'_> {
    fn operand(&self, op: Operand) -> i128 {
        match op {
            Operand::Const(c) => c,
            Operand::Value(v) => *self
                .env
                .get(&v)
                .unwrap_or_else(|| panic!("v{} read before definition", v.raw())),
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt) {
        let Stmt::Assign { dst, rhs } = stmt;
        let value = match rhs {
            Rvalue::Use(op) => self.operand(*op),
            Rvalue::BinOp { op, lhs, rhs } => {
                let l = self.operand(*lhs);
                let r = self.operand(*rhs);
                match op {
                    BinOp::Sub => l - r,
                    BinOp::Shl => match u32::try_from(r) {
                        Ok(shift) if shift < 127 => l << shift,
                        _ => 0,
                    },
                    BinOp::BitAnd => l & r,
                }
            }
            Rvalue::Cast { ty, value } => ty.wrap(self.operand(*value)),
        };
        self.env.insert(*dst, value);
    }

    /// Enter `dst` along `edge`, resolving its PHI nodes.
    fn cross_edge(&mut self, edge: EdgeId) -> BlockId {
        let dst = self.func.edge(edge).dst;
        // PHI semantics are parallel; evaluate all operands against the
        // pre-entry environment before writing any result.
        let resolved: Vec<(crate::cfg::ValueId, i128)> = self.func.blocks[dst.index()]
            .phis
            .iter()
            .map(|phi| {
                let op = phi.arg_for_edge(edge).unwrap_or_else(|| {
                    panic!(
                        "phi v{} in bb{} has no operand for edge e{}",
                        phi.dst.raw(),
                        dst.raw(),
                        edge.raw()
                    )
                });
                (phi.dst, self.operand(op))
            })
            .collect();
        for (dst_v, val) in resolved {
            self.env.insert(dst_v, val);
            self.trace.phi_values.insert(dst_v, val);
        }
        dst
    }

    fn cmp(op: CmpOp, l: i128, r: i128) -> bool {
        match op {
            CmpOp::Eq => l == r,
            CmpOp::Ne => l != r,
            CmpOp::Lt => l < r,
            CmpOp::Le => l <= r,
            CmpOp::Gt => l > r,
            CmpOp::Ge => l >= r,
        }
    }
}

/// Route `inputs` through `func` starting at its entry block.
///
/// # Panics
///
/// Panics if the walk reads an undefined value, crosses an edge with a
/// missing PHI operand, or fails to terminate within a step budget.
pub fn route(func: &Function, inputs: &[(crate::cfg::ValueId, i128)]) -> Trace {
    let mut walker = Walker {
        func,
        env: inputs.iter().copied().collect(),
        trace: Trace {
            exit_block: func.entry,
            comparisons: 0,
            phi_values: FxHashMap::default(),
        },
    };

    let mut bb = func.entry;
    for _ in 0..100_000 {
        for stmt in &func.blocks[bb.index()].stmts {
            walker.exec_stmt(stmt);
        }
        match &func.blocks[bb.index()].terminator {
            Terminator::Goto { edge } => {
                bb = walker.cross_edge(*edge);
            }
            Terminator::CondBranch {
                cond,
                true_edge,
                false_edge,
            } => {
                walker.trace.comparisons += 1;
                let l = walker.operand(cond.lhs);
                let r = walker.operand(cond.rhs);
                let edge = if Walker::cmp(cond.op, l, r) {
                    *true_edge
                } else {
                    *false_edge
                };
                bb = walker.cross_edge(edge);
            }
            Terminator::Switch {
                index,
                labels,
                default_edge,
                ..
            } => {
                let v = walker.operand(*index);
                let edge = labels
                    .iter()
                    .find(|l| l.low <= v && v <= l.high)
                    .map(|l| {
                        func.find_edge(bb, l.target).unwrap_or_else(|| {
                            panic!("no edge from bb{} to case target bb{}", bb.raw(), l.target.raw())
                        })
                    })
                    .unwrap_or(*default_edge);
                bb = walker.cross_edge(edge);
            }
            Terminator::Return { .. } | Terminator::Unreachable => {
                walker.trace.exit_block = bb;
                return walker.trace;
            }
        }
    }
    panic!("evaluation of `{}` did not terminate", func.name);
}
