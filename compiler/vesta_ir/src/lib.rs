//! Mid-level IR for the Vesta compiler.
//!
//! This crate provides the slice of the middle end that CFG-shape
//! transformations operate on:
//!
//! - **CFG core** ([`Function`], [`Block`], [`Edge`], [`Phi`]) — basic
//!   blocks with first-class edges carrying [`Probability`] profile
//!   weights, PHI operands keyed by incoming [`EdgeId`], and the surgery
//!   primitives (`split_block`, `split_edge`, `make_edge`,
//!   `remove_edge`, `redirect_edge`) passes use to rewrite shape.
//! - **Statements and terminators** ([`Stmt`], [`Terminator`]) — the
//!   integer assignment/compare/branch/switch subset that switch
//!   lowering reads and emits.
//! - **Builder** ([`FunctionBuilder`]) — "allocate, emit, terminate"
//!   construction helper.
//! - **Evaluator** ([`eval::route`]) — a concrete interpreter over the
//!   CFG used to differentially test transformations.
//!
//! # Design
//!
//! Edges have identity and are never renumbered: removal leaves a
//! tombstone. That lets passes record facts keyed by `EdgeId` before
//! surgery and reconcile them afterwards without aliasing hazards.

pub mod builder;
pub mod cfg;
pub mod eval;
pub mod prob;
pub mod ty;

pub use builder::FunctionBuilder;
pub use cfg::{
    BinOp, Block, BlockId, CaseLabel, CmpOp, Cond, Edge, EdgeId, EdgeKind, EdgeList, Function,
    Operand, Phi, Rvalue, Stmt, Terminator, ValueId,
};
pub use prob::Probability;
pub use ty::IntType;
