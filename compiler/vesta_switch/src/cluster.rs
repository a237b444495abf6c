//! The cluster model: the unit of code-shape selection.
//!
//! A switch's sorted label table is first broken into *simple* clusters,
//! one per contiguous value range sharing a target. The finders then
//! group runs of neighbouring clusters into jump-table or bit-test
//! clusters where that shape is feasible and beneficial; whatever stays
//! simple is handled by the comparison tree. A grouped cluster behaves
//! like one opaque range from the tree's point of view: the tree routes
//! control to the group's dispatch block, and the group expands itself
//! there later.

use vesta_ir::{BlockId, Probability};

/// One contiguous value range `[low, high]` jumping to a single target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimpleCluster {
    pub low: i128,
    pub high: i128,
    pub target: BlockId,
    /// Position of the originating label in the switch's label table.
    /// Used as a deterministic tiebreak when emission orders clusters
    /// by other criteria.
    pub label_index: usize,
    /// Estimated probability that the switch index lands in this range.
    pub prob: Probability,
}

impl SimpleCluster {
    /// Number of distinct values covered, saturating at `u64::MAX`.
    pub fn value_count(&self) -> u64 {
        u64::try_from(self.high - self.low + 1).unwrap_or(u64::MAX)
    }
}

/// A run of simple clusters grouped under one dispatch shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCluster {
    /// Member clusters, sorted ascending and non-overlapping.
    pub cases: Vec<SimpleCluster>,
    /// Block the expanded dispatch code is emitted into. Allocated when
    /// the lowerer commits to a plan; `None` during analysis.
    pub dispatch_block: Option<BlockId>,
}

impl GroupCluster {
    pub fn low(&self) -> i128 {
        self.cases[0].low
    }

    pub fn high(&self) -> i128 {
        self.cases[self.cases.len() - 1].high
    }

    /// Combined probability mass of all member ranges.
    pub fn total_prob(&self) -> Probability {
        self.cases
            .iter()
            .fold(Probability::never(), |acc, c| acc + c.prob)
    }

    /// Number of distinct targets among the members.
    pub fn distinct_targets(&self) -> usize {
        let mut targets: Vec<BlockId> = self.cases.iter().map(|c| c.target).collect();
        targets.sort_unstable();
        targets.dedup();
        targets.len()
    }
}

/// A code-shape decision for one contiguous piece of the label table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cluster {
    /// Handled by the comparison tree directly.
    Simple(SimpleCluster),
    /// Expanded into a table-dispatch switch in its dispatch block.
    JumpTable(GroupCluster),
    /// Expanded into word-mask membership tests in its dispatch block.
    BitTest(GroupCluster),
}

impl Cluster {
    pub fn low(&self) -> i128 {
        match self {
            Cluster::Simple(c) => c.low,
            Cluster::JumpTable(g) | Cluster::BitTest(g) => g.low(),
        }
    }

    pub fn high(&self) -> i128 {
        match self {
            Cluster::Simple(c) => c.high,
            Cluster::JumpTable(g) | Cluster::BitTest(g) => g.high(),
        }
    }

    /// Probability that the index falls anywhere inside this cluster.
    pub fn probability(&self) -> Probability {
        match self {
            Cluster::Simple(c) => c.prob,
            Cluster::JumpTable(g) | Cluster::BitTest(g) => g.total_prob(),
        }
    }

    /// Whether this is an ungrouped simple cluster.
    pub fn is_simple(&self) -> bool {
        matches!(self, Cluster::Simple(_))
    }
}
