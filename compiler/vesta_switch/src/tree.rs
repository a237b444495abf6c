//! Balanced comparison tree over the final cluster list.
//!
//! Whatever the finders did not swallow into a group is dispatched by a
//! binary tree of comparisons. Nodes are kept in an arena indexed by
//! [`NodeId`]; children and parent are arena links, so the emitter can
//! walk *up* from a node to discover bounds already established by
//! enclosing comparisons.
//!
//! The split point weighs a range cluster as two comparisons and a
//! singleton as one, so the tree balances comparison *work*, not node
//! count. Lists of one or two items become a chain instead of a pivot:
//! a chain of equality tests is cheaper than a bounds check when there
//! is almost nothing to dispatch.

use std::fmt::Write as _;

use vesta_ir::{BlockId, Probability};

/// Index into [`CaseTree::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn new(raw: usize) -> Self {
        Self(u32::try_from(raw).unwrap_or_else(|_| panic!("case tree exceeds u32 nodes")))
    }

    /// Get the index as `usize` (for indexing into the arena).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What one tree node dispatches: a value range and where it jumps.
/// For a grouped cluster the target is its dispatch block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeItem {
    pub low: i128,
    pub high: i128,
    pub prob: Probability,
    pub target: BlockId,
}

/// One node of the comparison tree.
#[derive(Clone, Debug)]
pub struct CaseNode {
    pub item: TreeItem,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
    /// Probability mass of this node and everything below it.
    pub subtree_prob: Probability,
}

impl CaseNode {
    /// Whether this node covers exactly one value.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.item.low == self.item.high
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena-allocated balanced comparison tree.
#[derive(Clone, Debug)]
pub struct CaseTree {
    pub nodes: Vec<CaseNode>,
    pub root: Option<NodeId>,
}

impl CaseTree {
    /// Build a balanced tree over `items` (sorted ascending, disjoint).
    pub fn build(items: &[TreeItem]) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(items.len()),
            root: None,
        };
        tree.root = tree.build_range(items, 0, items.len(), None);
        tree
    }

    pub fn node(&self, id: NodeId) -> &CaseNode {
        &self.nodes[id.index()]
    }

    fn push(&mut self, item: TreeItem, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(CaseNode {
            item,
            left: None,
            right: None,
            parent,
            subtree_prob: item.prob,
        });
        id
    }

    fn build_range(
        &mut self,
        items: &[TreeItem],
        start: usize,
        end: usize,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        let n = end - start;
        if n == 0 {
            return None;
        }
        if n <= 2 {
            // A chain: head with at most one right sibling.
            let head = self.push(items[start], parent);
            if n == 2 {
                let next = self.push(items[start + 1], Some(head));
                self.nodes[head.index()].right = Some(next);
                let next_prob = self.nodes[next.index()].subtree_prob;
                self.nodes[head.index()].subtree_prob = items[start].prob + next_prob;
            }
            return Some(head);
        }

        let pivot = if n == 3 {
            1
        } else {
            // Aim for equal comparison cost on both sides: a range
            // costs two comparisons, a singleton one.
            let ranges = items[start..end].iter().filter(|it| it.low != it.high).count();
            let mut weight = i64::try_from((n + ranges + 1) / 2).unwrap_or(i64::MAX);
            let mut k = 0;
            loop {
                let it = &items[start + k];
                if it.low != it.high {
                    weight -= 1;
                }
                weight -= 1;
                if weight <= 0 {
                    break;
                }
                k += 1;
            }
            k
        };

        let id = self.push(items[start + pivot], parent);
        let left = self.build_range(items, start, start + pivot, Some(id));
        let right = self.build_range(items, start + pivot + 1, end, Some(id));
        self.nodes[id.index()].left = left;
        self.nodes[id.index()].right = right;
        let mut subtree = items[start + pivot].prob;
        if let Some(l) = left {
            subtree += self.nodes[l.index()].subtree_prob;
        }
        if let Some(r) = right {
            subtree += self.nodes[r.index()].subtree_prob;
        }
        self.nodes[id.index()].subtree_prob = subtree;
        Some(id)
    }

    /// Longest root-to-leaf path, in nodes. Empty tree has depth 0.
    pub fn depth(&self) -> u32 {
        fn walk(tree: &CaseTree, id: Option<NodeId>) -> u32 {
            match id {
                None => 0,
                Some(id) => {
                    let node = tree.node(id);
                    1 + walk(tree, node.left).max(walk(tree, node.right))
                }
            }
        }
        walk(self, self.root)
    }

    /// Indented dump of the tree shape, for trace logging.
    pub fn dump(&self) -> String {
        fn walk(tree: &CaseTree, id: Option<NodeId>, depth: usize, out: &mut String) {
            let Some(id) = id else { return };
            let node = tree.node(id);
            walk(tree, node.left, depth + 1, out);
            let pad = "  ".repeat(depth);
            if node.is_single() {
                let _ = writeln!(
                    out,
                    "{pad}{} -> bb{} ({})",
                    node.item.low,
                    node.item.target.raw(),
                    node.item.prob
                );
            } else {
                let _ = writeln!(
                    out,
                    "{pad}{}..={} -> bb{} ({})",
                    node.item.low,
                    node.item.high,
                    node.item.target.raw(),
                    node.item.prob
                );
            }
            walk(tree, node.right, depth + 1, out);
        }
        let mut out = String::new();
        walk(self, self.root, 0, &mut out);
        out
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn singles(values: &[i128]) -> Vec<TreeItem> {
        values
            .iter()
            .map(|&v| TreeItem {
                low: v,
                high: v,
                prob: Probability::guessed(1, values.len() as u64 + 1),
                target: BlockId::new(0),
            })
            .collect()
    }

    #[test]
    fn empty_list_builds_empty_tree() {
        let tree = CaseTree::build(&[]);
        assert!(tree.root.is_none());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn two_items_build_a_chain() {
        let tree = CaseTree::build(&singles(&[1, 5]));
        let root = tree.root.unwrap();
        let root_node = tree.node(root);
        assert_eq!(root_node.item.low, 1);
        assert!(root_node.left.is_none());
        let right = root_node.right.unwrap();
        assert_eq!(tree.node(right).item.low, 5);
        assert_eq!(tree.node(right).parent, Some(root));
    }

    #[test]
    fn three_items_pivot_on_middle() {
        let tree = CaseTree::build(&singles(&[1, 5, 9]));
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).item.low, 5);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn seven_singles_balance_to_depth_three() {
        let tree = CaseTree::build(&singles(&[1, 2, 3, 4, 5, 6, 7]));
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).item.low, 4);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn ranges_weigh_double_when_splitting() {
        // [0..=9] costs two comparisons; it pulls the pivot right-ward
        // compared to a singleton in the same slot.
        let items = vec![
            TreeItem {
                low: 0,
                high: 9,
                prob: Probability::guessed(1, 5),
                target: BlockId::new(0),
            },
            TreeItem {
                low: 20,
                high: 29,
                prob: Probability::guessed(1, 5),
                target: BlockId::new(1),
            },
            TreeItem {
                low: 40,
                high: 40,
                prob: Probability::guessed(1, 5),
                target: BlockId::new(2),
            },
            TreeItem {
                low: 41,
                high: 41,
                prob: Probability::guessed(1, 5),
                target: BlockId::new(3),
            },
            TreeItem {
                low: 42,
                high: 42,
                prob: Probability::guessed(1, 5),
                target: BlockId::new(4),
            },
        ];
        let tree = CaseTree::build(&items);
        let root = tree.root.unwrap();
        // Weight 2+2+1+1+1 = 7; half rounds to the second range.
        assert_eq!(tree.node(root).item.low, 20);
    }

    #[test]
    fn depth_stays_logarithmic_for_singletons() {
        for n in 1u32..=64 {
            let values: Vec<i128> = (0..i128::from(n)).collect();
            let tree = CaseTree::build(&singles(&values));
            let ceil_log2 = 32 - (n - 1).leading_zeros().min(32);
            assert!(
                tree.depth() <= ceil_log2 + 1,
                "depth {} for {n} items exceeds {}",
                tree.depth(),
                ceil_log2 + 1
            );
        }
    }

    #[test]
    fn subtree_probability_accumulates() {
        let tree = CaseTree::build(&singles(&[1, 2, 3]));
        let root = tree.root.unwrap();
        let each = Probability::guessed(1, 4);
        assert_eq!(tree.node(root).subtree_prob, each + each + each);
        let left = tree.node(root).left.unwrap();
        assert_eq!(tree.node(left).subtree_prob, each);
    }

    #[test]
    fn dump_is_in_value_order() {
        let tree = CaseTree::build(&singles(&[3, 7, 11]));
        let dump = tree.dump();
        let pos3 = dump.find("3 ->").unwrap();
        let pos7 = dump.find("7 ->").unwrap();
        let pos11 = dump.find("11 ->").unwrap();
        assert!(pos3 < pos7 && pos7 < pos11);
    }
}
