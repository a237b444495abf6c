//! Feasibility gate for whole-switch conversion to a lookup of
//! constant results.
//!
//! A switch whose case blocks are empty forwarders into one common
//! merge block can be replaced wholesale by indexing into an array of
//! the merged PHI constants. That rewrite has stricter structural
//! demands than per-cluster lowering, so its checks are separated here:
//! each one either passes or names the precise reason the switch does
//! not qualify, and the caller can report that reason instead of a
//! generic refusal.

use vesta_ir::{BlockId, Function, Terminator};

use crate::collect::CollectedSwitch;
use crate::config::LoweringConfig;
use crate::SkipReason;

/// Check whether the collected switch qualifies for array conversion.
pub fn check_array_conversion(
    func: &Function,
    collected: &CollectedSwitch,
    config: &LoweringConfig,
) -> Result<(), SkipReason> {
    check_range(collected, config)?;
    let merge = check_common_successor(func, collected)?;
    check_forwarders_empty(func, collected, merge)?;
    Ok(())
}

/// The spanned range must be representable and not too sparse: a huge,
/// mostly-default range would make the value array absurd.
fn check_range(collected: &CollectedSwitch, config: &LoweringConfig) -> Result<(), SkipReason> {
    let clusters = &collected.clusters;
    let low = clusters[0].low;
    let high = clusters[clusters.len() - 1].high;
    let span = high
        .checked_sub(low)
        .and_then(|s| s.checked_add(1))
        .ok_or(SkipReason::RangeTooLarge)?;
    let range = u64::try_from(span).map_err(|_| SkipReason::RangeTooLarge)?;
    let count: u64 = clusters
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.value_count()));
    if range > config.max_ratio().saturating_mul(count) {
        return Err(SkipReason::RatioExceeded { range, count });
    }
    Ok(())
}

/// Every case target (and the default) must flow into one merge block.
fn check_common_successor(
    func: &Function,
    collected: &CollectedSwitch,
) -> Result<BlockId, SkipReason> {
    let mut merge: Option<BlockId> = None;
    let targets = collected
        .clusters
        .iter()
        .map(|c| c.target)
        .chain(std::iter::once(collected.default_block));
    for target in targets {
        let block = &func.blocks[target.index()];
        let succ = match block.succs.as_slice() {
            &[e] => func.edge(e).dst,
            // The merge block itself may be a case target.
            _ if merge == Some(target) => continue,
            _ => return Err(SkipReason::NoCommonSuccessor),
        };
        match merge {
            None => merge = Some(succ),
            Some(m) if m == succ || m == target => {}
            Some(_) => return Err(SkipReason::NoCommonSuccessor),
        }
    }
    merge.ok_or(SkipReason::NoCommonSuccessor)
}

/// The forwarding blocks must carry no code of their own; anything but
/// a bare goto would be lost by the conversion.
fn check_forwarders_empty(
    func: &Function,
    collected: &CollectedSwitch,
    merge: BlockId,
) -> Result<(), SkipReason> {
    for cluster in &collected.clusters {
        if cluster.target == merge {
            continue;
        }
        let block = &func.blocks[cluster.target.index()];
        let forwarding = block.stmts.is_empty()
            && block.phis.is_empty()
            && matches!(block.terminator, Terminator::Goto { .. });
        if !forwarding {
            return Err(SkipReason::NonEmptyIntermediateBlock);
        }
    }
    Ok(())
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests {
    use pretty_assertions::assert_eq;

    use vesta_ir::{FunctionBuilder, IntType, Operand, Rvalue, Stmt};

    use crate::collect::collect_simple_clusters;

    use super::*;

    /// `switch (x) { 1 -> a; 2 -> b; default -> d }` with all three
    /// targets forwarding into one merge block.
    fn diamond(labels: &[(i128, i128)]) -> (vesta_ir::Function, BlockId) {
        let mut b = FunctionBuilder::new("t");
        let entry = b.entry();
        let ty = IntType::signed(32);
        let x = b.new_value(ty);
        let merge = b.new_block();
        b.ret(merge);
        let targets: Vec<BlockId> = labels.iter().map(|_| b.new_block()).collect();
        let default = b.new_block();
        let table: Vec<(i128, i128, BlockId)> = labels
            .iter()
            .zip(&targets)
            .map(|(&(lo, hi), &t)| (lo, hi, t))
            .collect();
        b.switch(entry, Operand::Value(x), ty, &table, default);
        for &t in &targets {
            b.goto(t, merge);
        }
        b.goto(default, merge);
        (b.finish(), entry)
    }

    fn collected(f: &vesta_ir::Function, entry: BlockId) -> CollectedSwitch {
        collect_simple_clusters(f, entry).unwrap()
    }

    #[test]
    fn diamond_shape_qualifies() {
        let (f, entry) = diamond(&[(1, 1), (2, 2), (3, 3)]);
        let c = collected(&f, entry);
        assert_eq!(
            check_array_conversion(&f, &c, &LoweringConfig::default()),
            Ok(())
        );
    }

    #[test]
    fn sparse_switch_reports_ratio() {
        let (f, entry) = diamond(&[(0, 0), (1_000_000, 1_000_000)]);
        let c = collected(&f, entry);
        assert_eq!(
            check_array_conversion(&f, &c, &LoweringConfig::default()),
            Err(SkipReason::RatioExceeded {
                range: 1_000_001,
                count: 2
            })
        );
    }

    #[test]
    fn diverging_targets_report_no_common_successor() {
        let (mut f, entry) = diamond(&[(1, 1), (2, 2)]);
        let c = collected(&f, entry);
        // Re-point one forwarder somewhere else.
        let elsewhere = f.new_block();
        let stray = f.single_succ_edge(c.clusters[0].target);
        f.redirect_edge(stray, elsewhere);
        assert_eq!(
            check_array_conversion(&f, &c, &LoweringConfig::default()),
            Err(SkipReason::NoCommonSuccessor)
        );
    }

    #[test]
    fn computing_forwarder_reports_non_empty() {
        let (mut f, entry) = diamond(&[(1, 1), (2, 2)]);
        let c = collected(&f, entry);
        let v = f.new_value(IntType::signed(32));
        f.blocks[c.clusters[0].target.index()]
            .stmts
            .push(Stmt::Assign {
                dst: v,
                rhs: Rvalue::Use(Operand::Const(1)),
            });
        assert_eq!(
            check_array_conversion(&f, &c, &LoweringConfig::default()),
            Err(SkipReason::NonEmptyIntermediateBlock)
        );
    }
}
