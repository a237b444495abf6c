//! Jump-table finder.
//!
//! Dynamic program over cluster positions: `min[i]` is the smallest
//! number of output clusters the first `i` input clusters can be packed
//! into, where each output is either a lone input or a contiguous run
//! dense enough for a table (`can_be_handled`). Ties are broken toward
//! plans that leave fewer cases outside tables, so a table swallows
//! neighbouring singletons when it can. Runs in the optimal plan that
//! are long enough to be worth a table (`is_beneficial`) become
//! [`Cluster::JumpTable`] groups; the rest pass through unchanged.

use crate::cluster::{Cluster, GroupCluster, SimpleCluster};
use crate::config::LoweringConfig;

#[derive(Clone, Copy)]
struct MinItem {
    /// Output clusters for the prefix, or `u32::MAX` if unreached.
    count: u32,
    /// Start of the final run in the optimal packing of this prefix.
    start: usize,
    /// Cases left outside any beneficial table. Secondary criterion.
    non_table_cases: u32,
}

/// Can clusters `start..=end` be dispatched through one table?
///
/// A lone cluster always can (it "is" its own shape); a longer run must
/// span a range no more than `max_ratio` times the number of values it
/// actually covers, and the range must be representable in a `u64`
/// table index.
fn can_be_handled(clusters: &[Cluster], start: usize, end: usize, max_ratio: u64) -> bool {
    if start == end {
        return true;
    }
    let range_i = clusters[end].high() - clusters[start].low() + 1;
    let Ok(range) = u64::try_from(range_i) else {
        return false;
    };
    let mut covered: u64 = 0;
    for cluster in &clusters[start..=end] {
        if !cluster.is_simple() {
            return false;
        }
        let width = u64::try_from(cluster.high() - cluster.low() + 1).unwrap_or(u64::MAX);
        covered = covered.saturating_add(width);
    }
    range <= max_ratio.saturating_mul(covered)
}

/// Is a table for `start..=end` expected to beat a comparison tree?
fn is_beneficial(start: usize, end: usize, config: &LoweringConfig) -> bool {
    end - start + 1 >= config.case_values_threshold as usize
}

/// Group table-worthy runs of `clusters` into jump-table clusters.
pub fn find_jump_tables(clusters: Vec<Cluster>, config: &LoweringConfig) -> Vec<Cluster> {
    if !config.jump_tables_enabled || clusters.len() < config.case_values_threshold as usize {
        return clusters;
    }
    let len = clusters.len();
    let max_ratio = config.max_ratio();

    let mut min: Vec<MinItem> = Vec::with_capacity(len + 1);
    min.push(MinItem {
        count: 0,
        start: 0,
        non_table_cases: 0,
    });
    for i in 1..=len {
        min.push(MinItem {
            count: u32::MAX,
            start: 0,
            non_table_cases: u32::MAX,
        });
        for j in 0..i {
            if min[j].count == u32::MAX {
                continue;
            }
            let run = i - j;
            let mut outside = min[j].non_table_cases;
            if run < config.case_values_threshold as usize {
                outside = outside.saturating_add(u32::try_from(run).unwrap_or(u32::MAX));
            }
            let count = min[j].count + 1;
            let better = count < min[i].count
                || (count == min[i].count && outside < min[i].non_table_cases);
            if better && can_be_handled(&clusters, j, i - 1, max_ratio) {
                min[i] = MinItem {
                    count,
                    start: j,
                    non_table_cases: outside,
                };
            }
        }
    }
    debug_assert_ne!(min[len].count, u32::MAX, "dp never fails: singles stand alone");
    if min[len].count as usize == len {
        // Every run is a singleton; nothing to group.
        return clusters;
    }

    // Walk the start pointers backwards to recover the run boundaries.
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut end = len;
    while end > 0 {
        let start = min[end].start;
        runs.push((start, end));
        end = start;
    }
    runs.reverse();

    let mut out: Vec<Cluster> = Vec::with_capacity(runs.len());
    let mut iter = clusters.into_iter();
    for (start, end) in runs {
        let run: Vec<Cluster> = iter.by_ref().take(end - start).collect();
        if is_beneficial(start, end - 1, config) {
            let cases: Vec<SimpleCluster> = run
                .into_iter()
                .map(|c| match c {
                    Cluster::Simple(s) => s,
                    _ => panic!("grouped run contains a non-simple cluster"),
                })
                .collect();
            out.push(Cluster::JumpTable(GroupCluster {
                cases,
                dispatch_block: None,
            }));
        } else {
            out.extend(run);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use vesta_ir::{BlockId, Probability};

    use super::*;

    fn simples(ranges: &[(i128, i128)]) -> Vec<Cluster> {
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(low, high))| {
                Cluster::Simple(SimpleCluster {
                    low,
                    high,
                    target: BlockId::new(u32::try_from(i).unwrap_or(0)),
                    label_index: i,
                    prob: Probability::guessed(1, ranges.len() as u64),
                })
            })
            .collect()
    }

    fn shape(clusters: &[Cluster]) -> Vec<(char, usize)> {
        clusters
            .iter()
            .map(|c| match c {
                Cluster::Simple(_) => ('s', 1),
                Cluster::JumpTable(g) => ('t', g.cases.len()),
                Cluster::BitTest(g) => ('b', g.cases.len()),
            })
            .collect()
    }

    #[test]
    fn dense_run_becomes_one_table() {
        let input = simples(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        let out = find_jump_tables(input, &LoweringConfig::default());
        assert_eq!(shape(&out), vec![('t', 5)]);
    }

    #[test]
    fn short_run_stays_simple() {
        let input = simples(&[(1, 1), (2, 2), (3, 3)]);
        let out = find_jump_tables(input, &LoweringConfig::default());
        assert_eq!(shape(&out), vec![('s', 1), ('s', 1), ('s', 1)]);
    }

    #[test]
    fn sparse_values_are_not_grouped() {
        // Any pair is more than 10x sparser than its coverage.
        let input = simples(&[(0, 0), (1_000, 1_000), (2_000, 2_000), (3_000, 3_000)]);
        let out = find_jump_tables(input, &LoweringConfig::default());
        assert_eq!(out.iter().filter(|c| !c.is_simple()).count(), 0);
    }

    #[test]
    fn outlier_is_split_off() {
        // 1..=8 is table-worthy; 10_000 would ruin its density.
        let input = simples(&[
            (1, 1),
            (2, 2),
            (3, 3),
            (4, 4),
            (5, 5),
            (6, 6),
            (7, 7),
            (8, 8),
            (10_000, 10_000),
        ]);
        let out = find_jump_tables(input, &LoweringConfig::default());
        assert_eq!(shape(&out), vec![('t', 8), ('s', 1)]);
    }

    #[test]
    fn ratio_uses_covered_values_not_label_count() {
        // Two wide ranges cover 200 values over a range of 300; dense
        // enough, but only two clusters, so not beneficial.
        let input = simples(&[(0, 99), (200, 299)]);
        let out = find_jump_tables(input, &LoweringConfig::default());
        assert_eq!(shape(&out), vec![('s', 1), ('s', 1)]);
    }

    #[test]
    fn size_opt_ratio_rejects_what_speed_accepts() {
        // Range 17, covered 4: ratio 4.25 passes 10, fails 3.
        let ranges = [(0, 0), (5, 5), (11, 11), (16, 16)];
        let speed = find_jump_tables(simples(&ranges), &LoweringConfig::default());
        assert_eq!(shape(&speed), vec![('t', 4)]);
        let config = LoweringConfig {
            optimize_size: true,
            ..LoweringConfig::default()
        };
        let size = find_jump_tables(simples(&ranges), &config);
        assert_eq!(size.iter().filter(|c| !c.is_simple()).count(), 0);
    }

    #[test]
    fn disabled_tables_pass_through() {
        let config = LoweringConfig {
            jump_tables_enabled: false,
            ..LoweringConfig::default()
        };
        let input = simples(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        let out = find_jump_tables(input, &config);
        assert_eq!(out.iter().filter(|c| !c.is_simple()).count(), 0);
    }

    #[test]
    fn distant_dense_runs_become_two_tables() {
        // Two dense runs too far apart to share a table: spanning the
        // gap would cover 10 of 604 slots.
        let input = simples(&[
            (0, 0),
            (1, 1),
            (2, 2),
            (3, 3),
            (4, 4),
            (5, 5),
            (600, 600),
            (601, 601),
            (602, 602),
            (603, 603),
        ]);
        let out = find_jump_tables(input, &LoweringConfig::default());
        assert_eq!(shape(&out), vec![('t', 6), ('t', 4)]);
    }
}
