#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Property tests: for arbitrary sorted, disjoint label tables and a
//! spread of configurations, the lowered control flow must route every
//! value in (and just outside) the covered domain to exactly the block
//! the original label table selects, resolving PHIs to the same values.

use proptest::prelude::*;

use vesta_ir::{eval, BlockId, Function, FunctionBuilder, IntType, Operand, Phi, ValueId};
use vesta_switch::collect::collect_simple_clusters;
use vesta_switch::config::{DefaultCostModel, LoweringConfig};
use vesta_switch::lower_switch;

#[derive(Clone, Debug)]
struct LabelSpec {
    gap: i128,
    width: i128,
    target: usize,
}

fn label_specs() -> impl Strategy<Value = Vec<LabelSpec>> {
    prop::collection::vec(
        (1i128..30, 0i128..4, 0usize..4).prop_map(|(gap, width, target)| LabelSpec {
            gap,
            width,
            target,
        }),
        2..12,
    )
}

fn config_variants() -> impl Strategy<Value = LoweringConfig> {
    prop_oneof![
        Just(LoweringConfig::default()),
        Just(LoweringConfig {
            jump_tables_enabled: false,
            ..LoweringConfig::default()
        }),
        Just(LoweringConfig {
            optimize_size: true,
            ..LoweringConfig::default()
        }),
        Just(LoweringConfig {
            case_values_threshold: 6,
            ..LoweringConfig::default()
        }),
    ]
}

/// Realize the specs as a switch over four return-block targets, with
/// PHIs at the first target and the default keyed by the switch edges.
fn build(specs: &[LabelSpec], base: i128) -> (Function, BlockId, ValueId, i128, i128) {
    let ty = IntType::signed(32);
    let mut b = FunctionBuilder::new("p");
    let entry = b.entry();
    let x = b.new_value(ty);
    let targets: Vec<BlockId> = (0..4)
        .map(|_| {
            let t = b.new_block();
            b.ret(t);
            t
        })
        .collect();
    let default = b.new_block();
    b.ret(default);

    let mut table: Vec<(i128, i128, BlockId)> = Vec::new();
    let mut next = base;
    for spec in specs {
        let low = next + spec.gap;
        let high = low + spec.width;
        table.push((low, high, targets[spec.target]));
        next = high;
    }
    b.switch(entry, Operand::Value(x), ty, &table, default);
    let mut f = b.finish();

    if let Some(e) = f.find_edge(entry, targets[0]) {
        let p = f.new_value(ty);
        f.blocks[targets[0].index()].phis.push(Phi {
            dst: p,
            args: vec![(e, Operand::Const(11))],
        });
    }
    if let Some(e) = f.find_edge(entry, default) {
        let q = f.new_value(ty);
        f.blocks[default.index()].phis.push(Phi {
            dst: q,
            args: vec![(e, Operand::Const(77))],
        });
    }

    let low = table[0].0;
    let high = table[table.len() - 1].1;
    (f, entry, x, low, high)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lowering_preserves_routing_and_phis(
        specs in label_specs(),
        config in config_variants(),
        base in -100i128..100,
    ) {
        let (before, switch_bb, x, low, high) = build(&specs, base);
        let mut lowered = before.clone();
        lower_switch(&mut lowered, switch_bb, &config, &DefaultCostModel)
            .unwrap();

        for v in (low - 2)..=(high + 2) {
            let orig = eval::route(&before, &[(x, v)]);
            let new = eval::route(&lowered, &[(x, v)]);
            prop_assert_eq!(orig.exit_block, new.exit_block, "value {} exits elsewhere", v);
            prop_assert_eq!(orig.phi_values, new.phi_values, "value {} phis differ", v);
        }
    }

    #[test]
    fn collected_clusters_partition_the_domain(
        specs in label_specs(),
        base in -100i128..100,
    ) {
        let (f, switch_bb, _, _, _) = build(&specs, base);
        let collected = collect_simple_clusters(&f, switch_bb)
            .unwrap();
        prop_assert_eq!(collected.clusters.len(), specs.len());
        for pair in collected.clusters.windows(2) {
            prop_assert!(pair[0].high < pair[1].low, "clusters overlap or disorder");
        }
        for cluster in &collected.clusters {
            prop_assert!(cluster.low <= cluster.high);
        }
    }
}
