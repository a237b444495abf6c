//! Tuning knobs for switch lowering.
//!
//! Every numeric threshold in the cluster finders is a knob here, not a
//! constant in the algorithms: the classic values (sparseness ratio 3
//! when optimizing for size and 10 otherwise, the bit-test benefit
//! table) come from empirical studies on particular targets and do not
//! necessarily transfer, so a different backend can retune them.

/// Configuration for one run of the switch lowerer.
#[derive(Clone, Debug)]
pub struct LoweringConfig {
    /// Smallest number of contiguous clusters worth a jump table.
    pub case_values_threshold: u32,

    /// Optimize for code size rather than speed; selects the tighter
    /// sparseness ratio.
    pub optimize_size: bool,

    /// Whether jump tables may be emitted at all. When `false` the
    /// jump-table finder passes every cluster through unchanged.
    pub jump_tables_enabled: bool,

    /// Maximum allowed ratio of spanned range to covered case values
    /// for a jump table when optimizing for size.
    pub max_ratio_for_size: u32,

    /// Maximum allowed range/count ratio when optimizing for speed.
    pub max_ratio_for_speed: u32,

    /// Machine word width in bits; a bit-test cluster's spanned range
    /// must fit so every covered value maps to one bit of a word mask.
    pub word_bits: u32,

    /// Minimum run length for a bit-test cluster with 1, 2, or 3
    /// distinct targets respectively. More than 3 distinct targets is
    /// never worthwhile against a comparison tree.
    pub bit_test_case_thresholds: [u32; 3],
}

impl LoweringConfig {
    /// The sparseness ratio in effect.
    #[inline]
    pub fn max_ratio(&self) -> u64 {
        u64::from(if self.optimize_size {
            self.max_ratio_for_size
        } else {
            self.max_ratio_for_speed
        })
    }
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            case_values_threshold: 4,
            optimize_size: false,
            jump_tables_enabled: true,
            max_ratio_for_size: 3,
            max_ratio_for_speed: 10,
            word_bits: 64,
            bit_test_case_thresholds: [3, 5, 6],
        }
    }
}

/// Target cost oracle for the one emission decision that is genuinely
/// target-dependent: whether a bit-test cluster should subtract its low
/// bound at runtime (masks relative to zero) or use masks pre-shifted
/// by the low bound (no subtraction, but larger mask constants).
///
/// Either answer is correct; this is purely a code-quality choice, so
/// the default strategy is fixed and tests substitute stubs.
pub trait BranchCostModel {
    /// Return `true` to use pre-shifted masks for a cluster covering
    /// `[low, high]`. Only consulted when the absolute values fit a
    /// machine word (`low >= 0` and `high` below the word width).
    fn prefer_shifted_masks(&self, low: i128, high: i128) -> bool {
        let _ = (low, high);
        false
    }
}

/// Fixed strategy: always subtract the bias at runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCostModel;

impl BranchCostModel for DefaultCostModel {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_ratio_tracks_optimize_size() {
        let mut config = LoweringConfig::default();
        assert_eq!(config.max_ratio(), 10);
        config.optimize_size = true;
        assert_eq!(config.max_ratio(), 3);
    }

    #[test]
    fn default_model_keeps_runtime_subtraction() {
        assert!(!DefaultCostModel.prefer_shifted_masks(5, 20));
    }
}
