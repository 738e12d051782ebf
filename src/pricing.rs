// Tiered Markup Pricing Engine
// Maps a material's cost price to a sell price and a disclosed markup
// percentage using a fixed, ordered table of inclusive cost ranges.
// Higher-value items carry proportionally lower markup.

use serde::{Deserialize, Serialize};

/// Markup applied when no tier covers the cost price (negative costs).
/// This is deliberate pricing policy, not an error path: a negative cost
/// yields a negative "price" with the default markup. Rejecting bad input
/// is the estimate form's job, not the engine's.
pub const DEFAULT_MARKUP_RATE: f64 = 0.35;

// ============================================================================
// MARKUP TIER
// ============================================================================

/// One pricing bracket: an inclusive cost range with a fixed markup rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupTier {
    /// Inclusive lower bound (currency units, >= 0)
    pub min_cost: f64,

    /// Inclusive upper bound; None = unbounded (last tier only)
    pub max_cost: Option<f64>,

    /// Fractional markup applied to cost (0.50 = 50%)
    pub markup_rate: f64,
}

impl MarkupTier {
    pub fn new(min_cost: f64, max_cost: Option<f64>, markup_rate: f64) -> Self {
        MarkupTier {
            min_cost,
            max_cost,
            markup_rate,
        }
    }

    /// Check if a cost price falls inside this tier (inclusive bounds)
    pub fn contains(&self, cost_price: f64) -> bool {
        if cost_price < self.min_cost {
            return false;
        }
        match self.max_cost {
            Some(max) => cost_price <= max,
            None => true,
        }
    }
}

// ============================================================================
// MARKUP SCHEDULE
// ============================================================================

/// Ordered, immutable tier table.
///
/// Constructed once at startup and passed to callers by reference; tests
/// can inject an alternate table instead of mutating shared state. The
/// ordered tiers partition the non-negative cost axis at cent granularity:
/// each tier starts one cent above the previous tier's max.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupSchedule {
    tiers: Vec<MarkupTier>,
}

impl MarkupSchedule {
    /// Build a schedule from an explicit tier list (assumed ascending)
    pub fn new(tiers: Vec<MarkupTier>) -> Self {
        MarkupSchedule { tiers }
    }

    /// The standard company schedule: decreasing markup as cost increases
    pub fn standard() -> Self {
        MarkupSchedule::new(vec![
            MarkupTier::new(0.0, Some(25.0), 0.50),
            MarkupTier::new(25.01, Some(50.0), 0.40),
            MarkupTier::new(50.01, Some(100.0), 0.35),
            MarkupTier::new(100.01, Some(250.0), 0.30),
            MarkupTier::new(250.01, Some(500.0), 0.25),
            MarkupTier::new(500.01, None, 0.20),
        ])
    }

    /// First tier (in ascending order) whose range contains the cost price
    fn tier_for(&self, cost_price: f64) -> Option<&MarkupTier> {
        self.tiers.iter().find(|tier| tier.contains(cost_price))
    }

    /// Customer-facing sell price: cost * (1 + rate).
    ///
    /// No rounding happens here; callers round for display only.
    pub fn sell_price(&self, cost_price: f64) -> f64 {
        match self.tier_for(cost_price) {
            Some(tier) => cost_price * (1.0 + tier.markup_rate),
            None => cost_price * (1.0 + DEFAULT_MARKUP_RATE),
        }
    }

    /// Markup percentage to disclose alongside the sell price (e.g. 50.0)
    pub fn markup_percentage(&self, cost_price: f64) -> f64 {
        match self.tier_for(cost_price) {
            Some(tier) => tier.markup_rate * 100.0,
            None => DEFAULT_MARKUP_RATE * 100.0,
        }
    }

    /// Number of tiers in the table
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Read-only view of the tiers
    pub fn tiers(&self) -> &[MarkupTier] {
        &self.tiers
    }
}

impl Default for MarkupSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_tier_one_pricing() {
        let schedule = MarkupSchedule::standard();

        assert_close(schedule.sell_price(10.0), 15.0, EPS);
        assert_close(schedule.markup_percentage(10.0), 50.0, EPS);

        // Zero cost is inside tier 1
        assert_close(schedule.sell_price(0.0), 0.0, EPS);
        assert_close(schedule.markup_percentage(0.0), 50.0, EPS);
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        let schedule = MarkupSchedule::standard();

        // 25.00 belongs to tier 1, 25.01 to tier 2
        assert_close(schedule.sell_price(25.0), 37.5, EPS);
        assert_close(schedule.markup_percentage(25.0), 50.0, EPS);
        assert_close(schedule.sell_price(25.01), 35.014, 0.01);
        assert_close(schedule.markup_percentage(25.01), 40.0, EPS);

        // 50 / 50.01, 100 / 100.01 boundaries
        assert_close(schedule.markup_percentage(50.0), 40.0, EPS);
        assert_close(schedule.markup_percentage(50.01), 35.0, EPS);
        assert_close(schedule.sell_price(100.0), 135.0, EPS);
        assert_close(schedule.markup_percentage(100.0), 35.0, EPS);
        assert_close(schedule.markup_percentage(100.01), 30.0, EPS);

        // 250 / 250.01, 500 / 500.01 boundaries
        assert_close(schedule.markup_percentage(250.0), 30.0, EPS);
        assert_close(schedule.markup_percentage(250.01), 25.0, EPS);
        assert_close(schedule.markup_percentage(500.0), 25.0, EPS);
        assert_close(schedule.sell_price(500.01), 600.012, 0.01);
        assert_close(schedule.markup_percentage(500.01), 20.0, EPS);
    }

    #[test]
    fn test_unbounded_top_tier() {
        let schedule = MarkupSchedule::standard();

        assert_close(schedule.sell_price(1000.0), 1200.0, EPS);
        assert_close(schedule.markup_percentage(1000.0), 20.0, EPS);
        assert_close(schedule.markup_percentage(1_000_000.0), 20.0, EPS);
    }

    #[test]
    fn test_negative_cost_uses_default_fallback() {
        let schedule = MarkupSchedule::standard();

        // Preserved policy: negative cost is priced with the 35% default,
        // producing a negative sell price. Validation is the caller's job.
        assert_close(schedule.sell_price(-10.0), -13.5, EPS);
        assert_close(schedule.markup_percentage(-10.0), 35.0, EPS);
        assert_close(schedule.sell_price(-0.01), -0.0135, EPS);
    }

    #[test]
    fn test_sell_price_consistent_with_percentage() {
        let schedule = MarkupSchedule::standard();

        for &cost in &[
            -50.0, -0.01, 0.0, 5.0, 25.0, 25.01, 37.5, 50.0, 50.01, 99.99, 100.0, 100.01, 250.0,
            250.01, 500.0, 500.01, 750.0, 12_345.67,
        ] {
            let expected = cost * (1.0 + schedule.markup_percentage(cost) / 100.0);
            assert_close(schedule.sell_price(cost), expected, 1e-9);
        }
    }

    #[test]
    fn test_markup_is_non_increasing() {
        let schedule = MarkupSchedule::standard();

        let samples = [0.0, 10.0, 25.0, 25.01, 50.0, 50.01, 100.0, 100.01, 250.01, 500.01, 999.0];
        for window in samples.windows(2) {
            assert!(
                schedule.markup_percentage(window[0]) >= schedule.markup_percentage(window[1]),
                "markup must not increase from {} to {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_profitability_for_positive_costs() {
        let schedule = MarkupSchedule::standard();

        for &cost in &[0.01, 1.0, 25.0, 100.0, 499.99, 500.01, 10_000.0] {
            assert!(
                schedule.sell_price(cost) > cost,
                "sell price must exceed cost for {}",
                cost
            );
        }
    }

    #[test]
    fn test_alternate_schedule_injection() {
        // Flat 10% table substituted without touching any shared state
        let schedule = MarkupSchedule::new(vec![MarkupTier::new(0.0, None, 0.10)]);

        assert_close(schedule.sell_price(100.0), 110.0, EPS);
        assert_close(schedule.markup_percentage(100.0), 10.0, EPS);

        // Fallback still applies below the table's floor
        assert_close(schedule.sell_price(-10.0), -13.5, EPS);
        assert_close(schedule.markup_percentage(-10.0), 35.0, EPS);
    }

    #[test]
    fn test_standard_table_shape() {
        let schedule = MarkupSchedule::standard();
        assert_eq!(schedule.tier_count(), 6);

        // Each tier starts one cent above the previous max
        for window in schedule.tiers().windows(2) {
            let prev_max = window[0].max_cost.expect("only the last tier is unbounded");
            assert_close(window[1].min_cost, prev_max + 0.01, 1e-9);
        }
        assert!(schedule.tiers().last().unwrap().max_cost.is_none());
    }
}
