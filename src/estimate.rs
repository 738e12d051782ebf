// Material Estimates - the pricing engine's consumer
// An estimate collects material lines for a job; each line's unit sell price
// and disclosed markup come from the markup schedule at the moment the line
// is added. Values stay unrounded; display code rounds.

use serde::{Deserialize, Serialize};

use crate::entities::item::Item;
use crate::pricing::MarkupSchedule;

// ============================================================================
// ESTIMATE LINE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateLine {
    pub item_code: String,
    pub description: String,
    pub quantity: f64,

    /// Wholesale cost per unit at the time the line was added
    pub unit_cost: f64,

    /// Customer-facing price per unit (cost run through the schedule)
    pub unit_price: f64,

    /// Markup percentage disclosed on the estimate (e.g. 50.0)
    pub markup_percentage: f64,
}

impl EstimateLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity
    }

    pub fn line_cost(&self) -> f64 {
        self.unit_cost * self.quantity
    }
}

// ============================================================================
// ESTIMATE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    /// Job this estimate belongs to
    pub job_number: String,

    pub lines: Vec<EstimateLine>,

    /// Sales tax applied to the material subtotal (0.06 = 6%)
    pub tax_rate: f64,
}

impl Estimate {
    pub fn new(job_number: impl Into<String>, tax_rate: f64) -> Self {
        Estimate {
            job_number: job_number.into(),
            lines: Vec::new(),
            tax_rate,
        }
    }

    /// Add a material line, pricing the item's cost through the schedule
    pub fn add_material(&mut self, schedule: &MarkupSchedule, item: &Item, quantity: f64) {
        self.lines.push(EstimateLine {
            item_code: item.item_code.clone(),
            description: item.name.clone(),
            quantity,
            unit_cost: item.cost_price,
            unit_price: schedule.sell_price(item.cost_price),
            markup_percentage: schedule.markup_percentage(item.cost_price),
        });
    }

    /// Material subtotal before tax
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(|line| line.line_total()).sum()
    }

    /// Total wholesale cost of the materials (internal, never shown)
    pub fn material_cost(&self) -> f64 {
        self.lines.iter().map(|line| line.line_cost()).sum()
    }

    pub fn tax_amount(&self) -> f64 {
        self.subtotal() * self.tax_rate
    }

    pub fn total(&self) -> f64 {
        self.subtotal() + self.tax_amount()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::ItemType;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lines_priced_through_schedule() {
        let schedule = MarkupSchedule::standard();
        let mut estimate = Estimate::new("JOB-2025-0001", 0.0);

        // 10.00 cost -> 50% tier -> 15.00 each
        let breaker = Item::new("BRKR-20A", "20A Breaker", ItemType::Part, 10.0);
        estimate.add_material(&schedule, &breaker, 3.0);

        // 89.50 cost -> 35% tier -> 120.825 each
        let wire = Item::new("WIRE-12G-250", "12ga Wire 250ft", ItemType::Material, 89.50);
        estimate.add_material(&schedule, &wire, 1.0);

        assert_eq!(estimate.lines.len(), 2);
        assert!(close(estimate.lines[0].unit_price, 15.0));
        assert!(close(estimate.lines[0].markup_percentage, 50.0));
        assert!(close(estimate.lines[0].line_total(), 45.0));
        assert!(close(estimate.lines[1].unit_price, 120.825));
        assert!(close(estimate.lines[1].markup_percentage, 35.0));

        assert!(close(estimate.subtotal(), 165.825));
        assert!(close(estimate.material_cost(), 119.5));
    }

    #[test]
    fn test_tax_and_total() {
        let schedule = MarkupSchedule::standard();
        let mut estimate = Estimate::new("JOB-2025-0002", 0.06);

        let item = Item::new("GFCI-STD", "GFCI Outlet", ItemType::Part, 20.0);
        estimate.add_material(&schedule, &item, 2.0);

        // 2 x 30.00 = 60.00, tax 3.60, total 63.60
        assert!(close(estimate.subtotal(), 60.0));
        assert!(close(estimate.tax_amount(), 3.6));
        assert!(close(estimate.total(), 63.6));
    }

    #[test]
    fn test_line_captures_price_at_add_time() {
        let standard = MarkupSchedule::standard();
        let mut estimate = Estimate::new("JOB-2025-0003", 0.0);

        let mut item = Item::new("PNL-200A", "200A Panel", ItemType::Equipment, 620.0);
        estimate.add_material(&standard, &item, 1.0);

        // Later cost changes do not rewrite existing lines
        item.cost_price = 700.0;
        assert!(close(estimate.lines[0].unit_cost, 620.0));
        assert!(close(estimate.lines[0].unit_price, 744.0));
    }

    #[test]
    fn test_empty_estimate_totals_zero() {
        let estimate = Estimate::new("JOB-2025-0004", 0.06);
        assert!(close(estimate.subtotal(), 0.0));
        assert!(close(estimate.total(), 0.0));
    }
}
