// Inventory Item Entity - parts and materials carried on trucks and shelves
// Cost price is what we pay the supplier; the customer-facing sell price is
// derived on demand through the markup schedule, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::MarkupSchedule;

// ============================================================================
// ITEM TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Part,
    Tool,
    Material,
    Consumable,
    Equipment,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Part => "part",
            ItemType::Tool => "tool",
            ItemType::Material => "material",
            ItemType::Consumable => "consumable",
            ItemType::Equipment => "equipment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "part" => Some(ItemType::Part),
            "tool" => Some(ItemType::Tool),
            "material" => Some(ItemType::Material),
            "consumable" => Some(ItemType::Consumable),
            "equipment" => Some(ItemType::Equipment),
            _ => None,
        }
    }
}

// ============================================================================
// PRICED QUOTE
// ============================================================================

/// What the estimate screen shows for one item: the sell price and the
/// disclosed markup, both computed from cost through the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedQuote {
    pub cost_price: f64,
    pub sell_price: f64,
    pub markup_percentage: f64,
}

// ============================================================================
// ITEM ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity (UUID) - never changes
    pub id: String,

    /// Human-facing SKU, unique across the catalog (e.g. "WIRE-12G-250")
    pub item_code: String,

    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    pub category: String,

    /// Unit of measure for stock counts ("each", "foot", "box", ...)
    pub unit_of_measure: String,

    /// Wholesale cost per unit
    pub cost_price: f64,

    // Stock tracking
    pub current_stock: f64,
    pub minimum_stock: f64,
    pub reorder_point: f64,
    pub reorder_quantity: f64,

    // Supplier
    pub supplier: String,
    pub supplier_part_number: String,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        item_code: impl Into<String>,
        name: impl Into<String>,
        item_type: ItemType,
        cost_price: f64,
    ) -> Self {
        let now = Utc::now();

        Item {
            id: uuid::Uuid::new_v4().to_string(),
            item_code: item_code.into(),
            name: name.into(),
            description: String::new(),
            item_type,
            category: String::new(),
            unit_of_measure: "each".to_string(),
            cost_price,
            current_stock: 0.0,
            minimum_stock: 0.0,
            reorder_point: 0.0,
            reorder_quantity: 0.0,
            supplier: String::new(),
            supplier_part_number: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Below the minimum stock level?
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }

    /// At or below the reorder point?
    pub fn needs_reorder(&self) -> bool {
        self.current_stock <= self.reorder_point
    }

    /// Total wholesale value of stock on hand
    pub fn stock_value(&self) -> f64 {
        self.current_stock * self.cost_price
    }

    /// Price this item for display through the given markup schedule
    pub fn priced_quote(&self, schedule: &MarkupSchedule) -> PricedQuote {
        PricedQuote {
            cost_price: self.cost_price,
            sell_price: schedule.sell_price(self.cost_price),
            markup_percentage: schedule.markup_percentage(self.cost_price),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_flags() {
        let mut item = Item::new("BRKR-20A", "20A Breaker", ItemType::Part, 12.40);
        item.current_stock = 3.0;
        item.minimum_stock = 5.0;
        item.reorder_point = 8.0;

        assert!(item.is_low_stock());
        assert!(item.needs_reorder());

        item.current_stock = 6.0;
        assert!(!item.is_low_stock());
        assert!(item.needs_reorder());

        item.current_stock = 20.0;
        assert!(!item.needs_reorder());
    }

    #[test]
    fn test_stock_value() {
        let mut item = Item::new("WIRE-12G-250", "12ga Wire 250ft", ItemType::Material, 89.50);
        item.current_stock = 4.0;

        assert!((item.stock_value() - 358.0).abs() < 1e-9);
    }

    #[test]
    fn test_priced_quote_uses_schedule() {
        let schedule = MarkupSchedule::standard();

        // 12.40 falls in the 50% tier
        let item = Item::new("BRKR-20A", "20A Breaker", ItemType::Part, 12.40);
        let quote = item.priced_quote(&schedule);
        assert!((quote.sell_price - 18.60).abs() < 1e-9);
        assert!((quote.markup_percentage - 50.0).abs() < 1e-9);

        // 620.00 falls in the unbounded 20% tier
        let panel = Item::new("PNL-200A", "200A Panel", ItemType::Equipment, 620.0);
        let quote = panel.priced_quote(&schedule);
        assert!((quote.sell_price - 744.0).abs() < 1e-9);
        assert!((quote.markup_percentage - 20.0).abs() < 1e-9);
    }
}
