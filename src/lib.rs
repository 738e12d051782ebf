// FieldServe - Field Service Management Core
// Exposes all modules for use in the CLI, API server, and tests

pub mod db;
pub mod entities;
pub mod estimate;
pub mod pricing;

// Re-export commonly used types
pub use db::{
    count_rows, get_all_customers, get_all_invoices, get_all_items, get_all_jobs,
    get_events_for_entity, get_item_by_code, get_job_by_number, get_low_stock_items,
    insert_customer, insert_event, insert_invoice, insert_items, insert_job, load_items_csv,
    setup_database, update_job_status, Event,
};
pub use entities::{
    ContactMethod, Customer, CustomerType, Invoice, InvoiceStatus, Item, ItemType, Job,
    JobPriority, JobStatus, PaymentTerms, PricedQuote,
};
pub use estimate::{Estimate, EstimateLine};
pub use pricing::{MarkupSchedule, MarkupTier, DEFAULT_MARKUP_RATE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
