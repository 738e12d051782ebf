// Entity Models - customers, inventory items, jobs, invoices
// Each entity has a stable UUID identity; values change, identity never does.

pub mod customer;
pub mod invoice;
pub mod item;
pub mod job;

pub use customer::{ContactMethod, Customer, CustomerType};
pub use invoice::{Invoice, InvoiceStatus, PaymentTerms};
pub use item::{Item, ItemType, PricedQuote};
pub use job::{Job, JobPriority, JobStatus};
