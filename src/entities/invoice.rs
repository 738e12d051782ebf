// Invoice Entity - billing for completed jobs
// Amounts are carried unrounded from the estimate; amount_due is derived,
// not stored independently.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::estimate::Estimate;

// ============================================================================
// INVOICE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(InvoiceStatus::Draft),
            "sent" => Some(InvoiceStatus::Sent),
            "partial" => Some(InvoiceStatus::Partial),
            "paid" => Some(InvoiceStatus::Paid),
            "overdue" => Some(InvoiceStatus::Overdue),
            "cancelled" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }
}

// ============================================================================
// PAYMENT TERMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    DueOnReceipt,
    Net15,
    Net30,
    Net60,
}

impl PaymentTerms {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentTerms::DueOnReceipt => "due_on_receipt",
            PaymentTerms::Net15 => "net_15",
            PaymentTerms::Net30 => "net_30",
            PaymentTerms::Net60 => "net_60",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "due_on_receipt" => Some(PaymentTerms::DueOnReceipt),
            "net_15" => Some(PaymentTerms::Net15),
            "net_30" => Some(PaymentTerms::Net30),
            "net_60" => Some(PaymentTerms::Net60),
            _ => None,
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            PaymentTerms::DueOnReceipt => 0,
            PaymentTerms::Net15 => 15,
            PaymentTerms::Net30 => 30,
            PaymentTerms::Net60 => 60,
        }
    }
}

// ============================================================================
// INVOICE ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Stable identity (UUID) - never changes
    pub id: String,

    /// Human-facing invoice number, unique (e.g. "INV-2025-0142")
    pub invoice_number: String,

    pub customer_id: String,
    pub job_number: Option<String>,

    pub status: InvoiceStatus,
    pub payment_terms: PaymentTerms,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,

    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub amount_paid: f64,

    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        invoice_number: impl Into<String>,
        customer_id: impl Into<String>,
        terms: PaymentTerms,
    ) -> Self {
        let now = Utc::now();
        let invoice_date = now.date_naive();

        Invoice {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_number: invoice_number.into(),
            customer_id: customer_id.into(),
            job_number: None,
            status: InvoiceStatus::Draft,
            payment_terms: terms,
            invoice_date,
            due_date: invoice_date + Duration::days(terms.days()),
            subtotal: 0.0,
            tax_amount: 0.0,
            total_amount: 0.0,
            amount_paid: 0.0,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a draft invoice from a job's material estimate
    pub fn from_estimate(
        invoice_number: impl Into<String>,
        customer_id: impl Into<String>,
        terms: PaymentTerms,
        estimate: &Estimate,
    ) -> Self {
        let mut invoice = Invoice::new(invoice_number, customer_id, terms);
        invoice.job_number = Some(estimate.job_number.clone());
        invoice.subtotal = estimate.subtotal();
        invoice.tax_amount = estimate.tax_amount();
        invoice.total_amount = estimate.total();
        invoice
    }

    /// Outstanding balance
    pub fn amount_due(&self) -> f64 {
        self.total_amount - self.amount_paid
    }

    /// Record a payment and roll the status forward
    pub fn record_payment(&mut self, amount: f64) {
        self.amount_paid += amount;
        self.status = if self.amount_due() <= 1e-9 {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Partial
        };
        self.updated_at = Utc::now();
    }

    /// Past due date with a balance outstanding?
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
            && today > self.due_date
            && self.amount_due() > 0.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
