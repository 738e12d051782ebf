// Customer Entity - residential and commercial service customers
// Identity is a UUID that never changes; contact details are values that do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CUSTOMER TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Residential,
    Commercial,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Residential => "residential",
            CustomerType::Commercial => "commercial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "residential" => Some(CustomerType::Residential),
            "commercial" => Some(CustomerType::Commercial),
            _ => None,
        }
    }
}

// ============================================================================
// CONTACT METHOD
// ============================================================================

/// How the customer prefers to be reached for scheduling updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Email,
    Phone,
    Text,
}

impl ContactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactMethod::Email => "email",
            ContactMethod::Phone => "phone",
            ContactMethod::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(ContactMethod::Email),
            "phone" => Some(ContactMethod::Phone),
            "text" => Some(ContactMethod::Text),
            _ => None,
        }
    }
}

// ============================================================================
// CUSTOMER ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Stable identity (UUID) - never changes
    pub id: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub customer_type: CustomerType,

    // Service address
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    /// Company name, for commercial accounts
    pub company_name: Option<String>,

    pub preferred_contact: ContactMethod,
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        customer_type: CustomerType,
    ) -> Self {
        let now = Utc::now();

        Customer {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            customer_type,
            street_address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            company_name: None,
            preferred_contact: ContactMethod::Phone,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_address(
        mut self,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        self.street_address = street.into();
        self.city = city.into();
        self.state = state.into();
        self.zip_code = zip.into();
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street_address, self.city, self.state, self.zip_code
        )
    }

    /// Display name: company for commercial accounts, person otherwise
    pub fn display_name(&self) -> String {
        match (&self.customer_type, &self.company_name) {
            (CustomerType::Commercial, Some(company)) => company.clone(),
            _ => self.full_name(),
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
    fn test_full_name_and_address() {
        let customer = Customer::new(
            "Maria",
            "Santos",
            "maria@example.com",
            "555-0142",
            CustomerType::Residential,
        )
        .with_address("12 Oak Lane", "Fairfax", "VA", "22030");

        assert_eq!(customer.full_name(), "Maria Santos");
        assert_eq!(customer.full_address(), "12 Oak Lane, Fairfax, VA 22030");
        assert_eq!(customer.display_name(), "Maria Santos");
    }

    #[test]
    fn test_commercial_display_name_prefers_company() {
        let mut customer = Customer::new(
            "Dan",
            "Reed",
            "dan@acmehvac.com",
            "555-0190",
            CustomerType::Commercial,
        );
        customer.company_name = Some("Acme HVAC".to_string());

        assert_eq!(customer.display_name(), "Acme HVAC");
    }

    #[test]
    fn test_type_round_trip() {
        assert_eq!(
            CustomerType::parse(CustomerType::Commercial.as_str()),
            Some(CustomerType::Commercial)
        );
        assert_eq!(CustomerType::parse("industrial"), None);
        assert_eq!(ContactMethod::parse("text"), Some(ContactMethod::Text));
    }
}
