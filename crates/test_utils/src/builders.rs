//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant
//! fields while using defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{ClientId, Currency, OwnerId, WorkRecordId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_invoicing::aggregation::{BillableRecord, ManualItem};
use domain_invoicing::work_record::{BillingState, WorkRecord};

use crate::fixtures::{DateFixtures, StringFixtures};

/// Builder for domain work records
pub struct WorkRecordBuilder {
    id: WorkRecordId,
    owner_id: OwnerId,
    client_id: ClientId,
    work_date: NaiveDate,
    hours: Decimal,
    hourly_rate: Decimal,
    currency: Currency,
    description: String,
    private_note: Option<String>,
    billing: BillingState,
}

impl Default for WorkRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkRecordBuilder {
    /// Creates a builder with an 8h @ 150 PLN unbilled record
    pub fn new() -> Self {
        Self {
            id: WorkRecordId::new(),
            owner_id: OwnerId::new(),
            client_id: ClientId::new(),
            work_date: DateFixtures::work_date(),
            hours: dec!(8),
            hourly_rate: dec!(150),
            currency: Currency::PLN,
            description: StringFixtures::description().to_string(),
            private_note: None,
            billing: BillingState::Unbilled,
        }
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn with_hours(mut self, hours: Decimal) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_hourly_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = rate;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_billing(mut self, billing: BillingState) -> Self {
        self.billing = billing;
        self
    }

    pub fn build(self) -> WorkRecord {
        WorkRecord {
            id: self.id,
            owner_id: self.owner_id,
            client_id: self.client_id,
            work_date: self.work_date,
            hours: self.hours,
            hourly_rate: self.hourly_rate,
            currency: self.currency,
            description: self.description,
            private_note: self.private_note,
            billing: self.billing,
            deleted_at: None,
        }
    }

    /// Builds only the aggregation view of the record
    pub fn build_billable(self) -> BillableRecord {
        self.build().to_billable()
    }
}

/// Builder for manual line items
pub struct ManualItemBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
}

impl Default for ManualItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualItemBuilder {
    pub fn new() -> Self {
        Self {
            description: "Usługa serwisowa".to_string(),
            quantity: dec!(1),
            unit_price: dec!(100.00),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn build(self) -> ManualItem {
        ManualItem {
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}
