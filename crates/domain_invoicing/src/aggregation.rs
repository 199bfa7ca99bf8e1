//! Work-record aggregation into invoice line items
//!
//! Two mutually exclusive sources feed an invoice's items: groupings of
//! work records (quantity is the summed hours, unit price the arithmetic
//! mean of hourly rates) and manually authored items taken verbatim. A
//! request must produce at least one item across both sources, validated
//! here before anything touches the store.

use core_kernel::{Money, Currency, WorkRecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvoicingError;

/// A work record reduced to what aggregation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillableRecord {
    pub id: WorkRecordId,
    pub description: String,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
}

/// A caller-supplied grouping instruction: one item per grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGrouping {
    pub description: String,
    pub record_ids: Vec<WorkRecordId>,
}

/// A manually authored line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// A line item ready for totals computation and persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    /// 1-based, dense position on the invoice
    pub position: u32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// `round2(quantity x unit_price)`
    pub net_amount: Decimal,
    /// Work records this item bills; empty for manual items
    pub record_ids: Vec<WorkRecordId>,
}

impl DraftItem {
    /// Net amount as typed money in the invoice currency
    pub fn net_money(&self, currency: Currency) -> Money {
        Money::new(self.net_amount, currency)
    }
}

/// Groups records by identical description, preserving first-seen order
///
/// Used when the caller supplies a flat list of work-record ids without
/// explicit grouping instructions; the wizard's default "group by
/// description" behavior applied server-side.
pub fn group_by_description(records: &[BillableRecord]) -> Vec<ItemGrouping> {
    let mut groupings: Vec<ItemGrouping> = Vec::new();
    for record in records {
        match groupings
            .iter_mut()
            .find(|g| g.description == record.description)
        {
            Some(grouping) => grouping.record_ids.push(record.id),
            None => groupings.push(ItemGrouping {
                description: record.description.clone(),
                record_ids: vec![record.id],
            }),
        }
    }
    groupings
}

/// Builds draft items from groupings and manual items
///
/// Positions are assigned in grouping order first, manual items after,
/// 1-based. Every grouping must reference at least one of the supplied
/// records; quantities and prices are validated before any store access.
///
/// # Errors
///
/// `Validation` when no item results, a grouping is empty or references an
/// unknown record, a manual quantity is not positive, or a manual unit
/// price is negative.
pub fn aggregate(
    groupings: &[ItemGrouping],
    records: &[BillableRecord],
    manual_items: &[ManualItem],
) -> Result<Vec<DraftItem>, InvoicingError> {
    if groupings.is_empty() && manual_items.is_empty() {
        return Err(InvoicingError::validation(
            "an invoice needs at least one item: select work records or add manual items",
        ));
    }

    let mut items = Vec::with_capacity(groupings.len() + manual_items.len());
    let mut position = 1u32;

    for grouping in groupings {
        if grouping.record_ids.is_empty() {
            return Err(InvoicingError::validation(format!(
                "item '{}' references no work records",
                grouping.description
            )));
        }

        let mut hours = Decimal::ZERO;
        let mut rate_sum = Decimal::ZERO;
        for record_id in &grouping.record_ids {
            let record = records
                .iter()
                .find(|r| r.id == *record_id)
                .ok_or_else(|| {
                    InvoicingError::validation(format!(
                        "work record {record_id} is not among the billable records"
                    ))
                })?;
            hours += record.hours;
            rate_sum += record.hourly_rate;
        }

        let count = Decimal::from(grouping.record_ids.len() as u64);
        let unit_price = round2(rate_sum / count);
        let net_amount = round2(hours * unit_price);

        items.push(DraftItem {
            position,
            description: grouping.description.clone(),
            quantity: hours,
            unit_price,
            net_amount,
            record_ids: grouping.record_ids.clone(),
        });
        position += 1;
    }

    for manual in manual_items {
        if manual.description.trim().is_empty() {
            return Err(InvoicingError::validation("item description is required"));
        }
        if manual.quantity <= Decimal::ZERO {
            return Err(InvoicingError::validation(format!(
                "item '{}': quantity must be positive",
                manual.description
            )));
        }
        if manual.unit_price < Decimal::ZERO {
            return Err(InvoicingError::validation(format!(
                "item '{}': unit price cannot be negative",
                manual.description
            )));
        }

        items.push(DraftItem {
            position,
            description: manual.description.clone(),
            quantity: manual.quantity,
            unit_price: manual.unit_price,
            net_amount: round2(manual.quantity * manual.unit_price),
            record_ids: Vec::new(),
        });
        position += 1;
    }

    Ok(items)
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(description: &str, hours: Decimal, rate: Decimal) -> BillableRecord {
        BillableRecord {
            id: WorkRecordId::new(),
            description: description.to_string(),
            hours,
            hourly_rate: rate,
        }
    }

    #[test]
    fn groups_by_identical_description() {
        let records = vec![
            record("A", dec!(2), dec!(100)),
            record("A", dec!(3), dec!(100)),
            record("B", dec!(5), dec!(200)),
        ];

        let groupings = group_by_description(&records);
        assert_eq!(groupings.len(), 2);
        assert_eq!(groupings[0].description, "A");
        assert_eq!(groupings[0].record_ids.len(), 2);
        assert_eq!(groupings[1].description, "B");
        assert_eq!(groupings[1].record_ids.len(), 1);
    }

    #[test]
    fn aggregates_groupings_into_items() {
        let records = vec![
            record("A", dec!(2), dec!(100)),
            record("A", dec!(3), dec!(100)),
            record("B", dec!(5), dec!(200)),
        ];
        let groupings = group_by_description(&records);

        let items = aggregate(&groupings, &records, &[]).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].position, 1);
        assert_eq!(items[0].quantity, dec!(5));
        assert_eq!(items[0].unit_price, dec!(100));
        assert_eq!(items[0].net_amount, dec!(500));

        assert_eq!(items[1].position, 2);
        assert_eq!(items[1].quantity, dec!(5));
        assert_eq!(items[1].unit_price, dec!(200));
        assert_eq!(items[1].net_amount, dec!(1000));
    }

    #[test]
    fn unit_price_is_mean_of_rates() {
        let records = vec![
            record("consulting", dec!(1), dec!(100)),
            record("consulting", dec!(1), dec!(151)),
        ];
        let groupings = group_by_description(&records);

        let items = aggregate(&groupings, &records, &[]).unwrap();
        assert_eq!(items[0].unit_price, dec!(125.50));
        assert_eq!(items[0].net_amount, dec!(251.00));
    }

    #[test]
    fn manual_items_pass_verbatim() {
        let manual = vec![ManualItem {
            description: "Licencja roczna".to_string(),
            quantity: dec!(1),
            unit_price: dec!(1200.00),
        }];

        let items = aggregate(&[], &[], &manual).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].position, 1);
        assert_eq!(items[0].net_amount, dec!(1200.00));
        assert!(items[0].record_ids.is_empty());
    }

    #[test]
    fn manual_items_follow_grouped_items() {
        let records = vec![record("dev", dec!(8), dec!(150))];
        let groupings = group_by_description(&records);
        let manual = vec![ManualItem {
            description: "Dojazd".to_string(),
            quantity: dec!(1),
            unit_price: dec!(80),
        }];

        let items = aggregate(&groupings, &records, &manual).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].position, 1);
        assert_eq!(items[1].position, 2);
        assert_eq!(items[1].description, "Dojazd");
    }

    #[test]
    fn no_items_is_a_validation_error() {
        let err = aggregate(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, InvoicingError::Validation(_)));
    }

    #[test]
    fn zero_quantity_manual_item_is_rejected() {
        let manual = vec![ManualItem {
            description: "x".to_string(),
            quantity: dec!(0),
            unit_price: dec!(10),
        }];
        assert!(aggregate(&[], &[], &manual).is_err());
    }

    #[test]
    fn negative_unit_price_is_rejected() {
        let manual = vec![ManualItem {
            description: "x".to_string(),
            quantity: dec!(1),
            unit_price: dec!(-0.01),
        }];
        assert!(aggregate(&[], &[], &manual).is_err());
    }

    #[test]
    fn zero_unit_price_is_allowed() {
        let manual = vec![ManualItem {
            description: "gratis".to_string(),
            quantity: dec!(1),
            unit_price: dec!(0),
        }];
        let items = aggregate(&[], &[], &manual).unwrap();
        assert_eq!(items[0].net_amount, dec!(0));
    }

    #[test]
    fn grouping_with_unknown_record_fails() {
        let records = vec![record("dev", dec!(1), dec!(100))];
        let groupings = vec![ItemGrouping {
            description: "dev".to_string(),
            record_ids: vec![WorkRecordId::new()],
        }];
        assert!(aggregate(&groupings, &records, &[]).is_err());
    }

    #[test]
    fn empty_grouping_fails() {
        let groupings = vec![ItemGrouping {
            description: "dev".to_string(),
            record_ids: vec![],
        }];
        assert!(aggregate(&groupings, &[], &[]).is_err());
    }
}
