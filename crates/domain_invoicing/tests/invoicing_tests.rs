//! Comprehensive tests for domain_invoicing
//!
//! Exercises the generation pipeline end-to-end at the domain level:
//! aggregation, totals, numbering, exchange resolution, words rendering,
//! and the billing-lock state machine.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, InvoiceId, OwnerId, VatRate, WorkRecordId};
use domain_invoicing::aggregation::{aggregate, group_by_description, BillableRecord, ManualItem};
use domain_invoicing::exchange::resolve_rate;
use domain_invoicing::invoice::InvoiceDraft;
use domain_invoicing::numbering::{allocate, NumberScope};
use domain_invoicing::totals::compute_totals;
use domain_invoicing::words::amount_in_words;
use domain_invoicing::work_record::{BillingState, WorkRecord};
use domain_invoicing::InvoicingError;

fn issue_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

fn billable(description: &str, hours: &str, rate: &str) -> BillableRecord {
    BillableRecord {
        id: WorkRecordId::new(),
        description: description.to_string(),
        hours: hours.parse().unwrap(),
        hourly_rate: rate.parse().unwrap(),
    }
}

fn work_record(description: &str, hours: &str, rate: &str) -> WorkRecord {
    WorkRecord {
        id: WorkRecordId::new(),
        owner_id: OwnerId::new(),
        client_id: ClientId::new(),
        work_date: NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
        hours: hours.parse().unwrap(),
        hourly_rate: rate.parse().unwrap(),
        currency: Currency::PLN,
        description: description.to_string(),
        private_note: None,
        billing: BillingState::Unbilled,
        deleted_at: None,
    }
}

// ============================================================================
// Numbering
// ============================================================================

mod numbering_tests {
    use super::*;

    #[test]
    fn gap_fill_matrix() {
        let scope = NumberScope::from_issue_date(issue_date());
        let cases: &[(&[u32], u32)] = &[
            (&[1, 2, 4, 5], 3),
            (&[], 1),
            (&[1, 2, 3], 4),
            (&[2, 3], 1),
        ];

        for (existing, expected) in cases {
            let numbers: Vec<String> = existing
                .iter()
                .map(|seq| domain_invoicing::format_invoice_number(scope, *seq))
                .collect();
            let allocated = allocate(scope, &numbers);
            assert_eq!(
                allocated,
                domain_invoicing::format_invoice_number(scope, *expected),
                "existing {existing:?}"
            );
        }
    }

    #[test]
    fn scope_tracks_issue_date_not_today() {
        let december = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();
        let scope = NumberScope::from_issue_date(december);
        assert_eq!(allocate(scope, &[]), "FV/2025/12/001");
    }
}

// ============================================================================
// Generation pipeline: the Acme scenario
// ============================================================================

mod generation_scenario_tests {
    use super::*;

    #[test]
    fn acme_local_currency_scenario() {
        // Client "Acme" (local currency), two unbilled records with the same
        // description: 8h @ 150 and 6h @ 150.
        let records = vec![
            billable("Prace programistyczne", "8", "150"),
            billable("Prace programistyczne", "6", "150"),
        ];
        let groupings = group_by_description(&records);
        let items = aggregate(&groupings, &records, &[]).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, dec!(14));
        assert_eq!(items[0].unit_price, dec!(150));
        assert_eq!(items[0].net_amount, dec!(2100));

        let rate = resolve_rate(Currency::PLN, issue_date(), None, None).unwrap();
        assert!(rate.is_none());

        let draft = InvoiceDraft::assemble(
            OwnerId::new(),
            ClientId::new(),
            Currency::PLN,
            issue_date(),
            issue_date(),
            None,
            VatRate::standard(),
            items,
            rate,
            None,
        )
        .unwrap();

        assert_eq!(draft.totals.net.amount(), dec!(2100));
        assert_eq!(draft.totals.vat.amount(), dec!(483));
        assert_eq!(draft.totals.gross.amount(), dec!(2583));
        assert!(draft.totals.net_local.is_none());
        assert!(!draft.is_manual);
        assert_eq!(draft.consumed_record_ids().len(), 2);
    }

    #[test]
    fn foreign_currency_scenario_with_cached_rate() {
        let records = vec![billable("Consulting", "10", "100")];
        let groupings = group_by_description(&records);
        let items = aggregate(&groupings, &records, &[]).unwrap();

        let rate = resolve_rate(Currency::EUR, issue_date(), None, Some(dec!(4.25)))
            .unwrap()
            .unwrap();
        assert!(!rate.is_custom);

        let totals = compute_totals(&items, Currency::EUR, VatRate::standard(), Some(&rate));
        assert_eq!(totals.net.amount(), dec!(1000));
        assert_eq!(totals.net_local.unwrap().amount(), dec!(4250.00));
        assert_eq!(totals.gross_local.unwrap().amount(), dec!(5227.50));
    }

    #[test]
    fn foreign_currency_without_rate_fails_before_write() {
        let err = resolve_rate(Currency::EUR, issue_date(), None, None).unwrap_err();
        assert!(matches!(err, InvoicingError::MissingExchangeRate { .. }));
    }

    #[test]
    fn manual_only_invoice_sets_manual_flag() {
        let items = aggregate(
            &[],
            &[],
            &[ManualItem {
                description: "Abonament".to_string(),
                quantity: dec!(1),
                unit_price: dec!(500),
            }],
        )
        .unwrap();

        let draft = InvoiceDraft::assemble(
            OwnerId::new(),
            ClientId::new(),
            Currency::PLN,
            issue_date(),
            issue_date(),
            None,
            VatRate::standard(),
            items,
            None,
            None,
        )
        .unwrap();

        assert!(draft.is_manual);
    }

    #[test]
    fn mixed_sources_clear_manual_flag() {
        let records = vec![billable("Wdrożenie", "4", "200")];
        let groupings = group_by_description(&records);
        let items = aggregate(
            &groupings,
            &records,
            &[ManualItem {
                description: "Dojazd".to_string(),
                quantity: dec!(1),
                unit_price: dec!(120),
            }],
        )
        .unwrap();

        let draft = InvoiceDraft::assemble(
            OwnerId::new(),
            ClientId::new(),
            Currency::PLN,
            issue_date(),
            issue_date(),
            None,
            VatRate::standard(),
            items,
            None,
            None,
        )
        .unwrap();

        assert!(!draft.is_manual);
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.consumed_record_ids().len(), 1);
    }
}

// ============================================================================
// Words round-trip
// ============================================================================

mod words_tests {
    use super::*;
    use core_kernel::Money;

    #[test]
    fn words_of_1230_pln() {
        let gross = Money::new(dec!(1230.00), Currency::PLN);
        let first = amount_in_words(&gross);
        let second = amount_in_words(&gross);

        assert_eq!(first, "tysiąc dwieście trzydzieści złotych 00/100 groszy");
        assert_eq!(first, second);
    }

    #[test]
    fn words_follow_invoice_currency() {
        let gross = Money::new(dec!(1230.00), Currency::EUR);
        assert_eq!(
            amount_in_words(&gross),
            "tysiąc dwieście trzydzieści euro 00/100 centów"
        );
    }
}

// ============================================================================
// Billing locks
// ============================================================================

mod lock_tests {
    use super::*;

    #[test]
    fn generation_locks_until_release() {
        let invoice_id = InvoiceId::new();
        let mut record = work_record("Prace programistyczne", "8", "150");

        record.bill(invoice_id).unwrap();
        assert!(record.billing.is_billed());
        assert!(record.ensure_unlocked("FV/2026/08/001").is_err());

        // Invoice soft-delete releases the record
        record.release();
        assert_eq!(record.billing, BillingState::Unbilled);
        assert!(record.ensure_unlocked("FV/2026/08/001").is_ok());
    }

    #[test]
    fn overlapping_generations_conflict_on_the_second_claim() {
        let mut record = work_record("Prace programistyczne", "8", "150");

        let first = record.bill(InvoiceId::new());
        let second = record.bill(InvoiceId::new());

        assert!(first.is_ok());
        assert!(matches!(second, Err(InvoicingError::Conflict(_))));
        // The record references exactly the first invoice
        assert!(record.billing.is_billed());
    }
}
