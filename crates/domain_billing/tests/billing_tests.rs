//! Tests for the billing ledger through its service API
//!
//! # Test Organization
//!
//! - `scenarios` - end-to-end flows of meter registration, billing, payment
//!   and withdrawal
//! - `queries` - read operations and reporting
//! - `property_tests` - sequence, pricing and custody properties

use std::sync::Arc;

use chrono::Utc;
use core_kernel::{Currency, FixedClock, Money, PartyId};
use domain_billing::{
    BillingConfig, BillingError, BillingEvent, BillingService, Caller, InMemoryTransferGateway,
    TransferPurpose,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn eth(minor: u128) -> Money {
    Money::from_minor(minor, Currency::ETH)
}

struct Harness {
    service: BillingService,
    gateway: Arc<InMemoryTransferGateway>,
    admin: Caller,
    user: Caller,
}

fn harness() -> Harness {
    let admin = Caller::new(PartyId::new());
    let gateway = Arc::new(InMemoryTransferGateway::new());
    let service = BillingService::new(
        BillingConfig {
            administrator: admin.party_id(),
            currency: Currency::ETH,
        },
        gateway.clone(),
        Arc::new(FixedClock::new(Utc::now())),
    );

    Harness {
        service,
        gateway,
        admin,
        user: Caller::new(PartyId::new()),
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_register_bill_pay_withdraw() {
        let h = harness();

        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "electricity", eth(1000))
            .unwrap();
        assert_eq!(meter_id.value(), 1);

        let bill_id = h.service.generate_bill(&h.admin, meter_id, 100).unwrap();
        assert_eq!(bill_id.value(), 1);
        let bill = h.service.get_bill(meter_id, 0).unwrap();
        assert_eq!(bill.amount, eth(100_000));
        assert!(!bill.paid);

        h.service.pay_bill(&h.user, meter_id, 0, eth(100_000)).unwrap();
        assert!(h.service.get_bill(meter_id, 0).unwrap().paid);
        assert_eq!(h.service.custody_balance(), eth(100_000));

        let again = h.service.pay_bill(&h.user, meter_id, 0, eth(100_000));
        assert!(matches!(again, Err(BillingError::BillAlreadyPaid(id)) if id == bill_id));

        let withdrawal = h.service.withdraw_funds(&h.admin).unwrap();
        assert_eq!(withdrawal.amount, eth(100_000));
        assert!(h.service.custody_balance().is_zero());
        assert_eq!(
            h.gateway
                .total_paid_to(&h.admin.party_id(), TransferPurpose::Withdrawal),
            100_000
        );
    }

    #[test]
    fn test_short_payment_changes_nothing() {
        let h = harness();
        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "electricity", eth(1000))
            .unwrap();
        h.service.generate_bill(&h.admin, meter_id, 100).unwrap();

        let result = h.service.pay_bill(&h.user, meter_id, 0, eth(50_000));

        assert!(matches!(
            result,
            Err(BillingError::InsufficientPayment { required, tendered })
                if required == eth(100_000) && tendered == eth(50_000)
        ));
        assert!(!h.service.get_bill(meter_id, 0).unwrap().paid);
        assert!(h.service.custody_balance().is_zero());
        assert!(h.gateway.receipts().is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_status() {
        let h = harness();
        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "water", eth(5))
            .unwrap();

        assert!(!h.service.toggle_meter_status(&h.admin, meter_id).unwrap());
        assert!(matches!(
            h.service.generate_bill(&h.admin, meter_id, 10),
            Err(BillingError::MeterInactive(id)) if id == meter_id
        ));
        assert!(h.service.toggle_meter_status(&h.admin, meter_id).unwrap());

        assert!(h.service.get_meter_details(meter_id).unwrap().active);
        assert!(h.service.generate_bill(&h.admin, meter_id, 10).is_ok());
        assert_eq!(h.service.bill_count(), 1);
    }

    #[test]
    fn test_overpayment_is_refunded_to_payer() {
        let h = harness();
        let stranger = Caller::new(PartyId::new());
        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "gas", eth(3))
            .unwrap();
        h.service.generate_bill(&h.admin, meter_id, 10).unwrap();

        // Payment is open to anyone, not only the owner
        let receipt = h.service.pay_bill(&stranger, meter_id, 0, eth(50)).unwrap();

        assert_eq!(receipt.amount, eth(30));
        assert_eq!(receipt.refund, eth(20));
        assert!(receipt.refund_transfer.is_some());
        assert_eq!(
            h.gateway
                .total_paid_to(&stranger.party_id(), TransferPurpose::Refund),
            20
        );
        assert_eq!(h.service.custody_balance(), eth(30));

        let bill = h.service.get_bill(meter_id, 0).unwrap();
        assert_eq!(bill.paid_by, Some(stranger.party_id()));
    }

    #[test]
    fn test_rate_change_does_not_reprice_bills() {
        let h = harness();
        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "water", eth(10))
            .unwrap();
        h.service.generate_bill(&h.admin, meter_id, 7).unwrap();

        h.service.update_meter_rate(&h.admin, meter_id, eth(99)).unwrap();
        h.service.generate_bill(&h.admin, meter_id, 7).unwrap();

        let bills = h.service.get_meter_bills(meter_id).unwrap();
        assert_eq!(bills[0].amount, eth(70));
        assert_eq!(bills[1].amount, eth(693));
        assert_eq!(bills[1].id.value(), 2);
    }

    #[test]
    fn test_inactive_meter_bills_remain_payable() {
        let h = harness();
        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "water", eth(10))
            .unwrap();
        h.service.generate_bill(&h.admin, meter_id, 1).unwrap();
        h.service.toggle_meter_status(&h.admin, meter_id).unwrap();

        assert!(h.service.pay_bill(&h.user, meter_id, 0, eth(10)).is_ok());
    }

    #[test]
    fn test_unknown_meter_and_bill() {
        let h = harness();
        let missing = core_kernel::MeterId::new(42).unwrap();

        assert!(matches!(
            h.service.generate_bill(&h.admin, missing, 1),
            Err(BillingError::MeterNotFound(_))
        ));
        assert!(matches!(
            h.service.pay_bill(&h.user, missing, 0, eth(1)),
            Err(BillingError::MeterNotFound(_))
        ));

        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "water", eth(10))
            .unwrap();
        assert!(matches!(
            h.service.pay_bill(&h.user, meter_id, 0, eth(1)),
            Err(BillingError::BillNotFound { index: 0, .. })
        ));
    }

    #[test]
    fn test_blank_meter_type_rejected() {
        let h = harness();

        let result = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "   ", eth(10));

        assert!(matches!(result, Err(BillingError::InvalidInput(_))));
        assert_eq!(h.service.meter_count(), 0);
        assert!(h.service.events_since(0).is_empty());
    }
}

// ============================================================================
// QUERIES
// ============================================================================

mod queries {
    use super::*;

    #[test]
    fn test_user_meters_in_registration_order() {
        let h = harness();
        let other = PartyId::new();

        let first = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "water", eth(1))
            .unwrap();
        h.service.register_meter(&h.admin, other, "gas", eth(1)).unwrap();
        let third = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "electricity", eth(1))
            .unwrap();

        assert_eq!(h.service.get_user_meters(h.user.party_id()), vec![first, third]);
        assert!(h.service.get_user_meters(PartyId::new()).is_empty());
        assert_eq!(h.service.list_meters().len(), 3);
        assert_eq!(h.service.meter_count(), 3);
    }

    #[test]
    fn test_account_summary() {
        let h = harness();
        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "water", eth(2))
            .unwrap();
        h.service.generate_bill(&h.admin, meter_id, 10).unwrap();
        h.service.generate_bill(&h.admin, meter_id, 15).unwrap();
        h.service.pay_bill(&h.user, meter_id, 1, eth(30)).unwrap();

        let summary = h.service.account_summary(h.user.party_id()).unwrap();

        assert_eq!(summary.meter_count, 1);
        assert_eq!(summary.active_meters, 1);
        assert_eq!(summary.total_bills, 2);
        assert_eq!(summary.unpaid_bills, 1);
        assert_eq!(summary.outstanding, eth(20));
        assert_eq!(summary.settled, eth(30));
        assert_eq!(h.service.last_reading(meter_id).unwrap(), Some(15));
    }

    #[test]
    fn test_event_journal_follows_commit_order() {
        let h = harness();
        let meter_id = h
            .service
            .register_meter(&h.admin, h.user.party_id(), "water", eth(2))
            .unwrap();
        h.service.generate_bill(&h.admin, meter_id, 10).unwrap();
        let _ = h.service.pay_bill(&h.user, meter_id, 0, eth(1));
        h.service.pay_bill(&h.user, meter_id, 0, eth(20)).unwrap();
        h.service.withdraw_funds(&h.admin).unwrap();

        let names: Vec<_> = h
            .service
            .events_since(0)
            .iter()
            .map(|e| e.event.name())
            .collect();
        assert_eq!(
            names,
            vec!["meter_registered", "bill_generated", "bill_paid", "funds_withdrawn"]
        );

        let tail = h.service.events_since(2);
        assert_eq!(tail[0].sequence, 3);
        assert!(matches!(tail[1].event, BillingEvent::FundsWithdrawn { amount, .. } if amount == eth(20)));
    }

    #[test]
    fn test_administrator_identity() {
        let h = harness();

        assert_eq!(h.service.administrator(), h.admin.party_id());
        assert!(h.service.is_administrator(&h.admin));
        assert!(!h.service.is_administrator(&h.user));
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_ids_strictly_increase_from_one(types in prop::collection::vec("[a-z]{1,12}", 1..20)) {
            let h = harness();
            let mut previous = 0u64;

            for meter_type in &types {
                let meter_id = h
                    .service
                    .register_meter(&h.admin, h.user.party_id(), meter_type, eth(1))
                    .unwrap();
                let bill_id = h.service.generate_bill(&h.admin, meter_id, 1).unwrap();

                prop_assert_eq!(meter_id.value(), previous + 1);
                prop_assert_eq!(bill_id.value(), previous + 1);
                previous = meter_id.value();
            }
        }

        #[test]
        fn prop_amount_is_rate_times_reading(
            rate in 0u128..1_000_000_000_000,
            reading in 0u64..1_000_000,
            new_rate in 0u128..1_000_000,
        ) {
            let h = harness();
            let meter_id = h
                .service
                .register_meter(&h.admin, h.user.party_id(), "water", eth(rate))
                .unwrap();
            h.service.generate_bill(&h.admin, meter_id, reading).unwrap();
            h.service.update_meter_rate(&h.admin, meter_id, eth(new_rate)).unwrap();

            let bill = h.service.get_bill(meter_id, 0).unwrap();
            prop_assert_eq!(bill.amount, eth(rate * reading as u128));
        }

        #[test]
        fn prop_custody_tracks_settled_bills(
            readings in prop::collection::vec(1u64..1_000, 1..10),
            extra in 0u128..500,
            withdraw_after in 0usize..10,
        ) {
            let h = harness();
            let meter_id = h
                .service
                .register_meter(&h.admin, h.user.party_id(), "water", eth(7))
                .unwrap();

            let mut withdrawn = 0u128;
            for (index, reading) in readings.iter().enumerate() {
                h.service.generate_bill(&h.admin, meter_id, *reading).unwrap();
                let amount = 7 * *reading as u128;
                let receipt = h.service.pay_bill(&h.user, meter_id, index, eth(amount + extra)).unwrap();
                prop_assert_eq!(receipt.refund, eth(extra));

                if index == withdraw_after {
                    withdrawn += h.service.withdraw_funds(&h.admin).unwrap().amount.minor_units();
                }
            }

            let settled: u128 = readings.iter().map(|r| 7 * *r as u128).sum();
            prop_assert_eq!(h.service.custody_balance(), eth(settled - withdrawn));
            prop_assert!(h.service.audit_custody().is_ok());
            prop_assert_eq!(
                h.gateway.total_paid_to(&h.user.party_id(), TransferPurpose::Refund),
                extra * readings.len() as u128
            );
        }
    }
}
