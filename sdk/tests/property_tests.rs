use proptest::prelude::*;
use rust_decimal::Decimal;
use sdk::errors::{TreasuryError, TreasuryErrorExt};
use sdk::gateway::GatewayError;
use sdk::types::{PaymentStatus, PayrollEntry};

// Hints must stay static so raw gateway messages never reach end users.
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "\\PC*") {
        let errs = vec![
            TreasuryError::Config(error_str.clone()),
            TreasuryError::YieldSource(GatewayError::Network(error_str.clone())),
            TreasuryError::Swap(GatewayError::Reverted(error_str.clone())),
            TreasuryError::Gateway(GatewayError::InvalidResponse(error_str.clone())),
            TreasuryError::Amount(error_str.clone()),
            TreasuryError::ReentrancyRejected,
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            if error_str.len() > 12 {
                prop_assert!(!hint.contains(error_str.as_str()));
            }
        }
    }
}

proptest! {
    #[test]
    fn test_payroll_entry_round_trip(
        id in "[a-z0-9-]{1,12}",
        recipient in "[a-z]{1,10}\\.eth",
        cents in 1i64..100_000_000i64,
        day in 1u32..=28,
        completed in any::<bool>(),
    ) {
        let due = chrono::NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        let mut entry = PayrollEntry::new(id, recipient, Decimal::new(cents, 2), due);
        if completed {
            entry.status = PaymentStatus::Completed;
            entry.resolved_address = Some("0x00000000000000000000000000000000000000aa".to_string());
        }

        let json = serde_json::to_string(&entry).expect("Failed to serialize entry");
        let parsed: PayrollEntry = serde_json::from_str(&json).expect("Failed to parse entry");

        prop_assert_eq!(entry, parsed);
    }
}
