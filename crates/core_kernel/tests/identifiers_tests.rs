//! Unit tests for the identifiers module
//!
//! Tests cover identifier creation, parsing, conversion, and
//! display formatting across the identifier families.

use core_kernel::{
    CompanyId, AccountId, BusinessEventId, LedgerLineId, FiscalPeriodId,
    SaleId, PurchaseId, PaymentId, CustomerId, SupplierId,
};
use uuid::Uuid;

mod creation {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = CompanyId::new();
        let id2 = CompanyId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = BusinessEventId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = BusinessEventId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = AccountId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_default_is_random() {
        let id1 = SaleId::default();
        let id2 = SaleId::default();
        assert_ne!(id1, id2);
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert!(CompanyId::new().to_string().starts_with("CMP-"));
        assert!(AccountId::new().to_string().starts_with("ACC-"));
        assert!(LedgerLineId::new().to_string().starts_with("JNL-"));
        assert!(FiscalPeriodId::new().to_string().starts_with("FY-"));
        assert!(BusinessEventId::new().to_string().starts_with("EVT-"));
        assert!(PurchaseId::new().to_string().starts_with("PUR-"));
        assert!(PaymentId::new().to_string().starts_with("PAY-"));
        assert!(CustomerId::new().to_string().starts_with("CUS-"));
        assert!(SupplierId::new().to_string().starts_with("SUP-"));
    }

    #[test]
    fn test_prefix_accessor() {
        assert_eq!(CompanyId::prefix(), "CMP");
        assert_eq!(SupplierId::prefix(), "SUP");
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        let original = CustomerId::new();
        let parsed: CustomerId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_parse_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: SaleId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!("not-a-uuid".parse::<AccountId>().is_err());
    }
}

mod serde_roundtrip {
    use super::*;

    #[test]
    fn test_serializes_as_transparent_uuid() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        let expected = format!("\"{}\"", id.as_uuid());
        assert_eq!(json, expected);
    }

    #[test]
    fn test_deserializes_from_uuid_string() {
        let uuid = Uuid::new_v4();
        let json = format!("\"{}\"", uuid);
        let id: CompanyId = serde_json::from_str(&json).unwrap();
        assert_eq!(*id.as_uuid(), uuid);
    }
}
