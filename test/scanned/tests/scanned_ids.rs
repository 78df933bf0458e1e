use std::any::TypeId;

use prefixid::{IdError, PrefixedId};
use prefixid_scanned::billing::ledger::EntryId;
use prefixid_scanned::billing::PaymentId;
use prefixid_scanned::catalog::r#type::KindId;
use prefixid_scanned::{converters, invoice_text, UserId};

#[test]
fn test_top_level_roundtrip() {
    let id = UserId::new();
    let text = id.to_string();
    assert!(text.starts_with("usr_"));
    assert_eq!(UserId::parse(&text), Ok(id));
    assert_eq!(UserId::default(), UserId::EMPTY);
}

#[test]
fn test_nested_modules() {
    assert_eq!(PaymentId::PREFIX, "pay");
    assert_eq!(EntryId::PREFIX, "ent");
    assert_eq!(KindId::PREFIX, "knd");

    let kind = KindId::new();
    assert_eq!(KindId::parse(&kind.to_string().to_uppercase()), Ok(kind));
    assert!(matches!(
        PaymentId::parse(&EntryId::new().to_string()),
        Err(IdError::InvalidPrefix { .. })
    ));
}

#[test]
fn test_private_declaration_is_crate_visible() {
    assert_eq!(invoice_text(0), "inv_00000000000000000000000000");
}

#[test]
fn test_json_roundtrip() {
    let entry = EntryId::new();
    let json = serde_json::to_string(&entry).unwrap();
    assert_eq!(json, format!("\"{entry}\""));
    assert_eq!(serde_json::from_str::<EntryId>(&json).unwrap(), entry);
}

#[test]
fn test_generic_capability() {
    fn empty_text<T: PrefixedId>() -> String {
        T::EMPTY.format()
    }
    assert_eq!(empty_text::<KindId>(), "knd_00000000000000000000000000");
}

#[test]
fn test_configure_registers_every_type() {
    let set = converters();
    assert_eq!(set.len(), 5);
    assert!(set.contains::<UserId>());
    assert!(set.contains::<KindId>());

    let invoice = set.get_by_prefix("inv").unwrap();
    assert!(invoice.read("inv_00000000000000000000000000").is_ok());
    assert_eq!(
        set.get_by_prefix("ent").unwrap().id_type(),
        TypeId::of::<EntryId>()
    );
}
