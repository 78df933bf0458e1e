//! ID types generated at build time from the declarations under `ids/`.

include!(concat!(env!("OUT_DIR"), "/prefixed_ids.rs"));

/// Converters for every ID type in this crate.
pub fn converters() -> prefixid::ConverterSet {
    let mut set = prefixid::ConverterSet::new();
    prefixid::configure!(&mut set);
    set
}

/// Formats an invoice ID. `InvoiceId` is declared private in `ids/billing.rs`.
pub fn invoice_text(raw: u128) -> String {
    billing::InvoiceId::from(raw).to_string()
}
