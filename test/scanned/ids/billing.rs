#[prefixed_id("inv")]
struct InvoiceId;

#[prefixed_id("pay")]
pub struct PaymentId;
