#[prefixed_id("ent")]
pub struct EntryId;
