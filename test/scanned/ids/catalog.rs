pub mod r#type {
    #[prefixed_id("KND")]
    pub struct KindId;
}
