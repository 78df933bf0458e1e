fn main() {
    prefixid_codegen::Builder::new()
        .source("ids")
        .generate()
        .expect("failed to generate IDs");
}
