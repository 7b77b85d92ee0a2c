#[test]
fn rlist_error_expands_for_named_variants() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/rlist_error_pass.rs");
}
