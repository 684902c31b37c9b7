use condflow::{text::TextMatcher, Condition, StatementRegistry};

fn main() {
    let registry = StatementRegistry::<TextMatcher>::new();

    let condition = Condition::from_text(
        r#"
allOf {
    anyOf {
        condition(method = "csv") { "alice, bob" }
        condition(method = "wildcard") { "admin-*" }
    }
    condition(method = "regex", partial = "true") { "[a-z]" }
    anyOf {
        condition { "root" }
        condition(method = "wildcard") { "*" }
    }
}
"#,
        &registry,
    )
    .expect("failed to read condition");

    let report = condition
        .evaluate_detailed("bob")
        .unwrap_or_else(|never| match never {});

    println!("{report}");
    println!();
    for outcome in report.tested() {
        println!("tested {outcome}");
    }
    println!("Leaves skipped: {}", report.skipped());
    println!("Duration: {:?}", report.duration());
}
