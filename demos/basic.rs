use condflow::{text::TextMatcher, Condition, StatementRegistry};

fn main() {
    let registry = StatementRegistry::<TextMatcher>::new();

    let condition = Condition::from_text(
        r#"
# keep PDFs, and reports that are not drafts
anyOf {
    condition(method = "wildcard", ignoreCase = "true") { "*.pdf" }
    allOf {
        condition(partial = "true") { "report" }
        condition(method = "regex") { "[^~]*" }
    }
}
"#,
        &registry,
    )
    .expect("failed to read condition");

    println!("{condition}");

    for name in ["Manual.PDF", "report-2024.txt", "~report.tmp", "notes.txt"] {
        let keep = condition.evaluate(name).unwrap_or_else(|never| match never {});
        println!("{name}: {}", if keep { "keep" } else { "skip" });
    }

    println!();
    print!("{}", condition.to_text().expect("failed to write condition"));
}
