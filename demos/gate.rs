use condflow::document;
use condflow::text::TextMatcher;
use condflow::{ConditionReader, Gate, Junction, StatementRegistry};

fn main() {
    // `or` reads like `anyOf`, but only where it is explicitly permitted.
    let registry = StatementRegistry::<TextMatcher>::new()
        .with_composite("or", Junction::Any)
        .allow("allOf", "or");
    let reader = ConditionReader::new(&registry).max_depth(16);

    let mut stream = document::parse(
        r#"
ifNot {
    allOf {
        condition(partial = "true", ignoreCase = "true") { "draft" }
        or {
            condition(method = "wildcard") { "*.docx" }
            condition(method = "wildcard") { "*.odt" }
        }
    }
}
"#,
    )
    .expect("malformed document");

    let gate = Gate::read(&mut stream, &reader).expect("invalid gate");

    for name in ["Draft-notes.docx", "final.docx", "draft.pdf"] {
        let passes = gate.passes(name).unwrap_or_else(|never| match never {});
        println!("{name}: {}", if passes { "publish" } else { "hold" });
    }
}
