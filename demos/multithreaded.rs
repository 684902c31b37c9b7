use std::sync::Arc;
use std::thread;

use condflow::{text::TextMatcher, Condition, StatementRegistry};

fn main() {
    let registry = StatementRegistry::<TextMatcher>::new();
    let condition = Arc::new(
        Condition::from_text(
            r#"anyOf { condition(method = "wildcard") { "*.log" } condition(method = "csv") { "syslog, messages" } }"#,
            &registry,
        )
        .expect("failed to read condition"),
    );

    let files = ["app.log", "messages", "app.conf", "syslog"];

    let handles: Vec<_> = files
        .into_iter()
        .enumerate()
        .map(|(i, file)| {
            let condition = Arc::clone(&condition);
            thread::spawn(move || {
                let matched = condition.evaluate(file).unwrap_or_else(|never| match never {});
                println!("Thread {i}: {file} -> {matched}");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
