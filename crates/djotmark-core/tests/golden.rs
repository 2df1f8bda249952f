use std::fs;
use std::path::Path;

use serde::Deserialize;

use djotmark_core::to_html;

#[derive(Debug, Deserialize)]
struct GoldenCase {
    name: String,
    input: String,
    html: String,
}

#[test]
fn golden_conversions() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/golden.json");
    let json = fs::read_to_string(&path).expect("read golden.json");
    let cases: Vec<GoldenCase> = serde_json::from_str(&json).expect("parse golden.json");
    assert!(!cases.is_empty());

    let mut failures = Vec::new();
    for case in &cases {
        let actual = to_html(&case.input);
        if actual != case.html {
            failures.push(format!(
                "case {:?}:\n  input:    {:?}\n  expected: {:?}\n  actual:   {:?}",
                case.name, case.input, case.html, actual
            ));
        }
    }
    assert!(
        failures.is_empty(),
        "{} golden case(s) failed:\n{}",
        failures.len(),
        failures.join("\n")
    );
}
