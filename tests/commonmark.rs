use mdrender::Renderer;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct Example {
    markdown: String,
    html: String,
    example: u32,
    section: String,
}

#[test]
fn commonmark_examples() {
    let json = include_str!("./fixtures/commonmark-0.31.2.json");
    let examples: Vec<Example> = serde_json::from_str(json).expect("Failed to parse example JSON");
    assert!(!examples.is_empty());

    let renderer = Renderer::default();
    let mut pass = 0u32;
    let mut fail = 0u32;
    let mut failures = Vec::new();
    let mut section_stats: BTreeMap<&str, (u32, u32)> = BTreeMap::new();

    for example in &examples {
        let result = renderer
            .render_to_html(&example.markdown)
            .expect("examples are valid UTF-8");
        let entry = section_stats.entry(&example.section).or_insert((0, 0));
        if result == example.html {
            pass += 1;
            entry.0 += 1;
        } else {
            fail += 1;
            entry.1 += 1;
            failures.push(format!(
                "FAIL example {} ({})\n  input:    {:?}\n  expected: {:?}\n  got:      {:?}",
                example.example, example.section, example.markdown, example.html, result
            ));
        }
    }

    eprintln!("\n=== CommonMark examples ===");
    eprintln!("{pass}/{} passed ({fail} failed)\n", pass + fail);

    eprintln!("Section breakdown:");
    for (section, (p, f)) in &section_stats {
        let total = p + f;
        let status = if *f == 0 { "  OK" } else { "FAIL" };
        eprintln!("  {status} {section}: {p}/{total}");
    }

    if !failures.is_empty() {
        eprintln!("\nFailures:");
        for f in &failures {
            eprintln!("{f}");
        }
    }

    if fail > 0 {
        panic!("{fail} CommonMark examples failed (see details above)");
    }
}

#[test]
fn hard_breaks_only_change_soft_breaks() {
    let json = include_str!("./fixtures/commonmark-0.31.2.json");
    let examples: Vec<Example> = serde_json::from_str(json).expect("Failed to parse example JSON");

    let soft = Renderer::default();
    let hard = Renderer::hard_breaks();
    for example in &examples {
        let soft_html = soft.render_to_html(&example.markdown).expect("valid UTF-8");
        let hard_html = hard.render_to_html(&example.markdown).expect("valid UTF-8");
        if soft_html == hard_html {
            continue;
        }
        assert!(
            hard_html.len() > soft_html.len(),
            "example {}: hard breaks removed output",
            example.example
        );
        assert_eq!(
            hard_html.replace("<br />\n", "\n"),
            soft_html.replace("<br />\n", "\n"),
            "example {}",
            example.example
        );
    }
}
