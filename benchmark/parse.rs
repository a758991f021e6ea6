use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mdrender::{RenderOptions, Renderer};

fn load_example_markdown() -> String {
    let json = include_str!("../tests/fixtures/commonmark-0.31.2.json");
    let examples: Vec<serde_json::Value> = serde_json::from_str(json).unwrap();
    examples
        .iter()
        .filter_map(|e| e["markdown"].as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn gen_heading_doc(n: usize) -> String {
    (1..=n)
        .map(|i| format!("# Heading {i}\n\nSome paragraph text under heading {i}.\n"))
        .collect()
}

fn gen_nested_list(depth: usize) -> String {
    let mut s = String::new();
    for i in 0..depth {
        s.push_str(&"  ".repeat(i));
        s.push_str(&format!("- item {i}\n"));
    }
    s
}

fn gen_blockquotes(n: usize) -> String {
    (0..n)
        .map(|i| format!("> quote {i}\n> with *emphasis* and a [ref][r{i}]\n\n[r{i}]: /r/{i}\n\n"))
        .collect()
}

fn gen_inline_heavy() -> String {
    let mut s = String::new();
    for i in 0..200 {
        s.push_str(&format!(
            "This has **bold**, *italic*, `code`, <b>html</b>, [link](http://x.com/{i}), and more.\n\n"
        ));
    }
    s
}

fn gen_code_blocks(n: usize) -> String {
    (0..n)
        .map(|i| format!("```rust\nfn func_{i}() {{\n    println!(\"hello\");\n}}\n```\n\n"))
        .collect()
}

fn gen_pathological_emphasis(n: usize) -> String {
    "*a ".repeat(n) + &"_b ".repeat(n)
}

// --- Renderer wrappers ---

type RenderFn = fn(&str) -> String;

const RENDERERS: &[(&str, RenderFn)] = &[
    ("mdrender", render_mdrender),
    ("mdrender_hard_breaks", render_mdrender_hard_breaks),
    ("pulldown_cmark", render_pulldown_cmark),
    ("comrak", render_comrak),
];

fn render_mdrender(input: &str) -> String {
    mdrender::render_to_html(input, &RenderOptions::DEFAULT)
}

fn render_mdrender_hard_breaks(input: &str) -> String {
    Renderer::hard_breaks().render(input)
}

fn render_pulldown_cmark(input: &str) -> String {
    let parser = pulldown_cmark::Parser::new_ext(input, pulldown_cmark::Options::empty());
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

fn render_comrak(input: &str) -> String {
    comrak::markdown_to_html(input, &comrak::Options::default())
}

// --- Benchmark helper ---

fn bench_group(c: &mut Criterion, group_name: &str, input: &str) {
    let label = format!("{} bytes", input.len());
    let mut group = c.benchmark_group(group_name);
    for &(name, func) in RENDERERS {
        group.bench_with_input(BenchmarkId::new(name, &label), input, |b, input| {
            b.iter(|| func(black_box(input)))
        });
    }
    group.finish();
}

// --- Benchmarks ---

fn bench_examples(c: &mut Criterion) {
    let input = load_example_markdown();
    bench_group(c, "commonmark_examples", &input);
}

fn bench_sizes(c: &mut Criterion) {
    let base = gen_inline_heavy();
    for &size in &[1_000, 10_000, 100_000] {
        let input: String = base.chars().cycle().take(size).collect();
        bench_group(c, &format!("document_size/{size} bytes"), &input);
    }
}

fn bench_block_types(c: &mut Criterion) {
    let cases: Vec<(&str, String)> = vec![
        ("headings", gen_heading_doc(200)),
        ("nested_lists", gen_nested_list(50)),
        ("blockquotes", gen_blockquotes(100)),
        ("code_blocks", gen_code_blocks(100)),
    ];
    for (name, input) in &cases {
        bench_group(c, &format!("block_types/{name}"), input);
    }
}

fn bench_inline(c: &mut Criterion) {
    let input = gen_inline_heavy();
    bench_group(c, "inline_heavy", &input);
}

fn bench_pathological(c: &mut Criterion) {
    let input = gen_pathological_emphasis(5_000);
    bench_group(c, "pathological/emphasis", &input);
}

criterion_group!(
    benches,
    bench_examples,
    bench_sizes,
    bench_block_types,
    bench_inline,
    bench_pathological,
);
criterion_main!(benches);
