use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use state_diagram_layout::config::{LayoutConfig, RenderConfig};
use state_diagram_layout::parser::parse_diagram;
use state_diagram_layout::render::render_svg;
use state_diagram_layout::theme::Theme;
use std::hint::black_box;

fn chain_source(nodes: usize) -> String {
    let mut out = String::from("stateDiagram-v2\n");
    for i in 0..nodes.saturating_sub(1) {
        out.push_str(&format!("  S{} --> S{}\n", i, i + 1));
    }
    out
}

/// A chain plus forward shortcuts and a few back edges.
fn dense_source(nodes: usize, extra_edges: usize) -> String {
    let mut out = chain_source(nodes);
    let mut count = 0usize;
    for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break;
            }
            out.push_str(&format!("  S{} --> S{}\n", i, j));
            count += 1;
        }
        if count >= extra_edges {
            break;
        }
    }
    for i in (3..nodes).step_by(7) {
        out.push_str(&format!("  S{} --> S{}\n", i, i - 3));
    }
    out
}

/// Every node fans out to `width` children, `depth` levels deep.
fn fanout_source(width: usize, depth: usize) -> String {
    let mut out = String::from("stateDiagram-v2\n[*] --> N0\n");
    let mut next = 1usize;
    let mut level = vec![0usize];
    for _ in 0..depth {
        let mut children = Vec::with_capacity(level.len() * width);
        for parent in &level {
            for _ in 0..width {
                out.push_str(&format!("  N{} --> N{}\n", parent, next));
                children.push(next);
                next += 1;
            }
        }
        level = children;
    }
    out
}

fn sources() -> Vec<(String, String)> {
    vec![
        ("chain_50".to_string(), chain_source(50)),
        ("chain_500".to_string(), chain_source(500)),
        ("dense_60_180".to_string(), dense_source(60, 180)),
        ("dense_120_600".to_string(), dense_source(120, 600)),
        ("fanout_3x5".to_string(), fanout_source(3, 5)),
        ("fanout_8x3".to_string(), fanout_source(8, 3)),
    ]
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, input) in sources() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let parsed = parse_diagram(black_box(data)).expect("parse failed");
                black_box(parsed.graph.nodes().len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for (name, input) in sources() {
        let parsed = parse_diagram(&input).expect("parse failed");
        for (mode, config) in [
            ("plain", LayoutConfig::default()),
            (
                "labels_balanced",
                LayoutConfig {
                    include_labels: true,
                    balance: true,
                    ..LayoutConfig::default()
                },
            ),
        ] {
            group.bench_with_input(BenchmarkId::new(mode, &name), &parsed.graph, |b, graph| {
                b.iter(|| {
                    let mut diagram = graph
                        .to_state_diagram(config.clone())
                        .expect("conversion failed");
                    let summary = diagram.layout().expect("layout failed");
                    black_box(summary.columns);
                });
            });
        }
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let theme = Theme::modern();
    let render = RenderConfig::default();
    for (name, input) in sources() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let parsed = parse_diagram(black_box(data)).expect("parse failed");
                let mut diagram = parsed
                    .graph
                    .to_state_diagram(LayoutConfig::default())
                    .expect("conversion failed");
                let summary = diagram.layout().expect("layout failed");
                let svg = render_svg(&diagram, &summary, &theme, &render);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_layout, bench_end_to_end);
criterion_main!(benches);
