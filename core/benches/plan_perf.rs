//! Planner and lexical matcher throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skillwave_core::api::{Dag, ExecutionPlanner, LexicalStrategy, SkillDescriptor, Subtask};

/// Layered graph: `width` nodes per layer, each depending on two nodes of the previous layer.
fn layered(layers: usize, width: usize, paths: usize) -> Vec<Subtask> {
    let mut out = Vec::with_capacity(layers * width);
    for l in 0..layers {
        for w in 0..width {
            let deps: Vec<String> = if l == 0 {
                Vec::new()
            } else {
                vec![
                    format!("n{}_{}", l - 1, w),
                    format!("n{}_{}", l - 1, (w + 1) % width),
                ]
            };
            out.push(
                Subtask::new(format!("n{l}_{w}"), format!("step {l} part {w}"))
                    .with_dependencies(deps)
                    .with_write_paths([format!("src/mod{}.rs", (l * width + w) % paths)]),
            );
        }
    }
    out
}

fn bench_dag_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("dag_build");
    for size in [10usize, 50, 100] {
        let tasks = layered(size, 10, 1_000_000);
        group.bench_with_input(BenchmarkId::from_parameter(size * 10), &tasks, |b, tasks| {
            b.iter(|| Dag::build(black_box(tasks.clone())).unwrap())
        });
    }
    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    for paths in [1_000_000usize, 7] {
        let dag = Dag::build(layered(50, 10, paths)).unwrap();
        let planner = ExecutionPlanner::default();
        let label = if paths > 1_000 { "disjoint" } else { "conflicting" };
        group.bench_function(label, |b| b.iter(|| planner.plan(black_box(&dag)).unwrap()));
    }
    group.finish();
}

fn bench_lexical_score(c: &mut Criterion) {
    let skills: Vec<SkillDescriptor> = (0..200)
        .map(|i| {
            SkillDescriptor::new(
                format!("s{i}"),
                format!("Skill {i}"),
                format!("Handles area {i} with tooling for builds and tests"),
            )
            .with_tags([format!("tag{}", i % 17)])
        })
        .collect();
    let task = Subtask::new("t", "Run the builds and tests for area 42").with_capabilities(["tag8"]);
    let lexical = LexicalStrategy::new();

    c.bench_function("lexical_score_200", |b| {
        b.iter(|| {
            for skill in &skills {
                black_box(lexical.score_one(black_box(&task), skill));
            }
        })
    });
}

criterion_group!(benches, bench_dag_build, bench_plan, bench_lexical_score);
criterion_main!(benches);
