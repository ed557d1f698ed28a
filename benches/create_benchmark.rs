use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::Path;
use tempfile::TempDir;

use bem_create::content::{Content, FileTree};
use bem_create::creator::{create, plan, CreateOptions, FileContent};
use bem_create::expand::expand_braces;
use bem_create::materializer::{materialize, materialize_tree, WriteOptions};
use bem_create::naming::Naming;
use bem_create::resolver::{Context, EntityInput};
use bem_create::settings::Settings;
use bem_create::techs::TechFilter;
use bem_create::template::FsTemplates;

fn overwrite() -> WriteOptions {
    WriteOptions {
        force_rewrite: true,
        no_warn: true,
    }
}

/// `{b0,b1,...}` shorthand producing `count` blocks
fn block_shorthand(count: usize) -> String {
    let names: Vec<String> = (0..count).map(|i| format!("b{i}")).collect();
    format!("{{{}}}", names.join(","))
}

fn techs() -> Vec<String> {
    ["css", "js", "deps.js", "bemhtml.js"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Benchmark shorthand parsing
fn bench_parse(c: &mut Criterion) {
    let naming = Naming::origin();

    c.bench_function("naming_parse", |b| {
        b.iter(|| naming.parse(black_box("my-block__some-elem_theme_dark")))
    });

    c.bench_function("expand_braces_nested", |b| {
        b.iter(|| expand_braces(black_box("{b1,b2}__{e1,e2{_m1,_m2}}.{css,js}")))
    });
}

/// Benchmark resolution and cell matrix construction without writing
fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    let settings = Settings::default();
    let cwd = Path::new("/proj/blocks");
    let ctx = Context {
        cwd,
        config: &settings,
        templates: &FsTemplates,
    };
    let techs = techs();

    for count in [10, 100, 500].iter() {
        let entities = vec![EntityInput::Shorthand(block_shorthand(*count))];

        group.throughput(Throughput::Elements((*count * techs.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| plan(black_box(&entities), &[], &techs, &TechFilter::default(), &ctx).unwrap())
        });
    }

    group.finish();
}

/// Benchmark single file and tree writes
fn bench_materialize(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("b").join("b.css");

    c.bench_function("materialize_text", |b| {
        b.iter(|| materialize(black_box(&target), Content::from(".b {}"), &overwrite()).unwrap())
    });

    let mut group = c.benchmark_group("materialize_tree");
    for file_count in [10, 100].iter() {
        let root = temp.path().join(format!("tree{file_count}"));

        group.throughput(Throughput::Elements(*file_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            file_count,
            |b, &count| {
                b.iter(|| {
                    let tree: FileTree = (0..count)
                        .map(|i| (format!("file{i}.txt"), Content::from("content")))
                        .collect();
                    materialize_tree(tree, black_box(&root), &overwrite()).unwrap()
                })
            },
        );
    }
    group.finish();
}

/// Benchmark the full create path
fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");
    let settings = Settings::default();
    let techs = techs();

    for count in [10, 100].iter() {
        let temp = TempDir::new().unwrap();
        let ctx = Context {
            cwd: temp.path(),
            config: &settings,
            templates: &FsTemplates,
        };
        let entities = vec![EntityInput::Shorthand(block_shorthand(*count))];

        group.throughput(Throughput::Elements((*count * techs.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let options = CreateOptions {
                    file_content: Some(FileContent::Text(String::new())),
                    write: overwrite(),
                    ..CreateOptions::default()
                };
                create(black_box(&entities), &[], &techs, options, &ctx).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_plan,
    bench_materialize,
    bench_create,
);
criterion_main!(benches);
