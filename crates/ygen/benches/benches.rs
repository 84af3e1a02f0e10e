use std::{env, fs, path::PathBuf};

use criterion::{criterion_group, criterion_main, Criterion};
use ygen::{codegen::Codegen, syntax, Options};

criterion_main!(benches);
criterion_group!(benches, bench_fixtures);

fn bench_fixtures(c: &mut Criterion) {
    bench_generate(c, "annot");
    bench_generate(c, "calc");
    bench_generate(c, "families");
}

fn bench_generate(c: &mut Criterion, grammar_name: &str) {
    let project_root = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .expect("missing environment variable: `CARGO_MANIFEST_DIR'");
    let source =
        fs::read_to_string(project_root.join(format!("tests/{}.ypp", grammar_name))).unwrap();
    let options = Options::new();
    let config = syntax::parse(&source).unwrap().config;

    let mut group = c.benchmark_group(grammar_name);
    group.bench_function("parse", |b| {
        b.iter(|| syntax::parse(&source));
    });
    group.bench_function("generate", |b| {
        b.iter(|| Codegen::new(&config, &options).map(|codegen| codegen.to_string()));
    });
    group.bench_function("compile", |b| {
        b.iter(|| ygen::compile(&source, &options));
    });
    group.finish();
}
