use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mathgrade_core::expr::evaluate;
use mathgrade_core::task::parse_task;

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let flat = "1+2*3-4/5+6*7-8/9+10";
    let nested = "((1+2)*(3+4))/((5+6)*(7+8))";
    let long = {
        let mut s = String::from("1");
        for i in 0..200 {
            s.push_str(if i % 2 == 0 { "+" } else { "*" });
            s.push_str("2");
        }
        s
    };

    group.bench_function("flat", |b| b.iter(|| evaluate(black_box(flat))));
    group.bench_function("nested", |b| b.iter(|| evaluate(black_box(nested))));
    group.bench_function("long", |b| b.iter(|| evaluate(black_box(&long))));

    group.finish();
}

fn bench_parse_task(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_task");

    group.bench_function("well_formed", |b| {
        b.iter(|| parse_task(black_box("  (2+3)*4 = 20  "), black_box("t1")))
    });
    group.bench_function("malformed", |b| {
        b.iter(|| parse_task(black_box("no separator here"), black_box("t1")))
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_parse_task);
criterion_main!(benches);
