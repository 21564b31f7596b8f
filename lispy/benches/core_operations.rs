use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lispy::parser::parse_expression;
use lispy::runtime::{Evaluator, Value};
use lispy::Runtime;

/// Benchmark parsing performance
fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let test_cases = vec![
        ("simple_int", "42"),
        ("simple_string", "\"hello world\""),
        ("arithmetic", "(+ 1 2 3 4 5)"),
        ("nested_arithmetic", "(+ (* 2 3) (- 10 5))"),
        ("function_def", "(lambda (x y) (+ x y))"),
        ("conditional", "(if (> 5 3) \"yes\" \"no\")"),
        ("quoted_list", "'(1 2 3 4 5)"),
    ];

    for (name, expr) in test_cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &expr, |b, &expr| {
            b.iter(|| parse_expression(black_box(expr)));
        });
    }

    group.finish();
}

/// Benchmark direct evaluation of top-level forms
fn benchmark_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    let evaluator = Evaluator::new();

    let test_cases = vec![
        ("literal_int", "42"),
        ("literal_string", "\"hello\""),
        ("arithmetic_simple", "(+ 1 2)"),
        ("arithmetic_complex", "(+ (* 2 3) (- 10 5) (/ 20 4))"),
        ("conditional", "(if t 42 0)"),
        ("list_creation", "(list 1 2 3 4 5 6 7 8 9 10)"),
        ("map", "(map + (list 1 2 3) (list 4 5 6))"),
    ];

    for (name, expr) in test_cases {
        let parsed = parse_expression(expr).expect("benchmark input parses");
        group.bench_with_input(BenchmarkId::from_parameter(name), &parsed, |b, parsed| {
            b.iter(|| evaluator.evaluate(black_box(parsed)));
        });
    }

    group.finish();
}

/// Benchmark calls into a compiled recursive function
fn benchmark_factorial(c: &mut Criterion) {
    let mut group = c.benchmark_group("factorial");
    let runtime = Runtime::new();
    let fact = runtime
        .function("(defun fact (n) (if (<= n 1) 1 (* n (fact (- n 1)))))")
        .expect("factorial compiles");

    for n in [10i64, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| fact.call(vec![Value::from(black_box(n))]));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_evaluation,
    benchmark_factorial
);
criterion_main!(benches);
