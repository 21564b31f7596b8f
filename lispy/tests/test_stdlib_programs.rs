// Builtins exercised through source programs
use lispy::Runtime;
use pretty_assertions::assert_eq;

fn check(runtime: &Runtime, cases: &[(&str, &str)]) {
    for (source, expected) in cases {
        let value = runtime
            .evaluate(source)
            .unwrap_or_else(|e| panic!("{} failed: {}", source, e));
        assert_eq!(value.to_string(), *expected, "evaluating {}", source);
    }
}

#[test]
fn test_list_programs() {
    let runtime = Runtime::new();
    check(
        &runtime,
        &[
            ("(define x (list 1 2 3 4))", "(1 2 3 4)"),
            ("(car x)", "1"),
            ("(cdr x)", "(2 3 4)"),
            ("(cons 0 x)", "(0 1 2 3 4)"),
            ("(cons 1 nil)", "(1)"),
            ("(length x)", "4"),
            ("(length ())", "0"),
            ("x", "(1 2 3 4)"),
        ],
    );
}

#[test]
fn test_map_programs() {
    let runtime = Runtime::new();
    check(
        &runtime,
        &[
            ("(define x (list 1 2 3 4))", "(1 2 3 4)"),
            ("(map - x)", "(-1 -2 -3 -4)"),
            ("(map cons x ())", "((1) (2) (3) (4))"),
            ("(map * (list 1 2) (list 10 20) (list -1 1))", "(-10 40)"),
            (
                "(map list (list 0 1 2) (list \"str\" #t))",
                "((0 \"str\") (1 #t) (2 nil))",
            ),
        ],
    );
}

#[test]
fn test_apply_and_logic_programs() {
    let runtime = Runtime::new();
    check(
        &runtime,
        &[
            ("(apply + 0 1 (list 2 3) 4)", "10"),
            ("(apply list 1 (list 2 (list 3)))", "(1 2 (3))"),
            ("(or nil 0 () t)", "#t"),
            ("(or nil 0 ())", "#f"),
            ("(and 1 \"a\" (list 1))", "#t"),
            ("(and 1 nil)", "#f"),
            ("(not ())", "#t"),
            ("(begin 1 2 3)", "3"),
            ("(begin)", "nil"),
        ],
    );
}

#[test]
fn test_equality_programs() {
    let runtime = Runtime::new();
    check(
        &runtime,
        &[
            ("(eq? 'a 'a)", "#t"),
            ("(eq? 1 1)", "#t"),
            ("(eq? (list 1) (list 1))", "#f"),
            ("(eq? () ())", "#t"),
            ("(eq? car car)", "#t"),
            ("(equal? (list 1 (list 2)) (list 1 (list 2)))", "#t"),
            ("(equal? 1 1.0)", "#t"),
            ("(eq? 1 1.0)", "#f"),
            ("(= 2 2.0)", "#t"),
        ],
    );
}

#[test]
fn test_numeric_tower_programs() {
    let runtime = Runtime::new();
    check(
        &runtime,
        &[
            ("(+ 1 2)", "3"),
            ("(+ 1 2.5)", "3.5"),
            ("(* 2 3)", "6"),
            ("(/ 6 3)", "2.0"),
            ("(/ 1 4)", "0.25"),
            ("(- 0.5 1)", "-0.5"),
            ("(+ 0.1 0.2)", "0.3"),
            ("(< 1 1.5)", "#t"),
            ("(>= 3 3)", "#t"),
            ("(<= 4 3)", "#f"),
            ("(* 99999999999999999999 99999999999999999999)", "9999999999999999999800000000000000000001"),
        ],
    );
}

#[test]
fn test_pi_is_exact_rational() {
    let runtime = Runtime::new();
    check(
        &runtime,
        &[
            ("(* pi 100)", "314.1592653589793115997963468544185161590576171875"),
            ("(define r 5)", "5"),
            (
                "(* pi (* r r))",
                "78.539816339744827899949086713604629039764404296875",
            ),
        ],
    );
}

#[test]
fn test_float_display_precision() {
    let runtime = Runtime::new();
    let third = runtime.evaluate("(/ 1 3)").unwrap();
    assert_eq!(format!("{:.5}", third), "0.33333");
    assert_eq!(third.to_string().len(), "0.".len() + 64);
}

#[test]
fn test_builtin_errors() {
    let runtime = Runtime::new();
    for source in [
        "(car ())",
        "(cdr 1)",
        "(+ 1 \"a\")",
        "(/ 1 0)",
        "(- 1 2 3)",
        "(< 1)",
        "(map 1 (list 1))",
        "(cons 1 2)",
    ] {
        assert!(runtime.evaluate(source).is_err(), "{} should fail", source);
    }
}
