// Behaviour of function bodies compiled ahead of their first call
use lispy::ast::{Expression, IfExpr, LambdaExpr, Symbol};
use lispy::runtime::{Function, RuntimeError, Value};
use lispy::{LispyError, Runtime};
use pretty_assertions::assert_eq;

fn eval(runtime: &Runtime, source: &str) -> Value {
    runtime
        .evaluate(source)
        .unwrap_or_else(|e| panic!("{} failed: {}", source, e))
}

fn runtime_error(runtime: &Runtime, source: &str) -> RuntimeError {
    match runtime.evaluate(source) {
        Err(LispyError::Runtime(e)) => e,
        other => panic!("expected runtime error from {}, got {:?}", source, other),
    }
}

#[test]
fn test_names_bound_at_compile_time_are_frozen() {
    let runtime = Runtime::new();
    eval(&runtime, "(define x 1)");
    eval(&runtime, "(defun get-x () x)");
    eval(&runtime, "(set! x 2)");

    assert_eq!(eval(&runtime, "x"), Value::from(2));
    assert_eq!(eval(&runtime, "(get-x)"), Value::from(1));
}

#[test]
fn test_redefined_function_is_not_seen_by_earlier_callers() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun f () 1)");
    eval(&runtime, "(defun g () (f))");
    eval(&runtime, "(defun f () 2)");

    assert_eq!(eval(&runtime, "(g)"), Value::from(1));
    assert_eq!(eval(&runtime, "(f)"), Value::from(2));
}

#[test]
fn test_names_unbound_at_compile_time_are_looked_up_per_call() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun bar () (+ foo 1))");

    assert_eq!(
        runtime_error(&runtime, "(bar)"),
        RuntimeError::UndefinedSymbol(Symbol::new("foo"))
    );

    eval(&runtime, "(define foo 1)");
    assert_eq!(eval(&runtime, "(bar)"), Value::from(2));

    eval(&runtime, "(set! foo 41)");
    assert_eq!(eval(&runtime, "(bar)"), Value::from(42));
}

#[test]
fn test_set_is_shared_by_every_late_bound_closure() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun get-x () x)");
    eval(&runtime, "(defun get-x-plus (n) (+ x n))");
    eval(&runtime, "(define x 1)");
    eval(&runtime, "(defun frozen-x () x)");
    eval(&runtime, "(set! x 3)");

    assert_eq!(eval(&runtime, "(get-x)"), Value::from(3));
    assert_eq!(eval(&runtime, "(get-x-plus 10)"), Value::from(13));
    assert_eq!(eval(&runtime, "(frozen-x)"), Value::from(1));
}

#[test]
fn test_parameters_shadow_globals() {
    let runtime = Runtime::new();
    eval(&runtime, "(define x 100)");
    eval(&runtime, "(defun id (x) x)");
    assert_eq!(eval(&runtime, "(id 5)"), Value::from(5));
}

#[test]
fn test_untaken_branch_is_never_evaluated() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun pick (flag) (if flag 1 (undefined-fn 2)))");
    assert_eq!(eval(&runtime, "(pick t)"), Value::from(1));
    assert_eq!(
        runtime_error(&runtime, "(pick nil)"),
        RuntimeError::UndefinedSymbol(Symbol::new("undefined-fn"))
    );

    eval(&runtime, "(defun always () (if t 'yes (undefined-fn)))");
    assert_eq!(eval(&runtime, "(always)"), Value::symbol("yes"));
}

#[test]
fn test_constant_body_is_folded() {
    let runtime = Runtime::new();
    let function = runtime.function("(lambda (x) (if nil x 7))").unwrap();
    match function {
        Function::Closure(closure) => {
            assert!(closure.body().is_constant());
            assert_eq!(closure.invoke(vec![Value::Nil]), Ok(Value::from(7)));
        }
        other => panic!("expected closure, got {}", other),
    }
}

#[test]
fn test_closure_arity_mismatch() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun pair (a b) (list a b))");

    assert_eq!(
        runtime_error(&runtime, "(pair 1)"),
        RuntimeError::ArityMismatch {
            function: "pair".to_string(),
            expected: "2".to_string(),
            actual: 1,
        }
    );
    assert_eq!(
        runtime_error(&runtime, "((lambda () 1) 2)"),
        RuntimeError::ArityMismatch {
            function: "lambda".to_string(),
            expected: "0".to_string(),
            actual: 1,
        }
    );
}

#[test]
fn test_definitions_inside_bodies_are_unsupported() {
    let runtime = Runtime::new();
    assert_eq!(
        runtime_error(&runtime, "(lambda () (define y 1))"),
        RuntimeError::UnsupportedForm("define".to_string())
    );
    assert_eq!(
        runtime_error(&runtime, "(defun f (x) (set! x 1))"),
        RuntimeError::UnsupportedForm("set!".to_string())
    );
    assert_eq!(
        runtime_error(&runtime, "(defun adder (n) (lambda (x) (+ x n)))"),
        RuntimeError::UnsupportedForm("lambda".to_string())
    );
    // A failed defun leaves no binding behind
    assert_eq!(
        runtime_error(&runtime, "adder"),
        RuntimeError::UndefinedSymbol(Symbol::new("adder"))
    );
}

#[test]
fn test_multi_form_body_returns_last_value() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun second (a b) a b)");
    assert_eq!(eval(&runtime, "(second 1 2)"), Value::from(2));
}

#[test]
fn test_quote_and_unquote_in_body() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun wrap (v) '(wrapped ,v (nested ,(+ v 1))))");
    assert_eq!(
        eval(&runtime, "(wrap 3)").to_string(),
        "(wrapped 3 (nested 4))"
    );
}

#[test]
fn test_non_function_head_fails_when_called() {
    let runtime = Runtime::new();
    eval(&runtime, "(defun broken () (1 2))");
    assert_eq!(
        runtime_error(&runtime, "(broken)"),
        RuntimeError::TypeError {
            expected: "function".to_string(),
            actual: "integer".to_string(),
            operation: "call".to_string(),
        }
    );
}

#[test]
fn test_compiled_and_direct_evaluation_agree() {
    let runtime = Runtime::new();
    let expr = Expression::If(IfExpr {
        condition: Box::new(Expression::List(vec![
            Expression::symbol(">"),
            Expression::symbol("n"),
            Expression::integer(0),
        ])),
        then_branch: Box::new(Expression::symbol("n")),
        else_branch: Box::new(Expression::List(vec![
            Expression::symbol("-"),
            Expression::symbol("n"),
        ])),
    });

    let evaluator = runtime.evaluator();
    let abs = evaluator
        .evaluate(&Expression::Lambda(LambdaExpr {
            params: vec![Symbol::new("n")],
            body: Box::new(expr.clone()),
        }))
        .unwrap();
    let abs = match abs {
        Value::Function(f) => f,
        other => panic!("expected function, got {}", other),
    };

    for n in [-3, 0, 4] {
        evaluator
            .evaluate(&Expression::Define(lispy::ast::DefineExpr {
                symbol: Symbol::new("n"),
                value: Box::new(Expression::integer(n)),
            }))
            .unwrap();
        let direct = evaluator.evaluate(&expr).unwrap();
        assert_eq!(abs.call(vec![Value::from(n)]).unwrap(), direct);
    }
}
