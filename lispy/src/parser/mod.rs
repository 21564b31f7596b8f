use crate::ast::Expression;
use pest::iterators::Pair;
use pest::Parser;

// Declare submodules
pub mod errors;
pub mod expressions;
pub mod special_forms;

// Import items from submodules
pub use errors::{PestParseError, SourceSpan};
use expressions::build_expression;

// Define the parser struct using the grammar file
#[derive(pest_derive::Parser)]
#[grammar = "lispy.pest"] // Path relative to src/
pub struct LispyParser;

fn top_level_pairs<'i>(root: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    root.into_inner().filter(|p| p.as_rule() != Rule::EOI)
}

/// Parse a full program into a `Sequence` of its top-level forms.
pub fn parse(input: &str) -> Result<Expression, PestParseError> {
    parse_forms(input).map(Expression::Sequence)
}

/// Parse a program into its top-level forms, in source order.
pub fn parse_forms(input: &str) -> Result<Vec<Expression>, PestParseError> {
    let mut pairs = LispyParser::parse(Rule::program, input)?;
    match pairs.next() {
        Some(program) => top_level_pairs(program).map(build_expression).collect(),
        None => Ok(vec![]),
    }
}

/// Parse exactly one form.
pub fn parse_expression(input: &str) -> Result<Expression, PestParseError> {
    let mut pairs = LispyParser::parse(Rule::single, input)?;
    let form = pairs
        .next()
        .and_then(|single| top_level_pairs(single).next())
        .ok_or_else(|| PestParseError::InvalidInput {
            message: "expected one expression".to_string(),
            span: None,
        })?;
    build_expression(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DefunExpr, IfExpr, Literal, Symbol};
    use num_bigint::BigInt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_atoms() {
        assert_eq!(parse_expression("42"), Ok(Expression::integer(42)));
        assert_eq!(parse_expression("-7"), Ok(Expression::integer(-7)));
        assert_eq!(parse_expression("-"), Ok(Expression::symbol("-")));
        assert_eq!(parse_expression("set!"), Ok(Expression::symbol("set!")));
        assert_eq!(parse_expression("nil"), Ok(Expression::Literal(Literal::Nil)));
        assert_eq!(parse_expression("nil?"), Ok(Expression::symbol("nil?")));
        assert_eq!(
            parse_expression("t"),
            Ok(Expression::Literal(Literal::Boolean(true)))
        );
        assert_eq!(
            parse_expression("#f"),
            Ok(Expression::Literal(Literal::Boolean(false)))
        );
        assert_eq!(
            parse_expression(r#""a\n\"b\"""#),
            Ok(Expression::Literal(Literal::String("a\n\"b\"".to_string())))
        );
    }

    #[test]
    fn test_parse_program_is_sequence() {
        let program = parse("(define x 1) ; comment\n x").unwrap();
        match program {
            Expression::Sequence(forms) => {
                assert_eq!(forms.len(), 2);
                assert_eq!(forms[1], Expression::symbol("x"));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
        assert_eq!(parse(""), Ok(Expression::Sequence(vec![])));
    }

    #[test]
    fn test_parse_special_forms() {
        assert_eq!(
            parse_expression("(if t 1 2)"),
            Ok(Expression::If(IfExpr {
                condition: Box::new(Expression::Literal(Literal::Boolean(true))),
                then_branch: Box::new(Expression::integer(1)),
                else_branch: Box::new(Expression::integer(2)),
            }))
        );
        assert_eq!(
            parse_expression("(defun id (x) x)"),
            Ok(Expression::Defun(DefunExpr {
                name: Symbol::new("id"),
                params: vec![Symbol::new("x")],
                body: Box::new(Expression::symbol("x")),
            }))
        );
    }

    #[test]
    fn test_multi_form_body_becomes_sequence() {
        match parse_expression("(lambda () 1 2)").unwrap() {
            Expression::Lambda(lambda) => assert_eq!(
                *lambda.body,
                Expression::Sequence(vec![Expression::integer(1), Expression::integer(2)])
            ),
            other => panic!("expected lambda, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_parses_data() {
        assert_eq!(
            parse_expression("'(if 1)"),
            Ok(Expression::Quote(Box::new(Expression::List(vec![
                Expression::symbol("if"),
                Expression::integer(1),
            ]))))
        );
        assert_eq!(parse_expression("(quote a)"), parse_expression("'a"));
        assert_eq!(
            parse_expression("'(a ,(car x))"),
            Ok(Expression::Quote(Box::new(Expression::List(vec![
                Expression::symbol("a"),
                Expression::Unquote(Box::new(Expression::List(vec![
                    Expression::symbol("car"),
                    Expression::symbol("x"),
                ]))),
            ]))))
        );
    }

    #[test]
    fn test_special_form_arity_errors() {
        assert!(matches!(
            parse_expression("(if t 1)"),
            Err(PestParseError::SpecialFormArity { ref form, actual: 2, .. }) if form == "if"
        ));
        assert!(matches!(
            parse_expression("(define x)"),
            Err(PestParseError::SpecialFormArity { .. })
        ));
        assert!(matches!(
            parse_expression("(lambda (x))"),
            Err(PestParseError::SpecialFormArity { .. })
        ));
    }

    #[test]
    fn test_invalid_syntax() {
        assert!(matches!(
            parse_expression("(lambda (x x) x)"),
            Err(PestParseError::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_expression("(define 1 2)"),
            Err(PestParseError::UnexpectedRule { .. })
        ));
        assert!(matches!(
            parse_expression(r#""bad \q""#),
            Err(PestParseError::InvalidEscapeSequence { .. })
        ));
        assert!(matches!(
            parse_expression("(+ 1 2"),
            Err(PestParseError::PestError(_))
        ));
    }

    #[test]
    fn test_big_integer_literal() {
        let text = "123456789012345678901234567890";
        assert_eq!(
            parse_expression(text),
            Ok(Expression::Literal(Literal::Integer(
                text.parse::<BigInt>().unwrap()
            )))
        );
    }
}
