use super::errors::{invalid_literal_error, pair_to_source_span, PestParseError};
use super::special_forms::build_special_form;
use super::Rule;
use crate::ast::{Expression, Literal, Symbol};
use num_bigint::BigInt;
use num_rational::BigRational;
use pest::iterators::Pair;

/// Builds a form in code position: lists headed by a special-form keyword
/// become dedicated nodes, every other list is a call form.
pub fn build_expression(pair: Pair<Rule>) -> Result<Expression, PestParseError> {
    match pair.as_rule() {
        Rule::list => {
            let span_pair = pair.clone();
            let mut children = pair.into_inner().peekable();
            let keyword = children
                .peek()
                .filter(|head| head.as_rule() == Rule::symbol)
                .map(|head| head.as_str().to_string());

            if let Some(form) = keyword.as_deref().filter(|k| is_special_form(k)) {
                children.next();
                return build_special_form(form, children.collect(), &span_pair);
            }

            children
                .map(build_expression)
                .collect::<Result<Vec<_>, _>>()
                .map(Expression::List)
        }
        Rule::quoted => Ok(Expression::Quote(Box::new(build_datum(first_inner(pair)?)?))),
        Rule::unquoted => Ok(Expression::Unquote(Box::new(build_expression(
            first_inner(pair)?,
        )?))),
        _ => build_atom(pair),
    }
}

/// Builds a form in quoted position: lists stay lists and keywords stay
/// symbols. Unquoted sub-forms switch back to code position.
pub fn build_datum(pair: Pair<Rule>) -> Result<Expression, PestParseError> {
    match pair.as_rule() {
        Rule::list => pair
            .into_inner()
            .map(build_datum)
            .collect::<Result<Vec<_>, _>>()
            .map(Expression::List),
        Rule::quoted => Ok(Expression::Quote(Box::new(build_datum(first_inner(pair)?)?))),
        Rule::unquoted => Ok(Expression::Unquote(Box::new(build_expression(
            first_inner(pair)?,
        )?))),
        _ => build_atom(pair),
    }
}

pub fn is_special_form(keyword: &str) -> bool {
    matches!(keyword, "quote" | "if" | "define" | "set!" | "lambda" | "defun")
}

fn first_inner(pair: Pair<Rule>) -> Result<Pair<Rule>, PestParseError> {
    let span = pair_to_source_span(&pair);
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| PestParseError::UnexpectedRule {
            expected: "expression".to_string(),
            found: format!("empty {:?}", rule),
            span: Some(span),
        })
}

fn build_atom(pair: Pair<Rule>) -> Result<Expression, PestParseError> {
    match pair.as_rule() {
        Rule::symbol => Ok(Expression::Symbol(Symbol::new(pair.as_str()))),
        Rule::integer => parse_integer(pair.as_str())
            .map(|n| Expression::Literal(Literal::Integer(n)))
            .ok_or_else(|| invalid_literal_error("malformed integer", &pair)),
        Rule::float => parse_decimal(pair.as_str())
            .map(|r| Expression::Literal(Literal::Float(r)))
            .map_err(|message| invalid_literal_error(message, &pair)),
        Rule::string => build_string(pair),
        Rule::boolean => Ok(Expression::Literal(Literal::Boolean(matches!(
            pair.as_str(),
            "#t" | "true" | "t"
        )))),
        Rule::nil => Ok(Expression::Literal(Literal::Nil)),
        other => Err(PestParseError::UnexpectedRule {
            expected: "expression".to_string(),
            found: format!("{:?}", other),
            span: Some(pair_to_source_span(&pair)),
        }),
    }
}

fn parse_integer(text: &str) -> Option<BigInt> {
    text.strip_prefix('+').unwrap_or(text).parse().ok()
}

/// Largest explicit exponent accepted in a decimal literal.
const MAX_DECIMAL_EXPONENT: u64 = 1024;

/// Parses a decimal literal exactly: `1.25e-3` becomes 125/100000.
fn parse_decimal(text: &str) -> Result<BigRational, &'static str> {
    const MALFORMED: &str = "malformed float";

    let (mantissa, exponent) = match text.find(|c: char| c == 'e' || c == 'E') {
        Some(index) => (
            &text[..index],
            text[index + 1..].parse::<i64>().map_err(|_| MALFORMED)?,
        ),
        None => (text, 0),
    };
    if exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT {
        return Err("float exponent out of range");
    }
    let (negative, mantissa) = match mantissa.as_bytes().first() {
        Some(b'-') => (true, &mantissa[1..]),
        Some(b'+') => (false, &mantissa[1..]),
        _ => (false, mantissa),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let digits: BigInt = format!("{}{}", whole, fraction)
        .parse()
        .map_err(|_| MALFORMED)?;
    let scale = exponent - fraction.len() as i64;
    let power = num_traits::pow(BigInt::from(10u32), scale.unsigned_abs() as usize);

    let value = if scale >= 0 {
        BigRational::from_integer(digits * power)
    } else {
        BigRational::new(digits, power)
    };
    Ok(if negative { -value } else { value })
}

fn build_string(pair: Pair<Rule>) -> Result<Expression, PestParseError> {
    let raw = pair
        .clone()
        .into_inner()
        .next()
        .map(|inner| inner.as_str())
        .unwrap_or("");

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            other => {
                return Err(PestParseError::InvalidEscapeSequence {
                    sequence: format!("\\{}", other.map(String::from).unwrap_or_default()),
                    span: Some(pair_to_source_span(&pair)),
                })
            }
        }
    }
    Ok(Expression::Literal(Literal::String(result)))
}
