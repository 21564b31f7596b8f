use super::errors::{invalid_input_error, pair_to_source_span, PestParseError};
use super::expressions::{build_datum, build_expression};
use super::Rule;
use crate::ast::{DefineExpr, DefunExpr, Expression, IfExpr, LambdaExpr, SetExpr, Symbol};
use pest::iterators::Pair;

/// Builds the node for a list headed by a special-form keyword. `args` are
/// the list children after the keyword; `list` is the whole form, used for
/// error spans.
pub(super) fn build_special_form(
    form: &str,
    args: Vec<Pair<Rule>>,
    list: &Pair<Rule>,
) -> Result<Expression, PestParseError> {
    match form {
        "quote" => {
            let [datum] = exact::<1>(form, args, list)?;
            Ok(Expression::Quote(Box::new(build_datum(datum)?)))
        }
        "if" => {
            let [condition, then_branch, else_branch] = exact::<3>(form, args, list)?;
            Ok(Expression::If(IfExpr {
                condition: Box::new(build_expression(condition)?),
                then_branch: Box::new(build_expression(then_branch)?),
                else_branch: Box::new(build_expression(else_branch)?),
            }))
        }
        "define" => {
            let [name, value] = exact::<2>(form, args, list)?;
            Ok(Expression::Define(DefineExpr {
                symbol: build_symbol(name)?,
                value: Box::new(build_expression(value)?),
            }))
        }
        "set!" => {
            let [name, value] = exact::<2>(form, args, list)?;
            Ok(Expression::Set(SetExpr {
                symbol: build_symbol(name)?,
                value: Box::new(build_expression(value)?),
            }))
        }
        "lambda" => {
            let mut args = at_least(form, 2, args, list)?.into_iter();
            let params = build_params(args.next(), list)?;
            Ok(Expression::Lambda(LambdaExpr {
                params,
                body: Box::new(build_body(args.collect())?),
            }))
        }
        "defun" => {
            let mut args = at_least(form, 3, args, list)?.into_iter();
            let name = match args.next() {
                Some(name) => build_symbol(name)?,
                None => return Err(invalid_input_error("defun requires a name", list)),
            };
            let params = build_params(args.next(), list)?;
            Ok(Expression::Defun(DefunExpr {
                name,
                params,
                body: Box::new(build_body(args.collect())?),
            }))
        }
        other => Err(invalid_input_error(
            &format!("unknown special form {}", other),
            list,
        )),
    }
}

fn arity_error(form: &str, expected: String, actual: usize, list: &Pair<Rule>) -> PestParseError {
    PestParseError::SpecialFormArity {
        form: form.to_string(),
        expected,
        actual,
        span: Some(pair_to_source_span(list)),
    }
}

fn exact<'i, const N: usize>(
    form: &str,
    args: Vec<Pair<'i, Rule>>,
    list: &Pair<Rule>,
) -> Result<[Pair<'i, Rule>; N], PestParseError> {
    let actual = args.len();
    args.try_into()
        .map_err(|_| arity_error(form, N.to_string(), actual, list))
}

fn at_least<'i>(
    form: &str,
    min: usize,
    args: Vec<Pair<'i, Rule>>,
    list: &Pair<Rule>,
) -> Result<Vec<Pair<'i, Rule>>, PestParseError> {
    if args.len() < min {
        return Err(arity_error(
            form,
            format!("at least {}", min),
            args.len(),
            list,
        ));
    }
    Ok(args)
}

fn build_symbol(pair: Pair<Rule>) -> Result<Symbol, PestParseError> {
    match pair.as_rule() {
        Rule::symbol => Ok(Symbol::new(pair.as_str())),
        _ => Err(PestParseError::UnexpectedRule {
            expected: "symbol".to_string(),
            found: pair.as_str().to_string(),
            span: Some(pair_to_source_span(&pair)),
        }),
    }
}

/// Parameter list: a list of distinct symbols (`nil` reads as no parameters).
fn build_params(pair: Option<Pair<Rule>>, list: &Pair<Rule>) -> Result<Vec<Symbol>, PestParseError> {
    let pair = pair.ok_or_else(|| invalid_input_error("missing parameter list", list))?;
    match pair.as_rule() {
        Rule::nil => return Ok(vec![]),
        Rule::list => {}
        _ => {
            return Err(PestParseError::UnexpectedRule {
                expected: "parameter list".to_string(),
                found: pair.as_str().to_string(),
                span: Some(pair_to_source_span(&pair)),
            })
        }
    }

    let mut params: Vec<Symbol> = Vec::new();
    for param in pair.into_inner() {
        let span_pair = param.clone();
        let symbol = build_symbol(param)?;
        if params.contains(&symbol) {
            return Err(invalid_input_error(
                &format!("duplicate parameter {}", symbol),
                &span_pair,
            ));
        }
        params.push(symbol);
    }
    Ok(params)
}

/// A body with several forms evaluates them in order.
fn build_body(forms: Vec<Pair<Rule>>) -> Result<Expression, PestParseError> {
    let mut body = forms
        .into_iter()
        .map(build_expression)
        .collect::<Result<Vec<_>, _>>()?;
    if body.len() == 1 {
        if let Some(only) = body.pop() {
            return Ok(only);
        }
    }
    Ok(Expression::Sequence(body))
}
