//! Expression parser using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{BinOp, Expr, Statement};
use super::error::EvalFault;
use super::lexer::{lex, ExprToken};

/// Parse a single expression such as a curve's `.x` attribute
pub fn parse_expression(input: &str) -> Result<Expr, EvalFault> {
    let len = input.len();
    let token_stream = Stream::from_iter(tokenize(input)?)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(syntax_fault)
}

/// Parse a `;`-separated statement list such as a curve's `.scope` attribute
pub fn parse_statements(input: &str) -> Result<Vec<Statement>, EvalFault> {
    let len = input.len();
    let token_stream = Stream::from_iter(tokenize(input)?)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    statements_parser()
        .parse(token_stream)
        .into_result()
        .map_err(syntax_fault)
}

fn tokenize(input: &str) -> Result<Vec<(ExprToken, SimpleSpan)>, EvalFault> {
    let tokens = lex(input).map_err(|span| EvalFault::Syntax {
        message: format!("unexpected character `{}`", &input[span.clone()]),
        position: span.start,
    })?;
    Ok(tokens
        .into_iter()
        .map(|(tok, span)| (tok, span.into()))
        .collect())
}

fn syntax_fault(errs: Vec<Rich<'_, ExprToken>>) -> EvalFault {
    match errs.into_iter().next() {
        Some(err) => EvalFault::Syntax {
            message: err.to_string(),
            position: err.span().start,
        },
        None => EvalFault::Syntax {
            message: "invalid expression".to_string(),
            position: 0,
        },
    }
}

fn statements_parser<'a, I>() -> impl Parser<'a, I, Vec<Statement>, extra::Err<Rich<'a, ExprToken>>> + Clone
where
    I: ValueInput<'a, Token = ExprToken, Span = SimpleSpan>,
{
    let assignment = select! { ExprToken::Ident(name) => name }
        .then_ignore(just(ExprToken::Assign))
        .then(expr_parser())
        .map(|(name, value)| Statement::Assign(name, value));

    let statement = assignment.or(expr_parser().map(Statement::Expr));

    statement
        .separated_by(just(ExprToken::Semicolon))
        .allow_leading()
        .allow_trailing()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, ExprToken>>> + Clone
where
    I: ValueInput<'a, Token = ExprToken, Span = SimpleSpan>,
{
    recursive(|expr| {
        let number = select! { ExprToken::Number(n) => Expr::Number(n) };
        let ident = select! { ExprToken::Ident(name) => name };

        let call_args = expr
            .clone()
            .separated_by(just(ExprToken::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(ExprToken::ParenOpen), just(ExprToken::ParenClose));

        let name_or_call = ident.then(call_args.or_not()).map(|(name, args)| match args {
            Some(args) => Expr::Call { name, args },
            None => Expr::Name(name),
        });

        let parens = expr
            .clone()
            .delimited_by(just(ExprToken::ParenOpen), just(ExprToken::ParenClose));

        let atom = choice((number, name_or_call, parens));

        // `t[0][1]`
        let index = expr
            .clone()
            .delimited_by(just(ExprToken::BracketOpen), just(ExprToken::BracketClose));
        let postfix = atom.foldl(index.repeated(), |target, index| Expr::Index {
            target: Box::new(target),
            index: Box::new(index),
        });

        // `**` binds tighter than unary minus on its left and is right associative
        let unary = recursive(|unary| {
            let power = postfix
                .clone()
                .then(just(ExprToken::Pow).ignore_then(unary.clone()).or_not())
                .map(|(base, exponent)| match exponent {
                    Some(exponent) => Expr::binary(BinOp::Pow, base, exponent),
                    None => base,
                });

            choice((
                just(ExprToken::Minus)
                    .ignore_then(unary.clone())
                    .map(|e| Expr::Neg(Box::new(e))),
                just(ExprToken::Plus).ignore_then(unary),
                power,
            ))
        });

        let product_op = choice((
            just(ExprToken::Star).to(BinOp::Mul),
            just(ExprToken::Slash).to(BinOp::Div),
        ));
        let product = unary
            .clone()
            .foldl(product_op.then(unary).repeated(), |lhs, (op, rhs)| {
                Expr::binary(op, lhs, rhs)
            });

        let sum_op = choice((
            just(ExprToken::Plus).to(BinOp::Add),
            just(ExprToken::Minus).to(BinOp::Sub),
        ));
        product
            .clone()
            .foldl(sum_op.then(product).repeated(), |lhs, (op, rhs)| {
                Expr::binary(op, lhs, rhs)
            })
    })
}
