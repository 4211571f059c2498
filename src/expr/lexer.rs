//! Token lexer for curve expressions using logos

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum ExprToken {
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("**")]
    Pow,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    #[token("=")]
    Assign,

    #[token(";")]
    Semicolon,
}

impl std::fmt::Display for ExprToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprToken::Number(n) => write!(f, "{}", n),
            ExprToken::Ident(s) => write!(f, "{}", s),
            ExprToken::Pow => write!(f, "**"),
            ExprToken::Plus => write!(f, "+"),
            ExprToken::Minus => write!(f, "-"),
            ExprToken::Star => write!(f, "*"),
            ExprToken::Slash => write!(f, "/"),
            ExprToken::ParenOpen => write!(f, "("),
            ExprToken::ParenClose => write!(f, ")"),
            ExprToken::BracketOpen => write!(f, "["),
            ExprToken::BracketClose => write!(f, "]"),
            ExprToken::Comma => write!(f, ","),
            ExprToken::Assign => write!(f, "="),
            ExprToken::Semicolon => write!(f, ";"),
        }
    }
}

/// Lex an expression, failing on the first character no token accepts
pub fn lex(input: &str) -> Result<Vec<(ExprToken, Span)>, Span> {
    ExprToken::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(t) => Ok((t, span)),
            Err(()) => Err(span),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<ExprToken> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("1 2.5 .5 1e3 2.5e-1"),
            vec![
                ExprToken::Number(1.0),
                ExprToken::Number(2.5),
                ExprToken::Number(0.5),
                ExprToken::Number(1000.0),
                ExprToken::Number(0.25),
            ]
        );
    }

    #[test]
    fn test_power_is_one_token() {
        assert_eq!(
            tokens("a**2*b"),
            vec![
                ExprToken::Ident("a".to_string()),
                ExprToken::Pow,
                ExprToken::Number(2.0),
                ExprToken::Star,
                ExprToken::Ident("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(
            tokens("mérés_1[0]"),
            vec![
                ExprToken::Ident("mérés_1".to_string()),
                ExprToken::BracketOpen,
                ExprToken::Number(0.0),
                ExprToken::BracketClose,
            ]
        );
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(lex("a $ b"), Err(2..3));
    }
}
