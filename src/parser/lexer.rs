//! Sigil lexer for source and template text using logos

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    #[regex(r"@[\p{L}_][\p{L}\p{N}_]*")]
    Command,

    #[regex(r"#[\p{L}_][\p{L}\p{N}_]*")]
    Template,

    #[regex(r"%%[\p{L}_][\p{L}\p{N}_]*")]
    Parameter,

    // `##` never starts an invocation in scanned text
    #[token("##")]
    DoubleHash,

    #[token("||")]
    Delimiter,

    #[token("|")]
    Bar,

    #[token(r"\|")]
    EscapedBar,

    #[regex(r"[^@#%|\\]+")]
    Text,

    // A sigil character that does not start a name
    #[regex(r"[@#%\\]")]
    Stray,
}

/// Lex input string into lexemes with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Lexeme, Span)> + '_ {
    Lexeme::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Lexeme> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_sigils() {
        assert_eq!(
            kinds("@date #greet %%who"),
            vec![
                Lexeme::Command,
                Lexeme::Text,
                Lexeme::Template,
                Lexeme::Text,
                Lexeme::Parameter
            ]
        );
    }

    #[test]
    fn test_invocation_with_arguments() {
        assert_eq!(
            kinds("#greet||who=World|x||"),
            vec![
                Lexeme::Template,
                Lexeme::Delimiter,
                Lexeme::Text,
                Lexeme::Bar,
                Lexeme::Text,
                Lexeme::Delimiter
            ]
        );
    }

    #[test]
    fn test_double_hash_is_not_a_template() {
        assert_eq!(kinds("##greet"), vec![Lexeme::DoubleHash, Lexeme::Text]);
    }

    #[test]
    fn test_escaped_bar() {
        assert_eq!(
            kinds(r"a\||"),
            vec![Lexeme::Text, Lexeme::EscapedBar, Lexeme::Bar]
        );
    }

    #[test]
    fn test_stray_sigils() {
        assert_eq!(
            kinds("#1 50% a@ "),
            vec![
                Lexeme::Stray,
                Lexeme::Text,
                Lexeme::Stray,
                Lexeme::Text,
                Lexeme::Stray,
                Lexeme::Text
            ]
        );
    }

    #[test]
    fn test_unicode_names() {
        let tokens: Vec<_> = lex("@таблица_1").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, Lexeme::Command);
    }
}
