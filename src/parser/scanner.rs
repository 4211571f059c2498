//! Scanner: turns lexemes into literal runs, invocations and parameter references

use crate::error::{line_of, snippet_at, Location, ScanError, Span};

use super::lexer::{lex, Lexeme};
use super::token::{Argument, Spanned, Token};

/// Scan text into tokens. `origin` labels the text in error messages.
pub fn scan(text: &str, origin: &str) -> Result<Vec<Spanned<Token>>, ScanError> {
    scan_from_line(text, origin, 1)
}

/// Scan text that starts at `first_line` of its file
pub fn scan_from_line(
    text: &str,
    origin: &str,
    first_line: usize,
) -> Result<Vec<Spanned<Token>>, ScanError> {
    let lexemes: Vec<(Lexeme, Span)> = lex(text).collect();
    let line_at = |offset: usize| first_line + line_of(text, offset) - 1;

    let mut tokens = Vec::new();
    let mut literal: Option<Span> = None;
    let mut i = 0;

    while i < lexemes.len() {
        let (lexeme, span) = lexemes[i].clone();
        match lexeme {
            Lexeme::Command | Lexeme::Template => {
                flush_literal(text, &mut literal, &mut tokens, &line_at);
                let name = text[span.start + 1..span.end].to_string();

                let (args, end, next) = match lexemes.get(i + 1) {
                    Some((Lexeme::Delimiter, open)) if open.start == span.end => {
                        let close = lexemes[i + 2..]
                            .iter()
                            .position(|(l, _)| *l == Lexeme::Delimiter)
                            .map(|p| i + 2 + p)
                            .ok_or_else(|| ScanError::UnterminatedArguments {
                                sigil: text[span.clone()].to_string(),
                                location: Location::new(origin, line_at(span.start)),
                                span: span.start..text.len(),
                                snippet: snippet_at(text, span.start),
                            })?;
                        let close_span = &lexemes[close].1;
                        let raw = text[open.end..close_span.start].to_string();
                        (Some(raw), close_span.end, close + 1)
                    }
                    _ => (None, span.end, i + 1),
                };

                let token = if lexeme == Lexeme::Command {
                    Token::Command { name, args }
                } else {
                    Token::Template {
                        name,
                        args: args.as_deref().map(split_arguments).unwrap_or_default(),
                    }
                };
                tokens.push(Spanned::new(token, span.start..end, line_at(span.start)));
                i = next;
            }
            Lexeme::Parameter => {
                flush_literal(text, &mut literal, &mut tokens, &line_at);
                let name = text[span.start + 2..span.end].to_string();
                tokens.push(Spanned::new(
                    Token::Parameter(name),
                    span.clone(),
                    line_at(span.start),
                ));
                i += 1;
            }
            Lexeme::Stray
                if matches!(&text[span.clone()], "@" | "#")
                    && matches!(lexemes.get(i + 1), Some((Lexeme::Delimiter, next)) if next.start == span.end) =>
            {
                return Err(ScanError::MissingName {
                    location: Location::new(origin, line_at(span.start)),
                    span: span.start..span.end + 2,
                    snippet: snippet_at(text, span.start),
                });
            }
            _ => {
                literal = Some(match literal.take() {
                    Some(open) => open.start..span.end,
                    None => span,
                });
                i += 1;
            }
        }
    }
    flush_literal(text, &mut literal, &mut tokens, &line_at);

    Ok(tokens)
}

fn flush_literal(
    text: &str,
    literal: &mut Option<Span>,
    tokens: &mut Vec<Spanned<Token>>,
    line_at: &impl Fn(usize) -> usize,
) {
    if let Some(span) = literal.take() {
        tokens.push(Spanned::new(
            Token::Literal(text[span.clone()].to_string()),
            span.clone(),
            line_at(span.start),
        ));
    }
}

/// Split raw argument text on unescaped `|`.
///
/// Entries of the form `key=value` become keyword arguments, anything else is
/// positional. Keys and values are trimmed; blank entries are skipped.
pub fn split_arguments(raw: &str) -> Vec<Argument> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => entries.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    entries.push(current);

    entries
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if is_identifier(key.trim()) => {
                Argument::keyword(key.trim(), value.trim())
            }
            _ => Argument::positional(entry.trim()),
        })
        .collect()
}

/// True for names made of letters, digits and underscores, not starting with a digit
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Replace `%%name` references whose name is bound, leaving the rest untouched
pub fn substitute_parameters(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    for (lexeme, span) in lex(text) {
        let slice = &text[span];
        match lexeme {
            Lexeme::Parameter => match lookup(&slice[2..]) {
                Some(value) => out.push_str(&value),
                None => out.push_str(slice),
            },
            _ => out.push_str(slice),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(text: &str) -> Vec<Token> {
        scan(text, "test")
            .expect("Should scan")
            .into_iter()
            .map(|t| t.node)
            .collect()
    }

    #[test]
    fn test_plain_text_is_one_literal() {
        assert_eq!(
            nodes("Just text, 50% done | ok"),
            vec![Token::Literal("Just text, 50% done | ok".to_string())]
        );
    }

    #[test]
    fn test_command_without_arguments() {
        assert_eq!(
            nodes("Value: @date\n"),
            vec![
                Token::Literal("Value: ".to_string()),
                Token::Command {
                    name: "date".to_string(),
                    args: None
                },
                Token::Literal("\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_command_with_arguments() {
        assert_eq!(
            nodes("@table_body||t1|precision=2||"),
            vec![Token::Command {
                name: "table_body".to_string(),
                args: Some("t1|precision=2".to_string())
            }]
        );
    }

    #[test]
    fn test_template_invocation_arguments() {
        assert_eq!(
            nodes("#greet||who=World||!"),
            vec![
                Token::Template {
                    name: "greet".to_string(),
                    args: vec![Argument::keyword("who", "World")]
                },
                Token::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiline_argument_value() {
        let tokens = nodes("#box||body=line one\nline two|title=T||");
        assert_eq!(
            tokens,
            vec![Token::Template {
                name: "box".to_string(),
                args: vec![
                    Argument::keyword("body", "line one\nline two"),
                    Argument::keyword("title", "T")
                ]
            }]
        );
    }

    #[test]
    fn test_parameter_reference() {
        assert_eq!(
            nodes("Hello, %%who!"),
            vec![
                Token::Literal("Hello, ".to_string()),
                Token::Parameter("who".to_string()),
                Token::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_unmatched_double_hash_is_literal() {
        assert_eq!(
            nodes("## not a block\n"),
            vec![Token::Literal("## not a block\n".to_string())]
        );
    }

    #[test]
    fn test_bare_delimiter_is_literal() {
        assert_eq!(
            nodes(r"\begin{tabular}{c||c}"),
            vec![Token::Literal(r"\begin{tabular}{c||c}".to_string())]
        );
    }

    #[test]
    fn test_unterminated_arguments() {
        let err = scan("line one\n#greet||who=World\n", "src.tex").unwrap_err();
        match err {
            ScanError::UnterminatedArguments {
                sigil, location, ..
            } => {
                assert_eq!(sigil, "#greet");
                assert_eq!(location, Location::new("src.tex", 2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_name() {
        let err = scan("x @||a||", "src.tex").unwrap_err();
        assert!(matches!(err, ScanError::MissingName { .. }));
    }

    #[test]
    fn test_tokens_cover_text_without_gaps() {
        let text = "a @date b #t||x=1|y|| c %%p d";
        let tokens = scan(text, "t").expect("Should scan");
        let mut pos = 0;
        for token in &tokens {
            assert_eq!(token.span.start, pos);
            pos = token.span.end;
        }
        assert_eq!(pos, text.len());
    }

    #[test]
    fn test_first_line_offset() {
        let tokens = scan_from_line("a\n@date", "tpl", 10).expect("Should scan");
        assert_eq!(tokens[1].line, 11);
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(
            split_arguments(" t1 | precision = 2 |"),
            vec![
                Argument::positional("t1"),
                Argument::keyword("precision", "2")
            ]
        );
        assert_eq!(
            split_arguments(r"a\|b"),
            vec![Argument::positional("a|b")]
        );
        assert_eq!(
            split_arguments(r"\frac{a}{b}=c"),
            vec![Argument::positional(r"\frac{a}{b}=c")]
        );
    }

    #[test]
    fn test_substitute_parameters() {
        let out = substitute_parameters("%%name|x=%%other", |p| {
            (p == "name").then(|| "t1".to_string())
        });
        assert_eq!(out, "t1|x=%%other");
    }
}
