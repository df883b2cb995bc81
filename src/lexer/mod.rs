use logos::Logos;

use crate::ast::Span;

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
pub enum Token {
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semi,

    // Literals. Out-of-range integers fail to lex.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
}

impl Token {
    /// Operator symbol as written in source, for infix tokens.
    pub fn operator(&self) -> Option<&'static str> {
        Some(match self {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessEq => "<=",
            Token::GreaterEq => ">=",
            Token::Eq => "==",
            Token::NotEq => "!=",
            _ => return None,
        })
    }
}

/// Lex source code into tokens with their byte spans. Stops at the first
/// unrecognised input.
pub fn lex(source: &str) -> Result<Vec<(Token, Span)>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, Span::from(span))),
            Err(()) => {
                let snippet = source[span.clone()].to_string();
                return Err(LexError {
                    position: span.start,
                    suggestion: suggest_fix(&snippet),
                    snippet,
                });
            }
        }
    }

    Ok(tokens)
}

fn suggest_fix(bad_token: &str) -> String {
    if bad_token == "=" {
        "Use '==' to compare values; there are no bindings to assign to".to_string()
    } else if bad_token == "!" {
        "Use '!=' for inequality; prefix '!' is not supported".to_string()
    } else if bad_token.chars().all(|c| c.is_ascii_digit()) {
        format!("Integer literal '{}' does not fit in 64 bits", bad_token)
    } else if bad_token.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
        "Only integers, 'true' and 'false' are values; names are not supported".to_string()
    } else {
        format!("Unexpected character(s): '{}'", bad_token)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Lex error at position {position}: '{snippet}'. {suggestion}")]
pub struct LexError {
    pub position: usize,
    pub snippet: String,
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn lex_arithmetic() {
        assert_eq!(
            kinds("1 + 22 * (3 - 4) / 5"),
            vec![
                Token::Int(1),
                Token::Plus,
                Token::Int(22),
                Token::Star,
                Token::LParen,
                Token::Int(3),
                Token::Minus,
                Token::Int(4),
                Token::RParen,
                Token::Slash,
                Token::Int(5),
            ]
        );
    }

    #[test]
    fn lex_comparisons_prefer_longest_match() {
        assert_eq!(
            kinds("< <= > >= == !="),
            vec![
                Token::Less,
                Token::LessEq,
                Token::Greater,
                Token::GreaterEq,
                Token::Eq,
                Token::NotEq,
            ]
        );
    }

    #[test]
    fn lex_booleans_and_separators() {
        assert_eq!(
            kinds("true;\nfalse;"),
            vec![Token::True, Token::Semi, Token::False, Token::Semi]
        );
    }

    #[test]
    fn lex_spans() {
        let tokens = lex("10 > 2").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 2));
        assert_eq!(tokens[1].1, Span::new(3, 4));
        assert_eq!(tokens[2].1, Span::new(5, 6));
    }

    #[test]
    fn lex_comment_ignored() {
        assert_eq!(kinds("// leading\n1 // trailing"), vec![Token::Int(1)]);
    }

    #[test]
    fn lex_single_equals_suggests_double() {
        let err = lex("1 = 1").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.snippet, "=");
        assert!(err.suggestion.contains("=="));
    }

    #[test]
    fn lex_integer_overflow_is_error() {
        let err = lex("99999999999999999999").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.suggestion.contains("64 bits"));
    }

    #[test]
    fn lex_identifier_rejected() {
        let err = lex("x + 1").unwrap_err();
        assert_eq!(err.snippet, "x");
    }

    #[test]
    fn operator_symbols() {
        assert_eq!(Token::LessEq.operator(), Some("<="));
        assert_eq!(Token::Semi.operator(), None);
    }
}
