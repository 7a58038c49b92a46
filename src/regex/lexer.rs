use std::iter::Peekable;
use std::str::CharIndices;

use crate::errors::LexError;
use crate::regex::tokens::{Token, TokenKind};

/// Lexical analysis on a pattern string to a list of query-regex tokens.
///
/// Atoms are maximal runs of non-operator characters, so a multi-character
/// run between separators is a single symbol. Whitespace separates atoms
/// without producing a token; `.` is the explicit concatenation separator.
/// `\` escapes the following character into the current atom. The unescaped
/// words `epsilon` and `$` denote the empty word.
///
/// # Errors
///
/// Returns a [`LexError`] for a dangling escape at the end of the input.
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut iter = input.char_indices().peekable();

    while let Some(&(idx, ch)) = iter.peek() {
        let column = idx + 1;
        match ch {
            c if c.is_whitespace() => {
                iter.next();
            }
            '|' | '+' => {
                iter.next();
                tokens.push(Token::new(TokenKind::Or, column));
            }
            '*' => {
                iter.next();
                tokens.push(Token::new(TokenKind::Star, column));
            }
            '.' => {
                iter.next();
                tokens.push(Token::new(TokenKind::Dot, column));
            }
            '(' => {
                iter.next();
                tokens.push(Token::new(TokenKind::LParen, column));
            }
            ')' => {
                iter.next();
                tokens.push(Token::new(TokenKind::RParen, column));
            }
            _ => tokens.push(lex_atom(column, &mut iter)?),
        }
    }

    tokens.push(Token::new(TokenKind::Eos, input.len() + 1));
    Ok(tokens)
}

/// Scans one atom starting at `column`, honoring `\` escapes.
fn lex_atom(column: usize, iter: &mut Peekable<CharIndices<'_>>) -> Result<Token, LexError> {
    let mut text = String::new();
    let mut escaped = false;

    while let Some(&(_, ch)) = iter.peek() {
        match ch {
            '\\' => {
                iter.next();
                let (_, literal) = iter
                    .next()
                    .ok_or_else(|| LexError::new(column, "dangling escape"))?;
                text.push(literal);
                escaped = true;
            }
            c if c.is_whitespace() => break,
            '|' | '+' | '*' | '.' | '(' | ')' => break,
            c => {
                iter.next();
                text.push(c);
            }
        }
    }

    let kind = if !escaped && (text == "$" || text == "epsilon") {
        TokenKind::Epsilon
    } else {
        TokenKind::Atom(text)
    };
    Ok(Token::new(kind, column))
}
