use crate::automaton::Symbol;
use crate::errors::{ParseError, ParseErrorKind};
use crate::regex::ast::Ast;
use crate::regex::tokens::{Token, TokenKind};

/// Converts a token stream into an [`Ast`] with a recursive-descent parser.
///
/// A stream holding only the end-of-stream marker denotes the empty
/// language.
pub fn parse(tokens: &[Token]) -> Result<Ast, ParseError> {
    let mut parser = Parser::new(tokens);
    if parser.peek_kind() == Some(&TokenKind::Eos) {
        return Ok(Ast::Empty);
    }
    let ast = parser.parse_regex()?;
    parser.expect_eos()?;
    Ok(ast)
}

/// Stateful parser over a token slice.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a full regular expression, covering alternation and concatenation.
    fn parse_regex(&mut self) -> Result<Ast, ParseError> {
        self.parse_alt()
    }

    /// Parses an alternation (`lhs | rhs`, also written `lhs + rhs`).
    fn parse_alt(&mut self) -> Result<Ast, ParseError> {
        let mut node = self.parse_concat()?;
        while self.matches(&TokenKind::Or) {
            let rhs = self.parse_concat()?;
            node = Ast::alt(node, rhs);
        }
        Ok(node)
    }

    /// Parses concatenation: atoms joined by `.` or plain adjacency.
    fn parse_concat(&mut self) -> Result<Ast, ParseError> {
        let mut nodes = Vec::new();
        loop {
            if self.matches(&TokenKind::Dot) {
                continue;
            }
            if self.can_start_atom() {
                nodes.push(self.parse_repeat()?);
            } else {
                break;
            }
        }
        match nodes.len() {
            0 => {
                if self.peek_kind() == Some(&TokenKind::Star) {
                    Err(self.error_here(ParseErrorKind::MisplacedPostfix))
                } else {
                    Err(self.error_here(ParseErrorKind::EmptyAlternative))
                }
            }
            1 => Ok(nodes.remove(0)),
            _ => Ok(chain_concat(nodes)),
        }
    }

    /// Parses the unary postfix star.
    fn parse_repeat(&mut self) -> Result<Ast, ParseError> {
        let mut node = self.parse_atom()?;
        while self.matches(&TokenKind::Star) {
            node = Ast::star(node);
        }
        Ok(node)
    }

    /// Determines whether the current token may begin an atom.
    fn can_start_atom(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Atom(_) | TokenKind::Epsilon | TokenKind::LParen)
        )
    }

    /// Parses a single atom (literal, epsilon, or grouped sub-expression).
    fn parse_atom(&mut self) -> Result<Ast, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Atom(text)) => {
                let symbol = Symbol::new(text.clone());
                self.advance();
                Ok(Ast::Atom(symbol))
            }
            Some(TokenKind::Epsilon) => {
                self.advance();
                Ok(Ast::Epsilon)
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let node = self.parse_regex()?;
                self.expect_rparen()?;
                Ok(node)
            }
            Some(TokenKind::Eos) | None => Err(self.error_here(ParseErrorKind::UnexpectedEos)),
            Some(other) => Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: other.to_string(),
            })),
        }
    }

    /// Consumes the next token if it matches the provided kind.
    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ParseError> {
        if self.matches(&TokenKind::RParen) {
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::MissingRParen))
        }
    }

    fn expect_eos(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Eos) => Ok(()),
            Some(other) => Err(self.error_here(ParseErrorKind::UnexpectedToken {
                found: other.to_string(),
            })),
            None => Ok(()),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|tok| &tok.kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        let column = self
            .peek()
            .map(|t| t.pos)
            .unwrap_or_else(|| self.last_column());
        ParseError::new(column, kind)
    }

    fn last_column(&self) -> usize {
        self.tokens.last().map(|tok| tok.pos).unwrap_or_default()
    }
}

fn chain_concat(nodes: Vec<Ast>) -> Ast {
    let mut it = nodes.into_iter();
    let mut acc = it.next().expect("chain_concat requires a non-empty vector");
    for node in it {
        acc = Ast::concat(acc, node);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Ast {
        Ast::Atom(Symbol::new(s))
    }

    #[test]
    fn test_empty_pattern_is_empty_language() {
        assert_eq!(Ast::build("").unwrap(), Ast::Empty);
        assert_eq!(Ast::build("   ").unwrap(), Ast::Empty);
    }

    #[test]
    fn test_alternation() {
        assert_eq!(Ast::build("a|b").unwrap(), Ast::alt(atom("a"), atom("b")));
        assert_eq!(Ast::build("a+b").unwrap(), Ast::alt(atom("a"), atom("b")));
    }

    #[test]
    fn test_concatenation_forms() {
        let expected = Ast::concat(atom("a"), atom("b"));
        assert_eq!(Ast::build("a.b").unwrap(), expected);
        assert_eq!(Ast::build("a b").unwrap(), expected);
        assert_eq!(Ast::build("(a)(b)").unwrap(), expected);
    }

    #[test]
    fn test_multi_character_atom_is_one_symbol() {
        assert_eq!(Ast::build("ab").unwrap(), atom("ab"));
    }

    #[test]
    fn test_star_binds_to_group() {
        assert_eq!(
            Ast::build("(a|b)*").unwrap(),
            Ast::star(Ast::alt(atom("a"), atom("b"))),
        );
    }

    #[test]
    fn test_epsilon_atom() {
        assert_eq!(
            Ast::build("$|a").unwrap(),
            Ast::alt(Ast::Epsilon, atom("a")),
        );
    }

    #[test]
    fn test_scenario_pattern() {
        assert_eq!(
            Ast::build("a.(a|b)*").unwrap(),
            Ast::concat(atom("a"), Ast::star(Ast::alt(atom("a"), atom("b")))),
        );
    }

    #[test]
    fn test_trailing_alternative_is_rejected() {
        assert!(Ast::build("a|").is_err());
    }

    #[test]
    fn test_leading_star_is_rejected() {
        assert!(Ast::build("*a").is_err());
    }

    #[test]
    fn test_unbalanced_group_is_rejected() {
        assert!(Ast::build("(a|b").is_err());
        assert!(Ast::build("a)b").is_err());
    }
}
