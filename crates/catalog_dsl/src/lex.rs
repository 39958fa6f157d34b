//! Tokenizer for DSL source text.

use catalog_core::SyntaxError;

/// Token kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    /// Bare word: letters, digits, `_`, `-`, `.`
    Ident(String),
    /// `"..."` with escapes resolved
    Str(String),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `@`
    At,
    /// `,`
    Comma,
    /// End of input
    Eof,
}

impl Tok {
    /// How the token is shown in error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("'{s}'"),
            Self::Str(s) => format!("\"{s}\""),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::At => "'@'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// Token with its 1-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Kind and payload
    pub tok: Tok,
    /// Line
    pub line: usize,
    /// Column
    pub column: usize,
}

/// Byte-level lexer
pub struct Lexer<'a> {
    s: &'a [u8],
    i: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            s: source.as_bytes(),
            i: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.s.get(self.i).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if b & 0xC0 != 0x80 {
            // continuation bytes of a UTF-8 sequence do not advance the column
            self.col += 1;
        }
        Some(b)
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
                self.bump();
            }
            if self.peek() == Some(b'/') && self.s.get(self.i + 1) == Some(&b'/') {
                while let Some(b) = self.bump() {
                    if b == b'\n' {
                        break;
                    }
                }
                continue;
            }
            break;
        }
    }

    fn is_ident_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')
    }

    fn lex_ident(&mut self) -> String {
        let start = self.i;
        while matches!(self.peek(), Some(b) if Self::is_ident_byte(b)) {
            self.bump();
        }
        String::from_utf8_lossy(&self.s[start..self.i]).into_owned()
    }

    fn lex_str(&mut self, line: usize, column: usize) -> Result<String, SyntaxError> {
        self.bump();
        let mut out = Vec::new();
        loop {
            match self.bump() {
                None => return Err(SyntaxError::new(line, column, "unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(b'n') => out.push(b'\n'),
                    Some(b't') => out.push(b'\t'),
                    Some(b) => out.push(b),
                    None => return Err(SyntaxError::new(line, column, "unterminated string")),
                },
                Some(b) => out.push(b),
            }
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Next token
    ///
    /// # Errors
    ///
    /// Returns error on an unterminated string or a character outside the grammar
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_ws_and_comments();
        let (line, column) = (self.line, self.col);
        let tok = match self.peek() {
            None => Tok::Eof,
            Some(b'{') => {
                self.bump();
                Tok::LBrace
            }
            Some(b'}') => {
                self.bump();
                Tok::RBrace
            }
            Some(b'@') => {
                self.bump();
                Tok::At
            }
            Some(b',') => {
                self.bump();
                Tok::Comma
            }
            Some(b'"') => Tok::Str(self.lex_str(line, column)?),
            Some(b) if Self::is_ident_byte(b) => Tok::Ident(self.lex_ident()),
            Some(_) => {
                let rest = String::from_utf8_lossy(&self.s[self.i..]);
                let ch = rest.chars().next().unwrap_or('?');
                for _ in 0..ch.len_utf8() {
                    self.bump();
                }
                return Err(SyntaxError::new(line, column, format!("unexpected character '{ch}'")));
            }
        };
        Ok(Token { tok, line, column })
    }
}

/// Tokenize the whole source, collecting every lexical error
///
/// # Errors
///
/// Returns all lexical errors found
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<SyntaxError>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(token) => {
                let done = token.tok == Tok::Eof;
                tokens.push(token);
                if done {
                    break;
                }
            }
            Err(e) => {
                let fatal = e.message == "unterminated string";
                errors.push(e);
                if fatal {
                    break;
                }
            }
        }
    }
    if errors.is_empty() { Ok(tokens) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Tok> {
        tokenize(src).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn test_lex_reference_with_version() {
        assert_eq!(
            kinds("orders-topic@1.0.0"),
            vec![
                Tok::Ident("orders-topic".into()),
                Tok::At,
                Tok::Ident("1.0.0".into()),
                Tok::Eof
            ]
        );
    }

    #[test]
    fn test_lex_skips_comments() {
        let toks = kinds("// header\nevent A { // trailing\n}");
        assert_eq!(
            toks,
            vec![
                Tok::Ident("event".into()),
                Tok::Ident("A".into()),
                Tok::LBrace,
                Tok::RBrace,
                Tok::Eof
            ]
        );
    }

    #[test]
    fn test_lex_string_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\"\nbye""#),
            vec![Tok::Str("say \"hi\"\nbye".into()), Tok::Eof]
        );
    }

    #[test]
    fn test_lex_positions() {
        let tokens = tokenize("event A {\n  version 1.0.0\n}").unwrap();
        let version = &tokens[3];
        assert_eq!(version.tok, Tok::Ident("version".into()));
        assert_eq!((version.line, version.column), (2, 3));
    }

    #[test]
    fn test_lex_errors() {
        let errs = tokenize("event A { name \"open").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].message, "unterminated string");

        let errs = tokenize("event A ; B $").unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!((errs[0].line, errs[0].column), (1, 9));
    }
}
