//! Recursive-descent parser producing a [`Program`].

use crate::ast::{
    ChannelAttachment, Definition, DomainDef, DomainItem, Field, FieldDef, FieldValue, MessageDef,
    MessageStmt, Program, Reference, ServiceDef, Statement, VisualizerDef,
};
use crate::lex::{Tok, Token, tokenize};
use catalog_core::{MessageType, SyntaxError};

/// Turns DSL source text into a syntax tree
///
/// The compiler only consumes [`Program`]; any grammar implementation can
/// sit behind this trait.
pub trait DslParser {
    /// Parse a whole document
    ///
    /// # Errors
    ///
    /// Returns every syntax error found; no partial program is produced
    fn parse(&self, source: &str) -> Result<Program, Vec<SyntaxError>>;
}

/// Hand-written parser for the `.ec` text format
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl TextParser {
    /// Create a parser
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DslParser for TextParser {
    fn parse(&self, source: &str) -> Result<Program, Vec<SyntaxError>> {
        let tokens = tokenize(source)?;
        Parser::new(tokens).program()
    }
}

const DEFINITION_KEYWORDS: [&str; 13] = [
    "domain",
    "subdomain",
    "service",
    "visualizer",
    "channel",
    "container",
    "event",
    "command",
    "query",
    "team",
    "user",
    "data-product",
    "diagram",
];

type PResult<T> = Result<T, SyntaxError>;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.tok) != Some(&Tok::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token {
                tok: Tok::Eof,
                line,
                column,
            });
        }
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_ident(&self) -> Option<&str> {
        match &self.peek().tok {
            Tok::Ident(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.tok != Tok::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(token.line, token.column, message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = self.peek().tok.describe();
        self.error_here(format!("unexpected {found}, expected {expected}"))
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if &self.peek().tok == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> PResult<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.unexpected(&tok.describe()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<String> {
        match self.peek().tok.clone() {
            Tok::Ident(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        if self.peek_ident() == Some(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{keyword}'")))
        }
    }

    fn program(mut self) -> Result<Program, Vec<SyntaxError>> {
        let mut program = Program::new();
        let mut errors = Vec::new();
        while self.peek().tok != Tok::Eof {
            match self.definition() {
                Ok(def) => program.definitions.push(def),
                Err(e) => {
                    errors.push(e);
                    self.recover();
                }
            }
        }
        if errors.is_empty() { Ok(program) } else { Err(errors) }
    }

    /// Skip to the next definition keyword outside any block
    fn recover(&mut self) {
        let mut depth = 0usize;
        self.advance();
        loop {
            match &self.peek().tok {
                Tok::Eof => return,
                Tok::LBrace => depth += 1,
                Tok::RBrace => depth = depth.saturating_sub(1),
                Tok::Ident(s) if depth == 0 && DEFINITION_KEYWORDS.contains(&s.as_str()) => return,
                _ => {}
            }
            self.advance();
        }
    }

    fn definition(&mut self) -> PResult<Definition> {
        let keyword = match self.peek_ident() {
            Some(k) => k.to_string(),
            None => return Err(self.unexpected("a definition")),
        };
        match keyword.as_str() {
            "domain" => {
                self.advance();
                Ok(Definition::Domain(self.domain_def()?))
            }
            "service" => {
                self.advance();
                Ok(Definition::Service(self.service_def()?))
            }
            "visualizer" => {
                self.advance();
                Ok(Definition::Visualizer(self.visualizer_def()?))
            }
            "channel" => {
                self.advance();
                Ok(Definition::Channel(self.field_def()?))
            }
            "container" => {
                self.advance();
                Ok(Definition::Container(self.field_def()?))
            }
            "team" => {
                self.advance();
                Ok(Definition::Team(self.field_def()?))
            }
            "user" => {
                self.advance();
                Ok(Definition::User(self.field_def()?))
            }
            "data-product" => {
                self.advance();
                Ok(Definition::DataProduct(self.field_def()?))
            }
            "diagram" => {
                self.advance();
                Ok(Definition::Diagram(self.field_def()?))
            }
            "subdomain" => Err(self.error_here("'subdomain' is only allowed inside a domain")),
            other => match MessageType::from_keyword(other) {
                Some(message_type) => {
                    self.advance();
                    Ok(Definition::Message(MessageDef {
                        message_type,
                        def: self.field_def()?,
                    }))
                }
                None => Err(self.unexpected("a definition")),
            },
        }
    }

    fn reference(&mut self, what: &str) -> PResult<Reference> {
        let id = self.expect_ident(what)?;
        let version = if self.eat(&Tok::At) {
            Some(self.expect_ident("a version after '@'")?)
        } else {
            None
        };
        Ok(Reference { id, version })
    }

    fn field(&mut self) -> PResult<Field> {
        let key = self.expect_ident("a field")?;
        let value = match self.peek().tok.clone() {
            Tok::Str(s) => FieldValue::Str(s),
            Tok::Ident(s) if s == "true" => FieldValue::Bool(true),
            Tok::Ident(s) if s == "false" => FieldValue::Bool(false),
            Tok::Ident(s) => FieldValue::Ident(s),
            _ => return Err(self.unexpected(&format!("a value for '{key}'"))),
        };
        self.advance();
        Ok(Field { key, value })
    }

    fn field_body(&mut self) -> PResult<Vec<Field>> {
        self.expect(&Tok::LBrace)?;
        let mut fields = Vec::new();
        while !self.eat(&Tok::RBrace) {
            fields.push(self.field()?);
        }
        Ok(fields)
    }

    fn field_def(&mut self) -> PResult<FieldDef> {
        let reference = self.reference("a name")?;
        let body = if self.peek().tok == Tok::LBrace {
            Some(self.field_body()?)
        } else {
            None
        };
        Ok(FieldDef { reference, body })
    }

    fn domain_def(&mut self) -> PResult<DomainDef> {
        let reference = self.reference("a domain name")?;
        if !self.eat(&Tok::LBrace) {
            return Ok(DomainDef {
                reference,
                body: None,
            });
        }
        let mut items = Vec::new();
        while !self.eat(&Tok::RBrace) {
            let item = match self.peek_ident() {
                Some("service") => {
                    self.advance();
                    DomainItem::Service(self.service_def()?)
                }
                Some("subdomain") => {
                    self.advance();
                    DomainItem::Subdomain(self.domain_def()?)
                }
                Some("sends") => DomainItem::Sends(self.message_stmt()?),
                Some("receives") => DomainItem::Receives(self.message_stmt()?),
                Some("channel") => {
                    self.advance();
                    DomainItem::Channel(self.field_def()?)
                }
                Some("container") => {
                    self.advance();
                    DomainItem::Container(self.field_def()?)
                }
                Some(_) => DomainItem::Field(self.field()?),
                None => return Err(self.unexpected("'}'")),
            };
            items.push(item);
        }
        Ok(DomainDef {
            reference,
            body: Some(items),
        })
    }

    fn service_def(&mut self) -> PResult<ServiceDef> {
        let reference = self.reference("a service name")?;
        if !self.eat(&Tok::LBrace) {
            return Ok(ServiceDef {
                reference,
                body: None,
            });
        }
        let mut statements = Vec::new();
        while !self.eat(&Tok::RBrace) {
            let stmt = match self.peek_ident() {
                Some("version") => {
                    self.advance();
                    match self.peek().tok.clone() {
                        Tok::Ident(v) | Tok::Str(v) => {
                            self.advance();
                            Statement::Version(v)
                        }
                        _ => return Err(self.unexpected("a version")),
                    }
                }
                Some("sends") => Statement::Sends(self.message_stmt()?),
                Some("receives") => Statement::Receives(self.message_stmt()?),
                Some("writes-to") => {
                    self.advance();
                    self.expect_keyword("container")?;
                    Statement::WritesTo(self.reference("a container name")?)
                }
                Some("reads-from") => {
                    self.advance();
                    self.expect_keyword("container")?;
                    Statement::ReadsFrom(self.reference("a container name")?)
                }
                Some(_) => Statement::Field(self.field()?),
                None => return Err(self.unexpected("'}'")),
            };
            statements.push(stmt);
        }
        Ok(ServiceDef {
            reference,
            body: Some(statements),
        })
    }

    /// `sends|receives <type> <ref> [{ fields }] [to|from <channels>]`
    fn message_stmt(&mut self) -> PResult<MessageStmt> {
        let direction = self.expect_ident("'sends' or 'receives'")?;
        let (preposition, wrong) = if direction == "sends" {
            ("to", "from")
        } else {
            ("from", "to")
        };
        let message_type = match self.peek_ident().and_then(MessageType::from_keyword) {
            Some(t) => {
                self.advance();
                t
            }
            None => return Err(self.unexpected("event, command or query")),
        };
        let reference = self.reference("a message name")?;

        let mut body = None;
        let mut channels = Vec::new();
        loop {
            if body.is_none() && self.peek().tok == Tok::LBrace {
                body = Some(self.field_body()?);
            } else if channels.is_empty() && self.peek_ident() == Some(preposition) {
                self.advance();
                channels = self.channel_list()?;
            } else if self.peek_ident() == Some(wrong) {
                return Err(self.error_here(format!(
                    "'{wrong}' is not valid on {direction}, use '{preposition}'"
                )));
            } else {
                break;
            }
        }

        Ok(MessageStmt {
            message_type,
            reference,
            body,
            channels,
        })
    }

    fn channel_list(&mut self) -> PResult<Vec<ChannelAttachment>> {
        let mut channels = Vec::new();
        loop {
            let reference = self.reference("a channel name")?;
            let delivery_mode = if self.peek_ident() == Some("delivery") {
                self.advance();
                Some(self.expect_ident("a delivery mode")?)
            } else {
                None
            };
            channels.push(ChannelAttachment {
                reference,
                delivery_mode,
            });
            if !self.eat(&Tok::Comma) {
                return Ok(channels);
            }
        }
    }

    fn visualizer_def(&mut self) -> PResult<VisualizerDef> {
        let name = self.expect_ident("a visualizer name")?;
        self.expect(&Tok::LBrace)?;
        let mut fields = Vec::new();
        let mut definitions = Vec::new();
        while !self.eat(&Tok::RBrace) {
            match self.peek_ident() {
                Some(k) if DEFINITION_KEYWORDS.contains(&k) => definitions.push(self.definition()?),
                Some(_) => fields.push(self.field()?),
                None => return Err(self.unexpected("'}'")),
            }
        }
        Ok(VisualizerDef {
            name,
            fields,
            definitions,
        })
    }
}
