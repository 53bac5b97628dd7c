//! HTML Table Extraction
//!
//! The GS1920 web UI renders every status page as nested HTML tables. This
//! module flattens such a page into rows of trimmed text cells.
//!
//! # Pipeline
//!
//! 1. [`Tokens`] feeds the markup to the html5ever tokenizer a chunk at a time
//!    and yields start tags, end tags and text runs as [`Token`]s. No tree is
//!    built, so stray rows and text outside a `<table>` stay where the page
//!    put them.
//! 2. [`Rows`] is a small state machine pulling one token at a time. It flushes
//!    the row in progress on every `<tr>` and once more at the end of the
//!    stream.
//!
//! Two cell rules exist because the vendor markup is not uniform:
//!
//! - [`CellMode::Cell`]: only text that directly follows a `<td>` is a cell.
//!   The token after a `<td>` is consumed either way, and `</html>` ends the
//!   page.
//! - [`CellMode::Nested`]: any text whose most recent start tag was `<td>` or
//!   `<div>` is a cell, which picks up content wrapped in an extra `<div>`.
//!   Whitespace between cells counts as well. Reads to the end of input.
//!
//! No validation happens here. Broken nesting yields short or empty rows and
//! the collectors drop them by column count.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    self as html, BufferQueue, TagKind, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::collections::VecDeque;

pub type Row = Vec<String>;
pub type Table = Vec<Row>;

/// Bytes of markup handed to the tokenizer per step
const CHUNK_SIZE: usize = 4096;

/// Which text tokens count as table cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    /// Text immediately following a `<td>` start tag
    Cell,
    /// Text anywhere after a `<td>` or `<div>` start tag
    Nested,
}

/// A single markup token in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(String),
    End(String),
    Text(String),
    /// Comments, doctypes and self-closing tags
    Other,
}

/// Collects tokenizer output, merging adjacent character runs into one text
#[derive(Default)]
struct TokenQueue {
    tokens: VecDeque<Token>,
    text: String,
}

impl TokenQueue {
    fn push(&mut self, token: Token) {
        self.flush_text();
        self.tokens.push_back(token);
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens
                .push_back(Token::Text(std::mem::take(&mut self.text)));
        }
    }
}

/// Content model the tokenizer must switch to after a start tag
fn raw_content(tag: &str) -> Option<TokenSinkResult<()>> {
    match tag {
        "script" => Some(TokenSinkResult::RawData(RawKind::ScriptData)),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            Some(TokenSinkResult::RawData(RawKind::Rawtext))
        }
        "textarea" | "title" => Some(TokenSinkResult::RawData(RawKind::Rcdata)),
        "plaintext" => Some(TokenSinkResult::Plaintext),
        _ => None,
    }
}

impl TokenSink for TokenQueue {
    type Handle = ();

    fn process_token(&mut self, token: html::Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            html::Token::CharacterTokens(text) => self.text.push_str(&text),
            html::Token::NullCharacterToken => self.text.push('\u{FFFD}'),
            html::Token::TagToken(tag) if tag.self_closing => self.push(Token::Other),
            html::Token::TagToken(tag) => {
                let name = tag.name.to_string();
                match tag.kind {
                    TagKind::StartTag => {
                        let next = raw_content(&name);
                        self.push(Token::Start(name));
                        if let Some(next) = next {
                            return next;
                        }
                    }
                    TagKind::EndTag => self.push(Token::End(name)),
                }
            }
            html::Token::CommentToken(_) | html::Token::DoctypeToken(_) => {
                self.push(Token::Other)
            }
            html::Token::EOFToken => self.flush_text(),
            html::Token::ParseError(_) => {}
        }
        TokenSinkResult::Continue
    }

    fn end(&mut self) {
        self.flush_text();
    }
}

/// Lazy token stream over page markup
pub struct Tokens<'a> {
    tokenizer: Tokenizer<TokenQueue>,
    input: BufferQueue,
    rest: &'a str,
    ended: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            tokenizer: Tokenizer::new(TokenQueue::default(), TokenizerOpts::default()),
            input: BufferQueue::new(),
            rest: source,
            ended: false,
        }
    }

    fn next_chunk(&mut self) -> Option<&'a str> {
        let rest: &'a str = self.rest;
        if rest.is_empty() {
            return None;
        }

        let mut end = rest.len().min(CHUNK_SIZE);
        while !rest.is_char_boundary(end) {
            end += 1;
        }

        let (chunk, remaining) = rest.split_at(end);
        self.rest = remaining;
        Some(chunk)
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.tokenizer.sink.tokens.pop_front() {
                return Some(token);
            }
            if self.ended {
                return None;
            }

            match self.next_chunk() {
                Some(chunk) => {
                    self.input.push_back(StrTendril::from_slice(chunk));
                    let _ = self.tokenizer.feed(&mut self.input);
                }
                None => {
                    self.tokenizer.end();
                    self.ended = true;
                }
            }
        }
    }
}

/// Extract every row of a page. Invalid UTF-8 is replaced, never rejected.
pub fn extract(markup: &[u8], mode: CellMode) -> Table {
    let source = String::from_utf8_lossy(markup);
    Rows::new(Tokens::new(&source), mode).collect()
}

/// Lazy row iterator over a token stream
pub struct Rows<I> {
    tokens: I,
    mode: CellMode,
    row: Row,
    last_start: String,
    after_cell_start: bool,
    finished: bool,
}

impl<I> Rows<I>
where
    I: Iterator<Item = Token>,
{
    pub fn new<T>(tokens: T, mode: CellMode) -> Self
    where
        T: IntoIterator<Item = Token, IntoIter = I>,
    {
        Self {
            tokens: tokens.into_iter(),
            mode,
            row: Vec::new(),
            last_start: String::new(),
            after_cell_start: false,
            finished: false,
        }
    }

    fn flush(&mut self) -> Option<Row> {
        if self.row.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.row))
        }
    }

    /// Advance the state machine by one token, returning a row if one completed
    fn advance(&mut self, token: Token) -> Option<Row> {
        let after_cell_start = std::mem::replace(&mut self.after_cell_start, false);

        match token {
            // Under the plain rule a tag right after `<td>` fills the cell slot
            Token::Start(_) if self.mode == CellMode::Cell && after_cell_start => None,
            Token::Start(tag) => {
                let completed = if tag == "tr" { self.flush() } else { None };
                self.after_cell_start = tag == "td";
                self.last_start = tag;
                completed
            }
            Token::End(tag) => {
                if self.mode == CellMode::Cell && tag == "html" {
                    self.finished = true;
                }
                None
            }
            Token::Text(text) => {
                let is_cell = match self.mode {
                    CellMode::Cell => after_cell_start,
                    CellMode::Nested => matches!(self.last_start.as_str(), "td" | "div"),
                };
                if is_cell {
                    self.row.push(text.trim().to_string());
                }
                None
            }
            Token::Other => None,
        }
    }
}

impl<I> Iterator for Rows<I>
where
    I: Iterator<Item = Token>,
{
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        while !self.finished {
            match self.tokens.next() {
                Some(token) => {
                    if let Some(row) = self.advance(token) {
                        return Some(row);
                    }
                }
                None => self.finished = true,
            }
        }
        self.flush()
    }
}
