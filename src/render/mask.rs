//! Cloze masking around formatters.
//!
//! Before a block goes through the highlighter or the prose pass, each cloze
//! marker is swapped for sentinel tokens that no formatter treats as syntax:
//!
//! ```text
//! {{c2::content::hint}}  ->  <S>CLZS2<S>content<S>CLZH<S>hint<S>CLZE<S>
//! ```
//!
//! where `<S>` is U+E000 from the private use area. A highlighter may still
//! split a token with its own `<span>` boundaries. [`unmask`] reads each
//! token skipping any tags found between its characters, and re-emits those
//! tags right after the token so the markup stays balanced.

use std::fmt::Write as _;

use crate::cloze::parse_clozes;

const SENTINEL: char = '\u{E000}';
const TAG: &str = "CLZ";
const OPEN: char = 'S';
const HINT: char = 'H';
const CLOSE: char = 'E';

/// A piece of formatted HTML with cloze markers recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Markup outside any cloze
    Html(String),
    /// A cloze whose content and hint went through the formatter
    Cloze {
        number: u32,
        content: String,
        hint: Option<String>,
    },
}

/// Replace every cloze marker in `text` with sentinel tokens.
///
/// Text outside markers is copied unchanged.
pub fn mask(text: &str) -> String {
    let clozes = parse_clozes(text);
    if clozes.is_empty() {
        return text.to_string();
    }

    let mut masked = String::with_capacity(text.len() + clozes.len() * 24);
    let mut last = 0;
    for cloze in &clozes {
        masked.push_str(&text[last..cloze.start_index]);
        let _ = write!(masked, "{SENTINEL}{TAG}{OPEN}{}{SENTINEL}", cloze.cloze_number);
        masked.push_str(&cloze.content);
        if let Some(hint) = &cloze.hint {
            let _ = write!(masked, "{SENTINEL}{TAG}{HINT}{SENTINEL}");
            masked.push_str(hint);
        }
        let _ = write!(masked, "{SENTINEL}{TAG}{CLOSE}{SENTINEL}");
        last = cloze.end_index;
    }
    masked.push_str(&text[last..]);
    masked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Open(u32),
    Hint,
    Close,
}

/// Reads one token, tolerating tags between its characters.
struct TokenReader<'a> {
    html: &'a str,
    pos: usize,
    moved: String,
}

impl TokenReader<'_> {
    fn skip_tags(&mut self) {
        while self.html[self.pos..].starts_with('<') {
            let Some(len) = self.html[self.pos..].find('>') else {
                return;
            };
            self.moved.push_str(&self.html[self.pos..=self.pos + len]);
            self.pos += len + 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_tags();
        self.html[self.pos..].chars().next()
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        if self.peek()? == expected {
            self.pos += expected.len_utf8();
            Some(())
        } else {
            None
        }
    }

    fn number(&mut self) -> Option<u32> {
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.pos += 1;
        }
        digits.parse().ok()
    }

    fn token(&mut self) -> Option<Token> {
        TAG.chars().try_for_each(|c| self.expect(c))?;
        let token = match self.peek()? {
            OPEN => {
                self.pos += 1;
                Token::Open(self.number()?)
            }
            HINT => {
                self.pos += 1;
                Token::Hint
            }
            CLOSE => {
                self.pos += 1;
                Token::Close
            }
            _ => return None,
        };
        self.expect(SENTINEL)?;
        Some(token)
    }
}

/// Read the token starting at the sentinel at `start`.
///
/// Returns the token, the offset just past it, and the tags found inside it.
fn read_token(html: &str, start: usize) -> Option<(Token, usize, String)> {
    let mut reader = TokenReader {
        html,
        pos: start + SENTINEL.len_utf8(),
        moved: String::new(),
    };
    let token = reader.token()?;
    Some((token, reader.pos, reader.moved))
}

struct OpenCloze {
    number: u32,
    content: String,
    hint: Option<String>,
}

impl OpenCloze {
    fn buffer(&mut self) -> &mut String {
        self.hint.as_mut().unwrap_or(&mut self.content)
    }

    /// The cloze's formatted text, for when its markers turn out unusable.
    fn into_html(self) -> String {
        let mut html = self.content;
        html.push_str(self.hint.as_deref().unwrap_or_default());
        html
    }
}

#[derive(Default)]
struct Unmasker {
    pieces: Vec<Piece>,
    html: String,
    open: Option<OpenCloze>,
}

impl Unmasker {
    fn buffer(&mut self) -> &mut String {
        match &mut self.open {
            Some(cloze) => cloze.buffer(),
            None => &mut self.html,
        }
    }

    fn flush_html(&mut self) {
        if self.html.is_empty() {
            return;
        }
        let html = std::mem::take(&mut self.html);
        match self.pieces.last_mut() {
            Some(Piece::Html(last)) => last.push_str(&html),
            _ => self.pieces.push(Piece::Html(html)),
        }
    }

    fn abandon_open(&mut self) {
        if let Some(cloze) = self.open.take() {
            tracing::debug!(number = cloze.number, "dropping unterminated cloze marker");
            self.html.push_str(&cloze.into_html());
        }
    }

    fn apply(&mut self, token: Token) {
        match token {
            Token::Open(number) => {
                self.abandon_open();
                self.flush_html();
                self.open = Some(OpenCloze {
                    number,
                    content: String::new(),
                    hint: None,
                });
            }
            Token::Hint => match &mut self.open {
                Some(cloze) if cloze.hint.is_none() => cloze.hint = Some(String::new()),
                _ => tracing::debug!("dropping stray hint marker"),
            },
            Token::Close => match self.open.take() {
                Some(cloze) => self.pieces.push(Piece::Cloze {
                    number: cloze.number,
                    content: cloze.content,
                    hint: cloze.hint,
                }),
                None => tracing::debug!("dropping stray close marker"),
            },
        }
    }

    fn finish(mut self) -> Vec<Piece> {
        self.abandon_open();
        self.flush_html();
        self.pieces
    }
}

/// Recover clozes from formatted HTML produced from [`mask`]ed text.
///
/// Tags found inside a token are kept, placed right after it. Tokens that
/// do not pair up are dropped; the text around them is kept as HTML. A lone
/// sentinel that starts no token is kept as text.
pub fn unmask(html: &str) -> Vec<Piece> {
    let mut state = Unmasker::default();
    let mut last = 0;
    let mut search = 0;

    while let Some(offset) = html[search..].find(SENTINEL) {
        let start = search + offset;
        match read_token(html, start) {
            Some((token, end, moved)) => {
                state.buffer().push_str(&html[last..start]);
                state.apply(token);
                state.buffer().push_str(&moved);
                last = end;
                search = end;
            }
            None => search = start + SENTINEL.len_utf8(),
        }
    }
    state.buffer().push_str(&html[last..]);
    state.finish()
}
