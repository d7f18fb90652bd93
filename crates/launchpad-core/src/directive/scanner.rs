//! Incremental scanner for the live preview of a streaming directive.
//!
//! The scanner is fed the same fragments the reader appends to the running
//! text. It stays quiet until the fence-open marker shows up, then walks the
//! partial JSON body one character at a time, tracking just enough structure
//! (container nesting, key vs value position, escape state) to find the
//! `code` value and decode it while it is still being written.
//!
//! The scanner is a pure function of the accumulated text: any fragmentation
//! of the same text ends in the same state.

use std::borrow::Cow;

use launchpad_types::directive::{FENCE_OPEN, PartialCode};

const CODE_KEY: &str = "code";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Phase {
    /// Conversational text; looking for the fence-open marker.
    #[default]
    Seeking,
    /// Inside the directive body.
    Body,
    /// The code value (or the whole block) has ended.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object { expect_key: bool },
    Array,
}

/// What the string currently being read means to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringRole {
    /// A key of the directive object.
    Key,
    /// The single-document `code` value.
    Markup,
    /// A path inside the `code` file map.
    FilePath,
    /// A file body inside the `code` file map.
    FileBody,
    /// Anything else; decoded nowhere.
    Ignored,
}

impl StringRole {
    fn is_code(self) -> bool {
        matches!(self, StringRole::Markup | StringRole::FileBody)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Escape {
    #[default]
    None,
    /// A backslash was read; the next character picks the escape.
    Pending,
    /// Collecting the hex digits of a `\uXXXX` escape.
    Unicode(String),
}

/// Incremental extractor of the directive's `code` value.
#[derive(Debug, Default)]
pub struct DirectiveScanner {
    phase: Phase,
    /// Tail of conversational text kept so a marker split across fragments
    /// is still found.
    pending: String,
    stack: Vec<Container>,
    string: Option<StringRole>,
    escape: Escape,
    high_surrogate: Option<u32>,
    buf: String,
    last_key: Option<String>,
    /// Nesting depth of the `code` file map, once it has opened.
    files_depth: Option<usize>,
    path: Option<String>,
    snapshot: Option<PartialCode>,
    changed: bool,
}

impl DirectiveScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment. Returns a new snapshot when extraction progressed.
    pub fn push(&mut self, fragment: &str) -> Option<PartialCode> {
        if fragment.is_empty() {
            return None;
        }

        let body: Cow<'_, str> = match self.phase {
            Phase::Done => return None,
            Phase::Body => Cow::Borrowed(fragment),
            Phase::Seeking => {
                self.pending.push_str(fragment);
                match self.pending.find(FENCE_OPEN) {
                    Some(at) => {
                        let rest = self.pending[at + FENCE_OPEN.len()..].to_string();
                        self.pending.clear();
                        self.phase = Phase::Body;
                        tracing::debug!("directive block opened");
                        Cow::Owned(rest)
                    }
                    None => {
                        self.trim_pending();
                        return None;
                    }
                }
            }
        };

        for c in body.chars() {
            if self.phase != Phase::Body {
                break;
            }
            self.step(c);
        }

        self.take_update()
    }

    /// The latest snapshot, if extraction has produced one.
    pub fn snapshot(&self) -> Option<&PartialCode> {
        self.snapshot.as_ref()
    }

    /// Whether the fence-open marker has been seen.
    #[cfg(test)]
    fn in_directive(&self) -> bool {
        self.phase != Phase::Seeking
    }

    fn trim_pending(&mut self) {
        let keep = FENCE_OPEN.len() - 1;
        if self.pending.len() <= keep {
            return;
        }
        let mut cut = self.pending.len() - keep;
        while !self.pending.is_char_boundary(cut) {
            cut += 1;
        }
        self.pending.drain(..cut);
    }

    fn step(&mut self, c: char) {
        if let Some(role) = self.string {
            self.step_in_string(role, c);
            return;
        }

        match c {
            '{' => {
                let opens_files = self.value_is_code();
                self.stack.push(Container::Object { expect_key: true });
                if opens_files {
                    self.files_depth = Some(self.stack.len());
                }
            }
            '[' => self.stack.push(Container::Array),
            '}' | ']' => {
                self.stack.pop();
                let files_closed = self.files_depth.is_some_and(|d| self.stack.len() < d);
                if files_closed || self.stack.is_empty() {
                    self.phase = Phase::Done;
                }
            }
            ':' => self.set_expect_key(false),
            ',' => self.set_expect_key(true),
            '"' => self.open_string(),
            // A backtick outside any string can only be the closing fence.
            '`' => self.phase = Phase::Done,
            _ => {}
        }
    }

    fn set_expect_key(&mut self, expect: bool) {
        if let Some(Container::Object { expect_key }) = self.stack.last_mut() {
            *expect_key = expect;
        }
    }

    /// True when the next value is the directive's `code` value.
    fn value_is_code(&self) -> bool {
        self.stack.len() == 1
            && matches!(
                self.stack.last(),
                Some(Container::Object { expect_key: false })
            )
            && self.last_key.as_deref() == Some(CODE_KEY)
    }

    fn open_string(&mut self) {
        let depth = self.stack.len();
        let expect_key = matches!(
            self.stack.last(),
            Some(Container::Object { expect_key: true })
        );

        let role = if depth == 1 && expect_key {
            StringRole::Key
        } else if self.value_is_code() {
            StringRole::Markup
        } else if self.files_depth == Some(depth) {
            if expect_key {
                StringRole::FilePath
            } else {
                StringRole::FileBody
            }
        } else {
            StringRole::Ignored
        };

        self.buf.clear();
        self.escape = Escape::None;
        self.high_surrogate = None;
        self.string = Some(role);
    }

    fn step_in_string(&mut self, role: StringRole, c: char) {
        match std::mem::take(&mut self.escape) {
            Escape::Pending => match c {
                'n' => self.push_char('\n'),
                't' => self.push_char('\t'),
                'r' => self.push_char('\r'),
                'b' => self.push_char('\u{8}'),
                'f' => self.push_char('\u{c}'),
                'u' => self.escape = Escape::Unicode(String::with_capacity(4)),
                // `\"`, `\\`, `\/`, and anything a lenient reader would pass through.
                other => self.push_char(other),
            },
            Escape::Unicode(mut digits) => {
                digits.push(c);
                if digits.len() < 4 {
                    self.escape = Escape::Unicode(digits);
                    return;
                }
                match u32::from_str_radix(&digits, 16) {
                    Ok(unit) => self.push_code_unit(unit),
                    Err(_) => self.push_char(char::REPLACEMENT_CHARACTER),
                }
            }
            Escape::None => match c {
                '\\' => self.escape = Escape::Pending,
                '"' => self.close_string(role),
                other => self.push_char(other),
            },
        }
    }

    /// Decode one UTF-16 code unit from a `\uXXXX` escape.
    fn push_code_unit(&mut self, unit: u32) {
        match unit {
            0xD800..=0xDBFF => {
                if self.high_surrogate.replace(unit).is_some() {
                    self.push_raw(char::REPLACEMENT_CHARACTER);
                }
            }
            0xDC00..=0xDFFF => match self.high_surrogate.take() {
                Some(high) => {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                    self.push_raw(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                None => self.push_raw(char::REPLACEMENT_CHARACTER),
            },
            _ => self.push_char(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }

    fn push_char(&mut self, c: char) {
        if self.high_surrogate.take().is_some() {
            self.push_raw(char::REPLACEMENT_CHARACTER);
        }
        self.push_raw(c);
    }

    fn push_raw(&mut self, c: char) {
        match self.string {
            Some(StringRole::Ignored) | None => {}
            Some(_) => self.buf.push(c),
        }
    }

    fn close_string(&mut self, role: StringRole) {
        if self.high_surrogate.take().is_some() {
            self.push_raw(char::REPLACEMENT_CHARACTER);
        }
        self.string = None;
        let text = std::mem::take(&mut self.buf);

        match role {
            StringRole::Key => self.last_key = Some(text),
            StringRole::FilePath => self.path = Some(text),
            StringRole::Markup => {
                self.publish(PartialCode::new(text, None));
                self.phase = Phase::Done;
            }
            StringRole::FileBody => {
                let path = self.path.clone();
                self.publish(PartialCode::new(text, path));
            }
            StringRole::Ignored => {}
        }
    }

    fn publish(&mut self, snapshot: PartialCode) {
        if self.snapshot.as_ref() != Some(&snapshot) {
            self.snapshot = Some(snapshot);
            self.changed = true;
        }
    }

    fn take_update(&mut self) -> Option<PartialCode> {
        if let Some(role) = self.string.filter(|r| r.is_code()) {
            let path = match role {
                StringRole::FileBody => self.path.clone(),
                _ => None,
            };
            let snapshot = PartialCode::new(self.buf.clone(), path);
            self.publish(snapshot);
        }

        if std::mem::take(&mut self.changed) {
            self.snapshot.clone()
        } else {
            None
        }
    }
}

/// Scan a whole text from scratch and return the code decoded so far.
pub fn extract_partial_code(text: &str) -> Option<PartialCode> {
    let mut scanner = DirectiveScanner::new();
    scanner.push(text);
    scanner.snapshot().cloned()
}
