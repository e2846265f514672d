/// Streaming scanner over reading-page markup. Events borrow the input, so
/// untouched regions re-serialize byte-for-byte. Only as much HTML as the
/// page generator emits is understood: tags, comments, declarations, text.
#[derive(Debug)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    /// Raw text run between tags; entity references are left intact.
    Text(&'a str),
    Tag(Tag<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag<'a> {
    /// Complete tag source including angle brackets.
    pub raw: &'a str,
    pub kind: TagKind,
    /// Element name as written; empty for comments and declarations.
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
    Comment,
    Declaration,
}

/// Elements that never take a closing tag; they must not affect nesting
/// depth or the annotator loses track of the content container.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if !rest.starts_with('<') {
            let end = rest.find('<').unwrap_or(rest.len());
            self.pos += end;
            return Some(Event::Text(&rest[..end]));
        }

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map_or(rest.len(), |i| i + 3);
            self.pos += end;
            return Some(Event::Tag(Tag {
                raw: &rest[..end],
                kind: TagKind::Comment,
                name: "",
            }));
        }

        if rest.starts_with("<!") {
            let end = rest.find('>').map_or(rest.len(), |i| i + 1);
            self.pos += end;
            return Some(Event::Tag(Tag {
                raw: &rest[..end],
                kind: TagKind::Declaration,
                name: "",
            }));
        }

        // An unterminated '<' near EOF is treated as text rather than lost.
        let Some(close) = rest.find('>') else {
            self.pos += rest.len();
            return Some(Event::Text(rest));
        };
        let raw = &rest[..=close];
        self.pos += close + 1;

        let (kind, name_start) = if raw.starts_with("</") {
            (TagKind::Close, 2)
        } else if raw.ends_with("/>") {
            (TagKind::SelfClosing, 1)
        } else {
            (TagKind::Open, 1)
        };
        let name_end = raw[name_start..]
            .find(|c: char| !c.is_ascii_alphanumeric())
            .map_or(raw.len() - 1, |i| name_start + i);
        Some(Event::Tag(Tag {
            raw,
            kind,
            name: &raw[name_start..name_end],
        }))
    }
}

impl<'a> Tag<'a> {
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS
            .iter()
            .any(|v| self.name.eq_ignore_ascii_case(v))
    }

    /// Value of an attribute, if present with a quoted value.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        let mut rest = self.raw;
        while let Some(idx) = rest.find(name) {
            let after = &rest[idx + name.len()..];
            let preceded_ok = rest[..idx]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace());
            if preceded_ok {
                let after = after.trim_start();
                if let Some(after_eq) = after.strip_prefix('=') {
                    let after_eq = after_eq.trim_start();
                    for quote in ['"', '\''] {
                        if let Some(body) = after_eq.strip_prefix(quote) {
                            let end = body.find(quote)?;
                            return Some(&body[..end]);
                        }
                    }
                }
            }
            rest = &rest[idx + name.len()..];
        }
        None
    }

    /// Whether a space-separated attribute (like `class`) contains a token.
    pub fn attr_contains(&self, name: &str, token: &str) -> bool {
        self.attr(name)
            .is_some_and(|v| v.split_whitespace().any(|t| t == token))
    }
}
