// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use smol_str::SmolStr;
use thiserror::Error;

use super::{Document, NodeId};

/// A parsed CSS selector list.
///
/// Supported: `,` lists, descendant and `>` combinators, `*`, tag names, `#id`, `.class` and
/// attribute tests (`[a]`, `[a="v"]`, `[a*="v"]`, `[a^="v"]`, `[a~="v"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<SmolStr>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: SmolStr,
    op: AttrOp,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    #[error("unexpected {found:?} at offset {offset} in selector {source_text:?}")]
    Unexpected { source_text: String, offset: usize, found: char },
    #[error("selector {source_text:?} ends unexpectedly")]
    UnexpectedEnd { source_text: String },
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        if source.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser { source, chars: source.char_indices().peekable() };
        let alternatives = parser.selector_list()?;
        Ok(Self { source: source.to_owned(), alternatives })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.is_element(id)
            && self.alternatives.iter().any(|complex| {
                complex.matches_at(doc, id, complex.compounds.len().saturating_sub(1))
            })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Complex {
    fn matches_at(&self, doc: &Document, id: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(doc, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent(id)
                .filter(|parent| doc.is_element(*parent))
                .is_some_and(|parent| self.matches_at(doc, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = doc.parent(id);
                while let Some(ancestor) = current {
                    if doc.is_element(ancestor) && self.matches_at(doc, ancestor, index - 1) {
                        return true;
                    }
                    current = doc.parent(ancestor);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && doc.tag(id) != Some(tag.as_str()) {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if doc.attribute(id, "id") != Some(expected.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| doc.has_class(id, class)) {
            return false;
        }
        self.attrs.iter().all(|test| {
            let Some(actual) = doc.attribute(id, &test.name) else {
                return false;
            };
            match test.op {
                AttrOp::Exists => true,
                AttrOp::Equals => actual == test.value,
                AttrOp::Contains => !test.value.is_empty() && actual.contains(test.value.as_str()),
                AttrOp::Prefix => !test.value.is_empty() && actual.starts_with(test.value.as_str()),
                AttrOp::Word => actual.split_ascii_whitespace().any(|word| word == test.value),
            }
        })
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    fn selector_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut alternatives = vec![self.complex()?];
        while self.eat(',') {
            alternatives.push(self.complex()?);
        }
        if let Some((offset, found)) = self.chars.next() {
            return Err(self.unexpected(offset, found));
        }
        Ok(alternatives)
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_whitespace();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = if self.eat('>') {
                self.skip_whitespace();
                Combinator::Child
            } else if had_space && !matches!(self.peek(), None | Some(',')) {
                Combinator::Descendant
            } else {
                break;
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(Complex { compounds, combinators })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        if self.eat('*') {
            compound.tag = Some(SmolStr::new_inline("*"));
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(SmolStr::new(self.ident()?.to_ascii_lowercase()));
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.chars.next();
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.chars.next();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.chars.next();
                    compound.attrs.push(self.attr_test()?);
                }
                _ => break,
            }
        }
        if compound.is_empty() {
            return match self.chars.next() {
                Some((offset, found)) => Err(self.unexpected(offset, found)),
                None => Err(self.unexpected_end()),
            };
        }
        Ok(compound)
    }

    fn attr_test(&mut self) -> Result<AttrTest, SelectorError> {
        self.skip_whitespace();
        let name = SmolStr::new(self.ident()?);
        self.skip_whitespace();
        let op = match self.chars.next() {
            Some((_, ']')) => return Ok(AttrTest { name, op: AttrOp::Exists, value: String::new() }),
            Some((_, '=')) => AttrOp::Equals,
            Some((offset, prefix @ ('*' | '^' | '~'))) => {
                if !self.eat('=') {
                    return Err(self.unexpected(offset, prefix));
                }
                match prefix {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    _ => AttrOp::Word,
                }
            }
            Some((offset, found)) => return Err(self.unexpected(offset, found)),
            None => return Err(self.unexpected_end()),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next() {
                        Some((_, ch)) if ch == quote => break,
                        Some((_, ch)) => value.push(ch),
                        None => return Err(self.unexpected_end()),
                    }
                }
                value
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        match self.chars.next() {
            Some((_, ']')) => Ok(AttrTest { name, op, value }),
            Some((offset, found)) => Err(self.unexpected(offset, found)),
            None => Err(self.unexpected_end()),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(ch) = self.peek().filter(|ch| is_ident_char(*ch)) {
            out.push(ch);
            self.chars.next();
        }
        if out.is_empty() {
            return match self.chars.next() {
                Some((offset, found)) => Err(self.unexpected(offset, found)),
                None => Err(self.unexpected_end()),
            };
        }
        Ok(out)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn unexpected(&self, offset: usize, found: char) -> SelectorError {
        SelectorError::Unexpected { source_text: self.source.to_owned(), offset, found }
    }

    fn unexpected_end(&self) -> SelectorError {
        SelectorError::UnexpectedEnd { source_text: self.source.to_owned() }
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::{Selector, SelectorError};
    use crate::dom::{Document, Viewport};

    fn sample() -> (Document, [crate::dom::NodeId; 4]) {
        let mut doc = Document::with_body("https://example.test/", Viewport::default());
        let body = doc.ensure_body();
        let main = doc.create_element("main");
        let scroller = doc.create_element("div");
        doc.set_attribute(scroller, "class", "flex overflow-y-auto h-full").unwrap();
        let turn = doc.create_element("div");
        doc.set_attribute(turn, "data-testid", "user-message").unwrap();
        let heading = doc.create_element("H2");
        doc.append_child(body, main).unwrap();
        doc.append_child(main, scroller).unwrap();
        doc.append_child(scroller, turn).unwrap();
        doc.append_child(turn, heading).unwrap();
        (doc, [main, scroller, turn, heading])
    }

    #[test]
    fn descendant_and_attribute_substring() {
        let (doc, [_, scroller, _, _]) = sample();
        let selector = Selector::parse(r#"main div[class*="overflow-y-auto"]"#).unwrap();
        assert_eq!(doc.query_selector_all(doc.root(), &selector), vec![scroller]);
    }

    #[test]
    fn selector_lists_return_document_order_without_duplicates() {
        let (doc, [_, _, turn, heading]) = sample();
        let selector = Selector::parse(r#"h1, h2, [data-testid="user-message"], div > h2"#).unwrap();
        assert_eq!(doc.query_selector_all(doc.root(), &selector), vec![turn, heading]);
    }

    #[test]
    fn child_combinator_requires_direct_parent() {
        let (doc, [_, _, _, heading]) = sample();
        assert!(doc.matches(heading, &Selector::parse("div>h2").unwrap()));
        assert!(!doc.matches(heading, &Selector::parse("main > h2").unwrap()));
    }

    #[test]
    fn closest_is_inclusive() {
        let (doc, [_, scroller, turn, heading]) = sample();
        let turn_sel = Selector::parse(r#"[data-testid="user-message"]"#).unwrap();
        assert_eq!(doc.closest(heading, &turn_sel), Some(turn));
        assert_eq!(doc.closest(turn, &turn_sel), Some(turn));
        assert_eq!(doc.closest(scroller, &turn_sel), None);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert!(matches!(Selector::parse("div[class"), Err(SelectorError::UnexpectedEnd { .. })));
        assert!(matches!(
            Selector::parse("div, ,p"),
            Err(SelectorError::Unexpected { found: ',', .. })
        ));
    }
}
