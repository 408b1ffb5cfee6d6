use super::*;

/// Read access a selector needs to walk an element tree.
pub(crate) trait ElementTree {
    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    fn tag(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
    Word(String),
}

impl AttrTest {
    fn accepts(&self, found: &str) -> bool {
        match self {
            Self::Present => true,
            Self::Equals(value) => found == value,
            Self::Prefix(value) => found.starts_with(value.as_str()),
            Self::Suffix(value) => found.ends_with(value.as_str()),
            Self::Substring(value) => found.contains(value.as_str()),
            Self::Word(value) => found.split_whitespace().any(|word| word == value),
        }
    }
}

/// One compound selector such as `a.nav-link[data-section]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrTest)>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, tree: &dyn ElementTree, node: NodeId) -> bool {
        let Some(tag) = tree.tag(node) else {
            return false;
        };
        if self
            .tag
            .as_ref()
            .is_some_and(|wanted| wanted != "*" && !tag.eq_ignore_ascii_case(wanted))
        {
            return false;
        }
        if self
            .id
            .as_ref()
            .is_some_and(|id| tree.attribute(node, "id") != Some(id.as_str()))
        {
            return false;
        }
        let class_attr = tree.attribute(node, "class").unwrap_or_default();
        if !self
            .classes
            .iter()
            .all(|class| class_attr.split_whitespace().any(|have| have == class))
        {
            return false;
        }
        self.attrs.iter().all(|(name, test)| {
            tree.attribute(node, name)
                .is_some_and(|found| test.accepts(found))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Descendant,
    Child,
}

/// A complex selector stored right to left: the subject compound, then each
/// compound to its left with the relation that links them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain {
    subject: Compound,
    ancestors: Vec<(Relation, Compound)>,
}

impl Chain {
    fn matches(&self, tree: &dyn ElementTree, node: NodeId) -> bool {
        self.subject.matches(tree, node) && Self::ancestors_match(tree, node, &self.ancestors)
    }

    fn ancestors_match(
        tree: &dyn ElementTree,
        node: NodeId,
        ancestors: &[(Relation, Compound)],
    ) -> bool {
        let Some(((relation, compound), rest)) = ancestors.split_first() else {
            return true;
        };
        let mut cursor = tree.parent_element(node);
        while let Some(candidate) = cursor {
            if compound.matches(tree, candidate) && Self::ancestors_match(tree, candidate, rest) {
                return true;
            }
            if *relation == Relation::Child {
                return false;
            }
            cursor = tree.parent_element(candidate);
        }
        false
    }
}

/// Comma-separated selector list.
///
/// Supported: type, `*`, `#id`, `.class`, attribute tests (`[a]`, `=`, `^=`,
/// `$=`, `*=`, `~=`) and the descendant and child combinators. Anything else,
/// pseudo-classes included, is [`Error::UnsupportedSelector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
    chains: Vec<Chain>,
}

impl SelectorList {
    pub(crate) fn parse(source: &str) -> Result<Self> {
        let mut cursor = Cursor { source, pos: 0 };
        let mut chains = vec![cursor.chain()?];
        while cursor.eat(',') {
            chains.push(cursor.chain()?);
        }
        if cursor.peek().is_some() {
            return Err(cursor.unsupported());
        }
        Ok(Self { chains })
    }

    /// The id when the whole list is a bare `#id`.
    pub(crate) fn single_id(&self) -> Option<&str> {
        match self.chains.as_slice() {
            [chain] if chain.ancestors.is_empty() => {
                let Compound {
                    tag,
                    id,
                    classes,
                    attrs,
                } = &chain.subject;
                (tag.is_none() && classes.is_empty() && attrs.is_empty())
                    .then_some(id.as_deref())
                    .flatten()
            }
            _ => None,
        }
    }

    pub(crate) fn matches(&self, tree: &dyn ElementTree, node: NodeId) -> bool {
        self.chains.iter().any(|chain| chain.matches(tree, node))
    }
}

struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn unsupported(&self) -> Error {
        Error::UnsupportedSelector(self.source.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Returns whether any whitespace was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !(ch.is_alphanumeric() || ch == '-' || ch == '_') {
                break;
            }
            self.pos += ch.len_utf8();
        }
        if self.pos == start {
            return Err(self.unsupported());
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn chain(&mut self) -> Result<Chain> {
        self.skip_ws();
        let mut subject = self.compound()?;
        let mut ancestors = Vec::new();
        loop {
            let spaced = self.skip_ws();
            let relation = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Relation::Child
                }
                Some(_) if spaced => Relation::Descendant,
                Some(_) => return Err(self.unsupported()),
            };
            let next = self.compound()?;
            ancestors.push((relation, std::mem::replace(&mut subject, next)));
        }
        ancestors.reverse();
        Ok(Chain { subject, ancestors })
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        if self.eat('*') {
            compound.tag = Some("*".into());
        } else if self.peek().is_some_and(char::is_alphabetic) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    if compound.id.replace(self.ident()?).is_some() {
                        return Err(self.unsupported());
                    }
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attr_test()?);
                }
                _ => break,
            }
        }
        if compound.is_empty() {
            return Err(self.unsupported());
        }
        Ok(compound)
    }

    fn attr_test(&mut self) -> Result<(String, AttrTest)> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        if self.eat(']') {
            return Ok((name, AttrTest::Present));
        }
        let operator = match self.peek() {
            Some('=') => '=',
            Some(op @ ('^' | '$' | '*' | '~')) => {
                self.pos += 1;
                op
            }
            _ => return Err(self.unsupported()),
        };
        if !self.eat('=') {
            return Err(self.unsupported());
        }
        self.skip_ws();
        let value = self.attr_value()?;
        self.skip_ws();
        if !self.eat(']') {
            return Err(self.unsupported());
        }
        let test = match operator {
            '^' => AttrTest::Prefix(value),
            '$' => AttrTest::Suffix(value),
            '*' => AttrTest::Substring(value),
            '~' => AttrTest::Word(value),
            _ => AttrTest::Equals(value),
        };
        Ok((name, test))
    }

    fn attr_value(&mut self) -> Result<String> {
        let Some(quote) = self.peek().filter(|ch| matches!(ch, '"' | '\'')) else {
            return self.ident();
        };
        self.pos += 1;
        let mut value = String::new();
        loop {
            let ch = self.peek().ok_or_else(|| self.unsupported())?;
            self.pos += ch.len_utf8();
            match ch {
                '\\' => {
                    let escaped = self.peek().ok_or_else(|| self.unsupported())?;
                    self.pos += escaped.len_utf8();
                    value.push(escaped);
                }
                ch if ch == quote => return Ok(value),
                ch => value.push(ch),
            }
        }
    }
}
