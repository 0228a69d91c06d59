//! CSS-style selectors for locating document elements.
//!
//! Supported syntax is the subset page markup actually uses to point at form
//! fields: type (`input`), universal (`*`), `#id`, `.class`, `[attr]`,
//! `[attr=value]` (value optionally quoted), compound parts such as
//! `input.search[name=q]`, and the descendant (` `) and child (`>`)
//! combinators. Tokenizing is done by `cssparser`, so CSS escapes such as
//! `#id\:x` work as in a browser.

use std::fmt;

use cssparser::{
    ParseError as CssParseError, Parser, ParserInput, Token, serialize_identifier, serialize_string,
};

use crate::error::{DocumentError, Result};

/// Read access to an element for selector matching.
pub trait ElementLike {
    /// The element's tag name.
    fn tag_name(&self) -> &str;
    /// The value of an attribute, if present.
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// How two adjacent selector parts relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// `A B`: B is any descendant of A.
    Descendant,
    /// `A > B`: B is a direct child of A.
    Child,
}

/// Type selector - matches the element's tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// `*`
    Universal,
    /// A tag name, compared case-insensitively.
    Tag(String),
}

/// An attribute condition (`[name]` or `[name=value]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// Required exact value, or `None` for a presence check.
    pub value: Option<String>,
}

/// A single compound selector segment (e.g. `input#q.search[name=q]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    /// Type selector.
    pub type_selector: Option<TypeSelector>,
    /// ID selector (`#id`).
    pub id: Option<String>,
    /// Class selectors (`.class`); all must match.
    pub classes: Vec<String>,
    /// Attribute selectors; all must match.
    pub attributes: Vec<AttributeSelector>,
}

impl SelectorPart {
    fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }

    /// Check if this part matches a single element.
    pub fn matches<E: ElementLike + ?Sized>(&self, element: &E) -> bool {
        if let Some(TypeSelector::Tag(tag)) = &self.type_selector
            && !tag.eq_ignore_ascii_case(element.tag_name())
        {
            return false;
        }

        if let Some(id) = &self.id
            && element.attribute("id") != Some(id.as_str())
        {
            return false;
        }

        if !self.classes.is_empty() {
            let class_attr = element.attribute("class").unwrap_or("");
            let all_present = self
                .classes
                .iter()
                .all(|class| class_attr.split_ascii_whitespace().any(|c| c == class));
            if !all_present {
                return false;
            }
        }

        self.attributes
            .iter()
            .all(|attr| match (&attr.value, element.attribute(&attr.name)) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(expected), Some(actual)) => expected == actual,
            })
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_selector {
            Some(TypeSelector::Universal) => f.write_str("*")?,
            Some(TypeSelector::Tag(tag)) => serialize_identifier(tag, f)?,
            None => {}
        }
        if let Some(id) = &self.id {
            f.write_str("#")?;
            serialize_identifier(id, f)?;
        }
        for class in &self.classes {
            f.write_str(".")?;
            serialize_identifier(class, f)?;
        }
        for attr in &self.attributes {
            f.write_str("[")?;
            serialize_identifier(&attr.name, f)?;
            if let Some(value) = &attr.value {
                f.write_str("=")?;
                serialize_string(value, f)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// A complete selector: compound parts joined by combinators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Selector parts, leftmost first.
    pub parts: Vec<SelectorPart>,
    /// Combinators between parts (length = parts.len() - 1).
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// Parse a selector.
    pub fn parse(text: &str) -> Result<Self> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        parse_selector(&mut parser, text)
    }

    /// Get the rightmost (subject) selector part.
    pub fn subject(&self) -> Option<&SelectorPart> {
        self.parts.last()
    }

    /// Check whether `element` matches, walking ancestors with `parent_of`
    /// for combinators.
    pub fn matches<'a, E, P>(&self, element: &'a E, parent_of: P) -> bool
    where
        E: ElementLike + ?Sized,
        P: Fn(&'a E) -> Option<&'a E> + Copy,
    {
        match self.parts.len() {
            0 => false,
            n => self.matches_from(n - 1, element, parent_of),
        }
    }

    fn matches_from<'a, E, P>(&self, index: usize, element: &'a E, parent_of: P) -> bool
    where
        E: ElementLike + ?Sized,
        P: Fn(&'a E) -> Option<&'a E> + Copy,
    {
        if !self.parts[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => parent_of(element)
                .is_some_and(|parent| self.matches_from(index - 1, parent, parent_of)),
            Combinator::Descendant => {
                let mut current = parent_of(element);
                while let Some(ancestor) = current {
                    if self.matches_from(index - 1, ancestor, parent_of) {
                        return true;
                    }
                    current = parent_of(ancestor);
                }
                false
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                }
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Selector {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_selector<'i>(parser: &mut Parser<'i, '_>, source: &str) -> Result<Selector> {
    let invalid = |message: &str| DocumentError::invalid_selector(source, message);

    let mut parts = Vec::new();
    let mut combinators = Vec::new();
    let mut current = SelectorPart::default();
    let mut pending: Option<Combinator> = None;

    parser.skip_whitespace();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                    pending = Some(Combinator::Descendant);
                }
                continue;
            }
            Token::Delim('>') => {
                let had_part = !current.is_empty();
                if had_part {
                    parts.push(std::mem::take(&mut current));
                }
                if parts.is_empty() {
                    return Err(invalid("combinator without a left-hand selector"));
                }
                if !had_part && pending == Some(Combinator::Child) {
                    return Err(invalid("consecutive combinators"));
                }
                pending = Some(Combinator::Child);
                continue;
            }
            _ => {}
        }

        // Every remaining token adds to the current compound part.
        if current.is_empty() && !parts.is_empty() {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }

        match token {
            Token::Ident(name) => {
                if !current.is_empty() {
                    return Err(invalid("type selector must come first in a compound"));
                }
                current.type_selector = Some(TypeSelector::Tag(name.to_string()));
            }
            Token::Delim('*') => {
                if !current.is_empty() {
                    return Err(invalid("universal selector must come first in a compound"));
                }
                current.type_selector = Some(TypeSelector::Universal);
            }
            Token::Delim('.') => {
                let class = parser
                    .expect_ident()
                    .map_err(|_| invalid("expected class name after '.'"))?;
                current.classes.push(class.to_string());
            }
            Token::IDHash(id) => {
                if current.id.is_some() {
                    return Err(invalid("compound selector has more than one id"));
                }
                current.id = Some(id.to_string());
            }
            Token::SquareBracketBlock => {
                let attribute = parser
                    .parse_nested_block(parse_attribute)
                    .map_err(|_: CssParseError<'_, ()>| invalid("invalid attribute selector"))?;
                current.attributes.push(attribute);
            }
            Token::Hash(_) => return Err(invalid("id must be a valid identifier")),
            Token::Colon => return Err(invalid("pseudo-classes are not supported")),
            Token::Comma => return Err(invalid("selector lists are not supported")),
            _ => return Err(invalid("unexpected token")),
        }
    }

    if !current.is_empty() {
        parts.push(current);
    } else if pending == Some(Combinator::Child) {
        return Err(invalid("combinator without a right-hand selector"));
    }

    if parts.is_empty() {
        return Err(invalid("empty selector"));
    }

    Ok(Selector { parts, combinators })
}

/// Parse the inside of `[...]`: a name, optionally `=` and an identifier or
/// quoted string.
fn parse_attribute<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<AttributeSelector, CssParseError<'i, ()>> {
    let name = parser.expect_ident()?.to_string();
    if parser.is_exhausted() {
        return Ok(AttributeSelector { name, value: None });
    }

    parser.expect_delim('=')?;
    let value = parser.expect_ident_or_string()?.to_string();
    Ok(AttributeSelector {
        name,
        value: Some(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TestElement {
        tag: &'static str,
        attrs: HashMap<&'static str, &'static str>,
        parent: Option<usize>,
    }

    impl ElementLike for TestElement {
        fn tag_name(&self) -> &str {
            self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.get(name).copied()
        }
    }

    fn element(
        tag: &'static str,
        attrs: &[(&'static str, &'static str)],
        parent: Option<usize>,
    ) -> TestElement {
        TestElement {
            tag,
            attrs: attrs.iter().copied().collect(),
            parent,
        }
    }

    #[test]
    fn test_parse_id() {
        let selector = Selector::parse("#id_aluno_1").unwrap();
        assert_eq!(selector.parts.len(), 1);
        assert_eq!(selector.parts[0].id.as_deref(), Some("id_aluno_1"));
    }

    #[test]
    fn test_parse_compound_and_combinators() {
        let selector = Selector::parse("form.search > input[name=\"q\"]  .hint").unwrap();
        assert_eq!(selector.parts.len(), 3);
        assert_eq!(
            selector.combinators,
            vec![Combinator::Child, Combinator::Descendant]
        );
        assert_eq!(
            selector.parts[1].attributes,
            vec![AttributeSelector {
                name: "name".into(),
                value: Some("q".into()),
            }]
        );
        assert_eq!(selector.to_string(), "form.search > input[name=\"q\"] .hint");
    }

    #[test]
    fn test_parse_escaped_identifiers() {
        let selector = Selector::parse(r"#id\:x .a\.b").unwrap();
        assert_eq!(selector.parts[0].id.as_deref(), Some("id:x"));
        assert_eq!(selector.parts[1].classes, vec!["a.b".to_string()]);
        assert_eq!(selector.to_string(), r"#id\:x .a\.b");
        assert_eq!(Selector::parse(&selector.to_string()).unwrap(), selector);
    }

    #[test]
    fn test_parse_child_combinator_spacing() {
        for text in ["form>input", "form >input", "form> input", "form  >  input"] {
            let selector = Selector::parse(text).unwrap();
            assert_eq!(selector.combinators, vec![Combinator::Child], "{text}");
            assert_eq!(selector.to_string(), "form > input");
        }
        let trailing = Selector::parse("  form input  ").unwrap();
        assert_eq!(trailing.combinators, vec![Combinator::Descendant]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("   ").is_err());
        assert!(Selector::parse("a >").is_err());
        assert!(Selector::parse("a, b").is_err());
        assert!(Selector::parse("[name=]").is_err());
        assert!(Selector::parse("[=q]").is_err());
        assert!(Selector::parse("> input").is_err());
        assert!(Selector::parse("form > > input").is_err());
        assert!(Selector::parse("#1a").is_err());
        assert!(Selector::parse("#a#b").is_err());
        assert!(Selector::parse("input:focus").is_err());
    }

    #[test]
    fn test_part_matching() {
        let el = element(
            "INPUT",
            &[("id", "q"), ("class", "form-control search"), ("name", "q")],
            None,
        );

        assert!(Selector::parse("input").unwrap().parts[0].matches(&el));
        assert!(Selector::parse("*").unwrap().parts[0].matches(&el));
        assert!(Selector::parse("#q").unwrap().parts[0].matches(&el));
        assert!(Selector::parse(".search.form-control").unwrap().parts[0].matches(&el));
        assert!(Selector::parse("[name]").unwrap().parts[0].matches(&el));
        assert!(Selector::parse("input[name=q]").unwrap().parts[0].matches(&el));
        assert!(!Selector::parse("input[name=x]").unwrap().parts[0].matches(&el));
        assert!(!Selector::parse(".missing").unwrap().parts[0].matches(&el));
        assert!(!Selector::parse("select").unwrap().parts[0].matches(&el));
    }

    #[test]
    fn test_combinator_matching() {
        let tree = [
            element("form", &[("id", "f")], None),
            element("div", &[("class", "row")], Some(0)),
            element("input", &[("name", "aluno")], Some(1)),
        ];
        let parent_of = |e: &TestElement| e.parent.map(|p| &tree[p]);
        let input = &tree[2];

        assert!(Selector::parse("#f input").unwrap().matches(input, parent_of));
        assert!(Selector::parse(".row > input").unwrap().matches(input, parent_of));
        assert!(!Selector::parse("#f > input").unwrap().matches(input, parent_of));
        assert!(Selector::parse("form .row > [name=aluno]").unwrap().matches(input, parent_of));
    }
}
