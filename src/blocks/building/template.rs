//! Blueprint templates
//!
//!     A template says what blueprint a symbol produces from its children's blueprints. It is
//!     a text, a list or a map of templates. Text may refer to children with `%1`, `%2`, ...
//!     (one-based); `%%` is a literal percent sign.
//!
//!     Every text is split into segments when the table is built, so evaluation never scans
//!     strings.

use crate::blocks::grammar::{RuleTable, Symbol};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fmt;

/// A template as written, before pre-parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Text(String),
    List(Vec<TemplateValue>),
    Map(Vec<(String, TemplateValue)>),
}

impl TemplateValue {
    pub fn text(text: &str) -> Self {
        TemplateValue::Text(text.to_string())
    }

    fn from_yaml(key: &str, value: &Value) -> Result<Self, TemplateError> {
        match value {
            Value::Null => Ok(TemplateValue::Text(String::new())),
            Value::Bool(b) => Ok(TemplateValue::Text(b.to_string())),
            Value::Number(n) => Ok(TemplateValue::Text(n.to_string())),
            Value::String(s) => Ok(TemplateValue::Text(s.clone())),
            Value::Sequence(items) => items
                .iter()
                .map(|item| TemplateValue::from_yaml(key, item))
                .collect::<Result<_, _>>()
                .map(TemplateValue::List),
            Value::Mapping(entries) => entries
                .iter()
                .map(|(name, item)| {
                    let name = name.as_str().ok_or_else(|| {
                        TemplateError::Malformed(format!(
                            "template '{}' has a non-string map key",
                            key
                        ))
                    })?;
                    Ok((name.to_string(), TemplateValue::from_yaml(key, item)?))
                })
                .collect::<Result<_, _>>()
                .map(TemplateValue::Map),
            Value::Tagged(tagged) => TemplateValue::from_yaml(key, &tagged.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// One-based child reference
    Placeholder(usize),
}

/// A pre-parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    segments: Vec<Segment>,
}

impl Slot {
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.peek() {
                Some((_, '%')) => {
                    chars.next();
                    literal.push('%');
                }
                Some((at, d)) if d.is_ascii_digit() => {
                    let from = *at;
                    let mut to = from;
                    while let Some((i, d)) = chars.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        to = i + d.len_utf8();
                        chars.next();
                    }
                    let index: usize = text[from..to].parse().map_err(|_| {
                        TemplateError::Malformed(format!("placeholder too large in {:?}", text))
                    })?;
                    if index == 0 {
                        return Err(TemplateError::ZeroPlaceholder(text.to_string()));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(index));
                }
                // A lone `%` is plain text
                _ => literal.push('%'),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The child index when the whole text is one placeholder.
    pub fn sole_placeholder(&self) -> Option<usize> {
        match self.segments.as_slice() {
            [Segment::Placeholder(k)] => Some(*k),
            _ => None,
        }
    }
}

/// A pre-parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Slot(Slot),
    List(Vec<Template>),
    Map(Vec<(String, Template)>),
}

impl Template {
    pub fn compile(value: &TemplateValue) -> Result<Self, TemplateError> {
        Ok(match value {
            TemplateValue::Text(text) => Template::Slot(Slot::parse(text)?),
            TemplateValue::List(items) => Template::List(
                items
                    .iter()
                    .map(Template::compile)
                    .collect::<Result<_, _>>()?,
            ),
            TemplateValue::Map(entries) => Template::Map(
                entries
                    .iter()
                    .map(|(name, item)| Ok((name.clone(), Template::compile(item)?)))
                    .collect::<Result<_, TemplateError>>()?,
            ),
        })
    }

    /// Largest child index referred to anywhere in the template.
    pub fn max_placeholder(&self) -> usize {
        match self {
            Template::Slot(slot) => slot
                .segments()
                .iter()
                .filter_map(|segment| match segment {
                    Segment::Placeholder(k) => Some(*k),
                    Segment::Literal(_) => None,
                })
                .max()
                .unwrap_or(0),
            Template::List(items) => items.iter().map(Template::max_placeholder).max().unwrap_or(0),
            Template::Map(entries) => entries
                .iter()
                .map(|(_, item)| item.max_placeholder())
                .max()
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template document does not have the expected shape
    Malformed(String),
    /// `%0` in this text; placeholders are one-based
    ZeroPlaceholder(String),
    /// A template is keyed by a symbol the grammar does not have
    UnknownSymbol(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Malformed(msg) => write!(f, "Malformed templates: {}", msg),
            TemplateError::ZeroPlaceholder(text) => {
                write!(f, "Placeholders start at %1, found %0 in {:?}", text)
            }
            TemplateError::UnknownSymbol(symbol) => {
                write!(f, "Template for unknown symbol '{}'", symbol)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Symbol to template.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    templates: HashMap<Symbol, Template>,
    order: Vec<Symbol>,
}

impl TemplateTable {
    pub fn compile<I, S>(entries: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (S, TemplateValue)>,
        S: Into<Symbol>,
    {
        let mut table = TemplateTable::default();
        for (symbol, value) in entries {
            let symbol = symbol.into();
            let template = Template::compile(&value)?;
            if table.templates.insert(symbol.clone(), template).is_none() {
                table.order.push(symbol);
            }
        }
        Ok(table)
    }

    pub fn from_yaml(source: &str) -> Result<Self, TemplateError> {
        let document: Value =
            serde_yaml::from_str(source).map_err(|e| TemplateError::Malformed(e.to_string()))?;
        let entries = match document {
            Value::Null => return Ok(TemplateTable::default()),
            Value::Mapping(entries) => entries,
            _ => {
                return Err(TemplateError::Malformed(
                    "template document must be a mapping".to_string(),
                ))
            }
        };

        let mut values = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let key = key.as_str().ok_or_else(|| {
                TemplateError::Malformed("template keys must be symbol names".to_string())
            })?;
            values.push((key.to_string(), TemplateValue::from_yaml(key, value)?));
        }
        TemplateTable::compile(values)
    }

    pub fn get(&self, symbol: &str) -> Option<&Template> {
        self.templates.get(symbol)
    }

    /// Symbols with a template, in the order they were declared.
    pub fn symbols(&self) -> &[Symbol] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every template must be keyed by a symbol the grammar declares.
    pub fn check_symbols(&self, rules: &RuleTable) -> Result<(), TemplateError> {
        match self.order.iter().find(|symbol| !rules.contains(symbol)) {
            Some(symbol) => Err(TemplateError::UnknownSymbol(symbol.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", vec![Segment::Literal("plain".into())])]
    #[case("%2", vec![Segment::Placeholder(2)])]
    #[case("%1 and %12", vec![
        Segment::Placeholder(1),
        Segment::Literal(" and ".into()),
        Segment::Placeholder(12),
    ])]
    #[case("100%%", vec![Segment::Literal("100%".into())])]
    #[case("50% off", vec![Segment::Literal("50% off".into())])]
    #[case("", vec![])]
    fn test_slot_segments(#[case] text: &str, #[case] expected: Vec<Segment>) {
        assert_eq!(Slot::parse(text).unwrap().segments(), expected.as_slice());
    }

    #[test]
    fn test_zero_placeholder_is_rejected() {
        assert_eq!(
            Slot::parse("value %0").unwrap_err(),
            TemplateError::ZeroPlaceholder("value %0".to_string())
        );
    }

    #[test]
    fn test_sole_placeholder() {
        assert_eq!(Slot::parse("%3").unwrap().sole_placeholder(), Some(3));
        assert_eq!(Slot::parse("x%3").unwrap().sole_placeholder(), None);
        assert_eq!(Slot::parse("%%3").unwrap().sole_placeholder(), None);
    }

    #[test]
    fn test_from_yaml_keeps_map_order() {
        let table = TemplateTable::from_yaml(
            "assignment:\n  type: variables_set\n  fields:\n    VAR: \"%1\"\n  children:\n    VALUE: \"%3\"\nforward_direction: FORWARD\n",
        )
        .unwrap();

        assert_eq!(
            table.symbols(),
            &[Symbol::new("assignment"), Symbol::new("forward_direction")]
        );
        let Some(Template::Map(entries)) = table.get("assignment") else {
            panic!("expected a map template");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["type", "fields", "children"]);
        assert_eq!(table.get("assignment").unwrap().max_placeholder(), 3);
    }

    #[test]
    fn test_from_yaml_rejects_lists() {
        assert!(matches!(
            TemplateTable::from_yaml("- a\n"),
            Err(TemplateError::Malformed(_))
        ));
    }
}
