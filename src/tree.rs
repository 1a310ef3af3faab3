//! Layout tree definitions
//!
//! The tree the measure and draw passes walk. It is built once per document
//! and never mutated afterwards; positions live in a separate
//! [`Layout`](crate::layout::Layout) keyed by [`NodeId`].

use crate::document::{self, JsonValue};
use crate::error::{Result, ViewError};
use std::borrow::Cow;

/// Deepest container nesting accepted when building a tree
pub const MAX_NESTING_DEPTH: usize = 64;

/// Pre-order index of a node; the root is always `NodeId(0)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: NodeId,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Object(Vec<Property>),
    Array(Vec<LayoutNode>),
    Scalar(Scalar),
}

/// One object member. Names are not deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: LayoutNode,
}

/// A leaf value, already stringified
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    /// Literal text; string contents carry no surrounding quotes
    pub text: String,
    /// Whether the source token was a quoted string
    pub is_string_literal: bool,
}

impl Scalar {
    pub fn display_text(&self, enquote_strings: bool) -> Cow<'_, str> {
        quote_if(&self.text, enquote_strings && self.is_string_literal)
    }
}

/// Wrap `text` in double quotes when `enabled`.
pub fn quote_if(text: &str, enabled: bool) -> Cow<'_, str> {
    if enabled {
        Cow::Owned(format!("\"{}\"", text))
    } else {
        Cow::Borrowed(text)
    }
}

impl LayoutNode {
    /// Direct children in drawing order
    pub fn children(&self) -> Vec<&LayoutNode> {
        match &self.kind {
            NodeKind::Object(props) => props.iter().map(|p| &p.value).collect(),
            NodeKind::Array(items) => items.iter().collect(),
            NodeKind::Scalar(_) => vec![],
        }
    }
}

/// A document ready for layout. The root is always an object or an array.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    root: LayoutNode,
    node_count: usize,
}

impl LayoutTree {
    /// Parse JSON text and adapt it. `Ok(None)` means the top-level value is
    /// a bare scalar, which is not laid out.
    pub fn parse(text: &str) -> Result<Option<Self>> {
        Self::from_value(document::parse(text)?)
    }

    pub fn from_value(value: JsonValue) -> Result<Option<Self>> {
        if !value.is_container() {
            return Ok(None);
        }
        let mut builder = TreeBuilder { next_id: 0 };
        let root = builder.build(value, 0)?;
        Ok(Some(Self {
            root,
            node_count: builder.next_id,
        }))
    }

    pub fn root(&self) -> &LayoutNode {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> Vec<&LayoutNode> {
        let mut out = Vec::with_capacity(self.node_count);
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().into_iter().rev());
        }
        out
    }
}

struct TreeBuilder {
    next_id: usize,
}

impl TreeBuilder {
    fn build(&mut self, value: JsonValue, depth: usize) -> Result<LayoutNode> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ViewError::TooDeep { limit: MAX_NESTING_DEPTH });
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let kind = match value {
            JsonValue::Object(members) => {
                let mut props = Vec::with_capacity(members.len());
                for (name, member) in members {
                    let value = self.build(member, depth + 1)?;
                    props.push(Property { name, value });
                }
                NodeKind::Object(props)
            }
            JsonValue::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.build(element, depth + 1)?);
                }
                NodeKind::Array(items)
            }
            JsonValue::String(text) => NodeKind::Scalar(Scalar { text, is_string_literal: true }),
            JsonValue::Number(text) => NodeKind::Scalar(Scalar { text, is_string_literal: false }),
            JsonValue::Bool(b) => NodeKind::Scalar(Scalar { text: b.to_string(), is_string_literal: false }),
            JsonValue::Null => NodeKind::Scalar(Scalar { text: "null".to_string(), is_string_literal: false }),
        };

        Ok(LayoutNode { id, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_scalar_builds_no_tree() {
        assert!(LayoutTree::parse("42").unwrap().is_none());
        assert!(LayoutTree::parse(r#""text""#).unwrap().is_none());
        assert!(LayoutTree::parse("null").unwrap().is_none());
    }

    #[test]
    fn ids_follow_pre_order() {
        let tree = LayoutTree::parse(r#"{"a":[1,2],"b":{"c":true}}"#).unwrap().unwrap();
        assert_eq!(tree.node_count(), 7);
        let ids: Vec<usize> = tree.nodes().iter().map(|n| n.id.index()).collect();
        assert_eq!(ids, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn scalars_remember_string_literals() {
        let tree = LayoutTree::parse(r#"["x", 1, false, null]"#).unwrap().unwrap();
        let texts: Vec<(String, bool)> = tree
            .root()
            .children()
            .iter()
            .map(|n| match &n.kind {
                NodeKind::Scalar(s) => (s.text.clone(), s.is_string_literal),
                _ => panic!("expected scalar"),
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                ("x".to_string(), true),
                ("1".to_string(), false),
                ("false".to_string(), false),
                ("null".to_string(), false),
            ]
        );
    }

    #[test]
    fn display_text_quotes_only_string_literals() {
        let s = Scalar { text: "x".into(), is_string_literal: true };
        let n = Scalar { text: "1".into(), is_string_literal: false };
        assert_eq!(s.display_text(true), "\"x\"");
        assert_eq!(s.display_text(false), "x");
        assert_eq!(n.display_text(true), "1");
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let ok = format!("{}{}", "[".repeat(MAX_NESTING_DEPTH + 1), "]".repeat(MAX_NESTING_DEPTH + 1));
        assert!(LayoutTree::parse(&ok).unwrap().is_some());

        let deep = format!("{}{}", "[".repeat(MAX_NESTING_DEPTH + 2), "]".repeat(MAX_NESTING_DEPTH + 2));
        assert!(matches!(
            LayoutTree::parse(&deep),
            Err(ViewError::TooDeep { limit: MAX_NESTING_DEPTH })
        ));
    }
}
