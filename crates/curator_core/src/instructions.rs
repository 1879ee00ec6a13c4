//! Recursive edit-instruction tree carried in the coaching stage output.
//!
//! The backend nests instructions arbitrarily: plain strings, ordered lists,
//! and `{type, suggestion}` nodes can appear at any depth. Anything else is
//! kept as an opaque leaf and displayed verbatim rather than guessed at.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum EditInstruction {
    /// Plain instruction text; the base case.
    Leaf(String),
    /// Ordered list of nested instructions.
    List(Vec<EditInstruction>),
    /// A tagged suggestion such as `remove` or `add`.
    Tagged {
        kind: String,
        suggestion: Box<EditInstruction>,
    },
    /// Unrecognized object shape, shown as pretty-printed JSON.
    Opaque(Value),
    /// Null, boolean or number; rendered as nothing.
    Blank,
}

impl EditInstruction {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => EditInstruction::Leaf(text.clone()),
            Value::Array(items) => {
                EditInstruction::List(items.iter().map(Self::from_value).collect())
            }
            Value::Object(map) => {
                if let (Some(kind), Some(suggestion)) = (map.get("type"), map.get("suggestion")) {
                    let kind = match kind.as_str() {
                        Some(text) if !text.is_empty() => text.to_string(),
                        Some(_) | None => "Suggestion".to_string(),
                    };
                    EditInstruction::Tagged {
                        kind,
                        suggestion: Box::new(Self::from_value(suggestion)),
                    }
                } else {
                    EditInstruction::Opaque(value.clone())
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => EditInstruction::Blank,
        }
    }

    /// Depth-first traversal through a visitor.
    pub fn walk(&self, visitor: &mut dyn InstructionVisitor) {
        match self {
            EditInstruction::Leaf(text) => visitor.leaf(text),
            EditInstruction::List(items) => {
                visitor.enter_list(items.len());
                for item in items {
                    item.walk(visitor);
                }
                visitor.exit_list();
            }
            EditInstruction::Tagged { kind, suggestion } => {
                visitor.enter_tagged(kind);
                suggestion.walk(visitor);
                visitor.exit_tagged();
            }
            EditInstruction::Opaque(value) => visitor.opaque(value),
            EditInstruction::Blank => visitor.blank(),
        }
    }

    /// Flattens the tree into display text, one line per rendered node.
    pub fn render_plain(&self) -> String {
        let mut renderer = PlainRenderer::default();
        self.walk(&mut renderer);
        renderer.lines.join("\n")
    }
}

/// Visitor over the instruction tree. List and tag boundaries have default
/// no-op hooks so simple visitors only implement the leaves.
pub trait InstructionVisitor {
    fn leaf(&mut self, text: &str);
    fn opaque(&mut self, value: &Value);
    fn enter_list(&mut self, _len: usize) {}
    fn exit_list(&mut self) {}
    fn enter_tagged(&mut self, _kind: &str) {}
    fn exit_tagged(&mut self) {}
    fn blank(&mut self) {}
}

#[derive(Default)]
struct PlainRenderer {
    lines: Vec<String>,
    pending_tag: Vec<String>,
}

impl PlainRenderer {
    fn push(&mut self, text: String) {
        match self.pending_tag.last() {
            Some(tag) => self.lines.push(format!("{}: {}", tag.to_uppercase(), text)),
            None => self.lines.push(text),
        }
    }
}

impl InstructionVisitor for PlainRenderer {
    fn leaf(&mut self, text: &str) {
        self.push(text.to_string());
    }

    fn opaque(&mut self, value: &Value) {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        self.push(pretty);
    }

    fn enter_tagged(&mut self, kind: &str) {
        self.pending_tag.push(kind.to_string());
    }

    fn exit_tagged(&mut self) {
        self.pending_tag.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_structures_decode_to_variants() {
        let value = json!([
            "tighten the summary",
            { "type": "remove", "suggestion": ["drop the objective", "drop references"] },
            { "unknown_shape": true },
            42
        ]);

        let tree = EditInstruction::from_value(&value);
        let EditInstruction::List(items) = &tree else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], EditInstruction::Leaf("tighten the summary".into()));
        assert!(matches!(&items[1], EditInstruction::Tagged { kind, .. } if kind == "remove"));
        assert!(matches!(&items[2], EditInstruction::Opaque(_)));
        assert_eq!(items[3], EditInstruction::Blank);
    }

    #[test]
    fn tag_without_string_type_falls_back_to_generic_label() {
        let value = json!({ "type": 3, "suggestion": "rewrite" });
        let tree = EditInstruction::from_value(&value);
        assert!(matches!(tree, EditInstruction::Tagged { ref kind, .. } if kind == "Suggestion"));
    }

    #[test]
    fn render_plain_prefixes_tagged_suggestions() {
        let value = json!({ "type": "remove", "suggestion": "the hobbies section" });
        let rendered = EditInstruction::from_value(&value).render_plain();
        assert_eq!(rendered, "REMOVE: the hobbies section");
    }

    #[test]
    fn deep_nesting_renders_without_recursion_issues() {
        let mut value = json!("base");
        for _ in 0..50 {
            value = json!([value]);
        }
        let rendered = EditInstruction::from_value(&value).render_plain();
        assert_eq!(rendered, "base");
    }
}
