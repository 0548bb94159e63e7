//! Field-spec resolution.

use super::Visitor;
use crate::ast::{AstNode, NodeKind, Value};
use crate::binder::FieldPath;
use crate::syntax::cst::CstNode;

impl<'t> Visitor<'t> {
    /// Build a `kind` node from `node` through the kind's field spec.
    pub fn resolve(&self, kind: NodeKind, node: &CstNode<'_>) -> AstNode {
        let spec = self.table().spec(kind);
        let mut ast = AstNode::new(kind, node.span);

        for (field, path) in spec.entries() {
            if !ast.field(field).is_null() {
                continue;
            }
            ast.set(field, self.resolve_path(node, path));
        }

        for (field, paths) in spec.merges() {
            let mut items = Vec::new();
            for path in paths {
                self.merge_path(node, path, &mut items);
            }
            ast.set(field, Value::List(items));
        }

        ast
    }

    /// Visit what `path` selects below `node`. A list path with no match and
    /// a missing segment both give `Null`.
    pub fn resolve_path(&self, node: &CstNode<'_>, path: &FieldPath) -> Value {
        let matches = locate(node, path);
        if path.is_many() {
            if matches.is_empty() {
                return Value::Null;
            }
            return Value::List(matches.into_iter().map(|c| self.visit(c)).collect());
        }
        matches.first().map_or(Value::Null, |c| self.visit(c))
    }

    /// Splice what `path` selects into `items`: lists are flattened, a
    /// Fallback built for the selected node itself contributes its `arr`,
    /// other values are pushed as they are.
    fn merge_path(&self, node: &CstNode<'_>, path: &FieldPath, items: &mut Vec<Value>) {
        for child in locate(node, path) {
            match self.visit(child) {
                Value::Null => {}
                Value::List(list) => items.extend(list),
                Value::Node(n) if n.kind() == NodeKind::Unshaped && n.span() == child.span => {
                    items.extend(n.arr().iter().filter(|v| !v.is_null()).cloned());
                }
                other => items.push(other),
            }
        }
    }
}

/// CST nodes selected by `path`, in source order.
fn locate<'a, 'i>(node: &'a CstNode<'i>, path: &FieldPath) -> Vec<&'a CstNode<'i>> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Vec::new();
    };

    let mut current = node;
    for segment in parents {
        match current.child(segment) {
            Some(child) => current = child,
            None => return Vec::new(),
        }
    }

    if path.is_many() {
        current.children.iter().filter(|c| c.matches(last)).collect()
    } else {
        current.child(last).into_iter().collect()
    }
}
