//! Pre-order syntax visitor with an explicit continuation signal.
//!
//! [`SyntaxVisitor::enter`] returns `true` to descend into the node's
//! children and `false` to prune the branch. Closures of the right shape
//! implement the trait directly.

use tree_sitter::Node;

use crate::core::errors::Result;

/// A member selected through a qualifier: `pkg.Name`, `pkg.Type` or `x.Field`.
#[derive(Debug, Clone, Copy)]
pub struct QualifiedRef<'t> {
    /// The `selector_expression` / `qualified_type` node
    pub node: Node<'t>,
    /// Left-hand side (an expression or a package identifier)
    pub qualifier: Node<'t>,
    /// The selected member identifier
    pub member: Node<'t>,
}

impl<'t> QualifiedRef<'t> {
    /// Recognise a qualified reference node
    pub fn from_node(node: Node<'t>) -> Option<Self> {
        let (qualifier, member) = match node.kind() {
            "selector_expression" => (
                node.child_by_field_name("operand")?,
                node.child_by_field_name("field")?,
            ),
            "qualified_type" => (
                node.child_by_field_name("package")?,
                node.child_by_field_name("name")?,
            ),
            _ => return None,
        };
        Some(Self {
            node,
            qualifier,
            member,
        })
    }
}

/// Callback interface for [`walk`].
pub trait SyntaxVisitor<'t> {
    /// Called before the children of `node`; `Ok(false)` skips them.
    fn enter(&mut self, node: Node<'t>) -> Result<bool>;
}

impl<'t, F> SyntaxVisitor<'t> for F
where
    F: FnMut(Node<'t>) -> Result<bool>,
{
    fn enter(&mut self, node: Node<'t>) -> Result<bool> {
        self(node)
    }
}

/// Visit `root` and its descendants in source order, honouring the
/// visitor's continuation signal.
pub fn walk<'t, V>(root: Node<'t>, visitor: &mut V) -> Result<()>
where
    V: SyntaxVisitor<'t> + ?Sized,
{
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        if !visitor.enter(current)? {
            continue;
        }
        let mut cursor = current.walk();
        let children: Vec<_> = current.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}

/// Collect every qualified reference below `root` without pruning.
pub fn qualified_refs<'t>(root: Node<'t>) -> Vec<QualifiedRef<'t>> {
    let mut refs = Vec::new();
    let mut collect = |node: Node<'t>| -> Result<bool> {
        if let Some(qualified) = QualifiedRef::from_node(node) {
            refs.push(qualified);
        }
        Ok(true)
    };
    // The closure never fails.
    let _ = walk(root, &mut collect);
    refs
}
