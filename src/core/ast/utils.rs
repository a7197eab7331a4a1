//! Helper utilities for navigating tree-sitter syntax trees.

use tree_sitter::Node;

/// Convenience helper for extracting the UTF-8 source text represented by a
/// node. Returns `None` if the node points outside of the provided source.
pub fn node_text<'a>(node: Node<'a>, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}

/// Walk an AST tree iteratively, calling a callback for each node.
///
/// This performs a pre-order traversal, calling the callback on the node
/// before visiting its children. Uses an explicit stack to avoid
/// stack overflow on deeply nested ASTs.
pub fn walk_tree<'t, F>(node: Node<'t>, callback: &mut F)
where
    F: FnMut(Node<'t>),
{
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        callback(current);
        // Push children in reverse order so they're processed left-to-right
        let mut cursor = current.walk();
        let children: Vec<_> = current.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
}

/// Find an immediate child node of the given kind.
///
/// Returns the first child whose kind matches the provided string.
pub fn find_child_by_kind<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == kind {
            return Some(child);
        }
    }
    None
}

/// All immediate children of the given kind, in source order.
pub fn children_of_kind<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

/// All children attached to `field`, in source order.
pub fn field_children<'a>(node: Node<'a>, field: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Named children of a node, skipping comments.
pub fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Whether `inner` lies within `outer` (inclusive of equal ranges).
pub fn contains(outer: Node<'_>, inner: Node<'_>) -> bool {
    outer.start_byte() <= inner.start_byte() && inner.end_byte() <= outer.end_byte()
}
