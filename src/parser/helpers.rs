//
//  helpers.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use tree_sitter::Node;

/// Get the full text of a node.
pub fn node_text(node: &Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

/// 1-based start line of a node.
pub fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}

/// 1-based end line of a node.
pub fn end_line_of(node: &Node) -> usize {
    node.end_position().row + 1
}

/// Named children, skipping comments.
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// All children bound to a repeated field (e.g. `name` in `import a, b`).
pub fn field_children<'t>(node: &Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// A flattened attribute chain such as `a.b.c`.
pub struct AttributeChain<'t> {
    pub dotted: String,
    /// True when the chain bottoms out at a plain identifier.
    pub rooted: bool,
    /// The innermost non-attribute expression of the chain.
    pub base: Node<'t>,
}

/// Flatten an `attribute` node by walking outward-to-inward, then reversing.
///
/// `foo().bar` keeps only `bar`: the call is not a name.
pub fn flatten_attribute<'t>(node: &Node<'t>, source: &[u8]) -> AttributeChain<'t> {
    let mut parts = Vec::new();
    let mut current = *node;

    while current.kind() == "attribute" {
        if let Some(attr) = current.child_by_field_name("attribute") {
            parts.push(node_text(&attr, source));
        }
        match current.child_by_field_name("object") {
            Some(object) => current = object,
            None => break,
        }
    }

    let rooted = current.kind() == "identifier";
    if rooted {
        parts.push(node_text(&current, source));
    }
    parts.reverse();

    AttributeChain {
        dotted: parts.join("."),
        rooted,
        base: current,
    }
}

/// Textual name of an expression if it is an identifier or a rooted
/// attribute chain (`Base`, `models.Model`).
pub fn dotted_name(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source)),
        "attribute" => Some(flatten_attribute(node, source).dotted),
        _ => None,
    }
}

/// Static base expressions of a `class_definition`: identifiers and
/// identifier-rooted attribute chains. Keyword arguments (`metaclass=`)
/// and computed bases are dropped.
pub fn class_bases<'t>(class: &Node<'t>, source: &[u8]) -> Vec<Node<'t>> {
    let Some(superclasses) = class.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    named_children(&superclasses)
        .into_iter()
        .filter(|base| match base.kind() {
            "identifier" => true,
            "attribute" => flatten_attribute(base, source).rooted,
            _ => false,
        })
        .collect()
}

/// Leaf targets of an assignment left-hand side, expanding tuple/list
/// destructuring (`a.x, (b, c.y) = ...`).
pub fn assignment_targets<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    match node.kind() {
        "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
        | "list" | "parenthesized_expression" | "list_splat_pattern" => named_children(node)
            .iter()
            .flat_map(|child| assignment_targets(child))
            .collect(),
        _ => vec![*node],
    }
}

/// Docstring of a `module` node or of a definition's `block` body: the
/// leading plain string-literal statement, cleaned like `inspect.cleandoc`.
pub fn docstring(body: &Node, source: &[u8]) -> Option<String> {
    let first = named_children(body).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let exprs = named_children(&first);
    if exprs.len() != 1 {
        return None;
    }
    let raw = string_literal_value(&exprs[0], source)?;
    Some(clean_docstring(&raw))
}

/// Value of a `string` / `concatenated_string` literal.
/// f-strings and bytes are not plain strings and yield `None`.
pub fn string_literal_value(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => {
            let text = node.utf8_text(source).ok()?;
            let prefix_len = text
                .find(|c: char| c == '"' || c == '\'')
                .unwrap_or(0);
            let prefix = text[..prefix_len].to_ascii_lowercase();
            if prefix.contains('f') || prefix.contains('b') {
                return None;
            }
            let quoted = &text[prefix_len..];
            let quote = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
                &quoted[..3]
            } else {
                &quoted[..1.min(quoted.len())]
            };
            let inner = quoted
                .strip_prefix(quote)
                .and_then(|s| s.strip_suffix(quote))
                .unwrap_or("");
            if prefix.contains('r') {
                Some(inner.to_string())
            } else {
                Some(unescape(inner))
            }
        }
        "concatenated_string" => {
            let mut value = String::new();
            for part in named_children(node) {
                value.push_str(&string_literal_value(&part, source)?);
            }
            Some(value)
        }
        _ => None,
    }
}

/// Resolve the common backslash escapes of a non-raw literal.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            // line continuation
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Trim a docstring the way `inspect.cleandoc` does: strip the first
/// line's leading blanks, dedent the rest by their common indentation,
/// drop leading and trailing blank lines.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim_start().to_string());
    for line in &lines[1..] {
        let cut = margin.min(indent_width(line));
        let start = line.char_indices().nth(cut).map_or(line.len(), |(i, _)| i);
        cleaned.push(line[start..].trim_end().to_string());
    }

    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

/// Leading whitespace in chars, not bytes.
fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use indoc::indoc;
    use std::path::Path;
    use tree_sitter::Tree;

    fn parse(source: &str) -> Tree {
        parse_source(Path::new("t.py"), source).unwrap()
    }

    /// First node of `kind` in document order.
    fn find<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
        children.into_iter().find_map(|c| find(c, kind))
    }

    #[test]
    fn test_flatten_attribute_chain() {
        let source = "a.b.c\n";
        let tree = parse(source);
        let attr = find(tree.root_node(), "attribute").unwrap();
        let chain = flatten_attribute(&attr, source.as_bytes());
        assert_eq!(chain.dotted, "a.b.c");
        assert!(chain.rooted);
        assert_eq!(chain.base.kind(), "identifier");
    }

    #[test]
    fn test_flatten_attribute_with_call_base() {
        let source = "make().value\n";
        let tree = parse(source);
        let attr = find(tree.root_node(), "attribute").unwrap();
        let chain = flatten_attribute(&attr, source.as_bytes());
        assert_eq!(chain.dotted, "value");
        assert!(!chain.rooted);
        assert_eq!(chain.base.kind(), "call");
    }

    #[test]
    fn test_assignment_targets_expand_tuples() {
        let source = "self.a, (b, c.d) = 1, (2, 3)\n";
        let tree = parse(source);
        let assignment = find(tree.root_node(), "assignment").unwrap();
        let left = assignment.child_by_field_name("left").unwrap();
        let kinds: Vec<&str> = assignment_targets(&left).iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec!["attribute", "identifier", "attribute"]);
    }

    #[test]
    fn test_class_bases_skip_keywords_and_calls() {
        let source = "class C(Base, models.Model, make(), metaclass=Meta):\n    pass\n";
        let tree = parse(source);
        let class = find(tree.root_node(), "class_definition").unwrap();
        let bases: Vec<String> = class_bases(&class, source.as_bytes())
            .iter()
            .filter_map(|b| dotted_name(b, source.as_bytes()))
            .collect();
        assert_eq!(bases, vec!["Base", "models.Model"]);
    }

    #[test]
    fn test_module_docstring() {
        let source = indoc! {r#"
            """Top level doc.

                Indented detail.
            """
            x = 1
        "#};
        let tree = parse(source);
        let doc = docstring(&tree.root_node(), source.as_bytes());
        assert_eq!(doc.as_deref(), Some("Top level doc.\n\nIndented detail."));
    }

    #[test]
    fn test_fstring_and_bytes_are_not_docstrings() {
        for source in ["f\"\"\"doc {x}\"\"\"\n", "b'doc'\n", "x = 'doc'\n"] {
            let tree = parse(source);
            assert_eq!(docstring(&tree.root_node(), source.as_bytes()), None, "{source}");
        }
    }

    #[test]
    fn test_string_literal_escapes() {
        let source = "'a\\tb'\n";
        let tree = parse(source);
        let string = find(tree.root_node(), "string").unwrap();
        assert_eq!(
            string_literal_value(&string, source.as_bytes()).as_deref(),
            Some("a\tb")
        );
    }

    #[test]
    fn test_clean_docstring_strips_blank_edges() {
        assert_eq!(clean_docstring("\n    Summary.\n    "), "Summary.");
        assert_eq!(clean_docstring("One line"), "One line");
    }

    #[test]
    fn test_clean_docstring_handles_unicode_indentation() {
        assert_eq!(clean_docstring("one\n  two\n\u{3000}three"), "one\n two\nthree");
        assert_eq!(
            clean_docstring("one\n\u{a0}\u{a0}two\n\u{3000}three"),
            "one\n\u{a0}two\nthree"
        );
        assert_eq!(clean_docstring("one\n\u{3000}\u{3000}two"), "one\ntwo");
    }
}
