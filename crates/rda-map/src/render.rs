//! Renderings of a business object map.
//!
//! Two views of the same logical tree: a structured `bo`-tagged document
//! (order-preserving, UTF-8, escaped) and a human-readable indented text
//! rendering carrying the same information.

use std::fmt::Write;

use crate::node::BusinessObjectMap;

/// Serialize the map as a structured document.
///
/// Each node is a `bo` element with `id`, `name`, `type`, `depositStatus`,
/// zero or more `alternateid` children, and nested `bo` elements in child
/// order.
pub fn to_document(map: &BusinessObjectMap) -> String {
    let mut out = String::new();
    write_element(&mut out, map, 0);
    out
}

/// Render the map as indented text, one node per line, nesting shown by
/// indentation. Derived from the same tree as [`to_document`].
pub fn to_text(map: &BusinessObjectMap) -> String {
    let mut out = String::new();
    write_line(&mut out, map, 0);
    out
}

fn write_element(out: &mut String, node: &BusinessObjectMap, depth: usize) {
    let pad = "  ".repeat(depth);
    let _ = writeln!(out, "{pad}<bo>");
    let _ = writeln!(out, "{pad}  <id>{}</id>", escape(node.id.as_str()));
    let _ = writeln!(out, "{pad}  <name>{}</name>", escape(&node.name));
    let _ = writeln!(out, "{pad}  <type>{}</type>", node.kind.label());
    let _ = writeln!(
        out,
        "{pad}  <depositStatus>{}</depositStatus>",
        node.deposit_status.label()
    );
    for alternate in &node.alternate_ids {
        let _ = writeln!(
            out,
            "{pad}  <alternateid>{}</alternateid>",
            escape(alternate)
        );
    }
    for child in &node.children {
        write_element(out, child, depth + 1);
    }
    let _ = writeln!(out, "{pad}</bo>");
}

fn write_line(out: &mut String, node: &BusinessObjectMap, depth: usize) {
    let pad = "  ".repeat(depth);
    let _ = write!(
        out,
        "{pad}{}: {} ({}) [{}]",
        node.kind.label(),
        node.name,
        node.id,
        node.deposit_status.label()
    );
    if !node.alternate_ids.is_empty() {
        let _ = write!(out, " also known as {}", node.alternate_ids.join(", "));
    }
    let _ = writeln!(out);
    for child in &node.children {
        write_line(out, child, depth + 1);
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
