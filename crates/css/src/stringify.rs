//! Serialize a stylesheet tree back to CSS text.

use core::fmt::{self, Write};

use crate::parser::{CssNode, Stylesheet};

const INDENT: &str = "  ";

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, &self.nodes, 0)
    }
}

impl fmt::Display for CssNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, 0)
    }
}

fn write_nodes<W: Write>(out: &mut W, nodes: &[CssNode], depth: usize) -> fmt::Result {
    for node in nodes {
        write_node(out, node, depth)?;
    }
    Ok(())
}

fn write_indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    Ok(())
}

fn write_block<W: Write>(out: &mut W, nodes: &[CssNode], depth: usize) -> fmt::Result {
    if nodes.is_empty() {
        return out.write_str(" {}\n");
    }
    out.write_str(" {\n")?;
    write_nodes(out, nodes, depth + 1)?;
    write_indent(out, depth)?;
    out.write_str("}\n")
}

fn write_node<W: Write>(out: &mut W, node: &CssNode, depth: usize) -> fmt::Result {
    write_indent(out, depth)?;
    match node {
        CssNode::Rule(rule) => {
            out.write_str(&rule.selectors.join(", "))?;
            write_block(out, &rule.nodes, depth)
        }
        CssNode::AtRule(at_rule) => {
            write!(out, "@{}", at_rule.name)?;
            if !at_rule.params.is_empty() {
                write!(out, " {}", at_rule.params)?;
            }
            match &at_rule.nodes {
                Some(nodes) => write_block(out, nodes, depth),
                None => out.write_str(";\n"),
            }
        }
        CssNode::Comment(comment) => writeln!(out, "/* {} */", comment.text),
        CssNode::Declaration(decl) => {
            write!(out, "{}: {}", decl.property, decl.value)?;
            if decl.important {
                out.write_str(" !important")?;
            }
            out.write_str(";\n")
        }
    }
}
