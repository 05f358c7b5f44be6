//! Fully-parenthesized pretty printer used by the parser round-trip
//! property: `parse(pretty_print(parse(src))) == parse(src)` regardless of
//! how the original source was spaced or parenthesized.

use crate::parser::{ASTNode, ASTNodeType, UnaryOperator};

pub fn pretty_print(node: &ASTNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &ASTNode, out: &mut String) {
    match &node.node_type {
        ASTNodeType::Number(v) => {
            out.push_str(&format_number(*v));
        }
        ASTNodeType::Name(name) => out.push_str(name),
        ASTNodeType::UnaryOp { op, operand } => {
            out.push_str(match op {
                UnaryOperator::Plus => "+",
                UnaryOperator::Neg => "-",
                UnaryOperator::Not => "!",
            });
            out.push('(');
            write_node(operand, out);
            out.push(')');
        }
        ASTNodeType::BinOp { op, left, right } => {
            out.push('(');
            write_node(left, out);
            out.push(' ');
            out.push_str(op.as_str());
            out.push(' ');
            write_node(right, out);
            out.push(')');
        }
        ASTNodeType::Call { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_node(arg, out);
            }
            out.push(')');
        }
    }
}

fn format_number(v: f64) -> String {
    if v == v.trunc() && v.is_finite() {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
