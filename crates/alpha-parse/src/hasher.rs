//! Structural keying for per-date memoization in the scalar evaluator.
//!
//! Two syntactically different but structurally identical sub-expressions
//! (same literal values, same field names, same operator tree) must hash to
//! the same key so the evaluator's memo cache treats them as one computation.
//! Source spans are deliberately excluded — they vary with surrounding
//! whitespace and would defeat the whole point of a structural key.

use std::hash::{Hash, Hasher};
use rustc_hash::FxHasher;

use crate::parser::{ASTNode, ASTNodeType};

pub fn structural_key(node: &ASTNode) -> u64 {
    let mut hasher = FxHasher::default();
    hash_node(node, &mut hasher);
    hasher.finish()
}

fn hash_node(node: &ASTNode, hasher: &mut FxHasher) {
    match &node.node_type {
        ASTNodeType::Number(v) => {
            0u8.hash(hasher);
            v.to_bits().hash(hasher);
        }
        ASTNodeType::Name(name) => {
            1u8.hash(hasher);
            name.hash(hasher);
        }
        ASTNodeType::UnaryOp { op, operand } => {
            2u8.hash(hasher);
            op.hash(hasher);
            hash_node(operand, hasher);
        }
        ASTNodeType::BinOp { op, left, right } => {
            3u8.hash(hasher);
            op.hash(hasher);
            hash_node(left, hasher);
            hash_node(right, hasher);
        }
        ASTNodeType::Call { name, args } => {
            4u8.hash(hasher);
            name.hash(hasher);
            args.len().hash(hasher);
            for arg in args {
                hash_node(arg, hasher);
            }
        }
    }
}
