//! Auxiliary AST walk: collects referenced field names, function names, and
//! a best-effort window-size hint for the known rolling-window functions.
//! This never touches the function registry — it is a pure syntactic pass,
//! usable before any evaluator exists.

use std::collections::{BTreeMap, BTreeSet};

use crate::parser::{ASTNode, ASTNodeType};

/// Names of built-ins whose first argument is conventionally the series and
/// whose last argument is conventionally a literal window length. The
/// heuristic below only fires for calls to one of these names — it makes no
/// attempt to discover windows for arbitrary/unknown functions.
const WINDOWED_FUNCTIONS: &[&str] = &[
    "ts_mean",
    "ts_std",
    "ts_sum",
    "ts_rank",
    "delay",
    "ts_corr",
    "decay_linear",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub fields: BTreeSet<String>,
    pub functions: BTreeSet<String>,
    /// Referenced field name → set of window sizes it's used with.
    pub windows: BTreeMap<String, BTreeSet<i64>>,
}

pub fn analyze(node: &ASTNode) -> Analysis {
    let mut analysis = Analysis::default();
    walk(node, &mut analysis);
    analysis
}

fn walk(node: &ASTNode, analysis: &mut Analysis) {
    match &node.node_type {
        ASTNodeType::Number(_) => {}
        ASTNodeType::Name(name) => {
            analysis.fields.insert(name.clone());
        }
        ASTNodeType::UnaryOp { operand, .. } => walk(operand, analysis),
        ASTNodeType::BinOp { left, right, .. } => {
            walk(left, analysis);
            walk(right, analysis);
        }
        ASTNodeType::Call { name, args } => {
            analysis.functions.insert(name.clone());
            if WINDOWED_FUNCTIONS.contains(&name.as_str()) {
                if let (Some(ASTNodeType::Name(field)), Some(ASTNodeType::Number(n))) = (
                    args.first().map(|a| &a.node_type),
                    args.last().map(|a| &a.node_type),
                ) {
                    if args.len() >= 2 && n.fract() == 0.0 {
                        analysis
                            .windows
                            .entry(field.clone())
                            .or_default()
                            .insert(*n as i64);
                    }
                }
            }
            for arg in args {
                walk(arg, analysis);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn collects_fields_functions_and_windows() {
        let ast = parse("ts_mean(returns, 10) + rank(close)").unwrap();
        let analysis = analyze(&ast);
        assert_eq!(
            analysis.fields,
            BTreeSet::from(["returns".to_string(), "close".to_string()])
        );
        assert_eq!(
            analysis.functions,
            BTreeSet::from(["ts_mean".to_string(), "rank".to_string()])
        );
        assert_eq!(
            analysis.windows.get("returns"),
            Some(&BTreeSet::from([10]))
        );
        assert!(analysis.windows.get("close").is_none());
        assert!(analysis.windows.get("ts_mean").is_none());
    }

    #[test]
    fn windows_are_keyed_by_field_not_function() {
        let ast = parse("ts_mean(returns, 10) + ts_mean(close, 10)").unwrap();
        let analysis = analyze(&ast);
        assert_eq!(
            analysis.windows.get("returns"),
            Some(&BTreeSet::from([10]))
        );
        assert_eq!(analysis.windows.get("close"), Some(&BTreeSet::from([10])));
        assert!(analysis.windows.get("ts_mean").is_none());
    }

    #[test]
    fn ignores_non_literal_window_argument() {
        let ast = parse("ts_mean(returns, 5 + 5)").unwrap();
        let analysis = analyze(&ast);
        assert!(analysis.windows.get("returns").is_none());
    }
}
