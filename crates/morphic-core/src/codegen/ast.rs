//! Expression tree of emitted closures and its source rendering
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::signature::Signature;
use super::syntax::quote_str;
use crate::value::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Built-in used for member access on names that are not identifiers
pub const GETATTR: &str = "getattr";

/// A single expression of an emitted body
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Parameter or captured name
    Name(String),
    /// Inlined literal; always literal-safe
    Literal(Value),
    /// Call of a named callable
    Call { func: String, args: Vec<Argument> },
    /// `target.name`
    Attribute { target: Box<Expr>, name: String },
    /// `getattr(target, 'name')`
    DynamicAttribute { target: Box<Expr>, name: String },
    /// `target[key]` with a literal key
    Subscript { target: Box<Expr>, key: Value },
}

/// One argument of an emitted call
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(Expr),
    Keyword(String, Expr),
    /// `*expr`
    Starred(Expr),
    /// `**expr`
    DoubleStarred(Expr),
}

impl Argument {
    pub fn expr(&self) -> &Expr {
        match self {
            Argument::Positional(expr)
            | Argument::Keyword(_, expr)
            | Argument::Starred(expr)
            | Argument::DoubleStarred(expr) => expr,
        }
    }
}

impl Expr {
    /// Every name the expression reads from its scope
    pub fn free_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Name(name) => {
                names.insert(name);
            }
            Expr::Literal(_) => {}
            Expr::Call { func, args } => {
                names.insert(func);
                for arg in args {
                    arg.expr().collect_names(names);
                }
            }
            Expr::Attribute { target, .. }
            | Expr::DynamicAttribute { target, .. }
            | Expr::Subscript { target, .. } => target.collect_names(names),
        }
    }

    /// Numeric literals need parentheses before `.` and `[`
    fn fmt_target(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::Int(_) | Value::Float(_)) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Name(name) => f.write_str(name),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Call { func, args } => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Attribute { target, name } => {
                target.fmt_target(f)?;
                write!(f, ".{}", name)
            }
            Expr::DynamicAttribute { target, name } => {
                let mut quoted = String::new();
                quote_str(&mut quoted, name);
                write!(f, "{}({}, {})", GETATTR, target, quoted)
            }
            Expr::Subscript { target, key } => {
                target.fmt_target(f)?;
                write!(f, "[{}]", key)
            }
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Positional(expr) => write!(f, "{}", expr),
            Argument::Keyword(key, expr) => write!(f, "{}={}", key, expr),
            Argument::Starred(expr) => write!(f, "*{}", expr),
            Argument::DoubleStarred(expr) => write!(f, "**{}", expr),
        }
    }
}

/// A single-expression function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    /// Declared signature, annotations included; rendering strips them
    pub signature: Signature,
    pub body: Expr,
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "def {}{}:", self.name, self.signature.render_parameters())?;
        writeln!(f, "    return {}", self.body)
    }
}
