use std::fmt;

use super::Value;

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

/// Binary operators, including the short-circuiting logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    StrictEq,
    StrictNeq,
    LooseEq,
    LooseNeq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Coalesce,
}

/// Whitelisted methods callable on strings and arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Includes,
    StartsWith,
    EndsWith,
    IndexOf,
    Trim,
    ToLowerCase,
    ToUpperCase,
    ToString,
    Join,
}

/// Whitelisted global functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Number,
    String,
    Boolean,
    IsEmpty,
}

/// Compiled rule expression.
///
/// Produced once per rule source when a form is loaded and then evaluated
/// against each data snapshot without re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Undefined,
    Array(Vec<Expr>),
    Ident(String),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Method {
        receiver: Box<Expr>,
        method: Method,
        args: Vec<Expr>,
    },
    Call {
        function: Builtin,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

impl Method {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "includes" => Method::Includes,
            "startsWith" => Method::StartsWith,
            "endsWith" => Method::EndsWith,
            "indexOf" => Method::IndexOf,
            "trim" => Method::Trim,
            "toLowerCase" => Method::ToLowerCase,
            "toUpperCase" => Method::ToUpperCase,
            "toString" => Method::ToString,
            "join" => Method::Join,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Method::Includes => "includes",
            Method::StartsWith => "startsWith",
            Method::EndsWith => "endsWith",
            Method::IndexOf => "indexOf",
            Method::Trim => "trim",
            Method::ToLowerCase => "toLowerCase",
            Method::ToUpperCase => "toUpperCase",
            Method::ToString => "toString",
            Method::Join => "join",
        }
    }

    /// Accepted argument counts (inclusive).
    pub(crate) fn arity(self) -> (usize, usize) {
        match self {
            Method::Includes | Method::StartsWith | Method::EndsWith | Method::IndexOf => (1, 1),
            Method::Trim | Method::ToLowerCase | Method::ToUpperCase | Method::ToString => (0, 0),
            Method::Join => (0, 1),
        }
    }
}

impl Builtin {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Number" => Builtin::Number,
            "String" => Builtin::String,
            "Boolean" => Builtin::Boolean,
            "isEmpty" => Builtin::IsEmpty,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Number => "Number",
            Builtin::String => "String",
            Builtin::Boolean => "Boolean",
            Builtin::IsEmpty => "isEmpty",
        }
    }

    /// Accepted argument counts (inclusive).
    pub(crate) fn arity(self) -> (usize, usize) {
        match self {
            Builtin::Number | Builtin::String | Builtin::Boolean => (0, 1),
            Builtin::IsEmpty => (1, 1),
        }
    }
}

impl Expr {
    /// Height of the expression tree; a leaf is 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let children = match self {
            Expr::Literal(_) | Expr::Undefined | Expr::Ident(_) => return 1,
            Expr::Array(items) => items.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::Member { object, .. } => object.depth(),
            Expr::Index { object, index } => object.depth().max(index.depth()),
            Expr::Method { receiver, args, .. } => args
                .iter()
                .map(Expr::depth)
                .fold(receiver.depth(), usize::max),
            Expr::Call { args, .. } => args.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::Unary { operand, .. } => operand.depth(),
            Expr::Binary { left, right, .. } => left.depth().max(right.depth()),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => test.depth().max(consequent.depth()).max(alternate.depth()),
        };
        children + 1
    }

    /// The static dot path of a member chain rooted at an identifier, e.g.
    /// `data.address.city` gives `("data", ["address", "city"])`.
    ///
    /// Returns `None` when any link is computed (`data[key]` with a
    /// non-literal key) or the chain is not rooted at an identifier.
    #[must_use]
    pub fn static_path(&self) -> Option<(&str, Vec<String>)> {
        match self {
            Expr::Ident(name) => Some((name.as_str(), Vec::new())),
            Expr::Member { object, property } => {
                let (root, mut segments) = object.static_path()?;
                segments.push(property.clone());
                Some((root, segments))
            }
            Expr::Index { object, index } => {
                let key = match index.as_ref() {
                    Expr::Literal(Value::String(s)) => s.clone(),
                    Expr::Literal(n @ Value::Number(_)) => n.to_string(),
                    _ => return None,
                };
                let (root, mut segments) = object.static_path()?;
                segments.push(key);
                Some((root, segments))
            }
            _ => None,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNeq => "!==",
            BinaryOp::LooseEq => "==",
            BinaryOp::LooseNeq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Coalesce => "??",
        })
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

/// Write the object of a postfix operation, parenthesized unless it already
/// binds at least as tightly as postfix.
fn write_receiver(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::Literal(Value::Number(_))
        | Expr::Unary { .. }
        | Expr::Binary { .. }
        | Expr::Conditional { .. } => write!(f, "({expr})"),
        _ => write!(f, "{expr}"),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::String(s)) => write!(f, "{s:?}"),
            Expr::Literal(v @ (Value::Array(_) | Value::Object(_))) => {
                write!(f, "{}", serde_json::Value::from(v.clone()))
            }
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Undefined => f.write_str("undefined"),
            Expr::Array(items) => {
                f.write_str("[")?;
                write_args(f, items)?;
                f.write_str("]")
            }
            Expr::Ident(name) => f.write_str(name),
            Expr::Member { object, property } => {
                write_receiver(f, object)?;
                write!(f, ".{property}")
            }
            Expr::Index { object, index } => {
                write_receiver(f, object)?;
                write!(f, "[{index}]")
            }
            Expr::Method {
                receiver,
                method,
                args,
            } => {
                write_receiver(f, receiver)?;
                write!(f, ".{}(", method.name())?;
                write_args(f, args)?;
                f.write_str(")")
            }
            Expr::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                write_args(f, args)?;
                f.write_str(")")
            }
            Expr::Unary { op, operand } => write!(f, "{op}{operand}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => write!(f, "({test} ? {consequent} : {alternate})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(object: Expr, property: &str) -> Expr {
        Expr::Member {
            object: Box::new(object),
            property: property.to_owned(),
        }
    }

    #[test]
    fn static_path_of_member_chain() {
        let expr = member(member(Expr::Ident("data".into()), "address"), "city");
        let (root, segments) = expr.static_path().unwrap();
        assert_eq!(root, "data");
        assert_eq!(segments, vec!["address".to_owned(), "city".to_owned()]);
    }

    #[test]
    fn static_path_through_literal_index() {
        let expr = member(
            Expr::Index {
                object: Box::new(member(Expr::Ident("data".into()), "items")),
                index: Box::new(Expr::Literal(Value::from(0_i64))),
            },
            "sku",
        );
        let (_, segments) = expr.static_path().unwrap();
        assert_eq!(segments, vec!["items", "0", "sku"]);
    }

    #[test]
    fn computed_index_has_no_static_path() {
        let expr = Expr::Index {
            object: Box::new(Expr::Ident("data".into())),
            index: Box::new(Expr::Ident("value".into())),
        };
        assert!(expr.static_path().is_none());
    }

    #[test]
    fn depth_counts_the_longest_branch() {
        assert_eq!(Expr::Undefined.depth(), 1);
        assert_eq!(Expr::Array(vec![]).depth(), 1);
        let expr = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(member(member(Expr::Ident("data".into()), "a"), "b")),
            right: Box::new(Expr::Literal(Value::from(1_i64))),
        };
        assert_eq!(expr.depth(), 4);
    }

    #[test]
    fn method_names_round_trip() {
        for name in ["includes", "trim", "join", "toUpperCase"] {
            assert_eq!(Method::from_name(name).unwrap().name(), name);
        }
        assert!(Method::from_name("invalid").is_none());
        assert!(Builtin::from_name("eval").is_none());
    }

    #[test]
    fn display_is_fully_parenthesized() {
        let expr = Expr::Binary {
            op: BinaryOp::And,
            left: Box::new(member(Expr::Ident("data".into()), "a")),
            right: Box::new(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(Expr::Literal(Value::Bool(false))),
            }),
        };
        assert_eq!(expr.to_string(), "(data.a && !false)");
    }
}
