use std::borrow::Cow;
use std::cmp::Ordering;

use crate::path;
use crate::types::value::{display, is_nullish, loose_eq, number_of, relate, truthy};
use crate::types::{BinaryOp, Builtin, Expr, Method, RuleError, Scope, UnaryOp, Value};

type Eval<'a> = Result<Option<Cow<'a, Value>>, RuleError>;

/// Counts evaluation steps so a pathological rule cannot stall the caller.
struct Budget {
    limit: usize,
    remaining: usize,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    fn step(&mut self) -> Result<(), RuleError> {
        if self.remaining == 0 {
            return Err(RuleError::BudgetExceeded { limit: self.limit });
        }
        self.remaining -= 1;
        Ok(())
    }
}

/// Evaluate a compiled expression against `scope`.
///
/// `Ok(None)` is an undefined result. Every node visited costs one step out of
/// `max_steps`.
pub(crate) fn evaluate<'a>(
    expr: &'a Expr,
    scope: Scope<'a>,
    max_steps: usize,
) -> Result<Option<Value>, RuleError> {
    let mut interp = Interpreter {
        scope,
        budget: Budget::new(max_steps),
    };
    Ok(interp.eval(expr)?.map(Cow::into_owned))
}

struct Interpreter<'a> {
    scope: Scope<'a>,
    budget: Budget,
}

impl<'a> Interpreter<'a> {
    fn eval(&mut self, expr: &'a Expr) -> Eval<'a> {
        self.budget.step()?;
        match expr {
            Expr::Literal(v) => Ok(Some(Cow::Borrowed(v))),
            Expr::Undefined => Ok(None),
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?.map_or(Value::Null, Cow::into_owned));
                }
                Ok(Some(Cow::Owned(Value::Array(values))))
            }
            Expr::Ident(name) => self
                .scope
                .binding(name)
                .map(|bound| bound.map(Cow::Borrowed))
                .ok_or_else(|| RuleError::UnknownIdentifier { name: name.clone() }),
            Expr::Member { object, property } => {
                let target = self.eval(object)?;
                property_of(target, property)
            }
            Expr::Index { object, index } => {
                let target = self.eval(object)?;
                let key = self.eval(index)?;
                property_of(target, &display(key.as_deref()))
            }
            Expr::Method {
                receiver,
                method,
                args,
            } => {
                let target = self.eval(receiver)?;
                let args = self.eval_args(args)?;
                call_method(*method, target.as_deref(), &args).map(|v| Some(Cow::Owned(v)))
            }
            Expr::Call { function, args } => {
                let args = self.eval_args(args)?;
                Ok(Some(Cow::Owned(call_builtin(*function, &args))))
            }
            Expr::Unary { op, operand } => {
                let v = self.eval(operand)?;
                let v = v.as_deref();
                let result = match op {
                    UnaryOp::Not => Value::Bool(!truthy(v)),
                    UnaryOp::Neg => Value::Number(-number_of(v)),
                    UnaryOp::Plus => Value::Number(number_of(v)),
                };
                Ok(Some(Cow::Owned(result)))
            }
            Expr::Binary { op, left, right } => self.binary(*op, left, right),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if truthy(self.eval(test)?.as_deref()) {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
        }
    }

    fn eval_args(&mut self, args: &'a [Expr]) -> Result<Vec<Option<Cow<'a, Value>>>, RuleError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn binary(&mut self, op: BinaryOp, left: &'a Expr, right: &'a Expr) -> Eval<'a> {
        let l = self.eval(left)?;
        match op {
            BinaryOp::And if !truthy(l.as_deref()) => return Ok(l),
            BinaryOp::Or if truthy(l.as_deref()) => return Ok(l),
            BinaryOp::Coalesce if !is_nullish(l.as_deref()) => return Ok(l),
            BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => return self.eval(right),
            _ => {}
        }

        let r = self.eval(right)?;
        let (l, r) = (l.as_deref(), r.as_deref());
        let result = match op {
            BinaryOp::Add => add(l, r),
            BinaryOp::Sub => Value::Number(number_of(l) - number_of(r)),
            BinaryOp::Mul => Value::Number(number_of(l) * number_of(r)),
            BinaryOp::Div => Value::Number(number_of(l) / number_of(r)),
            BinaryOp::Rem => Value::Number(number_of(l) % number_of(r)),
            BinaryOp::StrictEq => Value::Bool(l == r),
            BinaryOp::StrictNeq => Value::Bool(l != r),
            BinaryOp::LooseEq => Value::Bool(loose_eq(l, r)),
            BinaryOp::LooseNeq => Value::Bool(!loose_eq(l, r)),
            BinaryOp::Lt => Value::Bool(relate(l, r) == Some(Ordering::Less)),
            BinaryOp::Lte => Value::Bool(matches!(
                relate(l, r),
                Some(Ordering::Less | Ordering::Equal)
            )),
            BinaryOp::Gt => Value::Bool(relate(l, r) == Some(Ordering::Greater)),
            BinaryOp::Gte => Value::Bool(matches!(
                relate(l, r),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => {
                unreachable!("short-circuit operators return early")
            }
        };
        Ok(Some(Cow::Owned(result)))
    }
}

/// `+` concatenates when either side is a string, array or object.
fn add(l: Option<&Value>, r: Option<&Value>) -> Value {
    let stringy = |v: Option<&Value>| {
        matches!(
            v,
            Some(Value::String(_) | Value::Array(_) | Value::Object(_))
        )
    };
    if stringy(l) || stringy(r) {
        Value::String(display(l) + &display(r))
    } else {
        Value::Number(number_of(l) + number_of(r))
    }
}

fn receiver_name(value: Option<&Value>) -> &'static str {
    value.map_or("undefined", Value::type_name)
}

/// Property read: object keys, array indices and `length`.
fn property_of<'a>(target: Option<Cow<'a, Value>>, key: &str) -> Eval<'a> {
    let target = match target {
        Some(t) if !matches!(t.as_ref(), Value::Null) => t,
        other => {
            return Err(RuleError::NullAccess {
                property: key.to_owned(),
                receiver: receiver_name(other.as_deref()),
            });
        }
    };
    if key == "length" {
        match target.as_ref() {
            Value::String(s) => return Ok(Some(Cow::Owned(utf16_len(s)))),
            Value::Array(items) => return Ok(Some(Cow::Owned(count(items.len())))),
            _ => {}
        }
    }
    Ok(match target {
        Cow::Borrowed(v) => path::child(v, key).map(Cow::Borrowed),
        Cow::Owned(v) => path::child(&v, key).cloned().map(Cow::Owned),
    })
}

#[allow(clippy::cast_precision_loss)]
fn count(n: usize) -> Value {
    Value::Number(n as f64)
}

fn utf16_len(s: &str) -> Value {
    count(s.encode_utf16().count())
}

fn arg<'v>(args: &'v [Option<Cow<'_, Value>>], i: usize) -> Option<&'v Value> {
    args.get(i).and_then(Option::as_deref)
}

fn call_method(
    method: Method,
    receiver: Option<&Value>,
    args: &[Option<Cow<'_, Value>>],
) -> Result<Value, RuleError> {
    let Some(target) = receiver.filter(|v| !matches!(v, Value::Null)) else {
        return Err(RuleError::NullAccess {
            property: method.name().to_owned(),
            receiver: receiver_name(receiver),
        });
    };
    let not_callable = || RuleError::NotCallable {
        method: method.name(),
        receiver: target.type_name(),
    };

    Ok(match (method, target) {
        (Method::ToString, v) => Value::String(v.to_string()),
        (Method::Includes, Value::String(s)) => Value::Bool(s.contains(&display(arg(args, 0)))),
        (Method::Includes, Value::Array(items)) => {
            let needle = arg(args, 0);
            Value::Bool(items.iter().any(|item| Some(item) == needle))
        }
        (Method::StartsWith, Value::String(s)) => {
            Value::Bool(s.starts_with(&display(arg(args, 0))))
        }
        (Method::EndsWith, Value::String(s)) => Value::Bool(s.ends_with(&display(arg(args, 0)))),
        (Method::IndexOf, Value::String(s)) => {
            let needle = display(arg(args, 0));
            s.find(&needle)
                .map_or(Value::Number(-1.0), |byte| utf16_len(&s[..byte]))
        }
        (Method::IndexOf, Value::Array(items)) => {
            let needle = arg(args, 0);
            items
                .iter()
                .position(|item| Some(item) == needle)
                .map_or(Value::Number(-1.0), count)
        }
        (Method::Trim, Value::String(s)) => Value::String(s.trim().to_owned()),
        (Method::ToLowerCase, Value::String(s)) => Value::String(s.to_lowercase()),
        (Method::ToUpperCase, Value::String(s)) => Value::String(s.to_uppercase()),
        (Method::Join, Value::Array(items)) => {
            let separator = arg(args, 0).map_or_else(|| ",".to_owned(), Value::to_string);
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect();
            Value::String(parts.join(&separator))
        }
        _ => return Err(not_callable()),
    })
}

fn call_builtin(function: Builtin, args: &[Option<Cow<'_, Value>>]) -> Value {
    let first = arg(args, 0);
    match function {
        Builtin::Number if args.is_empty() => Value::Number(0.0),
        Builtin::Number => Value::Number(number_of(first)),
        Builtin::String if args.is_empty() => Value::String(String::new()),
        Builtin::String => Value::String(display(first)),
        Builtin::Boolean => Value::Bool(truthy(first)),
        Builtin::IsEmpty => Value::Bool(path::is_empty(first)),
    }
}
