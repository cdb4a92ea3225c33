// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use indexmap::{IndexMap, IndexSet};
use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operator {
    // binary
    Add,
    Subtract,
    Multiply,
    Divide,
    Pow,
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    // unary
    Negative,
    Not,
    Sin,
    Cos,
    Tan,
    Exp,
    Sqrt,
    Ln,
}

impl Operator {
    pub fn arity(&self) -> usize {
        match self {
            Operator::Negative
            | Operator::Not
            | Operator::Sin
            | Operator::Cos
            | Operator::Tan
            | Operator::Exp
            | Operator::Sqrt
            | Operator::Ln => 1,
            _ => 2,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::Less
                | Operator::LessEqual
                | Operator::Greater
                | Operator::GreaterEqual
        )
    }

    /// Higher values bind tighter.
    fn priority(&self) -> u8 {
        match self {
            Operator::Or => 0,
            Operator::And => 1,
            Operator::Equal
            | Operator::NotEqual
            | Operator::Less
            | Operator::LessEqual
            | Operator::Greater
            | Operator::GreaterEqual => 2,
            Operator::Add | Operator::Subtract => 3,
            Operator::Multiply | Operator::Divide => 4,
            Operator::Pow => 5,
            Operator::Negative | Operator::Not => 6,
            _ => 7,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Pow => "^",
            Operator::And => "&",
            Operator::Or => "|",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Negative => "-",
            Operator::Not => "!",
            Operator::Sin => "sin",
            Operator::Cos => "cos",
            Operator::Tan => "tan",
            Operator::Exp => "exp",
            Operator::Sqrt => "sqrt",
            Operator::Ln => "ln",
        }
    }
}

/// Symbolic condition or assignment term. Expressions are plain values: copying is `clone`.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Bool(bool),
    Constant(f64),
    Variable(String),
    Operation(Operator, Vec<Expression>),
}

impl Expression {
    pub const TRUE: Expression = Expression::Bool(true);
    pub const FALSE: Expression = Expression::Bool(false);

    pub fn var(name: &str) -> Self {
        Expression::Variable(name.to_string())
    }

    pub fn constant(value: f64) -> Self {
        Expression::Constant(value)
    }

    pub fn unary(op: Operator, e: Expression) -> Self {
        debug_assert_eq!(op.arity(), 1);
        Expression::Operation(op, vec![e])
    }

    pub fn binary(op: Operator, a: Expression, b: Expression) -> Self {
        debug_assert_eq!(op.arity(), 2);
        Expression::Operation(op, vec![a, b])
    }

    /// Short-circuiting conjunction.
    pub fn and(a: Expression, b: Expression) -> Self {
        match (&a, &b) {
            (Expression::Bool(false), _) | (_, Expression::Bool(false)) => Expression::FALSE,
            (Expression::Bool(true), _) => b,
            (_, Expression::Bool(true)) => a,
            _ => Expression::binary(Operator::And, a, b),
        }
    }

    /// Short-circuiting disjunction.
    pub fn or(a: Expression, b: Expression) -> Self {
        match (&a, &b) {
            (Expression::Bool(true), _) | (_, Expression::Bool(true)) => Expression::TRUE,
            (Expression::Bool(false), _) => b,
            (_, Expression::Bool(false)) => a,
            _ => Expression::binary(Operator::Or, a, b),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expression::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Expression::Bool(false))
    }

    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::Operation(_, children) => children,
            _ => &[],
        }
    }

    /// Calls `f` on every node in pre-order.
    pub fn for_each_node(&self, mut f: impl FnMut(&Expression)) {
        let mut todo = vec![self];
        while let Some(e) = todo.pop() {
            f(e);
            // push in reverse to visit children left to right
            todo.extend(e.children().iter().rev());
        }
    }

    /// Free variables in order of first occurrence.
    pub fn variables(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        self.for_each_node(|e| {
            if let Expression::Variable(name) = e {
                out.insert(name.clone());
            }
        });
        out
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        let mut found = false;
        self.for_each_node(|e| {
            if let Expression::Variable(n) = e {
                found |= n == name;
            }
        });
        found
    }

    pub fn contains_operator(&self, op: Operator) -> bool {
        let mut found = false;
        self.for_each_node(|e| {
            if let Expression::Operation(o, _) = e {
                found |= *o == op;
            }
        });
        found
    }

    /// Bottom-up rewrite. `f` receives every node after its children were rewritten.
    pub fn map(self, f: &mut impl FnMut(Expression) -> Expression) -> Expression {
        match self {
            Expression::Operation(op, children) => {
                let children = children.into_iter().map(|c| c.map(f)).collect();
                f(Expression::Operation(op, children))
            }
            other => f(other),
        }
    }

    /// Replaces variables by the expressions they map to.
    pub fn substitute(self, values: &IndexMap<String, Expression>) -> Expression {
        self.map(&mut |e| match e {
            Expression::Variable(name) => match values.get(&name) {
                Some(value) => value.clone(),
                None => Expression::Variable(name),
            },
            other => other,
        })
    }

    /// Renames variables. Unlike chained substitutions this is simultaneous, so swaps work.
    pub fn rename_variables(self, names: &IndexMap<String, String>) -> Expression {
        self.map(&mut |e| match e {
            Expression::Variable(name) => match names.get(&name) {
                Some(new_name) => Expression::Variable(new_name.clone()),
                None => Expression::Variable(name),
            },
            other => other,
        })
    }

    /// Constant folding of arithmetic, comparisons and boolean connectives.
    pub fn simplify(self) -> Expression {
        self.map(&mut simplify_node)
    }
}

fn simplify_node(e: Expression) -> Expression {
    let (op, children) = match e {
        Expression::Operation(op, children) => (op, children),
        other => return other,
    };
    if matches!(op, Operator::And | Operator::Or) && children.len() == 2 {
        let mut operands = children.into_iter();
        return match (op, operands.next(), operands.next()) {
            (Operator::And, Some(a), Some(b)) => Expression::and(a, b),
            (_, Some(a), Some(b)) => Expression::or(a, b),
            _ => unreachable!("binary connective with two operands"),
        };
    }
    match (op, children.as_slice()) {
        (Operator::Not, [Expression::Bool(value)]) => Expression::Bool(!value),
        (Operator::Negative, [Expression::Constant(value)]) => Expression::Constant(-value),
        (op, [Expression::Constant(value)]) if op.arity() == 1 => {
            let folded = match op {
                Operator::Sin => value.sin(),
                Operator::Cos => value.cos(),
                Operator::Tan => value.tan(),
                Operator::Exp => value.exp(),
                Operator::Sqrt => value.sqrt(),
                Operator::Ln => value.ln(),
                _ => return Expression::Operation(op, children),
            };
            Expression::Constant(folded)
        }
        (op, [Expression::Constant(a), Expression::Constant(b)]) if op.is_comparison() => {
            let result = match op {
                Operator::Equal => a == b,
                Operator::NotEqual => a != b,
                Operator::Less => a < b,
                Operator::LessEqual => a <= b,
                Operator::Greater => a > b,
                Operator::GreaterEqual => a >= b,
                _ => unreachable!("not a comparison: {op:?}"),
            };
            Expression::Bool(result)
        }
        (op, [Expression::Constant(a), Expression::Constant(b)]) => {
            let folded = match op {
                Operator::Add => a + b,
                Operator::Subtract => a - b,
                Operator::Multiply => a * b,
                // keep division by zero symbolic
                Operator::Divide if *b != 0.0 => a / b,
                Operator::Pow => a.powf(*b),
                _ => return Expression::Operation(op, children),
            };
            Expression::Constant(folded)
        }
        (op, [a, b]) if op.is_comparison() && a == b && !matches!(a, Expression::Constant(_)) => {
            // x == x, x <= x, ...
            let reflexive = matches!(
                op,
                Operator::Equal | Operator::LessEqual | Operator::GreaterEqual
            );
            Expression::Bool(reflexive)
        }
        _ => Expression::Operation(op, children),
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_expr(self, f, 0)
    }
}

fn write_expr(e: &Expression, f: &mut Formatter<'_>, outer_priority: u8) -> std::fmt::Result {
    match e {
        Expression::Bool(true) => write!(f, "true"),
        Expression::Bool(false) => write!(f, "false"),
        Expression::Constant(value) => write!(f, "{value}"),
        Expression::Variable(name) => write!(f, "{name}"),
        Expression::Operation(op, children) => {
            let priority = op.priority();
            match children.as_slice() {
                [a, b] => {
                    let parens = priority < outer_priority;
                    if parens {
                        write!(f, "(")?;
                    }
                    write_expr(a, f, priority)?;
                    write!(f, " {} ", op.symbol())?;
                    // right operand binds tighter to keep non-associative ops correct
                    write_expr(b, f, priority + 1)?;
                    if parens {
                        write!(f, ")")?;
                    }
                    Ok(())
                }
                [a] if matches!(op, Operator::Negative | Operator::Not) => {
                    write!(f, "{}", op.symbol())?;
                    write_expr(a, f, priority)
                }
                _ => {
                    write!(f, "{}(", op.symbol())?;
                    for (ii, c) in children.iter().enumerate() {
                        if ii > 0 {
                            write!(f, ", ")?;
                        }
                        write_expr(c, f, 0)?;
                    }
                    write!(f, ")")
                }
            }
        }
    }
}
