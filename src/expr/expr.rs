use crate::common::{column::Column, types::DataValue};
use crate::expr_vec_fmt;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Alias(Box<Expr>, String),
    Column(Column),
    Literal(DataValue),
    BinaryExpr(BinaryExpr),
    Not(Box<Expr>),
    IsNotNull(Box<Expr>),
    IsNull(Box<Expr>),
    Case(Case),
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: Operator,
    pub right: Box<Expr>,
}

impl BinaryExpr {
    pub fn new(left: Box<Expr>, op: Operator, right: Box<Expr>) -> Self {
        Self { left, op, right }
    }
}

pub fn binary_expr(left: Expr, op: Operator, right: Expr) -> Expr {
    Expr::BinaryExpr(BinaryExpr::new(Box::new(left), op, Box::new(right)))
}

/// searched case: the first `when` that evaluates to true picks its `then`,
/// otherwise `else_expr` (or null when absent)
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Case {
    pub when_then_expr: Vec<(Box<Expr>, Box<Expr>)>,
    pub else_expr: Option<Box<Expr>>,
}

impl std::fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn write_child(
            f: &mut std::fmt::Formatter<'_>,
            expr: &Expr,
            precedence: u8,
        ) -> std::fmt::Result {
            match expr {
                Expr::BinaryExpr(child) => {
                    let p = child.op.precedence();
                    if p == 0 || p < precedence {
                        write!(f, "({child})")?;
                    } else {
                        write!(f, "{child}")?;
                    }
                }
                _ => write!(f, "{expr}")?,
            }
            Ok(())
        }
        let precedence = self.op.precedence();
        write_child(f, self.left.as_ref(), precedence)?;
        write!(f, " {} ", self.op)?;
        write_child(f, self.right.as_ref(), precedence)
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    And,
    Or,
}

impl Operator {
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Or => 5,
            Operator::And => 10,
            Operator::NotEq
            | Operator::Eq
            | Operator::Lt
            | Operator::LtEq
            | Operator::Gt
            | Operator::GtEq => 20,
            Operator::Plus | Operator::Minus => 30,
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        binary_expr(self, Operator::Plus, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        binary_expr(self, Operator::Minus, rhs)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let display = match &self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::And => "AND",
            Operator::Or => "OR",
        };
        write!(f, "{display}")
    }
}

/// reference a column by name, the name is canonicalized
pub fn col(name: impl AsRef<str>) -> Expr {
    Expr::Column(Column::new(name))
}

/// start a searched case expression
pub fn when(condition: Expr, then: Expr) -> CaseBuilder {
    CaseBuilder {
        when_then_expr: vec![(Box::new(condition), Box::new(then))],
    }
}

/// `CASE WHEN condition THEN then ELSE otherwise END`
pub fn iff(condition: Expr, then: Expr, otherwise: Expr) -> Expr {
    when(condition, then).otherwise(otherwise)
}

/// accumulates `when` branches in order, finished by `otherwise` or `end`
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    when_then_expr: Vec<(Box<Expr>, Box<Expr>)>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: Expr, then: Expr) -> CaseBuilder {
        self.when_then_expr
            .push((Box::new(condition), Box::new(then)));
        self
    }

    pub fn otherwise(self, else_expr: Expr) -> Expr {
        Expr::Case(Case {
            when_then_expr: self.when_then_expr,
            else_expr: Some(Box::new(else_expr)),
        })
    }

    pub fn end(self) -> Expr {
        Expr::Case(Case {
            when_then_expr: self.when_then_expr,
            else_expr: None,
        })
    }
}

impl Expr {
    pub fn display_name(&self) -> Result<String> {
        create_name(self)
    }

    pub fn eq(self, other: Expr) -> Expr {
        binary_expr(self, Operator::Eq, other)
    }

    pub fn not_eq(self, other: Expr) -> Expr {
        binary_expr(self, Operator::NotEq, other)
    }

    pub fn gt_eq(self, other: Expr) -> Expr {
        binary_expr(self, Operator::GtEq, other)
    }

    pub fn lt(self, other: Expr) -> Expr {
        binary_expr(self, Operator::Lt, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        binary_expr(self, Operator::And, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        binary_expr(self, Operator::Or, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull(Box::new(self))
    }

    pub fn is_not_null(self) -> Expr {
        Expr::IsNotNull(Box::new(self))
    }

    pub fn alias(self, name: impl Into<String>) -> Expr {
        Expr::Alias(Box::new(self), name.into())
    }

    pub fn unalias(self) -> Expr {
        match self {
            Expr::Alias(expr, _) => *expr,
            _ => self,
        }
    }
}

fn create_name(e: &Expr) -> Result<String> {
    match e {
        Expr::Alias(_, name) => Ok(name.clone()),
        Expr::Column(c) => Ok(c.flat_name()),
        Expr::Literal(value) => Ok(format!("{value:?}")),
        Expr::BinaryExpr(binary_expr) => {
            let left = create_name(binary_expr.left.as_ref())?;
            let right = create_name(binary_expr.right.as_ref())?;
            Ok(format!("{}{}{}", left, binary_expr.op, right))
        }
        Expr::Not(expr) => {
            let expr = create_name(expr)?;
            Ok(format!("NOT {expr}"))
        }
        Expr::IsNull(expr) => {
            let expr = create_name(expr)?;
            Ok(format!("{expr} IS NULL"))
        }
        Expr::IsNotNull(expr) => {
            let expr = create_name(expr)?;
            Ok(format!("{expr} IS NOT NULL"))
        }
        Expr::Case(case) => {
            let mut name = "CASE ".to_string();
            for (when, then) in &case.when_then_expr {
                name += &format!("WHEN {} THEN {} ", create_name(when)?, create_name(then)?);
            }
            if let Some(e) = &case.else_expr {
                name += &format!("ELSE {} ", create_name(e)?);
            }
            name += "END";
            Ok(name)
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Alias(expr, alias) => write!(f, "{expr} AS {alias}"),
            Expr::Column(c) => write!(f, "{c}"),
            Expr::Literal(v) => write!(f, "{v:?}"),
            Expr::Not(expr) => write!(f, "NOT {expr}"),
            Expr::IsNull(expr) => write!(f, "{expr} IS NULL"),
            Expr::IsNotNull(expr) => write!(f, "{expr} IS NOT NULL"),
            Expr::BinaryExpr(expr) => write!(f, "{expr}"),
            Expr::Case(Case {
                when_then_expr,
                else_expr,
            }) => {
                write!(f, "CASE ")?;
                for (when, then) in when_then_expr {
                    write!(f, "WHEN {when} THEN {then} ")?;
                }
                if let Some(e) = else_expr {
                    write!(f, "ELSE {e} ")?;
                }
                write!(f, "END")
            }
        }
    }
}

#[macro_export]
macro_rules! expr_vec_fmt {
    ($ARRAY: expr) => {
        $ARRAY
            .iter()
            .map(|e| format!("{e}"))
            .collect::<Vec<String>>()
            .join(", ")
    };
}

/// comma separated display of a list of expressions
pub fn fmt_exprs(exprs: &[Expr]) -> String {
    expr_vec_fmt!(exprs)
}
