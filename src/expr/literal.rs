use crate::common::types::DataValue;
use crate::expr::expr::Expr;

/// values that can be embedded in an expression tree as a constant
pub trait Literal {
    fn lit(&self) -> Expr;
}

pub fn lit<T: Literal>(n: T) -> Expr {
    n.lit()
}

impl Literal for &str {
    fn lit(&self) -> Expr {
        Expr::Literal(DataValue::Utf8(Some(self.to_string())))
    }
}

impl Literal for String {
    fn lit(&self) -> Expr {
        Expr::Literal(DataValue::Utf8(Some(self.clone())))
    }
}

impl Literal for DataValue {
    fn lit(&self) -> Expr {
        Expr::Literal(self.clone())
    }
}

macro_rules! make_literal {
    ($TYPE: ty, $SCALAR: ident) => {
        impl Literal for $TYPE {
            fn lit(&self) -> Expr {
                Expr::Literal(DataValue::$SCALAR(Some(*self)))
            }
        }
    };
}

make_literal!(bool, Boolean);
make_literal!(f32, Float32);
make_literal!(f64, Float64);
make_literal!(i32, Int32);
make_literal!(i64, Int64);
