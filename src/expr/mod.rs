pub mod expr;
pub mod expr_schema;
pub mod literal;
pub mod logical_plan;
pub mod type_coercion;
