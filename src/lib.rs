pub mod common;
pub mod dataframe;
pub mod error;
pub mod execution;
pub mod expr;
pub mod na;
pub mod session;
pub mod storage;
