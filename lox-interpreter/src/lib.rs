pub mod environment;
pub mod interpreter;
pub mod lox;
pub mod value;

pub use lox::{Lox, RunReport};
