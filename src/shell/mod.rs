pub mod ast;
pub mod commands;
pub mod context;
pub mod error;
pub mod parser;
pub mod result;
