pub mod cd;
pub mod drives;
pub mod help;
pub mod pwd;
