//! Message handling - turning raw input into structured messages

pub mod parser;

pub use parser::MessageParser;
