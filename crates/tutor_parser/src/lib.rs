pub mod error;
pub mod parser;

pub use error::ParseError;
pub use parser::{is_known_function, parse, parse_statement, Statement, KNOWN_FUNCTIONS, TRIG_FUNCTIONS};
