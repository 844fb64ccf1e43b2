//! LDIF reading: logical-line assembly, attribute parsing and DN helpers.

pub mod dn;
pub mod parser;

pub use dn::{parent_dn, rdn};
pub use parser::{parse, parse_str, parse_with, ParseOptions};
