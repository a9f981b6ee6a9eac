pub mod util;
pub use crate::util::{LispError, Result};
pub mod heap;
pub use crate::heap::{CallFrame, ConsCell, Heap, MemoryLocation, UserProc};
pub mod value;
pub use crate::value::Sexp;
pub mod env;
pub use crate::env::Environment;
pub mod parser;
pub use crate::parser::parse;
pub mod printer;
pub use crate::printer::dump_sexp;
pub mod eval;
pub use crate::eval::eval;
mod builtins;
