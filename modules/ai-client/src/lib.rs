pub mod error;
pub mod gemini;
pub mod schema;
pub mod util;

pub use error::{AiError, Result};
pub use gemini::Gemini;
pub use schema::StructuredOutput;
pub use util::{strip_code_blocks, truncate_chars};
