mod type_utils;
mod time_utils;
mod tokenizer;

pub use time_utils::*;
pub use tokenizer::*;
pub use type_utils::*;
