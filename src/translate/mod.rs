pub mod interface;
pub mod parser;
pub mod pipeline;
pub mod prompt;

pub use interface::*;
pub use pipeline::TranslationPipeline;
