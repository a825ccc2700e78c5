pub mod llm_interface;
pub mod openai_compatible_llm;

pub use llm_interface::*;
pub use openai_compatible_llm::*;
