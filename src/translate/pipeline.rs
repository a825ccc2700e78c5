use std::sync::Arc;
use tracing::debug;

use super::interface::ParsedResult;
use super::parser::StructuredOutputParser;
use super::prompt::PromptTemplate;
use crate::llm::{ModelClient, ModelInvocationError};

/// Prompt -> model -> parse. Built once at startup; holds no per-request state.
pub struct TranslationPipeline {
    template: PromptTemplate,
    parser: StructuredOutputParser,
    llm: Arc<dyn ModelClient>,
}

impl TranslationPipeline {
    pub fn new(llm: Arc<dyn ModelClient>) -> Self {
        let parser = StructuredOutputParser::translation();
        let template = PromptTemplate::translation(parser.get_format_instructions());
        Self {
            template,
            parser,
            llm,
        }
    }

    /// Only a failed model call is an error; an unparseable reply comes back
    /// as `ParsedResult::ParseFailure`.
    pub async fn run(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<ParsedResult, ModelInvocationError> {
        let prompt = self.template.build(text, target_lang);
        debug!("Invoking model with {} byte prompt", prompt.len());

        let raw = self.llm.invoke(&prompt).await?;
        Ok(self.parser.parse_or_fallback(raw))
    }
}
