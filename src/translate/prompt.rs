pub const TRANSLATION_TEMPLATE: &str = "You are a translation expert. Translate the following text into the specified target language.

{format_instructions}

Text: {text}
Language: {targetLang}";

/// Template with `{name}` placeholders.
///
/// Rendering is a single pass over the template text: substituted values
/// are copied verbatim and never scanned for placeholders themselves.
/// `{{` and `}}` render as literal braces; unknown placeholders are kept.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    partials: Vec<(String, String)>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            partials: Vec::new(),
        }
    }

    /// Bind a variable once, at construction time.
    pub fn with_partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.partials.push((name.into(), value.into()));
        self
    }

    /// The translation prompt with the parser's format instructions baked in.
    pub fn translation(format_instructions: impl Into<String>) -> Self {
        Self::new(TRANSLATION_TEMPLATE).with_partial("format_instructions", format_instructions)
    }

    pub fn build(&self, text: &str, target_lang: &str) -> String {
        self.format(&[("text", text), ("targetLang", target_lang)])
    }

    pub fn format(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                out.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }

            if tail.starts_with('{') {
                if let Some(end) = tail.find('}') {
                    if let Some(value) = self.lookup(&tail[1..end], vars) {
                        out.push_str(value);
                        rest = &tail[end + 1..];
                        continue;
                    }
                }
            }

            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }

        out.push_str(rest);
        out
    }

    fn lookup<'a>(&'a self, name: &str, vars: &[(&str, &'a str)]) -> Option<&'a str> {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .or_else(|| {
                self.partials
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.as_str())
            })
    }
}
