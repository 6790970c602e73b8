//! Response extraction — pull the fenced code block out of the final answer.

use regex::Regex;

/// Extracts the first fenced block tagged with a given language.
#[derive(Debug, Clone)]
pub struct CodeExtractor {
    language: String,
    pattern: Regex,
}

impl CodeExtractor {
    /// Build an extractor for fences opened with ```` ```<language> ````.
    pub fn new(language: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"```{}\s*([\s\S]*?)\s*```", regex::escape(language)))?;
        Ok(Self {
            language: language.to_string(),
            pattern,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// The trimmed body of the first matching fence, or an empty string.
    pub fn extract(&self, text: &str) -> String {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn jsx() -> CodeExtractor {
        CodeExtractor::new("jsx").unwrap()
    }

    #[test]
    fn test_extracts_single_block() {
        let text = "Here you go:\n```jsx\n  const X = 1;  \n```\nEnjoy.";
        assert_eq!(jsx().extract(text), "const X = 1;");
    }

    #[test]
    fn test_no_block_yields_empty() {
        assert_eq!(jsx().extract("I could not build that screen."), "");
    }

    #[test]
    fn test_other_language_ignored() {
        let text = "```python\nprint(1)\n```";
        assert_eq!(jsx().extract(text), "");
    }

    #[test]
    fn test_first_block_wins() {
        let text = "```jsx\nfirst();\n```\ntext\n```jsx\nsecond();\n```";
        assert_eq!(jsx().extract(text), "first();");
    }

    #[test]
    fn test_multiline_body_preserved() {
        let text = "```jsx\nimport { VStack } from './vstack';\n\nexport default function Login() {\n  return <VStack />;\n}\n```";
        assert_eq!(
            jsx().extract(text),
            "import { VStack } from './vstack';\n\nexport default function Login() {\n  return <VStack />;\n}"
        );
    }

    #[test]
    fn test_language_is_escaped() {
        let extractor = CodeExtractor::new("c++").unwrap();
        assert_eq!(extractor.extract("```c++\nint x;\n```"), "int x;");
        assert_eq!(extractor.language(), "c++");
    }
}
