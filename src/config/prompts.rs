//! Prompt templates for gensearch.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory
//! (`generate.toml`, `rag.toml`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Sentence the retrieval prompt asks the model to emit when the context has no answer.
pub const NOT_FOUND_ANSWER: &str =
    "I could not find the information in the provided electoral list.";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub generate: GeneratePrompts,
    pub rag: RagPrompts,
}

/// Prompts for the word-capped passthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratePrompts {
    /// Rendered with `{{max_words}}`.
    pub system: String,
}

impl Default for GeneratePrompts {
    fn default() -> Self {
        Self {
            system: "You are a concise assistant. Produce an answer that is AT MOST {{max_words}} WORDS long. \
Do not include extraneous explanations, lists, or surrounding punctuation. \
If the user's prompt requires more than {{max_words}} words for full accuracy, produce a concise {{max_words}}-word summary."
                .to_string(),
        }
    }
}

/// Prompts for retrieval-augmented answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Rendered with `{{context}}` and `{{not_found}}`.
    pub system: String,
    /// Answer the model is told to give when the context lacks the information.
    pub not_found: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert search assistant for an electoral roll document. \
Your sole purpose is to answer the user's question based ONLY on the following retrieved document chunks. \
If the answer is not in the documents, you MUST clearly state '{{not_found}}' \
Retrieved Context: \n\n{{context}}"
                .to_string(),
            not_found: NOT_FOUND_ANSWER.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, replacing defaults with any TOML files found in `custom_dir`.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let generate_path = custom_path.join("generate.toml");
            if generate_path.exists() {
                let content = std::fs::read_to_string(&generate_path)?;
                prompts.generate = toml::from_str(&content)?;
            }

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// System instruction for the passthrough, with the word cap filled in.
    pub fn generate_system(&self, max_words: usize) -> String {
        let mut vars = HashMap::new();
        vars.insert("max_words".to_string(), max_words.to_string());
        Self::render(&self.generate.system, &vars)
    }

    /// System message for a retrieval answer over `context`.
    pub fn rag_system(&self, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("not_found".to_string(), self.rag.not_found.clone());
        vars.insert("context".to_string(), context.to_string());
        Self::render(&self.rag.system, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.generate_system(20).contains("AT MOST 20 WORDS"));
        assert_eq!(prompts.rag.not_found, NOT_FOUND_ANSWER);
    }

    #[test]
    fn test_rag_system_embeds_context_and_fallback() {
        let prompts = Prompts::default();
        let system = prompts.rag_system("Ward 12: Jane Doe");
        assert!(system.ends_with("Retrieved Context: \n\nWard 12: Jane Doe"));
        assert!(system.contains(NOT_FOUND_ANSWER));
        assert!(!system.contains("{{"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_load_custom_rag_prompt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            "system = \"Context only: {{context}}\"\nnot_found = \"Not listed.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.rag_system("abc"), "Context only: abc");
        assert_eq!(prompts.rag.not_found, "Not listed.");
        // untouched file keeps its default
        assert!(prompts.generate_system(20).contains("20"));
    }
}
