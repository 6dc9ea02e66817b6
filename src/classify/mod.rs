//! Per-Item Classification
//!
//! Two classifiers over the same three building blocks (prompt renderer,
//! model adapter, response parser): category assignment from an
//! open-ended prompt-constrained label space, and sentiment with
//! confidence. Parse failures degrade inside the parsers; only a failed
//! model call propagates, and the caller decides whether to skip or
//! abort.

use crate::model::{InvokeOptions, ModelAdapter};
use crate::parse::{self, SentimentParse};
use crate::prompt::PromptRenderer;
use crate::types::utils::truncate_chars;
use crate::types::{CategoryResult, Result, TextUnit};

use crate::constants::sentiment as sentiment_constants;

/// Fixed instruction appended to classification prompts demanding
/// single-field JSON output.
const CATEGORY_FORMAT_INSTRUCTION: &str =
    "Respond with JSON format: {\"category\": \"category_name\"}";

const SENTIMENT_FORMAT_INSTRUCTION: &str = "Respond with JSON format: {\"sentiment\": \"POSITIVE|NEGATIVE|NEUTRAL|MIXED\", \"confidence\": 0.0, \"reasoning\": \"text\"}";

// =============================================================================
// Item Classifier
// =============================================================================

/// Classifies one text unit into one category.
pub struct ItemClassifier<'a> {
    adapter: &'a ModelAdapter,
    renderer: &'a PromptRenderer,
}

impl<'a> ItemClassifier<'a> {
    pub fn new(adapter: &'a ModelAdapter, renderer: &'a PromptRenderer) -> Self {
        Self { adapter, renderer }
    }

    /// Classify `unit` with the given model and prompt template.
    ///
    /// Never raises for parse failure; may raise `Upstream` when the
    /// model call itself fails.
    pub async fn classify(
        &self,
        unit: &TextUnit,
        model_id: &str,
        template: &str,
    ) -> Result<CategoryResult> {
        let rendered = self.renderer.render(template, &[("content", &unit.text)])?;
        let prompt = format!("{}\n\n{}", rendered, CATEGORY_FORMAT_INSTRUCTION);

        let raw = self
            .adapter
            .invoke(&prompt, model_id, &InvokeOptions::classification())
            .await?;

        Ok(CategoryResult {
            source_key: unit.source_key.clone(),
            row_index: unit.row_index,
            category: parse::parse_category(&raw),
            combined_text: unit.text.clone(),
        })
    }
}

// =============================================================================
// Sentiment Categorizer
// =============================================================================

/// Classifies one text unit into one of the four sentiment labels with
/// confidence and reasoning.
pub struct SentimentCategorizer<'a> {
    adapter: &'a ModelAdapter,
    renderer: &'a PromptRenderer,
    template: String,
}

impl<'a> SentimentCategorizer<'a> {
    pub fn new(adapter: &'a ModelAdapter, renderer: &'a PromptRenderer, template: &str) -> Self {
        Self {
            adapter,
            renderer,
            template: template.to_string(),
        }
    }

    /// Categorize `text`. Inputs are truncated to the model input
    /// ceiling with an ellipsis marker before submission. Source
    /// metadata is attached by the caller after this returns.
    pub async fn categorize(&self, text: &str, model_id: &str) -> Result<SentimentParse> {
        let submitted = truncate_chars(
            text,
            sentiment_constants::MAX_INPUT_CHARS,
            sentiment_constants::TRUNCATION_MARKER,
        );

        let rendered = self.renderer.render(&self.template, &[("content", &submitted)])?;
        let prompt = format!("{}\n\n{}", rendered, SENTIMENT_FORMAT_INSTRUCTION);

        let raw = self
            .adapter
            .invoke(&prompt, model_id, &InvokeOptions::classification())
            .await?;

        Ok(parse::parse_sentiment(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptConfig;
    use crate::model::ModelTransport;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Arc;

    struct FixedTransport(String);

    #[async_trait]
    impl ModelTransport for FixedTransport {
        async fn send(&self, _model_id: &str, _body: Value) -> Result<Value> {
            Ok(json!({"generation": self.0.clone()}))
        }
    }

    fn renderer_with_template(dir: &std::path::Path, name: &str, body: &str) -> PromptRenderer {
        std::fs::write(dir.join(name), body).unwrap();
        PromptRenderer::new(&PromptConfig {
            templates_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    fn unit(text: &str) -> TextUnit {
        TextUnit {
            source_key: "ingest/posts.jsonl".to_string(),
            row_index: Some(0),
            text: text.to_string(),
            prior_category: None,
        }
    }

    #[tokio::test]
    async fn test_classify_parses_category() {
        let dir = tempfile::tempdir().unwrap();
        let renderer =
            renderer_with_template(dir.path(), "classify_post.tmpl", "Classify: {{content}}");
        let adapter = ModelAdapter::new(Arc::new(FixedTransport(
            r#"{"category": "Housing"}"#.to_string(),
        )));

        let classifier = ItemClassifier::new(&adapter, &renderer);
        let result = classifier
            .classify(&unit("rent is too high"), "meta.llama3-70b-instruct-v1:0", "classify_post.tmpl")
            .await
            .unwrap();

        assert_eq!(result.category, "Housing");
        assert_eq!(result.combined_text, "rent is too high");
        assert_eq!(result.source_key, "ingest/posts.jsonl");
    }

    #[tokio::test]
    async fn test_classify_degrades_to_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let renderer =
            renderer_with_template(dir.path(), "classify_post.tmpl", "Classify: {{content}}");
        let adapter = ModelAdapter::new(Arc::new(FixedTransport(
            "Career\nbecause it mentions interviews".to_string(),
        )));

        let classifier = ItemClassifier::new(&adapter, &renderer);
        let result = classifier
            .classify(&unit("got an offer"), "meta.llama3-70b-instruct-v1:0", "classify_post.tmpl")
            .await
            .unwrap();

        assert_eq!(result.category, "Career");
    }

    #[tokio::test]
    async fn test_categorize_sentiment() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_with_template(dir.path(), "sentiment.tmpl", "Rate: {{content}}");
        let adapter = ModelAdapter::new(Arc::new(FixedTransport(
            r#"{"sentiment": "positive", "confidence": 0.83, "reasoning": "cheerful"}"#.to_string(),
        )));

        let categorizer = SentimentCategorizer::new(&adapter, &renderer, "sentiment.tmpl");
        let parsed = categorizer
            .categorize("what a day", "meta.llama3-70b-instruct-v1:0")
            .await
            .unwrap();

        assert_eq!(parsed.sentiment, "POSITIVE");
        assert!((parsed.confidence - 0.83).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_categorize_truncates_long_input() {
        struct CapturePrompt(std::sync::Mutex<Option<usize>>);

        #[async_trait]
        impl ModelTransport for CapturePrompt {
            async fn send(&self, _model_id: &str, body: Value) -> Result<Value> {
                let len = body["prompt"].as_str().unwrap().chars().count();
                *self.0.lock().unwrap() = Some(len);
                Ok(json!({"generation": "{\"sentiment\": \"NEUTRAL\", \"confidence\": 0.5}"}))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_with_template(dir.path(), "sentiment.tmpl", "{{content}}");
        let transport = Arc::new(CapturePrompt(std::sync::Mutex::new(None)));
        let adapter = ModelAdapter::new(transport.clone());

        let long_input = "x".repeat(20_000);
        let categorizer = SentimentCategorizer::new(&adapter, &renderer, "sentiment.tmpl");
        categorizer
            .categorize(&long_input, "meta.llama3-70b-instruct-v1:0")
            .await
            .unwrap();

        let sent = transport.0.lock().unwrap().unwrap();
        // 5000-char ceiling plus marker, instruction, and [INST] framing
        assert!(sent < 5500, "prompt was {} chars", sent);
    }
}
