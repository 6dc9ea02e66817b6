//! Prompt Renderer
//!
//! Resolves a prompt template from a small set of candidate locations
//! and fills named `{{placeholder}}` variables. Substitution is literal;
//! there is no control flow in the templates.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::PromptConfig;
use crate::types::{PipelineError, Result};

/// Renders prompt templates resolved from disk.
pub struct PromptRenderer {
    templates_dir: PathBuf,
}

impl PromptRenderer {
    pub fn new(config: &PromptConfig) -> Self {
        Self {
            templates_dir: config.templates_dir.clone(),
        }
    }

    /// Render `template_name` with the given variables.
    ///
    /// Fails with `PromptNotFound` listing every attempted path when the
    /// template exists in none of the candidate locations.
    pub fn render(&self, template_name: &str, vars: &[(&str, &str)]) -> Result<String> {
        let tried = self.candidate_paths(template_name);

        for path in &tried {
            if path.exists() {
                debug!("Using prompt template: {}", path.display());
                let source = std::fs::read_to_string(path)?;
                return Ok(substitute(&source, vars));
            }
        }

        Err(PipelineError::PromptNotFound {
            name: template_name.to_string(),
            tried,
        })
    }

    /// Candidate locations, in resolution order: the configured
    /// templates dir, the working-directory layout, the packaged
    /// layout, then the raw path as passed.
    fn candidate_paths(&self, template_name: &str) -> Vec<PathBuf> {
        let base = Path::new(template_name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(template_name));

        vec![
            self.templates_dir.join(&base),
            PathBuf::from("prompts").join(&base),
            PathBuf::from("src/prompts").join(&base),
            PathBuf::from(template_name),
        ]
    }
}

/// Substitute `{{name}}` placeholders literally.
/// Unknown placeholders are left untouched.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in vars {
        rendered = rendered.replace(&format!("{{{{{}}}}}", name), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_substitute_named_placeholder() {
        let out = substitute("Classify this: {{content}}", &[("content", "hello world")]);
        assert_eq!(out, "Classify this: hello world");
    }

    #[test]
    fn test_substitute_leaves_unknown_placeholders() {
        let out = substitute("{{content}} and {{other}}", &[("content", "x")]);
        assert_eq!(out, "x and {{other}}");
    }

    #[test]
    fn test_render_from_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentiment.tmpl");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "Analyze: {{{{content}}}}").unwrap();

        let renderer = PromptRenderer {
            templates_dir: dir.path().to_path_buf(),
        };
        let out = renderer.render("sentiment.tmpl", &[("content", "good day")]).unwrap();
        assert_eq!(out, "Analyze: good day");
    }

    #[test]
    fn test_render_missing_lists_all_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PromptRenderer {
            templates_dir: dir.path().to_path_buf(),
        };

        let err = renderer.render("nope.tmpl", &[]).unwrap_err();
        match err {
            PipelineError::PromptNotFound { name, tried } => {
                assert_eq!(name, "nope.tmpl");
                assert_eq!(tried.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_resolves_basename_of_full_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classify_post.tmpl");
        std::fs::write(&path, "{{content}}").unwrap();

        let renderer = PromptRenderer {
            templates_dir: dir.path().to_path_buf(),
        };
        // A full path resolves via its basename inside the templates dir
        let out = renderer
            .render("some/other/dir/classify_post.tmpl", &[("content", "t")])
            .unwrap();
        assert_eq!(out, "t");
    }
}
