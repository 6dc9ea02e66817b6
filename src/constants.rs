//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Discovery constants
pub mod discovery {
    /// Inputs modified within this many days are eligible for a run
    pub const DEFAULT_WINDOW_DAYS: i64 = 7;
}

/// Text-unit extraction constants
pub mod text {
    /// Recognized text columns, combined in this order when present
    pub const TEXT_COLUMNS: [&str; 4] = ["Title", "Post_Text", "Body", "content"];

    /// Separator used when joining text columns
    pub const COLUMN_JOIN: &str = ". ";
}

/// Sentiment categorization constants
pub mod sentiment {
    /// Input ceiling per text unit before submission to the model
    pub const MAX_INPUT_CHARS: usize = 5000;

    /// Marker appended when an input was truncated
    pub const TRUNCATION_MARKER: &str = "...";

    /// Fallback confidence when keyword sniffing hits a positive term
    pub const FALLBACK_POSITIVE_CONFIDENCE: f64 = 0.7;
    /// Fallback confidence when keyword sniffing hits a negative term
    pub const FALLBACK_NEGATIVE_CONFIDENCE: f64 = 0.7;
    /// Fallback confidence when keyword sniffing hits a mixed term
    pub const FALLBACK_MIXED_CONFIDENCE: f64 = 0.6;
    /// Fallback confidence when no keyword matches
    pub const FALLBACK_NEUTRAL_CONFIDENCE: f64 = 0.5;
}

/// Consolidated summarization constants
pub mod summary {
    /// Hard ceiling on items included in one consolidated prompt.
    /// Keeps the prompt inside the model context limit.
    pub const MAX_SAMPLE_ITEMS: usize = 50;

    /// Per-item excerpt ceiling within the consolidated prompt
    pub const MAX_EXCERPT_CHARS: usize = 500;

    /// Separator between excerpts in the consolidated prompt
    pub const EXCERPT_SEPARATOR: &str = "\n\n---\n\n";
}

/// Model invocation constants
pub mod model {
    /// Token cap for classification calls
    pub const CLASSIFY_MAX_TOKENS: u32 = 1000;

    /// Token cap for the consolidated summarization call
    pub const SUMMARIZE_MAX_TOKENS: u32 = 2048;

    /// Deterministic-leaning temperature for classification
    pub const CLASSIFY_TEMPERATURE: f32 = 0.1;

    /// Temperature for summarization
    pub const SUMMARIZE_TEMPERATURE: f32 = 0.3;

    /// Nucleus sampling parameter shared by both call sites
    pub const TOP_P: f32 = 0.9;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
}
