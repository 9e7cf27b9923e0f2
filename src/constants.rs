// src/constants.rs

pub const DEFAULT_SOURCE_BASE_URL: &str = "https://codeforces.com";
pub const DEFAULT_SOURCE_NAME: &str = "codeforces";

// Contest ids at or above this value live under /gym/
pub const GYM_CONTEST_ID_START: u32 = 100_000;

// Placeholders used when a header section cannot be located
pub const UNTITLED_PROBLEM: &str = "Untitled Problem";
pub const DEFAULT_TIME_LIMIT: &str = "1 second";
pub const DEFAULT_MEMORY_LIMIT: &str = "256 megabytes";
pub const DEFAULT_INPUT_FILE: &str = "standard input";
pub const DEFAULT_OUTPUT_FILE: &str = "standard output";

// Section anchors
pub const TITLE_MARKER: &str = r#"<div class="title">"#;
pub const HEADER_MARKER: &str = r#"<div class="header">"#;
pub const TIME_LIMIT_MARKER: &str = r#"<div class="time-limit">"#;
pub const MEMORY_LIMIT_MARKER: &str = r#"<div class="memory-limit">"#;
pub const INPUT_FILE_MARKER: &str = r#"<div class="input-file">"#;
pub const OUTPUT_FILE_MARKER: &str = r#"<div class="output-file">"#;
pub const INPUT_SPEC_MARKER: &str = r#"<div class="input-specification">"#;
pub const OUTPUT_SPEC_MARKER: &str = r#"<div class="output-specification">"#;
pub const SAMPLE_TESTS_MARKER: &str = r#"<div class="sample-tests">"#;
pub const SAMPLE_TEST_MARKER: &str = r#"<div class="sample-test">"#;
pub const NOTE_MARKER: &str = r#"<div class="note">"#;
pub const DIV_CLOSE: &str = "</div>";

// Group id for a sample line that belongs to no test case
pub const EXCLUDED_GROUP: i32 = -1;

pub const INTERACTIVE_TAG: &str = "interactive";

// Phrases that only show up on anti-bot interstitial pages
pub const BLOCKED_MARKERS: &[&str] = &[
    "Just a moment...",
    "Checking your browser",
    "cf-browser-verification",
    "challenge-platform",
    "Verifying you are human",
    "Enable JavaScript and cookies to continue",
    "DDoS protection by",
];

// Consecutive blocked/transport failures before the fetcher stops trying
pub const CIRCUIT_FAILURE_THRESHOLD: u32 = 5;
pub const CIRCUIT_RESET_SECS: u64 = 60;
