pub mod blocks;
pub mod cleaner;
pub mod content;
pub mod delimiters;
pub mod fetch;
pub mod math;
pub mod multitest;
pub mod parser;
pub mod retry;
pub mod samples;
pub mod sections;
pub mod validation;
