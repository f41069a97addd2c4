// Clippy allows for reasonable defaults
#![allow(clippy::too_many_arguments)] // Agent entry points and formatters take many params
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::format_in_format_args)] // Nested format! can be clearer for complex strings

// Module declarations
pub mod agents;
pub mod config;
pub mod confluence;
pub mod git;
pub mod github;
pub mod http;
pub mod jira;
pub mod llm;
pub mod parsers;
pub mod runner;
pub mod slack;
pub mod templates;
pub mod utils;
