pub mod assembly;
pub mod audio;
pub mod config;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod records;
pub mod sanitize;
pub mod schedule;
pub mod script;
pub mod segments;
pub mod store;
pub mod summarize;
