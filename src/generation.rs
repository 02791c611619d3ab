//! Structured model calls: schemas for expected output and the bounded retry caller.

pub mod caller;
pub mod schema;

pub use caller::GenerationCaller;
pub use schema::{extract_json_object, parse_response, OutputSchema, SchemaField, StructuredOutput};
