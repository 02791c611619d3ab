//! Expected output shapes and the parsing that checks model responses against them.

use serde::de::DeserializeOwned;

/// One named field the model must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub description: &'static str,
}

/// Named set of fields making up one structured response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub fields: &'static [SchemaField],
}

impl OutputSchema {
    /// Text placed into the `{format_instructions}` placeholder.
    pub fn format_instructions(&self) -> String {
        let mut out = String::from(
            "The output must be a single JSON object inside a ```json code block, with exactly these keys:\n\n```json\n{\n",
        );
        for (index, field) in self.fields.iter().enumerate() {
            let separator = if index + 1 == self.fields.len() { "" } else { "," };
            out.push_str(&format!(
                "\t\"{}\": string  // {}{}\n",
                field.name, field.description, separator
            ));
        }
        out.push_str("}\n```\nReturn nothing outside the code block.");
        out
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// A model response type with a declared schema and content checks.
pub trait StructuredOutput: DeserializeOwned + Sized {
    const SCHEMA: OutputSchema;

    /// Reject output that deserialized but lacks required content.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Pull the outermost JSON object out of a response that may carry fences or prose.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let body = match raw.find("```json") {
        Some(start) => {
            let rest = &raw[start + "```json".len()..];
            match rest.find("```") {
                Some(end) => &rest[..end],
                None => rest,
            }
        }
        None => raw,
    };
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

/// Parse and validate one raw response.
pub fn parse_response<T: StructuredOutput>(raw: &str) -> Result<T, String> {
    let json = extract_json_object(raw)
        .ok_or_else(|| "response contains no JSON object".to_string())?;
    let parsed: T = serde_json::from_str(json).map_err(|e| format!("invalid JSON: {}", e))?;
    parsed.validate()?;
    Ok(parsed)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("field '{}' is empty", field))
    } else {
        Ok(())
    }
}
