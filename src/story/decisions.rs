//! Reader decision points and the branches generated for their choices.

use crate::generation::schema::{require_text, OutputSchema, SchemaField, StructuredOutput};
use crate::story::{lenient_text, string_or_list};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "lenient_text")]
    pub choice_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub immediate_outcome: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_emphasis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPoint {
    #[serde(default, deserialize_with = "lenient_text")]
    pub point_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub context: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_impacts: String,
}

impl DecisionPoint {
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.choice_id == choice_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPointList {
    #[serde(default)]
    pub decision_points: Vec<DecisionPoint>,
}

impl DecisionPointList {
    /// Give every point and choice a stable id (`dp_{chapter}_{k}`, `c_{chapter}_{k}_{j}`),
    /// keeping ids the model supplied unless they collide.
    pub fn assign_ids(&mut self, chapter_number: u32) {
        let mut seen_points = std::collections::HashSet::new();
        for (k, point) in self.decision_points.iter_mut().enumerate() {
            let k = k + 1;
            if point.point_id.trim().is_empty() || !seen_points.insert(point.point_id.clone()) {
                point.point_id = format!("dp_{}_{}", chapter_number, k);
                seen_points.insert(point.point_id.clone());
            }
            let mut seen_choices = std::collections::HashSet::new();
            for (j, choice) in point.choices.iter_mut().enumerate() {
                if choice.choice_id.trim().is_empty() || !seen_choices.insert(choice.choice_id.clone()) {
                    choice.choice_id = format!("c_{}_{}_{}", chapter_number, k, j + 1);
                    seen_choices.insert(choice.choice_id.clone());
                }
            }
        }
    }

    pub fn find(&self, point_id: &str) -> Option<&DecisionPoint> {
        self.decision_points.iter().find(|p| p.point_id == point_id)
    }
}

impl StructuredOutput for DecisionPointList {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "decision_points",
        fields: &[SchemaField {
            name: "decision_points",
            description: "Array of decision points, each an object with point_id, description, context, genre_impacts and choices (array of objects with choice_id, description, immediate_outcome, genre_emphasis)",
        }],
    };

    fn validate(&self) -> Result<(), String> {
        if self.decision_points.is_empty() {
            return Err("field 'decision_points' is empty".to_string());
        }
        for point in &self.decision_points {
            require_text("decision_points[].description", &point.description)?;
            if point.choices.len() < 2 {
                return Err(format!(
                    "decision point '{}' has {} choice(s), expected at least 2",
                    point.description,
                    point.choices.len()
                ));
            }
            point
                .choices
                .iter()
                .try_for_each(|c| require_text("choices[].description", &c.description))?;
        }
        Ok(())
    }
}

/// Alternate continuation following one choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Set by the pipeline.
    #[serde(default)]
    pub decision_point_id: String,
    /// Set by the pipeline.
    #[serde(default)]
    pub choice_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub consequences: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub follow_up_hooks: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub character_impacts: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub cultural_elements: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub genre_elements: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_shift: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub narrative_tone_progression: String,
}

impl Branch {
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n{}\n", self.title, self.content.trim_end());
        if !self.consequences.trim().is_empty() {
            out.push_str(&format!("\n## Consequences\n\n{}\n", self.consequences.trim_end()));
        }
        out
    }
}

impl StructuredOutput for Branch {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "branch",
        fields: &[
            SchemaField { name: "title", description: "Title of this branch" },
            SchemaField { name: "content", description: "Content for this branch of the story" },
            SchemaField {
                name: "consequences",
                description: "Consequences of this choice on the story and characters",
            },
            SchemaField {
                name: "follow_up_hooks",
                description: "List of hooks for continuing the story from this branch",
            },
            SchemaField {
                name: "character_impacts",
                description: "How this choice impacts character development",
            },
            SchemaField {
                name: "cultural_elements",
                description: "List of cultural elements incorporated in this branch",
            },
            SchemaField {
                name: "genre_elements",
                description: "List of genre elements incorporated or emphasized in this branch",
            },
            SchemaField {
                name: "genre_shift",
                description: "How this choice shifts genre emphasis or balance if applicable",
            },
            SchemaField {
                name: "narrative_tone_progression",
                description: "How the narrative tone evolves with this branch",
            },
        ],
    };

    fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}
