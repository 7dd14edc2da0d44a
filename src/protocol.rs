use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/story`. Field names are part of the wire contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoryRequest {
    pub experience_level: String,
    pub genre: String,
    pub characters: String,
    pub interests: String,
    pub user_brainstorm: String,
}

/// Expected response body. Only used to describe the contract; responses
/// are interpreted from raw JSON so that shape errors can be told apart
/// from transport errors.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryResponse {
    pub stories: Vec<Story>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Story {
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub genre_subgenre: String,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub premise: String,
    #[serde(deserialize_with = "required_characters")]
    #[schemars(with = "Vec<Character>")]
    pub main_characters: Vec<Character>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub central_conflict: String,
    #[serde(deserialize_with = "required_text_list")]
    #[schemars(with = "Vec<String>")]
    pub themes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub tone_and_style: String,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub why_it_works_for_this_writer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Character {
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub personality: String,
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub motivation: String,
}

pub fn response_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(StoryResponse)).unwrap_or(Value::Null)
}

// Mirrors how a template literal prints a value, except that a missing or
// null field prints as nothing.
fn text_from_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(text_from_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// A null entry cannot be read from; any other non-object entry has no
// fields and renders blank.
fn character_from_value(value: Value) -> Result<Character, String> {
    match value {
        Value::Null => Err("character entry is null".to_string()),
        Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        _ => Ok(Character::default()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_from_value(Value::deserialize(deserializer)?))
}

fn required_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().map(text_from_value).collect()),
        other => Err(de::Error::custom(format!(
            "expected a list of themes, found {}",
            value_kind(&other)
        ))),
    }
}

fn required_characters<'de, D>(deserializer: D) -> Result<Vec<Character>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(character_from_value)
            .collect::<Result<_, _>>()
            .map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "expected a list of characters, found {}",
            value_kind(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_exactly_the_five_fields() {
        let request = StoryRequest {
            experience_level: "beginner".to_string(),
            genre: "fantasy \"noir\"".to_string(),
            characters: "a thief, a ghost".to_string(),
            interests: "heists\nfog".to_string(),
            user_brainstorm: "<b>what if</b>".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "characters",
                "experience_level",
                "genre",
                "interests",
                "user_brainstorm"
            ]
        );
        assert_eq!(object["genre"], "fantasy \"noir\"");
        assert_eq!(object["interests"], "heists\nfog");
        assert_eq!(object["user_brainstorm"], "<b>what if</b>");
    }

    #[test]
    fn story_parses_complete_object() {
        let story: Story = serde_json::from_value(json!({
            "title": "The Last Lantern",
            "genre_subgenre": "Fantasy / Mystery",
            "premise": "A lamplighter finds a door.",
            "main_characters": [
                {"name": "Ilse", "role": "lamplighter", "personality": "stubborn", "motivation": "her brother"}
            ],
            "central_conflict": "Light against the fog",
            "themes": ["memory", "duty"],
            "tone_and_style": "Moody",
            "why_it_works_for_this_writer": "Short scenes"
        }))
        .unwrap();

        assert_eq!(story.title, "The Last Lantern");
        assert_eq!(story.main_characters.len(), 1);
        assert_eq!(story.main_characters[0].motivation, "her brother");
        assert_eq!(story.themes, vec!["memory", "duty"]);
    }

    #[test]
    fn story_tolerates_missing_and_odd_text_fields() {
        let story: Story = serde_json::from_value(json!({
            "title": null,
            "premise": 42,
            "tone_and_style": {"mood": "dark"},
            "central_conflict": ["man", "nature"],
            "main_characters": [],
            "themes": [],
        }))
        .unwrap();

        assert_eq!(story.title, "");
        assert_eq!(story.premise, "42");
        assert_eq!(story.tone_and_style, "[object Object]");
        assert_eq!(story.central_conflict, "man,nature");
        assert_eq!(story.why_it_works_for_this_writer, "");
    }

    #[test]
    fn odd_list_entries_render_blank_or_as_text() {
        let story: Story = serde_json::from_value(json!({
            "main_characters": ["Bob", 3, {"name": "Ada", "role": "pilot"}],
            "themes": [{"a": 1}, 7, null, "loss"],
        }))
        .unwrap();

        assert_eq!(story.main_characters.len(), 3);
        assert_eq!(story.main_characters[0], Character::default());
        assert_eq!(story.main_characters[1], Character::default());
        assert_eq!(story.main_characters[2].name, "Ada");
        assert_eq!(story.main_characters[2].motivation, "");
        assert_eq!(story.themes, vec!["[object Object]", "7", "", "loss"]);
    }

    #[test]
    fn story_lists_are_required() {
        assert!(serde_json::from_value::<Story>(json!({"themes": []})).is_err());
        assert!(serde_json::from_value::<Story>(json!({"main_characters": []})).is_err());
        assert!(
            serde_json::from_value::<Story>(json!({"main_characters": null, "themes": []}))
                .is_err()
        );
        assert!(
            serde_json::from_value::<Story>(json!({"main_characters": [], "themes": null}))
                .is_err()
        );
    }

    #[test]
    fn story_rejects_unrenderable_shapes() {
        assert!(serde_json::from_value::<Story>(json!(7)).is_err());
        assert!(
            serde_json::from_value::<Story>(json!({"main_characters": [], "themes": {"a": 1}}))
                .is_err()
        );
        assert!(
            serde_json::from_value::<Story>(json!({"main_characters": "Bob", "themes": []}))
                .is_err()
        );
        assert!(
            serde_json::from_value::<Story>(json!({"main_characters": [null], "themes": []}))
                .is_err()
        );
    }

    #[test]
    fn response_schema_describes_stories_array() {
        let schema = response_schema();
        assert_eq!(schema["properties"]["stories"]["type"], "array");
        assert!(schema.to_string().contains("why_it_works_for_this_writer"));
    }
}
