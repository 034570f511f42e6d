use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Types the model can be asked to return as JSON.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// JSON schema for this type, shaped for a prompt part:
    /// 1. fully inlined (no `$ref`)
    /// 2. no `definitions` / `$schema` noise at the root
    /// 3. field doc comments kept as `description`
    fn gemini_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = if let serde_json::Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [only] = all_of.as_slice() {
                    *value = only.clone();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Verdict {
        /// integer 0-10
        score: u8,
        tools: Vec<String>,
    }

    #[test]
    fn test_schema_keeps_doc_descriptions() {
        let schema = Verdict::gemini_schema();
        let score = &schema["properties"]["score"];
        assert_eq!(score["description"], "integer 0-10");
    }

    #[test]
    fn test_nested_struct_inlined() {
        #[derive(Deserialize, JsonSchema)]
        struct Creator {
            name: String,
        }

        #[derive(Deserialize, JsonSchema)]
        struct Showcase {
            creator: Creator,
            title: String,
        }

        let schema = Showcase::gemini_schema();
        let schema_obj = schema.as_object().unwrap();

        assert!(!schema_obj.contains_key("definitions"));
        assert!(!schema_obj.contains_key("$schema"));

        let creator = &schema_obj["properties"]["creator"];
        assert!(creator.get("$ref").is_none());
        assert_eq!(creator["type"], "object");
    }
}
