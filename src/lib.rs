pub mod config;
pub mod host;
pub mod ir;
pub mod render;
pub mod schema;
pub mod serializer;
pub mod viewer;
pub mod viewport;
pub mod web;

use wasm_bindgen::prelude::*;

use ir::compile;
use schema::SchemaMetadata;
use serializer::{Grammar, serialize};

pub use config::ViewerConfig;
pub use ir::DiagramDescription;
pub use render::{Drawable, RenderError, Renderer};
pub use viewer::{Dispatch, Viewer, ViewerError};

/// Initialize panic hook and console logging for WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        web::logger::install(log::LevelFilter::Info);
    }
}

/// Compile schema metadata JSON to diagram text.
pub fn schema_json_to_diagram(input: &str, grammar: Grammar) -> Result<String, schema::SchemaError> {
    let schema = SchemaMetadata::from_json(input)?;
    Ok(serialize(&compile(&schema), grammar))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_json_to_diagram() {
        let input = r#"[
            { "name": "users", "columns": [ { "name": "id", "type": "INTEGER", "isPrimaryKey": true } ] },
            { "name": "posts",
              "columns": [ { "name": "user_id" } ],
              "foreignKeys": [ { "column": "user_id", "referencedTable": "users" } ] }
        ]"#;
        let text = schema_json_to_diagram(input, Grammar::Mermaid).unwrap();

        assert_eq!(
            text,
            "erDiagram\n\
             \x20   users {\n\
             \x20       INTEGER id PK\n\
             \x20   }\n\
             \x20   posts {\n\
             \x20       TEXT user_id FK\n\
             \x20   }\n\
             \x20   users ||--o{ posts : \"user_id\"\n"
        );
    }

    #[test]
    fn test_schema_json_to_diagram_invalid() {
        assert!(schema_json_to_diagram("not json", Grammar::Erd).is_err());
    }
}
