//! Serializer for converting a diagram description to renderer input text.

use crate::ir::{Cardinality, DEFAULT_TYPE, DiagramDescription, EdgeSpec, FieldSpec, NodeSpec};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Text grammar understood by the downstream renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    /// Mermaid `erDiagram`.
    #[default]
    Mermaid,
    /// ERD notation: `entity` blocks and a `rel` block.
    Erd,
}

impl Grammar {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mermaid" => Some(Self::Mermaid),
            "erd" => Some(Self::Erd),
            _ => None,
        }
    }
}

/// Serialize a diagram description in the given grammar.
///
/// Entity names are sanitized for the grammar and then made unique, so every
/// node gets its own block even when two table names sanitize alike. Edge
/// endpoints go through the same name table.
pub fn serialize(ir: &DiagramDescription, grammar: Grammar) -> String {
    let mut names = EntityNames::new(grammar);
    let ids: Vec<String> = ir.nodes.iter().map(|n| names.node(&n.id)).collect();

    match grammar {
        Grammar::Mermaid => serialize_mermaid(ir, &ids, &mut names),
        Grammar::Erd => serialize_erd(ir, &ids, &mut names),
    }
}

fn serialize_mermaid(ir: &DiagramDescription, ids: &[String], names: &mut EntityNames) -> String {
    let mut output = String::from("erDiagram\n");

    for (node, id) in ir.nodes.iter().zip(ids) {
        output.push_str(&format!("    {} {{\n", id));
        for field in &node.fields {
            mermaid_field(&mut output, field);
        }
        output.push_str("    }\n");
    }

    for edge in &ir.edges {
        mermaid_edge(&mut output, edge, names);
    }

    output
}

fn mermaid_field(output: &mut String, field: &FieldSpec) {
    output.push_str(&format!(
        "        {} {}",
        type_name(&field.typ, Grammar::Mermaid),
        identifier(&field.name, Grammar::Mermaid)
    ));

    let keys = match (field.primary_key, field.foreign_key) {
        (true, true) => Some("PK, FK"),
        (true, false) => Some("PK"),
        (false, true) => Some("FK"),
        (false, false) => None,
    };
    if let Some(keys) = keys {
        output.push(' ');
        output.push_str(keys);
    }
    if field.not_null {
        output.push_str(" \"NOT NULL\"");
    }

    output.push('\n');
}

fn mermaid_edge(output: &mut String, edge: &EdgeSpec, names: &mut EntityNames) {
    let connector = match edge.cardinality {
        Cardinality::OneToMany => "||--o{",
    };

    output.push_str(&format!(
        "    {} {} {} : \"{}\"\n",
        names.reference(&edge.from),
        connector,
        names.reference(&edge.to),
        edge.label.replace('"', "#quot;")
    ));
}

fn serialize_erd(ir: &DiagramDescription, ids: &[String], names: &mut EntityNames) -> String {
    let mut output = String::new();

    for (i, (node, id)) in ir.nodes.iter().zip(ids).enumerate() {
        if i > 0 {
            output.push('\n');
        }
        erd_entity(&mut output, node, id);
    }

    if !ir.edges.is_empty() {
        output.push_str("\nrel {\n");
        for edge in &ir.edges {
            let (left, right) = erd_cardinality(edge.cardinality);
            output.push_str(&format!(
                "    {} {} -- {} {} : \"{}\"\n",
                names.reference(&edge.from),
                left,
                right,
                names.reference(&edge.to),
                edge.label.replace('\\', "\\\\").replace('"', "\\\"")
            ));
        }
        output.push_str("}\n");
    }

    output
}

fn erd_entity(output: &mut String, node: &NodeSpec, id: &str) {
    output.push_str(&format!("entity {} {{\n", id));

    for field in &node.fields {
        output.push_str(&format!(
            "    {} {}",
            identifier(&field.name, Grammar::Erd),
            type_name(&field.typ, Grammar::Erd)
        ));
        if field.primary_key {
            output.push_str(" pk");
        }
        if field.not_null {
            output.push_str(" not null");
        }
        output.push('\n');
    }

    output.push_str("}\n");
}

fn erd_cardinality(card: Cardinality) -> (&'static str, &'static str) {
    match card {
        Cardinality::OneToMany => ("1", "*"),
    }
}

/// Sanitized entity names for one serialization, unique across the output.
struct EntityNames {
    grammar: Grammar,
    taken: HashSet<String>,
    assigned: HashMap<String, String>,
}

impl EntityNames {
    fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            taken: HashSet::new(),
            assigned: HashMap::new(),
        }
    }

    /// A fresh name for a node. Edges resolve to the first node with that id.
    fn node(&mut self, id: &str) -> String {
        let name = self.allocate(id);
        self.assigned
            .entry(id.to_string())
            .or_insert_with(|| name.clone());
        name
    }

    /// The name of an edge endpoint; tables without a node get one on first use.
    fn reference(&mut self, id: &str) -> String {
        if let Some(name) = self.assigned.get(id) {
            return name.clone();
        }
        let name = self.allocate(id);
        self.assigned.insert(id.to_string(), name.clone());
        name
    }

    fn allocate(&mut self, id: &str) -> String {
        let base = identifier(id, self.grammar);
        let mut name = base.clone();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

/// Entity and attribute names: word characters only, plus `-` in Mermaid.
/// Always starts with a letter or `_`.
fn identifier(name: &str, grammar: Grammar) -> String {
    let name: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || (c == '-' && grammar == Grammar::Mermaid) {
                c
            } else {
                '_'
            }
        })
        .collect();
    leading(name, "_")
}

/// Mermaid types keep brackets so `VARCHAR(255)` and `INT[]` survive. ERD
/// types are a single word, so parameters and array suffixes are dropped.
fn type_name(typ: &str, grammar: Grammar) -> String {
    let typ = match grammar {
        Grammar::Mermaid => typ.trim(),
        Grammar::Erd => typ.split(['(', '[']).next().unwrap_or(typ).trim(),
    };
    let typ: String = typ
        .chars()
        .map(|c| match grammar {
            Grammar::Mermaid
                if c.is_alphanumeric() || matches!(c, '_' | '-' | '(' | ')' | '[' | ']') =>
            {
                c
            }
            Grammar::Erd if c.is_alphanumeric() || c == '_' => c,
            _ => '_',
        })
        .collect();
    leading(typ, DEFAULT_TYPE)
}

/// Empty names become `fallback`; names that can't start a token get a `_`.
fn leading(name: String, fallback: &str) -> String {
    match name.chars().next() {
        None => fallback.to_string(),
        Some(c) if c.is_alphabetic() || c == '_' => name,
        Some(_) => format!("_{name}"),
    }
}
