use crate::schema::{SchemaMetadata, Table};

/// Type marker used for columns whose metadata carries no type.
pub const DEFAULT_TYPE: &str = "TEXT";

/// Relationship multiplicity. Metadata carries no uniqueness information,
/// so every foreign key is treated as one-to-many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToMany,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramDescription {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub typ: String,
    pub primary_key: bool,
    /// Already false for primary-key columns.
    pub not_null: bool,
    pub foreign_key: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    /// Referenced ("one") table.
    pub from: String,
    /// Owning ("many") table.
    pub to: String,
    pub label: String,
    pub cardinality: Cardinality,
}

impl DiagramDescription {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Compile schema metadata into a diagram description.
///
/// Nodes and edges keep input order exactly; nothing is sorted or
/// deduplicated, and references to unknown tables pass through untouched.
pub fn compile(schema: &SchemaMetadata) -> DiagramDescription {
    let nodes: Vec<NodeSpec> = schema.tables.iter().map(compile_table).collect();

    let edges: Vec<EdgeSpec> = schema
        .tables
        .iter()
        .flat_map(|t| {
            t.foreign_keys.iter().map(move |fk| EdgeSpec {
                from: fk.referenced_table.clone(),
                to: t.name.clone(),
                label: fk.column.clone(),
                cardinality: Cardinality::OneToMany,
            })
        })
        .collect();

    log::debug!(
        "compiled schema: {} nodes, {} edges",
        nodes.len(),
        edges.len()
    );

    DiagramDescription { nodes, edges }
}

fn compile_table(table: &Table) -> NodeSpec {
    let fields = table
        .columns
        .iter()
        .map(|c| {
            let foreign_key = table.foreign_keys.iter().any(|fk| fk.column == c.name);

            FieldSpec {
                name: c.name.clone(),
                typ: c.typ.clone().unwrap_or_else(|| DEFAULT_TYPE.to_string()),
                primary_key: c.is_primary_key,
                not_null: c.is_not_null && !c.is_primary_key,
                foreign_key,
            }
        })
        .collect();

    NodeSpec {
        id: table.name.clone(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Table};

    fn shop() -> SchemaMetadata {
        SchemaMetadata {
            tables: vec![
                Table::new("users")
                    .column(Column::new("id", "INTEGER").pk().not_null())
                    .column(Column::new("email", "VARCHAR(255)").not_null()),
                Table::new("orders")
                    .column(Column::new("id", "INTEGER").pk())
                    .column(Column::new("user_id", "INTEGER").not_null())
                    .column(Column::new("coupon_id", "INTEGER"))
                    .foreign_key("user_id", "users")
                    .foreign_key("coupon_id", "coupons"),
                Table::new("coupons").column(Column::untyped("code")),
            ],
        }
    }

    #[test]
    fn test_compile_deterministic() {
        let schema = shop();
        assert_eq!(compile(&schema), compile(&schema));
    }

    #[test]
    fn test_node_order_preserved() {
        let schema = SchemaMetadata {
            tables: vec![Table::new("A"), Table::new("B"), Table::new("C")],
        };
        let ir = compile(&schema);
        let ids: Vec<&str> = ir.nodes.iter().map(|n| n.id.as_str()).collect();

        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn test_edge_order_follows_tables_then_keys() {
        let schema = SchemaMetadata {
            tables: vec![
                Table::new("C").foreign_key("b_id", "B").foreign_key("a_id", "A"),
                Table::new("B").foreign_key("a_id", "A"),
            ],
        };
        let ir = compile(&schema);
        let edges: Vec<(&str, &str, &str)> = ir
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str(), e.label.as_str()))
            .collect();

        assert_eq!(
            edges,
            [("B", "C", "b_id"), ("A", "C", "a_id"), ("A", "B", "a_id")]
        );
    }

    #[test]
    fn test_field_order_and_types() {
        let ir = compile(&shop());
        let orders = &ir.nodes[1];
        let names: Vec<&str> = orders.fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, ["id", "user_id", "coupon_id"]);
        assert_eq!(ir.nodes[0].fields[1].typ, "VARCHAR(255)");
    }

    #[test]
    fn test_not_null_suppressed_on_pk() {
        let ir = compile(&shop());
        let id = &ir.nodes[0].fields[0];

        assert!(id.primary_key);
        assert!(!id.not_null);

        let email = &ir.nodes[0].fields[1];
        assert!(!email.primary_key);
        assert!(email.not_null);
    }

    #[test]
    fn test_missing_type_defaults_to_text() {
        let ir = compile(&shop());
        let code = &ir.nodes[2].fields[0];

        assert_eq!(code.typ, "TEXT");
        assert!(!code.primary_key);
        assert!(!code.not_null);
    }

    #[test]
    fn test_foreign_key_fields_marked() {
        let ir = compile(&shop());
        let flags: Vec<bool> = ir.nodes[1].fields.iter().map(|f| f.foreign_key).collect();

        assert_eq!(flags, [false, true, true]);
    }

    #[test]
    fn test_edges_point_one_to_many() {
        let ir = compile(&shop());

        assert_eq!(ir.edges.len(), 2);
        assert_eq!(ir.edges[0].from, "users");
        assert_eq!(ir.edges[0].to, "orders");
        assert_eq!(ir.edges[0].label, "user_id");
        assert!(ir.edges.iter().all(|e| e.cardinality == Cardinality::OneToMany));
    }

    #[test]
    fn test_dangling_reference_passed_through() {
        let schema = SchemaMetadata {
            tables: vec![Table::new("orders").foreign_key("ghost_id", "ghosts")],
        };
        let ir = compile(&schema);

        assert_eq!(ir.edges[0].from, "ghosts");
        assert_eq!(ir.nodes.len(), 1);
    }

    #[test]
    fn test_empty_schema() {
        let ir = compile(&SchemaMetadata::default());
        assert!(ir.is_empty());
    }

    #[test]
    fn test_table_without_columns() {
        let ir = compile(&SchemaMetadata {
            tables: vec![Table::default()],
        });

        assert_eq!(ir.nodes.len(), 1);
        assert!(ir.nodes[0].fields.is_empty());
    }
}
