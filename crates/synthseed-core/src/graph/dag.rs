use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::schema::document::RawSchema;
use crate::schema::types::ValidatedSchema;

/// A directed graph representing table dependencies via foreign keys.
/// Edges point from dependent table to referenced table (child → parent).
pub struct DependencyGraph {
    pub graph: DiGraph<String, EdgeInfo>,
    pub node_indices: HashMap<String, NodeIndex>,
    /// Foreign keys that point back at their own table. Kept out of `graph`
    /// so they do not read as cycles.
    pub self_references: Vec<(String, EdgeInfo)>,
}

/// Information about an edge (foreign key relationship).
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    /// Foreign key column in the dependent table
    pub source_column: String,
    /// Referenced column in the parent table
    pub referenced_column: String,
    pub is_nullable: bool,
}

impl DependencyGraph {
    /// Build from a validated schema. Nodes follow `generation_order`.
    pub fn from_schema(schema: &ValidatedSchema) -> Self {
        let mut builder = Self::empty();
        for name in schema.tables.keys() {
            builder.add_table(name);
        }
        for (name, table) in &schema.tables {
            for column in &table.columns {
                if let Some(fk) = &column.foreign_key {
                    builder.add_reference(
                        name,
                        &fk.referenced_table,
                        EdgeInfo {
                            source_column: column.name.clone(),
                            referenced_column: fk.referenced_column.clone(),
                            is_nullable: column.nullable,
                        },
                    );
                }
            }
        }
        builder
    }

    /// Build from an unvalidated document, in `tables[]` order.
    ///
    /// Tables with empty or duplicate names are skipped, as are foreign keys
    /// pointing at tables that do not exist, so this is safe to call while
    /// validation is still in progress.
    pub fn from_document(schema: &RawSchema) -> Self {
        let mut builder = Self::empty();
        for table in &schema.tables {
            if !table.name.is_empty() {
                builder.add_table(&table.name);
            }
        }
        for table in &schema.tables {
            for column in &table.columns {
                if let Some(fk) = &column.foreign_key {
                    builder.add_reference(
                        &table.name,
                        &fk.table,
                        EdgeInfo {
                            source_column: column.name.clone(),
                            referenced_column: fk.column.clone(),
                            is_nullable: column.nullable,
                        },
                    );
                }
            }
        }
        builder
    }

    fn empty() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            self_references: Vec::new(),
        }
    }

    fn add_table(&mut self, name: &str) {
        if !self.node_indices.contains_key(name) {
            let idx = self.graph.add_node(name.to_string());
            self.node_indices.insert(name.to_string(), idx);
        }
    }

    fn add_reference(&mut self, from: &str, to: &str, info: EdgeInfo) {
        if from == to {
            if self.node_indices.contains_key(from) {
                self.self_references.push((from.to_string(), info));
            }
            return;
        }
        if let (Some(&from_idx), Some(&to_idx)) =
            (self.node_indices.get(from), self.node_indices.get(to))
        {
            self.graph.add_edge(from_idx, to_idx, info);
        }
    }

    /// Get the table name for a node index.
    pub fn table_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Get node index for a table name.
    pub fn node_index(&self, table_name: &str) -> Option<NodeIndex> {
        self.node_indices.get(table_name).copied()
    }

    /// Get all table names in the graph.
    pub fn table_names(&self) -> Vec<&str> {
        self.graph.node_weights().map(|s| s.as_str()).collect()
    }

    /// Get the number of tables.
    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of FK edges, self-references included.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count() + self.self_references.len()
    }
}
