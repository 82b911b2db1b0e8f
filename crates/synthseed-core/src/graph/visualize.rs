use crate::graph::dag::DependencyGraph;
use petgraph::visit::EdgeRef;

/// Output format for graph visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

/// Generate a visualization of the dependency graph.
pub fn visualize(graph: &DependencyGraph, format: GraphFormat) -> String {
    match format {
        GraphFormat::Mermaid => generate_mermaid(graph),
        GraphFormat::Dot => generate_dot(graph),
    }
}

fn generate_mermaid(graph: &DependencyGraph) -> String {
    let mut output = String::from("graph TD\n");

    for node in graph.graph.node_indices() {
        let name = graph.table_name(node);
        output.push_str(&format!("    {}[{}]\n", name, name));
    }

    output.push('\n');

    for edge in graph.graph.edge_references() {
        let from = graph.table_name(edge.source());
        let to = graph.table_name(edge.target());
        let arrow = if edge.weight().is_nullable {
            "-.->"
        } else {
            "-->"
        };
        output.push_str(&format!(
            "    {} {}|{}| {}\n",
            from,
            arrow,
            edge.weight().source_column,
            to
        ));
    }

    for (table, info) in &graph.self_references {
        output.push_str(&format!(
            "    {} -.->|{} (self)| {}\n",
            table, info.source_column, table
        ));
    }

    output
}

fn generate_dot(graph: &DependencyGraph) -> String {
    let mut output = String::from("digraph dependencies {\n");
    output.push_str("    rankdir=TB;\n");
    output.push_str("    node [shape=box, style=rounded];\n\n");

    // Isolated tables still need a node
    for node in graph.graph.node_indices() {
        output.push_str(&format!("    \"{}\";\n", graph.table_name(node)));
    }

    for edge in graph.graph.edge_references() {
        let from = graph.table_name(edge.source());
        let to = graph.table_name(edge.target());
        let style = if edge.weight().is_nullable {
            ", style=dashed"
        } else {
            ""
        };
        output.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{}\"{}];\n",
            from,
            to,
            edge.weight().source_column,
            style
        ));
    }

    for (table, info) in &graph.self_references {
        output.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{} (self)\", style=dashed, color=red];\n",
            table, table, info.source_column
        ));
    }

    output.push_str("}\n");
    output
}
