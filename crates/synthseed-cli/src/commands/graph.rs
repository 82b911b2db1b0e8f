use anyhow::Result;

use synthseed_core::graph::visualize::{self, GraphFormat as VizFormat};
use synthseed_core::graph::DependencyGraph;

use crate::args::GraphArgs;

pub async fn run(args: &GraphArgs) -> Result<()> {
    let (_, schema) = super::load_validated(&args.schema)?;
    let dep_graph = DependencyGraph::from_schema(&schema);

    let format = match args.format {
        crate::args::GraphFormat::Mermaid => VizFormat::Mermaid,
        crate::args::GraphFormat::Dot => VizFormat::Dot,
    };

    println!("{}", visualize::visualize(&dep_graph, format));

    Ok(())
}
