use std::path::PathBuf;

use log::info;
use tessera_layout::{LoweredType, LoweringContext, PlatformDescriptor};

use crate::commands::resolve_config;
use crate::error::CliError;
use crate::graph::{self, GraphFile, TypeGraph};
use crate::io::read_file;

pub fn handle_lower(
    file: PathBuf,
    target: Option<String>,
    config: Option<PathBuf>,
    clif: bool,
) -> Result<(), CliError> {
    let src = read_file(file.clone())?;
    let graph_file = GraphFile::parse(&src, file)?;
    let config = resolve_config(graph_file.config(), config, target)?;
    let platform = config.platform()?;
    info!("lowering {} types for {:?}", graph_file.types.len(), platform);

    let graph = graph::build(&graph_file)?;
    print!("{}", lower_graph(&graph, platform, clif)?);
    Ok(())
}

/// Lowers every named entry and renders one line each, followed by the
/// bodies of the records that were reached.
pub fn lower_graph(
    graph: &TypeGraph,
    platform: PlatformDescriptor,
    clif: bool,
) -> Result<String, CliError> {
    let mut cx = LoweringContext::new(&graph.table, platform);
    let mut out = String::new();

    for (name, id) in &graph.named {
        let lowered = cx.resolve(*id)?;
        out.push_str(&format!("{} = {}", name, cx.render(lowered)));
        if clif {
            match cx.clif_type(lowered) {
                Some(ty) => out.push_str(&format!("  ; clif {}", ty)),
                None => out.push_str("  ; clif -"),
            }
        }
        out.push('\n');
    }

    for (record, ty) in cx.lowered().iter() {
        let LoweredType::Record { name } = ty else { continue };
        let body = match cx.record_body(record) {
            Some(fields) => {
                let fields: Vec<_> = fields.iter().map(|field| cx.render(*field)).collect();
                format!("{{ {} }}", fields.join(", "))
            }
            None => "opaque".to_string(),
        };
        out.push_str(&format!("%{} = type {}\n", name, body));
    }

    let stats = cx.cache().stats();
    info!(
        "{} entries, {} hits, {} forward-reference candidates discarded",
        cx.cache().len(),
        stats.hits,
        stats.discarded
    );
    Ok(out)
}
