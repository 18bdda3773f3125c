pub mod lower;
pub mod real_width;

use std::path::PathBuf;

use tessera_layout::LoweringConfig;

use crate::error::CliError;

/// Layers the `--config` file and then `--target` over `base`.
pub fn resolve_config(
    base: LoweringConfig,
    config: Option<PathBuf>,
    target: Option<String>,
) -> Result<LoweringConfig, CliError> {
    let config = match config {
        Some(path) => LoweringConfig::load(&path)?,
        None => base,
    };
    Ok(config.with_triple(target))
}
