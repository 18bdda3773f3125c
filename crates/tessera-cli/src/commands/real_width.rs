use std::path::PathBuf;

use log::info;
use tessera_layout::LoweringConfig;

use crate::commands::resolve_config;
use crate::error::CliError;

pub fn handle_real_width(target: Option<String>, config: Option<PathBuf>) -> Result<(), CliError> {
    let config = resolve_config(LoweringConfig::default(), config, target)?;
    let platform = config.platform()?;
    info!("target platform: {:?}", platform);
    let width = tessera_layout::real_width(&platform);
    println!("{}", width);
    Ok(())
}
