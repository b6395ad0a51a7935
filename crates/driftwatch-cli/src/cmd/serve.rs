use anyhow::Result;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>) -> Result<()> {
    let config = super::load_config(root)?;
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(driftwatch_server::serve(config, port))
}
