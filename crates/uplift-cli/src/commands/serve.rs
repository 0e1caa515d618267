//! Server command implementation

use std::path::Path;

use anyhow::Result;
use uplift_core::UpliftConfig;

use super::open_workbook;

pub async fn cmd_serve(
    data_dir: &Path,
    config: &UpliftConfig,
    host: Option<&str>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or(config.server.host.as_str());
    let port = port.unwrap_or(config.server.port);

    println!("🚀 Starting Uplift web server...");
    println!("   Workbook: {}", data_dir.display());
    println!("   Listening: http://{}:{}", host, port);

    let workbook = open_workbook(data_dir, config)?;
    let loaded: usize = workbook.table_counts().iter().map(|t| t.rows).sum();
    println!("   Rows loaded: {}", loaded);
    println!();
    println!("   Press Ctrl+C to stop");

    let server_config = uplift_server::ServerConfig::from_config(config);
    uplift_server::serve(workbook, host, port, server_config).await?;

    Ok(())
}
