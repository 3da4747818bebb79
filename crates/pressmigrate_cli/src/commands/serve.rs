//! Serve command implementation.

use pressmigrate_server::{serve, ExportServer, MemorySource, ServerConfig};
use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

/// Serves the records in `records` until interrupted.
pub fn run(
    records: &Path,
    bind: SocketAddr,
    prefix: &str,
    page_size: u32,
    token: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let source = MemorySource::load(records)?;
    let mut config = ServerConfig::new(bind)
        .with_route_prefix(prefix)
        .with_default_page_size(page_size);
    let generated = token.as_deref().map_or(true, |t| t.trim().is_empty());
    if let Some(token) = token.filter(|_| !generated) {
        config = config.with_token(token);
    }

    let server = ExportServer::new(config, source)?;
    println!(
        "Serving {} records from {}",
        server.source().len(),
        records.display()
    );
    println!("Posts endpoint: http://{}{}", bind, server.config().posts_path());
    if generated {
        println!("Export token: {}", server.token());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(Arc::new(server), bind))?;
    Ok(())
}
