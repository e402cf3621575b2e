use anyhow::Result;
use depot_config::Config;

pub async fn handle(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    depot_server::serve(&config).await
}
