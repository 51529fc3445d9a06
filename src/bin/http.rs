#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use session_calendar::{http_api, load_config_from_json, load_snapshot_from_json};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr: SocketAddr = std::env::var("SESSION_CALENDAR_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let (sessions, saved_config) = match std::env::var("SESSION_CALENDAR_DATA") {
        Ok(path) => {
            let snapshot = load_snapshot_from_json(path)?;
            (snapshot.sessions, snapshot.config)
        }
        Err(_) => (Vec::new(), None),
    };

    // an explicit config file wins over the one stored with the data
    let config = match std::env::var("SESSION_CALENDAR_CONFIG") {
        Ok(path) => load_config_from_json(path)?,
        Err(_) => saved_config.unwrap_or_default(),
    };

    println!("session-calendar HTTP API listening on http://{addr}");
    http_api::serve(addr, sessions, config).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
