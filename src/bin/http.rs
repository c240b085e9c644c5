#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use construction_scheduler::{ScopeLibrary, http_api};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("construction_scheduler=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("SCHEDULE_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let scopes = match std::env::var("SCHEDULE_SCOPES_FILE") {
        Ok(path) => ScopeLibrary::load_toml(path)?,
        Err(_) => ScopeLibrary::standard(),
    };

    println!("construction-scheduler HTTP API listening on http://{addr}");
    http_api::serve(addr, http_api::AppState::new(scopes)).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
