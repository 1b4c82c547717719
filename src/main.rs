use account_api::configuration::get_configuration;
use account_api::startup::{build_repository, run};
use account_api::telemetry::init_telemetry;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let repository = build_repository(&configuration.database)
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialise user store: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "User store error")
        })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        repository,
        configuration.jwt.clone(),
        configuration.password.clone(),
    )?;
    server.await
}
