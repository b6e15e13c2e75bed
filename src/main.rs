use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fbget=info,fbget_lib=info")),
        )
        .init();

    let config = fbget_lib::config::get_config()?;
    let secrets = fbget_lib::config::Secrets::from_env()?;

    fbget_lib::run(config, secrets).await
}
