use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = twinsim::api::Cli::parse();
    if let Err(e) = twinsim::api::run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
