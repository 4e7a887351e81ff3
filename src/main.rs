use std::env;

use presale_npv::config::ServerConfig;
use presale_npv::error::CompareError;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let raw_args: Vec<String> = env::args().collect();

    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        presale_npv::logging::init_logging();

        let mut config = match ServerConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        };
        if let Some(port) = raw_args.get(2).and_then(|s| s.parse::<u16>().ok()) {
            config = config.with_port(port);
        }

        if let Err(e) = presale_npv::api::run_http_server(config).await {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match presale_npv::api::run_cli(raw_args) {
        Ok(report) => print!("{report}"),
        Err(CompareError::Usage(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
