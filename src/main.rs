use std::env;
use std::process;

use tracing_subscriber::EnvFilter;
use vitrack::cli;
use vitrack::config::AppConfig;

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    process::exit(cli::run_with_args(&args, &config));
}
