use pktlab_cli::{commands, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
