use clap::Parser;
use securevault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr and never include key or password values.
    // RUST_LOG overrides the level chosen with -v.
    let default_filter = securevault::cli::log_filter(cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Keygen { force } => securevault::cli::commands::keygen::execute(&cli, force),
        Commands::Create { ref seeds, force } => {
            securevault::cli::commands::create::execute(&cli, seeds, force)
        }
        Commands::Add {
            ref site,
            ref password,
        } => securevault::cli::commands::add::execute(&cli, site, password.as_deref()),
        Commands::Get { ref site } => securevault::cli::commands::get::execute(&cli, site),
        Commands::List => securevault::cli::commands::list::execute(&cli),
        Commands::Menu => securevault::cli::commands::menu::execute(&cli),
    };

    if let Err(e) = result {
        securevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
