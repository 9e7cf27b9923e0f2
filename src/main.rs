use clap::Parser;

use statement_extractor::cli::{self, Cli, Commands, OutputOptions};
use statement_extractor::config::Config;
use statement_extractor::models::ProblemKey;
use statement_extractor::server;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::new();

    match cli.command {
        Some(Commands::Serve) | None => {
            actix_web::rt::System::new().block_on(server::run(config))?;
        }
        Some(Commands::Parse {
            file,
            contest,
            index,
            tags,
            diagnostics,
            compact,
        }) => {
            let output = OutputOptions { diagnostics, compact };
            cli::handle_parse(&config, &file, ProblemKey::new(contest, index), tags, output)?;
        }
        Some(Commands::Fetch {
            contest,
            index,
            tags,
            diagnostics,
            compact,
        }) => {
            let output = OutputOptions { diagnostics, compact };
            let key = ProblemKey::new(contest, index);
            actix_web::rt::System::new().block_on(cli::handle_fetch(&config, key, tags, output))?;
        }
    }

    Ok(())
}
