use anyhow::{Context, Result};
use clap::Parser;
use modify_headers::cli::{helpers, Cli, Commands, Services};
use modify_headers::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first to get debug flag
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    let level = if cli.debug {
        tracing::Level::DEBUG // DEBUG level or higher when --debug
    } else {
        tracing::Level::WARN // WARN level or higher in normal operation (errors and warnings only)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let services = Services::open(config).await?;

    // Without a subcommand, keep rules synchronized (default mode)
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => helpers::run_service(services).await?,
        Commands::Sync => helpers::handle_sync(&services).await?,
        Commands::Rules => helpers::handle_rules(&services).await?,
        Commands::Compile => helpers::handle_compile(&services).await?,
        Commands::List => helpers::handle_list(&services).await?,
        Commands::Add(args) => helpers::handle_add(&services, &args).await?,
        Commands::Edit(args) => helpers::handle_edit(&services, &args).await?,
        Commands::Clone(args) => helpers::handle_clone(&services, &args.id).await?,
        Commands::Delete(args) => helpers::handle_delete(&services, &args.id).await?,
        Commands::Enable(args) => helpers::handle_set_enabled(&services, &args.id, true).await?,
        Commands::Disable(args) => helpers::handle_set_enabled(&services, &args.id, false).await?,
        Commands::Export(args) => helpers::handle_export(&services, &args).await?,
        Commands::Import(args) => helpers::handle_import(&services, &args).await?,
    }

    Ok(())
}
