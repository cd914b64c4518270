use anyhow::Context;
use std::process::ExitCode;
use techsupport::cli::commands;
use techsupport::cli::init::{self, InitConfig, InitResult};
use techsupport::cli::output::Output;
use techsupport::cli::{Cli, Commands, TicketCommands, ToolCommands};
use techsupport::utils::logging::init_tracing;
use techsupport::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    // init runs before any config exists
    if let Commands::Init { path, force } = &cli.command {
        init_tracing(&Default::default(), cli.verbose);
        return Ok(
            match init::run(
                InitConfig {
                    path: path.clone(),
                    force: *force,
                },
                &output,
            ) {
                InitResult::Success => ExitCode::SUCCESS,
                InitResult::AlreadyExists | InitResult::Error(_) => ExitCode::FAILURE,
            },
        );
    }

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging, cli.verbose);
    tracing::debug!(model = %config.llm.model, "Configuration loaded");

    let code = match cli.command {
        Commands::Ask {
            message,
            show_tools,
        } => commands::ask(&config, &message, show_tools, &output).await?,
        Commands::Tools(ToolCommands::List) => commands::list_tools(&config, &output)?,
        Commands::Tools(ToolCommands::Show { name }) => commands::show_tool(&config, &name, &output)?,
        Commands::Tools(ToolCommands::Run { name, args }) => {
            commands::run_tool(&config, &name, &args, &output).await?
        }
        Commands::Tickets(TicketCommands::Search { query, k }) => {
            commands::search_tickets(&config, &query, k, &output).await?
        }
        Commands::Tickets(TicketCommands::Check) => commands::check_tickets(&config, &output).await?,
        Commands::Config { validate } => commands::show_config(&config, validate, &output)?,
        Commands::Init { .. } => ExitCode::SUCCESS,
    };

    Ok(code)
}
