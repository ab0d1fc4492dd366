mod config;
mod graphql;
mod http;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use platform_directory::{EmployeeSource, FixtureDirectory};
use platform_obs::{ObsConfig, init_tracing};
use products_roster::{Designation, RoleDirectory, RosterQuery};
use tracing::{info, warn};

use crate::{
    config::{AppConfig, TablesConfig},
    graphql::GraphqlData,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "stableops", version, about = "Stable operations roster service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Print the roster a viewer would see for a file of employees.
    Roster(RosterCommand),
    /// Check the role tables for one-sided or missing entries.
    #[command(name = "tables:audit")]
    TablesAudit,
    /// Print the active role tables as JSON.
    #[command(name = "tables:print")]
    TablesPrint,
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[derive(Args, Debug)]
struct RosterCommand {
    #[arg(long, help = "Designation of the person viewing the list")]
    viewer: String,
    #[arg(long, value_name = "FILE", help = "JSON array (or {\"results\": [...]}) of employees")]
    input: PathBuf,
    #[arg(long, help = "Only keep employees whose name contains this text")]
    search: Option<String>,
    #[arg(long, help = "Drop employees still awaiting approval")]
    approved_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env("stableops"))?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, Arc::new(AppConfig::load()?)).await,
        Command::Roster(cmd) => print_roster(cmd, &TablesConfig::load().role_directory()?).await,
        Command::TablesAudit => audit_tables(&TablesConfig::load().role_directory()?),
        Command::TablesPrint => print_tables(&TablesConfig::load().role_directory()?),
        Command::SchemaPrint { output } => schema_print(output),
    }
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let directory = Arc::new(config.tables.role_directory()?);
    for issue in directory.audit() {
        warn!(%issue, "role table inconsistency");
    }
    let source = config
        .directory
        .build()
        .context("employee directory unavailable")?;
    let schema = graphql::build_schema(GraphqlData {
        directory: directory.clone(),
        source: source.clone(),
    });
    let state = AppState {
        schema,
        config,
        directory,
        source,
    };
    http::serve(cmd.into(), state).await
}

async fn print_roster(cmd: RosterCommand, directory: &RoleDirectory) -> Result<()> {
    let employees = FixtureDirectory::new(cmd.input)
        .list_employees()
        .await?;
    let query = RosterQuery {
        search: cmd.search,
        approved_only: cmd.approved_only,
    };
    let roster = directory.roster(&Designation::parse(&cmd.viewer), &employees, &query);
    info!(listed = employees.len(), shown = roster.len(), "roster computed");
    println!("{}", serde_json::to_string_pretty(&roster)?);
    Ok(())
}

fn audit_tables(directory: &RoleDirectory) -> Result<()> {
    let issues = directory.audit();
    if issues.is_empty() {
        println!("role tables are consistent");
        return Ok(());
    }
    for issue in &issues {
        println!("{issue}");
    }
    bail!("{} role table issue(s) found", issues.len())
}

fn print_tables(directory: &RoleDirectory) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(directory)?);
    Ok(())
}

fn schema_print(path: Option<PathBuf>) -> Result<()> {
    let sdl = graphql::SchemaType::build(
        graphql::QueryRoot,
        async_graphql::EmptyMutation,
        async_graphql::EmptySubscription,
    )
    .finish()
    .sdl();
    match path {
        Some(target) => {
            std::fs::write(&target, sdl)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(path = %target.display(), "schema snapshot written");
        }
        None => print!("{sdl}"),
    }
    Ok(())
}
