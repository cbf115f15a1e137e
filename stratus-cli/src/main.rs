//! Stratus CLI - deploy and destroy serverless services on AWS.
//!
//! # Commands
//!
//! - `stratus deploy <kind> <name>` - deploy a service and print its record
//! - `stratus destroy --record <file>` - tear down a service from a saved record
//! - `stratus templates` - list the deployable service templates
//! - `stratus invoke <name> [payload]` - invoke a deployed function

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stratus_aws::{AwsConfig, AwsServices};
use stratus_config::{EnvLoader, keys, load_dotenv};
use stratus_deploy::aws::AwsFunctionApi;
use stratus_deploy::provider::FunctionApi;
use stratus_deploy::template::TemplateSource;
use stratus_deploy::{ServiceKind, ServiceRecord, TemplateRegistry, aws_orchestrator};

mod error;

use error::{CliError, CliResult};

/// Stratus - serverless service deployment
#[derive(Parser)]
#[command(name = "stratus")]
#[command(version)]
#[command(about = "Deploy Lambda-backed services to AWS")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a service and print its record as JSON
    #[command(alias = "up")]
    Deploy {
        /// Service kind (aws_upload, instant_database)
        kind: String,

        /// Display name for the service
        name: String,
    },

    /// Tear down a service from its saved record
    #[command(alias = "down")]
    Destroy {
        /// Path to the record JSON printed by `deploy`
        #[arg(long)]
        record: PathBuf,
    },

    /// List the deployable service templates
    Templates,

    /// Invoke a deployed function with a JSON payload
    Invoke {
        /// Deployed (internal) function name
        name: String,

        /// JSON payload
        #[arg(default_value = "{}")]
        payload: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> CliResult<()> {
    load_dotenv(None)?;

    match command {
        Commands::Deploy { kind, name } => deploy(&kind, &name).await,
        Commands::Destroy { record } => destroy(&record).await,
        Commands::Templates => {
            templates();
            Ok(())
        }
        Commands::Invoke { name, payload } => invoke(&name, &payload).await,
    }
}

async fn deploy(kind: &str, name: &str) -> CliResult<()> {
    let kind: ServiceKind = kind.parse()?;
    let orchestrator = aws_orchestrator(aws_services().await?.as_ref())?;

    let record = orchestrator.up(kind, name).await?;

    // The record is the only handle for later teardown; print it so the
    // operator can save it.
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn destroy(record_path: &PathBuf) -> CliResult<()> {
    let record: ServiceRecord = serde_json::from_str(&std::fs::read_to_string(record_path)?)?;
    let orchestrator = aws_orchestrator(aws_services().await?.as_ref())?;

    orchestrator.down(&record).await?;
    println!("destroyed {} ({})", record.name, record.id);
    Ok(())
}

fn templates() {
    let registry = TemplateRegistry::builtin();
    for template in registry.list() {
        println!(
            "{}\t{}\t{}",
            template.kind, template.name, template.description
        );
    }
}

async fn invoke(name: &str, payload: &str) -> CliResult<()> {
    let payload: serde_json::Value = serde_json::from_str(payload)?;
    let services = aws_services().await?;
    let functions = Arc::new(AwsFunctionApi::new(&services));

    let result = functions.invoke(name, payload).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Build the AWS client container, failing fast with the missing key
/// names when credentials are absent.
async fn aws_services() -> CliResult<Arc<AwsServices>> {
    let required = vec![
        keys::AMZ_ID.to_string(),
        keys::AMZ_SEC.to_string(),
        keys::AMZ_REGION.to_string(),
    ];
    EnvLoader::default().check_required(&required)?;

    let services = AwsServices::new(AwsConfig::from_env().build()).await?;
    Ok(services)
}
