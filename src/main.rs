//! Food Label Compliance (FLC)
//!
//! An MCP server for auditing food nutrition labels.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use flc::build_info::BuildInfo;
use flc::mcp::FlcService;
use flc::{AuditConfig, Auditor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("flc=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = AuditConfig::from_env()?;
    let auditor = Auditor::from_config(config)?;

    // Print startup banner to stderr
    eprintln!("{}", BuildInfo::new(auditor.rules()));
    match &auditor.config().rules_path {
        Some(path) => eprintln!("Rule table: {}", path.display()),
        None => eprintln!("Rule table: embedded ({})", auditor.rules().jurisdiction.regulation),
    }
    eprintln!("Calorie tolerance: {:.0}%", auditor.config().calorie_tolerance * 100.0);
    eprintln!("Starting MCP server on stdio...");

    // Create the FLC service
    let service = FlcService::new(auditor);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
