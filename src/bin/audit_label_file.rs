//! Utility to audit an extracted label JSON file and print the report
//!
//! Usage: audit_label_file <label.json> [--panel]

use flc::{AuditConfig, Auditor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("flc=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: audit_label_file <label.json> [--panel]");
        std::process::exit(2);
    };
    let show_panel = args.any(|a| a == "--panel");

    let auditor = Auditor::from_config(AuditConfig::from_env()?)?;
    let text = std::fs::read_to_string(&path)?;
    let report = auditor.audit_json(&text);

    println!("{}", serde_json::to_string_pretty(&report)?);

    if show_panel {
        eprintln!();
        eprint!("{}", report.panel());
    }

    eprintln!();
    eprintln!(
        "Score: {} | Status: {} | Critical: {} | Major: {} | Minor: {}",
        report.score(),
        report.status(),
        report.critical().len(),
        report.major().len(),
        report.minor().len()
    );

    Ok(())
}
