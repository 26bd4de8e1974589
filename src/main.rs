use clap::Parser;
use netdiag::*;
use std::io::Write;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        })
        .filter_module("hickory_proto", log::LevelFilter::Warn)
        .filter_module("hickory_resolver", log::LevelFilter::Warn)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let summary = match diagnostic::Diagnostic::new(cli.to_config())
        .with_log(&LogFacade)
        .run()
        .await
    {
        Ok(summary) => summary,
        Err(DiagnosticError::EmptyTarget) => {
            log::error!("Error: target cannot be empty.");
            return;
        }
        Err(error) => {
            log::error!("Error: {error}");
            std::process::exit(1);
        }
    };

    print_summary_human(&summary);

    if cli.json || cli.json_out.is_some() {
        if let Err(error) = emit_json(&summary, &cli) {
            log::error!("Error: {error}");
            std::process::exit(1);
        }
    }
}

/// The report goes to stderr so stdout stays clean for JSON.
fn print_summary_human(summary: &DiagnosticSummary) {
    let mut stderr = std::io::stderr().lock();
    if let Err(error) = summary::render_text(summary, &mut stderr) {
        log::warn!("Could not write report: {error}");
    }
}

fn emit_json(summary: &DiagnosticSummary, cli: &cli::Cli) -> Result<(), ReportError> {
    if cli.json {
        println!("{}", summary::to_json(summary)?);
    }
    if let Some(path) = &cli.json_out {
        summary::write_json_file(summary, path)?;
        log::info!("JSON summary written to {}", path.display());
    }
    Ok(())
}
