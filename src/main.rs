//! clearsky-loss entry point: CLI wiring and config-driven pipeline run.

use std::process;

use tracing::Level;

use clearsky_loss::cli::{self, CliCommand, CliOptions};
use clearsky_loss::config::StudyConfig;
use clearsky_loss::io::export::export_csv;
use clearsky_loss::sim::pipeline;

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Loads the study: `--scenario` takes priority, then `--preset`, then
/// the Maringá default. Command-line overrides are applied last.
fn load_study(opts: &CliOptions) -> StudyConfig {
    let loaded = if let Some(ref path) = opts.scenario {
        StudyConfig::from_toml_file(path)
    } else if let Some(ref name) = opts.preset {
        StudyConfig::from_preset(name)
    } else {
        Ok(StudyConfig::maringa())
    };
    let mut study = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    opts.overrides.apply(&mut study);
    study
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(CliCommand::Run(opts)) => opts,
        Ok(CliCommand::Help) => {
            cli::print_help();
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_help();
            process::exit(1);
        }
    };
    init_tracing(opts.verbose);

    let study = load_study(&opts);

    let errors = study.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Serve with the loaded study as the request defaults
    #[cfg(feature = "api")]
    if opts.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(clearsky_loss::api::AppState { defaults: study });
        let addr = SocketAddr::from(([0, 0, 0, 0], opts.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(clearsky_loss::api::serve(state, addr)) {
            eprintln!("error: API server failed on {addr}: {e}");
            process::exit(1);
        }
        return;
    }

    let run = study
        .to_request()
        .and_then(pipeline::run)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });

    println!("{}", run.report);
    println!();
    println!("{}", run.headline());

    if let Some(ref path) = opts.series_out {
        if let Err(e) = export_csv(&run, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Series written to {}", path.display());
    }
}
