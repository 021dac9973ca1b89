//! argocd-config-check binary entry point.
//! Selects a data source, runs both check phases and prints the results.

use argocd_config_check::check::{self, Summary};
use argocd_config_check::cli::Cli;
use argocd_config_check::config::{self, Effective};
use argocd_config_check::models::Severity;
use argocd_config_check::output;
use argocd_config_check::source::live::LiveSource;
use argocd_config_check::source::omc::OmcSource;
use argocd_config_check::source::DataSource;
use argocd_config_check::utils::{error_prefix, note_prefix};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    // RUST_LOG wins over --verbose
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("argocd_config_check=debug")
    } else {
        EnvFilter::new("argocd_config_check=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(eff: &Effective, message: &str) -> ! {
    eprintln!("{} {}", error_prefix(eff.colors), message);
    std::process::exit(1);
}

fn status(eff: &Effective, message: &str) {
    if !eff.is_json() {
        println!("{}", message);
    }
}

fn open_source(eff: &Effective) -> Box<dyn DataSource> {
    match &eff.must_gather {
        None => match LiveSource::from_system_config() {
            Ok(live) => {
                status(eff, "Using default K8s client configuration from '.kube/config'");
                Box::new(live)
            }
            Err(err) => fail(
                eff,
                &format!("unable to retrieve system K8s client configuration: {}", err),
            ),
        },
        Some(path) => match OmcSource::open(&eff.omc, path) {
            Ok(omc) => {
                status(
                    eff,
                    &format!("Using must-gather from '{}'", omc.must_gather().display()),
                );
                Box::new(omc)
            }
            Err(err) => fail(
                eff,
                &format!(
                    "unable to retrieve OMC client data from '{}': {}",
                    path.display(),
                    err
                ),
            ),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let eff = config::resolve_effective(
        cli.must_gather.clone(),
        cli.output.map(|o| o.as_str()),
        cli.namespace.as_deref(),
        cli.omc.as_deref(),
        cli.check,
        |key: &str| std::env::var(key).ok(),
    );
    debug!(?eff, "effective configuration");
    if !matches!(eff.output.as_str(), "human" | "json") {
        eprintln!(
            "{} unsupported output mode '{}' (expected human or json)",
            error_prefix(eff.colors),
            eff.output
        );
        std::process::exit(2);
    }

    let source = open_source(&eff);
    status(&eff, "");

    let resolution = check::resolve_phase(source.as_ref());
    let resolution_failed = resolution
        .entries
        .iter()
        .any(|e| e.severity >= Severity::Error);

    if resolution.is_fatal() {
        if eff.is_json() {
            output::print_json(&resolution, &[]);
        } else {
            output::print_entries(&resolution.entries, eff.colors);
        }
        std::process::exit(if eff.check { 1 } else { 0 });
    }

    if !eff.is_json() {
        output::print_entries(&resolution.entries, eff.colors);
        output::print_installation_summary(&resolution);
    }

    let reports =
        match check::inspect_instances(source.as_ref(), &resolution.state, eff.namespace.as_deref()) {
            Ok(reports) => reports,
            Err(err) => {
                if let Some(hint) = err.hint() {
                    eprintln!("{} {}", note_prefix(eff.colors), hint);
                }
                fail(&eff, &err.to_string())
            }
        };

    if eff.is_json() {
        output::print_json(&resolution, &reports);
    } else {
        for report in &reports {
            output::print_instance_report(report, eff.colors);
        }
    }

    let summary = Summary::from_reports(&reports);
    debug!(?summary, "run finished");
    if eff.check && (resolution_failed || summary.errors > 0) {
        std::process::exit(1);
    }
}
