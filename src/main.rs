mod cli;
mod client;
mod config;
mod dispatcher;
mod endpoint;
mod error;
mod output;
mod payload;

use clap::{CommandFactory, Parser};
use cli::Cli;
use config::{Config, Settings};
use dispatcher::{Dispatcher, Invocation};
use endpoint::Method;
use error::ControlError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn list(dispatcher: &Dispatcher, verbose: bool) -> Result<(), ControlError> {
    let endpoints = dispatcher.list_endpoints()?;

    if endpoints.is_empty() {
        eprintln!("No endpoints found!");
        return Ok(());
    }

    if verbose {
        println!("{}", output::render_listing(&endpoints));
    } else {
        println!("{}", output::render_names(&endpoints));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), ControlError> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, config);
    tracing::debug!(?settings, "resolved settings");
    let dispatcher = Dispatcher::new(&settings);

    if cli.list {
        return list(&dispatcher, cli.verbose);
    }

    let Some(name) = cli.endpoint else {
        let _ = Cli::command().print_help();
        return Ok(());
    };

    let method = if cli.delete {
        Some(Method::Delete)
    } else if cli.patch {
        Some(Method::Patch)
    } else {
        None
    };

    let response = match method {
        Some(method) => dispatcher.dispatch(&Invocation {
            name,
            data: cli.data,
            method: Some(method),
        })?,
        None => dispatcher.invoke(&name, cli.data.as_deref())?,
    };
    tracing::debug!("{} {} -> {}", response.method, response.url, response.status);

    if let Some(text) = output::render_response(&response.body) {
        println!("{}", text);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
