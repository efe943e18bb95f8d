//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::operations::{
    builtin_catalog, execute, load_catalog, lookup, HttpPageFetcher, ListInvocation,
    OperationCatalog, OperationDefinition,
};
use crate::pagination::PaginationSummary;
use serde_json::{json, Value};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List {
                operation,
                params,
                max_result,
                next_token,
                no_auto_iteration,
                select,
                pass_thru,
            } => {
                let mut invocation = ListInvocation::new();
                for (name, value) in params {
                    invocation = invocation.param(name, value);
                }
                invocation.max_results = *max_result;
                invocation.next_token.clone_from(next_token);
                invocation.no_auto_iteration = *no_auto_iteration;
                invocation.select.clone_from(select);
                invocation.pass_thru = *pass_thru;

                self.list(operation, &invocation).await.map(|_| ())
            }
            Commands::Operations => self.operations(),
            Commands::Describe { operation } => self.describe(operation),
        }
    }

    /// Settings from the settings file, the environment and the global flags
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.cli.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        settings.apply_process_env()?;

        if let Some(region) = &self.cli.region {
            settings.region.clone_from(region);
        }
        if let Some(url) = &self.cli.endpoint_url {
            settings.endpoint_url = Some(url.clone());
        }
        if let Some(mode) = self.cli.iteration_mode {
            settings.iteration_mode = mode.into();
        }
        settings.validate()?;

        debug!(
            region = %settings.region,
            endpoint_url = ?settings.endpoint_url,
            iteration_mode = %settings.iteration_mode,
            "settings loaded"
        );
        Ok(settings)
    }

    /// The catalog file given with `--operations`, else the built-in catalog
    fn load_catalog(&self) -> Result<OperationCatalog> {
        match &self.cli.operations {
            Some(path) => load_catalog(path),
            None => builtin_catalog(),
        }
    }

    /// Run a list operation, writing each output value to stdout
    async fn list(&self, operation: &str, invocation: &ListInvocation) -> Result<PaginationSummary> {
        let settings = self.load_settings()?;
        let catalog = self.load_catalog()?;
        let definition = lookup(&catalog, operation)?.clone();

        let endpoint = settings.endpoint_for(&definition);
        let cancel = shutdown_signal();
        let client = HttpClient::with_config(settings.http_client_config(&endpoint))?
            .with_cancellation(cancel.clone());
        let fetcher = HttpPageFetcher::new(client, definition.clone());

        debug!(operation = %definition.name, %endpoint, "starting list call");

        let summary = execute(
            &definition,
            invocation,
            &fetcher,
            &settings.pagination_policy(),
            &cancel,
            |value| self.output_value(&value),
        )
        .await?;

        if summary.cancelled {
            warn!(operation = %definition.name, "list call interrupted");
        }
        if let Some(token) = &summary.next_token {
            info!(
                "More results are available. To continue, run again with --next-token {token}"
            );
        }
        Ok(summary)
    }

    /// Print the catalog's operations
    fn operations(&self) -> Result<()> {
        let catalog = self.load_catalog()?;
        for op in &catalog.operations {
            self.output_value(&operation_summary(op))?;
        }
        Ok(())
    }

    /// Print one operation definition
    fn describe(&self, operation: &str) -> Result<()> {
        let catalog = self.load_catalog()?;
        let definition = lookup(&catalog, operation)?;
        self.output_value(&serde_json::to_value(definition)?)
    }

    /// Write a value to stdout in the selected format
    fn output_value(&self, value: &Value) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        write_value(&mut out, self.cli.format, value)
    }
}

/// Write `value` followed by a newline
fn write_value(out: &mut impl Write, format: OutputFormat, value: &Value) -> Result<()> {
    match format {
        OutputFormat::Json => serde_json::to_writer(&mut *out, value)?,
        OutputFormat::Pretty => serde_json::to_writer_pretty(&mut *out, value)?,
    }
    writeln!(out).map_err(Error::from)
}

fn operation_summary(op: &OperationDefinition) -> Value {
    json!({
        "name": op.name,
        "method": op.method,
        "path": op.path,
        "items_field": op.items_field,
        "description": op.description,
    })
}

/// Token cancelled on the first Ctrl-C or SIGTERM.
///
/// The call stops before its next page or retry wait. A second signal exits
/// the process at once.
fn shutdown_signal() -> CancellationToken {
    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();

        async move {
            let mut signals = ShutdownSignals::new();

            let Some(name) = signals.recv().await else {
                return;
            };
            info!("Received {name}. Stopping after the current page; signal again to exit now.");
            cancel.cancel();

            if let Some(name) = signals.recv().await {
                warn!("Received {name} again. Exiting.");
                std::process::exit(130);
            }
        }
    });

    cancel
}

/// SIGINT, plus SIGTERM where the platform has it
struct ShutdownSignals {
    #[cfg(unix)]
    sigterm: Option<tokio::signal::unix::Signal>,
}

impl ShutdownSignals {
    fn new() -> Self {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let sigterm = signal(SignalKind::terminate())
                .map_err(|e| warn!("Cannot listen for SIGTERM: {e}"))
                .ok();
            Self { sigterm }
        }

        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Wait for the next signal; None if signals cannot be received
    async fn recv(&mut self) -> Option<&'static str> {
        #[cfg(unix)]
        if let Some(sigterm) = self.sigterm.as_mut() {
            return tokio::select! {
                res = tokio::signal::ctrl_c() => res.ok().map(|()| "SIGINT"),
                _ = sigterm.recv() => Some("SIGTERM"),
            };
        }

        tokio::signal::ctrl_c().await.ok().map(|()| "SIGINT")
    }
}
