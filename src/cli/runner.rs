//! CLI runner - executes commands

use crate::auth::Authenticator;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::RetrieveConfig;
use crate::engine::{RetrievalEngine, RetrieveOutcome};
use crate::error::{Error, Result};
use crate::output::{JsonLinesConfig, JsonLinesWriter, WriteMode};
use crate::pause::PauseStore;
use crate::request::parse_timestamp;
use crate::transport::HttpTransport;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

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
            Commands::Retrieve {
                object,
                properties,
                start,
                end,
                filter_field,
                no_filter,
                output,
                pause_file,
                budget_secs,
            } => {
                let options = RetrieveOptions {
                    object,
                    properties: properties.as_deref(),
                    start: start.as_deref(),
                    end: end.as_deref(),
                    filter_field: filter_field.as_deref(),
                    no_filter: *no_filter,
                };
                self.retrieve(options, output.as_deref(), pause_file, *budget_secs)
                    .await
            }
            Commands::Resume {
                pause_file,
                output,
                budget_secs,
            } => {
                self.resume(pause_file, output.as_deref(), *budget_secs)
                    .await
            }
            Commands::Objects => self.objects(),
            Commands::Validate => self.validate(),
        }
    }

    /// Load the config file
    fn load_config(&self) -> Result<RetrieveConfig> {
        RetrieveConfig::from_file(&self.cli.config)
    }

    /// Wire transport, auth, retry and pause from the config
    fn build_engine(config: &RetrieveConfig, budget_secs: Option<u64>) -> Result<RetrievalEngine> {
        let transport = HttpTransport::with_config(config.transport_config())?;
        let auth = Authenticator::new(config.auth.clone());

        Ok(RetrievalEngine::new(Arc::new(transport), Arc::new(auth))
            .with_retry(config.retry_policy())
            .with_pause(config.pause.controller(budget_secs)))
    }

    /// Open the JSON lines writer, stdout when no path is given
    async fn open_output(output: Option<&Path>, mode: WriteMode) -> Result<JsonLinesWriter> {
        let config = JsonLinesConfig::new()
            .with_mode(mode)
            .with_flush_each_page(true);
        match output {
            Some(path) => JsonLinesWriter::open(path, &config).await,
            None => Ok(JsonLinesWriter::stdout(&config)),
        }
    }

    async fn retrieve(
        &self,
        options: RetrieveOptions<'_>,
        output: Option<&Path>,
        pause_file: &Path,
        budget_secs: Option<u64>,
    ) -> Result<()> {
        let config = self.load_config()?;

        let definition = match (config.object(options.object), options.properties) {
            (Some(definition), _) => definition.clone(),
            (None, Some(_)) => crate::config::ObjectDefinition::default(),
            (None, None) => {
                return Err(Error::config(format!(
                    "Unknown object '{}': define it in the config or pass --properties",
                    options.object
                )))
            }
        };

        for (flag, value) in [("--start", options.start), ("--end", options.end)] {
            if let Some(raw) = value.filter(|raw| parse_timestamp(raw).is_none()) {
                warn!("Ignoring unparseable {flag} value '{raw}', using the default bound");
            }
        }

        let mut builder = definition
            .request_builder(options.object)
            .start_str(options.start)
            .end_str(options.end);
        if let Some(properties) = options.properties {
            builder = builder.properties(properties.iter().cloned());
        }
        if let Some(field) = options.filter_field {
            builder = builder.filter_field(field);
        }
        if options.no_filter {
            builder = builder.no_filter();
        }

        let engine = Self::build_engine(&config, budget_secs)?;
        let store = PauseStore::new(pause_file);
        let writer = Self::open_output(output, WriteMode::Create).await?;

        let outcome = engine.submit(builder.build(), &writer, &store).await?;
        writer.flush().await?;

        // A pause file left by an earlier run would resume a stale cursor
        if !outcome.is_paused() {
            store.clear().await?;
        }

        self.report(&summary(options.object, &outcome, &store), output);
        Ok(())
    }

    async fn resume(
        &self,
        pause_file: &Path,
        output: Option<&Path>,
        budget_secs: Option<u64>,
    ) -> Result<()> {
        let config = self.load_config()?;
        let store = PauseStore::new(pause_file);
        let paused = store.load_required().await?;
        let object = paused.object_type.clone();

        let engine = Self::build_engine(&config, budget_secs)?;
        let writer = Self::open_output(output, WriteMode::Append).await?;

        let outcome = engine.resume(paused, &writer, &store).await?;
        writer.flush().await?;

        // A new pause has already overwritten the file
        if !outcome.is_paused() {
            store.clear().await?;
        }

        self.report(&summary(&object, &outcome, &store), output);
        Ok(())
    }

    fn objects(&self) -> Result<()> {
        let config = self.load_config()?;

        let objects: Vec<Value> = config
            .objects
            .iter()
            .map(|(name, definition)| {
                json!({
                    "name": name,
                    "properties": definition.properties,
                    "filter_field": definition.filter_field,
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "OBJECTS",
            "objects": objects
        }));

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&json!({
            "type": "VALIDATE",
            "status": "ok",
            "endpoint": config.endpoint,
            "objects": config.objects.len()
        }));

        Ok(())
    }

    fn render(&self, msg: &Value) -> String {
        match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg).unwrap_or_default(),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg).unwrap_or_default(),
        }
    }

    fn output_message(&self, msg: &Value) {
        println!("{}", self.render(msg));
    }

    /// Print a run summary without mixing it into records on stdout
    fn report(&self, msg: &Value, output: Option<&Path>) {
        match summary_stream(output) {
            Stream::Stdout => println!("{}", self.render(msg)),
            Stream::Stderr => eprintln!("{}", self.render(msg)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Records own stdout when no output file is given
fn summary_stream(output: Option<&Path>) -> Stream {
    match output {
        Some(_) => Stream::Stdout,
        None => Stream::Stderr,
    }
}

/// Request options of the retrieve command
struct RetrieveOptions<'a> {
    object: &'a str,
    properties: Option<&'a [String]>,
    start: Option<&'a str>,
    end: Option<&'a str>,
    filter_field: Option<&'a str>,
    no_filter: bool,
}

/// One-line summary of a finished run
fn summary(object: &str, outcome: &RetrieveOutcome, store: &PauseStore) -> Value {
    let stats = outcome.stats();
    let mut msg = json!({
        "type": if outcome.is_paused() { "PAUSED" } else { "COMPLETED" },
        "object": object,
        "pages": stats.pages_fetched,
        "records": stats.records_fetched,
        "retries": stats.retries,
        "duration_ms": stats.duration_ms,
    });
    if outcome.is_paused() {
        msg["pause_file"] = json!(store.path().display().to_string());
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RetrieveStats;
    use pretty_assertions::assert_eq;

    fn stats() -> RetrieveStats {
        RetrieveStats {
            pages_fetched: 2,
            records_fetched: 7,
            retries: 1,
            duration_ms: 40,
        }
    }

    #[test]
    fn test_summary_completed() {
        let store = PauseStore::new("paused.json");
        let msg = summary("Send", &RetrieveOutcome::Completed(stats()), &store);
        assert_eq!(
            msg,
            json!({
                "type": "COMPLETED",
                "object": "Send",
                "pages": 2,
                "records": 7,
                "retries": 1,
                "duration_ms": 40
            })
        );
    }

    #[test]
    fn test_summary_leaves_stdout_to_records() {
        assert_eq!(summary_stream(None), Stream::Stderr);
        assert_eq!(
            summary_stream(Some(Path::new("out/send.jsonl"))),
            Stream::Stdout
        );
    }

    #[test]
    fn test_summary_paused_names_pause_file() {
        let store = PauseStore::new("state/paused.json");
        let msg = summary("Send", &RetrieveOutcome::Paused(stats()), &store);
        assert_eq!(msg["type"], "PAUSED");
        assert_eq!(msg["pause_file"], "state/paused.json");
    }
}
