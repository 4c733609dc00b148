//! One-shot read client.
//!
//! Opens the tree database, starts the read service, sends a single request
//! and prints the result as JSON.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use infratree_core::model::entity::{Bucket, Cluster};
use infratree_core::{
    db, init_logging, Action, ConfigError, ReadService, Request, Section, ServiceConfig,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON service configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// SQLite database; overrides the configured path
    #[arg(long, env = "INFRATREE_DB_PATH")]
    db: Option<PathBuf>,
    /// Per-handler inbox depth; overrides the configured depth
    #[arg(long, env = "INFRATREE_INBOX_DEPTH")]
    inbox_depth: Option<usize>,
    #[arg(long, env = "INFRATREE_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for log files; enables logging
    #[arg(long, env = "INFRATREE_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[arg(long, value_parser = parse_section)]
    section: Section,
    #[arg(long, value_parser = parse_action)]
    action: Action,
    /// Object id for show and member-list
    #[arg(long)]
    id: Option<String>,
    #[arg(long, default_value = "admin")]
    user: String,
    /// Parent bucket of a cluster listing
    #[arg(long)]
    bucket: Option<String>,
    /// Parent repository of a bucket listing
    #[arg(long)]
    repository: Option<String>,
    #[arg(long)]
    pretty: bool,
}

fn parse_section(value: &str) -> Result<Section, String> {
    Section::parse(value).ok_or_else(|| format!("unknown section `{value}`"))
}

fn parse_action(value: &str) -> Result<Action, String> {
    Action::parse(value).ok_or_else(|| format!("unknown action `{value}`"))
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let config = resolve_config(&cli)?;
    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, &dir.to_string_lossy())?;
    }

    let conn = match &config.db_path {
        Some(path) => db::open_db_with_cache_capacity(path, config.statement_cache_capacity)?,
        None => return Err("no database path configured; pass --db".into()),
    };
    let service = ReadService::start(&config, db::share(conn))?;

    let (request, receiver) = build_request(&cli);
    let result = service.dispatcher().call(request, &receiver)?;
    info!(
        target: infratree_core::logging::APP_TARGET,
        "event=cli_request module=cli section={} action={} status={:?}",
        result.section,
        result.action,
        result.status
    );

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");

    service.shutdown()?;
    Ok(result.is_ok())
}

/// Layers flag and `INFRATREE_*` overrides over the file configuration.
fn resolve_config(cli: &Cli) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(path) = &cli.db {
        config.db_path = Some(path.clone());
    }
    if let Some(depth) = cli.inbox_depth {
        config.inbox_depth = depth;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn build_request(cli: &Cli) -> (Request, infratree_core::ReplyReceiver) {
    let (mut request, receiver) = Request::new(cli.section, cli.action, cli.user.as_str());
    if let Some(id) = &cli.id {
        request = request.with_object_id(id.as_str());
    }

    if let Some(repository) = &cli.repository {
        let bucket = request.bucket.get_or_insert_with(Bucket::default);
        bucket.repository_id = repository.clone();
    }
    if let Some(bucket_id) = &cli.bucket {
        let cluster = request.cluster.get_or_insert_with(Cluster::default);
        cluster.bucket_id = bucket_id.clone();
    }
    (request, receiver)
}

#[cfg(test)]
mod tests {
    use super::{resolve_config, Cli};
    use clap::Parser;
    use infratree_core::{Action, ConfigError, Section};

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["infratree", "--section", "cluster", "--action", "list"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&["--db", "/var/lib/tree.db", "--inbox-depth", "3"]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(cli.section, Section::Cluster);
        assert_eq!(cli.action, Action::List);
        assert_eq!(config.inbox_depth, 3);
        assert_eq!(
            config.db_path.as_deref(),
            Some(std::path::Path::new("/var/lib/tree.db"))
        );
    }

    #[test]
    fn overrides_are_validated() {
        let cli = parse(&["--inbox-depth", "0"]);
        let err = resolve_config(&cli).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "inbox_depth",
                ..
            }
        ));
    }

    #[test]
    fn bucket_flag_scopes_cluster_listing() {
        let cli = parse(&["--bucket", "b1"]);
        let (request, _receiver) = super::build_request(&cli);
        assert_eq!(request.cluster.unwrap().bucket_id, "b1");
    }
}
