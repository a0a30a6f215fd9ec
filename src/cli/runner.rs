//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{BrowseConfig, SourceConfig};
use crate::equality::{EqualityPolicy, JsonEquality};
use crate::error::{Error, Result, ResultExt};
use crate::pagination::AsyncPagedQueryCursor;
use crate::source::{AsyncSequenceSource, BlockingSource, DuckDbSource, HttpSource, VecSource};
use crate::types::{Navigation, PagePosition};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Type-erased source of JSON records
pub type JsonSource = Box<dyn AsyncSequenceSource<Item = Value>>;

/// Cursor the CLI pages with
pub type JsonCursor = AsyncPagedQueryCursor<JsonSource, JsonEquality>;

/// One rendered page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    #[serde(flatten)]
    pub position: PagePosition,
    pub items: Vec<Value>,
}

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
            Commands::Page { number } => self.page(*number).await,
            Commands::Count => self.count().await,
            Commands::Browse => self.browse().await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load the config file and apply command-line overrides
    fn load_config(&self) -> Result<BrowseConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;

        let mut config = BrowseConfig::from_file(path)?;
        if let Some(page_size) = self.cli.page_size {
            config.pager.page_size = page_size;
        }
        if let Some(window_size) = self.cli.window_size {
            config.pager.window_size = window_size;
        }
        if let Some(group_by) = &self.cli.group_by {
            config.group_by = Some(group_by.clone());
        }
        config.validate()?;

        debug!(config = %path.display(), "Loaded pager config");
        Ok(config)
    }

    /// Build a cursor over the configured source
    fn build_cursor(&self, config: &BrowseConfig) -> Result<JsonCursor> {
        let source = open_source(&config.source)?;
        let equality = JsonEquality::from_group_by(config.group_by.as_deref());
        info!(
            source = config.source.kind(),
            page_size = config.pager.page_size,
            window_size = config.pager.window_size,
            group_by = config.group_by.as_deref().unwrap_or("<record>"),
            "Opened source"
        );
        AsyncPagedQueryCursor::with_config(source, &config.pager, equality)
    }

    async fn page(&self, number: usize) -> Result<()> {
        let config = self.load_config()?;
        let mut cursor = self.build_cursor(&config)?;
        let report = page_report(&mut cursor, number).await?;
        self.output_page(&report, &cursor);
        Ok(())
    }

    async fn count(&self) -> Result<()> {
        let config = self.load_config()?;
        let mut cursor = self.build_cursor(&config)?;
        let total = cursor.total_item_count().await?;
        self.output_message(&json!({ "total_item_count": total }));
        Ok(())
    }

    /// Interactive paging over stdin commands
    async fn browse(&self) -> Result<()> {
        let config = self.load_config()?;
        let mut cursor = self.build_cursor(&config)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let items = cursor.collect_page().await?;
        self.output_page(&report(&cursor, items), &cursor);

        loop {
            prompt(&mut std::io::stderr())?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            if matches!(command, "q" | "quit") {
                break;
            }

            let navigation = match command.parse::<Navigation>() {
                Ok(navigation) => navigation,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };

            if !cursor.navigate(navigation).await? {
                warn!(%navigation, page = cursor.page_index() + 1, "No page to move to");
                continue;
            }

            let items = cursor.collect_page().await?;
            self.output_page(&report(&cursor, items), &cursor);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        self.output_message(&json!({
            "type": "VALIDATE",
            "status": "SUCCEEDED",
            "source": config.source.kind(),
            "page_size": config.pager.page_size,
            "window_size": config.pager.window_size,
            "group_by": config.group_by,
        }));
        Ok(())
    }

    /// Output a page report
    fn output_page(&self, report: &PageReport, cursor: &JsonCursor) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(report).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                for line in render_pretty(report, cursor.equality()) {
                    println!("{line}");
                }
            }
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Open the configured source behind the async trait
pub fn open_source(config: &SourceConfig) -> Result<JsonSource> {
    config.validate()?;
    let source: JsonSource = match config {
        SourceConfig::JsonFile { path } => Box::new(VecSource::from_json_file(path)?),
        SourceConfig::Duckdb {
            database,
            setup,
            query,
        } => {
            let source = DuckDbSource::open(database, query.clone())?;
            if let Some(setup) = setup {
                source
                    .execute_batch(setup)
                    .with_context(|| format!("Failed to run setup for '{database}'"))?;
            }
            Box::new(BlockingSource::new(source))
        }
        SourceConfig::Http(http) => Box::new(HttpSource::new(http.clone())?),
    };
    Ok(source)
}

/// Walk forward from the first page to the 1-based page `number`
///
/// Stops early on the last page when the source runs out.
pub async fn page_report(cursor: &mut JsonCursor, number: usize) -> Result<PageReport> {
    if number == 0 {
        return Err(Error::invalid_value("number", "pages are numbered from 1"));
    }

    let mut items = cursor.collect_page().await?;
    for _ in 1..number {
        if !cursor.move_next().await? {
            warn!(
                requested = number,
                last = cursor.page_index() + 1,
                "Ran out of pages"
            );
            break;
        }
        items = cursor.collect_page().await?;
    }

    Ok(report(cursor, items))
}

fn report(cursor: &JsonCursor, items: Vec<Value>) -> PageReport {
    PageReport {
        position: cursor.position(),
        items,
    }
}

/// Human-readable page: a header, then one line per item with `*` marking
/// the first item of each group
pub fn render_pretty<E: EqualityPolicy<Value>>(report: &PageReport, equality: &E) -> Vec<String> {
    let mut lines = vec![report.position.to_string()];
    let mut previous: Option<&Value> = None;
    for item in &report.items {
        let starts_group = previous.map_or(true, |prev| !equality.equals(prev, item));
        let marker = if starts_group { '*' } else { ' ' };
        lines.push(format!("{marker} {item}"));
        previous = Some(item);
    }
    if report.items.is_empty() {
        lines.push("  (no items)".to_string());
    }
    lines
}

/// Write the browse prompt and flush it, since it ends without a newline
fn prompt(out: &mut impl Write) -> Result<()> {
    write!(out, "[n]ext [p]revious [f]irst [l]ast [q]uit > ")?;
    out.flush()?;
    Ok(())
}
