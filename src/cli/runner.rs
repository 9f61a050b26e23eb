//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::AppConfig;
use crate::customer::Customer;
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClient;
use crate::pagination::{LoadOutcome, MergeController, PageFetcher, PaginationView, Record};
use crate::query::GraphqlQueryClient;
use crate::render::{render_view, LOADING_LABEL};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

type CustomerController = MergeController<Customer, GraphqlQueryClient>;

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
        let controller = self.build_controller()?;
        match &self.cli.command {
            Commands::List { pages, all } => {
                let max_pages = if *all { None } else { Some(*pages) };
                self.list(&controller, max_pages).await
            }
            Commands::Browse => self.browse(&controller).await,
        }
    }

    /// Load config from file (or defaults) and apply flag overrides
    fn load_config(&self) -> Result<AppConfig> {
        let config = match &self.cli.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        Ok(config.with_overrides(self.cli.endpoint.clone(), self.cli.page_size))
    }

    fn build_controller(&self) -> Result<CustomerController> {
        let config = self.load_config()?;
        let endpoint = config.validate()?;
        debug!(page_size = config.page_size, "Configured customer query");

        let http = HttpClient::with_config(config.http.to_client_config())?;
        let client = GraphqlQueryClient::new(http, endpoint);
        debug!(endpoint = client.endpoint(), "Customer query client ready");
        Ok(MergeController::builder(client)
            .page_size(config.page_size)
            .build())
    }

    /// Load up to `max_pages` pages (all when `None`) and print the list
    async fn list(&self, controller: &CustomerController, max_pages: Option<usize>) -> Result<()> {
        if max_pages == Some(0) {
            return self.print(controller).await;
        }

        let outcome = controller.load_all(max_pages).await;
        let customers = controller.len().await;
        info!(customers, outcome = ?outcome, "Finished loading");
        self.print(controller).await
    }

    /// Print the first page, then load more each time the user presses Enter
    async fn browse(&self, controller: &CustomerController) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        load_with_progress(controller).await?;
        self.print(controller).await?;

        while controller.view().await.can_load_more() {
            eprintln!("Press Enter to load more, or q to quit");
            let Some(line) = lines.next_line().await.context("reading stdin")? else {
                break;
            };
            if line.trim().eq_ignore_ascii_case("q") {
                break;
            }

            let outcome = load_with_progress(controller).await?;
            if matches!(outcome, LoadOutcome::Merged { .. } | LoadOutcome::Failed(_)) {
                self.print(controller).await?;
            }
        }

        Ok(())
    }

    async fn print(&self, controller: &CustomerController) -> Result<()> {
        let view = controller.view().await;
        match self.cli.format {
            OutputFormat::Pretty => println!("{}", render_view(&view, chrono::Utc::now())),
            OutputFormat::Json => {
                let cursor = controller.snapshot().await.cursor;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&listing_json(&view, cursor.as_deref()))
                        .context("encoding customer listing")?
                );
            }
        }
        Ok(())
    }
}

/// Run one `load_more`, showing the progress indicator while in flight
async fn load_with_progress<R, F>(controller: &MergeController<R, F>) -> Result<LoadOutcome>
where
    R: Record,
    F: PageFetcher<R> + 'static,
{
    let mut revisions = controller.subscribe();
    revisions.borrow_and_update();

    let mut task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load_more().await }
    });

    loop {
        tokio::select! {
            joined = &mut task => {
                return joined.map_err(|e| Error::Other(format!("load task failed: {e}")));
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    return (&mut task)
                        .await
                        .map_err(|e| Error::Other(format!("load task failed: {e}")));
                }
                if controller.is_loading().await {
                    eprintln!("{LOADING_LABEL}");
                }
            }
        }
    }
}

/// JSON document for a list view
pub fn listing_json(view: &PaginationView<Customer>, cursor: Option<&str>) -> Value {
    json!({
        "customers": view.items,
        "page_info": {
            "end_cursor": cursor,
            "has_next_page": view.has_next_page,
        },
        "error": view.error,
    })
}
