use std::io;
use std::num::NonZeroU32;

use crate::busy::BusyIndicator;
use crate::console::{Console, KeyReader, Screen, wait_for_key};
use crate::error::FetchError;
use crate::key::Key;
use crate::payload::{pretty_json, query_metrics};
use crate::render::{Draw, Tone, truncate_chars};

pub const MAX_ERROR_CHARS: usize = 1000;
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(size) => size,
    None => unreachable!(),
};

const CONTINUE_PROMPT: &str = "Press any key to fetch more data, ESC to go back to editor";
const DONE_PROMPT: &str = "Query Completed. Press any key to return to the editor";
const ERROR_PROMPT: &str = "Press any key to return to the editor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub content: String,
    pub diagnostics: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    pub page_size: NonZeroU32,
    pub metrics: bool,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            metrics: false,
        }
    }
}

/// One running query. Dropping it closes the execution context.
pub trait PageStream {
    fn has_more(&self) -> bool;
    /// Failure statuses come back as `Err`, never as a `Page`.
    fn next_page(&mut self) -> Result<Page, FetchError>;
}

pub trait DataSource {
    fn open<'a>(
        &'a self,
        query: &str,
        settings: &QuerySettings,
    ) -> Result<Box<dyn PageStream + 'a>, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Completed { pages: usize },
    Aborted { pages: usize },
    Failed { pages: usize, message: String },
}

/// Streams every page of `query` to the console, one keypress per page.
///
/// Fetch and payload errors are shown to the user and reported as
/// [`QueryOutcome::Failed`]; only terminal I/O errors are returned as `Err`.
/// The screen is cleared on every exit path.
pub fn run_query<S, K, D>(
    query: &str,
    settings: &QuerySettings,
    source: &D,
    keys: &mut K,
    console: &Console<S>,
) -> io::Result<QueryOutcome>
where
    S: Screen + 'static,
    K: KeyReader + ?Sized,
    D: DataSource + ?Sized,
{
    let indicator = BusyIndicator::new(console.clone());
    let outcome = stream_pages(query, settings, source, keys, console, &indicator);
    indicator.stop();
    console.draw(&[Draw::Clear])?;

    match &outcome {
        Ok(QueryOutcome::Completed { pages }) => tracing::info!(pages, "query completed"),
        Ok(QueryOutcome::Aborted { pages }) => tracing::info!(pages, "query aborted by user"),
        Ok(QueryOutcome::Failed { pages, message }) => {
            tracing::warn!(pages, error = %message, "query failed")
        }
        Err(err) => tracing::error!(error = %err, "console failure during query"),
    }
    outcome
}

fn stream_pages<S, K, D>(
    query: &str,
    settings: &QuerySettings,
    source: &D,
    keys: &mut K,
    console: &Console<S>,
    indicator: &BusyIndicator<S>,
) -> io::Result<QueryOutcome>
where
    S: Screen + 'static,
    K: KeyReader + ?Sized,
    D: DataSource + ?Sized,
{
    tracing::info!(page_size = settings.page_size.get(), "opening query");
    let mut stream = match source.open(query, settings) {
        Ok(stream) => stream,
        Err(err) => return show_failure(err, 0, keys, console),
    };

    let mut pages = 0usize;
    while stream.has_more() {
        indicator.start();
        console.draw(&[Draw::text(
            Tone::Fetching,
            format!("...Fetching (max:{})...", settings.page_size),
        )])?;

        let fetched = stream.next_page();
        indicator.stop();

        let body = match fetched.and_then(|page| page_body(&page, settings)) {
            Ok(body) => body,
            Err(err) => return show_failure(err, pages, keys, console),
        };
        pages += 1;
        tracing::debug!(page = pages, "page rendered");

        let width = console.viewport()?.width;
        console.draw(&body.commands(width))?;

        if stream.has_more() {
            console.draw(&prompt(CONTINUE_PROMPT))?;
            if wait_for_key(keys)? == Key::Escape {
                return Ok(QueryOutcome::Aborted { pages });
            }
        } else {
            console.draw(&prompt(DONE_PROMPT))?;
            wait_for_key(keys)?;
            break;
        }
    }

    Ok(QueryOutcome::Completed { pages })
}

struct PageBody {
    content: String,
    metrics: Option<Vec<String>>,
}

impl PageBody {
    fn commands(&self, width: usize) -> Vec<Draw> {
        let rule = "-".repeat(width);
        let mut out = vec![Draw::NewLine, Draw::text(Tone::Content, rule.as_str())];
        out.push(Draw::NewLine);
        out.extend(Draw::lines(Tone::Content, &self.content));
        out.push(Draw::NewLine);
        out.push(Draw::text(Tone::Content, rule));
        out.push(Draw::NewLine);

        if let Some(metrics) = &self.metrics {
            out.push(Draw::NewLine);
            out.push(Draw::text(Tone::Plain, "Metrics"));
            out.push(Draw::NewLine);
            for entry in metrics {
                out.extend(Draw::lines(Tone::Plain, entry));
                out.push(Draw::NewLine);
            }
        }
        out
    }
}

fn page_body(page: &Page, settings: &QuerySettings) -> Result<PageBody, FetchError> {
    let content = pretty_json(&page.content)?;
    let metrics = if settings.metrics {
        Some(query_metrics(page.diagnostics.as_deref())?)
    } else {
        None
    };
    Ok(PageBody { content, metrics })
}

fn prompt(text: &str) -> Vec<Draw> {
    vec![Draw::NewLine, Draw::text(Tone::Prompt, text)]
}

fn show_failure<S, K>(
    err: FetchError,
    pages: usize,
    keys: &mut K,
    console: &Console<S>,
) -> io::Result<QueryOutcome>
where
    S: Screen,
    K: KeyReader + ?Sized,
{
    let message = err.to_string();
    let shown = truncate_chars(&message, MAX_ERROR_CHARS);

    let mut out = vec![Draw::NewLine, Draw::NewLine];
    out.push(Draw::text(Tone::Error, "Error:"));
    out.extend([Draw::NewLine, Draw::NewLine]);
    out.extend(Draw::lines(Tone::Error, &shown));
    out.extend([Draw::NewLine, Draw::NewLine]);
    out.push(Draw::text(Tone::Error, ERROR_PROMPT));
    console.draw(&out)?;
    wait_for_key(keys)?;

    Ok(QueryOutcome::Failed {
        pages,
        message: shown.into_owned(),
    })
}
