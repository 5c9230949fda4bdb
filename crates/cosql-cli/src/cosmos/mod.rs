mod auth;

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use cosql_core::payload::METRICS_LABEL;
use cosql_core::{DataSource, FetchError, Page, PageStream, QuerySettings};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::{Config, ConnectionMode};
use auth::{MasterKey, rfc1123};

const API_VERSION: &str = "2018-12-31";
const MAX_RATE_LIMIT_RETRIES: u32 = 10;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(65);

/// Query client for one container over the Cosmos DB REST API.
pub struct CosmosClient {
    http: Client,
    signer: MasterKey,
    docs_url: String,
    resource_link: String,
    mode: ConnectionMode,
}

impl CosmosClient {
    pub fn connect(config: &Config) -> Result<Self> {
        let signer = MasterKey::from_base64(&config.key)?;
        let http = Client::builder()
            .user_agent(concat!("cosql/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let resource_link = format!("dbs/{}/colls/{}", config.database, config.container);
        let docs_url = format!(
            "{}/{}/docs",
            config.endpoint.trim_end_matches('/'),
            resource_link
        );
        if config.mode == ConnectionMode::Direct {
            tracing::debug!("direct mode requested; REST queries always use the gateway");
        }
        tracing::info!(url = %docs_url, mode = %config.mode, "cosmos client ready");

        Ok(Self {
            http,
            signer,
            docs_url,
            resource_link,
            mode: config.mode,
        })
    }

    fn fetch(
        &self,
        query: &str,
        settings: &QuerySettings,
        continuation: Option<&str>,
    ) -> Result<(Page, Option<String>), FetchError> {
        let body = json!({ "query": query, "parameters": [] }).to_string();
        let mut retries = 0;
        loop {
            let response = self.send(&body, settings, continuation)?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RATE_LIMIT_RETRIES {
                retries += 1;
                let wait = retry_after(response.headers());
                tracing::warn!(retries, wait_ms = millis(wait), "rate limited");
                thread::sleep(wait);
                continue;
            }

            let headers = response.headers().clone();
            let text = response.text().map_err(transport)?;
            if !status.is_success() {
                return Err(FetchError::Status {
                    code: status.as_u16(),
                    message: error_message(&text),
                });
            }

            let next = header_str(&headers, "x-ms-continuation")
                .filter(|token| !token.is_empty())
                .map(str::to_string);
            let page = Page {
                content: text,
                diagnostics: Some(diagnostics(&headers, self.mode)),
            };
            return Ok((page, next));
        }
    }

    fn send(
        &self,
        body: &str,
        settings: &QuerySettings,
        continuation: Option<&str>,
    ) -> Result<Response, FetchError> {
        let date = rfc1123(Utc::now());
        let authorization = self
            .signer
            .authorization("post", "docs", &self.resource_link, &date);

        let mut request = self
            .http
            .post(&self.docs_url)
            .header("authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-documentdb-isquery", "True")
            .header("x-ms-documentdb-query-enablecrosspartition", "True")
            .header("x-ms-max-item-count", settings.page_size.to_string())
            .header(CONTENT_TYPE, "application/query+json")
            .body(body.to_string());
        if let Some(token) = continuation {
            request = request.header("x-ms-continuation", token);
        }
        if settings.metrics {
            request = request.header("x-ms-documentdb-populatequerymetrics", "True");
        }
        request.send().map_err(transport)
    }
}

impl DataSource for CosmosClient {
    fn open<'a>(
        &'a self,
        query: &str,
        settings: &QuerySettings,
    ) -> Result<Box<dyn PageStream + 'a>, FetchError> {
        Ok(Box::new(CosmosPages {
            client: self,
            query: query.to_string(),
            settings: *settings,
            continuation: None,
            started: false,
        }))
    }
}

struct CosmosPages<'a> {
    client: &'a CosmosClient,
    query: String,
    settings: QuerySettings,
    continuation: Option<String>,
    started: bool,
}

impl PageStream for CosmosPages<'_> {
    fn has_more(&self) -> bool {
        !self.started || self.continuation.is_some()
    }

    fn next_page(&mut self) -> Result<Page, FetchError> {
        let continuation = self.continuation.as_deref();
        let (page, next) = self.client.fetch(&self.query, &self.settings, continuation)?;
        self.started = true;
        self.continuation = next;
        Ok(page)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn transport(err: reqwest::Error) -> FetchError {
    FetchError::Transport(err.to_string())
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn retry_after(headers: &HeaderMap) -> Duration {
    header_str(headers, "x-ms-retry-after-ms")
        .and_then(|ms| ms.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn millis(wait: Duration) -> u64 {
    u64::try_from(wait.as_millis()).unwrap_or(u64::MAX)
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn format_query_metrics(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) => format!("{}: {}", name.trim(), value.trim()),
            None => entry.to_string(),
        })
        .collect()
}

fn diagnostics(headers: &HeaderMap, mode: ConnectionMode) -> String {
    let mut lines = Vec::new();
    if let Some(charge) = header_str(headers, "x-ms-request-charge") {
        lines.push(format!("requestCharge: {charge} RU"));
    }
    if let Some(raw) = header_str(headers, "x-ms-documentdb-query-metrics") {
        lines.extend(format_query_metrics(raw));
    }

    let mut root = Map::new();
    if let Some(activity) = header_str(headers, "x-ms-activity-id") {
        root.insert("ActivityId".into(), Value::from(activity));
    }
    root.insert("ConnectionMode".into(), Value::from(mode.to_string()));
    let mut entry = Map::new();
    if !lines.is_empty() {
        entry.insert(METRICS_LABEL.into(), Value::from(lines.join("\n")));
    }
    root.insert("Context".into(), Value::Array(vec![Value::Object(entry)]));
    Value::Object(root).to_string()
}
