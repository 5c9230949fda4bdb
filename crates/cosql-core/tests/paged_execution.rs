use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cosql_core::paging::MAX_ERROR_CHARS;
use cosql_core::{
    Console, DataSource, Draw, FetchError, Key, KeyReader, Page, PageStream, QueryOutcome,
    QuerySettings, Screen, Tone, Viewport, run_query,
};

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Draw>>>);

impl Recorder {
    fn draws(&self) -> Vec<Draw> {
        self.0.lock().expect("draws").clone()
    }

    fn texts(&self) -> Vec<String> {
        self.draws()
            .into_iter()
            .filter_map(|d| match d {
                Draw::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn contains(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

impl Screen for Recorder {
    fn viewport(&self) -> io::Result<Viewport> {
        Ok(Viewport::new(20, 10))
    }

    fn draw(&mut self, commands: &[Draw]) -> io::Result<()> {
        self.0.lock().expect("draws").extend_from_slice(commands);
        Ok(())
    }
}

struct Keys(VecDeque<Key>);

impl Keys {
    fn new(keys: &[Key]) -> Self {
        Self(keys.iter().copied().collect())
    }
}

impl KeyReader for Keys {
    fn read_key(&mut self) -> io::Result<Key> {
        self.0
            .pop_front()
            .ok_or_else(|| io::Error::other("out of keys"))
    }
}

struct Scripted {
    pages: Vec<Result<Page, FetchError>>,
    open_error: Option<FetchError>,
    delay: Duration,
    fetches: Cell<usize>,
    opened_with: Cell<Option<u32>>,
}

impl Scripted {
    fn new(pages: Vec<Result<Page, FetchError>>) -> Self {
        Self {
            pages,
            open_error: None,
            delay: Duration::ZERO,
            fetches: Cell::new(0),
            opened_with: Cell::new(None),
        }
    }
}

struct ScriptedStream<'a> {
    source: &'a Scripted,
    next: usize,
}

impl PageStream for ScriptedStream<'_> {
    fn has_more(&self) -> bool {
        self.next < self.source.pages.len()
    }

    fn next_page(&mut self) -> Result<Page, FetchError> {
        thread::sleep(self.source.delay);
        self.source.fetches.set(self.source.fetches.get() + 1);
        let page = self.source.pages[self.next].clone();
        self.next += 1;
        page
    }
}

impl DataSource for Scripted {
    fn open<'a>(
        &'a self,
        _query: &str,
        settings: &QuerySettings,
    ) -> Result<Box<dyn PageStream + 'a>, FetchError> {
        self.opened_with.set(Some(settings.page_size.get()));
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }
        Ok(Box::new(ScriptedStream {
            source: self,
            next: 0,
        }))
    }
}

fn page(content: &str) -> Result<Page, FetchError> {
    Ok(Page {
        content: content.into(),
        diagnostics: None,
    })
}

fn run(source: &Scripted, keys: &[Key], settings: QuerySettings) -> (QueryOutcome, Recorder) {
    let screen = Recorder::default();
    let console = Console::new(screen.clone());
    let mut keys = Keys::new(keys);
    let outcome =
        run_query("select * from c", &settings, source, &mut keys, &console).expect("run");
    (outcome, screen)
}

#[test]
fn failure_on_second_page_stops_before_third() {
    let source = Scripted::new(vec![
        page(r#"{"Documents":[{"id":"one"}]}"#),
        Err(FetchError::Status {
            code: 429,
            message: "throttled".into(),
        }),
        page(r#"{"Documents":[{"id":"three"}]}"#),
    ]);
    let (outcome, screen) = run(
        &source,
        &[Key::Char(' '), Key::Char(' ')],
        QuerySettings::default(),
    );

    assert_eq!(
        outcome,
        QueryOutcome::Failed {
            pages: 1,
            message: "request failed with status 429: throttled".into(),
        }
    );
    assert_eq!(source.fetches.get(), 2);
    assert!(screen.contains("\"id\": \"one\""));
    assert!(screen.contains("Press any key to fetch more data, ESC to go back to editor"));
    assert!(screen.contains("Error:"));
    assert!(!screen.contains("three"));
    assert_eq!(screen.draws().last(), Some(&Draw::Clear));
}

#[test]
fn long_error_messages_are_cut_to_limit() {
    let long = "x".repeat(MAX_ERROR_CHARS + 500);
    let source = Scripted::new(vec![Err(FetchError::Transport(long))]);
    let (outcome, screen) = run(&source, &[Key::Enter], QuerySettings::default());

    let QueryOutcome::Failed { pages, message } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(pages, 0);
    assert_eq!(message.chars().count(), MAX_ERROR_CHARS);
    assert!(screen.texts().iter().all(|t| t.len() <= MAX_ERROR_CHARS));
    assert!(screen.contains("Press any key to return to the editor"));
}

#[test]
fn escape_aborts_remaining_pages() {
    let source = Scripted::new(vec![page("[1]"), page("[2]"), page("[3]")]);
    let (outcome, screen) = run(&source, &[Key::Escape], QuerySettings::default());

    assert_eq!(outcome, QueryOutcome::Aborted { pages: 1 });
    assert_eq!(source.fetches.get(), 1);
    assert!(!screen.contains("Query Completed"));
}

#[test]
fn all_pages_stream_then_completion_prompt() {
    let source = Scripted::new(vec![page("[1]"), page("[2]")]);
    let (outcome, screen) = run(
        &source,
        &[Key::Char('n'), Key::Char('q')],
        QuerySettings::default(),
    );

    assert_eq!(outcome, QueryOutcome::Completed { pages: 2 });
    assert_eq!(source.fetches.get(), 2);
    assert!(screen.contains("Query Completed. Press any key to return to the editor"));
    assert_eq!(
        screen
            .texts()
            .iter()
            .filter(|t| t.as_str() == "-".repeat(20))
            .count(),
        4
    );
}

#[test]
fn empty_stream_completes_without_prompts() {
    let source = Scripted::new(Vec::new());
    let (outcome, screen) = run(&source, &[], QuerySettings::default());
    assert_eq!(outcome, QueryOutcome::Completed { pages: 0 });
    assert_eq!(screen.draws(), vec![Draw::Clear]);
}

#[test]
fn fetching_banner_shows_page_size() {
    let source = Scripted::new(vec![page("{}")]);
    let settings = QuerySettings {
        page_size: NonZeroU32::new(25).expect("non-zero"),
        metrics: false,
    };
    let (_, screen) = run(&source, &[Key::Enter], settings);
    assert_eq!(source.opened_with.get(), Some(25));
    assert!(screen.draws().contains(&Draw::text(
        Tone::Fetching,
        "...Fetching (max:25)..."
    )));
}

#[test]
fn malformed_payload_takes_the_error_path() {
    let source = Scripted::new(vec![page("{broken"), page("[]")]);
    let (outcome, screen) = run(&source, &[Key::Enter], QuerySettings::default());

    assert!(matches!(
        outcome,
        QueryOutcome::Failed { pages: 0, ref message } if message.starts_with("unreadable payload")
    ));
    assert_eq!(source.fetches.get(), 1);
    assert!(screen.contains("Error:"));
}

#[test]
fn open_failure_is_reported_without_fetching() {
    let mut source = Scripted::new(vec![page("[]")]);
    source.open_error = Some(FetchError::Transport("connection refused".into()));
    let (outcome, _) = run(&source, &[Key::Enter], QuerySettings::default());

    assert_eq!(
        outcome,
        QueryOutcome::Failed {
            pages: 0,
            message: "connection refused".into(),
        }
    );
    assert_eq!(source.fetches.get(), 0);
}

#[test]
fn metrics_are_printed_when_enabled() {
    let source = Scripted::new(vec![Ok(Page {
        content: "[]".into(),
        diagnostics: Some(
            r#"{"Context":[{"Query Metrics":"retrievedDocumentCount: 3\nindexHitRatio: 1.00"}]}"#
                .into(),
        ),
    })]);
    let settings = QuerySettings {
        metrics: true,
        ..QuerySettings::default()
    };
    let (outcome, screen) = run(&source, &[Key::Enter], settings);

    assert_eq!(outcome, QueryOutcome::Completed { pages: 1 });
    let texts = screen.texts();
    let at = texts.iter().position(|t| t == "Metrics").expect("metrics");
    assert_eq!(texts[at + 1], "retrievedDocumentCount: 3");
    assert_eq!(texts[at + 2], "indexHitRatio: 1.00");
}

#[test]
fn metrics_hidden_by_default() {
    let source = Scripted::new(vec![Ok(Page {
        content: "[]".into(),
        diagnostics: Some(r#"{"Query Metrics":"x"}"#.into()),
    })]);
    let (_, screen) = run(&source, &[Key::Enter], QuerySettings::default());
    assert!(!screen.contains("Metrics"));
}

#[test]
fn resize_sentinels_do_not_answer_prompts() {
    let source = Scripted::new(vec![page("[1]"), page("[2]")]);
    let (outcome, _) = run(
        &source,
        &[Key::None, Key::None, Key::Escape],
        QuerySettings::default(),
    );
    assert_eq!(outcome, QueryOutcome::Aborted { pages: 1 });
}

#[test]
fn key_reader_failure_escapes_as_error() {
    let source = Scripted::new(vec![page("[1]"), page("[2]")]);
    let screen = Recorder::default();
    let console = Console::new(screen.clone());
    let mut keys = Keys::new(&[]);
    let result = run_query(
        "select * from c",
        &QuerySettings::default(),
        &source,
        &mut keys,
        &console,
    );
    assert!(result.is_err());
    assert_eq!(screen.draws().last(), Some(&Draw::Clear));
}

#[test]
fn spinner_animates_during_slow_fetch_and_stops_before_clear() {
    let mut source = Scripted::new(vec![page("[]")]);
    source.delay = Duration::from_millis(350);
    let (outcome, screen) = run(&source, &[Key::Enter], QuerySettings::default());
    assert_eq!(outcome, QueryOutcome::Completed { pages: 1 });

    let draws = screen.draws();
    let frames = draws.iter().filter(|d| **d == Draw::SaveCursor).count();
    assert!(frames >= 2, "frames: {frames}");

    thread::sleep(Duration::from_millis(250));
    let later = screen.draws();
    assert_eq!(later.len(), draws.len());
    assert_eq!(later.last(), Some(&Draw::Clear));
}
