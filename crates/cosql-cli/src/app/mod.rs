pub mod input;

use std::io;

use anyhow::{Context, Result};
use cosql_core::{
    Action, Console, DataSource, Draw, HEADER_ROWS, Key, KeyReader, LineBuffer, Notice,
    QueryOutcome, Screen, Tone, render_editor, run_query, wait_for_key,
};

use crate::config::Config;
use crate::terminal::{self, CrosstermKeys, CrosstermScreen};
use crate::ui::header::header_lines;
use crate::ui::theme::ThemeTokens;

pub struct App {
    config: Config,
    theme: ThemeTokens,
    editor: LineBuffer,
}

impl App {
    pub fn new(config: Config, theme: ThemeTokens) -> Self {
        Self {
            config,
            theme,
            editor: LineBuffer::default(),
        }
    }

    pub fn run<D: DataSource + ?Sized>(&mut self, source: &D) -> Result<()> {
        terminal::enter().context("cannot switch terminal to raw mode")?;

        let console = Console::new(CrosstermScreen::new(io::stdout(), self.theme.clone()));
        let loop_result = self.run_loop(source, &mut CrosstermKeys, &console);

        terminal::restore();
        loop_result
    }

    fn run_loop<D, K, S>(&mut self, source: &D, keys: &mut K, console: &Console<S>) -> Result<()>
    where
        D: DataSource + ?Sized,
        K: KeyReader,
        S: Screen + 'static,
    {
        console.draw(&[Draw::Clear])?;
        let mut key = Key::None;

        loop {
            let viewport = console.viewport()?;
            match self.editor.apply(key, viewport) {
                Action::Continue => {}
                Action::Exit => break,
                Action::Notice(notice) => show_notice(notice, keys, console)?,
                Action::Execute => {
                    self.execute(source, keys, console)?;
                }
            }

            // A notice or query may have outlived a resize.
            let current = console.viewport()?;
            if current != viewport {
                self.editor.reconcile(current);
            }
            let viewport = current;
            let header = header_lines(&self.config, viewport.width);
            console.draw(&render_editor(&self.editor, viewport, &header))?;

            key = keys.read_key()?;
        }

        tracing::info!("editor closed");
        Ok(())
    }

    fn execute<D, K, S>(
        &mut self,
        source: &D,
        keys: &mut K,
        console: &Console<S>,
    ) -> Result<QueryOutcome>
    where
        D: DataSource + ?Sized,
        K: KeyReader,
        S: Screen + 'static,
    {
        let viewport = console.viewport()?;
        let shown_rows = self.editor.lines().len().min(viewport.max_visible_row() + 1);
        let below_text = HEADER_ROWS + shown_rows;
        console.draw(&[Draw::MoveTo {
            col: 0,
            row: below_text.min(viewport.height.saturating_sub(1)),
        }])?;

        let query = self.editor.query();
        tracing::info!(chars = query.chars().count(), "executing query");
        let outcome = run_query(&query, &self.config.query_settings(), source, keys, console)?;
        Ok(outcome)
    }
}

fn show_notice<K, S>(notice: Notice, keys: &mut K, console: &Console<S>) -> io::Result<()>
where
    K: KeyReader,
    S: Screen,
{
    let mut out = vec![Draw::Clear];
    for (i, line) in notice.message().lines().enumerate() {
        if i > 0 {
            out.push(Draw::NewLine);
        }
        out.push(Draw::text(Tone::Plain, line));
    }
    console.draw(&out)?;
    wait_for_key(keys)?;
    console.draw(&[Draw::Clear])
}
