use std::io::{self, Write};

use cosql_core::{Draw, Key, KeyReader, Screen, Viewport};
use crossterm::cursor::{MoveTo, RestorePosition, SavePosition, Show};
use crossterm::event;
use crossterm::style::{Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};

use crate::app::input::map_event;
use crate::ui::theme::{ThemeTokens, color_for_tone};

/// Draw commands rendered as crossterm escape sequences on `out`.
pub struct CrosstermScreen<W> {
    out: W,
    theme: ThemeTokens,
}

impl<W: Write + Send> CrosstermScreen<W> {
    pub fn new(out: W, theme: ThemeTokens) -> Self {
        Self { out, theme }
    }

    fn queue(&mut self, command: &Draw) -> io::Result<()> {
        match command {
            Draw::Clear => {
                self.out.queue(Clear(ClearType::All))?.queue(MoveTo(0, 0))?;
            }
            Draw::MoveTo { col, row } => {
                self.out.queue(MoveTo(cell(*col), cell(*row)))?;
            }
            Draw::Text { tone, text } => match color_for_tone(&self.theme, *tone) {
                Some(color) => {
                    self.out
                        .queue(SetForegroundColor(color))?
                        .queue(Print(text))?
                        .queue(ResetColor)?;
                }
                None => {
                    self.out.queue(Print(text))?;
                }
            },
            Draw::NewLine => {
                self.out.queue(Print("\r\n"))?;
            }
            Draw::SaveCursor => {
                self.out.queue(SavePosition)?;
            }
            Draw::RestoreCursor => {
                self.out.queue(RestorePosition)?;
            }
        }
        Ok(())
    }
}

impl<W: Write + Send> Screen for CrosstermScreen<W> {
    fn viewport(&self) -> io::Result<Viewport> {
        let (width, height) = terminal::size()?;
        Ok(Viewport::new(width, height))
    }

    fn draw(&mut self, commands: &[Draw]) -> io::Result<()> {
        for command in commands {
            self.queue(command)?;
        }
        self.out.flush()
    }
}

pub fn enter() -> io::Result<()> {
    enter_with(
        terminal::enable_raw_mode,
        || io::stdout().execute(EnterAlternateScreen).map(|_| ()),
        restore,
    )
}

fn enter_with(
    raw_mode: impl FnOnce() -> io::Result<()>,
    alternate_screen: impl FnOnce() -> io::Result<()>,
    undo: impl FnOnce(),
) -> io::Result<()> {
    raw_mode()?;
    if let Err(err) = alternate_screen() {
        undo();
        return Err(err);
    }
    Ok(())
}

/// Puts the terminal back before any panic message is printed. Installed
/// before logging, so it runs even when no log file could be opened.
pub fn install_panic_restore() {
    install_panic_hook(restore);
}

fn install_panic_hook(undo: impl Fn() + Send + Sync + 'static) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        undo();
        previous(panic_info);
    }));
}

/// Best effort.
pub fn restore() {
    let _ = terminal::disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);
    let _ = io::stdout().execute(Show);
}

fn cell(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

pub struct CrosstermKeys;

impl KeyReader for CrosstermKeys {
    fn read_key(&mut self) -> io::Result<Key> {
        Ok(map_event(event::read()?))
    }
}
