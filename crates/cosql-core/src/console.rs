use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::editor::Viewport;
use crate::key::Key;
use crate::render::Draw;

/// A terminal that can execute draw commands and report its size.
pub trait Screen: Send {
    fn viewport(&self) -> io::Result<Viewport>;
    fn draw(&mut self, commands: &[Draw]) -> io::Result<()>;
}

pub trait KeyReader {
    fn read_key(&mut self) -> io::Result<Key>;
}

/// Reads until a real key arrives, skipping resize and release sentinels.
pub fn wait_for_key<K: KeyReader + ?Sized>(keys: &mut K) -> io::Result<Key> {
    loop {
        let key = keys.read_key()?;
        if !key.is_none() {
            return Ok(key);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct BusyState {
    pub(crate) running: bool,
    pub(crate) generation: u64,
    pub(crate) live_tasks: usize,
}

pub(crate) struct Shared<S> {
    pub(crate) screen: S,
    pub(crate) busy: BusyState,
}

/// Shared handle to the screen. One mutex serializes every write and also
/// guards the busy indicator state.
pub struct Console<S> {
    inner: Arc<Mutex<Shared<S>>>,
}

impl<S> Clone for Console<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Screen> Console<S> {
    pub fn new(screen: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Shared {
                screen,
                busy: BusyState::default(),
            })),
        }
    }

    pub fn viewport(&self) -> io::Result<Viewport> {
        self.lock().screen.viewport()
    }

    /// Executes all commands under one lock, so no other writer can land
    /// between a cursor move and the text that follows it.
    pub fn draw(&self, commands: &[Draw]) -> io::Result<()> {
        self.lock().screen.draw(commands)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Shared<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
