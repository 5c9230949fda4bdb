pub mod busy;
pub mod console;
pub mod editor;
pub mod error;
pub mod key;
pub mod paging;
pub mod payload;
pub mod render;

pub use busy::BusyIndicator;
pub use console::{Console, KeyReader, Screen, wait_for_key};
pub use editor::{Action, HEADER_ROWS, LineBuffer, Notice, Viewport};
pub use error::FetchError;
pub use key::Key;
pub use paging::{DataSource, Page, PageStream, QueryOutcome, QuerySettings, run_query};
pub use render::{Draw, Tone, render_editor};
