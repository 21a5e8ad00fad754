//! Actions run once per newly discovered post.
//!
//! Sinks are invoked synchronously, in discovery order, after the post has
//! already been recorded as seen.  A failed send is never retried.
//!
//! Any `FnMut(&Item) -> Result<(), SinkError>` closure is a sink, so simple
//! bots do not need a type of their own:
//!
//! ```ignore
//! watcher.watch(&mut |item: &Item| {
//!     if item.author() == "JohnDCook" {
//!         println!("{item}");
//!     }
//!     Ok(())
//! })?;
//! ```

mod console;
mod email;

pub use console::ConsoleSink;
pub use email::{subject_line, EmailSettings, EmailSink, DEFAULT_FROM, DEFAULT_SMTP_PORT};

use crate::error::SinkError;
use crate::source::Item;

pub trait ActionSink {
    fn send(&mut self, item: &Item) -> Result<(), SinkError>;
}

impl<F> ActionSink for F
where
    F: FnMut(&Item) -> Result<(), SinkError>,
{
    fn send(&mut self, item: &Item) -> Result<(), SinkError> {
        self(item)
    }
}
