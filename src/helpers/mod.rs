//! Presentational helpers shared by the generator, the server and the CLI
//!
//! Date formatting, tag colour classes, reading time estimation and small
//! HTML/URL utilities.

mod date;
mod html;
mod reading;
mod tags;
mod url;

pub use date::*;
pub use html::*;
pub use reading::*;
pub use tags::*;
pub use url::*;
