//! Speech-to-text collaborators.

use std::path::Path;

use crate::error::Result;

/// Turns a finalized audio asset into recognized text.
///
/// The session does not interpret the text; it only triggers the call once isolation has
/// succeeded. A collaborator that understood the audio but found no words in it should
/// return [`Error::Recognition`](crate::error::Error::Recognition) — the session reports
/// that as a non-fatal pass outcome. Any other error is treated as fatal.
pub trait Recognizer {
    fn recognize(&mut self, asset: &Path) -> Result<String>;
}
