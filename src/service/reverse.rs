//! The reverse endpoint.

use crate::{Request, Response};

/// Reverses `word` by Unicode scalar value.
pub fn reverse(word: &str) -> String {
    word.chars().rev().collect()
}

/// `/reverse?word=<w>` answers `200` with `w` reversed, whatever the method.
/// A missing `word` reverses the empty string.
pub async fn reverse_word(req: Request) -> Response {
    let word = req.query("word").unwrap_or_default();
    Response::text(reverse(&word))
}
