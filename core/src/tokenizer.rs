use std::iter::FusedIterator;

/// Tokenize raw bytes into lowercase ASCII words.
///
/// Words are delimited by ASCII whitespace, vertical tab included. Inside a
/// word, uppercase letters are folded and every other non-letter byte is
/// dropped, so `"Don't"` becomes `dont`. Words left empty after stripping are skipped. The returned iterator
/// is lazy and can be cloned to restart from the same position.
pub fn tokenize(text: &[u8]) -> Tokens<'_> {
    Tokens { rest: text }
}

#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Tokens<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let text: &'a [u8] = self.rest;
            let start = text.iter().position(|&b| !is_space(b))?;
            let rest = &text[start..];
            let end = rest.iter().position(|&b| is_space(b)).unwrap_or(rest.len());
            let (raw, tail) = rest.split_at(end);
            self.rest = tail;

            let word: String = raw
                .iter()
                .filter(|b| b.is_ascii_alphabetic())
                .map(|b| char::from(b.to_ascii_lowercase()))
                .collect();
            if !word.is_empty() {
                return Some(word);
            }
        }
    }
}

impl FusedIterator for Tokens<'_> {}

/// Same set as C `isspace`: `u8::is_ascii_whitespace` leaves out `\x0B`.
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0B
}
