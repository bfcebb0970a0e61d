//! The search box mini-language.
//!
//! - `text` is a plain full-text search.
//! - `text // director` filters by director.
//! - `text #movie` searches inside one movie, resolved by name.
//!
//! `#` wins over `//` when both appear.

use thiserror::Error;

pub const DIRECTOR_SEPARATOR: &str = "//";
pub const MOVIE_MARKER: char = '#';

/// Result of parsing a raw query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedQuery {
    /// Nothing to search for.
    Empty,
    Plain { text: String },
    Director { text: String, director: String },
    Movie { text: String, movie_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Please provide a movie name after the '#'.")]
    MissingMovieName,
}

pub fn parse_query(raw: &str) -> Result<ParsedQuery, ParseError> {
    if raw.contains(MOVIE_MARKER) {
        let mut parts = raw.split(MOVIE_MARKER);
        let text = parts.next().unwrap_or_default().trim();
        let movie_name = parts.next().unwrap_or_default().trim();
        if movie_name.is_empty() {
            return Err(ParseError::MissingMovieName);
        }
        return Ok(ParsedQuery::Movie {
            text: text.to_string(),
            movie_name: movie_name.to_string(),
        });
    }

    let mut parts = raw.split(DIRECTOR_SEPARATOR).map(str::trim);
    let text = parts.next().unwrap_or_default();
    let director = parts.next().map(title_case).unwrap_or_default();

    Ok(match (text.is_empty(), director.is_empty()) {
        (true, true) => ParsedQuery::Empty,
        (_, true) => ParsedQuery::Plain {
            text: text.to_string(),
        },
        _ => ParsedQuery::Director {
            text: text.to_string(),
            director,
        },
    })
}

/// Upper-case the first letter of each space-separated word and lower-case
/// the rest. Runs of spaces are kept as-is.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The movie-name fragment being typed, i.e. everything after the first `#`.
pub fn movie_fragment(input: &str) -> Option<&str> {
    input
        .find(MOVIE_MARKER)
        .map(|i| input[i + MOVIE_MARKER.len_utf8()..].trim())
}
