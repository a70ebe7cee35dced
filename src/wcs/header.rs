//! # FITS primary header reader
//!
//! Minimal reader for the primary header of a visit mosaic: fixed 80-byte
//! ASCII cards in 2880-byte blocks, terminated by an `END` card. Only header
//! cards are read; the image payload is never touched, so loading the WCS of
//! a multi-gigabyte mosaic stays cheap.
//!
//! Card layout (FITS 4.0, the subset used here)
//! -----------------
//! * `0..8`  – keyword, right-padded with spaces.
//! * `8..10` – value indicator `"= "` for value cards.
//! * `10..80` – value, optionally followed by `/ comment`; strings are
//!   single-quoted with `''` escaping.
//!
//! `COMMENT`, `HISTORY`, and blank cards are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use camino::Utf8Path;
use thiserror::Error;

use crate::visitxy_errors::VisitXyError;

/// FITS block size in bytes; headers are padded to a multiple of this.
const BLOCK_SIZE: usize = 2880;
/// Header card size in bytes.
const CARD_SIZE: usize = 80;

/// Card-level parsing errors for a FITS primary header.
#[derive(Error, Debug, PartialEq)]
pub enum ParseHeaderError {
    #[error("file does not start with a SIMPLE card")]
    NotAFitsHeader,
    #[error("header ended before an END card")]
    UnterminatedHeader,
    #[error("header card is not ASCII text: {0}")]
    InvalidCard(String),
    #[error("keyword {keyword} has a non-numeric value '{value}'")]
    InvalidNumericValue { keyword: String, value: String },
}

/// Parsed key/value cards of one primary header.
#[derive(Debug, Clone, Default)]
pub struct FitsHeader {
    cards: HashMap<String, String>,
}

impl FitsHeader {
    /// Read the primary header of a FITS file.
    ///
    /// Arguments
    /// ---------
    /// * `path`: path to the FITS file
    ///
    /// Return
    /// ------
    /// * The parsed header, or an I/O or card-level parsing error. A file
    ///   that ends before its `END` card is reported as unterminated rather
    ///   than as a bare read failure.
    pub fn from_file(path: &Utf8Path) -> Result<Self, VisitXyError> {
        let mut file = File::open(path)?;
        let mut cards = HashMap::new();
        let mut block = [0u8; BLOCK_SIZE];
        let mut first_block = true;

        loop {
            file.read_exact(&mut block).map_err(|error| {
                if error.kind() == std::io::ErrorKind::UnexpectedEof {
                    VisitXyError::HeaderParsingError(ParseHeaderError::UnterminatedHeader)
                } else {
                    VisitXyError::IoError(error)
                }
            })?;
            if Self::parse_block(&block, first_block, &mut cards)? {
                return Ok(FitsHeader { cards });
            }
            first_block = false;
        }
    }

    /// Parse one 2880-byte block into `cards`; returns `true` once the `END`
    /// card has been seen.
    fn parse_block(
        block: &[u8],
        first_block: bool,
        cards: &mut HashMap<String, String>,
    ) -> Result<bool, ParseHeaderError> {
        for (index, card) in block.chunks_exact(CARD_SIZE).enumerate() {
            let card = std::str::from_utf8(card)
                .map_err(|_| ParseHeaderError::InvalidCard(String::from_utf8_lossy(card).into()))?;

            let keyword = card[..8].trim_end();
            if first_block && index == 0 && keyword != "SIMPLE" {
                return Err(ParseHeaderError::NotAFitsHeader);
            }
            if keyword == "END" {
                return Ok(true);
            }
            if keyword.is_empty() || keyword == "COMMENT" || keyword == "HISTORY" {
                continue;
            }
            if &card[8..10] != "= " {
                // Commentary card with a non-standard keyword; ignore.
                continue;
            }
            cards.insert(keyword.to_string(), parse_value(&card[10..]));
        }
        Ok(false)
    }

    /// Raw string value of a keyword, if present.
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.cards.get(keyword).map(String::as_str)
    }

    /// Numeric value of a keyword, if present.
    ///
    /// Return
    /// ------
    /// * `Ok(None)` when the keyword is absent, `Err` when it is present but
    ///   does not parse as a number.
    pub fn get_f64(&self, keyword: &str) -> Result<Option<f64>, ParseHeaderError> {
        match self.cards.get(keyword) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ParseHeaderError::InvalidNumericValue {
                    keyword: keyword.to_string(),
                    value: value.clone(),
                }),
        }
    }
}

/// Extract the value part of a card body: strip the inline comment (a `/`
/// outside quotes), unquote strings, trim whitespace.
fn parse_value(body: &str) -> String {
    let mut in_quotes = false;
    let mut value_end = body.len();
    for (position, character) in body.char_indices() {
        match character {
            '\'' => in_quotes = !in_quotes,
            '/' if !in_quotes => {
                value_end = position;
                break;
            }
            _ => {}
        }
    }
    let value = body[..value_end].trim();
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'").trim_end().to_string()
    } else {
        value.to_string()
    }
}
