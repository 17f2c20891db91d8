/*
 * MIT License
 *
 * Copyright (c) 2025 BibleVerseQuest contributors
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use crate::clock;
use crate::game::prelude::*;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use rust_embed::RustEmbed;
use std::str::Utf8Error;
use thiserror::Error;

// The puzzle data ships embedded inside the binary
pub const VERSE_WORDS_FILE_NAME: &str = "verse_words.txt";

lazy_static! {
    pub static ref WORDS: WordList =
        WordList::read().expect("should have no failures reading verse word data...");
}

#[derive(RustEmbed)]
#[folder = "txt_data/"]
struct RawData;

/// One daily puzzle: the answer word plus the verse it is drawn from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerseWord {
    /// The answer, WORD_SIZE lowercase letters
    pub word: String,
    /// Citation shown with the solved message, like "Ephesians 2:8"
    pub reference: String,
    /// The verse text revealed when the attempt finishes
    pub verse: String,
}

/// The full rotation of daily puzzles, in rotation order. The order in the
/// data file is the rotation order, so reordering lines changes which word
/// lands on which date.
#[derive(Clone, Debug)]
pub struct WordList {
    entries: Vec<VerseWord>,
}

#[derive(Error, Debug)]
pub enum LoadDataErr {
    #[error("missing verse words file")]
    MissingWordsFile,
    #[error(transparent)]
    EncodingError(#[from] Utf8Error),
    #[error("malformed verse word line '{0}'")]
    BadLine(String),
    #[error("the word '{0}' is not a valid puzzle word")]
    NonPuzzleWord(String),
    #[error("the verse word list is empty")]
    NoEntries,
}

impl WordList {
    pub fn read() -> Result<Self, LoadDataErr> {
        let raw = retrieve_file_as_str(VERSE_WORDS_FILE_NAME)?
            .ok_or(LoadDataErr::MissingWordsFile)?;

        // each line carries three fields separated by '|':
        // the answer word, the citation, and the verse text
        let mut entries = Vec::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.splitn(3, '|');
            let word = match parts.next() {
                Some(w) => normalize_guess(w),
                None => continue,
            };
            if !is_puzzle_word(&word) {
                return Err(LoadDataErr::NonPuzzleWord(word));
            }

            let reference = parts
                .next()
                .ok_or_else(|| LoadDataErr::BadLine(line.to_string()))?;
            let verse = parts
                .next()
                .ok_or_else(|| LoadDataErr::BadLine(line.to_string()))?;

            entries.push(VerseWord {
                word,
                reference: reference.trim().to_string(),
                verse: verse.trim().to_string(),
            });
        }

        if entries.is_empty() {
            return Err(LoadDataErr::NoEntries);
        }

        log::debug!("got {} verse words from data file", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed target for the given calendar day. Stable for the whole day,
    /// no matter how many attempts get started.
    pub fn target_for(&self, date: NaiveDate) -> &VerseWord {
        &self.entries[clock::daily_index(date, self.entries.len())]
    }
}

fn retrieve_file_as_str(name: &str) -> Result<Option<String>, LoadDataErr> {
    let f: rust_embed::EmbeddedFile = match RawData::get(name) {
        Some(data) => data,
        None => return Ok(None),
    };

    Ok(Some(
        std::str::from_utf8(&f.data)
            .map_err(LoadDataErr::EncodingError)?
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_word_list_loads() {
        let list = WordList::read().expect("embedded data should parse");
        assert!(!list.is_empty());
        for entry in &list.entries {
            assert!(is_puzzle_word(&entry.word), "bad word {:?}", entry.word);
            assert!(!entry.reference.is_empty());
            assert!(!entry.verse.is_empty());
        }
    }

    #[test]
    fn test_target_is_stable_within_a_day_and_rotates() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let a = WORDS.target_for(day);
        let b = WORDS.target_for(day);
        assert_eq!(a, b);

        let next = WORDS.target_for(day + chrono::Duration::days(1));
        if WORDS.len() > 1 {
            assert_ne!(a, next);
        }
    }

    #[test]
    fn test_rotation_epoch_selects_first_entry() {
        let epoch = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(WORDS.target_for(epoch).word, "grace");
    }
}
