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

use self::Verdict::*;
use super::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

///
/// The three outcomes for one letter of a scored guess...
///   * Absent = the letter is not in the answer (also indicates no further
///              instances of a letter when another square with the same letter
///              scored present/correct)
///   * Present = the letter is in the answer, but not in this position
///   * Correct = the letter is in the answer at this position
///
/// Serialized in lowercase because that is how the persisted day records and
/// the row colorizer spell them.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Absent,
    Present,
    Correct,
}

impl Verdict {
    /// All three verdicts (make sure this actually matches the definition above)
    pub const ALL: [Verdict; 3] = [Absent, Present, Correct];

    /// Gives the emoji block used in the share grid.
    pub fn emoji(&self) -> &'static str {
        match self {
            Absent => "⬜",
            Present => "🟨",
            Correct => "🟩",
        }
    }
}

/// An array of Verdicts, one for each square of a submitted row.
pub type VerdictArray = [Verdict; WORD_SIZE];

/// The array of Verdicts, but in a struct, so that we can attach some useful
/// functions to a complete scored row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Verdicts(pub VerdictArray);

/// Automatic conversion of [Verdict; WORD_SIZE] -> Verdicts
impl From<VerdictArray> for Verdicts {
    fn from(arr: VerdictArray) -> Self {
        Self(arr)
    }
}

/// Delegate indexing of the struct to it's inner value
impl Index<usize> for Verdicts {
    type Output = Verdict;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Delegate mutable indexing of the struct to it's inner value
impl IndexMut<usize> for Verdicts {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Verdicts {
    ///
    /// Score a guess against the answer. For example if the guess was "tares"
    /// and the answer was "scare" we should compute
    /// [Absent, Present, Present, Present, Present].
    ///
    /// This is implemented by:
    /// * creating an empty [Verdict; WORD_SIZE] where all squares default to Absent
    /// * computing a "budget" for each letter in the alphabet (based on their frequency in the answer)
    /// * performing an exact pass which marks all correctly positioned letters (and updates the budget)
    /// * performing a present pass, left-to-right, marking misplaced letters while budget remains
    ///
    /// The budget is what makes repeated letters come out right: a guess with
    /// two 'e's against an answer holding one gets exactly one non-absent 'e'.
    ///
    pub fn score(guess: &str, answer: &str) -> Self {
        debug_assert!(is_puzzle_word(guess));
        debug_assert!(is_puzzle_word(answer));

        let mut out = Self::default();
        let mut answer_letter_counts = count_letters(answer);
        let answer_bytes = answer.as_bytes();
        let guess_bytes = guess.as_bytes();

        // exact pass
        for i in 0..WORD_SIZE {
            let gc = guess_bytes[i];
            let ac = answer_bytes[i];

            if gc == ac {
                answer_letter_counts[letter_idx(gc)] -= 1;
                out[i] = Correct;
            }
        }

        // present pass
        for i in 0..WORD_SIZE {
            if out[i] != Correct {
                let gc = guess_bytes[i];
                let counter = &mut answer_letter_counts[letter_idx(gc)];
                if *counter > 0 {
                    *counter -= 1;
                    out[i] = Present;
                }
            }
        }

        out
    }

    /// Whether or not this row of verdicts means the guess was the answer.
    pub fn is_all_correct(&self) -> bool {
        self.0.iter().all(|v| v == &Correct)
    }

    pub fn iter(&self) -> impl Iterator<Item = Verdict> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Verdicts {
    fn default() -> Self {
        Self([Absent; WORD_SIZE])
    }
}

impl Display for Verdicts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in 0..WORD_SIZE {
            f.write_str(self[i].emoji())?;
        }

        Ok(())
    }
}
