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

use super::{prelude::*, record::*, verdict::*, words::VerseWord};
use thiserror::Error;

pub const EXPIRED_MESSAGE: &str =
    "Your previous game expired after 30 minutes of inactivity. Click “New Game” to try again.";
pub const EXPIRED_TOAST: &str = "Game expired after 30 minutes of inactivity.";

/// The letter grid as the view consumes it: NUM_TURNS rows of WORD_SIZE cells.
pub type Grid = [[Option<char>; WORD_SIZE]; NUM_TURNS];

/// Explicit input cursor: which row is being filled and how many of its cells
/// are occupied. Owned by the session and mutated nowhere else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

/// Lifecycle phase of today's attempt, derived from the record flags and the
/// idle window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NoAttempt,
    Active,
    Finished,
    Expired,
}

/// A deferred grid clear scheduled when an attempt finishes. Tagged with the
/// owning attempt's start timestamp: a clear that outlives its attempt is
/// dropped unfired, so it can never wipe a newer attempt's rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingClear {
    attempt: EpochMillis,
    due_at: EpochMillis,
}

/// Keys the engine understands, however the front end produces them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Letter(char),
    Delete,
    Submit,
}

/// What a processed key did.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Swallowed: terminal attempt, non-letter input, full row, empty row.
    Ignored,
    /// The grid changed. `started` is set on the first letter of a fresh
    /// attempt, exactly once per attempt.
    Edited { started: bool },
    Submitted(Submit),
    Rejected(Reject),
}

/// Successful submission outcomes. `row` is the row that was just scored.
#[derive(Clone, Debug, PartialEq)]
pub enum Submit {
    Advanced {
        row: usize,
        next_row: usize,
        verdicts: Verdicts,
    },
    Won {
        row: usize,
        verdicts: Verdicts,
        attempts: u32,
    },
    Lost {
        row: usize,
        verdicts: Verdicts,
    },
}

/// Submission rejections. The Display strings are the advisory messages shown
/// to the player; nothing but the message changes on a rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Reject {
    #[error("You've played today's puzzle. Come back tomorrow!")]
    AlreadyFinished,
    #[error("Not enough letters.")]
    NotEnoughLetters,
    #[error("Letters only (A–Z).")]
    NotLetters,
}

///
/// One day's play against one target word: the attempt lifecycle state
/// machine plus the guess submission pipeline, layered over the in-memory
/// grid and the persisted DayRecord.
///
/// The session never reads a clock and never touches storage; every operation
/// takes `now` explicitly and the controller persists the record after each
/// mutation. That keeps every transition replayable in tests.
///
pub struct Session {
    day_key: String,
    target: VerseWord,
    day: DayRecord,

    grid: Grid,
    /// Verdicts of submitted rows; filled entries always form a prefix.
    revealed: [Option<Verdicts>; NUM_TURNS],
    cursor: Cursor,

    /// One-shot attempt-started latch, reset only by start_new_attempt.
    start_announced: bool,
    pending_clear: Option<PendingClear>,
}

impl Session {
    ///
    /// Rebuilds today's session from its persisted (already migrated) record.
    /// The cursor lands after the last submitted row, at the end of whatever
    /// prefix of the next row was typed before the reload.
    ///
    pub fn restore(day_key: String, target: VerseWord, day: DayRecord) -> Self {
        let mut grid: Grid = empty_grid();
        for (r, row) in day.rows.iter().take(NUM_TURNS).enumerate() {
            for (c, cell) in row.iter().take(WORD_SIZE).enumerate() {
                grid[r][c] = cell.chars().next().filter(char::is_ascii_lowercase);
            }
        }

        let mut revealed: [Option<Verdicts>; NUM_TURNS] = Default::default();
        for (r, v) in day.reveals.iter().take(NUM_TURNS).enumerate() {
            revealed[r] = Some(*v);
        }

        let row = day.submitted_rows();
        let col = if row < NUM_TURNS {
            grid[row].iter().take_while(|c| c.is_some()).count()
        } else {
            0
        };

        Self {
            day_key,
            target,
            day,
            grid,
            revealed,
            cursor: Cursor { row, col },
            // an attempt that already has letters on the board was announced
            // before the reload
            start_announced: row > 0 || col > 0,
            pending_clear: None,
        }
    }

    pub fn day_key(&self) -> &str {
        &self.day_key
    }

    pub fn target(&self) -> &VerseWord {
        &self.target
    }

    pub fn day(&self) -> &DayRecord {
        &self.day
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn phase(&self, now: EpochMillis) -> Phase {
        if self.day.finished {
            Phase::Finished
        } else if self.day.expired {
            Phase::Expired
        } else if self.has_active_attempt(now) {
            Phase::Active
        } else {
            Phase::NoAttempt
        }
    }

    /// Iterates the verdicts of submitted rows, in order.
    pub fn iter_reveals(&self) -> impl Iterator<Item = &Verdicts> {
        iter_reveals(&self.revealed)
    }

    pub fn plays_remaining(&self) -> u32 {
        self.day.plays_remaining()
    }

    ///
    /// True while an attempt is underway: started, not finished, not expired,
    /// and inside the idle window. Gates the input lock and the New Game
    /// affordance.
    ///
    pub fn has_active_attempt(&self, now: EpochMillis) -> bool {
        if self.day.attempt_started_at == 0 || self.day.finished || self.day.expired {
            return false;
        }

        now - self.last_activity() < IDLE_TIMEOUT_MS
    }

    ///
    /// NoAttempt → Active. Counts the play immediately: quota is consumed by
    /// starting, never by finishing. Refused (false, no state change) once
    /// the quota is gone.
    ///
    pub fn start_new_attempt(&mut self, now: EpochMillis) -> bool {
        if self.plays_remaining() == 0 {
            return false;
        }

        self.day.play_count += 1;
        self.day.rows = Vec::new();
        self.day.reveals.clear();
        self.day.message.clear();
        self.day.finished = false;
        self.day.expired = false;
        self.day.attempt_started_at = now;
        self.day.last_activity_at = now;

        self.grid = empty_grid();
        self.revealed = Default::default();
        self.cursor = Cursor::default();
        self.start_announced = false;
        self.pending_clear = None;

        log::debug!(
            "started attempt {}/{} for {}",
            self.day.play_count,
            MAX_PLAYS,
            self.day_key
        );
        true
    }

    /// Update the last-activity timestamp on interaction. Only while the
    /// attempt is live; a finished or expired attempt is never resurrected.
    pub fn bump_activity(&mut self, now: EpochMillis) {
        if self.day.attempt_started_at == 0 || self.day.finished || self.day.expired {
            return;
        }

        self.day.last_activity_at = now;
    }

    ///
    /// Active → Expired, once the idle window lapses. Idempotent: re-checking
    /// a finished or already-expired record is a no-op, which lets the timer
    /// tick and the visibility handler race each other safely. Returns true
    /// only on the transition itself.
    ///
    /// The grid is cleared without preserving the verse reveal, and the
    /// explanatory message is recorded.
    ///
    pub fn expire_if_idle(&mut self, now: EpochMillis) -> bool {
        if self.day.attempt_started_at == 0 || self.day.finished || self.day.expired {
            return false;
        }

        if now - self.last_activity() < IDLE_TIMEOUT_MS {
            return false;
        }

        self.day.expired = true;
        self.clear_grid();
        self.day.message = EXPIRED_MESSAGE.to_string();
        log::debug!("attempt for {} expired after idle timeout", self.day_key);
        true
    }

    ///
    /// Fires the deferred post-finish clear once due, returning whether the
    /// grid changed. A pending clear whose attempt is no longer current is
    /// dropped unfired, and clearing an already-empty grid is harmless.
    /// The terminal message and the verse reveal are left alone.
    ///
    pub fn poll_deferred_clear(&mut self, now: EpochMillis) -> bool {
        let pending = match self.pending_clear {
            Some(p) if now >= p.due_at => p,
            _ => return false,
        };
        self.pending_clear = None;

        if pending.attempt != self.day.attempt_started_at || !self.day.finished {
            return false;
        }

        self.clear_grid();
        true
    }

    ///
    /// Letter/delete/submit input. All of it is inert once the attempt is
    /// terminal; submitting against a finished attempt still answers with the
    /// played-today advisory so the front end has something to show.
    ///
    pub fn handle_key(&mut self, key: Key, now: EpochMillis) -> KeyOutcome {
        match key {
            Key::Submit => {
                if self.day.expired {
                    return KeyOutcome::Ignored;
                }

                match self.submit(now) {
                    Ok(sub) => KeyOutcome::Submitted(sub),
                    Err(rej) => KeyOutcome::Rejected(rej),
                }
            }
            _ if self.day.finished || self.day.expired => KeyOutcome::Ignored,
            Key::Delete => {
                if self.cursor.col == 0 {
                    return KeyOutcome::Ignored;
                }

                self.cursor.col -= 1;
                self.grid[self.cursor.row][self.cursor.col] = None;
                self.sync_rows();
                KeyOutcome::Edited { started: false }
            }
            Key::Letter(ch) => {
                if !ch.is_ascii_alphabetic() {
                    return KeyOutcome::Ignored;
                }
                if self.cursor.row >= NUM_TURNS || self.cursor.col >= WORD_SIZE {
                    return KeyOutcome::Ignored;
                }

                let started =
                    self.cursor.row == 0 && self.cursor.col == 0 && !self.start_announced;
                if started {
                    self.start_announced = true;
                }

                self.grid[self.cursor.row][self.cursor.col] = Some(ch.to_ascii_lowercase());
                self.cursor.col += 1;
                self.sync_rows();
                KeyOutcome::Edited { started }
            }
        }
    }

    ///
    /// Validates and scores the current row. Rejections leave everything but
    /// the advisory message untouched; on success the row and its verdicts
    /// are recorded, and the attempt advances or finishes.
    ///
    pub fn submit(&mut self, now: EpochMillis) -> Result<Submit, Reject> {
        if self.day.finished {
            return Err(self.reject(Reject::AlreadyFinished));
        }
        if self.cursor.col < WORD_SIZE {
            return Err(self.reject(Reject::NotEnoughLetters));
        }

        let row = self.cursor.row;
        let guess: String = self.grid[row].iter().copied().flatten().collect();
        if !is_puzzle_word(&guess) {
            return Err(self.reject(Reject::NotLetters));
        }

        let verdicts = Verdicts::score(&guess, &self.target.word);
        self.revealed[row] = Some(verdicts);
        self.day.reveals.push(verdicts);
        self.sync_rows();

        if verdicts.is_all_correct() {
            let attempts = (row + 1) as u32;
            self.finish(
                now,
                format!(
                    "Solved! “{}” — {} (KJV)",
                    self.target.word.to_uppercase(),
                    self.target.reference
                ),
            );
            return Ok(Submit::Won {
                row,
                verdicts,
                attempts,
            });
        }

        let next_row = row + 1;
        if next_row == NUM_TURNS {
            self.finish(
                now,
                format!(
                    "Answer: “{}” — {} (KJV)",
                    self.target.word.to_uppercase(),
                    self.target.reference
                ),
            );
            return Ok(Submit::Lost { row, verdicts });
        }

        self.cursor = Cursor { row: next_row, col: 0 };
        Ok(Submit::Advanced {
            row,
            next_row,
            verdicts,
        })
    }

    /// Active → Finished. The finished flag locks further submissions; the
    /// delayed clear keeps the final grid visible for a moment.
    fn finish(&mut self, now: EpochMillis, message: String) {
        self.day.finished = true;
        self.day.message = message;
        self.pending_clear = Some(PendingClear {
            attempt: self.day.attempt_started_at,
            due_at: now + FINISH_CLEAR_DELAY_MS,
        });
    }

    fn reject(&mut self, reject: Reject) -> Reject {
        self.day.message = reject.to_string();
        reject
    }

    fn last_activity(&self) -> EpochMillis {
        if self.day.last_activity_at > 0 {
            self.day.last_activity_at
        } else {
            self.day.attempt_started_at
        }
    }

    /// Clears rows and reveals, in memory and in the record.
    fn clear_grid(&mut self) {
        self.day.rows = Vec::new();
        self.day.reveals.clear();
        self.grid = empty_grid();
        self.revealed = Default::default();
        self.cursor = Cursor::default();
    }

    /// Mirror the in-memory grid into the record, the way the front end
    /// persists after every keystroke.
    fn sync_rows(&mut self) {
        self.day.rows = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.map(String::from).unwrap_or_default())
                    .collect()
            })
            .collect();
    }
}

fn empty_grid() -> Grid {
    [[None; WORD_SIZE]; NUM_TURNS]
}

///
/// Helper which takes any slice of Option<Verdicts> and iterates through
/// references to the rows that have been submitted.
///
pub fn iter_reveals(revealed: &[Option<Verdicts>]) -> impl Iterator<Item = &Verdicts> {
    OptionIter::new(revealed.iter().map(|v| v.as_ref()))
}
