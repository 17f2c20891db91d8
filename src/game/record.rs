use super::prelude::*;
use super::verdict::Verdicts;
use serde::{Deserialize, Serialize};

/// Bump when the persisted shape changes. Records carrying an older (or
/// missing) stamp are normalised by [`DayRecord::migrate`] on first access.
pub const SCHEMA_VERSION: u32 = 2;

///
/// Everything persisted about one calendar day of play. Field names mirror
/// the store blob, which predates half of these fields: anything absent in an
/// old blob deserializes to its zero-value and is then normalised by
/// `migrate`, so upgrading the schema never loses a player's day.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    /// True once the attempt reached a win or ran out of rows.
    #[serde(default)]
    pub finished: bool,

    /// The letter grid, row-major, each cell a single lowercase letter or "".
    #[serde(default)]
    pub rows: Vec<Vec<String>>,

    /// Last user-facing status line.
    #[serde(default, rename = "msg")]
    pub message: String,

    /// Verdicts for submitted rows, parallel to the filled prefix of `rows`.
    #[serde(default)]
    pub reveals: Vec<Verdicts>,

    /// True once the idle timeout terminated the attempt before a finish.
    #[serde(default)]
    pub expired: bool,

    /// Attempts started today. Counted at start, never at finish.
    #[serde(default)]
    pub play_count: u32,

    /// Epoch ms; 0 when no attempt has been started (or the last one was
    /// cleared by a fresh start).
    #[serde(default)]
    pub attempt_started_at: EpochMillis,

    /// Epoch ms of the last grid-mutating input while the attempt was live.
    #[serde(default)]
    pub last_activity_at: EpochMillis,

    #[serde(default)]
    pub schema: u32,
}

impl Default for DayRecord {
    fn default() -> Self {
        Self {
            finished: false,
            rows: Vec::new(),
            message: String::new(),
            reveals: Vec::new(),
            expired: false,
            play_count: 0,
            attempt_started_at: 0,
            last_activity_at: 0,
            schema: SCHEMA_VERSION,
        }
    }
}

impl DayRecord {
    ///
    /// Normalises a record loaded from the store. Serde already backfills
    /// missing fields with zero-values; this pass additionally clamps whatever
    /// a truncated or hand-edited blob could carry, and resolves the one
    /// combination the state machine never writes (both terminal flags set).
    ///
    /// Idempotent: running it again on an already-migrated record changes
    /// nothing, and it never touches fields it does not need to.
    ///
    pub fn migrate(&mut self) {
        self.rows.truncate(NUM_TURNS);
        for row in &mut self.rows {
            row.truncate(WORD_SIZE);
            while row.len() < WORD_SIZE {
                row.push(String::new());
            }
        }

        self.reveals.truncate(NUM_TURNS);
        self.play_count = self.play_count.min(MAX_PLAYS);

        if self.finished && self.expired {
            // terminal flags are mutually exclusive; finished wins
            self.expired = false;
        }

        if self.attempt_started_at > 0 && self.last_activity_at == 0 {
            // records written before activity tracking existed
            self.last_activity_at = self.attempt_started_at;
        }

        self.schema = SCHEMA_VERSION;
    }

    /// Number of rows that have been submitted and scored.
    pub fn submitted_rows(&self) -> usize {
        self.reveals.len().min(NUM_TURNS)
    }

    /// MAX_PLAYS minus the plays already counted, floored at zero.
    pub fn plays_remaining(&self) -> u32 {
        MAX_PLAYS.saturating_sub(self.play_count)
    }
}
