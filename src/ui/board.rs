use crate::game::{letter_idx, Grid, Verdict, Verdicts, VerseWord, ALPHABET_SIZE};

///
/// Where the grid gets drawn. The engine pushes plain data through this trait
/// and owns no rendering; a browser front end, a terminal, or a test fake all
/// plug in the same way.
///
pub trait BoardView {
    /// Redraw the whole letter grid.
    fn draw_grid(&mut self, grid: &Grid);

    /// Apply the verdict colors for a newly submitted (or restored) row.
    fn colorize_row(&mut self, row: usize, verdicts: &Verdicts);

    /// Upgrade the on-screen keyboard hint for one letter. Only called for
    /// genuine upgrades; see [`KeyHints`] for the tie-break.
    fn set_key_hint(&mut self, letter: char, verdict: Verdict);

    /// Show a status line to the player. An empty string clears it.
    fn set_message(&mut self, text: &str);

    fn reveal_verse(&mut self, target: &VerseWord);

    fn hide_verse(&mut self);
}

/// Transient notices (idle expiry, clipboard confirmation).
pub trait Notifier {
    fn toast(&mut self, text: &str);
}

///
/// Per-letter keyboard hint state. A key that already shows correct keeps it
/// forever; present only replaces an unmarked or absent key; absent never
/// overwrites anything but an unmarked key.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyHints {
    states: [Option<Verdict>; ALPHABET_SIZE],
}

impl KeyHints {
    /// Applies one letter's verdict, returning true when this upgraded the
    /// hint (the caller forwards exactly those to the view).
    pub fn apply(&mut self, letter: char, verdict: Verdict) -> bool {
        if !letter.is_ascii_lowercase() {
            return false;
        }

        let slot = &mut self.states[letter_idx(letter as u8)];
        let upgrade = match (*slot, verdict) {
            (Some(Verdict::Correct), _) => false,
            (_, Verdict::Correct) => true,
            (None, _) => true,
            (Some(Verdict::Absent), Verdict::Present) => true,
            _ => false,
        };

        if upgrade {
            *slot = Some(verdict);
        }

        upgrade
    }

    pub fn get(&self, letter: char) -> Option<Verdict> {
        if !letter.is_ascii_lowercase() {
            return None;
        }

        self.states[letter_idx(letter as u8)]
    }

    /// Wipe all hints, done when a fresh attempt starts.
    pub fn reset(&mut self) {
        self.states = [None; ALPHABET_SIZE];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Verdict::*;

    #[test]
    fn test_correct_is_never_downgraded() {
        let mut hints = KeyHints::default();
        assert!(hints.apply('e', Correct));
        assert!(!hints.apply('e', Present));
        assert!(!hints.apply('e', Absent));
        assert_eq!(hints.get('e'), Some(Correct));
    }

    #[test]
    fn test_present_overwrites_only_absent_or_unmarked() {
        let mut hints = KeyHints::default();
        assert!(hints.apply('a', Absent));
        assert!(hints.apply('a', Present), "present should replace absent");
        assert!(!hints.apply('a', Absent), "absent must not replace present");
        assert_eq!(hints.get('a'), Some(Present));

        assert!(hints.apply('b', Present), "present should mark an unmarked key");
    }

    #[test]
    fn test_correct_replaces_anything_below_it() {
        let mut hints = KeyHints::default();
        hints.apply('g', Present);
        assert!(hints.apply('g', Correct));
        assert_eq!(hints.get('g'), Some(Correct));
    }

    #[test]
    fn test_repeat_of_same_state_reports_no_upgrade() {
        let mut hints = KeyHints::default();
        assert!(hints.apply('z', Absent));
        assert!(!hints.apply('z', Absent));
    }

    #[test]
    fn test_non_letters_ignored_and_reset_clears() {
        let mut hints = KeyHints::default();
        assert!(!hints.apply('!', Correct));
        assert!(!hints.apply('E', Correct), "hints are keyed by lowercase letters");

        hints.apply('q', Correct);
        hints.reset();
        assert_eq!(hints.get('q'), None);
    }
}
