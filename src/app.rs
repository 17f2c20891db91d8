use crate::clock;
use crate::game::{
    build_share_grid, EpochMillis, Key, KeyOutcome, Reject, Session, Submit, Verdicts,
    EXPIRED_MESSAGE, EXPIRED_TOAST, MAX_PLAYS, NUM_TURNS, WORDS,
};
use crate::store::{KeyValueStore, StatusStore};
use crate::telemetry::{EventKind, Props, TelemetrySink};
use crate::ui::{BoardView, KeyHints, Notifier};
use chrono::{NaiveDate, NaiveDateTime};

///
/// Everything the running app owns: the store, today's session and the boxed
/// boundary handles. Built once at startup and threaded explicitly through
/// the event handlers; there is no global state anywhere in the crate.
///
/// The driver owns the clock: every entry point takes `now` so the controller
/// stays replayable under test.
///
pub struct App<S: KeyValueStore> {
    store: StatusStore<S>,
    session: Session,
    view: Box<dyn BoardView>,
    notifier: Box<dyn Notifier>,
    telemetry: Box<dyn TelemetrySink>,
    key_hints: KeyHints,
    input_locked: bool,
}

impl<S: KeyValueStore> App<S> {
    ///
    /// Loads persisted state for `today`, restores the session, and brings
    /// the view up to date: the grid, the verdicts of already-submitted rows,
    /// keyboard hints, the last message, and the verse when the day already
    /// finished. Runs the load-time idle check before computing the input
    /// lock, so a stalled attempt left from hours ago expires right away.
    ///
    pub fn bootstrap(
        backend: S,
        today: NaiveDate,
        now: EpochMillis,
        view: Box<dyn BoardView>,
        notifier: Box<dyn Notifier>,
        telemetry: Box<dyn TelemetrySink>,
    ) -> Self {
        let mut store = StatusStore::load(backend);
        let day_key = clock::date_key(today);
        let day = store.ensure_day(&day_key).clone();
        let target = WORDS.target_for(today).clone();
        log::debug!("bootstrapping day {}", day_key);

        let session = Session::restore(day_key, target, day);
        let mut app = Self {
            store,
            session,
            view,
            notifier,
            telemetry,
            key_hints: KeyHints::default(),
            input_locked: true,
        };

        app.view.draw_grid(app.session.grid());
        let replay: Vec<(usize, Verdicts)> =
            app.session.iter_reveals().copied().enumerate().collect();
        for (row, verdicts) in replay {
            app.view.colorize_row(row, &verdicts);
            app.apply_key_hints(row, &verdicts);
        }

        let message = app.session.day().message.clone();
        if !message.is_empty() {
            app.view.set_message(&message);
        }
        if app.session.day().finished {
            let target = app.session.target().clone();
            app.view.reveal_verse(&target);
        }

        app.expire_check(now);
        app.track(
            EventKind::AppLoaded,
            vec![("build", crate::BUILD_TAG.to_string())],
        );
        app.refresh_lock(now);
        app.persist();
        app
    }

    ///
    /// One keystroke or tap. Locked input is dropped outright; anything else
    /// bumps the activity clock, runs through the session, and gets its
    /// outcome rendered, tracked and persisted.
    ///
    pub fn process_key(&mut self, key: Key, now: EpochMillis) {
        if self.input_locked {
            return;
        }

        self.session.bump_activity(now);
        match self.session.handle_key(key, now) {
            KeyOutcome::Ignored => {}
            KeyOutcome::Edited { started } => {
                self.view.draw_grid(self.session.grid());
                if started {
                    self.track(
                        EventKind::GameStart,
                        vec![
                            ("puzzle_id", self.session.day_key().to_string()),
                            ("mode", "normal".to_string()),
                        ],
                    );
                }
            }
            KeyOutcome::Rejected(reject) => self.show_rejection(&reject),
            KeyOutcome::Submitted(sub) => self.apply_submit(sub, now),
        }

        self.persist();
    }

    /// Recurring housekeeping: the idle-expiry check and the deferred
    /// post-finish clear. The driver calls this at least every 30 seconds.
    pub fn tick(&mut self, now: EpochMillis) {
        self.expire_check(now);
        if self.session.poll_deferred_clear(now) {
            self.view.draw_grid(self.session.grid());
            self.persist();
        }
    }

    /// Run when the page or window regains visibility. Timers do not fire
    /// while backgrounded, so the expiry check must catch up here.
    pub fn on_visibility_restored(&mut self, now: EpochMillis) {
        self.expire_check(now);
        self.refresh_lock(now);
    }

    ///
    /// The New Game affordance. Refused while an attempt is live or when the
    /// quota is gone; otherwise starts a fresh attempt against the same daily
    /// target with a blank grid, blank hints and unlocked input.
    ///
    pub fn request_new_attempt(&mut self, now: EpochMillis) -> bool {
        if self.session.has_active_attempt(now) || !self.session.start_new_attempt(now) {
            return false;
        }

        self.key_hints.reset();
        self.view.draw_grid(self.session.grid());
        self.view.set_message("");
        self.view.hide_verse();
        self.refresh_lock(now);
        self.persist();
        true
    }

    pub fn can_start_new_attempt(&self, now: EpochMillis) -> bool {
        !self.session.has_active_attempt(now) && self.session.plays_remaining() > 0
    }

    pub fn input_locked(&self) -> bool {
        self.input_locked
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The quota/reset line shown under the board.
    pub fn quota_line(&self, now_local: NaiveDateTime) -> String {
        let left = self.session.plays_remaining();
        let reset_at = clock::next_reset_label(now_local);
        if left > 0 {
            format!(
                "You can play {} more time{} today (max {}). Your game will reset tomorrow at {}.",
                left,
                if left == 1 { "" } else { "s" },
                MAX_PLAYS,
                reset_at
            )
        } else {
            format!(
                "Daily limit reached (max {}). Your game will reset tomorrow at {}.",
                MAX_PLAYS, reset_at
            )
        }
    }

    pub fn countdown_line(&self, now_local: NaiveDateTime) -> String {
        format!(
            "Next puzzle in {}",
            clock::fmt_countdown(clock::ms_until_tomorrow(now_local))
        )
    }

    /// Builds the shareable result text and records the share, tagged with
    /// the delivery method the front end ended up using.
    pub fn share_text(&mut self, link: &str, method: &str) -> String {
        let text = build_share_grid(
            self.session.day_key(),
            self.session.iter_reveals(),
            self.session.day().finished,
            link,
        );
        self.track(
            EventKind::ShareClicked,
            vec![
                ("puzzle_id", self.session.day_key().to_string()),
                ("method", method.to_string()),
            ],
        );
        text
    }

    /// The idle-expiry check shared by every trigger (load, tick,
    /// visibility). Safe to run as often as the triggers overlap.
    fn expire_check(&mut self, now: EpochMillis) -> bool {
        if !self.session.expire_if_idle(now) {
            return false;
        }

        self.view.draw_grid(self.session.grid());
        self.view.hide_verse();
        self.view.set_message(EXPIRED_MESSAGE);
        self.notifier.toast(EXPIRED_TOAST);
        self.refresh_lock(now);
        self.persist();
        true
    }

    fn apply_submit(&mut self, sub: Submit, now: EpochMillis) {
        let (row, verdicts) = match &sub {
            Submit::Advanced { row, verdicts, .. } => (*row, *verdicts),
            Submit::Won { row, verdicts, .. } => (*row, *verdicts),
            Submit::Lost { row, verdicts } => (*row, *verdicts),
        };

        self.view.colorize_row(row, &verdicts);
        self.apply_key_hints(row, &verdicts);
        self.track(
            EventKind::GuessSubmitted,
            vec![
                ("puzzle_id", self.session.day_key().to_string()),
                ("guess_count", (row + 1).to_string()),
            ],
        );

        match sub {
            Submit::Advanced { .. } => {}
            Submit::Won { attempts, .. } => {
                self.finish_view();
                self.track(
                    EventKind::GameWin,
                    vec![
                        ("puzzle_id", self.session.day_key().to_string()),
                        ("attempts", attempts.to_string()),
                    ],
                );
                self.refresh_lock(now);
            }
            Submit::Lost { .. } => {
                self.finish_view();
                self.track(
                    EventKind::GameFail,
                    vec![
                        ("puzzle_id", self.session.day_key().to_string()),
                        ("attempts", NUM_TURNS.to_string()),
                    ],
                );
                self.refresh_lock(now);
            }
        }
    }

    fn finish_view(&mut self) {
        let message = self.session.day().message.clone();
        self.view.set_message(&message);
        let target = self.session.target().clone();
        self.view.reveal_verse(&target);
    }

    fn show_rejection(&mut self, reject: &Reject) {
        self.view.set_message(&reject.to_string());
    }

    fn apply_key_hints(&mut self, row: usize, verdicts: &Verdicts) {
        for (c, verdict) in verdicts.iter().enumerate() {
            if let Some(letter) = self.session.grid()[row][c] {
                if self.key_hints.apply(letter, verdict) {
                    self.view.set_key_hint(letter, verdict);
                }
            }
        }
    }

    fn refresh_lock(&mut self, now: EpochMillis) {
        self.input_locked = !self.session.has_active_attempt(now);
    }

    fn track(&mut self, event: EventKind, props: Props) {
        self.telemetry.track(event, &props);
    }

    /// Read-modify-write of today's record: the session's copy is the truth,
    /// and the whole mapping is serialized before the next event runs.
    fn persist(&mut self) {
        let key = self.session.day_key().to_string();
        *self.store.ensure_day(&key) = self.session.day().clone();
        self.store.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cursor, Grid, Verdict, VerseWord, FINISH_CLEAR_DELAY_MS, IDLE_TIMEOUT_MS};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    const NOW: EpochMillis = 1_735_700_000_000;

    /// 2025-01-01 rotates to the first word in the list, "grace".
    fn test_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[derive(Clone, Default)]
    struct SharedMem(Rc<RefCell<HashMap<String, String>>>);

    impl KeyValueStore for SharedMem {
        fn get(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
        }
    }

    #[derive(Default)]
    struct Calls {
        messages: Vec<String>,
        toasts: Vec<String>,
        events: Vec<String>,
        colorized: Vec<usize>,
        hints: Vec<(char, Verdict)>,
        draws: usize,
        verse_shown: bool,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Calls>>);

    impl BoardView for Recorder {
        fn draw_grid(&mut self, _: &Grid) {
            self.0.borrow_mut().draws += 1;
        }

        fn colorize_row(&mut self, row: usize, _: &Verdicts) {
            self.0.borrow_mut().colorized.push(row);
        }

        fn set_key_hint(&mut self, letter: char, verdict: Verdict) {
            self.0.borrow_mut().hints.push((letter, verdict));
        }

        fn set_message(&mut self, text: &str) {
            self.0.borrow_mut().messages.push(text.to_string());
        }

        fn reveal_verse(&mut self, _: &VerseWord) {
            self.0.borrow_mut().verse_shown = true;
        }

        fn hide_verse(&mut self) {
            self.0.borrow_mut().verse_shown = false;
        }
    }

    impl Notifier for Recorder {
        fn toast(&mut self, text: &str) {
            self.0.borrow_mut().toasts.push(text.to_string());
        }
    }

    impl TelemetrySink for Recorder {
        fn track(&mut self, event: EventKind, _: &Props) {
            self.0.borrow_mut().events.push(event.name().to_string());
        }
    }

    fn build_app(backend: SharedMem) -> (App<SharedMem>, Rc<RefCell<Calls>>) {
        let recorder = Recorder::default();
        let calls = recorder.0.clone();
        let app = App::bootstrap(
            backend,
            test_day(),
            NOW,
            Box::new(recorder.clone()),
            Box::new(recorder.clone()),
            Box::new(recorder),
        );
        (app, calls)
    }

    fn type_word(app: &mut App<SharedMem>, word: &str, now: EpochMillis) {
        for ch in word.chars() {
            app.process_key(Key::Letter(ch), now);
        }
    }

    #[test]
    fn test_fresh_day_is_locked_until_new_attempt() {
        let (mut app, calls) = build_app(SharedMem::default());

        assert!(app.input_locked());
        assert!(app.can_start_new_attempt(NOW));
        assert!(calls.borrow().events.contains(&"bvq_app_loaded".to_string()));

        // locked input goes nowhere
        app.process_key(Key::Letter('g'), NOW);
        assert_eq!(app.session().cursor(), Cursor::default());

        assert!(app.request_new_attempt(NOW));
        assert!(!app.input_locked());
        assert!(!app.can_start_new_attempt(NOW), "no new game while one is live");
    }

    #[test]
    fn test_win_flow_tracks_and_reveals() {
        let (mut app, calls) = build_app(SharedMem::default());
        app.request_new_attempt(NOW);

        type_word(&mut app, "house", NOW);
        app.process_key(Key::Submit, NOW);
        {
            let calls = calls.borrow();
            assert!(calls.events.contains(&"bvq_game_start".to_string()));
            assert!(calls.events.contains(&"bvq_guess_submitted".to_string()));
            assert_eq!(calls.colorized, vec![0]);
            assert!(
                calls.hints.contains(&('e', Verdict::Correct)),
                "the matched letter reaches the keyboard hints: {:?}",
                calls.hints
            );
        }

        type_word(&mut app, "grace", NOW);
        app.process_key(Key::Submit, NOW);
        let calls = calls.borrow();
        assert!(calls.events.contains(&"bvq_game_win".to_string()));
        assert!(calls.verse_shown);
        assert!(calls
            .messages
            .iter()
            .any(|m| m.contains("GRACE") && m.contains("Ephesians 2:8")));
        assert!(app.input_locked());
        assert!(app.can_start_new_attempt(NOW), "plays remain after the win");
    }

    #[test]
    fn test_reload_restores_mid_attempt_state() {
        let backend = SharedMem::default();
        {
            let (mut app, _) = build_app(backend.clone());
            app.request_new_attempt(NOW);
            type_word(&mut app, "house", NOW);
            app.process_key(Key::Submit, NOW);
            type_word(&mut app, "gr", NOW);
        }

        let (app, calls) = build_app(backend);
        assert_eq!(app.session().cursor(), Cursor { row: 1, col: 2 });
        assert_eq!(app.session().day().play_count, 1);
        assert_eq!(
            calls.borrow().colorized,
            vec![0],
            "restored rows are re-colorized on load"
        );
        assert!(!app.input_locked(), "a live attempt stays playable after reload");
    }

    #[test]
    fn test_idle_expiry_via_tick() {
        let (mut app, calls) = build_app(SharedMem::default());
        app.request_new_attempt(NOW);
        type_word(&mut app, "hou", NOW);

        app.tick(NOW + IDLE_TIMEOUT_MS - 1000);
        assert!(!app.session().day().expired);

        app.tick(NOW + IDLE_TIMEOUT_MS + 1000);
        let snapshot = {
            let calls = calls.borrow();
            (calls.toasts.clone(), calls.verse_shown)
        };
        assert!(app.session().day().expired);
        assert!(app.input_locked());
        assert!(snapshot.0.contains(&EXPIRED_TOAST.to_string()));
        assert!(!snapshot.1);
        assert!(calls
            .borrow()
            .messages
            .contains(&EXPIRED_MESSAGE.to_string()));

        // overlapping triggers are harmless
        app.on_visibility_restored(NOW + IDLE_TIMEOUT_MS + 2000);
        assert_eq!(
            calls
                .borrow()
                .toasts
                .iter()
                .filter(|t| t.as_str() == EXPIRED_TOAST)
                .count(),
            1
        );
    }

    #[test]
    fn test_quota_exhaustion_across_expiries() {
        let (mut app, _) = build_app(SharedMem::default());
        let mut now = NOW;

        for _ in 0..MAX_PLAYS {
            assert!(app.request_new_attempt(now));
            now += IDLE_TIMEOUT_MS + 1000;
            app.tick(now);
        }

        assert!(!app.can_start_new_attempt(now));
        assert!(!app.request_new_attempt(now));

        let local = test_day().and_hms_opt(12, 0, 0).unwrap();
        assert!(app.quota_line(local).starts_with("Daily limit reached (max 3)."));
    }

    #[test]
    fn test_deferred_clear_runs_on_tick() {
        let (mut app, calls) = build_app(SharedMem::default());
        app.request_new_attempt(NOW);
        type_word(&mut app, "grace", NOW);
        app.process_key(Key::Submit, NOW);
        assert!(!app.session().day().rows.is_empty());

        let draws_before = calls.borrow().draws;
        app.tick(NOW + FINISH_CLEAR_DELAY_MS + 50);
        assert!(app.session().day().rows.is_empty());
        assert!(app.session().day().finished);
        assert!(app.session().day().message.contains("GRACE"));
        assert!(calls.borrow().draws > draws_before, "the clear repaints the board");
    }

    #[test]
    fn test_rejection_shows_advisory_message() {
        let (mut app, calls) = build_app(SharedMem::default());
        app.request_new_attempt(NOW);
        type_word(&mut app, "gra", NOW);
        app.process_key(Key::Submit, NOW);

        assert!(calls
            .borrow()
            .messages
            .contains(&"Not enough letters.".to_string()));
        assert!(app.session().day().reveals.is_empty());
    }

    #[test]
    fn test_share_text_reports_method() {
        let (mut app, calls) = build_app(SharedMem::default());
        app.request_new_attempt(NOW);
        type_word(&mut app, "grace", NOW);
        app.process_key(Key::Submit, NOW);

        let text = app.share_text("https://bibleversequest.app/", "clipboard");
        assert!(text.starts_with("BibleVerseQuest — Daily 2025-01-01 1/6"));
        assert!(text.contains("🟩🟩🟩🟩🟩"));
        assert!(calls
            .borrow()
            .events
            .contains(&"bvq_share_clicked".to_string()));
    }

    #[test]
    fn test_quota_line_counts_down() {
        let (mut app, _) = build_app(SharedMem::default());
        let local = test_day().and_hms_opt(9, 30, 0).unwrap();
        assert!(app
            .quota_line(local)
            .starts_with("You can play 3 more times today (max 3)."));

        app.request_new_attempt(NOW);
        assert!(app
            .quota_line(local)
            .starts_with("You can play 2 more times today (max 3)."));
    }
}
