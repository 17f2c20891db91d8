//! Fire-and-forget product analytics. The engine names events and attaches a
//! small property bag; whichever sink is installed decides transport. A sink
//! must never panic or block the game loop, and running without one installed
//! is fine.

/// Named events, with the wire names the analytics backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    AppLoaded,
    GameStart,
    GuessSubmitted,
    GameWin,
    GameFail,
    ShareClicked,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        use EventKind::*;
        match self {
            AppLoaded => "bvq_app_loaded",
            GameStart => "bvq_game_start",
            GuessSubmitted => "bvq_guess_submitted",
            GameWin => "bvq_game_win",
            GameFail => "bvq_game_fail",
            ShareClicked => "bvq_share_clicked",
        }
    }
}

/// Property bag attached to an event.
pub type Props = Vec<(&'static str, String)>;

pub trait TelemetrySink {
    fn track(&mut self, event: EventKind, props: &Props);
}

/// Swallows everything; used when no analytics provider is configured.
#[derive(Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn track(&mut self, _: EventKind, _: &Props) {}
}

/// Writes events to the log, the terminal driver's default sink.
#[derive(Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn track(&mut self, event: EventKind, props: &Props) {
        log::debug!("track {} {:?}", event.name(), props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(EventKind::AppLoaded.name(), "bvq_app_loaded");
        assert_eq!(EventKind::GameStart.name(), "bvq_game_start");
        assert_eq!(EventKind::GuessSubmitted.name(), "bvq_guess_submitted");
        assert_eq!(EventKind::GameWin.name(), "bvq_game_win");
        assert_eq!(EventKind::GameFail.name(), "bvq_game_fail");
        assert_eq!(EventKind::ShareClicked.name(), "bvq_share_clicked");
    }
}
