use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead};
use std::path::PathBuf;
use verse_quest::app::App;
use verse_quest::clock;
use verse_quest::game::{Grid, Key, Verdict, Verdicts, VerseWord, APP_NAME, NUM_TURNS, WORD_SIZE};
use verse_quest::store::{JsonFileStore, KeyValueStore};
use verse_quest::telemetry::LogSink;
use verse_quest::ui::{BoardView, Notifier};

const SITE_LINK: &str = "https://bibleversequest.app/";

/// Line-oriented board renderer. The engine pushes grid and verdict updates
/// through the BoardView trait; this keeps a copy of both and repaints the
/// whole board on every change.
#[derive(Default)]
struct TerminalBoard {
    grid: Grid,
    verdicts: [Option<Verdicts>; NUM_TURNS],
}

impl TerminalBoard {
    fn render(&self) {
        println!();
        for r in 0..NUM_TURNS {
            for c in 0..WORD_SIZE {
                let ch = self.grid[r][c]
                    .map(|ch| ch.to_ascii_uppercase())
                    .unwrap_or('·');
                let cell = format!(" {} ", ch);
                let painted = match self.verdicts[r].map(|v| v[c]) {
                    Some(Verdict::Correct) => cell.as_str().black().on_green().to_string(),
                    Some(Verdict::Present) => cell.as_str().black().on_yellow().to_string(),
                    Some(Verdict::Absent) => cell.as_str().white().on_bright_black().to_string(),
                    None => cell,
                };
                print!("{}", painted);
            }
            println!();
        }
        println!();
    }
}

impl BoardView for TerminalBoard {
    fn draw_grid(&mut self, grid: &Grid) {
        self.grid = *grid;
        if grid.iter().all(|row| row.iter().all(Option::is_none)) {
            // the board was cleared; stale colors go with it
            self.verdicts = Default::default();
        }
        self.render();
    }

    fn colorize_row(&mut self, row: usize, verdicts: &Verdicts) {
        self.verdicts[row] = Some(*verdicts);
        self.render();
    }

    fn set_key_hint(&mut self, letter: char, verdict: Verdict) {
        log::debug!("keyboard hint {} -> {:?}", letter, verdict);
    }

    fn set_message(&mut self, text: &str) {
        if !text.is_empty() {
            println!("{}", text.bold());
        }
    }

    fn reveal_verse(&mut self, target: &VerseWord) {
        println!("{} — {}", target.reference.as_str().italic(), target.verse);
    }

    fn hide_verse(&mut self) {}
}

struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn toast(&mut self, text: &str) {
        println!("{}", format!("[!] {}", text).as_str().yellow());
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("verse-quest"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn print_status<S: KeyValueStore>(app: &App<S>) {
    let now_local = clock::now_local();
    println!("{}", app.quota_line(now_local));
    println!("{}", app.countdown_line(now_local));
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(verse_quest::LOG_LEVEL)
        .init();
    log::info!("{} {} ({})", APP_NAME, verse_quest::BUILD_TAG, verse_quest::GIT_VERSION);

    let backend = JsonFileStore::new(data_dir());
    let mut app = App::bootstrap(
        backend,
        clock::today(),
        clock::now_ms(),
        Box::new(TerminalBoard::default()),
        Box::new(TerminalNotifier),
        Box::new(LogSink),
    );

    println!("{}", APP_NAME.bold());
    println!("Guess the 5-letter word from today's verse.");
    println!("Type a word to guess, or: new / del / share / quit");
    if app.can_start_new_attempt(clock::now_ms()) {
        println!("Type 'new' to start a game.");
    }
    print_status(&app);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let now = clock::now_ms();
        app.tick(now);

        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "new" => {
                if !app.request_new_attempt(now) {
                    println!("No new game available right now.");
                }
            }
            "del" => app.process_key(Key::Delete, now),
            "share" => println!("{}", app.share_text(SITE_LINK, "terminal")),
            word => {
                for ch in word.chars() {
                    app.process_key(Key::Letter(ch), now);
                }
                app.process_key(Key::Submit, now);
            }
        }

        print_status(&app);
    }

    Ok(())
}
