use super::prelude::*;
use super::verdict::Verdicts;

/// Product name, shown in the share title and the driver banner.
pub const APP_NAME: &str = "BibleVerseQuest";

///
/// Renders the share text: a title line carrying the day key and the attempt
/// count ("X/6" while unfinished), one emoji row per completed guess, then
/// the link line. The caller supplies the link since only the front end knows
/// where it is hosted.
///
pub fn build_share_grid<'a, I>(day_key: &str, reveals: I, finished: bool, link: &str) -> String
where
    I: Iterator<Item = &'a Verdicts>,
{
    let rows: Vec<String> = reveals.map(|v| v.to_string()).collect();
    let status = if finished {
        format!("{}/{}", rows.len(), NUM_TURNS)
    } else {
        format!("X/{}", NUM_TURNS)
    };

    let mut out = format!("{} — Daily {} {}", APP_NAME, day_key, status);
    for row in &rows {
        out.push('\n');
        out.push_str(row);
    }
    if !link.is_empty() {
        out.push('\n');
        out.push_str(link);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Verdict::*;

    #[test]
    fn test_share_grid_finished() {
        let reveals = [
            Verdicts([Absent, Absent, Absent, Absent, Correct]),
            Verdicts([Correct, Correct, Correct, Correct, Correct]),
        ];
        let text = build_share_grid(
            "2025-06-01",
            reveals.iter(),
            true,
            "https://bibleversequest.app/",
        );

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "BibleVerseQuest — Daily 2025-06-01 2/6");
        assert_eq!(lines[1], "⬜⬜⬜⬜🟩");
        assert_eq!(lines[2], "🟩🟩🟩🟩🟩");
        assert_eq!(lines[3], "https://bibleversequest.app/");
    }

    #[test]
    fn test_share_grid_unfinished_uses_x() {
        let reveals = [Verdicts([Absent, Present, Absent, Absent, Absent])];
        let text = build_share_grid("2025-06-01", reveals.iter(), false, "");
        assert!(text.starts_with("BibleVerseQuest — Daily 2025-06-01 X/6"));
        assert_eq!(text.lines().count(), 2, "no empty link line when link is empty");
    }
}
