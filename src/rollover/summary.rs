//! Daily summary text.

use std::fmt::Write as _;

use crate::ledger::ClickSummary;

/// Maximum length of a single Telegram text message.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Renders the admin summary as Telegram HTML: one line per user,
/// followed by how many users reached the qualification threshold.
#[must_use]
pub fn format_summary(rows: &[ClickSummary], qualified: &[i64], threshold: u32) -> String {
    let mut summary = String::from("📊 <b>Daily Click Summary</b>\n\n");

    if rows.is_empty() {
        summary.push_str("<i>No registered users yet.</i>\n");
    }

    for row in rows {
        let _ = writeln!(summary, "👤 <code>{}</code> → {} clicks", row.user_id, row.clicks);
    }

    let _ = write!(
        summary,
        "\n🏆 Qualified for the giveaway ({threshold}+ clicks): <b>{}</b>",
        qualified.len()
    );

    summary
}

/// Splits `text` into messages of at most `limit` characters, breaking on
/// line boundaries. A single line longer than `limit` is cut.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_summary_lines() {
        let rows = [
            ClickSummary { user_id: 100, clicks: 20 },
            ClickSummary { user_id: 200, clicks: 3 },
        ];
        let text = format_summary(&rows, &[100], 20);

        assert!(text.starts_with("📊 <b>Daily Click Summary</b>\n\n"));
        assert!(text.contains("👤 <code>100</code> → 20 clicks\n"));
        assert!(text.contains("👤 <code>200</code> → 3 clicks\n"));
        assert!(text.ends_with("(20+ clicks): <b>1</b>"));
    }

    #[test]
    fn test_format_summary_empty_ledger() {
        let text = format_summary(&[], &[], 20);
        assert!(text.contains("No registered users"));
        assert!(text.ends_with("<b>0</b>"));
    }

    #[test]
    fn test_split_short_message_is_untouched() {
        assert_eq!(split_message("hello\nworld", 100), vec!["hello\nworld"]);
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc\n";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc\n"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_cuts_oversized_line() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_split_large_summary_respects_limit() {
        let rows: Vec<ClickSummary> = (0..2_000)
            .map(|i| ClickSummary { user_id: 1_000_000 + i, clicks: 7 })
            .collect();
        let text = format_summary(&rows, &[], 20);
        let chunks = split_message(&text, TELEGRAM_MESSAGE_LIMIT);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= TELEGRAM_MESSAGE_LIMIT));
        assert_eq!(chunks.concat(), text);
    }
}
