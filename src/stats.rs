use std::time::SystemTime;

/// Characters per "word" when converting keystrokes to words per minute.
pub const CHARS_PER_WORD: f64 = 5.0;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Milliseconds from `start` to `end`, or `None` if `end` is not after `start`.
pub fn elapsed_ms(start: SystemTime, end: SystemTime) -> Option<u128> {
    end.duration_since(start)
        .ok()
        .map(|d| d.as_millis())
        .filter(|ms| *ms > 0)
}

/// Words per minute from correct characters.
///
/// Returns `None` when the value should be held rather than recomputed: the
/// session has not started, or no measurable time has passed since it did.
pub fn compute_wpm(
    correct_count: usize,
    started_at: Option<SystemTime>,
    now: SystemTime,
) -> Option<u32> {
    let elapsed = elapsed_ms(started_at?, now)?;
    let minutes = elapsed as f64 / MILLIS_PER_MINUTE;

    let words = correct_count as f64 / CHARS_PER_WORD;
    let wpm = (words / minutes).round();

    // `as` saturates, so absurdly short intervals clamp to u32::MAX
    Some(wpm as u32)
}

/// Percentage of typed characters that were correct. Nothing typed is 100%.
pub fn compute_accuracy(correct_count: usize, total_count: usize) -> u8 {
    if total_count == 0 {
        return 100;
    }
    let ratio = correct_count as f64 / total_count as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
