use log::{debug, info};
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::keys::{is_on_layout, key_for, normalize_key, KeyFlash};
use crate::lesson::{Lesson, LessonBook};
use crate::matcher::{self, CharFeedback};
use crate::progress::{self, WordPolicy};
use crate::runtime::{Clock, SystemClock, Timer, STATS_TICK_MS};
use crate::session::SessionState;
use crate::stats::{compute_accuracy, compute_wpm};

/// Handle given to the view when a lesson is finished. Redeeming it loads the
/// next lesson, unless a restart happened in the meantime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionTicket {
    pub generation: u64,
    pub lesson_index: usize,
}

/// Everything the tutor asks of whoever draws it.
pub trait View {
    fn show_lesson(&mut self, lesson: &Lesson);
    /// Empty and re-enable the input for a fresh attempt.
    fn reset_input(&mut self);
    /// Empty the input after a committed word. Must not echo back an input change.
    fn clear_input(&mut self);
    fn render_feedback(&mut self, statuses: &[CharFeedback]);
    fn highlight_key(&mut self, key: Option<&str>);
    fn flash_key(&mut self, key: &str, flash: KeyFlash);
    fn show_stats(&mut self, wpm: u32, accuracy: u8);
    fn lock_input(&mut self);
    fn notify_lesson_complete(&mut self, ticket: CompletionTicket);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorSettings {
    pub tick_interval: Duration,
    pub word_policy: WordPolicy,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(STATS_TICK_MS),
            word_policy: WordPolicy::default(),
        }
    }
}

impl From<&Config> for TutorSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            tick_interval: cfg.tick_interval(),
            word_policy: cfg.word_policy,
        }
    }
}

/// Owns the session and drives the view and timer in response to input.
pub struct Tutor<V: View, T: Timer, C: Clock = SystemClock> {
    book: LessonBook,
    state: SessionState,
    settings: TutorSettings,
    generation: u64,
    view: V,
    timer: T,
    clock: C,
}

impl<V: View, T: Timer, C: Clock> Tutor<V, T, C> {
    /// Nothing is shown until [`Tutor::start`] is called.
    pub fn new(
        book: LessonBook,
        lesson_index: usize,
        settings: TutorSettings,
        view: V,
        timer: T,
        clock: C,
    ) -> Result<Self> {
        let lesson_index = book.checked_index(lesson_index)?;
        let state = SessionState::new(lesson_index, book.cyclic(lesson_index));
        Ok(Self {
            book,
            state,
            settings,
            generation: 0,
            view,
            timer,
            clock,
        })
    }

    pub fn start(&mut self) {
        self.begin_lesson(self.state.lesson_index);
    }

    pub fn on_input_changed(&mut self, input: &str) {
        if self.state.completed {
            debug!(
                "input ignored, lesson {} already complete",
                self.state.lesson_index
            );
            return;
        }

        let typed = format!("{}{}", self.state.committed, input);

        if !self.state.has_started() {
            self.state.started_at = Some(self.clock.now());
            self.timer.start_ticking(self.settings.tick_interval);
        }

        let result = matcher::compare(&typed, self.state.lesson_text());
        self.state.correct_count = result.correct_count;
        self.state.total_count = result.total_count;
        debug!(
            "typed {:?}: {}/{} correct, next {:?}",
            typed, result.correct_count, result.total_count, result.next_index
        );

        self.view.render_feedback(&result.statuses);
        let key = key_for(result.expected_char(self.state.lesson_text()));
        self.view.highlight_key(key.as_deref());

        let progress = progress::advance(&typed, &self.state);
        self.state.word_index = progress.word_index;
        self.state.typed = typed;

        if progress.completed {
            self.complete();
        } else if progress.word_completed {
            debug!("word {} done", progress.word_index - 1);
            if self.settings.word_policy == WordPolicy::ClearPerWord {
                self.state.committed = self.state.typed.clone();
                self.view.clear_input();
            }
        }

        self.refresh_stats();
    }

    pub fn on_tick(&mut self) {
        if !self.timer.is_ticking() {
            return;
        }
        self.refresh_stats();
    }

    pub fn on_restart_requested(&mut self) {
        info!("restarting lesson {}", self.state.lesson_index);
        self.begin_lesson(self.state.lesson_index);
    }

    /// Returns false for a ticket issued before the latest (re)start.
    pub fn on_next_lesson_requested(&mut self, ticket: CompletionTicket) -> bool {
        if ticket.generation != self.generation || !self.state.completed {
            debug!(
                "stale completion ticket {:?} (generation {})",
                ticket, self.generation
            );
            return false;
        }
        let next = self.book.next_index(ticket.lesson_index);
        self.begin_lesson(next);
        true
    }

    /// Cosmetic key feedback only; never affects scoring.
    pub fn on_physical_key(&mut self, key_name: &str, pressed: bool) {
        if self.state.completed {
            return;
        }
        let key = normalize_key(key_name);
        if !is_on_layout(&key) {
            return;
        }

        let flash = if pressed {
            KeyFlash::Down
        } else {
            let typed_len = self.state.typed.chars().count();
            match self.state.typed.chars().last() {
                None => KeyFlash::Released,
                Some(c) if Some(c) == self.state.expected_char(typed_len - 1) => {
                    KeyFlash::Correct
                }
                Some(_) => KeyFlash::Incorrect,
            }
        };
        self.view.flash_key(&key, flash);
    }

    fn begin_lesson(&mut self, index: usize) {
        self.timer.stop_ticking();
        self.generation = self.generation.wrapping_add(1);

        let lesson = self.book.cyclic(index);
        info!("starting lesson {index}: {:?}", lesson.text());
        self.state = SessionState::new(index, lesson);

        self.view.show_lesson(lesson);
        self.view.reset_input();
        let initial = matcher::compare("", lesson.text());
        self.view.render_feedback(&initial.statuses);
        let key = key_for(initial.expected_char(lesson.text()));
        self.view.highlight_key(key.as_deref());
        self.view.show_stats(0, 100);
    }

    fn complete(&mut self) {
        self.state.completed = true;
        self.timer.stop_ticking();
        self.view.lock_input();

        let ticket = CompletionTicket {
            generation: self.generation,
            lesson_index: self.state.lesson_index,
        };
        info!("lesson {} complete", self.state.lesson_index);
        self.view.notify_lesson_complete(ticket);
    }

    fn refresh_stats(&mut self) {
        if !self.state.has_started() {
            return;
        }
        let now = self.clock.now();
        if let Some(wpm) = compute_wpm(self.state.correct_count, self.state.started_at, now) {
            self.state.wpm = wpm;
        }
        let accuracy = compute_accuracy(self.state.correct_count, self.state.total_count);
        self.view.show_stats(self.state.wpm, accuracy);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn lesson(&self) -> &Lesson {
        self.book.cyclic(self.state.lesson_index)
    }

    pub fn book(&self) -> &LessonBook {
        &self.book
    }

    pub fn settings(&self) -> &TutorSettings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ManualClock, ManualTimer};

    #[derive(Default)]
    struct NullView {
        feedback: Vec<CharFeedback>,
        key: Option<String>,
        stats: Option<(u32, u8)>,
    }

    impl View for NullView {
        fn show_lesson(&mut self, _lesson: &Lesson) {}
        fn reset_input(&mut self) {}
        fn clear_input(&mut self) {}
        fn render_feedback(&mut self, statuses: &[CharFeedback]) {
            self.feedback = statuses.to_vec();
        }
        fn highlight_key(&mut self, key: Option<&str>) {
            self.key = key.map(str::to_owned);
        }
        fn flash_key(&mut self, _key: &str, _flash: KeyFlash) {}
        fn show_stats(&mut self, wpm: u32, accuracy: u8) {
            self.stats = Some((wpm, accuracy));
        }
        fn lock_input(&mut self) {}
        fn notify_lesson_complete(&mut self, _ticket: CompletionTicket) {}
    }

    fn tutor() -> Tutor<NullView, ManualTimer, ManualClock> {
        let book = LessonBook::builtin().unwrap();
        let mut tutor = Tutor::new(
            book,
            0,
            TutorSettings::default(),
            NullView::default(),
            ManualTimer::default(),
            ManualClock::default(),
        )
        .unwrap();
        tutor.start();
        tutor
    }

    #[test]
    fn test_start_shows_initial_state() {
        let tutor = tutor();

        assert_eq!(tutor.view().feedback[0], CharFeedback::Current);
        assert_eq!(tutor.view().key.as_deref(), Some("t"));
        assert_eq!(tutor.view().stats, Some((0, 100)));
        assert!(!tutor.timer().is_ticking());
        assert_eq!(tutor.generation(), 1);
    }

    #[test]
    fn test_new_rejects_out_of_range_lesson() {
        let book = LessonBook::builtin().unwrap();
        let result = Tutor::new(
            book,
            7,
            TutorSettings::default(),
            NullView::default(),
            ManualTimer::default(),
            ManualClock::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_first_keystroke_starts_timer_once() {
        let mut tutor = tutor();

        tutor.on_input_changed("t");
        tutor.on_input_changed("th");

        assert!(tutor.state().has_started());
        assert_eq!(tutor.timer().starts, 1);
        assert_eq!(tutor.timer().interval, Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_tick_without_timer_is_ignored() {
        let mut tutor = tutor();
        tutor.view_mut().stats = None;

        tutor.on_tick();

        assert_eq!(tutor.view().stats, None);
    }

    #[test]
    fn test_recomputing_same_input_does_not_double_count() {
        let mut tutor = tutor();

        tutor.on_input_changed("the");
        tutor.on_input_changed("the");

        assert_eq!(tutor.state().correct_count, 3);
        assert_eq!(tutor.state().total_count, 3);
    }

    #[test]
    fn test_physical_key_release_feedback() {
        let mut tutor = tutor();
        tutor.on_input_changed("tz");

        // no panic and nothing recorded for keys off the layout
        tutor.on_physical_key("F13", true);
        tutor.on_physical_key("z", false);
        assert_eq!(tutor.state().total_count, 2);
    }
}
