use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keytutor::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    lesson::LessonBook,
    progress::WordPolicy,
    runtime::{CrosstermEventSource, FixedTicker, IntervalTimer, Runner, SystemClock, TutorEvent},
    tutor::{Tutor, TutorSettings},
    ui::TerminalView,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, File},
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

/// How often the event loop wakes up to poll timers when no key arrives.
const POLL_RATE_MS: u64 = 50;

/// terminal typing tutor with live feedback and a virtual keyboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing tutor: type the lesson shown, watch each character turn green or red, follow the highlighted key on the virtual keyboard, and see wpm and accuracy update as you go."
)]
pub struct Cli {
    /// json file with lessons, e.g. {"lessons": ["first sentence", ["or", "word", "lists"]]}
    #[clap(short = 'f', long)]
    lessons: Option<PathBuf>,

    /// lesson to start with (0-based)
    #[clap(short = 'l', long)]
    lesson: Option<usize>,

    /// what happens to the input once a word is typed correctly
    #[clap(short = 'w', long, value_enum)]
    word_policy: Option<WordPolicy>,

    /// milliseconds between live stats updates
    #[clap(long)]
    tick_ms: Option<u64>,

    /// milliseconds the completion banner stays up before the next lesson
    #[clap(long)]
    completion_delay_ms: Option<u64>,

    /// hide the virtual keyboard
    #[clap(long)]
    no_keyboard: bool,

    /// persist the given options as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags given on the command line win over the stored config
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(path) = &self.lessons {
            cfg.lessons_file = Some(path.clone());
        }
        if let Some(lesson) = self.lesson {
            cfg.start_lesson = lesson;
        }
        if let Some(policy) = self.word_policy {
            cfg.word_policy = policy;
        }
        if let Some(ms) = self.tick_ms {
            cfg.tick_interval_ms = ms;
        }
        if let Some(ms) = self.completion_delay_ms {
            cfg.completion_delay_ms = ms;
        }
        if self.no_keyboard {
            cfg.show_keyboard = false;
        }
        cfg
    }
}

type TerminalTutor = Tutor<TerminalView, IntervalTimer, SystemClock>;

pub struct App {
    pub tutor: TerminalTutor,
}

impl App {
    pub fn new(cfg: &Config) -> Result<Self, Box<dyn Error>> {
        let book = match &cfg.lessons_file {
            Some(path) => LessonBook::from_path(path)?,
            None => LessonBook::builtin()?,
        };
        let view = TerminalView::new(cfg.completion_delay(), cfg.show_keyboard);
        let mut tutor = Tutor::new(
            book,
            cfg.start_lesson,
            TutorSettings::from(cfg),
            view,
            IntervalTimer::new(),
            SystemClock,
        )?;
        tutor.start();
        Ok(Self { tutor })
    }

    /// Poll the stats timer and the delayed lesson switch.
    fn on_tick(&mut self, now: Instant) {
        if self.tutor.timer_mut().take_due(now) {
            self.tutor.on_tick();
        }
        if let Some(ticket) = self.tutor.view_mut().take_due_ticket(now) {
            self.tutor.on_next_lesson_requested(ticket);
        }
        self.tutor.view_mut().expire_flash(now);
    }

    /// Returns false when the app should quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        if let KeyCode::Char(c) = key.code {
            let pressed = key.kind != KeyEventKind::Release;
            self.tutor.on_physical_key(&c.to_string(), pressed);
        }
        if key.kind == KeyEventKind::Release {
            return true;
        }

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.tutor.on_restart_requested();
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.tutor.view_mut().type_char(c) {
                    self.tutor.on_input_changed(&input);
                }
            }
            KeyCode::Backspace => {
                self.tutor.on_physical_key("Backspace", true);
                if let Some(input) = self.tutor.view_mut().backspace() {
                    self.tutor.on_input_changed(&input);
                }
            }
            KeyCode::Enter => self.tutor.on_physical_key("Enter", true),
            KeyCode::Tab => self.tutor.on_physical_key("Tab", true),
            _ => {}
        }
        true
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    // the terminal belongs to the ui, so logs only go to a file and only on request
    if std::env::var("RUST_LOG").is_err() {
        return Ok(());
    }
    let log_path = AppDirs::log_path().unwrap_or_else(|| PathBuf::from("keytutor.log"));
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = File::create(&log_path)?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging()?;

    let store = FileConfigStore::new();
    let cfg = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&cfg)?;
        info!("saved config to {}", store.path().display());
    }

    let mut app = App::new(&cfg)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(POLL_RATE_MS)),
    );

    loop {
        terminal.draw(|f| f.render_widget(app.tutor.view(), f.area()))?;

        match runner.step() {
            TutorEvent::Tick | TutorEvent::Resize => {}
            TutorEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
        }

        // fast typists never let the runner time out, so poll after every event
        app.on_tick(Instant::now());
    }

    Ok(())
}
