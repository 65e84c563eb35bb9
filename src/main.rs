use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quill::app::{App, AppScreen};
use quill::config::Config;
use quill::event::{AppEvent, EventHandler};
use quill::session::lesson::Action;
use quill::session::stage::Stage;
use quill::store::json_store::JsonStore;
use quill::store::storage::{MemoryStorage, Storage};
use quill::ui;
use quill::ui::components::dashboard::Dashboard;
use quill::ui::components::game_field::GameField;
use quill::ui::components::keyboard_diagram::KeyboardDiagram;
use quill::ui::components::lesson_panel::LessonPanel;
use quill::ui::components::menu::{MenuAction, RecordCard};
use quill::ui::components::progress_bar::ProgressBar;
use quill::ui::layout::{AppLayout, pack_hint_lines};
use quill::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "quill", version, about = "Terminal typing lessons for beginners")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory for saved progress")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Keep progress in memory only")]
    no_save: bool,

    #[arg(long, help = "Clear saved progress and exit")]
    reset_progress: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(JsonStore::default_dir);
    init_logging(&data_dir)?;

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Falling back to default config: {e:#}");
        Config::default()
    });
    if let Some(theme_name) = cli.theme {
        config.theme = theme_name;
    }

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let storage: Box<dyn Storage> = if cli.no_save {
        Box::new(MemoryStorage::new())
    } else {
        match JsonStore::with_base_dir(data_dir.clone()) {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("Progress will not be saved: {e}");
                let mut storage = MemoryStorage::new();
                storage.unavailable = true;
                Box::new(storage)
            }
        }
    };

    let tick_rate = config.tick_rate();
    let mut app = App::new(config, storage, theme);
    if cli.reset_progress {
        app.reset_device_progress();
        match app.persistence_error {
            Some(msg) => eprintln!("{msg}"),
            None => println!("Saved progress cleared."),
        }
        return Ok(());
    }
    info!(data_dir = %data_dir.display(), no_save = cli.no_save, "quill started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Logs go to a file in the data dir; stdout belongs to the TUI.
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;
    let log_file = File::create(data_dir.join("quill.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    let started = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        let now = started.elapsed();
        match event {
            AppEvent::Key(key) => handle_key(app, now, key),
            AppEvent::Tick => {}
            AppEvent::FocusGained => app.focus.set_focus(true),
            AppEvent::FocusLost => app.focus.set_focus(false),
            AppEvent::Click => app.click(),
            AppEvent::Resize(_, _) => {}
        }
        // Timers run on every event, not only on idle ticks.
        app.tick(now);

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, now: Duration, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    app.key_pressed(now);

    match app.screen {
        AppScreen::Home => handle_home_key(app, now, key),
        AppScreen::Lesson if app.lesson.stage() == Stage::Summary => {
            handle_summary_key(app, now, key)
        }
        AppScreen::Lesson => handle_lesson_key(app, now, key),
    }
}

fn run_menu_action(app: &mut App, now: Duration, action: MenuAction) {
    match action {
        MenuAction::StartLesson => app.start_lesson(now),
        MenuAction::ResetProgress => app.reset_device_progress(),
        MenuAction::Quit => app.should_quit = true,
    }
}

fn handle_home_key(app: &mut App, now: Duration, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.start_lesson(now),
        KeyCode::Char('x') => app.reset_device_progress(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                run_menu_action(app, now, action);
            }
        }
        _ => {}
    }
}

fn handle_lesson_key(app: &mut App, now: Duration, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_home(),
        KeyCode::Enter => match app.primary_action() {
            Some(action) => app.action(now, action),
            // Any key proves the keyboard works, Enter included.
            None if app.lesson.stage() == Stage::Preflight => app.type_char(now, '\n'),
            None => {}
        },
        KeyCode::Tab => app.action(now, Action::ShowMe),
        KeyCode::Char(ch) => app.type_char(now, ch),
        _ => {}
    }
}

fn handle_summary_key(app: &mut App, now: Duration, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.action(now, Action::Restart),
        KeyCode::Char('x') => app.reset_device_progress(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Home => render_home(frame, app),
        AppScreen::Lesson if app.lesson.stage() == Stage::Summary => render_summary(frame, app),
        AppScreen::Lesson => render_lesson(frame, app),
    }

    if app.focus.needs_refocus() {
        render_refocus_banner(frame, app);
    }
}

fn render_home(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![Span::styled(
        " quill ",
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    let body = ui::layout::centered_rect(60, 90, layout[1]);
    let columns = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(14), Constraint::Length(8)])
        .split(body);
    frame.render_widget(&app.menu, columns[0]);
    frame.render_widget(RecordCard::new(app.stored.as_ref(), app.theme), columns[1]);

    let status = app
        .persistence_error
        .as_deref()
        .map(|msg| (msg, colors.warning()))
        .or_else(|| app.notice.as_deref().map(|msg| (msg, colors.success())));
    let footer = match status {
        Some((msg, color)) => Line::from(Span::styled(format!(" {msg}"), Style::default().fg(color))),
        None => Line::from(Span::styled(
            " [1/Enter] Start  [x] Reset progress  [q] Quit ",
            Style::default().fg(colors.text_pending()),
        )),
    };
    frame.render_widget(Paragraph::new(footer), layout[2]);
}

fn render_lesson(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let lesson = &app.lesson;
    let app_layout = AppLayout::new(area);

    let header_text = format!(
        " Lesson 1 | {} | Correct: {} | Errors: {} | Streak: {} (best {}) | Acc: {:.0}%",
        lesson.stage().label(),
        lesson.correct(),
        lesson.errors(),
        lesson.streak(),
        lesson.best_streak(),
        lesson.accuracy() * 100.0,
    );
    let keyboard_status = if lesson.keyboard_connected() {
        (" Keyboard connected ", colors.success())
    } else {
        (" Press a key ", colors.warning())
    };
    let capture_status = if app.focus.needs_refocus() {
        (" Click to refocus ", colors.error())
    } else {
        (" Listening ", colors.text_pending())
    };
    let header_bg = Style::default().bg(colors.header_bg());
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            header_text,
            header_bg.fg(colors.header_fg()).add_modifier(Modifier::BOLD),
        ),
        Span::styled("|", header_bg.fg(colors.header_fg())),
        Span::styled(keyboard_status.0, header_bg.fg(keyboard_status.1)),
        Span::styled("|", header_bg.fg(colors.header_fg())),
        Span::styled(capture_status.0, header_bg.fg(capture_status.1)),
    ]))
    .style(header_bg);
    frame.render_widget(header, app_layout.header);

    if let Some(progress_area) = app_layout.progress {
        frame.render_widget(ProgressBar::for_lesson(lesson, app.theme), progress_area);
    }

    if lesson.stage() == Stage::Game {
        frame.render_widget(GameField::new(lesson.game(), app.theme), app_layout.main);
    } else {
        frame.render_widget(LessonPanel::new(lesson, app.theme), app_layout.main);
    }

    if let Some(keyboard_area) = app_layout.keyboard {
        let kbd = KeyboardDiagram::new(lesson.target_key(), lesson.last_pressed(), app.theme);
        frame.render_widget(kbd, keyboard_area);
    }

    let mut hints = vec!["[Esc] Home"];
    match app.primary_action() {
        Some(Action::RetryPreflight) => hints.insert(0, "[Enter] Try again"),
        Some(Action::BeginDiscovery) => hints.insert(0, "[Enter] Find the keys"),
        Some(Action::StartPractice) => hints.insert(0, "[Enter] Start practice"),
        Some(Action::SkipPrompt) => hints.insert(0, "[Enter] Skip"),
        _ => {}
    }
    if lesson.stage() == Stage::Intro && lesson.target_key().is_some() {
        hints.insert(0, "[Tab] Show me");
    }
    let width = app_layout.footer.width as usize;
    let footer_line = pack_hint_lines(&hints, width).into_iter().next().unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_line,
        Style::default().fg(colors.text_pending()),
    )));
    frame.render_widget(footer, app_layout.footer);
}

fn render_summary(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(summary) = app.lesson.summary() {
        let centered = ui::layout::centered_rect(60, 80, area);
        let dashboard = Dashboard::new(summary, app.theme)
            .previous_best_stars(app.better_previous_stars())
            .persistence_error(app.persistence_error.as_deref());
        frame.render_widget(dashboard, centered);
    }
}

fn render_refocus_banner(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let width = area.width.min(52);
    let banner = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height / 3,
        width,
        area.height.min(4),
    );
    let block = Block::bordered()
        .title(" Still there? ")
        .border_style(Style::default().fg(colors.warning()))
        .style(Style::default().bg(colors.bg()));
    let text = Paragraph::new("Click here or press any key to keep typing.")
        .style(Style::default().fg(colors.fg()))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(Clear, banner);
    frame.render_widget(text, banner);
}
