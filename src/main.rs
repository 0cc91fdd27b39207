mod api;
mod app;
mod config;
mod event;
mod session;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
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

use app::{App, AppScreen, GeneratePane};
use config::Config;
use event::{AppEvent, EventHandler};
use session::practice::Grade;
use ui::components::card_panel::CardPanel;
use ui::components::progress_bar::ProgressBar;
use ui::components::select_list::{ListRow, SelectList};
use ui::layout::AppLayout;
use ui::line_input::{InputResult, LineInput};

#[derive(Parser)]
#[command(name = "studywire", version, about = "Terminal spaced-repetition study client")]
struct Cli {
    #[arg(short, long, help = "Backend base URL, e.g. http://127.0.0.1:8000/api")]
    server: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Practice session card limit (0 = no limit)")]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(limit) = cli.limit {
        config.practice_limit = limit;
    }
    config.validate();

    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // ~30 fps: the disclosure animation advances on ticks.
    let events = EventHandler::new(Duration::from_millis(33));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.sync_extents(size.width, size.height);

        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Review => handle_review_key(app, key),
        AppScreen::PracticeSetup => handle_practice_setup_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
        AppScreen::PracticeDone => handle_practice_done_key(app, key),
        AppScreen::Cards => handle_cards_key(app, key),
        AppScreen::Generate => handle_generate_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.go_to_review(),
        KeyCode::Char('2') => app.go_to_practice_setup(),
        KeyCode::Char('3') => app.go_to_cards(),
        KeyCode::Char('4') => app.go_to_generate(),
        KeyCode::Char('c') => app.go_to_settings(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => match app.menu.selected {
            0 => app.go_to_review(),
            1 => app.go_to_practice_setup(),
            2 => app.go_to_cards(),
            3 => app.go_to_generate(),
            4 => app.go_to_settings(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_review_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Enter => {
            if app.review.card.is_none() {
                app.review_next_card(now);
            }
        }
        KeyCode::Char(' ') => app.review_toggle_answer(now),
        KeyCode::Char(ch) => {
            if let Some(grade) = Grade::from_key(ch) {
                app.review_grade(grade, now);
            }
        }
        _ => {}
    }
}

fn handle_practice_setup_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.deck_selected = app.deck_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !app.decks.is_empty() {
                app.deck_selected = (app.deck_selected + 1).min(app.decks.len() - 1);
            }
        }
        KeyCode::Char('p') => app.cycle_setup_pool(),
        KeyCode::Char('s') => app.setup_shuffle = !app.setup_shuffle,
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_setup_limit(1),
        KeyCode::Char('-') => app.adjust_setup_limit(-1),
        KeyCode::Char('r') => app.load_decks(),
        KeyCode::Enter => app.start_practice(),
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    match key.code {
        KeyCode::Esc => app.end_practice(),
        KeyCode::Char(' ') => app.practice_toggle_answer(now),
        KeyCode::Char('u') => app.practice_step_back(),
        KeyCode::Char(ch) => {
            if let Some(grade) = Grade::from_key(ch) {
                app.practice_grade(grade);
            }
        }
        _ => {}
    }
}

fn handle_practice_done_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => app.end_practice(),
        KeyCode::Char('u') => {
            // Step back into the finished session to re-grade the last card.
            app.practice_step_back();
            if app.practice.as_ref().is_some_and(|q| !q.is_finished()) {
                app.screen = AppScreen::Practice;
            }
        }
        _ => {}
    }
}

fn handle_cards_key(app: &mut App, key: KeyEvent) {
    if let Some(input) = app.deck_input.as_mut() {
        match input.handle(key) {
            InputResult::Continue => {}
            InputResult::Cancel => app.deck_input = None,
            InputResult::Submit => {
                if let Some(input) = app.deck_input.take() {
                    app.create_deck(input.value());
                }
            }
        }
        return;
    }

    // Confirmation dialog takes priority
    if app.card_confirm_delete {
        match key.code {
            KeyCode::Char('y') => {
                app.delete_selected_card();
                app.card_confirm_delete = false;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                app.card_confirm_delete = false;
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('[') | KeyCode::Left | KeyCode::Char('h') => app.cycle_cards_deck(false),
        KeyCode::Char(']') | KeyCode::Right | KeyCode::Char('l') => app.cycle_cards_deck(true),
        KeyCode::Up | KeyCode::Char('k') => {
            app.card_selected = app.card_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !app.cards.is_empty() {
                app.card_selected = (app.card_selected + 1).min(app.cards.len() - 1);
            }
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            if !app.cards.is_empty() {
                app.card_confirm_delete = true;
            }
        }
        KeyCode::Char('n') => app.deck_input = Some(LineInput::new("")),
        KeyCode::Char('r') => {
            app.load_decks();
            app.load_cards();
        }
        _ => {}
    }
}

fn handle_generate_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();

    if let Some(input) = app.filter_input.as_mut() {
        match input.handle(key) {
            InputResult::Continue => {
                if let Some(input) = app.filter_input.as_ref() {
                    app.source_filter = input.value().to_string();
                    app.source_selected = 0;
                }
            }
            InputResult::Cancel | InputResult::Submit => app.filter_input = None,
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            if app.chunk_expanded.is_some() {
                app.chunk_panel.set_open(false, now);
            } else {
                app.go_to_menu();
            }
        }
        KeyCode::Tab => {
            app.gen_pane = match app.gen_pane {
                GeneratePane::Sources => GeneratePane::Chunks,
                GeneratePane::Chunks => GeneratePane::Candidates,
                GeneratePane::Candidates => GeneratePane::Sources,
            };
        }
        KeyCode::Char('/') if app.gen_pane == GeneratePane::Sources => {
            app.filter_input = Some(LineInput::new(&app.source_filter));
        }
        KeyCode::Char('[') => app.cycle_gen_deck(false),
        KeyCode::Char(']') => app.cycle_gen_deck(true),
        KeyCode::Char('g') => app.generate_candidates(),
        KeyCode::Up | KeyCode::Char('k') => match app.gen_pane {
            GeneratePane::Sources => app.source_selected = app.source_selected.saturating_sub(1),
            GeneratePane::Chunks => app.chunk_selected = app.chunk_selected.saturating_sub(1),
            GeneratePane::Candidates => {
                app.candidate_selected = app.candidate_selected.saturating_sub(1);
            }
        },
        KeyCode::Down | KeyCode::Char('j') => match app.gen_pane {
            GeneratePane::Sources => {
                let len = app.filtered_sources().len();
                if len > 0 {
                    app.source_selected = (app.source_selected + 1).min(len - 1);
                }
            }
            GeneratePane::Chunks => {
                if !app.chunks.is_empty() {
                    app.chunk_selected = (app.chunk_selected + 1).min(app.chunks.len() - 1);
                }
            }
            GeneratePane::Candidates => {
                if !app.candidates.is_empty() {
                    app.candidate_selected =
                        (app.candidate_selected + 1).min(app.candidates.len() - 1);
                }
            }
        },
        KeyCode::Enter => match app.gen_pane {
            GeneratePane::Sources => app.open_selected_source(),
            GeneratePane::Chunks => app.toggle_chunk_expand(now),
            GeneratePane::Candidates => app.toggle_candidate(),
        },
        KeyCode::Char(' ') => match app.gen_pane {
            GeneratePane::Chunks => app.toggle_chunk_mark(),
            GeneratePane::Candidates => app.toggle_candidate(),
            GeneratePane::Sources => {}
        },
        KeyCode::Char('e') if app.gen_pane == GeneratePane::Chunks => {
            app.toggle_chunk_expand(now);
        }
        KeyCode::Char('a') if app.gen_pane == GeneratePane::Chunks => app.mark_all_chunks(),
        KeyCode::Char('c') if app.gen_pane == GeneratePane::Chunks => app.clear_chunk_marks(),
        KeyCode::Char('s') if app.gen_pane == GeneratePane::Candidates => app.save_candidates(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if let Some(input) = app.server_input.as_mut() {
        match input.handle(key) {
            InputResult::Continue => {}
            InputResult::Cancel => app.server_input = None,
            InputResult::Submit => {
                if let Some(input) = app.server_input.take() {
                    app.apply_server_url(input.value());
                }
            }
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.save_settings();
            app.go_to_menu();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected < App::SETTINGS_FIELDS - 1 {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Review => render_review(frame, app),
        AppScreen::PracticeSetup => render_practice_setup(frame, app),
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::PracticeDone => render_practice_done(frame, app),
        AppScreen::Cards => render_cards(frame, app),
        AppScreen::Generate => render_generate(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, text: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " studywire ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            text.to_string(),
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &str, warn: bool) {
    let colors = &app.theme.colors;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let hint_fg = if warn {
        colors.warning()
    } else {
        colors.text_dim()
    };
    let hint_line = Paragraph::new(Line::from(Span::styled(
        format!(" {hints}"),
        Style::default().fg(hint_fg),
    )));
    frame.render_widget(hint_line, rows[0]);

    if let Some(status) = &app.status {
        let fg = if status.error {
            colors.error()
        } else {
            colors.success()
        };
        let status_line = Paragraph::new(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(fg),
        )));
        frame.render_widget(status_line, rows[1]);
    }
}

fn answer_state(panel: &ui::disclosure::Disclosure) -> &'static str {
    if panel.is_animating() {
        "..."
    } else if panel.is_open() {
        "shown"
    } else {
        "hidden"
    }
}

fn truncated(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    render_header(frame, app, layout[0], &format!(" {}", app.api.base_url()));

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    render_footer(frame, app, layout[2], "[1-4] Open  [c] Settings  [q] Quit", false);
}

fn render_review(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);
    let now = Instant::now();

    let due = app
        .review
        .due_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());
    render_header(
        frame,
        app,
        app_layout.header,
        &format!(" Review | Due: {due} | Reviewed: {}", app.review.reviewed),
    );

    if let Some(card) = &app.review.card {
        let panel = CardPanel {
            title: format!(" Deck {} · Card {} ", card.deck_id, card.card_id),
            front: &card.front,
            back: &card.back,
            back_mounted: app.review_panel.is_mounted(),
            back_extent: app.review_panel.extent(now),
            theme: app.theme,
        };
        frame.render_widget(panel, app_layout.main);

        if let Some(sidebar) = app_layout.sidebar {
            let mut lines = vec![
                Line::from(Span::styled(
                    "Schedule",
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("Due: {}", card.due)),
                Line::from(format!("Interval: {}d", card.interval)),
                Line::from(format!("Ease: {:.2}", card.ease_factor)),
                Line::from(format!("Reps: {}", card.repetitions)),
                Line::from(format!("Lapses: {}", card.lapses)),
                Line::from(""),
                Line::from(format!("Answer: {}", answer_state(&app.review_panel))),
            ];
            if let Some(outcome) = &app.review.last_outcome {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Last answer",
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!("Next due: {}", outcome.next_due)));
                lines.push(Line::from(format!("Interval: {}d", outcome.interval)));
                lines.push(Line::from(format!("Ease: {:.2}", outcome.ease_factor)));
            }
            let panel = Paragraph::new(lines)
                .style(Style::default().fg(colors.fg()))
                .block(
                    Block::bordered().border_style(Style::default().fg(colors.border())),
                );
            frame.render_widget(panel, sidebar);
        }
    } else {
        let message = if app.review.all_done() {
            "Nothing due right now. You are done for today."
        } else if app.review.due_count.is_some() {
            "Press Enter to start reviewing."
        } else {
            "Loading summary..."
        };
        let p = Paragraph::new(message)
            .style(Style::default().fg(colors.text_dim()))
            .wrap(Wrap { trim: false })
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
        frame.render_widget(p, app_layout.main);
    }

    let hints = if app.review.card.is_none() {
        "[Enter] Start  [Esc] Back"
    } else if app.review.revealed {
        if app.review_panel.desired_open() {
            "[1] Again  [2] Hard  [3] Good  [4] Easy  [Space] Hide  [Esc] Back"
        } else {
            "[1] Again  [2] Hard  [3] Good  [4] Easy  [Space] Show  [Esc] Back"
        }
    } else {
        "[Space] Show answer  [Esc] Back"
    };
    render_footer(frame, app, app_layout.footer, hints, false);
}

fn render_practice_setup(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);

    render_header(frame, app, app_layout.header, " Practice setup");

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(app_layout.main);

    let rows: Vec<ListRow> = app
        .decks
        .iter()
        .map(|d| {
            let mut row = ListRow::new(d.name.clone());
            if !d.description.is_empty() {
                row = row.detail(truncated(&d.description, 40));
            }
            row
        })
        .collect();
    let list = SelectList {
        title: " Deck ".to_string(),
        rows,
        selected: app.deck_selected,
        focused: true,
        theme: app.theme,
    };
    frame.render_widget(list, columns[0]);

    let limit = if app.setup_limit == 0 {
        "no limit".to_string()
    } else {
        app.setup_limit.to_string()
    };
    let lines = vec![
        Line::from(Span::styled(
            "Session",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Pool:    {}", app.setup_pool.label())),
        Line::from(format!("Limit:   {limit}")),
        Line::from(format!(
            "Shuffle: {}",
            if app.setup_shuffle { "yes" } else { "no" }
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Practice never changes your spaced repetition schedule.",
            Style::default().fg(colors.text_dim()),
        )),
    ];
    let panel = Paragraph::new(lines)
        .style(Style::default().fg(colors.fg()))
        .wrap(Wrap { trim: false })
        .block(Block::bordered().border_style(Style::default().fg(colors.border())));
    frame.render_widget(panel, columns[1]);

    render_footer(
        frame,
        app,
        app_layout.footer,
        "[Enter] Start  [p] Pool  [s] Shuffle  [+/-] Limit  [r] Reload  [Esc] Back",
        false,
    );
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);
    let now = Instant::now();

    let Some(queue) = &app.practice else {
        return;
    };

    let position = queue.seen_count() + 1;
    render_header(
        frame,
        app,
        app_layout.header,
        &format!(
            " Practice - {} | Card {} of {}",
            queue.deck_name(),
            position.min(queue.total()),
            queue.total()
        ),
    );

    let show_progress = app_layout.tier.show_progress_bar(area.height);
    let mut constraints: Vec<Constraint> = vec![Constraint::Min(5)];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    if let Some(card) = queue.current() {
        let panel = CardPanel {
            title: format!(" Card {} ", card.id),
            front: &card.front,
            back: &card.back,
            back_mounted: app.practice_panel.is_mounted(),
            back_extent: app.practice_panel.extent(now),
            theme: app.theme,
        };
        frame.render_widget(panel, main_layout[0]);
    }

    if show_progress {
        let bar = ProgressBar::new("Session", queue.seen_count(), queue.total(), app.theme);
        frame.render_widget(bar, main_layout[1]);
    }

    if let Some(sidebar) = app_layout.sidebar {
        let lines = vec![
            Line::from(Span::styled(
                "Session",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Deck: {}", queue.deck_name())),
            Line::from(format!("Pool: {}", app.setup_pool.label())),
            Line::from(""),
            Line::from(format!("Seen: {}", queue.seen_count())),
            Line::from(format!("Remaining: {}", queue.remaining())),
            Line::from(""),
            Line::from(format!("Answer: {}", answer_state(&app.practice_panel))),
        ];
        let panel = Paragraph::new(lines)
            .style(Style::default().fg(colors.fg()))
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
        frame.render_widget(panel, sidebar);
    }

    let hints = if queue.revealed() {
        "[1] Again  [2] Hard  [3] Good  [4] Easy  [u] Undo  [Esc] End"
    } else {
        "[Space] Show answer  [u] Undo  [Esc] End"
    };
    render_footer(frame, app, app_layout.footer, hints, false);
}

fn render_practice_done(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(queue) = &app.practice else {
        return;
    };

    let centered = ui::layout::centered_rect(50, 40, area);
    let seen = queue.seen_count();
    let plural = if seen == 1 { "" } else { "s" };
    let lines = vec![
        Line::from(Span::styled(
            "Practice finished",
            Style::default()
                .fg(colors.success())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "You went through {seen} card{plural} in {}.",
            queue.deck_name()
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Back  [u] Undo last grade",
            Style::default().fg(colors.text_dim()),
        )),
    ];
    let panel = Paragraph::new(lines)
        .style(Style::default().fg(colors.fg()))
        .wrap(Wrap { trim: false })
        .block(Block::bordered().border_style(Style::default().fg(colors.border())));
    frame.render_widget(panel, centered);
}

fn render_cards(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);

    let deck_name = app
        .decks
        .get(app.deck_selected)
        .map(|d| d.name.as_str())
        .unwrap_or("(no deck)");
    render_header(
        frame,
        app,
        app_layout.header,
        &format!(" Cards | Deck: {deck_name} ({})", app.cards.len()),
    );

    let rows: Vec<ListRow> = app
        .cards
        .iter()
        .map(|c| {
            ListRow::new(truncated(&c.front, 60)).detail(format!(
                "#{} · {} · {}",
                c.id,
                c.card_type,
                c.created_at.format("%Y-%m-%d")
            ))
        })
        .collect();
    let list = SelectList {
        title: format!(" {deck_name} "),
        rows,
        selected: app.card_selected,
        focused: app.deck_input.is_none(),
        theme: app.theme,
    };
    frame.render_widget(list, app_layout.main);

    if let Some(sidebar) = app_layout.sidebar {
        let mut lines = vec![Line::from(Span::styled(
            "Card",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))];
        if let Some(card) = app.cards.get(app.card_selected) {
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Front: {}", truncated(&card.front, 200))));
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Back: {}", truncated(&card.back, 200))));
            if !card.tags.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(format!("Tags: {}", card.tags.join(", "))));
            }
        }
        let panel = Paragraph::new(lines)
            .style(Style::default().fg(colors.fg()))
            .wrap(Wrap { trim: false })
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
        frame.render_widget(panel, sidebar);
    }

    if let Some(input) = &app.deck_input {
        render_input_popup(frame, app, " New deck name ", input);
    }

    let hints = if app.card_confirm_delete {
        "Delete selected card? [y] Yes  [n] No"
    } else {
        "[j/k] Select  [[/]] Deck  [x] Delete  [n] New deck  [r] Reload  [Esc] Back"
    };
    render_footer(frame, app, app_layout.footer, hints, app.card_confirm_delete);
}

fn render_generate(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let now = Instant::now();

    let deck_name = app
        .decks
        .get(app.gen_deck_selected)
        .map(|d| d.name.as_str())
        .unwrap_or("(no deck)");
    render_header(
        frame,
        app,
        app_layout.header,
        &format!(
            " Generate | Deck: {deck_name} | {} cards @ {:.1}",
            app.config.generate_cards, app.config.generate_temperature
        ),
    );

    // Sidebar space is folded into the panes on this screen.
    let main = match app_layout.sidebar {
        Some(sidebar) => Rect::new(
            app_layout.main.x,
            app_layout.main.y,
            app_layout.main.width + sidebar.width,
            app_layout.main.height,
        ),
        None => app_layout.main,
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main);

    let filter_note = if app.source_filter.is_empty() {
        String::new()
    } else {
        format!(" (filter: {})", app.source_filter)
    };
    let source_rows: Vec<ListRow> = app
        .filtered_sources()
        .iter()
        .map(|s| ListRow::new(truncated(&s.title, 30)).detail(truncated(&s.path, 30)))
        .collect();
    let sources = SelectList {
        title: format!(" Sources{filter_note} "),
        rows: source_rows,
        selected: app.source_selected,
        focused: app.gen_pane == GeneratePane::Sources,
        theme: app.theme,
    };
    frame.render_widget(sources, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);

    let chunk_rows: Vec<ListRow> = app
        .chunks
        .iter()
        .map(|c| {
            ListRow::new(format!("{} [{}]", c.loc, c.kind))
                .detail(truncated(&c.text, 48))
                .marked(app.chunk_marked.contains(&c.id))
        })
        .collect();
    let chunks = SelectList {
        title: format!(" Chunks ({} selected) ", app.chunk_marked.len()),
        rows: chunk_rows,
        selected: app.chunk_selected,
        focused: app.gen_pane == GeneratePane::Chunks,
        theme: app.theme,
    };
    frame.render_widget(chunks, right[0]);

    let candidate_rows: Vec<ListRow> = app
        .candidates
        .iter()
        .map(|(c, keep)| {
            ListRow::new(truncated(&c.front, 48))
                .detail(truncated(&c.back, 40))
                .marked(*keep)
        })
        .collect();
    let candidates = SelectList {
        title: " Generated cards ".to_string(),
        rows: candidate_rows,
        selected: app.candidate_selected,
        focused: app.gen_pane == GeneratePane::Candidates,
        theme: app.theme,
    };
    frame.render_widget(candidates, right[1]);

    // Animated popup with the full text of the expanded chunk.
    if let Some(chunk) = app.chunk_expanded.and_then(|i| app.chunks.get(i)) {
        if app.chunk_panel.is_mounted() {
            let extent = app.chunk_panel.extent(now);
            if extent > 0 {
                let popup = ui::layout::centered_rect(70, 60, area);
                let height = (extent + 2).min(popup.height);
                let popup = Rect::new(popup.x, popup.y, popup.width, height);
                frame.render_widget(Clear, popup);
                let panel = Paragraph::new(chunk.text.as_str())
                    .style(Style::default().fg(app.theme.colors.fg()).bg(app.theme.colors.bg()))
                    .wrap(Wrap { trim: false })
                    .block(
                        Block::bordered()
                            .title(format!(" {} [{}] ", chunk.loc, chunk.kind))
                            .border_style(
                                Style::default().fg(app.theme.colors.border_focused()),
                            ),
                    );
                frame.render_widget(panel, popup);
            }
        }
    }

    let hints = match app.gen_pane {
        GeneratePane::Sources => "[Enter] Open  [/] Filter  [Tab] Pane  [g] Generate  [Esc] Back",
        GeneratePane::Chunks => {
            "[Space] Select  [a] All  [c] Clear  [e] Expand  [g] Generate  [Tab] Pane  [Esc] Back"
        }
        GeneratePane::Candidates => {
            "[Space] Keep/drop  [[/]] Deck  [s] Save  [Tab] Pane  [Esc] Back"
        }
    };
    if let Some(input) = &app.filter_input {
        render_input_popup(frame, app, " Filter sources ", input);
    }
    render_footer(frame, app, app_layout.footer, hints, false);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    frame.render_widget(block, centered);

    let limit = if app.config.practice_limit == 0 {
        "no limit".to_string()
    } else {
        app.config.practice_limit.to_string()
    };
    let fields: Vec<(&str, String)> = vec![
        ("Server URL", app.config.server_url.clone()),
        ("Theme", app.config.theme.clone()),
        ("Practice pool", app.config.pool().label().to_string()),
        ("Practice limit", limit),
        (
            "Practice shuffle",
            if app.config.practice_shuffle { "on" } else { "off" }.to_string(),
        ),
        ("Reveal duration", format!("{} ms", app.config.reveal_ms)),
        ("Generated cards", app.config.generate_cards.to_string()),
        (
            "Temperature",
            format!("{:.1}", app.config.generate_temperature),
        ),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(header, layout[0]);

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            fields
                .iter()
                .map(|_| Constraint::Length(2))
                .collect::<Vec<_>>(),
        )
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.selection_fg()
        } else {
            colors.text_dim()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("     < {value} >"), value_style)),
        ];
        frame.render_widget(Paragraph::new(lines), field_layout[i]);
    }

    if let Some(input) = &app.server_input {
        render_input_popup(frame, app, " Server URL ", input);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [Enter/arrows] Change value",
        Style::default().fg(colors.accent()),
    )));
    frame.render_widget(footer, layout[3]);

    if let Some(status) = &app.status {
        let fg = if status.error {
            colors.error()
        } else {
            colors.success()
        };
        let status_line = Paragraph::new(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(fg),
        )));
        frame.render_widget(status_line, layout[2]);
    }
}

/// Single-line editing popup with a styled cursor cell.
fn render_input_popup(frame: &mut ratatui::Frame, app: &App, title: &str, input: &LineInput) {
    let colors = &app.theme.colors;
    let area = frame.area();

    let popup_area = ui::layout::centered_rect(50, 20, area);
    let popup_area = Rect::new(popup_area.x, popup_area.y, popup_area.width, 3);
    frame.render_widget(Clear, popup_area);

    let (before, cursor, after) = input.render_parts();
    let cursor_span = match cursor {
        Some(ch) => Span::styled(
            ch.to_string(),
            Style::default().fg(colors.bg()).bg(colors.fg()),
        ),
        None => Span::styled(" ", Style::default().bg(colors.fg())),
    };
    let line = Line::from(vec![
        Span::styled(before.to_string(), Style::default().fg(colors.fg())),
        cursor_span,
        Span::styled(after.to_string(), Style::default().fg(colors.fg())),
    ]);

    let panel = Paragraph::new(line)
        .style(Style::default().bg(colors.bg()))
        .block(
            Block::bordered()
                .title(title.to_string())
                .border_style(Style::default().fg(colors.border_focused())),
        );
    frame.render_widget(panel, popup_area);
}
