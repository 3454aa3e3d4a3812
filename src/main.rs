use std::io;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, Paragraph, Row, Table, TableState,
};

use t20_predictor::config::{self, AppConfig};
use t20_predictor::leaderboard::{Leaderboard, winner_banner};
use t20_predictor::live_feed::format_match_date;
use t20_predictor::live_provider::spawn_live_provider;
use t20_predictor::logging;
use t20_predictor::model::LogisticPipeline;
use t20_predictor::predictor::{Momentum, Predictor, StrategyTip};
use t20_predictor::state::{
    AppState, Delta, FormField, LeaderboardView, LiveView, PredictionView, ProviderCommand, Screen,
    apply_delta, match_summary_lines, screen_label, win_chance_lines,
};

struct App {
    state: AppState,
    config: AppConfig,
    predictor: Option<Predictor>,
    model_error: Option<String>,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(
        config: AppConfig,
        model: anyhow::Result<LogisticPipeline>,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ) -> Self {
        let mut state = AppState::new();
        let (predictor, model_error) = match model {
            Ok(model) => {
                state.push_log(format!(
                    "[INFO] Model loaded: {} ({})",
                    model.name,
                    model.version.as_deref().unwrap_or("unversioned")
                ));
                (Some(Predictor::new(Arc::new(model))), None)
            }
            Err(err) => {
                let msg = format!("{err:#}");
                state.push_log(format!("[ERROR] Model unavailable: {msg}"));
                state.prediction = PredictionView::ModelUnavailable(msg.clone());
                (None, Some(msg))
            }
        };
        Self {
            state,
            config,
            predictor,
            model_error,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('p') | KeyCode::Char('P') => self.state.screen = Screen::Predictor,
            KeyCode::Char('f') | KeyCode::Char('F') => self.open_final_result(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => match self.state.screen {
                Screen::Predictor => self.on_predictor_key(key),
                Screen::FinalResult => self.on_final_result_key(key),
            },
        }
    }

    fn on_predictor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Left => self.state.form.adjust(-1),
            KeyCode::Char('l') | KeyCode::Right => self.state.form.adjust(1),
            KeyCode::PageUp => self.state.form.adjust(10),
            KeyCode::PageDown => self.state.form.adjust(-10),
            KeyCode::Backspace => self.state.form.backspace(),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(d) = c.to_digit(10) {
                    self.state.form.push_digit(d);
                }
            }
            KeyCode::Enter => self.predict(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_live(),
            KeyCode::Char(']') => self.state.scroll_live_down(),
            KeyCode::Char('[') => self.state.scroll_live_up(),
            _ => {}
        }
    }

    fn on_final_result_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.open_final_result(),
            _ => {}
        }
    }

    fn predict(&mut self) {
        let input = self.state.form.to_match_state();
        let Some(predictor) = &self.predictor else {
            let msg = self
                .model_error
                .clone()
                .unwrap_or_else(|| "no model loaded".to_string());
            self.state.push_log("[WARN] Prediction skipped: model unavailable");
            self.state.prediction = PredictionView::ModelUnavailable(msg);
            return;
        };
        let outcome = predictor.predict(&input);
        self.state.record_prediction(input, outcome);
    }

    fn open_final_result(&mut self) {
        self.state.screen = Screen::FinalResult;
        match Leaderboard::load(&self.config.leaderboard_path) {
            Ok(board) => {
                self.state.push_log(format!(
                    "[INFO] Loaded {} teams from {}",
                    board.entries.len(),
                    self.config.leaderboard_path.display()
                ));
                self.state.set_leaderboard(board);
            }
            Err(err) => {
                self.state
                    .push_log(format!("[WARN] Final results unavailable: {err}"));
                self.state.leaderboard =
                    LeaderboardView::Failed(format!("Could not load final results: {err}"));
            }
        }
    }

    fn request_live(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Live fetch unavailable");
            return;
        };
        if tx.send(ProviderCommand::RefreshLive).is_err() {
            self.state.push_log("[WARN] Live refresh request failed");
        } else {
            self.state.push_log("[INFO] Live refresh requested");
        }
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let cfg = AppConfig::from_env();
    if let Some(path) = &cfg.log_file {
        if let Err(err) = logging::init_file(path) {
            eprintln!("warning: {err:#}");
        }
    }

    let model = LogisticPipeline::load(&cfg.model_path);
    if let Err(err) = &model {
        tracing::error!(error = %format!("{err:#}"), "model artifact failed to load");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_live_provider(cfg.live.clone(), tx, cmd_rx);

    let mut app = App::new(cfg, model, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Predictor => render_predictor(frame, chunks[1], &app.state),
        Screen::FinalResult => render_final_result(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let model = match &app.predictor {
        Some(p) => format!("Model: {} {}", p.model_name(), p.model_version()),
        None => "Model: unavailable".to_string(),
    };
    let line1 = format!(
        "   o   T20 WORLD CUP PREDICTOR | {} | {}",
        screen_label(app.state.screen),
        model
    );
    let line2 = "  /|".to_string();
    let line3 = " / |".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Predictor => {
            "j/k/↑/↓ Field | h/l/←/→ Change | 0-9 Type | Enter Predict | r Live refresh | [/] Scroll live | f Final | ? Help | q Quit".to_string()
        }
        Screen::FinalResult => {
            "p Predictor | j/k/↑/↓ Move | r Reload | ? Help | q Quit".to_string()
        }
    }
}

fn render_predictor(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Length(5),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(30)])
        .split(rows[0]);

    render_form(frame, top[0], state);
    render_prediction(frame, top[1], state);
    render_live(frame, rows[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let form = &state.form;
    let fields = [
        FormField::BattingTeam,
        FormField::BowlingTeam,
        FormField::Venue,
        FormField::Target,
        FormField::Score,
        FormField::Wickets,
        FormField::Overs,
    ];

    let mut lines = Vec::with_capacity(fields.len() * 2 + 2);
    for field in fields {
        let focused = field == form.focus;
        let marker = if focused { "> " } else { "  " };
        let value = if focused && !field.is_numeric() {
            format!("< {} >", form.field_value(field))
        } else {
            form.field_value(field)
        };
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(
                format!("{:<16}", field.label()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, value_style),
        ]));
        if field == FormField::Overs {
            lines.push(Line::from(Span::styled(
                format!("  {:<16}{}", "", overs_slider(form.overs)),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "  Enter: Predict Win Probability",
        Style::default().fg(Color::Green),
    )));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Match State").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn overs_slider(overs: u8) -> String {
    let filled = overs as usize;
    let total = t20_predictor::match_state::MAX_OVERS as usize;
    format!(
        "[{}{}]",
        "=".repeat(filled),
        "-".repeat(total.saturating_sub(filled))
    )
}

fn render_prediction(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Prediction Result").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let (input, prediction) = match &state.prediction {
        PredictionView::Ready { input, prediction } => (input, prediction),
        PredictionView::Idle => {
            let hint = Paragraph::new("Set the match state and press Enter")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(hint, inner);
            return;
        }
        PredictionView::Failed(msg) => {
            let err = Paragraph::new(format!("Prediction failed: {msg}"))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(err, inner);
            return;
        }
        PredictionView::ModelUnavailable(msg) => {
            let err = Paragraph::new(format!("Model unavailable: {msg}"))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(err, inner);
            return;
        }
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(7),
            Constraint::Length(2),
        ])
        .split(inner);

    let [batting_line, bowling_line] = win_chance_lines(input, prediction);
    let chances = Paragraph::new(vec![
        Line::from(Span::styled(batting_line, Style::default().fg(Color::Green))),
        Line::from(Span::styled(bowling_line, Style::default().fg(Color::Yellow))),
    ]);
    frame.render_widget(chances, sections[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .ratio(f64::from(prediction.win_pct) / 100.0)
        .label(format!("{}%", prediction.win_pct));
    frame.render_widget(gauge, sections[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(20)])
        .split(sections[2]);

    frame.render_widget(
        run_rate_chart(
            prediction.stats.current_run_rate,
            prediction.stats.required_run_rate,
        ),
        middle[0],
    );

    let summary = Paragraph::new(match_summary_lines(input, prediction).join("\n"))
        .block(Block::default().title("Match Summary").borders(Borders::ALL));
    frame.render_widget(summary, middle[1]);

    let momentum = prediction.classification.momentum;
    let tip = prediction.classification.strategy_tip;
    let advice = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Momentum: {}", momentum.message()),
            Style::default().fg(momentum_color(momentum)),
        )),
        Line::from(Span::styled(
            format!("Strategy: {}", tip.message()),
            Style::default().fg(strategy_color(tip)),
        )),
    ]);
    frame.render_widget(advice, sections[3]);
}

fn run_rate_chart(crr: f64, rrr: f64) -> BarChart<'static> {
    // Bars are integers; scale by 100 and print the real rate as the label.
    let scaled = |rate: f64| (rate.max(0.0) * 100.0).round() as u64;
    let crr_bar = Bar::default()
        .label("CRR".into())
        .value(scaled(crr))
        .text_value(format!("{crr:.2}"))
        .style(Style::default().fg(Color::Green));
    let rrr_bar = Bar::default()
        .label("RRR".into())
        .value(scaled(rrr))
        .text_value(format!("{rrr:.2}"))
        .style(Style::default().fg(Color::Red));

    BarChart::default()
        .block(Block::default().title("CRR vs RRR").borders(Borders::ALL))
        .data(BarGroup::default().bars(&[crr_bar, rrr_bar]))
        .bar_width(6)
        .bar_gap(2)
}

fn momentum_color(momentum: Momentum) -> Color {
    match momentum {
        Momentum::BattingDominant => Color::Blue,
        Momentum::BowlingDominant => Color::Red,
        Momentum::EvenlyPoised => Color::Yellow,
    }
}

fn strategy_color(tip: StrategyTip) -> Color {
    match tip {
        StrategyTip::PaceCalmly => Color::Green,
        StrategyTip::TargetWeakBowling | StrategyTip::CautionWicketsPrecious => Color::Yellow,
    }
}

fn render_live(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Live Matches").borders(Borders::ALL);
    let paragraph = match &state.live {
        LiveView::Loading => Paragraph::new("Fetching live matches...")
            .style(Style::default().fg(Color::DarkGray)),
        LiveView::Failed(msg) => Paragraph::new(msg.clone()).style(Style::default().fg(Color::Red)),
        LiveView::Loaded(feed) if feed.matches.is_empty() && feed.record_errors.is_empty() => {
            Paragraph::new("No live matches at the moment.")
        }
        LiveView::Loaded(feed) => {
            let mut lines = Vec::new();
            for m in &feed.matches {
                lines.push(Line::from(vec![
                    Span::styled(m.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("  {} vs {}", m.team_a, m.team_b)),
                ]));
                lines.push(Line::from(Span::styled(
                    format!(
                        "  Venue: {} | Date: {} | Status: {}",
                        m.venue,
                        format_match_date(&m.date),
                        m.status
                    ),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for bad in &feed.record_errors {
                lines.push(Line::from(Span::styled(
                    format!("Could not display match due to: {}", bad.reason),
                    Style::default().fg(Color::Yellow),
                )));
            }
            Paragraph::new(lines).scroll((state.live_scroll.saturating_mul(2), 0))
        }
    };
    frame.render_widget(paragraph.block(block), area);
}

fn render_final_result(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(5),
        ])
        .split(area);

    let title = "Final World Cup Winner Prediction (Combined Model)";
    match &state.leaderboard {
        LeaderboardView::NotLoaded => {
            let p = Paragraph::new("Loading final results...")
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(p, rows[0]);
        }
        LeaderboardView::Failed(msg) => {
            let p = Paragraph::new(msg.clone())
                .style(Style::default().fg(Color::Red))
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(p, rows[0]);
        }
        LeaderboardView::Loaded(board) => {
            let banner = board
                .predicted_winner()
                .map(winner_banner)
                .unwrap_or_else(|| "No predicted winner".to_string());
            let p = Paragraph::new(banner)
                .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(p, rows[0]);
            render_leaderboard_table(frame, rows[1], board, state.leaderboard_selected);
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn render_leaderboard_table(frame: &mut Frame, area: Rect, board: &Leaderboard, selected: usize) {
    let rows: Vec<Row> = board
        .numbered()
        .map(|(pos, entry)| {
            let win = if entry.win_percent.is_nan() {
                "-".to_string()
            } else {
                format!("{:.2}", entry.win_percent)
            };
            Row::new(vec![pos.to_string(), entry.team.clone(), win])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(vec!["#", "Team", "Win %"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray))
    .block(Block::default().title("Results").borders(Borders::ALL));

    let mut table_state = TableState::default().with_selected(Some(selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "T20 World Cup Predictor - Help",
        "",
        "Global:",
        "  p            Match-wise predictor",
        "  f            Final prediction result",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Predictor:",
        "  j/k or ↑/↓   Move between fields",
        "  h/l or ←/→   Change team/venue, nudge numbers",
        "  PgUp/PgDn    Nudge numbers by 10",
        "  0-9, Bksp    Type numbers",
        "  Enter        Predict win probability",
        "  r            Refresh live matches",
        "",
        "Final result:",
        "  j/k or ↑/↓   Move",
        "  r            Reload results file",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
