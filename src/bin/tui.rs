mod tui_app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Sparkline, Table, TableState},
    Frame, Terminal,
};
use tui_app::{
    format_money, format_opt_days, format_opt_money, format_pct, truncate, AppState,
    ConnectionStatus,
};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build HTTP client");

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut sku_table_state = TableState::default();
    sku_table_state.select(None);

    let result = run_loop(&mut terminal, &mut app, &client, &mut sku_table_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    sku_state: &mut TableState,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(2);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, sku_state))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            let max = app.skus.len().saturating_sub(1);
                            let next = sku_state.selected().map_or(0, |i| (i + 1).min(max));
                            sku_state.select(Some(next));
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            let prev = sku_state.selected().map_or(0, |i| i.saturating_sub(1));
                            sku_state.select(Some(prev));
                        }
                        KeyCode::Enter => {
                            if let Some(sku) = sku_state
                                .selected()
                                .and_then(|i| app.skus.get(i))
                                .map(|s| s.sku.clone())
                            {
                                app.select_sku(client, &sku).await;
                            }
                        }
                        KeyCode::Esc => app.clear_selection(),
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, sku_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, sku_state, chunks[1]);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let skus = app.health.skus.map_or("—".to_string(), |n| n.to_string());
    let rows = app.health.rows.map_or("—".to_string(), |n| n.to_string());

    let title_spans = vec![
        Span::styled(
            " SKU Pricing Advisor  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(format!("{skus} SKUs"), Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(format!("{rows} rows"), Style::default().fg(Color::White)),
    ];

    let header_line = Line::from(title_spans);
    let paragraph = Paragraph::new(header_line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, sku_state: &mut TableState, area: Rect) {
    // Horizontal split: SKU list (40%) | detail (60%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_sku_table(f, app, sku_state, halves[0]);
    render_detail(f, app, halves[1]);
}

fn render_sku_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["#", "SKU", "Risk", "Now", "Rec"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .skus
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let risk = s.risk_level.as_deref().unwrap_or("—");
            let risk_color = risk_color(risk);

            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&s.sku, 18)),
                Cell::from(risk.to_string()).style(Style::default().fg(risk_color)),
                Cell::from(format_opt_money(s.current_price)),
                Cell::from(format_opt_money(s.recommended_price))
                    .style(Style::default().fg(Color::Cyan)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " CATALOG ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, area, state);
}

fn render_detail(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(detail) = &app.detail else {
        let hint = Paragraph::new("select a SKU and press Enter").block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    " RECOMMENDATION ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );
        f.render_widget(hint, area);
        return;
    };

    // Vertical split: KPI block | rationale | sales sparkline
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(4),
            Constraint::Length(5),
        ])
        .split(area);

    let kpi_lines = vec![
        kpi_line("Current Price", format_money(detail.current_price)),
        kpi_line("Days of Supply", format_opt_days(detail.days_of_supply)),
        kpi_line("Current Margin", format_pct(detail.current_margin)),
        kpi_line(
            "Total Cost",
            format!(
                "{}   (min {} / target {})",
                format_money(detail.total_cost),
                format_pct(detail.min_margin),
                format_pct(detail.target_margin),
            ),
        ),
        Line::from(vec![
            Span::styled("  Recommended   ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_money(detail.recommended_price),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  margin {}  risk ", format_pct(detail.recommended_margin)),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                detail.risk_level.clone(),
                Style::default()
                    .fg(risk_color(&detail.risk_level))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let kpis = Paragraph::new(kpi_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                format!(" {} @ {} ", detail.sku, detail.as_of),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(kpis, chunks[0]);

    let rationale_lines: Vec<Line> = detail
        .rationale
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled("  • ", Style::default().fg(Color::Yellow)),
                Span::raw(r.clone()),
            ])
        })
        .collect();
    let rationale = Paragraph::new(rationale_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " RATIONALE ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(rationale, chunks[1]);

    let series = app.sales_series();
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    format!(" UNITS ORDERED · last {} days ", series.len()),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        )
        .data(series.iter().copied())
        .style(Style::default().fg(Color::Green));
    f.render_widget(sparkline, chunks[2]);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll  "),
        Span::styled("[enter] ", Style::default().fg(Color::Yellow)),
        Span::raw("detail  "),
        Span::styled("[esc] ", Style::default().fg(Color::Yellow)),
        Span::raw("back  "),
        Span::styled("auto-refresh: 2s", Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn kpi_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {label:<14} "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn risk_color(risk: &str) -> Color {
    match risk {
        "LOW" => Color::Green,
        "MEDIUM" => Color::Yellow,
        "HIGH" => Color::Red,
        _ => Color::DarkGray,
    }
}
