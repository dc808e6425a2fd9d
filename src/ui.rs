//! Terminal front end: the selection form and the result pane.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Wrap,
};
use ratatui::Frame;

use crate::app::App;
use crate::types::{ChartPoint, RequestOutcome};

const COMPANY_PLACEHOLDER: &str = "Select a company";
const DATE_HINT: &str = "(preferably before 01-01-2020)";
const ABOUT: &str = "This project uses a state of the art model to predict stocks of \
companies listed on NASDAQ, NSE and the Fortune 500\n\n\
The model used is an LSTM with peephole connections that efficiently analyses \
relationships in time series and provides predictions on a weekly, monthly and \
yearly basis.\n\n\
Uses the python wrapper for the Yfinance API to obtain real-time OHCV data on \
1000+ stocks.\n\n\
Disclaimer: Do not under any circumstances, take advice from this model.";

// ---------- Form state & key handling ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Company,
    Date,
}

impl Focus {
    fn toggled(self) -> Self {
        match self {
            Focus::Company => Focus::Date,
            Focus::Date => Focus::Company,
        }
    }
}

/// Which field has the keyboard and which company row is highlighted.
/// Row 0 is the placeholder; rows 1..=n are the configured tickers.
#[derive(Debug, Clone, Copy)]
pub struct FormState {
    pub focus: Focus,
    pub company_row: usize,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            focus: Focus::Company,
            company_row: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Submit,
    Quit,
}

/// Translate one key press into form edits on `app`, possibly yielding
/// an action for the event loop. `q` only quits outside the date field,
/// where it would otherwise be typed text.
pub fn handle_key(key: KeyEvent, form: &mut FormState, app: &mut App) -> Option<UiAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiAction::Quit);
    }
    match key.code {
        KeyCode::Esc => return Some(UiAction::Quit),
        KeyCode::Enter => return Some(UiAction::Submit),
        KeyCode::Tab | KeyCode::BackTab => {
            form.focus = form.focus.toggled();
            return None;
        }
        _ => {}
    }
    match form.focus {
        Focus::Company => match key.code {
            KeyCode::Up => move_company(form, app, -1),
            KeyCode::Down => move_company(form, app, 1),
            KeyCode::Char('q') => return Some(UiAction::Quit),
            _ => {}
        },
        Focus::Date => match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut date = app.selection().date.clone();
                date.push(c);
                app.set_date(&date);
            }
            KeyCode::Backspace => {
                let mut date = app.selection().date.clone();
                date.pop();
                app.set_date(&date);
            }
            _ => {}
        },
    }
    None
}

fn move_company(form: &mut FormState, app: &mut App, delta: i32) {
    let max = app.companies().len() as i32;
    form.company_row = (form.company_row as i32 + delta).clamp(0, max) as usize;
    if form.company_row == 0 {
        app.set_company("");
    } else {
        let ticker = app.companies()[form.company_row - 1].clone();
        app.set_company(&ticker);
    }
}

// ---------- Rendering projection ----------

/// What the result pane shows for a given outcome.
#[derive(Debug, PartialEq)]
pub enum ResultView<'a> {
    Empty,
    Loading,
    Error(&'a str),
    Chart(&'a [ChartPoint]),
}

pub fn result_view(outcome: &RequestOutcome) -> ResultView<'_> {
    match outcome {
        RequestOutcome::Idle => ResultView::Empty,
        RequestOutcome::Pending => ResultView::Loading,
        RequestOutcome::Failure(msg) => ResultView::Error(msg),
        RequestOutcome::Success(points) if points.is_empty() => ResultView::Empty,
        RequestOutcome::Success(points) => ResultView::Chart(points),
    }
}

// ---------- Rendering ----------

pub fn render(frame: &mut Frame, form: &FormState, app: &App) {
    let [left, right] =
        Layout::horizontal([Constraint::Length(38), Constraint::Min(30)]).areas(frame.area());
    render_form(frame, left, form, app);
    render_result(frame, right, app);
}

fn render_form(frame: &mut Frame, area: Rect, form: &FormState, app: &App) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title("Stock Analysis Tool");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let list_height = app.companies().len() as u16 + 3;
    let [company_area, date_area, hint_area, about_area, help_area] = Layout::vertical([
        Constraint::Length(list_height),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(inner);

    let focused = form.focus == Focus::Company;
    let mut items: Vec<ListItem> = Vec::with_capacity(app.companies().len() + 1);
    items.push(ListItem::new(COMPANY_PLACEHOLDER).style(Style::default().add_modifier(Modifier::DIM)));
    items.extend(app.companies().iter().map(|c| ListItem::new(c.clone())));
    let list = List::new(items)
        .block(titled_block("Select a Company", focused))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(form.company_row));
    frame.render_stateful_widget(list, company_area, &mut list_state);

    let focused = form.focus == Focus::Date;
    let mut date_text = app.selection().date.clone();
    if focused {
        date_text.push('_');
    }
    let date = Paragraph::new(date_text).block(titled_block("Select a Date", focused));
    frame.render_widget(date, date_area);
    frame.render_widget(
        Paragraph::new(DATE_HINT).style(Style::default().add_modifier(Modifier::DIM)),
        hint_area,
    );

    frame.render_widget(
        Paragraph::new(ABOUT)
            .style(Style::default().add_modifier(Modifier::DIM))
            .wrap(Wrap { trim: true }),
        about_area,
    );

    frame.render_widget(
        Paragraph::new("Enter: Analyze  Tab: move  Esc: quit")
            .style(Style::default().add_modifier(Modifier::BOLD)),
        help_area,
    );
}

fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Stock Price Graph");
    match result_view(app.outcome()) {
        ResultView::Empty => frame.render_widget(block, area),
        ResultView::Loading => {
            let loading = Paragraph::new("Loading...")
                .block(block)
                .style(Style::default().add_modifier(Modifier::BOLD));
            frame.render_widget(loading, area);
        }
        ResultView::Error(msg) => {
            let error = Paragraph::new(msg)
                .block(block)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error, area);
        }
        ResultView::Chart(points) => render_chart(frame, area, block, points),
    }
}

fn render_chart(frame: &mut Frame, area: Rect, block: Block<'_>, points: &[ChartPoint]) {
    let data: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.price as f64))
        .collect();

    let max_x = points.len().saturating_sub(1).max(1) as f64;
    let (min_y, max_y) = price_bounds(points);

    let x_labels: Vec<String> = if points.len() >= 3 {
        vec![
            points[0].date.clone(),
            points[points.len() / 2].date.clone(),
            points[points.len() - 1].date.clone(),
        ]
    } else {
        points.iter().map(|p| p.date.clone()).collect()
    };
    let y_labels = vec![
        format!("{min_y:.0}"),
        format!("{:.0}", (min_y + max_y) / 2.0),
        format!("{max_y:.0}"),
    ];

    let datasets = vec![Dataset::default()
        .name("price")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data)];
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([min_y, max_y])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

/// Y bounds padded a little past the series so the line never hugs the
/// frame; a flat series still gets a visible band.
fn price_bounds(points: &[ChartPoint]) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for p in points {
        min = min.min(p.price as f64);
        max = max.max(p.price as f64);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}

fn titled_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border)
}
