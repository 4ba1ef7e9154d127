//! Ratatui-based terminal dashboard.
//!
//! Three tabs: ICE detentions (with dataset/display/authority selectors),
//! Border Patrol encounters, and an About page. Charts are drawn with
//! Plotters; data errors land in the status bar instead of ending the session.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::pipeline::Dashboard;
use crate::chart::Chart;
use crate::domain::{Authority, ChartSelection, Dataset, Display};
use crate::error::AppError;
use crate::footnotes::footnote;

mod plotters_chart;

use plotters_chart::{ChartView, series_color};

const ABOUT: &str = "This dashboard visualizes key datasets related to immigration enforcement in the United States.\n\n\
ICE Detentions shows periodic snapshots of detainee populations held in ICE facilities, from TRAC Reports' \
\"ICE Detainees\" page (tracreports.org/immigration/detentionstats/pop_agen_table.html). You can explore how \
these numbers vary by arresting authority and criminality status.\n\n\
Border Patrol Encounters combines historic monthly data from DHS OHSS (ohss.dhs.gov/khsm/cbp-encounters) with \
fiscal-year-to-date data from CBP (cbp.gov/document/stats/southwest-land-border-encounters), restricted to the \
Southwest Land Border. Fiscal-year months are converted to calendar months before the two are merged.\n\n\
Vertical lines mark the start of each presidential administration.";

/// Start the TUI.
pub fn run(dashboard: Dashboard) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dashboard);
    app.refresh_chart();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Detentions,
    Encounters,
    About,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Detentions, Tab::Encounters, Tab::About];

    fn title(self) -> &'static str {
        match self {
            Tab::Detentions => "ICE Detentions",
            Tab::Encounters => "Border Patrol Encounters",
            Tab::About => "About",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }
}

/// Datasets offered on the detentions tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetentionDataset {
    ArrestingAuthority,
    Criminality,
}

impl DetentionDataset {
    const ALL: [DetentionDataset; 2] = [DetentionDataset::ArrestingAuthority, DetentionDataset::Criminality];

    fn dataset(self) -> Dataset {
        match self {
            DetentionDataset::ArrestingAuthority => Dataset::ArrestingAuthority,
            DetentionDataset::Criminality => Dataset::Criminality,
        }
    }
}

/// Selector state for the detentions tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selectors {
    dataset: DetentionDataset,
    display: Display,
    authority: Authority,
    selected_field: usize,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            dataset: DetentionDataset::ArrestingAuthority,
            display: Display::Count,
            authority: Authority::All,
            selected_field: 0,
        }
    }
}

impl Selectors {
    /// Authority only applies to Criminality, so it is hidden otherwise.
    fn field_count(&self) -> usize {
        if self.dataset == DetentionDataset::Criminality { 3 } else { 2 }
    }

    fn selection(&self) -> ChartSelection {
        match self.dataset {
            DetentionDataset::ArrestingAuthority => ChartSelection::ArrestingAuthority(self.display),
            DetentionDataset::Criminality => ChartSelection::Criminality(self.display, self.authority),
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let max = self.field_count() - 1;
        self.selected_field = if delta < 0 {
            self.selected_field.saturating_sub(1)
        } else {
            (self.selected_field + 1).min(max)
        };
    }

    fn adjust(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                self.dataset = cycle(&DetentionDataset::ALL, self.dataset, delta);
                self.selected_field = self.selected_field.min(self.field_count() - 1);
            }
            1 => self.display = cycle(&Display::ALL, self.display, delta),
            2 => self.authority = cycle(&Authority::ALL, self.authority, delta),
            _ => {}
        }
    }
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, delta: i32) -> T {
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let len = options.len();
    let next = if delta < 0 { (idx + len - 1) % len } else { (idx + 1) % len };
    options[next]
}

struct App {
    dashboard: Dashboard,
    tab: Tab,
    selectors: Selectors,
    chart: Option<Chart>,
    status: String,
}

impl App {
    fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            tab: Tab::Detentions,
            selectors: Selectors::default(),
            chart: None,
            status: "Loading...".to_string(),
        }
    }

    fn selection(&self) -> Option<ChartSelection> {
        match self.tab {
            Tab::Detentions => Some(self.selectors.selection()),
            Tab::Encounters => Some(ChartSelection::BorderPatrol),
            Tab::About => None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.tab = self.tab.next();
                self.refresh_chart();
            }
            KeyCode::Char('1') => self.switch_tab(Tab::Detentions),
            KeyCode::Char('2') => self.switch_tab(Tab::Encounters),
            KeyCode::Char('3') => self.switch_tab(Tab::About),
            KeyCode::Up if self.tab == Tab::Detentions => self.selectors.move_selection(-1),
            KeyCode::Down if self.tab == Tab::Detentions => self.selectors.move_selection(1),
            KeyCode::Left if self.tab == Tab::Detentions => {
                self.selectors.adjust(-1);
                self.refresh_chart();
            }
            KeyCode::Right if self.tab == Tab::Detentions => {
                self.selectors.adjust(1);
                self.refresh_chart();
            }
            KeyCode::Char('r') => {
                self.dashboard.invalidate();
                self.refresh_chart();
            }
            _ => {}
        }
        false
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.refresh_chart();
        }
    }

    fn refresh_chart(&mut self) {
        let Some(selection) = self.selection() else {
            self.chart = None;
            self.status = String::new();
            return;
        };

        match self.dashboard.chart(selection) {
            Ok(chart) => {
                let n = chart.series.first().map(|s| s.points.len()).unwrap_or(0);
                self.status = match chart.date_range() {
                    Some((lo, hi)) => format!("{n} points, {lo} .. {hi}"),
                    None => "No data.".to_string(),
                };
                self.chart = Some(chart);
            }
            Err(err) => {
                tracing::warn!(%err, ?selection, "chart refresh failed");
                self.chart = None;
                self.status = err.to_string();
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Detentions => self.draw_detentions(frame, chunks[1]),
            Tab::Encounters => self.draw_encounters(frame, chunks[1]),
            Tab::About => self.draw_about(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = Tab::ALL.iter().map(|t| Line::from(t.title())).collect();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("How Has U.S. Immigration Enforcement Changed?"),
            )
            .select(self.tab.index())
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_detentions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let note = footnote(self.selectors.selection().dataset());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(chunks[0]);

        self.draw_chart(frame, top[0]);
        self.draw_settings(frame, top[1]);

        let p = Paragraph::new(note)
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Notes"));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_encounters(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        self.draw_chart(frame, area);
    }

    fn draw_about(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let p = Paragraph::new(about_text(&self.dashboard))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("About"));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self.chart.as_ref().map(|c| c.title.as_str()).unwrap_or("Chart");
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(chart) = &self.chart else {
            let msg = Paragraph::new("No chart available.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);

        match ChartView::new(chart) {
            Some(view) => frame.render_widget(view, chunks[0]),
            None => frame.render_widget(Paragraph::new("No data."), chunks[0]),
        }
        frame.render_widget(Paragraph::new(legend(chart)), chunks[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let s = &self.selectors;
        let mut items = vec![
            ListItem::new(format!("Dataset: {}", s.dataset.dataset().label())),
            ListItem::new(format!("Display: {}", s.display.label())),
        ];
        if s.dataset == DetentionDataset::Criminality {
            items.push(ListItem::new(format!("Authority: {}", s.authority.label())));
        }

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(s.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.tab {
            Tab::Detentions => "Tab/1-3 switch  ↑/↓ select  ←/→ change  r refresh  q quit",
            Tab::Encounters | Tab::About => "Tab/1-3 switch  r refresh  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Static description followed by the sources this session reads.
fn about_text(dashboard: &Dashboard) -> String {
    let config = dashboard.config();
    format!(
        "{ABOUT}\n\nSources in use:\n\
Detentions feed: {}\n\
Historic extract: {} (sheet \"{}\", region \"{}\")\n\
Year-to-date extract: {} ({}, {})",
        dashboard.detentions_url(),
        config.historic_path.display(),
        config.historic_sheet,
        config.region,
        config.ytd_path.display(),
        config.ytd_fiscal_year,
        config.ytd_component,
    )
}

/// Colored series names, then the administration markers in view.
fn legend(chart: &Chart) -> Text<'static> {
    let mut spans = Vec::new();
    if !chart.legend_title.is_empty() && chart.series.len() > 1 {
        spans.push(Span::raw(format!("{}: ", chart.legend_title)));
    }
    for (idx, s) in chart.series.iter().enumerate() {
        spans.push(Span::styled(format!("━ {}  ", s.name), Style::default().fg(series_color(idx))));
    }

    let markers: Vec<String> = chart
        .visible_markers()
        .iter()
        .filter(|m| !m.president.is_empty())
        .map(|m| format!("│ {} ({})", m.president, m.start))
        .collect();

    Text::from(vec![
        Line::from(spans),
        Line::from(Span::styled(markers.join("  "), Style::default().fg(Color::DarkGray))),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_selector_only_for_criminality() {
        let mut s = Selectors::default();
        assert_eq!(s.field_count(), 2);
        s.adjust(1);
        assert_eq!(s.dataset, DetentionDataset::Criminality);
        assert_eq!(s.field_count(), 3);

        s.move_selection(1);
        s.move_selection(1);
        s.move_selection(1);
        assert_eq!(s.selected_field, 2);
        s.adjust(1);
        assert_eq!(s.selection(), ChartSelection::Criminality(Display::Count, Authority::Ice));
    }

    #[test]
    fn switching_back_clamps_selected_field() {
        let mut s = Selectors {
            dataset: DetentionDataset::Criminality,
            selected_field: 0,
            ..Selectors::default()
        };
        s.adjust(-1);
        assert_eq!(s.dataset, DetentionDataset::ArrestingAuthority);
        assert_eq!(s.selection(), ChartSelection::ArrestingAuthority(Display::Count));
    }

    #[test]
    fn every_detention_dataset_maps_to_its_own_selection() {
        for dataset in DetentionDataset::ALL {
            let s = Selectors { dataset, ..Selectors::default() };
            assert_eq!(s.selection().dataset(), dataset.dataset());
            assert_ne!(s.selection().dataset(), Dataset::BorderPatrol);
        }
    }

    #[test]
    fn about_lists_configured_sources() {
        let dashboard = Dashboard::new(crate::config::Config::default()).unwrap();
        let text = about_text(&dashboard);
        assert!(text.contains(crate::config::DEFAULT_DETENTIONS_URL));
        assert!(text.contains("sheet \"Monthly Region\""));
        assert!(text.contains("2025 (FYTD)"));
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(&Display::ALL, Display::Percent, 1), Display::Count);
        assert_eq!(cycle(&Authority::ALL, Authority::All, -1), Authority::Cbp);
    }

    #[test]
    fn tabs_rotate() {
        assert_eq!(Tab::Detentions.next(), Tab::Encounters);
        assert_eq!(Tab::About.next(), Tab::Detentions);
    }
}
