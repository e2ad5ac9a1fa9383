// services/trip-dash/src/tui.rs
//
// Terminal render sink: the dashboard core writes into a shared view state,
// and the draw loop renders it with ratatui.
//

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ratatui::{
    prelude::*,
    widgets::*,
};

use crate::adapters::{ChartData, ChartId, Series};
use crate::health::BackendStatus;
use crate::notice::{Notice, NoticeLevel};
use crate::sink::{ChartHandle, PaginationView, RenderSink};
use crate::summary::{Kpis, TableRow, TABLE_HEADERS};

// Color palette: Yellow cab, White, Silver, Red
mod colors {
    use ratatui::style::Color;
    
    pub const CAB: Color = Color::Rgb(255, 193, 37);
    pub const DARK_CAB: Color = Color::Rgb(184, 134, 11);
    pub const WHITE: Color = Color::Rgb(253, 246, 227);
    pub const SILVER: Color = Color::Rgb(147, 161, 161);
    pub const RED: Color = Color::Rgb(220, 50, 47);
    pub const TEAL: Color = Color::Rgb(42, 161, 152);
    pub const BG_DARK: Color = Color::Rgb(0, 20, 30);
    pub const BG_PANEL: Color = Color::Rgb(7, 30, 41);
    pub const SUCCESS: Color = Color::Rgb(133, 153, 0);
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub demo: bool,
    pub api_url: String,
    pub clock: String,
    pub status: BackendStatus,
    pub charts: HashMap<ChartId, ChartData>,
    pub rows: Vec<TableRow>,
    pub kpis: Option<Kpis>,
    pub pagination: PaginationView,
    pub boroughs: Vec<String>,
    pub notice: Option<(NoticeLevel, String)>,
}

impl ViewState {
    pub fn new(demo: bool, api_url: &str) -> Self {
        Self {
            demo,
            api_url: api_url.to_string(),
            clock: "--:--:--".to_string(),
            status: BackendStatus::Unknown,
            charts: HashMap::new(),
            rows: Vec::new(),
            kpis: None,
            pagination: PaginationView::from(crate::controller::PageState::default()),
            boroughs: Vec::new(),
            notice: None,
        }
    }
}

pub type SharedView = Arc<RwLock<ViewState>>;

pub struct TuiSink {
    view: SharedView,
}

impl TuiSink {
    pub fn new(view: SharedView) -> Self {
        Self { view }
    }
    
    fn update(&self, f: impl FnOnce(&mut ViewState)) {
        let mut view = self.view.write().unwrap_or_else(|e| e.into_inner());
        f(&mut view);
    }
}

struct TuiChartHandle {
    id: ChartId,
    view: SharedView,
}

impl ChartHandle for TuiChartHandle {
    fn dispose(&mut self) {
        let mut view = self.view.write().unwrap_or_else(|e| e.into_inner());
        view.charts.remove(&self.id);
    }
}

impl RenderSink for TuiSink {
    fn draw_chart(&self, data: &ChartData) -> Box<dyn ChartHandle> {
        self.update(|v| {
            v.charts.insert(data.id(), data.clone());
        });
        Box::new(TuiChartHandle {
            id: data.id(),
            view: self.view.clone(),
        })
    }
    
    fn update_table(&self, rows: &[TableRow]) {
        self.update(|v| v.rows = rows.to_vec());
    }
    
    fn update_kpis(&self, kpis: &Kpis) {
        self.update(|v| v.kpis = Some(kpis.clone()));
    }
    
    fn update_pagination(&self, view: PaginationView) {
        self.update(|v| v.pagination = view);
    }
    
    fn update_status(&self, status: BackendStatus) {
        self.update(|v| v.status = status);
    }
    
    fn update_borough_options(&self, boroughs: &[String]) {
        self.update(|v| v.boroughs = boroughs.to_vec());
    }
    
    fn update_notice(&self, notice: Option<&Notice>) {
        self.update(|v| v.notice = notice.map(|n| (n.level, n.message.clone())));
    }
    
    fn update_clock(&self, now: &str) {
        self.update(|v| v.clock = now.to_string());
    }
}

pub fn draw(frame: &mut Frame, state: &ViewState) {
    let area = frame.area();
    
    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );
    
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(5),  // KPIs
            Constraint::Min(24),    // Charts
            Constraint::Min(10),    // Trips table
            Constraint::Length(3),  // Footer
        ])
        .split(area);
    
    draw_header(frame, chunks[0], state);
    draw_kpis(frame, chunks[1], state);
    draw_charts(frame, chunks[2], state);
    draw_table(frame, chunks[3], state);
    draw_footer(frame, chunks[4], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (mode_text, mode_color) = if state.demo {
        ("DEMO", colors::CAB)
    } else {
        ("LIVE", colors::SUCCESS)
    };
    
    let (status_text, status_color) = match state.status {
        BackendStatus::Unknown => ("[CHECKING]", colors::SILVER),
        BackendStatus::Reachable => ("[API ONLINE]", colors::SUCCESS),
        BackendStatus::Unreachable => ("[API OFFLINE]", colors::RED),
    };
    
    let title = Line::from(vec![
        Span::styled(
            " NYC TAXI TRIPS ",
            Style::default().fg(colors::BG_DARK).bg(colors::CAB).bold(),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", mode_text), Style::default().fg(mode_color).bold()),
        Span::raw("  "),
        Span::styled(status_text, Style::default().fg(status_color).bold()),
        Span::raw("  "),
        Span::styled(&state.api_url, Style::default().fg(colors::SILVER)),
        Span::raw("  "),
        Span::styled(&state.clock, Style::default().fg(colors::WHITE)),
    ]);
    
    let header = Paragraph::new(title)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors::DARK_CAB))
                .style(Style::default().bg(colors::BG_DARK)),
        );
    
    frame.render_widget(header, area);
}

fn draw_kpis(frame: &mut Frame, area: Rect, state: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);
    
    let (total, fare, distance, speed, peak) = match &state.kpis {
        Some(k) => (
            k.total_trips.as_str(),
            k.avg_fare.as_str(),
            k.avg_distance.as_str(),
            k.avg_speed.as_str(),
            k.peak_hour.as_str(),
        ),
        None => ("...", "...", "...", "...", "..."),
    };
    
    draw_stat_box(frame, chunks[0], "TOTAL TRIPS", total, colors::WHITE);
    draw_stat_box(frame, chunks[1], "AVG FARE (PAGE)", fare, colors::CAB);
    draw_stat_box(frame, chunks[2], "AVG DISTANCE (PAGE)", distance, colors::TEAL);
    draw_stat_box(frame, chunks[3], "AVG SPEED (PAGE)", speed, colors::TEAL);
    draw_stat_box(frame, chunks[4], "PEAK HOUR", peak, colors::SUCCESS);
}

fn draw_stat_box(frame: &mut Frame, area: Rect, label: &str, value: &str, value_color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));
    
    let inner = block.inner(area);
    frame.render_widget(block, area);
    
    let text = vec![
        Line::from(Span::styled(
            label,
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            value,
            Style::default().fg(value_color).add_modifier(Modifier::BOLD),
        )),
    ];
    
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn draw_charts(frame: &mut Frame, area: Rect, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    
    for (row, ids) in rows.iter().zip([
        [ChartId::HourlyDemand, ChartId::RevenueByBorough],
        [ChartId::FarePerDistance, ChartId::TopZones],
    ]) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        for (cell, id) in cells.iter().zip(ids) {
            draw_chart(frame, *cell, id, state.charts.get(&id));
        }
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            format!(" {} ", title.to_uppercase()),
            Style::default().fg(colors::WHITE).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL))
}

/// Cab yellow scaled by a 0..1 intensity
fn shade(intensity: f64) -> Color {
    let i = intensity.clamp(0.0, 1.0);
    Color::Rgb((255.0 * i) as u8, (193.0 * i) as u8, (37.0 * i) as u8)
}

fn bars(series: &Series, intensity: Option<&[f64]>, scale: f64, format: fn(f64) -> String) -> Vec<Bar<'static>> {
    series
        .labels
        .iter()
        .zip(&series.values)
        .enumerate()
        .map(|(i, (label, value))| {
            let color = intensity
                .and_then(|s| s.get(i))
                .map(|&v| shade(v))
                .unwrap_or(colors::CAB);
            Bar::default()
                .label(Line::from(label.clone()))
                .value((value.max(0.0) * scale).round() as u64)
                .text_value(format(*value))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(colors::BG_DARK).bg(color))
        })
        .collect()
}

fn draw_chart(frame: &mut Frame, area: Rect, id: ChartId, data: Option<&ChartData>) {
    let block = panel(id.title());
    
    let Some(data) = data else {
        let waiting = Paragraph::new(Span::styled("loading...", Style::default().fg(colors::SILVER)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(waiting, area);
        return;
    };
    
    let chart = match data {
        ChartData::HourlyDemand { series, intensity, .. } => BarChart::default()
            .data(BarGroup::default().bars(&bars(series, Some(intensity.as_slice()), 1.0, compact)))
            .bar_width(3)
            .bar_gap(1),
        ChartData::RevenueByBorough { series } => BarChart::default()
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars(series, None, 1.0, dollars)))
            .bar_width(1)
            .bar_gap(0),
        ChartData::FarePerDistance { avg_fare, avg_fare_per_mile } => {
            let mut chart = BarChart::default().bar_width(5).bar_gap(0).group_gap(2);
            let fares = bars(avg_fare, None, 100.0, dollars_cents);
            let per_mile = bars(avg_fare_per_mile, None, 100.0, dollars_cents);
            for (i, label) in avg_fare.labels.iter().enumerate() {
                let (Some(fare), Some(mile)) = (fares.get(i), per_mile.get(i)) else {
                    continue;
                };
                let pair = [
                    fare.clone().label(Line::from("fare")),
                    mile.clone()
                        .label(Line::from("/mi"))
                        .style(Style::default().fg(colors::TEAL))
                        .value_style(Style::default().fg(colors::BG_DARK).bg(colors::TEAL)),
                ];
                chart = chart.data(BarGroup::default().label(Line::from(label.clone())).bars(&pair));
            }
            chart
        }
        ChartData::TopZones { series, intensity, .. } => BarChart::default()
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars(series, Some(intensity.as_slice()), 1.0, dollars)))
            .bar_width(1)
            .bar_gap(0),
    };
    
    frame.render_widget(chart.block(block), area);
}

fn compact(v: f64) -> String {
    if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.0}K", v / 1_000.0)
    } else {
        format!("{:.0}", v)
    }
}

fn dollars(v: f64) -> String {
    format!("${}", compact(v))
}

fn dollars_cents(v: f64) -> String {
    format!("${:.2}", v)
}

fn draw_table(frame: &mut Frame, area: Rect, state: &ViewState) {
    let page = state.pagination;
    let scope = state
        .kpis
        .as_ref()
        .map(|k| format!(" | {}", k.scope_note))
        .unwrap_or_default();
    let title = format!(" TRIPS  page {}/{}{} ", page.current_page, page.total_pages, scope);
    
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(colors::WHITE).bold()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));
    
    let rows: Vec<Row> = state
        .rows
        .iter()
        .map(|r| {
            Row::new(r.cells.iter().map(|c| Cell::from(c.as_str())))
                .style(Style::default().fg(colors::WHITE))
        })
        .collect();
    
    let widths = [
        Constraint::Length(19),
        Constraint::Length(19),
        Constraint::Min(16),
        Constraint::Min(16),
        Constraint::Length(13),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(3),
    ];
    
    let table = Table::new(rows, widths)
        .header(
            Row::new(TABLE_HEADERS.iter().map(|h| {
                Cell::from(Span::styled(*h, Style::default().fg(colors::CAB).bold()))
            }))
            .bottom_margin(1),
        )
        .block(block);
    
    frame.render_widget(table, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &ViewState) {
    let page = state.pagination;
    let key_style = |enabled: bool, bg: Color| {
        if enabled {
            Style::default().fg(colors::BG_DARK).bg(bg)
        } else {
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM)
        }
    };
    
    let line = match &state.notice {
        Some((level, message)) => {
            let color = match level {
                NoticeLevel::Error => colors::RED,
                NoticeLevel::Warning => colors::CAB,
            };
            Line::from(vec![
                Span::styled(" ! ", Style::default().fg(colors::BG_DARK).bg(color).bold()),
                Span::raw(" "),
                Span::styled(message.as_str(), Style::default().fg(color)),
            ])
        }
        None => Line::from(vec![
            Span::styled(" [Q] ", Style::default().fg(colors::BG_DARK).bg(colors::RED)),
            Span::styled(" Quit ", Style::default().fg(colors::SILVER)),
            Span::raw("  "),
            Span::styled(" [<-] ", key_style(page.previous_enabled, colors::WHITE)),
            Span::styled(" Prev ", Style::default().fg(colors::SILVER)),
            Span::raw("  "),
            Span::styled(" [->] ", key_style(page.next_enabled, colors::WHITE)),
            Span::styled(" Next ", Style::default().fg(colors::SILVER)),
            Span::raw("  "),
            Span::styled(" [A] ", Style::default().fg(colors::BG_DARK).bg(colors::CAB)),
            Span::styled(" Apply filters ", Style::default().fg(colors::SILVER)),
            Span::raw("  "),
            Span::styled(" [R] ", Style::default().fg(colors::BG_DARK).bg(colors::SILVER)),
            Span::styled(" Reset ", Style::default().fg(colors::SILVER)),
            Span::raw("  "),
            Span::styled(
                format!("Boroughs: {}", state.boroughs.join(", ")),
                Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
            ),
        ]),
    };
    
    let footer = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::DARK_CAB))
                .style(Style::default().bg(colors::BG_DARK)),
        );
    
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChartSlots;
    use ratatui::backend::TestBackend;
    
    fn sink() -> (TuiSink, SharedView) {
        let view = Arc::new(RwLock::new(ViewState::new(true, "http://demo.local")));
        (TuiSink::new(view.clone()), view)
    }
    
    #[test]
    fn test_dispose_removes_chart_from_view() {
        let (sink, view) = sink();
        let slots = ChartSlots::new();
        let data = ChartData::RevenueByBorough {
            series: Series { labels: vec!["Manhattan".into()], values: vec![10.0] },
        };
        
        slots.redraw(&sink, &data);
        assert!(view.read().unwrap().charts.contains_key(&ChartId::RevenueByBorough));
        
        slots.dispose_all();
        assert!(view.read().unwrap().charts.is_empty());
    }
    
    #[test]
    fn test_redraw_keeps_latest_chart() {
        let (sink, view) = sink();
        let slots = ChartSlots::new();
        let first = ChartData::RevenueByBorough {
            series: Series { labels: vec!["Bronx".into()], values: vec![1.0] },
        };
        let second = ChartData::RevenueByBorough {
            series: Series { labels: vec!["Queens".into()], values: vec![2.0] },
        };
        
        slots.redraw(&sink, &first);
        slots.redraw(&sink, &second);
        assert_eq!(view.read().unwrap().charts.get(&ChartId::RevenueByBorough), Some(&second));
    }
    
    #[test]
    fn test_draw_renders_without_data() {
        let (_, view) = sink();
        let mut terminal = Terminal::new(TestBackend::new(160, 60)).unwrap();
        terminal.draw(|frame| draw(frame, &view.read().unwrap())).unwrap();
    }
    
    #[test]
    fn test_compact_numbers() {
        assert_eq!(compact(950.0), "950");
        assert_eq!(compact(12_345.0), "12K");
        assert_eq!(compact(2_500_000.0), "2.5M");
    }
}
