use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::config::display_defaults;
use crate::display::engine::{Chrome, DisplayView, PromoSlide, RotationEngine};
use crate::display::layout::{self, LayoutParams};
use crate::types::{BannerSettings, FontSize, MediaItem, RateSnapshot};

/// Nominal pixel width of one terminal cell, used to classify the viewport.
pub const CELL_WIDTH_PX: u32 = 10;

/// Nominal pixel height of one terminal row, used to size the banner.
const CELL_HEIGHT_PX: i64 = 40;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn render(f: &mut Frame, engine: &RotationEngine) {
    let area = f.area();
    let settings = engine.settings();
    let banner_height = engine.banner().map_or(display_defaults::BANNER_HEIGHT_PX, |b| b.banner_height);
    let params = layout::derive(
        u32::from(area.width) * CELL_WIDTH_PX,
        settings.orientation,
        settings.rate_number_font_size,
        banner_height,
    );

    let base = Style::default()
        .fg(parse_hex_color(&settings.text_color).unwrap_or(Color::Black))
        .bg(parse_hex_color(&settings.background_color).unwrap_or(Color::Reset));
    f.render_widget(Block::default().style(base), area);

    match engine.view() {
        DisplayView::AwaitingData => render_notice(
            f,
            area,
            vec![
                Line::from(Span::styled("Waiting for today's rates…", Style::default().add_modifier(Modifier::BOLD))),
                Line::from(engine.clock().format("%d %b %Y  %H:%M:%S").to_string()),
            ],
        ),
        DisplayView::FetchFailed(message) => render_notice(
            f,
            area,
            vec![
                Line::from(Span::styled(
                    "Unable to load rates",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(message.to_string()),
            ],
        ),
        DisplayView::Rates { rates, chrome } => {
            let body = render_chrome(f, area, &chrome, &params);
            render_rates(f, rates, &params, body);
        }
        DisplayView::Media { item, index, chrome } => {
            let body = render_chrome(f, area, &chrome, &params);
            render_media(f, item, index, body);
        }
    }
}

/// Draw header, promo strip, banner and footer; return the area left for the body.
fn render_chrome(f: &mut Frame, area: Rect, chrome: &Chrome<'_>, params: &LayoutParams) -> Rect {
    let banner_rows = chrome.banner.map_or(0, |_| banner_rows(params.banner_height));
    let promo_rows = if chrome.promo.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),           // header
            Constraint::Min(0),              // body
            Constraint::Length(promo_rows),  // promo strip
            Constraint::Length(banner_rows), // banner
            Constraint::Length(1),           // footer
        ])
        .split(area);

    render_header(f, chrome, chunks[0]);
    if let Some(slide) = chrome.promo {
        render_promo(f, &slide, chunks[2]);
    }
    if let Some(banner) = chrome.banner {
        render_banner(f, banner, chunks[3]);
    }
    render_footer(f, chrome.settings.refresh_interval, chunks[4]);
    chunks[1]
}

fn render_header(f: &mut Frame, chrome: &Chrome<'_>, area: Rect) {
    let block = Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);

    let title = Paragraph::new(Line::from(Span::styled(
        " Today's Gold & Silver Rates",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    let clock = Paragraph::new(chrome.clock.format("%d %b %Y  %H:%M:%S ").to_string()).alignment(Alignment::Right);

    f.render_widget(title, halves[0]);
    f.render_widget(clock, halves[1]);
}

fn render_rates(f: &mut Frame, rates: &RateSnapshot, params: &LayoutParams, area: Rect) {
    let direction = if params.columns == 1 { Direction::Vertical } else { Direction::Horizontal };
    let halves = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let gold = [
        ("Gold 24K (10g)", rates.gold_24k_sale, rates.gold_24k_purchase),
        ("Gold 22K (10g)", rates.gold_22k_sale, rates.gold_22k_purchase),
        ("Gold 18K (10g)", rates.gold_18k_sale, rates.gold_18k_purchase),
    ];
    let silver = [("Silver (1kg)", rates.silver_per_kg_sale, rates.silver_per_kg_purchase)];

    f.render_widget(rate_table(" GOLD ", &gold, params.font), halves[0]);
    f.render_widget(rate_table(" SILVER ", &silver, params.font), halves[1]);
}

fn rate_table<'a>(title: &'a str, rows: &[(&'a str, f64, f64)], font: FontSize) -> Table<'a> {
    let number_style = number_style(font);
    let header_cells = ["", "Sale", "Purchase"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let body: Vec<Row> = rows
        .iter()
        .map(|(label, sale, purchase)| {
            Row::new(vec![
                Cell::from(*label),
                Cell::from(format_price(*sale)).style(number_style),
                Cell::from(format_price(*purchase)).style(number_style),
            ])
            .height(row_height(font))
        })
        .collect();

    Table::new(body, [Constraint::Min(14), Constraint::Length(12), Constraint::Length(12)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(title, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        )
}

fn render_media(f: &mut Frame, item: &MediaItem, index: usize, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(item.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!("{} · {}s", item.media_type, item.duration_seconds)),
        Line::from(Span::styled(
            item.file_url.clone().unwrap_or_default(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                format!(" NOW SHOWING #{} ", index + 1),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(paragraph, area);
}

fn render_promo(f: &mut Frame, slide: &PromoSlide<'_>, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {}/{} ", slide.index + 1, slide.count),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(slide.item.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  [{}]", slide.effect), Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" OFFERS "),
    );
    f.render_widget(paragraph, area);
}

fn render_banner(f: &mut Frame, banner: &BannerSettings, area: Rect) {
    let url = banner.banner_image_url.clone().unwrap_or_default();
    let paragraph = Paragraph::new(Line::from(Span::styled(url, Style::default().fg(Color::DarkGray))))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, refresh_secs: i64, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled(format!("auto-refresh: {refresh_secs}s"), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_notice(f: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let rect = Rect { y: area.y + top, height: area.height.saturating_sub(top), ..area };
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `#RRGGBB` to an RGB color.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Whole rupees print without decimals.
pub fn format_price(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn number_style(font: FontSize) -> Style {
    let style = Style::default();
    match font.tier() {
        1..=3 => style,
        4 | 5 => style.add_modifier(Modifier::BOLD),
        _ => style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    }
}

fn row_height(font: FontSize) -> u16 {
    match font.tier() {
        1 | 2 => 1,
        3 | 4 => 2,
        _ => 3,
    }
}

fn banner_rows(height_px: i64) -> u16 {
    (height_px / CELL_HEIGHT_PX).clamp(1, 4) as u16 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    use crate::display::engine::PollBatch;
    use crate::display::scheduler::Scheduler;
    use crate::error::FetchError;
    use crate::types::{DisplaySettings, MediaType};

    fn engine() -> RotationEngine {
        let epoch = Utc.with_ymd_and_hms(2026, 10, 16, 4, 30, 0).unwrap();
        let mut e = RotationEngine::new(epoch, chrono_tz::Asia::Kolkata, Scheduler::new());
        e.advance_to(Duration::ZERO);
        e
    }

    fn snapshot() -> RateSnapshot {
        RateSnapshot {
            id: 1,
            gold_24k_sale: 74850.0,
            gold_24k_purchase: 74100.0,
            gold_22k_sale: 68600.0,
            gold_22k_purchase: 67900.0,
            gold_18k_sale: 56100.0,
            gold_18k_purchase: 55500.0,
            silver_per_kg_sale: 92000.0,
            silver_per_kg_purchase: 90500.0,
            is_active: true,
            created_date: Utc::now(),
        }
    }

    fn batch(rates: Result<Option<RateSnapshot>, FetchError>, media: Vec<MediaItem>) -> PollBatch {
        PollBatch {
            rates,
            settings: Ok(Some(DisplaySettings { rates_display_duration_seconds: 15, ..DisplaySettings::default() })),
            media: Ok(media),
            promos: Ok(vec![]),
            banner: Ok(None),
        }
    }

    fn draw(engine: &RotationEngine) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| render(f, engine)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn rates_view_shows_sale_price() {
        let mut e = engine();
        e.apply_poll(batch(Ok(Some(snapshot())), vec![]));
        let screen = draw(&e);
        assert!(screen.contains("74850"));
        assert!(screen.contains("GOLD"));
        assert!(screen.contains("10:00:00"));
    }

    #[test]
    fn awaiting_and_failed_states_render_notices() {
        let mut e = engine();
        assert!(draw(&e).contains("Waiting for today's rates"));

        e.apply_poll(batch(Err(FetchError::Status { status: 503, message: "backend offline".into() }), vec![]));
        let screen = draw(&e);
        assert!(screen.contains("Unable to load rates"));
        assert!(screen.contains("backend offline"));
    }

    #[test]
    fn media_view_names_the_item() {
        let mut e = engine();
        let item = MediaItem {
            id: 3,
            name: "Diwali collection".to_string(),
            file_url: Some("/api/media/3/file".to_string()),
            media_type: MediaType::Video,
            duration_seconds: 30,
            order_index: 1,
            is_active: true,
            file_size: Some(1),
            mime_type: Some("video/mp4".to_string()),
            created_date: Utc::now(),
        };
        e.apply_poll(batch(Ok(Some(snapshot())), vec![item]));
        e.advance_to(Duration::from_secs(15));

        let screen = draw(&e);
        assert!(screen.contains("Diwali collection"));
        assert!(screen.contains("NOW SHOWING"));
        assert!(!screen.contains("74850"));
    }

    #[test]
    fn hex_colors_parse_or_reject() {
        assert_eq!(parse_hex_color("#FFF8E1"), Some(Color::Rgb(0xFF, 0xF8, 0xE1)));
        assert_eq!(parse_hex_color("#212529"), Some(Color::Rgb(0x21, 0x25, 0x29)));
        assert_eq!(parse_hex_color("FFF8E1"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn prices_drop_zero_decimals() {
        assert_eq!(format_price(74850.0), "74850");
        assert_eq!(format_price(74850.5), "74850.50");
    }
}
