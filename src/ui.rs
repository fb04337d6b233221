use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color as TuiColor, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::{app::App, clock::TimeSource, engine::Phase, palette::Color};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const PAD_HEIGHT: u16 = 5;

fn tint(color: Color) -> TuiColor {
    match color {
        Color::Red => TuiColor::Red,
        Color::Green => TuiColor::Green,
        Color::Blue => TuiColor::Blue,
        Color::Yellow => TuiColor::Yellow,
    }
}

fn footer_text(phase: Phase, palette: &[Color]) -> String {
    match phase {
        Phase::Idle => "(enter) start round | (n)ew session | (esc)ape".to_string(),
        Phase::Showing => "watch the sequence...".to_string(),
        Phase::AwaitingInput => {
            let keys = palette
                .iter()
                .enumerate()
                .map(|(idx, c)| format!("{}/{}", c.key(), idx + 1))
                .join(" ");
            format!("repeat with {keys}")
        }
        Phase::RoundEnding => String::new(),
        Phase::Finished => "(n)ew session | (esc)ape".to_string(),
    }
}

impl<S: TimeSource> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let board = self.board();
        let palette = self.engine.config().palette();
        let phase = self.phase();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3),          // title
                Constraint::Length(1),          // status
                Constraint::Length(1),          // padding
                Constraint::Length(1),          // prompt
                Constraint::Length(1),          // padding
                Constraint::Length(PAD_HEIGHT), // pads
                Constraint::Length(1),          // countdown
                Constraint::Min(0),
                Constraint::Length(1), // key help
            ])
            .split(area);

        Paragraph::new("colorlock")
            .block(Block::default().borders(Borders::ALL))
            .style(bold_style.fg(TuiColor::Cyan))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Span::styled(board.status(), dim_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        let prompt_style = if phase == Phase::Finished {
            bold_style.fg(TuiColor::Yellow)
        } else {
            bold_style
        };
        Paragraph::new(Span::styled(board.prompt(), prompt_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        if !palette.is_empty() {
            let pads = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(
                    palette
                        .iter()
                        .map(|_| Constraint::Ratio(1, palette.len() as u32))
                        .collect::<Vec<_>>(),
                )
                .split(chunks[5]);

            for (idx, (color, pad)) in palette.iter().zip(pads.iter()).enumerate() {
                let style = if board.is_lit(*color) {
                    bold_style.bg(tint(*color)).fg(TuiColor::Black)
                } else {
                    dim_style.fg(tint(*color))
                };
                Paragraph::new(format!("\n[{}] {} ({})", color.key(), color, idx + 1))
                    .block(Block::default().borders(Borders::ALL).border_style(style))
                    .style(style)
                    .alignment(Alignment::Center)
                    .render(*pad, buf);
            }
        }

        if let Some(ratio) = board.countdown_ratio() {
            let secs_left = ratio * self.engine.state().time_limit().as_secs_f64();
            Gauge::default()
                .gauge_style(Style::default().fg(TuiColor::Magenta))
                .ratio(ratio)
                .label(format!("{secs_left:.1}s"))
                .render(chunks[6], buf);
        }

        Paragraph::new(footer_text(phase, palette))
            .style(Style::default().fg(TuiColor::Gray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center)
            .render(chunks[8], buf);
    }
}
