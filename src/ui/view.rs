//! Screen layout

use super::app::{App, Focus};
use crate::session::Session;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

fn focused(style: Style, on: bool) -> Style {
    if on {
        style.fg(Color::Black).bg(Color::Cyan)
    } else {
        style
    }
}

fn button(key: &'static str, label: &'static str, enabled: bool) -> Vec<Span<'static>> {
    let style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    vec![
        Span::styled(key, style.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}  ", label), style),
    ]
}

pub fn draw(frame: &mut Frame, app: &App, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Line::from(vec![
        Span::styled(
            format!("speakwave {}", crate::VERSION),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  backend: {}", app.backend)),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    draw_text(frame, app, chunks[1]);
    draw_voice_controls(frame, app, chunks[2]);
    frame.render_widget(app.panel.chart(), chunks[3]);

    let controls = session.controls();
    let mut spans = Vec::new();
    spans.extend(button("^P", "Play", controls.play));
    spans.extend(button("^S", "Save MP3", controls.save));
    spans.extend(button("^X", "Stop", controls.stop));
    spans.extend(button("^V", "Paste", true));
    spans.extend(button("^Q", "Quit", true));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[4]);

    let status = Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        Span::raw(session.status().to_string()),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[5]);

    if let Some(prompt) = &app.prompt {
        let area = centered(frame.area(), 60, 3);
        let block = Block::bordered().title("Save as MP3 (Enter to save, Esc to cancel)");
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(prompt.buffer()).block(block), area);
        let x = area.x + 1 + prompt.buffer().chars().count() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_text(frame: &mut Frame, app: &App, area: Rect) {
    let border = focused(Style::default(), app.focus() == Focus::Text && !app.is_prompting());
    let block = Block::bordered()
        .title("Text")
        .border_style(border);
    let inner = block.inner(area);
    app.text_width.set(inner.width);

    let layout = app.editor.wrapped(inner.width);
    let (row, col) = layout.cursor;
    let row = u16::try_from(row).unwrap_or(u16::MAX);
    let scroll = row.saturating_sub(inner.height.saturating_sub(1));
    let lines: Vec<Line> = layout.rows.into_iter().map(|r| Line::raw(r.text)).collect();
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);

    if app.focus() == Focus::Text && !app.is_prompting() {
        let x = inner.x + col.min(inner.width.saturating_sub(1));
        let y = inner.y + row - scroll;
        frame.set_cursor_position((x, y));
    }
}

fn draw_voice_controls(frame: &mut Frame, app: &App, area: Rect) {
    let voice = Span::styled(
        format!("Voice: < {} >", app.voice()),
        focused(Style::default(), app.focus() == Focus::Voice),
    );
    let speed = Span::styled(
        format!("Speed: {}%", app.speed()),
        focused(Style::default(), app.focus() == Focus::Speed),
    );
    let pitch = if app.pitch_enabled {
        Span::styled(
            format!("Pitch: {}%", app.pitch()),
            focused(Style::default(), app.focus() == Focus::Pitch),
        )
    } else {
        Span::styled(
            format!("Pitch: Not supported by {}", app.backend),
            Style::default().fg(Color::DarkGray),
        )
    };

    let line = Line::from(vec![voice, Span::raw("   "), speed, Span::raw("   "), pitch]);
    let block = Block::bordered().title("Voice (Tab to move, Left/Right to adjust)");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Rect of `width` percent and `height` rows centred in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    // u32 so wide terminals do not overflow; the result never exceeds area.width
    let w = (u32::from(area.width) * u32::from(width.min(100)) / 100) as u16;
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_in_normal_terminal() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered(area, 60, 3), Rect::new(20, 18, 60, 3));
    }

    #[test]
    fn test_centered_in_very_wide_terminal() {
        let area = Rect::new(0, 0, 2000, 50);
        let rect = centered(area, 60, 3);
        assert_eq!(rect.width, 1200);
        assert_eq!(rect.x, 400);

        let full = centered(Rect::new(0, 0, u16::MAX, 10), 100, 3);
        assert_eq!(full.width, u16::MAX);
        assert_eq!(full.x, 0);
    }

    #[test]
    fn test_centered_clamps_height() {
        let rect = centered(Rect::new(5, 5, 10, 2), 50, 3);
        assert_eq!(rect, Rect::new(7, 5, 5, 2));
    }
}
