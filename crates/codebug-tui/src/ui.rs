//! Drawing.
//!
//! The editor pane paints the overlay's markup (never the raw text) clipped at the overlay's
//! scroll offset, and places the terminal cursor from the editable layer.

use crate::app::App;
use codebug_editor::{
    MarkupLine, Presentation, ScrollOffset, UiState, Viewport, display_width, escape_html,
    parse_markup, present, submit_label,
};
use codebug_editor_highlight_simple::{
    TOKEN_BOOLEAN, TOKEN_BUILTIN, TOKEN_CLASS_NAME, TOKEN_COMMENT, TOKEN_DECORATOR,
    TOKEN_FUNCTION, TOKEN_KEYWORD, TOKEN_NULL, TOKEN_NUMBER, TOKEN_OPERATOR, TOKEN_PROPERTY,
    TOKEN_PUNCTUATION, TOKEN_STRING,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_segmentation::UnicodeSegmentation;

pub fn render(app: &mut App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[0]);

    // Inner size, without borders.
    let editor_area = panes[0];
    app.set_viewport(Viewport::new(
        editor_area.width.saturating_sub(2) as usize,
        editor_area.height.saturating_sub(2) as usize,
    ));

    render_editor(app, frame, editor_area);
    render_result(app, frame, panes[1]);
    render_status_line(app, frame, chunks[1]);
    render_shortcuts(app, frame, chunks[2]);
}

fn render_editor(app: &App, frame: &mut Frame, area: Rect) {
    let editor = app.editor();
    let overlay = editor.overlay();
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    let lines = visible_lines(
        &parse_markup(&overlay.rendered().markup),
        overlay.scroll_offset(),
        inner_width,
        inner_height,
    );
    let title = format!(" Code ({}) ", overlay.engine_name().unwrap_or("plain"));
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );

    // The cursor belongs to the editable layer.
    let cursor = editor.surface().cursor_position();
    let scroll = editor.scroll_offset();
    if cursor.line < scroll.top
        || cursor.line >= scroll.top + inner_height
        || cursor.column < scroll.left
        || cursor.column >= scroll.left + inner_width
    {
        return;
    }
    let x = area.x + 1 + (cursor.column - scroll.left) as u16;
    let y = area.y + 1 + (cursor.line - scroll.top) as u16;
    frame.set_cursor_position((x, y));
}

fn render_result(app: &App, frame: &mut Frame, area: Rect) {
    let presentation = present(app.state());
    let markup = match (&presentation, app.result_highlighter()) {
        (Presentation::Success { body } | Presentation::Failure { body }, Some(highlighter)) => {
            highlighter.render(body)
        }
        _ => escape_html(presentation.text()),
    };

    let (title, border) = match presentation {
        Presentation::Empty { .. } => (" Result ", Style::default()),
        Presentation::Busy { .. } => (" Result ", Style::default().fg(Color::Yellow)),
        Presentation::Success { .. } => (" Result ", Style::default().fg(Color::Green)),
        Presentation::Failure { .. } => (" Result (error) ", Style::default().fg(Color::Red)),
    };

    let lines = visible_lines(
        &parse_markup(&markup),
        ScrollOffset::new(app.result_scroll(), 0),
        area.width.saturating_sub(2) as usize,
        area.height.saturating_sub(2) as usize,
    );
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        ),
        area,
    );
}

fn render_status_line(app: &App, frame: &mut Frame, area: Rect) {
    let status_text = if app.status_message().is_empty() {
        let editor = app.editor();
        let cursor = editor.surface().cursor_position();
        let state = match app.state() {
            UiState::Idle => "idle",
            UiState::Pending { .. } => "analyzing",
            UiState::Resolved { .. } => "done",
        };
        format!(
            "Ln {}, Col {} | {} lines | v{} | {} | {}",
            cursor.line + 1,
            cursor.column + 1,
            editor.text().line_count(),
            editor.surface().version(),
            state,
            app.endpoint()
        )
    } else {
        app.status_message().to_string()
    };

    frame.render_widget(
        Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        area,
    );
}

fn render_shortcuts(app: &App, frame: &mut Frame, area: Rect) {
    let submit = format!("Ctrl-R/F5:{}", submit_label(app.state()));
    let submit_style = if app.can_submit() {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default().bg(Color::Blue).fg(Color::Gray).add_modifier(Modifier::DIM)
    };

    let line = Line::from(vec![
        Span::styled(submit, submit_style),
        Span::raw("  Ctrl-L:Clear  Ctrl-Q:Quit  Alt-Up/Down:Scroll result"),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Blue).fg(Color::White)),
        area,
    );
}

/// Cut the `height` x `width` window at `offset` out of parsed markup.
pub fn visible_lines(
    lines: &[MarkupLine],
    offset: ScrollOffset,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    lines
        .iter()
        .skip(offset.top)
        .take(height)
        .map(|line| clip_line(line, offset.left, width))
        .collect()
}

/// Columns `left..left + width` of one line. A wide character cut by the left edge leaves
/// blank cells; one cut by the right edge is dropped.
fn clip_line(line: &MarkupLine, left: usize, width: usize) -> Line<'static> {
    let right = left + width;
    let mut x = 0;
    let mut spans = Vec::new();

    'spans: for span in line {
        let mut text = String::new();
        for grapheme in span.text.graphemes(true) {
            let cell_width = display_width(grapheme);
            if cell_width == 0 {
                continue;
            }
            if x + cell_width > right {
                if !text.is_empty() {
                    spans.push(Span::styled(text, style_for_classes(&span.classes)));
                }
                break 'spans;
            }
            if x >= left {
                if grapheme == "\t" {
                    text.push(' ');
                } else {
                    text.push_str(grapheme);
                }
            } else if x + cell_width > left {
                text.push_str(&" ".repeat(x + cell_width - left));
            }
            x += cell_width;
        }
        if !text.is_empty() {
            spans.push(Span::styled(text, style_for_classes(&span.classes)));
        }
    }

    Line::from(spans)
}

/// Terminal style for a span's token classes. Later classes win.
pub fn style_for_classes(classes: &[String]) -> Style {
    let mut fg = None::<Color>;
    let mut mods = Modifier::empty();

    for class in classes {
        match class.as_str() {
            TOKEN_COMMENT => {
                fg = Some(Color::DarkGray);
                mods |= Modifier::ITALIC;
            }
            TOKEN_STRING => fg = Some(Color::Green),
            TOKEN_NUMBER => fg = Some(Color::Yellow),
            TOKEN_KEYWORD => fg = Some(Color::LightBlue),
            TOKEN_BOOLEAN | TOKEN_NULL => fg = Some(Color::Magenta),
            TOKEN_BUILTIN => fg = Some(Color::Cyan),
            TOKEN_FUNCTION => {
                fg = Some(Color::Cyan);
                mods |= Modifier::BOLD;
            }
            TOKEN_CLASS_NAME => {
                fg = Some(Color::LightCyan);
                mods |= Modifier::BOLD;
            }
            TOKEN_DECORATOR => fg = Some(Color::LightMagenta),
            TOKEN_OPERATOR => fg = Some(Color::LightRed),
            TOKEN_PUNCTUATION => fg = Some(Color::DarkGray),
            TOKEN_PROPERTY => fg = Some(Color::Blue),
            _ => {}
        }
    }

    let mut style = Style::default().fg(fg.unwrap_or(Color::White));
    if !mods.is_empty() {
        style = style.add_modifier(mods);
    }
    style
}
