use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::Input;

/// How tall a single text field is, borders included
pub const HEIGHT: u16 = 3;

/// How a text field should look
pub struct FieldView<'a> {
    /// Shown in the top border
    pub label: &'a str,

    /// Show stars instead of the value
    pub masked: bool,

    /// Whether the cursor is here
    pub active: bool,

    /// Validation problem, shown in the bottom border
    pub error: Option<&'a str>,
}

/// Draw a text field, placing the cursor in it if it's active.
#[expect(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame<'_>, area: Rect, input: &Input, view: &FieldView<'_>) {
    let width = area.width.saturating_sub(2 + 1); // -2 for the border, -1 for the cursor
    let scroll = input.visual_scroll(width as usize);

    let value = if view.masked {
        "*".repeat(input.value().chars().count())
    } else {
        input.value().to_owned()
    };

    let border_style = match (view.error, view.active) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Blue),
        (None, false) => Style::default().fg(Color::DarkGray),
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(view.label)
        .border_style(border_style);

    if let Some(error) = view.error {
        block = block.title_bottom(Line::from(error).red());
    }

    frame.render_widget(
        Paragraph::new(value)
            .scroll((0, scroll as u16))
            .block(block),
        area,
    );

    if view.active {
        frame.set_cursor_position((
            area.x
                + (input.visual_cursor().max(scroll) - scroll) as u16 // current end of text
                + 1, // just past the end of the text
            area.y + 1, // +1 row for the border/title
        ));
    }
}

/// Center a box of the given height in `area`, half as wide.
pub fn centered(area: Rect, height: u16) -> Rect {
    let vert = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horiz = Layout::horizontal([Constraint::Percentage(50)]).flex(Flex::Center);

    let [area] = vert.areas(area);
    let [area] = horiz.areas(area);

    area
}
