use crate::process_log::LogLevel;
use crate::ui::app::{App, DetailRow, FocusPanel};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table,
    },
    Frame,
};

// Brand colors
const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68);
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C);
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65);
const BRAND_RED: Color = Color::Rgb(0xA8, 0x45, 0x3C);

// Styles
const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const SELECTED_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);
const SECTION_STYLE: Style = Style::new().fg(BRAND_MUTED).add_modifier(Modifier::ITALIC);
const COUNT_COLOR: Color = BRAND_GREEN;

pub fn draw_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Main content
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);

    let panels = Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);
    draw_types(frame, panels[0], app);
    draw_elements(frame, panels[1], app);

    draw_footer(
        frame,
        chunks[2],
        " ←→ Panel | ↑↓ Select | Enter Details | t Tree | g Log | q Quit ",
    );
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        " IFC Property Inspector | {} | {} types | {} elements ",
        app.title,
        app.groups.len(),
        app.elements.len()
    );

    let header = Paragraph::new(title)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BRAND_ORANGE)
    } else {
        Style::default()
    }
}

fn row_style(selected: bool, focused: bool) -> Style {
    if selected && focused {
        SELECTED_STYLE
    } else if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// First row to draw so that `selected` stays inside `visible` rows.
fn scroll_offset(selected: usize, visible: usize) -> usize {
    if selected >= visible {
        selected - visible + 1
    } else {
        0
    }
}

fn draw_types(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Types;

    let items: Vec<ListItem> = app
        .groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let is_selected = i == app.selected_group;
            let marker = if is_selected && is_focused { " ◄" } else { "" };

            ListItem::new(Line::from(vec![
                Span::styled(&group.type_name, row_style(is_selected, is_focused)),
                Span::raw(" "),
                Span::styled(
                    format!("({})", group.element_indices.len()),
                    Style::default().fg(COUNT_COLOR),
                ),
                Span::styled(marker, Style::default().fg(BRAND_ORANGE)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" Types ({}) ", app.groups.len()))
            .borders(Borders::ALL)
            .border_style(border_style(is_focused)),
    );

    frame.render_widget(list, area);
}

fn draw_elements(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Elements;
    let elements = app.group_elements();

    // Borders and header row
    let visible_rows = (area.height as usize).saturating_sub(3);
    let offset = scroll_offset(app.selected_element, visible_rows);

    let header = Row::new(vec!["Name", "ID", "Properties", "Materials"])
        .style(HEADER_STYLE)
        .height(1);

    let rows: Vec<Row> = elements
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(i, element)| {
            Row::new(vec![
                element.display_name.clone(),
                format!("#{}", element.id),
                element.property_count().to_string(),
                element.materials.len().to_string(),
            ])
            .style(row_style(i == app.selected_element, is_focused))
        })
        .collect();

    let widths = [
        Constraint::Percentage(52),
        Constraint::Percentage(16),
        Constraint::Percentage(16),
        Constraint::Percentage(16),
    ];

    let title = app.selected_group().map_or_else(
        || " Elements ".to_string(),
        |group| format!(" {} ({} elements) ", group.type_name, elements.len()),
    );
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style(is_focused)),
    );

    frame.render_widget(table, area);
    draw_scrollbar(frame, area, elements.len(), visible_rows, app.selected_element);
}

fn draw_scrollbar(frame: &mut Frame, area: Rect, total: usize, visible: usize, position: usize) {
    if total <= visible || area.height < 4 {
        return;
    }
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));
    let mut scrollbar_state = ScrollbarState::new(total).position(position);

    let scrollbar_area = Rect {
        x: area.x + area.width - 1,
        y: area.y + 2,
        width: 1,
        height: area.height - 3,
    };
    frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
}

fn draw_footer(frame: &mut Frame, area: Rect, help: &str) {
    let footer = Paragraph::new(help)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

pub fn draw_element_detail(frame: &mut Frame, app: &App) {
    let Some(element) = app.selected() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Length(3), // Info line
        Constraint::Min(6),    // Properties and materials (scrollable)
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    let header = Paragraph::new(format!(" {} ", element.display_name))
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let position = format!(
        "Element: {}/{}",
        app.selected_element + 1,
        app.group_elements().len()
    );
    let global_id = element.global_id.as_deref().unwrap_or("-");
    let info_text = format!(
        "{}  |  #{}  |  {position}  |  GlobalId: {global_id}",
        element.type_name, element.id
    );
    let info_widget = Paragraph::new(info_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(info_widget, chunks[1]);

    let detail = app.detail_rows();
    let visible = (chunks[2].height as usize).saturating_sub(3);

    let rows: Vec<Row> = detail
        .iter()
        .skip(app.detail_scroll_offset)
        .take(visible)
        .map(|row| match row {
            DetailRow::Section(title) => {
                Row::new(vec![format!("── {title} ──"), String::new()]).style(SECTION_STYLE)
            }
            DetailRow::Entry { name, value } => Row::new(vec![name.clone(), value.clone()]),
        })
        .collect();

    let widths = [Constraint::Percentage(45), Constraint::Percentage(55)];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Property", "Value"]).style(HEADER_STYLE))
        .block(
            Block::default()
                .title(format!(
                    " Properties ({}) | Materials ({}) ",
                    element.property_count(),
                    element.materials.len()
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, chunks[2]);
    draw_scrollbar(frame, chunks[2], detail.len(), visible, app.detail_scroll_offset);

    draw_footer(
        frame,
        chunks[3],
        " Esc Back | ↑↓ Scroll | ←→ Element | q Quit ",
    );
}

pub fn draw_spatial_tree(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(3)]).split(frame.area());
    let visible = (chunks[0].height as usize).saturating_sub(2);

    let items: Vec<ListItem> = app
        .tree_lines
        .iter()
        .skip(app.tree_scroll_offset)
        .take(visible)
        .map(|line| {
            let style = if line.is_element {
                Style::default().fg(BRAND_ORANGE)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw("  ".repeat(line.depth)),
                Span::styled(&line.label, style),
            ]))
        })
        .collect();

    let title = if app.tree_lines.is_empty() {
        " Spatial Tree (unavailable) ".to_string()
    } else {
        format!(" Spatial Tree ({} nodes) ", app.tree_lines.len())
    };
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(list, chunks[0]);

    draw_footer(frame, chunks[1], " Esc Back | ↑↓ Scroll | q Quit ");
}

pub fn draw_log(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(3)]).split(frame.area());
    let visible = (chunks[0].height as usize).saturating_sub(2);

    let items: Vec<ListItem> = app
        .log
        .entries()
        .iter()
        .skip(app.log_scroll_offset)
        .take(visible)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Info => BRAND_MUTED,
                LogLevel::Warn => BRAND_ORANGE,
                LogLevel::Error => BRAND_RED,
            };
            ListItem::new(Span::styled(entry.to_string(), Style::default().fg(color)))
        })
        .collect();

    let title = format!(
        " Process Log ({} entries, {} warnings, {} errors) ",
        app.log.len(),
        app.log.count(LogLevel::Warn),
        app.log.count(LogLevel::Error)
    );
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(list, chunks[0]);

    draw_footer(frame, chunks[1], " Esc Back | ↑↓ Scroll | q Quit ");
}
