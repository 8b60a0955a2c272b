use crate::controller::{BoardController, FormField, Selection, TaskForm};
use crate::drag::Offset;
use crate::storage::KeyValueStorage;
use crate::task::{Task, TaskId, TaskStatus};
use crate::theme::Theme;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};

const CARD_HEIGHT: u16 = 5;
const ADD_BUTTON: &str = "[+ Add Task]";
const DELETE_BUTTON: &str = "[x]";
const FRAME: Duration = Duration::from_millis(16);
const IDLE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSlot {
    pub id: TaskId,
    pub area: Rect,
    pub delete: Rect,
}

/// Geometry of one frame. Drawing and mouse hit-testing both read from it
/// so a click always lands on what was drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardLayout {
    pub header: Rect,
    pub add_button: Rect,
    pub board: Rect,
    pub footer: Rect,
    pub columns: [Rect; TaskStatus::COUNT],
    pub cards: Vec<CardSlot>,
}

impl BoardLayout {
    pub fn compute(area: Rect, columns: &[Vec<&Task>; TaskStatus::COUNT], selection: Selection) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let (header, board, footer) = (rows[0], rows[1], rows[2]);

        let button_width = ADD_BUTTON.len() as u16;
        let add_button = Rect {
            x: header.right().saturating_sub(button_width + 2),
            y: header.y + header.height / 2,
            width: button_width.min(header.width),
            height: header.height.min(1),
        };

        let mut layout = Self {
            header,
            add_button,
            board,
            footer,
            columns: column_areas(board),
            cards: Vec::new(),
        };

        for (status, tasks) in TaskStatus::ALL.into_iter().zip(columns) {
            let inner = layout.columns[status.index()].inner(ratatui::layout::Margin::new(1, 1));
            let capacity = (inner.height / CARD_HEIGHT) as usize;
            let first = if selection.column == status {
                (selection.row + 1).saturating_sub(capacity)
            } else {
                0
            };
            for (slot, task) in tasks.iter().skip(first).take(capacity).enumerate() {
                let area = Rect {
                    x: inner.x,
                    y: inner.y + slot as u16 * CARD_HEIGHT,
                    width: inner.width,
                    height: CARD_HEIGHT,
                };
                layout.cards.push(CardSlot {
                    id: task.id.clone(),
                    area,
                    delete: delete_area(area),
                });
            }
        }
        layout
    }

    pub fn card_at(&self, position: Position) -> Option<&CardSlot> {
        self.cards.iter().find(|slot| slot.area.contains(position))
    }
}

/// Splits the board so column `i` covers exactly the cells whose drop zone
/// is `i`: it starts at the first whole cell at or past `i * width / N`.
fn column_areas(board: Rect) -> [Rect; TaskStatus::COUNT] {
    let count = TaskStatus::COUNT as u32;
    let edge = |i: u32| -> u16 { ((i * u32::from(board.width)).div_ceil(count)) as u16 };
    std::array::from_fn(|i| {
        let (start, end) = (edge(i as u32), edge(i as u32 + 1));
        Rect {
            x: board.x + start,
            width: end - start,
            ..board
        }
    })
}

fn delete_area(card: Rect) -> Rect {
    let width = DELETE_BUTTON.len() as u16;
    Rect {
        x: card.right().saturating_sub(width + 1),
        y: card.bottom().saturating_sub(2),
        width: width.min(card.width),
        height: card.height.min(1),
    }
}

/// Moves `area` by a drag offset (in cells) while keeping it on screen.
fn lift(area: Rect, offset: Offset, bounds: Rect) -> Rect {
    let clamp = |origin: u16, delta: f32, size: u16, lo: u16, hi: u16| -> u16 {
        let max = hi.saturating_sub(size).max(lo);
        (f32::from(origin) + delta.round()).clamp(f32::from(lo), f32::from(max)) as u16
    };
    Rect {
        x: clamp(area.x, offset.x, area.width, bounds.x, bounds.right()),
        y: clamp(area.y, offset.y, area.height, bounds.y, bounds.bottom()),
        ..area
    }
}

pub fn draw<S: KeyValueStorage>(
    f: &mut Frame,
    board: &BoardController<S>,
    layout: &BoardLayout,
    theme: &Theme,
) {
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background).fg(theme.text)),
        f.area(),
    );
    draw_header(f, layout, theme);

    let selected = board.selected_task().map(|t| t.id.as_str());
    for status in TaskStatus::ALL {
        let focused = board.selection().column == status && board.form().is_none();
        let column = Block::default()
            .title(Line::from(vec![
                Span::styled(status.title(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!(" ({})", board.store().count(status)),
                    Style::default().fg(theme.icon),
                ),
            ]))
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(theme.tint)
            } else {
                Style::default().fg(theme.card_border)
            })
            .style(Style::default().bg(theme.column(status)).fg(theme.text));
        f.render_widget(column, layout.columns[status.index()]);
    }

    // Cards being dragged or springing back are drawn last, on top.
    let mut lifted = Vec::new();
    for slot in &layout.cards {
        let Some(task) = board.store().get(&slot.id) else {
            continue;
        };
        match board.drag_offset(&slot.id) {
            Some(offset) => lifted.push((task, slot.area, offset)),
            None => draw_card(f, task, slot.area, selected == Some(task.id.as_str()), false, theme),
        }
    }
    for (task, area, offset) in lifted {
        let area = lift(area, offset, f.area());
        f.render_widget(Clear, area);
        draw_card(f, task, area, true, true, theme);
    }

    f.render_widget(
        Paragraph::new(
            " a add · enter edit · d delete · arrows select · shift+←/→ move · drag cards between columns · q quit",
        )
        .style(Style::default().fg(theme.icon)),
        layout.footer,
    );

    if let Some(form) = board.form() {
        draw_form(f, form, theme);
    }
}

fn draw_header(f: &mut Frame, layout: &BoardLayout, theme: &Theme) {
    let header = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.card_border));
    let inner = header.inner(layout.header);
    f.render_widget(header, layout.header);
    f.render_widget(
        Paragraph::new(Span::styled(
            " Backlog Management",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Rect { height: 1, ..inner },
    );
    f.render_widget(
        Paragraph::new(ADD_BUTTON).style(
            Style::default()
                .bg(theme.tint)
                .fg(theme.card_background)
                .add_modifier(Modifier::BOLD),
        ),
        layout.add_button,
    );
}

fn draw_card(f: &mut Frame, task: &Task, area: Rect, selected: bool, lifted: bool, theme: &Theme) {
    let mut border = Style::default().fg(if selected { theme.tint } else { theme.card_border });
    if lifted {
        border = border.add_modifier(Modifier::BOLD);
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(theme.card_background).fg(theme.text));
    let lines = vec![
        Line::from(Span::styled(
            task.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(task.description.as_str(), Style::default().fg(theme.icon))),
        Line::from(Span::styled(task.duration.as_str(), Style::default().fg(theme.icon))),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
    f.render_widget(
        Paragraph::new(DELETE_BUTTON).style(Style::default().fg(theme.icon)),
        delete_area(area),
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_form(f: &mut Frame, form: &TaskForm, theme: &Theme) {
    let popup = centered(f.area(), 60, 14);
    let title = if form.editing().is_some() { " Edit Task " } else { " New Task " };
    let block = Block::default()
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.tint))
        .style(Style::default().bg(theme.card_background).fg(theme.text));
    let inner = block.inner(popup);
    f.render_widget(Clear, popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let fields = [
        (FormField::Title, "Title"),
        (FormField::Description, "Description"),
        (FormField::Duration, "Duration (e.g. 2h)"),
    ];
    for ((field, label), area) in fields.into_iter().zip(rows.iter().copied()) {
        let focused = form.focus == field;
        let value = form.field(field);
        f.render_widget(
            Paragraph::new(value).block(
                Block::default()
                    .title(label)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if focused {
                        theme.tint
                    } else {
                        theme.card_border
                    })),
            ),
            area,
        );
        if focused {
            let x = (area.x + 1 + value.chars().count() as u16).min(area.right().saturating_sub(2));
            f.set_cursor_position(Position::new(x, area.y + 1));
        }
    }
    f.render_widget(
        Paragraph::new("enter save · esc cancel · tab next field").style(Style::default().fg(theme.icon)),
        rows[3],
    );
}

/// A left-button press on a card that may turn into a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Press {
    id: TaskId,
    column: u16,
    row: u16,
    moved: bool,
}

/// Returns `true` when the user asked to quit.
pub fn handle_key<S: KeyValueStorage>(board: &mut BoardController<S>, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if board.form().is_some() {
        handle_form_key(board, key);
        return false;
    }
    let shift = key.modifiers.contains(event::KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('a') | KeyCode::Char('+') => board.open_create(),
        KeyCode::Enter | KeyCode::Char('e') => {
            board.edit_selected();
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            board.delete_selected();
        }
        KeyCode::Left if shift => {
            board.shift_selected(false);
        }
        KeyCode::Right if shift => {
            board.shift_selected(true);
        }
        KeyCode::Char('H') => {
            board.shift_selected(false);
        }
        KeyCode::Char('L') => {
            board.shift_selected(true);
        }
        KeyCode::Left | KeyCode::Char('h') => board.select_left(),
        KeyCode::Right | KeyCode::Char('l') => board.select_right(),
        KeyCode::Up | KeyCode::Char('k') => board.select_up(),
        KeyCode::Down | KeyCode::Char('j') => board.select_down(),
        _ => {}
    }
    false
}

fn handle_form_key<S: KeyValueStorage>(board: &mut BoardController<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => board.cancel(),
        KeyCode::Enter => {
            board.submit();
        }
        code => {
            let Some(form) = board.form_mut() else {
                return;
            };
            match code {
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.push(c),
                _ => {}
            }
        }
    }
}

pub fn handle_mouse<S: KeyValueStorage>(
    board: &mut BoardController<S>,
    layout: &BoardLayout,
    press: &mut Option<Press>,
    mouse: MouseEvent,
) {
    let position = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        // Always finish the gesture, even if a dialog opened mid-drag.
        MouseEventKind::Up(MouseButton::Left) => {
            let Some(press) = press.take() else {
                return;
            };
            if !press.moved {
                board.drag_cancel(&press.id);
                if board.form().is_none() {
                    board.open_edit(&press.id);
                }
            } else if board.form().is_some() {
                board.drag_cancel(&press.id);
            } else {
                let end_x = f32::from(mouse.column) - f32::from(layout.board.x);
                board.drag_end(&press.id, end_x);
            }
        }
        _ if board.form().is_some() => {}
        MouseEventKind::Down(MouseButton::Left) => {
            // A press whose release never arrived.
            if let Some(stale) = press.take() {
                board.drag_cancel(&stale.id);
            }
            if layout.add_button.contains(position) {
                board.open_create();
                return;
            }
            let Some(slot) = layout.card_at(position) else {
                return;
            };
            if slot.delete.contains(position) {
                board.delete(&slot.id);
                return;
            }
            board.select(&slot.id);
            if board.drag_start(&slot.id) {
                *press = Some(Press {
                    id: slot.id.clone(),
                    column: mouse.column,
                    row: mouse.row,
                    moved: false,
                });
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(press) = press.as_mut() {
                let translation = Offset::new(
                    f32::from(mouse.column) - f32::from(press.column),
                    f32::from(mouse.row) - f32::from(press.row),
                );
                press.moved |= translation != Offset::ZERO;
                board.drag_move(&press.id, translation);
            }
        }
        _ => {}
    }
}

pub fn run_app<B: Backend, S: KeyValueStorage>(
    terminal: &mut Terminal<B>,
    board: &mut BoardController<S>,
    theme: &Theme,
) -> io::Result<()> {
    let mut press = None;
    let mut last_tick = Instant::now();
    loop {
        let now = Instant::now();
        let animating = board.tick(now.duration_since(last_tick).as_secs_f32());
        last_tick = now;

        let mut layout = BoardLayout::default();
        terminal.draw(|f| {
            layout = BoardLayout::compute(f.area(), &board.columns(), board.selection());
            draw(f, board, &layout, theme);
        })?;
        board.set_surface_width(f32::from(layout.board.width));

        let timeout = if animating || board.active_drag().is_some() {
            FRAME
        } else {
            IDLE
        };
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if handle_key(board, key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => handle_mouse(board, &layout, &mut press, mouse),
            _ => {}
        }
    }
}
