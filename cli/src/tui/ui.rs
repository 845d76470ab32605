use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use tablero_core::api::Task;

use crate::form::{FormField, TaskForm};
use crate::tui::app::{BoardApp, InputMode, NotifyKind, PendingDelete};

pub fn draw(f: &mut Frame<'_>, app: &BoardApp) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_search(f, chunks[1], app);
    draw_list(f, chunks[2], app);
    draw_footer(f, chunks[3], app);

    if let Some(form) = app.form.as_ref() {
        draw_form(f, size, app, form);
    }
    if let Some(pending) = app.confirm.as_ref() {
        draw_confirm(f, size, pending);
    }
}

fn draw_header(f: &mut Frame<'_>, area: Rect, app: &BoardApp) {
    let total = app.tasks.as_ref().map(|t| t.len()).unwrap_or(0);
    let visible = app.visible().len();
    let line = Line::from(vec![
        Span::styled(
            "Panel de Tareas",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Filtro: "),
        Span::styled(app.filter.label(), Style::default().fg(Color::Cyan)),
        Span::raw(format!("  {visible}/{total} tareas")),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_search(f: &mut Frame<'_>, area: Rect, app: &BoardApp) {
    let active = app.mode == InputMode::Search;
    let style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let content = if app.search.is_empty() && !active {
        Span::styled(
            "Buscar por título o descripción...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(app.search.clone())
    };
    let widget = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title("Buscar [/]"),
    );
    f.render_widget(widget, area);
}

fn draw_list(f: &mut Frame<'_>, area: Rect, app: &BoardApp) {
    let block = Block::default().borders(Borders::NONE);

    if app.tasks.is_none() {
        let message = if app.loading {
            Line::from(Span::styled(
                "Cargando tareas...",
                Style::default().fg(Color::Gray),
            ))
        } else if app.load_failed {
            Line::from(Span::styled(
                "Error al cargar las tareas",
                Style::default().fg(Color::Red),
            ))
        } else {
            Line::from(Span::raw(""))
        };
        let hint = Line::from(Span::styled(
            if app.load_failed {
                "Verifica la conexión con el servidor (r: reintentar)"
            } else {
                ""
            },
            Style::default().fg(Color::Gray),
        ));
        let widget = Paragraph::new(vec![Line::raw(""), message, hint])
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(widget, area);
        return;
    }

    let visible = app.visible();
    if visible.is_empty() {
        let widget = Paragraph::new(vec![
            Line::raw(""),
            Line::from(Span::styled(
                "No hay tareas que mostrar",
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(block)
        .alignment(Alignment::Center);
        f.render_widget(widget, area);
        return;
    }

    let height = area.height as usize;
    let offset = app.selected.saturating_sub(height.saturating_sub(1));
    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, task)| task_line(task, idx == app.selected))
        .collect();
    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, area);
}

fn task_line(task: &Task, selected: bool) -> Line<'static> {
    let (mark, mark_style) = if task.status.is_completed() {
        ("[x]", Style::default().fg(Color::Green))
    } else {
        ("[ ]", Style::default().fg(Color::Yellow))
    };
    let title_style = if task.status.is_completed() {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(mark.to_string(), mark_style),
        Span::raw(format!(" {:>4}  ", task.id)),
        Span::styled(task.title.clone(), title_style),
    ];
    if !task.description.is_empty() {
        spans.push(Span::styled(
            format!("  {}", task.description),
            Style::default().fg(Color::Gray),
        ));
    }

    let mut line = Line::from(spans);
    if selected {
        line.style = Style::default().add_modifier(Modifier::REVERSED);
    }
    line
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &BoardApp) {
    let line = match app.notification.as_ref() {
        Some(n) => {
            let style = match n.kind {
                NotifyKind::Success => Style::default().fg(Color::Green),
                NotifyKind::Error => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(n.message.clone(), style))
        }
        None => Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(
                "n:nueva  e:editar  espacio:completar  d:eliminar  f:filtro  /:buscar  r:recargar  q:salir",
                Style::default().fg(Color::Gray),
            ),
        ]),
    };
    let widget = Paragraph::new(line).block(Block::default().borders(Borders::TOP));
    f.render_widget(widget, area);
}

fn draw_form(f: &mut Frame<'_>, size: Rect, app: &BoardApp, form: &TaskForm) {
    let title = if form.editing.is_some() {
        "Editar Tarea"
    } else {
        "Crear Tarea"
    };
    let area = centered_rect(60, 10, size);
    f.render_widget(Clear, area);

    let field_line = |label: &str, value: &str, field: FormField| {
        let style = if form.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label}: "), style.add_modifier(Modifier::BOLD)),
            Span::styled(value.to_string(), style),
        ])
    };

    let completed_mark = if form.completed { "[x]" } else { "[ ]" };
    let mut lines = vec![
        field_line("Título", &form.title, FormField::Title),
        field_line("Descripción", &form.description, FormField::Description),
        field_line("Completada", completed_mark, FormField::Completed),
        Line::raw(""),
    ];
    if let Some(err) = app.form_error.as_ref() {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Enter: guardar  Tab: campo  espacio: marcar  Esc: cancelar",
        Style::default().fg(Color::Gray),
    )));

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}

fn draw_confirm(f: &mut Frame<'_>, size: Rect, pending: &PendingDelete) {
    let area = centered_rect(60, 7, size);
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::raw(format!("\"{}\"", pending.target_title))),
        Line::from(Span::raw(
            "¿Estás seguro de que quieres eliminar esta tarea? Esta acción no se puede deshacer.",
        )),
        Line::raw(""),
        Line::from(Span::styled(
            "s: eliminar  n: cancelar",
            Style::default().fg(Color::Gray),
        )),
    ];
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Eliminar tarea"),
        );
    f.render_widget(widget, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = r.width * percent_x / 100;
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(r.height),
    }
}
