use crate::app::{App, Focus};
use crate::braille;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Help lines, padded for wrapping on narrow canvases
pub const HELP_CONTENT_LINES: u16 = 40;

/// Lines in the controls box
pub const CONTROLS_CONTENT_LINES: u16 = 13;

/// Fixed sidebar sections above the controls box
const STATUS_HEIGHT: u16 = 9;
const PARAMS_HEIGHT: u16 = 7;

// Palette for borders and text
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Rounded, cyan-bordered block used by every sidebar box
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Draw the sidebar and heart canvas, then any overlay
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
        render_banner(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// The canvas rect inside its border, in terminal cells
pub fn canvas_inner_rect(frame_area: Rect, fullscreen: bool) -> Rect {
    let x = if fullscreen {
        frame_area.x + 1
    } else {
        frame_area.x + SIDEBAR_WIDTH.min(frame_area.width) + 1
    };
    let used = if fullscreen { 2 } else { SIDEBAR_WIDTH + 2 };
    Rect {
        x,
        y: frame_area.y + 1,
        width: frame_area.width.saturating_sub(used),
        height: frame_area.height.saturating_sub(2),
    }
}

/// Visible lines in the controls box for a terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    terminal_height
        .saturating_sub(STATUS_HEIGHT + PARAMS_HEIGHT)
        .saturating_sub(2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(PARAMS_HEIGHT),
            Constraint::Min(5), // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Heart Particles ");
    let sim = &app.simulation;

    let (state_text, state_color) = if sim.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else {
        ("RUNNING", BORDER_COLOR)
    };

    let attract = if !sim.settings.attraction {
        Span::styled("n/a", Style::default().fg(Color::DarkGray))
    } else if sim.attracting() {
        Span::styled("ON", Style::default().fg(Color::Green))
    } else {
        Span::styled("OFF", Style::default().fg(DIM_TEXT_COLOR))
    };

    let text = Style::default().fg(TEXT_COLOR);
    let mut content = vec![
        Line::from(Span::styled(format!("Heart: {}", sim.heart().len()), text)),
        Line::from(Span::styled(format!("Stars: {}", sim.background().len()), text)),
        Line::from(Span::styled(format!("Falling: {}", sim.falling_count()), text)),
        Line::from(vec![Span::styled("Attract: ", text), attract]),
        Line::from(Span::styled(
            format!("Wind: {:+.2} rad", sim.wind_direction()),
            text,
        )),
        Line::from(Span::styled(state_text, Style::default().fg(state_color))),
    ];
    if let Some(status) = &app.status {
        content.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(DIM_TEXT_COLOR),
        )));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.simulation.settings;

    let content = vec![
        make_line(
            "Variant",
            app.variant.name().to_string(),
            app.focus == Focus::Variant,
        ),
        make_line(
            "Gravity",
            format!("{:.2}", settings.gravity),
            app.focus == Focus::Gravity,
        ),
        make_line(
            "Wind",
            format!("{:.3}", settings.wind_strength),
            app.focus == Focus::Wind,
        ),
        make_line(
            "Radius",
            format!("{:.0}", settings.attract_radius),
            app.focus == Focus::Radius,
        ),
        make_line(
            "Speed",
            format!("{}", app.steps_per_frame),
            app.focus == Focus::Speed,
        ),
    ];

    // Keep the focused parameter in view
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0 // No scrolling needed
    } else if focus_line >= visible_height {
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Key column, then description
    let make_control = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Click", "attract on/off".to_string()),
        make_control("Space", "regenerate".to_string()),
        make_control("F", "let it fall".to_string()),
        make_control("1-4", format!("variant: {}", app.variant.name())),
        make_control("P", "pause/resume".to_string()),
        make_control("G", format!("glow: {}", if app.show_glow { "on" } else { "off" })),
        make_control("S", "save PNG".to_string()),
        make_control("V", "fullscreen".to_string()),
        make_control("H/?", "help".to_string()),
        make_control("Tab", "select param".to_string()),
        make_control("↑/↓", "adjust".to_string()),
        make_control("+/-", "speed".to_string()),
        make_control("Q", "quit".to_string()),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let paragraph = Paragraph::new(content)
        .block(styled_block(title))
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = braille::background_rows(&app.simulation.settings, inner.height);
    let cells = braille::render_to_braille(&app.simulation, inner.width, inner.height, app.show_glow);

    let buf = frame.buffer_mut();

    // Clear every frame, row by row (gradient or solid)
    for (dy, bg) in rows.iter().enumerate() {
        let y = inner.y + dy as u16;
        for x in inner.x..inner.x + inner.width {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ').set_bg(*bg);
            }
        }
    }

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            if let Some(target) = buf.cell_mut((x, y)) {
                target.set_char(cell.char).set_fg(cell.color);
            }
        }
    }
}

/// One-line mode overlay shown in fullscreen
fn render_banner(frame: &mut Frame, area: Rect, app: &App) {
    let sim = &app.simulation;
    let attract = if sim.attracting() { "ON" } else { "OFF" };
    let text = format!(
        " {} | attract: {} | falling: {} | click: attract  space: regenerate  f: fall ",
        app.variant.name(),
        attract,
        sim.falling_count()
    );

    let width = (text.chars().count() as u16).min(area.width.saturating_sub(2));
    let banner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width,
        height: 1.min(area.height.saturating_sub(2)),
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(TEXT_COLOR).bg(Color::Black),
    )));
    frame.render_widget(paragraph, banner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Canvas column range
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Centered over the heart
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(34);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let heading = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(HIGHLIGHT_COLOR)));
    let content = vec![
        Line::from(""),
        Line::from(Span::styled("PARTICLE HEART", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Particles sampled along the heart curve pulse around their anchors. Layered hearts eventually fall, drifting in a slowly turning wind."),
        Line::from(""),
        heading("VARIANTS (1-4):"),
        Line::from("1=Classic: flat heart that keeps blooming"),
        Line::from("2=Enhanced: trails, fading particles, night sky"),
        Line::from("3=Layered: five depth layers that fall"),
        Line::from("4=Interactive: layered heart with drifting stars"),
        Line::from(""),
        heading("POINTER:"),
        Line::from("Click the canvas to toggle attraction (Enhanced and Interactive). Nearby particles are pulled toward the pointer and swell."),
        Line::from(""),
        heading("PARAMETERS (Tab, arrows):"),
        Line::from("Gravity and wind shape the fall. Radius is the pointer's reach. Speed runs several ticks per frame."),
        Line::from(""),
        heading("BASIC CONTROLS:"),
        Line::from("Space=Regenerate, F=Fall, P=Pause, G=Glow, S=Save PNG, V=Fullscreen, +/-=Speed, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
