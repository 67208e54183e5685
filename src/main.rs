mod app;
mod braille;
mod color;
mod config;
mod error;
mod export;
mod heart;
mod logging;
mod particle;
mod presets;
mod settings;
mod simulation;
mod ui;

use app::{App, Focus, MAX_SPEED};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use presets::{Preset, PresetManager};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use settings::Variant;
use simulation::HeartSimulation;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "heart-particles")]
#[command(about = "A pulsing, falling particle heart in the terminal")]
struct Args {
    // === Basic Parameters ===
    /// Heart variant (classic, enhanced, layered, interactive)
    #[arg(long, default_value = "interactive")]
    variant: String,

    /// Start from a named preset instead of a variant
    #[arg(long)]
    preset: Option<String>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation speed (ticks per frame, 1-10)
    #[arg(long, default_value = "1")]
    speed: usize,

    /// Start without the sidebar
    #[arg(long, default_value = "false")]
    fullscreen: bool,

    // === Physics Parameters ===
    /// Gravity while falling (0.0-0.2)
    #[arg(long)]
    gravity: Option<f32>,

    /// Wind strength (0.0-0.1)
    #[arg(long)]
    wind: Option<f32>,

    /// Pointer attraction radius (50-400)
    #[arg(long = "attract-radius")]
    attract_radius: Option<f32>,

    // === Files ===
    /// Load settings from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the resulting config to a JSON file and exit
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Save the resulting settings as a user preset and exit
    #[arg(long = "save-preset")]
    save_preset: Option<String>,

    /// Render a PNG after --frames ticks and exit
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Record --frames frames into an animated GIF and exit
    #[arg(long)]
    record: Option<PathBuf>,

    /// Frames to simulate for --snapshot / --record
    #[arg(long, default_value = "120")]
    frames: usize,

    /// Log file (defaults to the user cache directory)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn parse_variant(s: &str) -> Variant {
    match s.to_lowercase().as_str() {
        "classic" | "flat" | "1" => Variant::Classic,
        "enhanced" | "trails" | "2" => Variant::Enhanced,
        "layered" | "3d" | "3" => Variant::Layered,
        _ => Variant::Interactive,
    }
}

/// Build the starting config from --config, --preset or --variant plus overrides
fn build_config(args: &Args) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = if let Some(path) = &args.config {
        AppConfig::load_from_file(path)?
    } else if let Some(name) = &args.preset {
        let manager = PresetManager::new();
        let preset = manager.resolve(name).inspect_err(|_| {
            eprintln!("Available presets: {}", manager.preset_names().join(", "));
        })?;
        AppConfig {
            variant: preset.variant,
            settings: preset.settings.clone(),
            ..AppConfig::default()
        }
    } else {
        AppConfig::for_variant(parse_variant(&args.variant))
    };

    config.steps_per_frame = args.speed.clamp(1, MAX_SPEED);
    config.fullscreen |= args.fullscreen;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(gravity) = args.gravity {
        config.settings.gravity = gravity.clamp(0.0, 0.2);
    }
    if let Some(wind) = args.wind {
        config.settings.wind_strength = wind.clamp(0.0, 0.1);
    }
    if let Some(radius) = args.attract_radius {
        config.settings.attract_radius = radius.clamp(50.0, 400.0);
    }

    Ok(config)
}

fn make_simulation(config: &AppConfig) -> HeartSimulation {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    HeartSimulation::new(config.settings.clone(), rng)
}

/// Handle the non-interactive flags. Returns true if any ran.
fn run_headless(args: &Args, config: &AppConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let mut ran = false;

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        println!("Config written to {}", path.display());
        ran = true;
    }

    if let Some(name) = &args.save_preset {
        let mut manager = PresetManager::new();
        let preset = Preset::new(
            name.clone(),
            format!("Saved from the {} variant", config.variant.name()),
            config.variant,
            config.settings.clone(),
        );
        let path = manager.save_preset(preset)?;
        println!("Preset '{}' written to {}", name, path.display());
        ran = true;
    }

    if let Some(path) = &args.snapshot {
        let mut sim = make_simulation(config);
        for _ in 0..args.frames * config.steps_per_frame {
            sim.tick();
        }
        export::save_snapshot(&sim, path, export::DEFAULT_WIDTH, export::DEFAULT_HEIGHT)?;
        println!("Snapshot written to {}", path.display());
        ran = true;
    }

    if let Some(path) = &args.record {
        let mut sim = make_simulation(config);
        export::record_gif(
            &mut sim,
            path,
            args.frames,
            config.steps_per_frame,
            export::DEFAULT_WIDTH as u16,
            export::DEFAULT_HEIGHT as u16,
        )?;
        println!("Recording written to {}", path.display());
        ran = true;
    }

    Ok(ran)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_path = logging::init(args.log_file.as_deref())?;
    let config = build_config(&args)?;
    info!(
        variant = config.variant.name(),
        seed = ?config.seed,
        speed = config.steps_per_frame,
        log = ?log_path,
        "starting"
    );

    if run_headless(&args, &config)? {
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    if let Ok(dir) = std::env::current_dir() {
        app.snapshot_dir = dir;
    }

    // Run the app
    let res = run_app(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    info!("exiting");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        // Pointer mapping needs the canvas placement of the frame about to be drawn
        let size = terminal.size()?;
        app.canvas = ui::canvas_inner_rect(
            Rect::new(0, 0, size.width, size.height),
            app.fullscreen_mode,
        );

        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    // Handle Ctrl+C
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    match key.code {
                        // System controls
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.regenerate(),
                        KeyCode::Char('f') | KeyCode::Char('F') => app.trigger_fall(),
                        KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_pause(),
                        KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_glow(),
                        KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
                        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                            app.toggle_help()
                        }
                        KeyCode::Char('s') | KeyCode::Char('S') => {
                            if let Err(e) = app.save_snapshot() {
                                warn!(error = %e, "snapshot failed");
                            }
                        }
                        KeyCode::Char('1') => app.set_variant(Variant::Classic),
                        KeyCode::Char('2') => app.set_variant(Variant::Enhanced),
                        KeyCode::Char('3') => app.set_variant(Variant::Layered),
                        KeyCode::Char('4') => app.set_variant(Variant::Interactive),
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            app.increase_speed();
                            app.focus = Focus::Speed;
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            app.decrease_speed();
                            app.focus = Focus::Speed;
                        }

                        // Navigation
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_up();
                                } else {
                                    app.scroll_controls_up();
                                }
                            }
                        }
                        KeyCode::Down => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_down();
                                } else {
                                    let visible = ui::get_controls_visible_lines(size.height);
                                    app.scroll_controls_down(
                                        ui::CONTROLS_CONTENT_LINES.saturating_sub(visible),
                                    );
                                }
                            }
                        }
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(_) => app.pointer_pressed(mouse.column, mouse.row),
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        app.pointer_moved(mouse.column, mouse.row)
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Run simulation tick
        app.tick();
    }
}
