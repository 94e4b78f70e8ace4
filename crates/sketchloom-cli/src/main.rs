//! sketchloom - TUI and CLI for generative sketches
//!
//! Usage:
//!   sketchloom [config.yaml]               Launch TUI
//!   sketchloom render <sketch> [options]   Export one sketch
//!   sketchloom sketches                    List available sketches
//!   sketchloom params <sketch>             List a sketch's parameters
//!   sketchloom recipe <recipe.yaml>        Compose sketches on one canvas
//!   sketchloom benchmark <sketch>          Time sketch generation

mod cli;

use std::env;
use std::io::{self, stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use image::DynamicImage;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use ratatui_image::{picker::{Picker, ProtocolType}, protocol::StatefulProtocol, StatefulImage};

use sketchloom::{Drawing, ParamSpec, Point, Sketch, SketchConfig, SketchKind, ViewPreset};

use cli::common::{drawing_to_svg, init_logging, load_config, render_to_image, timestamped_filename, write_output};
use cli::{cmd_benchmark, cmd_params, cmd_recipe, cmd_render, cmd_sketches, CliError, CliResult};

// Preview raster size - wide aspect ratio for terminal display
const IMAGE_WIDTH: u32 = 1600;
const IMAGE_HEIGHT: u32 = 1000;

/// Cycloid steps simulated per UI tick while running.
const STEPS_PER_TICK: usize = 5;

/// Nudge multiplier for `[` and `]`.
const COARSE_STEPS: i32 = 10;

/// Result from background preview rendering
struct RenderResult {
    image: CliResult<DynamicImage>,
    render_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Sketches,
    Params,
}

/// Application state for TUI
struct App {
    /// One live sketch per kind, in `SketchKind::all()` order
    sketches: Vec<Sketch>,
    sketch_state: ListState,
    param_state: ListState,
    focus: Focus,
    /// Projected drawing of the selected sketch
    drawing: Drawing<Point>,
    /// Cycloid animation paused
    paused: bool,
    /// Zoom level (1.0 = fit to view)
    zoom: f64,
    /// Next view preset for `v`
    preset_index: usize,
    /// Last preview render time
    render_ms: f64,
    /// Last action, shown in the help bar
    message: String,
    should_quit: bool,
    /// Is a preview render in progress?
    is_loading: bool,
    /// Render again once the current render completes
    needs_render: bool,
    result_rx: Receiver<RenderResult>,
    result_tx: Sender<RenderResult>,
    /// Animation frame counter for spinner
    spinner_frame: usize,
    /// Image picker for terminal protocol detection
    picker: Picker,
    /// Current rendered image protocol state
    image_state: Option<Box<dyn StatefulProtocol>>,
}

impl App {
    fn new(config: Option<SketchConfig>) -> Self {
        let selected = config.as_ref().map(SketchConfig::kind).unwrap_or(SketchKind::Cycloid);
        let mut config = config;
        let sketches: Vec<Sketch> = SketchKind::all()
            .iter()
            .map(|&kind| match config.take_if(|c| c.kind() == kind) {
                Some(config) => Sketch::from_config(config),
                None => Sketch::new(kind),
            })
            .collect();

        let mut sketch_state = ListState::default();
        sketch_state.select(SketchKind::all().iter().position(|&k| k == selected));
        let mut param_state = ListState::default();
        param_state.select(Some(0));

        let (result_tx, result_rx) = mpsc::channel();

        // Initialize image picker - force Sixel protocol
        let mut picker = Picker::from_termios()
            .unwrap_or_else(|_| Picker::new((8, 16)));
        picker.protocol_type = ProtocolType::Sixel;

        let mut app = App {
            sketches,
            sketch_state,
            param_state,
            focus: Focus::Sketches,
            drawing: Drawing::default(),
            paused: false,
            zoom: 1.0,
            preset_index: 0,
            render_ms: 0.0,
            message: String::new(),
            should_quit: false,
            is_loading: false,
            needs_render: false,
            result_rx,
            result_tx,
            spinner_frame: 0,
            picker,
            image_state: None,
        };

        app.mark_dirty();
        app
    }

    fn selected_index(&self) -> usize {
        self.sketch_state.selected().unwrap_or(0).min(self.sketches.len() - 1)
    }

    fn sketch(&self) -> &Sketch {
        &self.sketches[self.selected_index()]
    }

    fn sketch_mut(&mut self) -> &mut Sketch {
        let index = self.selected_index();
        &mut self.sketches[index]
    }

    fn selected_param(&self) -> Option<&'static ParamSpec> {
        let specs = self.sketch().params().specs();
        specs.get(self.param_state.selected()?)
    }

    /// Re-project the selected sketch and queue a preview render.
    fn mark_dirty(&mut self) {
        self.drawing = self.sketch().drawing().project();
        self.request_render();
    }

    fn request_render(&mut self) {
        // Skip if already rendering - render again after completion
        if self.is_loading {
            self.needs_render = true;
            return;
        }

        self.needs_render = false;
        self.is_loading = true;

        let drawing = self.drawing.clone();
        let zoom = self.zoom;
        let tx = self.result_tx.clone();

        thread::spawn(move || {
            let start = Instant::now();
            let image = render_to_image(&drawing, IMAGE_WIDTH, IMAGE_HEIGHT, zoom);
            let render_ms = start.elapsed().as_secs_f64() * 1000.0;
            let _ = tx.send(RenderResult { image, render_ms });
        });
    }

    fn check_render_result(&mut self) {
        // Drain all pending results, keep only the latest
        let mut latest: Option<RenderResult> = None;
        while let Ok(result) = self.result_rx.try_recv() {
            latest = Some(result);
        }

        if let Some(result) = latest {
            self.is_loading = false;
            self.render_ms = result.render_ms;
            match result.image {
                Ok(image) => self.image_state = Some(self.picker.new_resize_protocol(image)),
                Err(e) => self.message = format!("Preview failed: {}", e),
            }

            // If the drawing changed while we were rendering, render now
            if self.needs_render {
                self.request_render();
            }
        }
    }

    /// Advance a running cycloid.
    fn tick(&mut self) {
        if self.paused {
            return;
        }
        if self.sketch_mut().advance(STEPS_PER_TICK) > 0 {
            self.mark_dirty();
        }
    }

    fn move_sketch(&mut self, delta: isize) {
        let len = self.sketches.len() as isize;
        let i = (self.selected_index() as isize + delta).rem_euclid(len) as usize;
        self.sketch_state.select(Some(i));
        self.param_state.select(Some(0));
        self.mark_dirty();
    }

    fn move_param(&mut self, delta: isize) {
        let len = self.sketch().params().specs().len() as isize;
        if len == 0 {
            return;
        }
        let current = self.param_state.selected().unwrap_or(0) as isize;
        self.param_state.select(Some((current + delta).rem_euclid(len) as usize));
    }

    fn nudge(&mut self, steps: i32) {
        let Some(spec) = self.selected_param() else {
            return;
        };
        match self.sketch_mut().nudge(spec.name, steps) {
            Ok(value) => self.message = format!("{} = {}", spec.label, spec.format(value)),
            Err(e) => self.message = e.to_string(),
        }
        self.mark_dirty();
    }

    fn regenerate(&mut self) {
        self.sketch_mut().regenerate();
        self.message = format!("Regenerated {}", self.sketch().kind().name());
        self.mark_dirty();
    }

    fn export(&mut self) {
        let sketch = self.sketch_mut();
        sketch.materialize();
        let kind = sketch.kind();
        let drawing = sketch.drawing().project();

        let filename = timestamped_filename(kind, "svg");
        self.message = match write_output(&filename, drawing_to_svg(&drawing, kind.export_prefix()).as_bytes()) {
            Ok(()) => format!("Exported {}", filename),
            Err(e) => e.to_string(),
        };
        self.mark_dirty();
    }

    fn cycle_view(&mut self) {
        let presets = ViewPreset::all();
        let preset = presets[self.preset_index % presets.len()];
        let view = preset.apply(self.sketch().view());

        if self.sketch_mut().set_view(view) {
            self.preset_index = (self.preset_index + 1) % presets.len();
            self.message = format!("View: {}", preset.name());
            self.mark_dirty();
        } else {
            self.message = format!("{} has no 3D view", self.sketch().kind().name());
        }
    }

    fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.25).min(10.0);
        self.request_render();
    }

    fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.25).max(0.5);
        self.request_render();
    }

    fn reset_zoom(&mut self) {
        self.zoom = 1.0;
        self.request_render();
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let args: Vec<String> = args.into_iter().filter(|a| a != "-v" && a != "--verbose").collect();
    let prog = args.first().map(String::as_str).unwrap_or("sketchloom");

    let result = match args.get(1).map(String::as_str) {
        Some("render") => {
            init_logging(verbose);
            cmd_render(&args[2..])
        }
        Some("sketches") => {
            cmd_sketches();
            Ok(())
        }
        Some("params") => {
            init_logging(verbose);
            cmd_params(&args[2..])
        }
        Some("recipe") => {
            init_logging(verbose);
            cmd_recipe(&args[2..])
        }
        Some("benchmark") => {
            init_logging(verbose);
            cmd_benchmark(&args[2..])
        }
        Some("tui") => run_tui(args.get(2).map(String::as_str)),
        Some("help" | "--help" | "-h") => {
            print_usage(prog);
            Ok(())
        }
        Some(path) if is_config_path(path) => run_tui(Some(path)),
        Some(other) => {
            print_usage(prog);
            Err(CliError::usage(format!("unknown command '{}'", other)))
        }
        None => run_tui(None),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn is_config_path(path: &str) -> bool {
    let path = path.to_lowercase();
    path.ends_with(".yaml") || path.ends_with(".yml") || path.ends_with(".json")
}

fn run_tui(config_path: Option<&str>) -> CliResult {
    // Load before touching the terminal so errors print normally
    let config = config_path.map(load_config).transpose()?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(config);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> CliResult {
    loop {
        app.tick();

        // Check for a finished preview (non-blocking)
        app.check_render_result();

        // Animate spinner while loading
        if app.is_loading {
            app.spinner_frame = (app.spinner_frame + 1) % 8;
        }

        terminal.draw(|frame| ui(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            app.should_quit = true;
                        }
                        KeyCode::Up | KeyCode::Char('k') => match app.focus {
                            Focus::Sketches => app.move_sketch(-1),
                            Focus::Params => app.move_param(-1),
                        },
                        KeyCode::Down | KeyCode::Char('j') => match app.focus {
                            Focus::Sketches => app.move_sketch(1),
                            Focus::Params => app.move_param(1),
                        },
                        KeyCode::Tab => {
                            app.focus = match app.focus {
                                Focus::Sketches => Focus::Params,
                                Focus::Params => Focus::Sketches,
                            };
                        }
                        KeyCode::Left | KeyCode::Char('h') => app.nudge(-1),
                        KeyCode::Right | KeyCode::Char('l') => app.nudge(1),
                        KeyCode::Char('[') => app.nudge(-COARSE_STEPS),
                        KeyCode::Char(']') => app.nudge(COARSE_STEPS),
                        KeyCode::Char('r') => app.regenerate(),
                        KeyCode::Char('e') => app.export(),
                        KeyCode::Char(' ') => {
                            app.paused = !app.paused;
                            app.message = if app.paused { "Paused" } else { "Running" }.to_string();
                        }
                        KeyCode::Char('v') => app.cycle_view(),
                        // Zoom controls
                        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
                        KeyCode::Char('0') => app.reset_zoom(),
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let top_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(36),
            Constraint::Min(40),
        ])
        .split(main_layout[0]);

    let sidebar_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.sketches.len() as u16 + 2),
            Constraint::Min(6),
            Constraint::Length(8),
        ])
        .split(top_layout[0]);

    let highlight = Style::default()
        .bg(Color::DarkGray)
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    // Sketch list
    let items: Vec<ListItem> = app.sketches
        .iter()
        .map(|s| ListItem::new(s.kind().name()))
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Sketches ")
            .borders(Borders::ALL)
            .border_style(focus_style(app.focus == Focus::Sketches)))
        .highlight_style(highlight)
        .highlight_symbol("► ");

    frame.render_stateful_widget(list, sidebar_layout[0], &mut app.sketch_state.clone());

    // Parameter list
    let params = app.sketch().params();
    let items: Vec<ListItem> = params
        .specs()
        .iter()
        .map(|spec| {
            let value = params.get(spec.name).map(|v| spec.format(v)).unwrap_or_default();
            ListItem::new(format!("{}: {}", spec.label, value))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Parameters ")
            .borders(Borders::ALL)
            .border_style(focus_style(app.focus == Focus::Params)))
        .highlight_style(highlight)
        .highlight_symbol("► ");

    frame.render_stateful_widget(list, sidebar_layout[1], &mut app.param_state);

    // Stats panel
    let status = app.sketch().status();
    let stats_text = format!(
        "Points: {}\nStrokes: {}\nStatus: {}{}\nRender: {:.1}ms\nZoom: {:.0}%",
        app.drawing.point_count(),
        app.drawing.stroke_count(),
        status.label(),
        if app.paused { " (paused)" } else { "" },
        app.render_ms,
        app.zoom * 100.0
    );
    let stats_color = if status.is_frozen() { Color::Red } else { Color::White };
    let stats = Paragraph::new(stats_text)
        .block(Block::default()
            .title(" Stats ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)))
        .style(Style::default().fg(stats_color))
        .wrap(Wrap { trim: true });

    frame.render_widget(stats, sidebar_layout[2]);

    // Spinner animation frames
    let spinner_chars = ['|', '/', '-', '\\', '|', '/', '-', '\\'];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let kind = app.sketch().kind();
    let image_title = if app.is_loading {
        format!(" [{}] {} ", spinner, kind.export_prefix())
    } else {
        format!(" {} ", kind.export_prefix())
    };

    let border_color = if app.is_loading { Color::Yellow } else { Color::Green };

    let image_block = Block::default()
        .title(image_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_area = image_block.inner(top_layout[1]);
    frame.render_widget(image_block, top_layout[1]);

    if let Some(ref mut image_state) = app.image_state {
        let image_widget = StatefulImage::new(None);
        frame.render_stateful_widget(image_widget, inner_area, image_state);
    }

    // Help
    let help = Paragraph::new(
        "↑↓ select  Tab sketches/params  ←→ adjust  [ ] adjust x10  r regenerate\n\
         e export  space pause  v view  +/- zoom  0 reset zoom  q quit",
    )
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default()
            .title(format!(" {} ", app.message))
            .borders(Borders::ALL));

    frame.render_widget(help, main_layout[1]);
}

fn print_usage(prog: &str) {
    eprintln!("sketchloom - generative sketches: cycloids, Lissajous figures, spirographs, moire");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} [config.yaml]                      Launch TUI", prog);
    eprintln!("  {} tui [config.yaml]                  Launch TUI", prog);
    eprintln!("  {} render <sketch> [options]          Export one sketch", prog);
    eprintln!("  {} sketches                           List sketches", prog);
    eprintln!("  {} params <sketch> [--yaml]           List parameters", prog);
    eprintln!("  {} recipe <recipe.yaml> [-o file]     Render a layered recipe", prog);
    eprintln!("  {} benchmark <sketch> [-n iterations]", prog);
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  -v, --verbose          Debug logging (otherwise RUST_LOG, default info)");
    eprintln!();
    eprintln!("Run '{} <command> --help' for command options.", prog);
    eprintln!();
    eprintln!("TUI Controls:");
    eprintln!("  ↑/↓ or j/k    Select sketch or parameter");
    eprintln!("  Tab           Switch between sketch and parameter lists");
    eprintln!("  ←/→ or h/l    Adjust parameter by one step");
    eprintln!("  [ / ]         Adjust parameter by ten steps");
    eprintln!("  r             Regenerate (restart, resample, new random field)");
    eprintln!("  e             Export SVG with a timestamped name");
    eprintln!("  space         Pause/resume the cycloid");
    eprintln!("  v             Cycle view presets (3D sketches)");
    eprintln!("  +/- and 0     Zoom, reset zoom");
    eprintln!("  q / Esc       Quit");
}
