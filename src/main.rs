use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Flex, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use scrubtime::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging::init_file_logging,
    runtime::{CrosstermEventSource, FixedTicker, PickerEvent, PickerEventSource, Runner, Ticker},
    PickerProps, TimePicker, TimePickerState, TimeValue,
};
use std::{
    error::Error,
    io::{self, stdin, Stdout},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 250;
const PICKER_HEIGHT: u16 = 7;
const PICKER_WIDTH: u16 = 60;

/// draggable time-of-day picker for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Pick a time of day by dragging the hour and minute fields left and right, clicking them to type, or scrubbing the day slider. Prints the chosen time on exit."
)]
pub struct Cli {
    /// starting time in H:mm form (defaults to the last saved time)
    #[clap(short = 't', long)]
    time: Option<String>,

    /// label shown above the picker
    #[clap(short = 'l', long)]
    label: Option<String>,

    /// render the picker disabled so it ignores all input
    #[clap(long)]
    disabled: bool,

    /// slider step in minutes
    #[clap(short = 's', long, value_parser = clap::value_parser!(u32).range(1..=1439))]
    slider_step: Option<u32>,

    /// columns of drag per unit of change (smaller is more sensitive)
    #[clap(short = 'd', long, value_parser = parse_sensitivity)]
    drag_sensitivity: Option<f64>,

    /// number of equal slider divisions (labels drawn = divisions + 1)
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=24))]
    divisions: Option<u32>,

    /// do not save the chosen time and settings on exit
    #[clap(long)]
    no_save: bool,

    /// read and write settings at this path instead of the user config dir
    #[clap(long)]
    config: Option<PathBuf>,
}

fn parse_sensitivity(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err("sensitivity must be greater than 0".to_string())
    }
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(time) = &self.time {
            cfg.value = TimeValue::parse(time).to_string();
        }
        if let Some(label) = &self.label {
            cfg.label = Some(label.clone());
        }
        if let Some(step) = self.slider_step {
            cfg.slider_step = step;
        }
        if let Some(sensitivity) = self.drag_sensitivity {
            cfg.drag_sensitivity = sensitivity;
        }
        if let Some(divisions) = self.divisions {
            cfg.divisions = divisions;
        }
        cfg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The caller side of the picker: owns the value and receives changes
#[derive(Debug)]
pub struct App {
    pub value: String,
    pub props: PickerProps,
    pub picker: TimePickerState,
    pub changes: usize,
}

impl App {
    pub fn new(cfg: &Config, disabled: bool) -> Self {
        let props = cfg.props(disabled);
        Self {
            value: TimeValue::parse(&cfg.value).to_string(),
            picker: TimePickerState::new(&props),
            props,
            changes: 0,
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let mut latest = None;
        let mut count = 0;
        self.picker
            .handle_mouse(mouse, &self.value, &self.props, &mut |v| {
                count += 1;
                latest = Some(v);
            });
        self.accept(latest, count);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        let mut latest = None;
        let mut count = 0;
        let used = self
            .picker
            .handle_key(key, &self.value, &self.props, &mut |v| {
                count += 1;
                latest = Some(v);
            });
        self.accept(latest, count);
        if used {
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Flow::Quit,
            KeyCode::Esc | KeyCode::Char('q') => Flow::Quit,
            KeyCode::Char('x') => {
                self.props.disabled = !self.props.disabled;
                if self.props.disabled {
                    self.picker.abort();
                }
                info!(disabled = self.props.disabled, "picker toggled");
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn accept(&mut self, latest: Option<String>, count: usize) {
        if let Some(value) = latest {
            self.value = value;
            self.changes += count;
        }
    }
}

/// Raw mode, alternate screen and mouse capture for the life of the value;
/// dropping it restores the terminal on every exit path.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = init_file_logging(&path) {
            eprintln!("scrubtime: logging disabled: {err}");
        }
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let cfg = cli.apply(store.load());
    info!(value = %cfg.value, "starting picker");

    let mut app = App::new(&cfg, cli.disabled);
    {
        let mut session = TerminalSession::enter()?;
        let runner = Runner::new(
            CrosstermEventSource::new(),
            FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
        );
        start_tui(&mut session.terminal, &mut app, &runner)?;
    }

    if !cli.no_save {
        let saved = Config {
            value: app.value.clone(),
            ..cfg
        };
        if let Err(err) = store.save(&saved) {
            warn!(%err, "could not save config");
        }
    }
    info!(value = %app.value, changes = app.changes, "picker closed");
    println!("{}", app.value);

    Ok(())
}

fn start_tui<B: Backend, E: PickerEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> io::Result<()> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            PickerEvent::Tick => continue,
            PickerEvent::Closed => {
                warn!("input closed, ending session");
                break;
            }
            PickerEvent::Resize => {}
            PickerEvent::Mouse(mouse) => app.on_mouse(mouse),
            PickerEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),             // Title
            Constraint::Length(PICKER_HEIGHT), // Picker
            Constraint::Length(2),             // Value
            Constraint::Min(0),
            Constraint::Length(3), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "scrubtime",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .flex(Flex::Center)
        .constraints([Constraint::Length(PICKER_WIDTH.min(rows[1].width))])
        .split(rows[1]);
    let title = if app.props.disabled { "Time (locked)" } else { "Time" };
    let picker = TimePicker::new(&app.value, &app.props)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_stateful_widget(picker, columns[0], &mut app.picker);

    let value_line = Line::from(vec![
        Span::styled("Value: ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            app.value.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(
        Paragraph::new(value_line).alignment(Alignment::Center),
        rows[2],
    );

    let instructions = Paragraph::new("drag hours/minutes left-right | click or type digits to edit, (enter) commit, (esc) cancel\n(tab) focus | ↑/↓ step field | ←/→ step slider | (x) toggle lock | (q)uit")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, rows[4]);
}
