//! Reviewflow Dashboard - interactive flow explorer
//!
//! Loads the derived tables once, then answers every interaction
//! synchronously: toggling a period bucket rebuilds the flow diagram,
//! selecting a flow row computes the feature detail card.
//!
//! Usage:
//!   reviewflow-dash [--data-dir data] [--features path/to/Features1.csv]
//!
//! Keys:
//!   Tab        switch between the period and flow panels
//!   Up/Down    move the cursor
//!   Space      toggle the highlighted period
//!   Enter      show details for the highlighted flow's feature
//!   q / Esc    quit

mod panels;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use panels::{DetailPanel, FilterPanel, FlowPanel};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use reviewflow_core::{
    config::PipelineConfig,
    presenter::{FilterSelection, FlowDiagram, Presenter},
};
use std::{io, path::PathBuf, time::Duration};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Dashboard CLI arguments
#[derive(Parser)]
#[command(name = "reviewflow-dash")]
#[command(about = "Interactive flow explorer over reviewflow artifacts")]
#[command(version)]
struct Args {
    /// Directory holding the derived artifacts
    #[arg(long, env = "REVIEWFLOW_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// App features reference CSV; defaults to Features1.csv inside the
    /// data directory
    #[arg(long)]
    features: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Which panel owns the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Filters,
    Flows,
}

/// Application state
struct App {
    presenter: Presenter,
    filter_panel: FilterPanel,
    flow_panel: FlowPanel,
    detail_panel: DetailPanel,
    diagram: FlowDiagram,
    focus: Focus,
}

impl App {
    fn new(presenter: Presenter) -> Self {
        let filter_panel = FilterPanel::new(presenter.available_filters());
        let diagram = presenter.flow_diagram(&filter_panel.selection());
        Self {
            presenter,
            filter_panel,
            flow_panel: FlowPanel::new(),
            detail_panel: DetailPanel::new(),
            diagram,
            focus: Focus::Filters,
        }
    }

    /// Recompute the diagram after a filter change.
    fn refresh_diagram(&mut self) {
        self.diagram = self.presenter.flow_diagram(&self.filter_panel.selection());
        self.flow_panel.clamp(self.diagram.links.len());
        debug!(
            "Diagram refreshed: {} links for {:?}",
            self.diagram.links.len(),
            self.filter_panel.selection()
        );
    }

    /// Detail query for the highlighted flow row.
    fn show_detail(&mut self) {
        let Some(link) = self.diagram.links.get(self.flow_panel.cursor) else {
            return;
        };
        let selection = match self.filter_panel.selection().as_slice() {
            [] => return,
            [single] => FilterSelection::Scalar(single.clone()),
            many => FilterSelection::List(many.to_vec()),
        };
        let detail = self
            .presenter
            .feature_detail(&link.feature_title, &selection);
        self.detail_panel.update(detail);
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Filters => Focus::Flows,
                    Focus::Flows => Focus::Filters,
                };
            }
            KeyCode::Up => match self.focus {
                Focus::Filters => self.filter_panel.move_cursor(-1),
                Focus::Flows => self.flow_panel.move_cursor(-1, self.diagram.links.len()),
            },
            KeyCode::Down => match self.focus {
                Focus::Filters => self.filter_panel.move_cursor(1),
                Focus::Flows => self.flow_panel.move_cursor(1, self.diagram.links.len()),
            },
            KeyCode::Char(' ') => {
                if self.focus == Focus::Filters {
                    self.filter_panel.toggle_current();
                    self.refresh_diagram();
                }
            }
            KeyCode::Enter => {
                if self.focus == Focus::Flows {
                    self.show_detail();
                }
            }
            _ => {}
        }
        false
    }
}

/// Features table to load: an explicit path wins, otherwise look next to
/// the derived artifacts.
fn features_path(args: &Args) -> PathBuf {
    args.features
        .clone()
        .unwrap_or_else(|| args.data_dir.join("Features1.csv"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Log to a file so the TUI stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reviewflow_dash={}", args.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(|| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("/tmp/reviewflow-dash.log")
                .expect("open dashboard log file")
        })
        .with_ansi(false)
        .init();

    debug!("Dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let config = PipelineConfig {
        features: features_path(&args),
        data_dir: args.data_dir.clone(),
        ..PipelineConfig::default()
    };
    let presenter = Presenter::load(&config)?;
    let mut app = App::new(presenter);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("Error: {:?}", err);
        return Err(err);
    }

    debug!("Dashboard exiting cleanly");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            let main_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(1),
                ])
                .split(f.area());

            let header = Paragraph::new("Reviewflow — Feature → Review Cluster Flows")
                .style(Style::default().fg(Color::Cyan))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(header, main_chunks[0]);

            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(22),
                    Constraint::Percentage(50),
                    Constraint::Min(30),
                ])
                .split(main_chunks[1]);

            app.filter_panel
                .render(f, body[0], app.focus == Focus::Filters);
            app.flow_panel
                .render(f, body[1], &app.diagram, app.focus == Focus::Flows);
            app.detail_panel.render(f, body[2]);

            let footer = Paragraph::new(
                "Tab: switch panel | Space: toggle period | Enter: feature detail | q: quit",
            )
            .style(Style::default().fg(Color::Gray));
            f.render_widget(footer, main_chunks[2]);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
