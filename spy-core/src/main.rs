//! src/main.rs
//! Terminal navigator for bulk audio library operations

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{Event as TerminalEvent, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::{sync::mpsc, time::Interval};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use spy_core::{
    Logger,
    audio::{AudioBackend, ffmpeg::FfmpegBackend},
    config::Config,
    controller::{Action, Workflow, map_key},
    fs::{FileSystemOps, LocalFileSystem},
    model::Mode,
    tasks::BatchEvent,
    view::{Palette, UIRenderer},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    // Config first so the logger knows where to write
    let (config, config_error) = match Config::load().await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _guard: WorkerGuard =
        Logger::init_tracing(&config.logging).context("Failed to initialize logging")?;
    if let Some(e) = config_error {
        warn!("Failed to load config, using defaults: {e:#}");
    }

    setup_panic_handler();

    let app = App::new(config).context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    workflow: Workflow,
    batch_rx: mpsc::Receiver<BatchEvent>,
    ui_renderer: UIRenderer,
    tick_rate: Duration,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        let start_dir: PathBuf = start_directory()?;
        info!(marker = "APP_START", root = %start_dir.display(), "Starting navigator");

        let fs: Arc<dyn FileSystemOps> = Arc::new(LocalFileSystem);
        let audio: Arc<dyn AudioBackend> = Arc::new(FfmpegBackend::new(&config.audio));
        let (batch_tx, batch_rx) = mpsc::channel::<BatchEvent>(config.batch.channel_capacity.max(1));

        let workflow: Workflow = Workflow::new(&config, fs, audio, start_dir.clone(), batch_tx)
            .with_context(|| format!("Failed to open {}", start_dir.display()))?;

        let terminal: AppTerminal = setup_terminal().context("Failed to initialize terminal")?;

        Ok(Self {
            terminal,
            workflow,
            batch_rx,
            ui_renderer: UIRenderer::new(Palette::for_theme(config.theme)),
            tick_rate: config.tick_rate,
        })
    }

    async fn run(mut self) -> Result<()> {
        let mut event_stream: EventStream = EventStream::new();
        let mut ticker: Interval = tokio::time::interval(self.tick_rate);

        let size = self.terminal.size().context("Failed to read terminal size")?;
        self.workflow.handle(Action::Resize(size.width, size.height));

        loop {
            self.render()?;

            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            if let Some(action) = translate(event, self.workflow.mode()) {
                                debug!(?action, "Dispatching action");
                                self.workflow.handle(action);
                            }
                        }
                        Some(Err(e)) => warn!("Terminal event error: {e}"),
                        None => {
                            info!("Terminal event stream closed");
                            break;
                        }
                    }
                }

                Some(event) = self.batch_rx.recv() => {
                    self.workflow.on_batch_event(event);
                }

                _ = ticker.tick() => {
                    self.workflow.handle(Action::Tick);
                }
            }

            if self.workflow.should_quit() {
                info!("Quit requested");
                break;
            }
        }

        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let workflow: &Workflow = &self.workflow;
        let renderer: &mut UIRenderer = &mut self.ui_renderer;
        self.terminal
            .draw(|frame: &mut Frame<'_>| renderer.render(frame, workflow))
            .context("Failed to draw terminal")?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn translate(event: TerminalEvent, mode: Mode) -> Option<Action> {
    match event {
        TerminalEvent::Key(key) => map_key(key, mode),
        TerminalEvent::Resize(width, height) => Some(Action::Resize(width, height)),
        _ => None,
    }
}

/// First CLI argument, or the working directory.
fn start_directory() -> Result<PathBuf> {
    let raw: PathBuf = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    let dir: PathBuf = std::fs::canonicalize(&raw)
        .with_context(|| format!("Cannot open {}", raw.display()))?;
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());
    Ok(dir)
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
