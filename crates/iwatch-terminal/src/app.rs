//! Refresh scheduler: run, render, wait for a key or the next deadline.

use crate::direct::{CellBuffer, DiffRenderer};
use crate::error::WatchError;
use crate::help::paint_help;
use crate::highlight::paint_frame;
use crate::input::{InputEvent, InputHandler};
use crate::runner;
use crate::status::paint_header;
use crossterm::{
    cursor,
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use iwatch_core::{KbdResult, Key, Viewport, WatchContext};
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Terminal abstraction for testability.
pub trait Terminal {
    /// Enter raw mode and alternate screen.
    fn enter(&mut self) -> Result<(), WatchError>;
    /// Leave alternate screen and raw mode.
    fn leave(&mut self) -> Result<(), WatchError>;
    /// Get terminal size (width, height).
    fn size(&self) -> Result<(u16, u16), WatchError>;
    /// Poll for events with timeout.
    fn poll(&self, timeout: Duration) -> Result<bool, WatchError>;
    /// Read the next event.
    fn read_event(&self) -> Result<CrosstermEvent, WatchError>;
    /// Flush output.
    fn flush(
        &mut self,
        buffer: &mut CellBuffer,
        renderer: &mut DiffRenderer,
    ) -> Result<(), WatchError>;
    /// Erase the whole screen.
    fn clear(&mut self) -> Result<(), WatchError>;
    /// Ring the bell.
    fn bell(&mut self) -> Result<(), WatchError>;
}

/// Backend trait for raw terminal operations (crossterm calls).
/// This layer exists purely for testability.
pub trait TerminalBackend {
    fn enable_raw_mode(&mut self) -> Result<(), WatchError>;
    fn disable_raw_mode(&mut self) -> Result<(), WatchError>;
    fn enter_alternate_screen(&mut self) -> Result<(), WatchError>;
    fn leave_alternate_screen(&mut self) -> Result<(), WatchError>;
    fn hide_cursor(&mut self) -> Result<(), WatchError>;
    fn show_cursor(&mut self) -> Result<(), WatchError>;
    fn size(&self) -> Result<(u16, u16), WatchError>;
    fn poll(&self, timeout: Duration) -> Result<bool, WatchError>;
    fn read_event(&self) -> Result<CrosstermEvent, WatchError>;
    fn write_flush(
        &mut self,
        buffer: &mut CellBuffer,
        renderer: &mut DiffRenderer,
    ) -> Result<(), WatchError>;
    fn clear_screen(&mut self) -> Result<(), WatchError>;
    fn write_bell(&mut self) -> Result<(), WatchError>;
}

/// Real crossterm backend.
pub struct CrosstermBackend {
    stdout: Stdout,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enable_raw_mode(&mut self) -> Result<(), WatchError> {
        enable_raw_mode()?;
        Ok(())
    }
    fn disable_raw_mode(&mut self) -> Result<(), WatchError> {
        let _ = disable_raw_mode();
        Ok(())
    }
    fn enter_alternate_screen(&mut self) -> Result<(), WatchError> {
        execute!(self.stdout, EnterAlternateScreen, Clear(ClearType::All))?;
        Ok(())
    }
    fn leave_alternate_screen(&mut self) -> Result<(), WatchError> {
        let _ = execute!(self.stdout, LeaveAlternateScreen);
        Ok(())
    }
    fn hide_cursor(&mut self) -> Result<(), WatchError> {
        execute!(self.stdout, cursor::Hide)?;
        Ok(())
    }
    fn show_cursor(&mut self) -> Result<(), WatchError> {
        let _ = execute!(self.stdout, cursor::Show);
        Ok(())
    }
    fn size(&self) -> Result<(u16, u16), WatchError> {
        crossterm::terminal::size().map_err(|_| WatchError::TerminalNotAvailable)
    }
    fn poll(&self, timeout: Duration) -> Result<bool, WatchError> {
        Ok(event::poll(timeout)?)
    }
    fn read_event(&self) -> Result<CrosstermEvent, WatchError> {
        Ok(event::read()?)
    }
    fn write_flush(
        &mut self,
        buffer: &mut CellBuffer,
        renderer: &mut DiffRenderer,
    ) -> Result<(), WatchError> {
        renderer.flush(buffer, &mut self.stdout)?;
        self.stdout.flush()?;
        Ok(())
    }
    fn clear_screen(&mut self) -> Result<(), WatchError> {
        execute!(self.stdout, Clear(ClearType::All))?;
        Ok(())
    }
    fn write_bell(&mut self) -> Result<(), WatchError> {
        self.stdout.write_all(b"\x07")?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Testable backend with generic writer for capturing escape sequences.
/// This backend allows testing terminal output without a real TTY.
///
/// `poll` reports an event whenever one is queued. Once the queue runs dry
/// the optional idle flag is raised, which lets a scheduler under test shut
/// down the same way it would on SIGTERM.
pub struct TestableBackend<W: Write> {
    writer: W,
    size: (u16, u16),
    raw_mode: bool,
    alternate_screen: bool,
    cursor_hidden: bool,
    bells: usize,
    events: std::cell::RefCell<std::collections::VecDeque<CrosstermEvent>>,
    idle_flag: Option<Arc<AtomicBool>>,
}

impl<W: Write> TestableBackend<W> {
    /// Create a new testable backend with the given writer and size.
    pub fn new(writer: W, width: u16, height: u16) -> Self {
        Self {
            writer,
            size: (width, height),
            raw_mode: false,
            alternate_screen: false,
            cursor_hidden: false,
            bells: 0,
            events: std::cell::RefCell::new(std::collections::VecDeque::new()),
            idle_flag: None,
        }
    }

    /// Queue events to be returned by `read_event`.
    pub fn with_events(self, events: Vec<CrosstermEvent>) -> Self {
        *self.events.borrow_mut() = events.into_iter().collect();
        self
    }

    /// Raise `flag` when `poll` finds no queued event.
    pub fn with_idle_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.idle_flag = Some(flag);
        self
    }

    /// Check if raw mode was enabled.
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode
    }

    /// Check if alternate screen was entered.
    pub fn is_alternate_screen(&self) -> bool {
        self.alternate_screen
    }

    /// Check if cursor is hidden.
    pub fn is_cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    /// Number of bells rung.
    pub fn bells(&self) -> usize {
        self.bells
    }

    /// Get the underlying writer (consumes self).
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TerminalBackend for TestableBackend<W> {
    fn enable_raw_mode(&mut self) -> Result<(), WatchError> {
        self.raw_mode = true;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<(), WatchError> {
        self.raw_mode = false;
        Ok(())
    }

    fn enter_alternate_screen(&mut self) -> Result<(), WatchError> {
        self.alternate_screen = true;
        // Write the actual escape sequence for testing
        execute!(self.writer, EnterAlternateScreen)?;
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> Result<(), WatchError> {
        self.alternate_screen = false;
        let _ = execute!(self.writer, LeaveAlternateScreen);
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<(), WatchError> {
        self.cursor_hidden = true;
        execute!(self.writer, cursor::Hide)?;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<(), WatchError> {
        self.cursor_hidden = false;
        let _ = execute!(self.writer, cursor::Show);
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16), WatchError> {
        Ok(self.size)
    }

    fn poll(&self, _timeout: Duration) -> Result<bool, WatchError> {
        let ready = !self.events.borrow().is_empty();
        if !ready {
            if let Some(flag) = &self.idle_flag {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(ready)
    }

    fn read_event(&self) -> Result<CrosstermEvent, WatchError> {
        self.events.borrow_mut().pop_front().ok_or_else(|| {
            WatchError::Io(io::Error::new(io::ErrorKind::WouldBlock, "no events"))
        })
    }

    fn write_flush(
        &mut self,
        buffer: &mut CellBuffer,
        renderer: &mut DiffRenderer,
    ) -> Result<(), WatchError> {
        renderer.flush(buffer, &mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<(), WatchError> {
        execute!(self.writer, Clear(ClearType::All))?;
        Ok(())
    }

    fn write_bell(&mut self) -> Result<(), WatchError> {
        self.bells += 1;
        self.writer.write_all(b"\x07")?;
        Ok(())
    }
}

/// Generic terminal implementation using a backend.
pub struct GenericTerminal<B: TerminalBackend> {
    backend: B,
}

impl<B: TerminalBackend> GenericTerminal<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Recover the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: TerminalBackend> Terminal for GenericTerminal<B> {
    fn enter(&mut self) -> Result<(), WatchError> {
        self.backend.enable_raw_mode()?;
        self.backend.enter_alternate_screen()?;
        self.backend.hide_cursor()?;
        Ok(())
    }

    fn leave(&mut self) -> Result<(), WatchError> {
        self.backend.show_cursor()?;
        self.backend.leave_alternate_screen()?;
        self.backend.disable_raw_mode()?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16), WatchError> {
        self.backend.size()
    }

    fn poll(&self, timeout: Duration) -> Result<bool, WatchError> {
        self.backend.poll(timeout)
    }

    fn read_event(&self) -> Result<CrosstermEvent, WatchError> {
        self.backend.read_event()
    }

    fn flush(
        &mut self,
        buffer: &mut CellBuffer,
        renderer: &mut DiffRenderer,
    ) -> Result<(), WatchError> {
        self.backend.write_flush(buffer, renderer)
    }

    fn clear(&mut self) -> Result<(), WatchError> {
        self.backend.clear_screen()
    }

    fn bell(&mut self) -> Result<(), WatchError> {
        self.backend.write_bell()
    }
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn enter(&mut self) -> Result<(), WatchError> {
        (**self).enter()
    }
    fn leave(&mut self) -> Result<(), WatchError> {
        (**self).leave()
    }
    fn size(&self) -> Result<(u16, u16), WatchError> {
        (**self).size()
    }
    fn poll(&self, timeout: Duration) -> Result<bool, WatchError> {
        (**self).poll(timeout)
    }
    fn read_event(&self) -> Result<CrosstermEvent, WatchError> {
        (**self).read_event()
    }
    fn flush(
        &mut self,
        buffer: &mut CellBuffer,
        renderer: &mut DiffRenderer,
    ) -> Result<(), WatchError> {
        (**self).flush(buffer, renderer)
    }
    fn clear(&mut self) -> Result<(), WatchError> {
        (**self).clear()
    }
    fn bell(&mut self) -> Result<(), WatchError> {
        (**self).bell()
    }
}

/// Convenience alias for crossterm-backed terminal.
pub type CrosstermTerminal = GenericTerminal<CrosstermBackend>;

/// Restore the terminal before the default panic message is printed.
pub fn install_panic_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        prev_hook(info);
    }));
}

/// Default input polling slice in milliseconds.
pub const DEFAULT_TICK_RATE_MS: u64 = 250;

/// Configuration for the scheduler loop.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Longest single terminal poll, so the shutdown flag is seen promptly.
    pub tick_rate_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
        }
    }
}

/// Counters kept across a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Command executions.
    pub refreshes: u64,
    /// Screens rendered.
    pub renders: u64,
    /// Bells rung.
    pub bells: u64,
    /// Keys handed to the interpreter.
    pub keys: u64,
}

/// How long the next poll may block.
///
/// Returns `None` once the refresh deadline has passed. While paused there
/// is no deadline and the result is always one tick.
pub fn poll_timeout(
    now: Instant,
    refreshed_at: Instant,
    interval: Duration,
    paused: bool,
    tick: Duration,
) -> Option<Duration> {
    if paused {
        return Some(tick);
    }
    let deadline = refreshed_at + interval;
    if now >= deadline {
        None
    } else {
        Some((deadline - now).min(tick))
    }
}

/// Why the wait step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Key(Key),
    Resize,
    Timeout,
    Shutdown,
}

/// The watch application.
pub struct App {
    ctx: WatchContext,
    config: TuiConfig,
    input_handler: InputHandler,
    shutdown: Arc<AtomicBool>,
    stats: RunStats,
}

/// Internal app runner that accepts a Terminal implementation.
struct AppRunner<'a, T: Terminal> {
    app: &'a mut App,
    terminal: T,
    buffer: CellBuffer,
    renderer: DiffRenderer,
    refreshed_at: Instant,
}

impl<T: Terminal> AppRunner<'_, T> {
    fn run_loop(&mut self) -> Result<(), WatchError> {
        'refresh: loop {
            if self.app.shutdown_requested() {
                info!("shutdown requested");
                return Ok(());
            }
            self.refresh()?;

            'render: loop {
                self.render()?;

                loop {
                    let key = match self.wait()? {
                        Wake::Shutdown => {
                            info!("shutdown requested");
                            return Ok(());
                        }
                        Wake::Timeout => continue 'refresh,
                        Wake::Resize => continue 'render,
                        Wake::Key(key) => key,
                    };

                    self.app.stats.keys += 1;
                    let result = self.app.ctx.state.interpret(key, self.viewport());
                    trace!(?key, ?result, "key");

                    match result {
                        KbdResult::Update => continue 'refresh,
                        KbdResult::Redraw => continue 'render,
                        KbdResult::NoTouch => {}
                        KbdResult::Error => self.bell()?,
                        KbdResult::Help => {
                            if !self.show_help()? {
                                return Ok(());
                            }
                            continue 'render;
                        }
                        KbdResult::Clear => {
                            self.terminal.clear()?;
                            self.renderer.reset();
                            continue 'render;
                        }
                        KbdResult::Quit => return Ok(()),
                    }
                }
            }
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.buffer.width(), self.buffer.height())
    }

    fn refresh(&mut self) -> Result<(), WatchError> {
        let ctx = &mut self.app.ctx;
        let frame = ctx.frames.advance();
        let capture = runner::capture(&ctx.command, frame)?;
        ctx.state.mark_updated(capture.finished);
        self.refreshed_at = Instant::now();
        self.app.stats.refreshes += 1;
        debug!(
            lines = capture.lines,
            status = %capture.status,
            refresh = self.app.stats.refreshes,
            "refreshed"
        );
        Ok(())
    }

    fn render(&mut self) -> Result<(), WatchError> {
        let (width, height) = self.terminal.size()?;
        if width != self.buffer.width() || height != self.buffer.height() {
            debug!(width, height, "resize");
            self.buffer.resize(width, height);
            self.terminal.clear()?;
            self.renderer.reset();
        }

        let ctx = &self.app.ctx;
        self.buffer.clear();
        paint_header(&mut self.buffer, &ctx.state, &ctx.command);
        paint_frame(
            &mut self.buffer,
            ctx.frames.current(),
            ctx.frames.previous(),
            &ctx.state,
        );
        self.terminal.flush(&mut self.buffer, &mut self.renderer)?;
        self.app.stats.renders += 1;
        Ok(())
    }

    fn bell(&mut self) -> Result<(), WatchError> {
        debug!("bell");
        self.app.stats.bells += 1;
        self.terminal.bell()
    }

    /// Show the overlay until any key. Returns `false` on shutdown.
    fn show_help(&mut self) -> Result<bool, WatchError> {
        if !paint_help(&mut self.buffer) {
            self.bell()?;
            return Ok(true);
        }
        self.terminal.flush(&mut self.buffer, &mut self.renderer)?;

        let tick = self.app.tick();
        loop {
            if self.app.shutdown_requested() {
                return Ok(false);
            }
            if !self.poll(tick)? {
                continue;
            }
            if self.read()?.is_some() {
                return Ok(true);
            }
        }
    }

    fn wait(&mut self) -> Result<Wake, WatchError> {
        let tick = self.app.tick();
        loop {
            if self.app.shutdown_requested() {
                return Ok(Wake::Shutdown);
            }
            let state = &self.app.ctx.state;
            let Some(timeout) = poll_timeout(
                Instant::now(),
                self.refreshed_at,
                Duration::from_secs(u64::from(state.interval())),
                state.is_paused(),
                tick,
            ) else {
                return Ok(Wake::Timeout);
            };

            if !self.poll(timeout)? {
                continue;
            }
            match self.read()? {
                Some(InputEvent::Key(key)) => return Ok(Wake::Key(key)),
                Some(InputEvent::Resize { .. }) => return Ok(Wake::Resize),
                None => {}
            }
        }
    }

    /// Poll, treating an interrupted call as "nothing yet".
    fn poll(&self, timeout: Duration) -> Result<bool, WatchError> {
        match self.terminal.poll(timeout) {
            Err(e) if e.is_interrupted() => Ok(false),
            other => other,
        }
    }

    fn read(&self) -> Result<Option<InputEvent>, WatchError> {
        match self.terminal.read_event() {
            Ok(event) => Ok(self.app.input_handler.convert(event)),
            Err(e) if e.is_interrupted() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl App {
    /// Create an application for the given context.
    ///
    /// `shutdown` is checked at the top of every cycle and between polls;
    /// raising it ends the session cleanly.
    pub fn new(ctx: WatchContext, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            ctx,
            config: TuiConfig::default(),
            input_handler: InputHandler::new(),
            shutdown,
            stats: RunStats::default(),
        }
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: TuiConfig) -> Self {
        self.config = config;
        self
    }

    /// The watch context.
    pub fn context(&self) -> &WatchContext {
        &self.ctx
    }

    /// Session counters.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Request the application to stop at its next check.
    pub fn quit(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn tick(&self) -> Duration {
        Duration::from_millis(self.config.tick_rate_ms.max(1))
    }

    /// Run the application (blocking).
    pub fn run(&mut self) -> Result<(), WatchError> {
        let backend = CrosstermBackend::new();
        let terminal = GenericTerminal::new(backend);
        self.run_with_terminal(terminal)
    }

    /// Run the application with a custom terminal implementation.
    /// This is the testable entry point.
    ///
    /// The terminal is always restored before returning, including when the
    /// session ends in an error.
    pub fn run_with_terminal<T: Terminal>(&mut self, mut terminal: T) -> Result<(), WatchError> {
        terminal.enter()?;

        let (width, height) = match terminal.size() {
            Ok(size) => size,
            Err(e) => {
                let _ = terminal.leave();
                return Err(e);
            }
        };

        let mut runner = AppRunner {
            app: self,
            terminal,
            buffer: CellBuffer::new(width, height),
            renderer: DiffRenderer::new(),
            refreshed_at: Instant::now(),
        };

        let result = runner.run_loop();
        let left = runner.terminal.leave();
        result?;
        left
    }
}
