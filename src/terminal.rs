//! Raw-mode terminal for the host console.
//!
//! [`init`] hands out a [`ConsoleTerminal`] that puts the terminal back in
//! cooked mode when dropped, so an error returned through `?` from the
//! console loop still leaves the host's shell usable.

use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    ExecutableCommand,
    cursor::Show,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

/// The console's terminal, restored on drop.
pub struct ConsoleTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    guard: RestoreGuard,
}

impl ConsoleTerminal {
    pub fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Leave raw mode now and report any failure.
    pub fn restore(self) -> io::Result<()> {
        let ConsoleTerminal { terminal, guard } = self;
        drop(terminal);
        guard.finish()
    }
}

/// Enter raw mode and the alternate screen. A panic restores the terminal
/// before the default hook prints.
pub fn init() -> io::Result<ConsoleTerminal> {
    setup_panic_hook();
    enable_raw_mode()?;
    let guard = RestoreGuard::new(restore);
    io::stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    Ok(ConsoleTerminal { terminal, guard })
}

pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?.execute(Show)?;
    Ok(())
}

fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

/// Runs `leave` exactly once: on [`RestoreGuard::finish`] or on drop.
struct RestoreGuard {
    leave: fn() -> io::Result<()>,
    armed: bool,
}

impl RestoreGuard {
    fn new(leave: fn() -> io::Result<()>) -> Self {
        Self { leave, armed: true }
    }

    fn finish(mut self) -> io::Result<()> {
        self.armed = false;
        (self.leave)()
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = (self.leave)();
        }
    }
}
