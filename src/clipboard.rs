//! Copying snippets to the system clipboard, and the "copied!" acknowledgment
//! that clears itself after a short delay.
//!
//! Copying is best effort. A failed write is logged and otherwise ignored: the
//! snippet is still on screen and can be copied by hand.

use crossbeam_channel::{RecvTimeoutError, Sender};
use std::fmt;
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long the acknowledgment stays up by default.
pub const DEFAULT_ACK_DELAY: Duration = Duration::from_millis(2000);

/// A write-only text sink.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// A program that reads text on stdin and puts it on the clipboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CopyCommand {
    pub fn new(program: &str, args: &[&str]) -> CopyCommand {
        CopyCommand {
            program: program.to_owned(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn run(&self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits early closes the pipe; its exit status
            // says more than the broken pipe does.
            match stdin.write_all(text.as_bytes()) {
                Err(err) if err.kind() != io::ErrorKind::BrokenPipe => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err.into());
                }
                _ => {}
            }
        }
        let status = child.wait()?;
        match status.success() {
            true => Ok(()),
            false => Err(ClipboardError::Failed {
                program: self.program.clone(),
                status,
            }),
        }
    }
}

/// Writes to the clipboard through the first copy program that's installed.
#[derive(Clone, Debug)]
pub struct CommandClipboard {
    commands: Vec<CopyCommand>,
}

impl CommandClipboard {
    pub fn with_commands(commands: Vec<CopyCommand>) -> CommandClipboard {
        CommandClipboard { commands }
    }
}

impl Default for CommandClipboard {
    /// Wayland, X11 (two flavors), macOS, then Windows/WSL.
    fn default() -> Self {
        CommandClipboard::with_commands(vec![
            CopyCommand::new("wl-copy", &[]),
            CopyCommand::new("xclip", &["-selection", "clipboard"]),
            CopyCommand::new("xsel", &["--clipboard", "--input"]),
            CopyCommand::new("pbcopy", &[]),
            CopyCommand::new("clip.exe", &[]),
        ])
    }
}

impl Clipboard for CommandClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        for command in &self.commands {
            match command.run(text) {
                Err(ClipboardError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!("`{}` isn't installed", command.program);
                }
                result => return result,
            }
        }
        Err(ClipboardError::Unavailable)
    }
}

/// Keeps written text in memory. Useful headless and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    /// Every text written, oldest first.
    pub writes: Vec<String>,

    /// When set, every write fails with [`ClipboardError::Unavailable`].
    pub failing: bool,
}

impl MemoryClipboard {
    pub fn failing() -> MemoryClipboard {
        MemoryClipboard {
            writes: Vec::new(),
            failing: true,
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.failing {
            return Err(ClipboardError::Unavailable);
        }
        self.writes.push(text.to_owned());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Ack {
    copied: bool,

    /// Bumped on every copy so a stale timer can tell it has been superseded.
    generation: u64,
}

/// The "copied!" flag. [`CopyIndicator::copied`] raises it and (re)starts a
/// timer that lowers it after the delay. A copy while the timer is pending
/// replaces the pending reset rather than adding another one. A single
/// background thread serves all resets and exits when the indicator is
/// dropped.
pub struct CopyIndicator {
    ack: Arc<Mutex<Ack>>,
    arm: Option<Sender<u64>>,
    timer: Option<JoinHandle<()>>,
}

impl CopyIndicator {
    pub fn new(delay: Duration) -> CopyIndicator {
        let ack = Arc::new(Mutex::new(Ack::default()));
        let (arm, armed) = crossbeam_channel::unbounded::<u64>();
        let timer_ack = Arc::clone(&ack);
        let timer = thread::spawn(move || {
            let mut pending: Option<(Instant, u64)> = None;
            loop {
                let received = match pending {
                    Some((deadline, _)) => armed.recv_deadline(deadline),
                    None => armed.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };
                match received {
                    Ok(generation) => pending = Some((Instant::now() + delay, generation)),
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some((_, generation)) = pending.take() {
                            let mut ack = lock(&timer_ack);
                            if ack.generation == generation {
                                ack.copied = false;
                            }
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });
        CopyIndicator {
            ack,
            arm: Some(arm),
            timer: Some(timer),
        }
    }

    /// Raises the flag and schedules its reset, cancelling any pending one.
    pub fn copied(&self) {
        let generation = {
            let mut ack = lock(&self.ack);
            ack.copied = true;
            ack.generation += 1;
            ack.generation
        };
        if let Some(arm) = &self.arm {
            // The timer only goes away with `self`.
            let _ = arm.send(generation);
        }
    }

    pub fn is_copied(&self) -> bool {
        lock(&self.ack).copied
    }
}

impl Default for CopyIndicator {
    fn default() -> Self {
        CopyIndicator::new(DEFAULT_ACK_DELAY)
    }
}

impl Drop for CopyIndicator {
    fn drop(&mut self) {
        drop(self.arm.take());
        if let Some(timer) = self.timer.take() {
            let _ = timer.join();
        }
    }
}

impl fmt::Debug for CopyIndicator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CopyIndicator")
            .field("copied", &self.is_copied())
            .finish()
    }
}

fn lock(ack: &Mutex<Ack>) -> MutexGuard<'_, Ack> {
    match ack.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Writes `text` to `clipboard` and raises `indicator` on success. A failure
/// is logged and reported as `false`; it's never fatal.
pub fn copy_snippet<B: Clipboard + ?Sized>(clipboard: &mut B, indicator: &CopyIndicator, text: &str) -> bool {
    match clipboard.write_text(text) {
        Ok(()) => {
            indicator.copied();
            true
        }
        Err(err) => {
            tracing::warn!("Failed to copy: {}", err);
            false
        }
    }
}

/// Represents a failed clipboard write.
#[derive(Debug)]
pub enum ClipboardError {
    /// Returned when no clipboard is reachable.
    Unavailable,

    /// Returned when the copy program exits unsuccessfully.
    Failed { program: String, status: ExitStatus },

    /// Returned for I/O errors talking to the copy program.
    Io(io::Error),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClipboardError::Unavailable => write!(f, "no clipboard available"),
            ClipboardError::Failed { program, status } => write!(f, "`{}` failed: {}", program, status),
            ClipboardError::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ClipboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClipboardError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ClipboardError {
    /// Converts an [`io::Error`] into a [`ClipboardError`] so we can use `?`
    /// while driving the copy program.
    fn from(err: io::Error) -> ClipboardError {
        ClipboardError::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_copy_snippet_success() {
        let mut clipboard = MemoryClipboard::default();
        let indicator = CopyIndicator::new(Duration::from_secs(60));
        assert!(copy_snippet(&mut clipboard, &indicator, "{ id: 'a' }"));
        assert_eq!(Some("{ id: 'a' }"), clipboard.last());
        assert!(indicator.is_copied());
    }

    #[test]
    fn test_copy_snippet_failure_leaves_indicator_down() {
        let mut clipboard = MemoryClipboard::failing();
        let indicator = CopyIndicator::new(Duration::from_secs(60));
        assert!(!copy_snippet(&mut clipboard, &indicator, "text"));
        assert!(clipboard.writes.is_empty());
        assert!(!indicator.is_copied());
    }

    #[test]
    fn test_indicator_resets_after_delay() {
        let indicator = CopyIndicator::new(Duration::from_millis(100));
        indicator.copied();
        assert!(indicator.is_copied());
        thread::sleep(Duration::from_millis(400));
        assert!(!indicator.is_copied());
    }

    #[test]
    fn test_recopy_replaces_pending_reset() {
        let indicator = CopyIndicator::new(Duration::from_millis(400));
        indicator.copied();
        thread::sleep(Duration::from_millis(250));
        indicator.copied();
        // Past the first deadline, before the second.
        thread::sleep(Duration::from_millis(250));
        assert!(indicator.is_copied());
        thread::sleep(Duration::from_millis(500));
        assert!(!indicator.is_copied());
    }

    #[test]
    fn test_drop_stops_timer() {
        let indicator = CopyIndicator::new(Duration::from_secs(60));
        indicator.copied();
        // Joins the timer thread; would hang if the thread didn't exit.
        drop(indicator);
    }

    #[test]
    fn test_command_clipboard_missing_programs() {
        let mut clipboard = CommandClipboard::with_commands(vec![CopyCommand::new("daftar-no-such-program", &[])]);
        assert!(matches!(clipboard.write_text("x"), Err(ClipboardError::Unavailable)));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_clipboard_runs_first_installed_program() {
        let mut clipboard = CommandClipboard::with_commands(vec![
            CopyCommand::new("daftar-no-such-program", &[]),
            CopyCommand::new("cat", &[]),
        ]);
        assert!(clipboard.write_text("hello").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_clipboard_failing_program() {
        let mut clipboard = CommandClipboard::with_commands(vec![CopyCommand::new("false", &[])]);
        match clipboard.write_text("hello") {
            Err(ClipboardError::Failed { program, .. }) => assert_eq!("false", program),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
