//! Runs the watched command and captures its output into a frame.

use crate::error::WatchError;
use iwatch_core::{layout_line, CommandSpec, Frame, MAXCOLUMN};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Longest line read into memory: `MAXCOLUMN` four-byte characters plus
/// `\r\n`. The rest of a longer line is discarded.
pub const LINE_BYTES: usize = MAXCOLUMN * 4 + 2;

/// Bytes a single capture may pull from the pipe before it gives up, so a
/// stream without newlines still ends the refresh.
pub const CAPTURE_BYTES: usize = 8 * 1024 * 1024;

/// Outcome of one capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capture {
    /// Lines stored in the frame.
    pub lines: usize,
    /// Output continued past the frame capacity and was dropped.
    pub truncated: bool,
    /// How the child exited.
    pub status: ExitStatus,
    /// When the capture finished.
    pub finished: SystemTime,
}

/// Run `command` to completion, replacing the contents of `frame`.
///
/// Stdout is captured, stderr goes wherever ours goes, stdin is empty. Once
/// the frame is full the pipe is closed so the child cannot block on it.
pub fn capture(command: &CommandSpec, frame: &mut Frame) -> Result<Capture, WatchError> {
    let mut child = Command::new(command.program())
        .args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| WatchError::Spawn {
            command: command.display().to_string(),
            source,
        })?;

    let Some(stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(WatchError::Pipe {
            command: command.display().to_string(),
        });
    };

    // The reader owns the pipe and drops it before we wait.
    let read = read_into_frame(BufReader::new(stdout), frame);
    let status = child.wait()?;
    let truncated = read?;

    if truncated {
        debug!(lines = frame.len(), "output truncated");
    }
    if !status.success() {
        warn!(%status, command = command.display(), "command exited unsuccessfully");
    }

    Ok(Capture {
        lines: frame.len(),
        truncated,
        status,
        finished: SystemTime::now(),
    })
}

/// Fill `frame` from `reader`, one line per row.
///
/// At most [`LINE_BYTES`] of each line are kept and at most
/// [`CAPTURE_BYTES`] are read in total. Returns `true` if output was left
/// unread, either past the last row or past the byte budget.
pub fn read_into_frame<R: BufRead>(mut reader: R, frame: &mut Frame) -> io::Result<bool> {
    frame.clear();
    let mut budget = CAPTURE_BYTES;
    let mut raw = Vec::with_capacity(LINE_BYTES);
    loop {
        raw.clear();
        let read = reader
            .by_ref()
            .take(LINE_BYTES as u64)
            .read_until(b'\n', &mut raw)?;
        if read == 0 {
            return Ok(false);
        }
        if frame.is_full() {
            return Ok(true);
        }
        budget = budget.saturating_sub(read);
        if read == LINE_BYTES && !raw.ends_with(b"\n") {
            skip_line(&mut reader, &mut budget)?;
        }
        frame.push(layout_line(&String::from_utf8_lossy(&raw)));
        if budget == 0 {
            return Ok(true);
        }
    }
}

/// Consume through the next newline without keeping anything, spending at
/// most `budget` bytes.
fn skip_line<R: BufRead>(reader: &mut R, budget: &mut usize) -> io::Result<()> {
    while *budget > 0 {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        let window = &available[..available.len().min(*budget)];
        let (used, done) = match window.iter().position(|&b| b == b'\n') {
            Some(end) => (end + 1, true),
            None => (window.len(), false),
        };
        reader.consume(used);
        *budget -= used;
        if done {
            return Ok(());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iwatch_core::{Line, MAXLINE};
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new(vec!["sh".into(), "-c".into(), script.into()]).expect("non-empty")
    }

    #[test]
    fn test_read_into_frame_lines() {
        let mut frame = Frame::new();
        let truncated = read_into_frame(Cursor::new("one\ntwo\r\n\nlast"), &mut frame).unwrap();
        assert!(!truncated);
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.line(0).map(|l| l.text()), Some("one".to_string()));
        assert_eq!(frame.line(1).map(|l| l.text()), Some("two".to_string()));
        assert!(frame.line(2).is_some_and(|l| l.is_empty()));
        assert_eq!(frame.line(3).map(|l| l.text()), Some("last".to_string()));
    }

    #[test]
    fn test_read_into_frame_replaces_old_content() {
        let mut frame = Frame::new();
        read_into_frame(Cursor::new("a\nb\nc\n"), &mut frame).unwrap();
        read_into_frame(Cursor::new("z\n"), &mut frame).unwrap();
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_read_into_frame_caps_lines() {
        let text: String = (0..MAXLINE + 20).map(|i| format!("{i}\n")).collect();
        let mut frame = Frame::new();
        let truncated = read_into_frame(Cursor::new(text), &mut frame).unwrap();
        assert!(truncated);
        assert_eq!(frame.len(), MAXLINE);
        assert_eq!(
            frame.line(MAXLINE - 1).map(|l| l.text()),
            Some((MAXLINE - 1).to_string())
        );
    }

    #[test]
    fn test_read_into_frame_exactly_full() {
        let text: String = (0..MAXLINE).map(|i| format!("{i}\n")).collect();
        let mut frame = Frame::new();
        assert!(!read_into_frame(Cursor::new(text), &mut frame).unwrap());
        assert_eq!(frame.len(), MAXLINE);
    }

    /// Serves `'x'` forever and counts what it handed out.
    struct EndlessLine {
        served: Rc<Cell<usize>>,
    }

    impl Read for EndlessLine {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(b'x');
            self.served.set(self.served.get() + buf.len());
            Ok(buf.len())
        }
    }

    #[test]
    fn test_read_into_frame_endless_line_is_bounded() {
        let served = Rc::new(Cell::new(0));
        let reader = BufReader::new(EndlessLine {
            served: Rc::clone(&served),
        });
        let mut frame = Frame::new();
        let truncated = read_into_frame(reader, &mut frame).unwrap();
        assert!(truncated);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.line(0).map(Line::len), Some(MAXCOLUMN));
        assert!(served.get() <= CAPTURE_BYTES + LINE_BYTES + 8 * 1024);
    }

    #[test]
    fn test_read_into_frame_long_line_tail_dropped() {
        let text = format!("{}\nnext\n", "y".repeat(LINE_BYTES * 3));
        let mut frame = Frame::new();
        assert!(!read_into_frame(Cursor::new(text), &mut frame).unwrap());
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.line(0).map(Line::len), Some(MAXCOLUMN));
        assert_eq!(frame.line(1).map(|l| l.text()), Some("next".to_string()));
    }

    #[test]
    fn test_read_into_frame_invalid_utf8() {
        let mut frame = Frame::new();
        read_into_frame(Cursor::new(b"ok\xff\n".to_vec()), &mut frame).unwrap();
        assert_eq!(frame.line(0).map(|l| l.text()), Some("ok\u{fffd}".to_string()));
    }

    #[test]
    fn test_read_into_frame_expands_tabs() {
        let mut frame = Frame::new();
        read_into_frame(Cursor::new("\tOK\n"), &mut frame).unwrap();
        assert_eq!(frame.line(0).map(|l| l.text()), Some("        OK".to_string()));
    }

    #[test]
    fn test_capture_runs_command() {
        let mut frame = Frame::new();
        let capture = capture(&sh("printf 'a\\nb\\n'"), &mut frame).unwrap();
        assert_eq!(capture.lines, 2);
        assert!(capture.status.success());
        assert!(!capture.truncated);
        assert_eq!(frame.line(1).map(|l| l.text()), Some("b".to_string()));
    }

    #[test]
    fn test_capture_nonzero_exit_is_not_fatal() {
        let mut frame = Frame::new();
        let capture = capture(&sh("echo partial; exit 3"), &mut frame).unwrap();
        assert_eq!(capture.lines, 1);
        assert_eq!(capture.status.code(), Some(3));
    }

    #[test]
    fn test_capture_chatty_child_does_not_block() {
        let mut frame = Frame::new();
        let capture = capture(&sh("yes"), &mut frame).unwrap();
        assert!(capture.truncated);
        assert_eq!(frame.len(), MAXLINE);
    }

    #[test]
    fn test_capture_output_without_newlines_ends() {
        let mut frame = Frame::new();
        let capture = capture(&sh("yes | tr -d '\\n'"), &mut frame).unwrap();
        assert!(capture.truncated);
        assert_eq!(capture.lines, 1);
    }

    #[test]
    fn test_capture_spawn_failure() {
        let spec = CommandSpec::new(vec!["/nonexistent/iwatch-test-binary".into()]).unwrap();
        let mut frame = Frame::new();
        let err = capture(&spec, &mut frame).unwrap_err();
        assert!(matches!(err, WatchError::Spawn { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
