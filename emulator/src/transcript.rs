use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use luminus_core::input::{AXIS_CENTER, InputSnapshot};
use luminus_core::messages::Message;
use luminus_core::telemetry::EventRecord;

/// Line-oriented log of one play session.
pub struct TranscriptLogger<W: Write> {
    writer: W,
}

impl TranscriptLogger<BufWriter<File>> {
    pub fn create(path: &Path, header: &str) -> io::Result<Self> {
        Self::with_writer(open_file(path)?, header)
    }
}

impl<W: Write> TranscriptLogger<W> {
    pub fn with_writer(writer: W, header: &str) -> io::Result<Self> {
        let mut logger = Self { writer };
        logger.write_header(header)?;
        Ok(logger)
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        writeln!(self.writer, "# {header}")?;
        writeln!(self.writer, "# Timestamps are milliseconds since power-on")?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    pub fn log_input(&mut self, elapsed: Duration, input: &InputSnapshot) -> io::Result<()> {
        let Some(line) = describe_input(input) else {
            return Ok(());
        };
        self.append_line(elapsed, TranscriptRole::Player, &line)
    }

    pub fn log_message(&mut self, elapsed: Duration, message: &Message) -> io::Result<()> {
        self.append_line(elapsed, TranscriptRole::Display, &message.to_string())
    }

    pub fn log_event(&mut self, elapsed: Duration, record: &EventRecord) -> io::Result<()> {
        self.append_line(elapsed, TranscriptRole::Game, &record.to_string())
    }

    fn append_line(&mut self, elapsed: Duration, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>7} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Player,
    Display,
    Game,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Player => "PLAYER>",
            TranscriptRole::Display => "OLED  <",
            TranscriptRole::Game => "GAME   ",
        }
    }
}

/// Creates (or truncates) `path`, making parent directories as needed.
pub fn open_file(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(file))
}

/// Short description of a non-idle input, or `None` when nothing was touched.
fn describe_input(input: &InputSnapshot) -> Option<String> {
    let mut parts = Vec::new();
    let horizontal = direction(input.axes.x, "left", "right");
    let vertical = direction(input.axes.y, "up", "down");
    parts.extend(horizontal);
    parts.extend(vertical);
    if input.confirm {
        parts.push("A");
    }
    if input.alt {
        parts.push("B");
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("+"))
    }
}

fn direction(raw: u16, low: &'static str, high: &'static str) -> Option<&'static str> {
    match raw.cmp(&AXIS_CENTER) {
        std::cmp::Ordering::Less => Some(low),
        std::cmp::Ordering::Greater => Some(high),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luminus_core::input::{AXIS_MAX, AxisSample};
    use luminus_core::messages;
    use luminus_core::telemetry::{EventLog, GameEvent};

    fn logged(write: impl FnOnce(&mut TranscriptLogger<&mut Vec<u8>>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        let mut logger = TranscriptLogger::with_writer(&mut buffer, "test").expect("header");
        write(&mut logger).expect("write");
        drop(logger);
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn header_precedes_entries() {
        let text = logged(|log| log.log_message(Duration::from_millis(4000), &messages::WELCOME));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "# test");
        assert_eq!(lines[3], "[+   4000 ms] OLED  < Welcome to / Luminus Memory");
    }

    #[test]
    fn idle_input_is_not_logged() {
        let text = logged(|log| log.log_input(Duration::ZERO, &InputSnapshot::idle()));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn input_lists_deflection_and_buttons() {
        let input = InputSnapshot::idle()
            .with_axes(AxisSample::new(AXIS_MAX, 0))
            .with_confirm();
        let text = logged(|log| log.log_input(Duration::from_millis(12), &input));
        assert!(text.ends_with("[+     12 ms] PLAYER> right+up+A\n"));
    }

    #[test]
    fn events_use_record_display() {
        let mut events: EventLog = EventLog::new();
        events.record(GameEvent::RoundWon { score: 4 }, Duration::from_millis(250));
        let record = *events.latest().expect("record");
        let text = logged(|log| log.log_event(Duration::from_millis(300), &record));
        assert!(text.ends_with("GAME    #0 t=250ms round-won score=4\n"));
    }
}
