use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Duplicates every write into an append-only file and a mirror stream.
pub struct TeeWriter<W: Write> {
    file: File,
    mirror: W,
}

impl<W: Write> TeeWriter<W> {
    pub fn new(file: File, mirror: W) -> Self {
        Self { file, mirror }
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        // a closed console must not stop the log file
        let _ = self.mirror.write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.mirror.flush();
        self.file.flush()
    }
}

/// `2024-05-01 12:00:00,123 - INFO - message`
pub fn render(now: DateTime<Local>, level: log::Level, message: &str) -> String {
    format!("{} - {} - {}", now.format("%Y-%m-%d %H:%M:%S,%3f"), level, message)
}

/// Filter used when `RUST_LOG` is unset; verbose opens this crate's debug lines.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,rust_list_scraper=debug"
    } else {
        "info"
    }
}

/// Route the `log` facade to `log_file` and stderr.
pub fn init(log_file: &Path, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    Builder::from_env(Env::default().default_filter_or(default_filter(verbose)))
        .format(|buf, record| {
            writeln!(buf, "{}", render(Local::now(), record.level(), &record.args().to_string()))
        })
        .target(Target::Pipe(Box::new(TeeWriter::new(file, io::stderr()))))
        .try_init()
        .context("Logger already initialised")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_format() {
        let now = Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        let line = render(now, log::Level::Warn, "Attempt 1 failed");
        assert_eq!(line, "2024-05-01 12:30:05,000 - WARN - Attempt 1 failed");
    }

    #[test]
    fn test_verbose_enables_crate_debug() {
        assert_eq!(default_filter(false), "info");
        assert_eq!(default_filter(true), "info,rust_list_scraper=debug");
    }

    #[test]
    fn test_tee_writes_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.log");
        let file = OpenOptions::new().create(true).append(true).open(&path).unwrap();

        let mut tee = TeeWriter::new(file, Vec::new());
        tee.write_all(b"first\n").unwrap();
        tee.write_all(b"second\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(tee.mirror, b"first\nsecond\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let file = OpenOptions::new().create(true).append(true).open(&path).unwrap();
        let mut tee = TeeWriter::new(file, io::sink());
        tee.write_all(b"this run\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier run\nthis run\n");
    }
}
