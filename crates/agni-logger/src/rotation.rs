use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;

/// 5 MB per segment, 28-day retention, gzip-compressed rolls, local-time
/// timestamps — the same defaults the source's `lumberjack.Logger` used
/// (`MaxSize: 5, MaxAge: 28, Compress: true, LocalTime: true`), since
/// `tracing-appender`'s rolling writer only rotates on a time cadence and
/// has no notion of size-based rotation or compression.
pub const MAX_SEGMENT_BYTES: u64 = 5 * 1024 * 1024;
pub const RETENTION_DAYS: u64 = 28;

/// A single active log file that rolls itself (rename + gzip the filled
/// segment, sweep anything past the retention window) once it crosses
/// [`MAX_SEGMENT_BYTES`]. All methods do blocking file IO and are meant to
/// be driven from inside `tokio::task::spawn_blocking`.
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written,
        })
    }

    /// Appends `line` (with a trailing newline), rolling first if that
    /// would push the segment past `MAX_SEGMENT_BYTES`.
    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        let bytes = line.as_bytes();
        if self.written > 0 && self.written + bytes.len() as u64 > MAX_SEGMENT_BYTES {
            self.roll()?;
        }
        self.file.write_all(bytes)?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        self.written += bytes.len() as u64 + 1;
        Ok(())
    }

    fn roll(&mut self) -> std::io::Result<()> {
        let timestamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let rolled_path = self.path.with_extension(format!("{timestamp}.log"));
        fs::rename(&self.path, &rolled_path)?;

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;

        compress_and_remove(&rolled_path)?;
        sweep_expired(&self.path)?;
        Ok(())
    }
}

fn compress_and_remove(path: &Path) -> std::io::Result<()> {
    let mut input = File::open(path)?;
    let mut contents = Vec::new();
    input.read_to_end(&mut contents)?;

    let gz_path = path.with_extension("log.gz");
    let gz_file = File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(gz_file, Compression::default());
    encoder.write_all(&contents)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(())
}

/// Deletes rolled (`.log.gz`) segments older than [`RETENTION_DAYS`],
/// scanning the directory the active log file lives in.
fn sweep_expired(active_path: &Path) -> std::io::Result<()> {
    let Some(dir) = active_path.parent() else {
        return Ok(());
    };
    let Some(stem) = active_path.file_stem().and_then(|s| s.to_str()) else {
        return Ok(());
    };
    let pattern = format!("{}/{}.*.log.gz", dir.display(), stem);
    let cutoff = SystemTime::now() - Duration::from_secs(RETENTION_DAYS * 24 * 60 * 60);

    for entry in glob::glob(&pattern).into_iter().flatten().flatten() {
        if let Ok(metadata) = fs::metadata(&entry) {
            if let Ok(modified) = metadata.modified() {
                if modified < cutoff {
                    let _ = fs::remove_file(&entry);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_lines_without_rolling_under_the_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agni-demo.log");
        let mut rf = RotatingFile::open(&path).unwrap();
        rf.write_line("hello").unwrap();
        rf.write_line("world").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "hello\nworld\n");
    }

    #[test]
    fn rolls_and_compresses_once_the_segment_exceeds_the_cap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agni-demo.log");
        let mut rf = RotatingFile::open(&path).unwrap();

        let big_line = "x".repeat((MAX_SEGMENT_BYTES as usize) + 16);
        rf.write_line(&big_line).unwrap();
        rf.write_line("next segment").unwrap();

        let active = fs::read_to_string(&path).unwrap();
        assert!(active.contains("next segment"));

        let rolled: Vec<_> = glob::glob(&format!("{}/agni-demo.*.log.gz", dir.path().display()))
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(rolled.len(), 1);
    }
}
