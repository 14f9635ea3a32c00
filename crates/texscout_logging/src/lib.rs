//! Shared logging setup for texscout hosts.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "texscout=info";
const VERBOSE_LOG_FILTER: &str = "texscout=debug";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration for a texscout host process.
pub struct LogConfig<'a> {
    /// Base name of the log file, sanitized before use
    pub app_name: &'a str,
    /// Mirror debug output to stderr
    pub verbose: bool,
}

/// Initialize tracing with a rolling file writer and stderr output.
///
/// `RUST_LOG` overrides the default filter for both layers.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let appender =
        RollingFileAppender::new(log_dir, config.app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {}", config.app_name))?;

    let env_filter = EnvFilter::try_from_default_env().ok();
    let file_filter = env_filter
        .clone()
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = match env_filter {
        Some(filter) => filter,
        None if config.verbose => EnvFilter::new(VERBOSE_LOG_FILTER),
        None => EnvFilter::new("warn"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(appender))
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(())
}

/// Get the texscout home directory: `$TEXSCOUT_HOME` or `~/.texscout`
pub fn texscout_home() -> Result<PathBuf> {
    resolve_home(std::env::var_os("TEXSCOUT_HOME").map(PathBuf::from))
}

fn resolve_home(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".texscout"))
}

/// Get the logs directory: `<home>/logs`
pub fn logs_dir() -> Result<PathBuf> {
    Ok(texscout_home()?.join("logs"))
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir()?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Size-bounded log file: `name.log`, rotated to `name.log.1` .. `name.log.{max_files - 1}`.
struct RollingFileAppender {
    dir: PathBuf,
    base_name: String,
    max_files: usize,
    max_size: u64,
    file: Option<File>,
    current_size: u64,
}

impl RollingFileAppender {
    fn new(dir: PathBuf, base_name: &str, max_files: usize, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let mut appender = Self {
            dir,
            base_name: sanitize_name(base_name),
            max_files: max_files.max(1),
            max_size,
            file: None,
            current_size: 0,
        };
        let (file, size) = appender.open_current_file()?;
        appender.file = Some(file);
        appender.current_size = size;
        if appender.current_size > appender.max_size {
            appender.rotate()?;
        }
        Ok(appender)
    }

    fn open_current_file(&self) -> io::Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_path())?;
        let size = file.metadata()?.len();
        Ok((file, size))
    }

    fn current_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base_name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.base_name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        self.shift_rotated_files()?;

        let (file, size) = self.open_current_file()?;
        self.file = Some(file);
        self.current_size = size;
        Ok(())
    }

    fn shift_rotated_files(&self) -> io::Result<()> {
        let max_index = self.max_files - 1;
        let current = self.current_path();

        // Single-file mode truncates in place
        if max_index == 0 {
            if current.exists() {
                fs::remove_file(current)?;
            }
            return Ok(());
        }

        let oldest = self.rotated_path(max_index);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for idx in (1..max_index).rev() {
            let src = self.rotated_path(idx);
            if src.exists() {
                fs::rename(&src, self.rotated_path(idx + 1))?;
            }
        }

        if current.exists() {
            fs::rename(current, self.rotated_path(1))?;
        }

        Ok(())
    }
}

impl Write for RollingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.current_size > 0 && self.current_size + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let bytes = file.write(buf)?;
        self.current_size += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "texscout".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing_subscriber::fmt::MakeWriter;

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn sanitize_replaces_path_characters() {
        assert_eq!(sanitize_name("texscout"), "texscout");
        assert_eq!(sanitize_name("tex scout/../x"), "tex_scout____x");
        assert_eq!(sanitize_name("houdini-20.5"), "houdini-20_5");
        assert_eq!(sanitize_name(""), "texscout");
    }

    #[test]
    fn home_override_wins() {
        let home = resolve_home(Some(PathBuf::from("/studio/texscout"))).unwrap();
        assert_eq!(home, PathBuf::from("/studio/texscout"));
    }

    #[test]
    fn empty_override_falls_back_to_home_dir() {
        if let Some(user_home) = dirs::home_dir() {
            let home = resolve_home(Some(PathBuf::new())).unwrap();
            assert_eq!(home, user_home.join(".texscout"));
        }
    }

    #[test]
    fn appender_rotates_when_size_exceeded() {
        let temp_dir = TempDir::new().unwrap();
        let mut appender =
            RollingFileAppender::new(temp_dir.path().to_path_buf(), "scan", 3, 10).unwrap();

        appender.write_all(b"first-123\n").unwrap();
        appender.write_all(b"second-12\n").unwrap();
        appender.write_all(b"third-123\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(read(temp_dir.path().join("scan.log")), "third-123\n");
        assert_eq!(read(temp_dir.path().join("scan.log.1")), "second-12\n");
        assert_eq!(read(temp_dir.path().join("scan.log.2")), "first-123\n");
    }

    #[test]
    fn appender_drops_oldest_beyond_max_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut appender =
            RollingFileAppender::new(temp_dir.path().to_path_buf(), "scan", 2, 4).unwrap();

        for line in [b"aaa\n", b"bbb\n", b"ccc\n"] {
            appender.write_all(line).unwrap();
        }
        appender.flush().unwrap();

        assert_eq!(read(temp_dir.path().join("scan.log")), "ccc\n");
        assert_eq!(read(temp_dir.path().join("scan.log.1")), "bbb\n");
        assert!(!temp_dir.path().join("scan.log.2").exists());
    }

    #[test]
    fn appender_resumes_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("scan.log"), "old\n").unwrap();

        let mut appender =
            RollingFileAppender::new(temp_dir.path().to_path_buf(), "scan", 3, 1024).unwrap();
        appender.write_all(b"new\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(read(temp_dir.path().join("scan.log")), "old\nnew\n");
    }

    #[test]
    fn mutex_writer_appends_through_guards() {
        let temp_dir = TempDir::new().unwrap();
        let appender =
            RollingFileAppender::new(temp_dir.path().to_path_buf(), "host app", 3, 1024).unwrap();
        let writer = Mutex::new(appender);

        writer.make_writer().write_all(b"one\n").unwrap();
        let mut guard = writer.make_writer();
        guard.write_all(b"two\n").unwrap();
        guard.flush().unwrap();
        drop(guard);

        assert_eq!(read(temp_dir.path().join("host_app.log")), "one\ntwo\n");
    }
}
