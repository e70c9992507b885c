use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

static SKETCH_LOGGER: Lazy<SketchLogger> = Lazy::new(SketchLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level.to_level_filter();
    SKETCH_LOGGER.configure(config)?;

    log::set_logger(&*SKETCH_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }

    fn admits(&self, level: Level) -> bool {
        LogLevel::from(level) >= *self
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

/// One emitted line, also the shape of JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    pub location: Option<String>,
}

impl LogLine {
    fn from_record(record: &Record) -> Self {
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        };
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level: record.level().into(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            location,
        }
    }

    fn render_plain(&self, config: &LoggerConfig) -> String {
        let mut out = String::new();
        if config.include_timestamp {
            out.push_str(&format!("{} ", self.timestamp.format(&config.timestamp_format)));
        }
        out.push_str(&format!("[{:<5}] ", self.level.as_str()));
        if config.show_target {
            out.push_str(&format!("{}: ", self.target));
        }
        out.push_str(&self.message);
        if config.show_file_location {
            if let Some(location) = &self.location {
                out.push_str(&format!(" ({})", location));
            }
        }
        out
    }

    fn render_colored(&self, config: &LoggerConfig) -> String {
        let mut out = String::new();
        if config.include_timestamp {
            let ts = self.timestamp.format(&config.timestamp_format).to_string();
            out.push_str(&format!("{} ", ts.bright_black()));
        }
        let level = format!("{:<5}", self.level.as_str());
        out.push_str(&format!("[{}] ", level.color(self.level.color()).bold()));
        if config.show_target {
            out.push_str(&format!("{}: ", self.target.bright_blue()));
        }
        out.push_str(&self.message);
        if config.show_file_location {
            if let Some(location) = &self.location {
                out.push_str(&format!(" ({})", location.bright_black()));
            }
        }
        out
    }

    fn render(&self, config: &LoggerConfig, to_terminal: bool) -> String {
        if config.output_json {
            serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
        } else if to_terminal && config.show_colors {
            self.render_colored(config)
        } else {
            self.render_plain(config)
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_target: bool,
    pub show_file_location: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_target: true,
            show_file_location: false,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn with_file_output(mut self, path: impl Into<String>) -> Self {
        self.log_file_path = Some(path.into());
        self
    }

    pub fn production() -> Self {
        Self {
            show_colors: false,
            output_json: true,
            log_file_path: Some("sketchgen.log".to_string()),
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }
}

pub struct SketchLogger {
    config: Mutex<LoggerConfig>,
    file: Mutex<Option<File>>,
}

impl SketchLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            file: Mutex::new(None),
        }
    }

    fn configure(&self, config: LoggerConfig) -> Result<(), String> {
        let file = match &config.log_file_path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path, e))?,
            ),
            None => None,
        };
        *self.file.lock().map_err(|e| e.to_string())? = file;
        *self.config.lock().map_err(|e| e.to_string())? = config;
        Ok(())
    }
}

impl log::Log for SketchLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.config
            .lock()
            .map(|config| config.min_level.admits(metadata.level()))
            .unwrap_or(true)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(config) = self.config.lock() else {
            return;
        };
        let line = LogLine::from_record(record);

        if line.level >= LogLevel::Warn {
            eprintln!("{}", line.render(&config, true));
        } else {
            println!("{}", line.render(&config, true));
        }

        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "{}", line.render(&config, false));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long a scope took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("Starting {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!("{} took {}ms", self.name, self.elapsed().as_millis());
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_config_info(config: &crate::config::Config) {
    log::info!("Configuration loaded:");
    log::info!("   Endpoint: {}", config.leonardo.generations_url());
    log::info!("   Timeout: {}s", config.leonardo.timeout.as_secs());
    log::info!(
        "   API key: {}",
        if config.leonardo.api_key.is_some() { "set" } else { "missing" }
    );
    log::info!(
        "   Profile: {} ({:?} theme, {} styles, quick-pick {})",
        config.profile.name,
        config.profile.theme,
        config.profile.styles.len(),
        if config.profile.quick_pick_enabled() { "on" } else { "off" }
    );
}
