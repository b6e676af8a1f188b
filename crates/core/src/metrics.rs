//! JSON-lines timing records for the k-space pipeline.
//!
//! Every record is one JSON object per line carrying a `timestamp_ms` and an
//! `event` tag, e.g.
//!
//! ```text
//! {"timestamp_ms":1.7e12,"event":"stage","kernel":"stokeslet","stage":"fft","duration_ms":0.41}
//! ```

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::params::Kernel;

/// `[metrics]` table of a job file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub output: Option<PathBuf>,
    pub format: MetricsFormat,
}

impl MetricsConfig {
    /// Open the configured sink, or `None` when metrics are disabled.
    pub fn build_recorder(&self) -> io::Result<Option<MetricsRecorder>> {
        if !self.enabled {
            return Ok(None);
        }
        let Some(path) = self.output.as_deref() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "metrics.output must be set when metrics are enabled",
            ));
        };
        MetricsRecorder::new(path, self.format).map(Some)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsFormat {
    #[default]
    JsonLines,
}

/// Thread-safe event sink shared by every stage of a run.
pub struct MetricsRecorder {
    sink: Mutex<Box<dyn Write + Send>>,
    format: MetricsFormat,
}

impl MetricsRecorder {
    /// Create (or truncate) `path`, creating missing parent directories.
    pub fn new(path: &Path, format: MetricsFormat) -> io::Result<Self> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)?,
            _ => {}
        }
        let file = BufWriter::new(File::create(path)?);
        Ok(Self::from_writer(Box::new(file), format))
    }

    pub fn from_writer(sink: Box<dyn Write + Send>, format: MetricsFormat) -> Self {
        Self {
            sink: Mutex::new(sink),
            format,
        }
    }

    /// Write one event. A failing sink is reported on stderr and otherwise
    /// ignored; metrics never abort a computation.
    pub fn emit(&self, event: MetricsEvent<'_>) {
        if let Err(err) = self.write_record(Record {
            timestamp_ms: unix_millis(),
            event,
        }) {
            eprintln!("[metrics] dropped event: {err}");
        }
    }

    /// Emit a [`MetricsEvent::Stage`] for a stage that began at `started`.
    pub fn stage(&self, kernel: Kernel, stage: Stage, started: Instant) {
        self.emit(MetricsEvent::Stage {
            kernel,
            stage,
            duration_ms: duration_ms(started.elapsed()),
        });
    }

    fn write_record(&self, record: Record<'_>) -> io::Result<()> {
        let line = match self.format {
            MetricsFormat::JsonLines => {
                let mut line = serde_json::to_vec(&record)?;
                line.push(b'\n');
                line
            }
        };
        let mut sink = self.sink.lock();
        sink.write_all(&line)?;
        sink.flush()
    }
}

#[derive(Serialize)]
struct Record<'a> {
    timestamp_ms: f64,
    #[serde(flatten)]
    event: MetricsEvent<'a>,
}

/// Pipeline stage reported in [`MetricsEvent::Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Spread,
    Fft,
    Filter,
    InverseFft,
    Gather,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MetricsEvent<'a> {
    PipelineStart {
        kernel: Kernel,
        backend: &'a str,
        grid_nx: usize,
        grid_ny: usize,
        sources: usize,
        targets: usize,
        window: usize,
        xi: f64,
        eta: f64,
    },
    Stage {
        kernel: Kernel,
        stage: Stage,
        duration_ms: f64,
    },
    PipelineDone {
        kernel: Kernel,
        duration_ms: f64,
    },
}

pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}

fn unix_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |since| since.as_secs_f64() * 1e3)
}
