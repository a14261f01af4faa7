//! Command line front end for generating thermometer coded sine tables.

#[macro_use]
extern crate log;

use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use clap::{Parser, ValueEnum};
use itertools::Itertools;
use log::LevelFilter;
use sinwave_core::{
    write_table, Gauge, Player, PortFrame, RunLabel, TableFormat, TableStats, Track,
    WaveParams, DEFAULT_LED_COUNT, DEFAULT_PERIOD, DEFAULT_RESOLUTION, SENTINEL,
};
use zerocopy::AsBytes;

#[derive(Parser, Debug)]
#[command(
    name = "sinwave",
    version,
    about = "Generate a thermometer coded sine table for an LED bar gauge"
)]
pub struct Cli {
    /// Number of LEDs (bits per value)
    #[arg(long, default_value_t = DEFAULT_LED_COUNT, allow_negative_numbers = true)]
    pub leds: i32,

    /// Wave period in seconds
    #[arg(long, default_value_t = DEFAULT_PERIOD, allow_negative_numbers = true)]
    pub period: f64,

    /// Samples per second
    #[arg(long, default_value_t = DEFAULT_RESOLUTION, allow_negative_numbers = true)]
    pub resolution: f64,

    /// Name of the emitted array
    #[arg(long, default_value = "sin_wave")]
    pub name: String,

    /// Declare the array PROGMEM
    #[arg(long)]
    pub progmem: bool,

    /// What the comment after each line shows
    #[arg(long, value_enum, default_value_t = Label::Legacy)]
    pub label: Label,

    /// Write the table here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the sentinel terminated table as raw u16 words
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Draw every frame of the table on stderr
    #[arg(long)]
    pub preview: bool,

    /// More logging (-v info, -vv debug, -vvv every sample)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// Same numbering as the tables already in firmware
    Legacy,
    /// First sample index of each line
    FirstSample,
}

impl From<Label> for RunLabel {
    fn from(label: Label) -> Self {
        match label {
            Label::Legacy => RunLabel::Legacy,
            Label::FirstSample => RunLabel::FirstSample,
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Table(sinwave_core::Error),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Table(e) => write!(f, "{}", e),
            Error::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<sinwave_core::Error> for Error {
    fn from(e: sinwave_core::Error) -> Self {
        Error::Table(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl Cli {
    pub fn params(&self) -> Result<WaveParams, Error> {
        Ok(WaveParams::new(self.leds, self.period, self.resolution)?)
    }

    pub fn format(&self) -> Result<TableFormat, Error> {
        Ok(TableFormat::new()
            .name(&self.name)?
            .progmem(self.progmem)
            .label(self.label.into()))
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Every sample value followed by the sentinel, as stored in firmware.
pub fn table_words(params: &WaveParams) -> Vec<u16> {
    params
        .samples()
        .map(|s| s.value)
        .chain(Some(SENTINEL))
        .collect()
}

/// Play the table once through the gauge model and draw each plateau.
pub fn preview<W: Write>(params: &WaveParams, w: &mut W) -> io::Result<()> {
    let words = table_words(params);
    let steps = Track::new(&words).count();
    let tracks = [words.as_slice()];
    let mut player = Player::new(&tracks, 0);
    let played = (0..steps).map_while(|_| player.next_value());
    for (count, value) in played.dedup_with_count() {
        let frame = PortFrame::from_value(value);
        writeln!(
            w,
            "{} x{:<3} pa={:02b} pb={:08b} pd={:07b}",
            Gauge {
                value,
                leds: params.led_count(),
            },
            count,
            frame.pa,
            frame.pb,
            frame.pd
        )?;
    }
    Ok(())
}

/// Lets the table writer stream straight into an `io::Write`, keeping the first i/o error.
struct IoSink<'a, W: Write> {
    inner: &'a mut W,
    error: Option<io::Error>,
}

impl<W: Write> fmt::Write for IoSink<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

fn stream_table<W: Write>(
    w: &mut W,
    params: &WaveParams,
    format: &TableFormat,
) -> Result<TableStats, Error> {
    let mut sink = IoSink {
        inner: w,
        error: None,
    };
    match write_table(&mut sink, params, format) {
        Ok(stats) => {
            sink.inner.flush()?;
            Ok(stats)
        }
        Err(e) => Err(sink.error.take().map_or(Error::Table(e), Error::Io)),
    }
}

/// Generate the table and write it, plus whatever extra outputs were requested.
pub fn run<W: Write, E: Write>(cli: &Cli, out: &mut W, err: &mut E) -> Result<TableStats, Error> {
    let params = cli.params()?;
    let format = cli.format()?;
    info!(
        "{} leds, {}s period, {}/s -> {} samples",
        params.led_count(),
        params.period(),
        params.resolution(),
        params.total_slices()
    );

    let stats = match &cli.output {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            let stats = stream_table(&mut file, &params, &format)?;
            info!("wrote {}", path.display());
            stats
        }
        None => stream_table(out, &params, &format)?,
    };

    if let Some(path) = &cli.binary {
        let words = table_words(&params);
        fs::write(path, words.as_slice().as_bytes())?;
        info!("wrote {} words to {}", words.len(), path.display());
    }

    if cli.preview {
        preview(&params, err)?;
    }

    info!(
        "{} samples on {} lines, {} plateaus, peak 0x{:x}",
        stats.samples, stats.lines, stats.plateaus, stats.peak
    );
    Ok(stats)
}
