use super::{HotboxError, DEFAULT_BAUD, DEFAULT_PORT, FILE_DT_FORMAT, FILE_EXTENSION, VERSION};
use chrono::NaiveDateTime;
use clap::{App, Arg};
use log::debug;
use serialport::SerialPort;
use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// CLI arguments of the serial logger
#[derive(Debug, Clone, PartialEq)]
pub struct LogArgs {
    pub port: String,
    pub baud: u32,
    /// output directory, `None` means next to the executable
    pub dir: Option<PathBuf>,
    pub verbose: bool,
}

pub fn parse_cli_log() -> LogArgs {
    parse_cli_log_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

pub fn parse_cli_log_from<I, T>(args: I) -> Result<LogArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let arg_port = Arg::with_name("port")
        .help("tty device to log")
        .short("p")
        .long("port")
        .takes_value(true)
        .default_value(DEFAULT_PORT);
    let arg_baud = Arg::with_name("baud")
        .help("baud rate")
        .short("b")
        .long("baud")
        .takes_value(true)
        .default_value("115200")
        .validator(|v| {
            v.parse::<u32>()
                .map(|_| ())
                .map_err(|e| format!("invalid baud rate {}: {}", v, e))
        });
    let arg_dir = Arg::with_name("dir")
        .help("directory for the capture file, defaults to the directory of this executable")
        .short("d")
        .long("dir")
        .takes_value(true);
    let arg_verbose = Arg::with_name("verbose")
        .help("print verbose information")
        .short("v")
        .long("verbose")
        .takes_value(false)
        .required(false);
    let cli_args = App::new("hotbox_log")
        .version(VERSION.unwrap_or("unknown"))
        .about("listens on a serial device and saves the raw traffic to a timestamped file")
        .arg(arg_port)
        .arg(arg_baud)
        .arg(arg_dir)
        .arg(arg_verbose)
        .get_matches_from_safe(args)?;
    let port = String::from(cli_args.value_of("port").unwrap_or(DEFAULT_PORT));
    let baud = cli_args
        .value_of("baud")
        .and_then(|b| b.parse::<u32>().ok())
        .unwrap_or(DEFAULT_BAUD);
    let dir = cli_args.value_of("dir").map(PathBuf::from);
    let verbose: bool = cli_args.is_present("verbose");
    Ok(LogArgs {
        port,
        baud,
        dir,
        verbose,
    })
}

/// the directory holding the running executable
pub fn default_output_dir() -> Result<PathBuf, HotboxError> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

pub fn capture_file_path(dir: &Path, datetime: &NaiveDateTime) -> PathBuf {
    dir.join(format!(
        "{}.{}",
        datetime.format(FILE_DT_FORMAT),
        FILE_EXTENSION
    ))
}

/// creates (or truncates) the capture file named after the given local time
pub fn create_capture_file(
    dir: &Path,
    datetime: &NaiveDateTime,
) -> Result<(PathBuf, File), HotboxError> {
    let path = capture_file_path(dir, datetime);
    let file = File::create(&path)?;
    Ok((path, file))
}

/// A device that can hand over whatever it has buffered without waiting for more
pub trait ByteSource {
    fn drain(&mut self) -> Result<Vec<u8>, HotboxError>;
}

impl ByteSource for Box<dyn SerialPort> {
    fn drain(&mut self) -> Result<Vec<u8>, HotboxError> {
        let waiting = self.bytes_to_read()? as usize;
        let mut buffer = vec![0; waiting];
        if waiting > 0 {
            self.read_exact(&mut buffer)?;
        }
        Ok(buffer)
    }
}

pub fn open_port(name: &str, baud: u32) -> Result<Box<dyn SerialPort>, HotboxError> {
    let port = serialport::new(name, baud)
        .timeout(Duration::from_millis(100))
        .open()?;
    Ok(port)
}

/// Every `interval`, moves the bytes buffered on `source` to `sink` and flushes it.
/// The run flag is checked after each drain, so the last poll still lands in the sink.
/// Returns the number of bytes written.
pub fn capture<S, W>(
    source: &mut S,
    sink: &mut W,
    interval: Duration,
    running: &AtomicBool,
) -> Result<u64, HotboxError>
where
    S: ByteSource + ?Sized,
    W: Write,
{
    let mut total: u64 = 0;
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(interval);
        let bytes = source.drain()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        total += bytes.len() as u64;
        debug!("drained {} byte(s), {} in total", bytes.len(), total);
    }
    Ok(total)
}

/// `capture` framed by the start and stop messages on `console`,
/// which go out regardless of the log level
pub fn capture_with_messages<S, W, C>(
    source: &mut S,
    sink: &mut W,
    interval: Duration,
    running: &AtomicBool,
    console: &mut C,
) -> Result<u64, HotboxError>
where
    S: ByteSource + ?Sized,
    W: Write,
    C: Write,
{
    writeln!(console, "Logging started. Ctrl-C to stop.")?;
    let total = capture(source, sink, interval, running)?;
    writeln!(console, "Logging stopped")?;
    Ok(total)
}
