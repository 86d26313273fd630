use super::{HotboxError, HotboxSeries, VERSION};
use crate::record::{filter_json_lines, parse_records};
use clap::{App, Arg};
use log::{info, warn};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// CLI arguments of the log plotter
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArgs {
    pub logfile: PathBuf,
    /// where to save the extracted JSON lines, if anywhere
    pub jsonout: Option<PathBuf>,
    pub svgout: PathBuf,
    pub target_temperature: Option<f64>,
    pub moving_average: Option<usize>,
    pub verbose: bool,
}

/// Takes the CLI arguments that control the extraction and plotting of the log.
pub fn parse_cli() -> PlotArgs {
    parse_cli_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

/// clap only knows single-letter shorts, `-ma` is spelled out before parsing
fn expand_short_moving_average<T: Into<OsString>>(arg: T) -> OsString {
    let arg: OsString = arg.into();
    if arg == "-ma" {
        OsString::from("--moving-average")
    } else {
        arg
    }
}

fn is_number<T: std::str::FromStr>(v: String) -> Result<(), String> {
    v.parse::<T>()
        .map(|_| ())
        .map_err(|_| format!("{} is not a valid number", v))
}

pub fn parse_cli_from<I, T>(args: I) -> Result<PlotArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let arg_logfile = Arg::with_name("FILE")
        .help("path to the input log file")
        .index(1)
        .required(true);
    let arg_output = Arg::with_name("output")
        .help("save the extracted JSON lines to this file")
        .short("o")
        .long("output")
        .takes_value(true);
    let arg_target = Arg::with_name("target_temperature")
        .help("add the target temperature to the plot")
        .short("t")
        .long("target-temperature")
        .takes_value(true)
        .allow_hyphen_values(true)
        .validator(is_number::<f64>);
    let arg_mavg = Arg::with_name("moving_average")
        .help("add a moving average of sensorMean with this window to the sensor plot (short: -ma)")
        .long("moving-average")
        .takes_value(true)
        .validator(is_number::<usize>);
    let arg_svgout = Arg::with_name("output_svgfile")
        .help("name of the output svg file, defaults to FILE with the svg extension")
        .short("s")
        .long("svgfile")
        .takes_value(true);
    let arg_verbose = Arg::with_name("verbose")
        .help("print verbose information")
        .short("v")
        .long("verbose")
        .takes_value(false)
        .required(false);
    let cli_args = App::new("hotbox_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("reads a log file of the hot box and plots the sensors and actuators")
        .arg(arg_logfile)
        .arg(arg_output)
        .arg(arg_target)
        .arg(arg_mavg)
        .arg(arg_svgout)
        .arg(arg_verbose)
        .get_matches_from_safe(args.into_iter().map(expand_short_moving_average))?;

    let logfile = PathBuf::from(cli_args.value_of("FILE").unwrap_or_default());
    let jsonout = cli_args
        .value_of("output")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);
    let svgout = match cli_args.value_of("output_svgfile") {
        Some(p) => PathBuf::from(p),
        None => {
            let mut svgout = logfile.clone();
            svgout.set_extension("svg");
            svgout
        }
    };
    let target_temperature = cli_args
        .value_of("target_temperature")
        .and_then(|t| t.parse::<f64>().ok());
    let moving_average = cli_args
        .value_of("moving_average")
        .and_then(|w| w.parse::<usize>().ok());
    let verbose: bool = cli_args.is_present("verbose");
    Ok(PlotArgs {
        logfile,
        jsonout,
        svgout,
        target_temperature,
        moving_average,
        verbose,
    })
}

/// Reads the log line by line, replacing invalid UTF-8 (serial noise) instead of failing.
pub fn read_log_lines(fin: &Path) -> Result<Vec<String>, HotboxError> {
    let file = File::open(fin)?;
    let buf = BufReader::new(file);
    let mut lines = Vec::new();
    for l in buf.split(b'\n') {
        lines.push(String::from_utf8_lossy(&l?).into_owned());
    }
    Ok(lines)
}

/// writes the extracted JSON lines, one per line
pub fn export_json_lines(lines: &[String], fout: &Path) -> Result<(), HotboxError> {
    let file = File::create(fout)?;
    let mut buf = BufWriter::new(file);
    for l in lines {
        buf.write_all(l.as_bytes())?;
        buf.write_all(b"\n")?;
    }
    buf.flush()?;
    Ok(())
}

/// Reads the log, saves the JSON lines if requested and parses them into series.
/// Failing to save is only a warning, a bad record ends the run.
pub fn extract(args: &PlotArgs) -> Result<HotboxSeries, HotboxError> {
    let lines = filter_json_lines(read_log_lines(&args.logfile)?);
    info!(
        "found {} JSON line(s) in {}",
        lines.len(),
        args.logfile.display()
    );
    if let Some(jsonout) = &args.jsonout {
        info!("writing output to {}", jsonout.display());
        if let Err(e) = export_json_lines(&lines, jsonout) {
            warn!(
                "cannot save extracted JSON to {}: {}",
                jsonout.display(),
                e
            );
        }
    }
    let records = parse_records(&lines)?;
    Ok(HotboxSeries::from_records(&records))
}
