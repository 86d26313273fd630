use hotbox_lp::plot::{extract, parse_cli_from};
use hotbox_lp::{HotboxError, Overlays};
use std::fs;

const LOG: &str = "Serial initialized!\n\
{\"ms\":0,\"sensors\":[{\"sensor00\":25.0,\"sensor01\":25.5,\"sensor02\":20.0}],\"sensorMean\":25.25,\"fan\":220,\"heatingElement\":true}\n\
2020-10-14 18:02:41 For debugMode please press anykey.\n\
{\"ms\":60000,\"sensors\":[{\"sensor00\":26.0,\"sensor01\":26.5,\"sensor02\":20.0}],\"sensorMean\":26.25,\"fan\":220,\"heatingElement\":true}\n\
{\"ms\":120000,\"sensors\":[{\"sensor00\":27.0,\"sensor01\":27.5,\"sensor02\":20.5}],\"sensorMean\":27.25,\"fan\":0,\"heatingElement\":false}\n";

fn json_lines() -> Vec<&'static str> {
    LOG.lines().filter(|l| l.starts_with('{')).collect()
}

#[test]
fn extracts_records_and_exports_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("hotbox.log");
    let jsonout = dir.path().join("hotbox.json");
    fs::write(&logfile, LOG).unwrap();

    let args = parse_cli_from(vec![
        "hotbox_plot",
        logfile.to_str().unwrap(),
        "-o",
        jsonout.to_str().unwrap(),
    ])
    .unwrap();
    let series = extract(&args).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.minutes, vec![0., 1., 2.]);
    assert_eq!(series.sensor_mean, vec![25.25, 26.25, 27.25]);
    assert_eq!(series.heating, vec![1., 1., 0.]);
    assert_eq!(series.fan[2], 0.);

    let exported = fs::read_to_string(&jsonout).unwrap();
    assert_eq!(exported.lines().collect::<Vec<_>>(), json_lines());
    assert!(exported.ends_with("}\n"));
}

#[test]
fn unwritable_export_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("hotbox.log");
    fs::write(&logfile, LOG).unwrap();
    // the target is a directory, so creating the file fails
    let args = parse_cli_from(vec![
        "hotbox_plot",
        logfile.to_str().unwrap(),
        "-o",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();
    let series = extract(&args).unwrap();
    assert_eq!(series.len(), 3);
}

#[test]
fn overlays_from_extracted_log() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("hotbox.log");
    fs::write(&logfile, LOG).unwrap();
    let args = parse_cli_from(vec![
        "hotbox_plot",
        logfile.to_str().unwrap(),
        "-t",
        "27",
        "-ma",
        "2",
    ])
    .unwrap();
    let series = extract(&args).unwrap();
    let overlays =
        Overlays::compute(&series, args.target_temperature, args.moving_average).unwrap();
    assert_eq!(overlays.mean, 26.25);
    assert_eq!(overlays.mean_reference, vec![26.25; 3]);
    assert_eq!(overlays.target, Some((27., vec![27.; 3])));
    assert_eq!(
        overlays.moving_average,
        Some((2, vec![None, Some(25.75), Some(26.75)]))
    );

    // a window wider than the log is dropped, not fatal
    let overlays = Overlays::compute(&series, None, Some(4)).unwrap();
    assert_eq!(overlays.moving_average, None);
}

#[test]
fn missing_field_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("broken.log");
    fs::write(
        &logfile,
        "{\"ms\":0,\"sensors\":[{\"sensor00\":25.0,\"sensor01\":25.5}],\"sensorMean\":25.25,\"fan\":220,\"heatingElement\":0}\n",
    )
    .unwrap();
    let args = parse_cli_from(vec!["hotbox_plot", logfile.to_str().unwrap()]).unwrap();
    match extract(&args) {
        Err(HotboxError::Record { index, .. }) => assert_eq!(index, 0),
        other => panic!("unexpected result {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn log_without_records_has_no_mean() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("banner.log");
    fs::write(&logfile, "Serial initialized!\nOneWire sensors initialized!\n").unwrap();
    let args = parse_cli_from(vec!["hotbox_plot", logfile.to_str().unwrap()]).unwrap();
    let series = extract(&args).unwrap();
    assert!(series.is_empty());
    assert!(matches!(
        Overlays::compute(&series, None, None),
        Err(HotboxError::EmptySeries)
    ));
}

#[test]
fn export_keeps_lines_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("padded.log");
    let jsonout = dir.path().join("padded.json");
    let padded = "  {\"ms\":0,\"sensors\":[{\"sensor00\":25.0,\"sensor01\":25.5,\"sensor02\":20.0}],\"sensorMean\":25.25,\"fan\":220,\"heatingElement\":0}  ";
    fs::write(&logfile, format!("banner\n{}\n", padded)).unwrap();
    let args = parse_cli_from(vec![
        "hotbox_plot",
        logfile.to_str().unwrap(),
        "-o",
        jsonout.to_str().unwrap(),
    ])
    .unwrap();
    let series = extract(&args).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(fs::read_to_string(&jsonout).unwrap(), format!("{}\n", padded));
}
