use hotbox_lp::logging::init_logger;
use hotbox_lp::plot::{extract, parse_cli};
use hotbox_lp::Overlays;
use log::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_cli();
    init_logger(args.verbose);
    info!(
        "read data from {} and plot to {}",
        args.logfile.display(),
        args.svgout.display()
    );
    let series = extract(&args)?;
    let overlays = Overlays::compute(&series, args.target_temperature, args.moving_average)?;
    info!("the average of sensorMean is: {}", overlays.mean);
    series.plot_minutes(&overlays, &args.svgout)?;
    info!("saved plot of {} record(s)", series.len());
    Ok(())
}
