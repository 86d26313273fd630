use chrono::prelude::*;
use hotbox_lp::capture::*;
use hotbox_lp::logging::init_logger;
use hotbox_lp::POLL_INTERVAL;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_cli_log();
    init_logger(args.verbose);

    let dir = match args.dir {
        Some(d) => d,
        None => default_output_dir()?,
    };

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

    let mut device = open_port(&args.port, args.baud)?;
    let (path, mut file) = create_capture_file(&dir, &Local::now().naive_local())?;
    info!(
        "logging {} at {} baud to {}",
        args.port,
        args.baud,
        path.display()
    );

    let total = capture_with_messages(
        &mut device,
        &mut file,
        POLL_INTERVAL,
        &running,
        &mut std::io::stdout(),
    )?;
    drop(file);
    drop(device);
    info!("{} byte(s) written to {}", total, path.display());
    Ok(())
}
