use log::warn;
use plotters::prelude::*;
use std::path::Path;
pub mod capture;
pub mod error;
pub mod logging;
pub mod plot;
pub mod record;

pub use error::HotboxError;
pub use record::LogRecord;

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// local time format used to name the capture files, e.g. 2020-10-14T18.02.41
pub const FILE_DT_FORMAT: &str = "%Y-%m-%dT%H.%M.%S";
pub const FILE_EXTENSION: &str = "bin";

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 115200;
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

pub const MS_PER_MINUTE: f64 = 60000.;
/// full scale of the fan PWM value
pub const FAN_MAX: f64 = 255.;

/// The time series extracted from the hot box log, one entry per record
#[derive(Debug, Clone, PartialEq)]
pub struct HotboxSeries {
    pub minutes: Vec<f64>,
    pub sensors: [Vec<f64>; 3],
    pub sensor_mean: Vec<f64>,
    pub fan: Vec<f64>,
    pub heating: Vec<f64>,
}

impl HotboxSeries {
    pub fn new(capacity: usize) -> HotboxSeries {
        HotboxSeries {
            minutes: Vec::with_capacity(capacity),
            sensors: [
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
            ],
            sensor_mean: Vec::with_capacity(capacity),
            fan: Vec::with_capacity(capacity),
            heating: Vec::with_capacity(capacity),
        }
    }

    /// Splits the records into parallel series,
    /// converting the elapsed time to minutes and scaling the fan to 0..1.
    pub fn from_records(records: &[LogRecord]) -> HotboxSeries {
        let mut series = HotboxSeries::new(records.len());
        for r in records {
            series.minutes.push(r.elapsed_ms as f64 / MS_PER_MINUTE);
            for (s, &v) in series.sensors.iter_mut().zip(r.sensor_readings.iter()) {
                s.push(v);
            }
            series.sensor_mean.push(r.sensor_mean);
            series.fan.push(r.fan_level as f64 / FAN_MAX);
            series.heating.push(r.heating_element as f64);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }

    /// average of the whole sensorMean series
    pub fn mean_of_means(&self) -> Result<f64, HotboxError> {
        mean(&self.sensor_mean).ok_or(HotboxError::EmptySeries)
    }

    /// flat line at the average of sensorMean
    pub fn mean_reference(&self) -> Result<Vec<f64>, HotboxError> {
        Ok(vec![self.mean_of_means()?; self.len()])
    }

    /// flat line at the target temperature
    pub fn target_reference(&self, target: f64) -> Vec<f64> {
        vec![target; self.len()]
    }

    /// trailing moving average of sensorMean, see `trailing_mean`
    pub fn moving_average(&self, window: usize) -> Result<Vec<Option<f64>>, HotboxError> {
        trailing_mean(&self.sensor_mean, window)
    }

    /// curves of the upper panel, in drawing order
    pub fn sensor_curves(&self, overlays: &Overlays) -> Vec<Curve> {
        let mut curves = Vec::with_capacity(7);
        if let Some((_, target)) = &overlays.target {
            curves.push(Curve::new(
                "Target temperature",
                RGBColor(0, 150, 0),
                1,
                self.pair(target),
            ));
        }
        curves.push(Curve::new(
            "Sensor00 (lower)",
            RGBColor(255, 165, 0),
            2,
            self.pair(&self.sensors[0]),
        ));
        curves.push(Curve::new(
            "Sensor01 (upper)",
            RGBColor(220, 0, 0),
            2,
            self.pair(&self.sensors[1]),
        ));
        curves.push(Curve::new(
            "Sensor inside Mean",
            RGBColor(255, 0, 255),
            3,
            self.pair(&self.sensor_mean),
        ));
        if let Some((window, mavg)) = &overlays.moving_average {
            let points = self
                .minutes
                .iter()
                .zip(mavg.iter())
                .filter_map(|(&t, v)| v.map(|v| (t, v)))
                .collect();
            curves.push(Curve::new(
                format!("Moving average, window: {}", window),
                RGBColor(30, 100, 200),
                2,
                points,
            ));
        }
        curves.push(Curve::new(
            format!("Average: {:.2}", overlays.mean),
            RGBColor(255, 0, 255),
            1,
            self.pair(&overlays.mean_reference),
        ));
        curves.push(Curve::new(
            "sensor02 (outside)",
            RGBColor(0, 100, 0),
            2,
            self.pair(&self.sensors[2]),
        ));
        curves
    }

    /// curves of the lower panel
    pub fn actuator_curves(&self) -> Vec<Curve> {
        vec![
            Curve::new(
                "Fan (scaled to 0:1)",
                RGBColor(30, 100, 200),
                2,
                self.pair(&self.fan),
            ),
            Curve::new(
                "Heating element (digital)",
                RGBColor(255, 130, 0),
                2,
                self.pair(&self.heating),
            ),
        ]
    }

    fn pair(&self, values: &[f64]) -> Vec<(f64, f64)> {
        self.minutes
            .iter()
            .zip(values.iter())
            .map(|(&t, &v)| (t, v))
            .collect()
    }

    /// plots the sensors (upper 3/4) and the actuators (lower 1/4) to svg
    pub fn plot_minutes(
        &self,
        overlays: &Overlays,
        fout: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (xmin, xmax) = min_and_max(&self.minutes[..]).ok_or(HotboxError::EmptySeries)?;
        let (xmin, xmax) = if xmin == xmax {
            (xmin - 1., xmax + 1.)
        } else {
            (xmin, xmax)
        };

        let sensor_curves = self.sensor_curves(overlays);
        let yvalues: Vec<f64> = sensor_curves
            .iter()
            .flat_map(|c| c.points.iter().map(|p| p.1))
            .filter(|y| y.is_finite())
            .collect();
        let (ymin, ymax) = min_and_max(&yvalues[..]).ok_or(HotboxError::EmptySeries)?;
        let yspan = if ymax > ymin { (ymax - ymin) / 10. } else { 1. };
        let ymin = ymin - yspan;
        let ymax = ymax + yspan;

        let root = SVGBackend::new(fout, (1600, 1000)).into_drawing_area();
        root.fill(&WHITE)?;
        let (upper, lower) = root.split_vertically(750);

        let mut chart = ChartBuilder::on(&upper)
            .caption("Sensors", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
            .label_style(("sans-serif", 20))
            .y_desc("Temperature [C]")
            .y_label_formatter(&|y: &f64| format!("{:.1}", y))
            .draw()?;
        for curve in sensor_curves {
            let style = curve.color.stroke_width(curve.width);
            chart
                .draw_series(LineSeries::new(curve.points, style))?
                .label(curve.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 18))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;

        let mut chart = ChartBuilder::on(&lower)
            .caption("Actuators", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(xmin..xmax, -0.1f64..1.1f64)?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
            .label_style(("sans-serif", 20))
            .x_desc("Minutes since start")
            .y_desc("Value")
            .y_labels(5)
            .draw()?;
        for curve in self.actuator_curves() {
            let style = curve.color.stroke_width(curve.width);
            chart
                .draw_series(LineSeries::new(curve.points, style))?
                .label(curve.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 18))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

/// The reference and optional lines drawn on top of the sensor panel
#[derive(Debug, Clone, PartialEq)]
pub struct Overlays {
    pub mean: f64,
    pub mean_reference: Vec<f64>,
    /// window size and the trailing average, `None` where the window is not full yet
    pub moving_average: Option<(usize, Vec<Option<f64>>)>,
    pub target: Option<(f64, Vec<f64>)>,
}

impl Overlays {
    /// Computes the mean reference (fails on an empty series) and the optional lines.
    /// A moving average that cannot be computed is reported and left out.
    pub fn compute(
        series: &HotboxSeries,
        target: Option<f64>,
        window: Option<usize>,
    ) -> Result<Overlays, HotboxError> {
        let mean = series.mean_of_means()?;
        let mean_reference = series.mean_reference()?;
        let moving_average = match window {
            Some(w) => match series.moving_average(w) {
                Ok(mavg) => Some((w, mavg)),
                Err(e) => {
                    warn!(
                        "not enough data to create moving average with the specified window: {}",
                        e
                    );
                    None
                }
            },
            None => None,
        };
        let target = target.map(|t| (t, series.target_reference(t)));
        Ok(Overlays {
            mean,
            mean_reference,
            moving_average,
            target,
        })
    }
}

/// A labelled line series ready to be drawn
#[derive(Clone)]
pub struct Curve {
    pub label: String,
    pub color: RGBColor,
    pub width: u32,
    pub points: Vec<(f64, f64)>,
}

impl Curve {
    pub fn new<L: Into<String>>(
        label: L,
        color: RGBColor,
        width: u32,
        points: Vec<(f64, f64)>,
    ) -> Curve {
        Curve {
            label: label.into(),
            color,
            width,
            points,
        }
    }
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}

pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        None
    } else {
        Some(v.iter().sum::<f64>() / v.len() as f64)
    }
}

/// rolls a flat window of length w over v, ending at each position;
/// the first w - 1 positions have no full window and are None
pub fn trailing_mean(v: &[f64], w: usize) -> Result<Vec<Option<f64>>, HotboxError> {
    if w == 0 {
        return Err(HotboxError::ZeroWindow);
    }
    if w > v.len() {
        return Err(HotboxError::WindowTooLarge {
            window: w,
            len: v.len(),
        });
    }
    let mut vout: Vec<Option<f64>> = Vec::with_capacity(v.len());
    vout.resize(w - 1, None);
    vout.extend(v.windows(w).map(|win| Some(win.iter().sum::<f64>() / w as f64)));
    Ok(vout)
}
