//! Stacked-area dispatch chart rendered to SVG.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;

use crate::dispatch::power_balance::{ResultRow, ResultTable};
use crate::error::Error;
use crate::network::Carrier;

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 600;
const LEGEND_HEIGHT: u32 = 50;
const GW_PER_MW: f64 = 1e-3;

const BACKGROUND: RGBColor = RGBColor(0xf7, 0xf7, 0xfa);
const HYDRO: RGBColor = RGBColor(0x10, 0x2b, 0x41);
const BIOMASS: RGBColor = RGBColor(0x4d, 0x81, 0x65);
const WIND_OFFSHORE: RGBColor = RGBColor(119, 146, 171);
const WIND_ONSHORE: RGBColor = RGBColor(131, 170, 200);
const PV: RGBColor = RGBColor(240, 210, 79);
const RESIDUAL: RGBColor = RGBColor(255, 0, 0);
const BATTERIES: RGBColor = RGBColor(160, 153, 188);
const LOAD: RGBColor = RGBColor(128, 128, 128);

/// One stacked series in GW.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub label: &'static str,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn column(rows: &[ResultRow], f: impl Fn(&ResultRow) -> f64) -> Vec<f64> {
    rows.iter().map(|r| round2(f(r))).collect()
}

fn carrier_color(carrier: Carrier) -> RGBColor {
    match carrier {
        Carrier::Hydro => HYDRO,
        Carrier::Biomass => BIOMASS,
        Carrier::WindOff => WIND_OFFSHORE,
        Carrier::WindOn => WIND_ONSHORE,
        Carrier::Pv => PV,
        Carrier::Backup => RESIDUAL,
    }
}

/// Positive layers in stacking order from the bottom up, plus the battery
/// charging layer drawn below zero. Values are GW rounded to two decimals.
pub fn layers(table: &ResultTable) -> (Vec<Layer>, Layer) {
    let gw = table.scale(GW_PER_MW);

    let mut positive: Vec<Layer> = Carrier::RENEWABLES
        .iter()
        .map(|&carrier| Layer {
            label: carrier.label(),
            color: carrier_color(carrier),
            values: column(&gw.rows, |r| r.available(carrier)),
        })
        .collect();
    positive.push(Layer {
        label: Carrier::Backup.label(),
        color: carrier_color(Carrier::Backup),
        values: column(&gw.rows, |r| r.residual_load.max(0.0)),
    });
    positive.push(Layer {
        label: "batteries (discharge)",
        color: BATTERIES,
        values: column(&gw.rows, |r| r.batteries.max(0.0)),
    });
    let charge = Layer {
        label: "batteries (charge)",
        color: BATTERIES,
        values: column(&gw.rows, |r| r.batteries.min(0.0)),
    };

    (positive, charge)
}

/// Legend entries: every stacked layer, the charging layer, then the load line.
pub fn legend(positive: &[Layer], charge: &Layer) -> Vec<(&'static str, RGBColor)> {
    positive
        .iter()
        .chain(std::iter::once(charge))
        .map(|l| (l.label, l.color))
        .chain(std::iter::once(("load", LOAD)))
        .collect()
}

/// Renders the dispatch chart as an SVG document.
///
/// # Errors
///
/// Returns `Error::Plot` if the table is empty or drawing fails.
pub fn render_svg(table: &ResultTable) -> Result<String, Error> {
    if table.is_empty() {
        return Err(Error::Plot("no snapshots to plot".to_string()));
    }
    let mut svg = String::new();
    draw(table, &mut svg).map_err(|e| Error::Plot(e.to_string()))?;
    Ok(svg)
}

/// Renders the chart and writes it to `path`; a `.html` path gets the SVG
/// embedded in a minimal HTML page.
///
/// # Errors
///
/// Returns `Error::Plot` if rendering fails or `Error::Export` on I/O failure.
pub fn write_plot(table: &ResultTable, path: &Path) -> Result<(), Error> {
    let svg = render_svg(table)?;
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    let content = if is_html { wrap_html(&svg) } else { svg };
    fs::write(path, content).map_err(|source| Error::Export {
        path: path.to_path_buf(),
        source,
    })
}

fn wrap_html(svg: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Dispatch</title>\n</head>\n<body style=\"margin:0\">\n{svg}\n</body>\n</html>\n"
    )
}

fn draw(table: &ResultTable, svg: &mut String) -> Result<(), Box<dyn std::error::Error>> {
    let times: Vec<DateTime<Utc>> = table.rows.iter().map(|r| r.time).collect();
    let n = times.len();
    let (positive, charge) = layers(table);
    let load: Vec<f64> = table
        .rows
        .iter()
        .map(|r| round2(r.load * GW_PER_MW))
        .collect();

    let mut top = vec![0.0_f64; n];
    for layer in &positive {
        for (t, v) in layer.values.iter().enumerate() {
            top[t] += v;
        }
    }
    let y_max = top
        .iter()
        .chain(&load)
        .copied()
        .fold(0.0_f64, f64::max);
    let y_min = charge.values.iter().copied().fold(0.0_f64, f64::min);
    let pad = ((y_max - y_min) * 0.05).max(0.1);

    let first = times[0];
    let last = if n > 1 {
        times[n - 1]
    } else {
        first + Duration::hours(1)
    };

    let root = SVGBackend::with_string(svg, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let (upper, lower) = root.split_vertically((HEIGHT - LEGEND_HEIGHT) as i32);

    let mut chart = ChartBuilder::on(&upper)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first..last, (y_min - pad)..(y_max + pad))?;

    chart
        .configure_mesh()
        .y_desc("Power [GW]")
        .x_labels(12)
        .y_labels(10)
        .x_label_formatter(&|dt| dt.format("%m-%d %H:%M").to_string())
        .label_style(("sans-serif", 12))
        .draw()?;

    let mut base = vec![0.0_f64; n];
    for layer in &positive {
        let upper_edge: Vec<f64> = base.iter().zip(&layer.values).map(|(b, v)| b + v).collect();
        chart.draw_series(std::iter::once(Polygon::new(
            band(&times, &base, &upper_edge),
            layer.color.filled(),
        )))?;
        base = upper_edge;
    }

    let zero = vec![0.0_f64; n];
    chart.draw_series(std::iter::once(Polygon::new(
        band(&times, &zero, &charge.values),
        charge.color.filled(),
    )))?;

    chart.draw_series(LineSeries::new(
        times.iter().copied().zip(load.iter().copied()),
        LOAD.stroke_width(2),
    ))?;

    let font = ("sans-serif", 13).into_font().color(&BLACK);
    let mut x = 60;
    for (label, color) in legend(&positive, &charge) {
        lower.draw(&Rectangle::new([(x, 15), (x + 12, 27)], color.filled()))?;
        lower.draw(&Text::new(label, (x + 17, 14), font.clone()))?;
        x += 35 + 7 * label.len() as i32;
    }

    root.present()?;
    Ok(())
}

/// Closed outline between a lower and an upper edge.
fn band(times: &[DateTime<Utc>], lower: &[f64], upper: &[f64]) -> Vec<(DateTime<Utc>, f64)> {
    let mut points: Vec<(DateTime<Utc>, f64)> =
        times.iter().copied().zip(upper.iter().copied()).collect();
    points.extend(times.iter().rev().copied().zip(lower.iter().rev().copied()));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn table() -> ResultTable {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let rows = (0..4)
            .map(|t| ResultRow {
                time: start + Duration::hours(t),
                pv: 10_004.0,
                wind_on: 20_000.0,
                wind_off: 5_000.0,
                biomass: 4_000.0,
                hydro: 1_000.0,
                batteries: if t % 2 == 0 { -2_000.0 } else { 3_000.0 },
                load: 50_000.0,
                curtailed_re: 0.0,
                residual_load: 12_000.0,
                backup: 12_000.0,
                battery_soc: 0.0,
            })
            .collect();
        ResultTable { rows }
    }

    #[test]
    fn layers_are_gigawatts_in_stack_order() {
        let (positive, charge) = layers(&table());
        let labels: Vec<&str> = positive.iter().map(|l| l.label).collect();
        assert_eq!(
            labels,
            [
                "hydro",
                "biomass",
                "wind offshore",
                "wind onshore",
                "pv",
                "residual load",
                "batteries (discharge)"
            ]
        );
        assert_eq!(charge.label, "batteries (charge)");
        assert_eq!(positive[4].values[0], 10.0);
        assert_eq!(positive[6].values, vec![0.0, 3.0, 0.0, 3.0]);
        assert_eq!(charge.values, vec![-2.0, 0.0, -2.0, 0.0]);
    }

    #[test]
    fn legend_lists_charge_and_discharge() {
        let (positive, charge) = layers(&table());
        let labels: Vec<&str> = legend(&positive, &charge).iter().map(|e| e.0).collect();
        assert_eq!(labels.len(), 9);
        assert!(labels.contains(&"batteries (discharge)"));
        assert!(labels.contains(&"batteries (charge)"));
        assert_eq!(labels.last(), Some(&"load"));
    }

    #[test]
    fn renders_svg_with_axis_label() {
        let svg = render_svg(&table()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Power [GW]"));
        assert!(svg.contains("wind onshore"));
        assert!(svg.contains("batteries (charge)"));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            render_svg(&ResultTable::default()),
            Err(Error::Plot(_))
        ));
    }

    #[test]
    fn html_path_wraps_svg() {
        let path = std::env::temp_dir().join(format!("dunkelflaute_plot_{}.html", std::process::id()));
        assert!(write_plot(&table(), &path).is_ok());
        let text = fs::read_to_string(&path).unwrap_or_default();
        let _ = fs::remove_file(&path);
        assert!(text.starts_with("<!DOCTYPE html>"));
        assert!(text.contains("<svg"));
    }
}
