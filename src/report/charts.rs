//! Chart rendering for activity reports.
//!
//! Each renderer is a pure function from data to a PNG byte buffer; there is
//! no shared mutable state and concurrent calls are safe. A failed render is
//! never fatal to a report - callers drop the chart and keep going.
//!
//! Text drawing needs a TTF font. The font is looked up once per process:
//! `RIISE_CHART_FONT` first, then a few well-known system paths. Without one,
//! every renderer returns [`ChartError::FontUnavailable`].

use plotters::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Result of a render: a PNG image, or an explicit no-data sentinel for
/// degenerate inputs (e.g. a pie chart whose values sum to zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chart {
    Image(Vec<u8>),
    NoData,
}

#[derive(Debug)]
pub enum ChartError {
    FontUnavailable,
    InvalidInput(&'static str),
    Backend(String),
    Encode(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontUnavailable => write!(f, "no usable chart font registered"),
            Self::InvalidInput(msg) => write!(f, "invalid chart input: {msg}"),
            Self::Backend(msg) => write!(f, "chart backend: {msg}"),
            Self::Encode(msg) => write!(f, "png encode: {msg}"),
        }
    }
}

impl std::error::Error for ChartError {}

/// One bar series over a shared category axis.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub name: String,
    /// Parallel to the category list handed to [`render_grouped_bar`].
    pub values: Vec<u64>,
}

/// One line in a timeline chart: (year, count) points.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub name: String,
    pub points: Vec<(i32, u32)>,
}

const PALETTE: [RGBColor; 4] = [
    RGBColor(66, 133, 244),
    RGBColor(219, 68, 55),
    RGBColor(244, 180, 0),
    RGBColor(15, 157, 88),
];

const PIE_SIZE: (u32, u32) = (700, 400);
const BAR_SIZE: (u32, u32) = (1000, 600);
const LINE_SIZE: (u32, u32) = (800, 400);

/// Fraction of one category slot taken by a single bar.
const BAR_WIDTH: f64 = 0.2;

static FONT_READY: OnceLock<bool> = OnceLock::new();

const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
];

fn load_font() -> bool {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(path) = std::env::var("RIISE_CHART_FONT") {
        if !path.trim().is_empty() {
            candidates.push(PathBuf::from(path.trim()));
        }
    }
    candidates.extend(FONT_PATHS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font("sans-serif", FontStyle::Normal, bytes).is_ok() {
            tracing::debug!("chart font registered from {:?}", path);
            return true;
        }
    }

    tracing::warn!("no chart font found; charts will be omitted from reports");
    false
}

/// Whether chart text can be drawn in this process.
pub fn fonts_available() -> bool {
    *FONT_READY.get_or_init(load_font)
}

fn ensure_font() -> Result<(), ChartError> {
    if fonts_available() {
        Ok(())
    } else {
        Err(ChartError::FontUnavailable)
    }
}

fn backend_err<E: std::error::Error>(e: E) -> ChartError {
    ChartError::Backend(e.to_string())
}

fn encode_png(buf: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    use image::ImageEncoder;

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(buf, width, height, image::ColorType::Rgb8)
        .map_err(|e| ChartError::Encode(e.to_string()))?;
    Ok(out)
}

/// Pie chart over labelled values. Returns [`Chart::NoData`] when the values
/// sum to zero rather than drawing a degenerate disc.
pub fn render_pie(data: &[(String, u64)], title: &str) -> Result<Chart, ChartError> {
    if data.is_empty() || data.iter().map(|(_, v)| *v).sum::<u64>() == 0 {
        return Ok(Chart::NoData);
    }
    ensure_font()?;

    let (width, height) = PIE_SIZE;
    let mut buf = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;
        let root = root
            .titled(title, ("sans-serif", 22))
            .map_err(backend_err)?;

        let center = ((width / 2) as i32, (height / 2) as i32 + 10);
        let radius = 120.0;
        let sizes: Vec<f64> = data.iter().map(|(_, v)| *v as f64).collect();
        let labels: Vec<String> = data
            .iter()
            .map(|(label, value)| format!("{label} ({value})"))
            .collect();
        let colors: Vec<RGBColor> = (0..data.len())
            .map(|i| PALETTE[i % PALETTE.len()])
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.label_style(("sans-serif", 14).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 12).into_font().color(&BLACK));
        root.draw(&pie).map_err(backend_err)?;
        root.present().map_err(backend_err)?;
    }

    encode_png(&buf, width, height).map(Chart::Image)
}

/// Horizontal offset of each series' bar from its category center, so that
/// bar groups never overlap: `offset_i = (i - (n - 1) / 2) * width`.
pub(crate) fn bar_offsets(series_count: usize, width: f64) -> Vec<f64> {
    (0..series_count)
        .map(|i| (i as f64 - (series_count as f64 - 1.0) / 2.0) * width)
        .collect()
}

/// Grouped bar chart: one group of `series.len()` bars per category.
pub fn render_grouped_bar(
    categories: &[String],
    series: &[BarSeries],
    title: &str,
) -> Result<Chart, ChartError> {
    if categories.is_empty() || series.is_empty() {
        return Ok(Chart::NoData);
    }
    for s in series {
        if s.values.len() != categories.len() {
            return Err(ChartError::InvalidInput(
                "series length does not match category count",
            ));
        }
    }
    ensure_font()?;

    let (width, height) = BAR_SIZE;
    let y_max = series
        .iter()
        .flat_map(|s| s.values.iter())
        .copied()
        .max()
        .unwrap_or(0)
        .max(1) as f64
        * 1.1;

    let mut buf = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(70)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..categories.len() as f64 - 0.5, 0f64..y_max)
            .map_err(backend_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len())
            .x_label_style(("sans-serif", 13))
            .x_label_formatter(&|x| {
                let index = x.round();
                if (x - index).abs() > 0.25 || index < 0.0 {
                    return String::new();
                }
                categories
                    .get(index as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .x_desc("Users")
            .y_desc("Count")
            .draw()
            .map_err(backend_err)?;

        let offsets = bar_offsets(series.len(), BAR_WIDTH);
        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            chart
                .draw_series(s.values.iter().enumerate().map(|(j, value)| {
                    let x_center = j as f64 + offsets[i];
                    Rectangle::new(
                        [
                            (x_center - BAR_WIDTH / 2.0, 0.0),
                            (x_center + BAR_WIDTH / 2.0, *value as f64),
                        ],
                        color.filled(),
                    )
                }))
                .map_err(backend_err)?
                .label(s.name.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(backend_err)?;
        root.present().map_err(backend_err)?;
    }

    encode_png(&buf, width, height).map(Chart::Image)
}

/// Sorted distinct years seen across all series.
pub(crate) fn year_domain(series: &[TimeSeries]) -> Vec<i32> {
    let mut years: Vec<i32> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(year, _)| *year))
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Line-over-time chart. Every series gets one marked point per year in the
/// shared domain; years missing from a series plot as zero, not a gap.
pub fn render_timeline(series: &[TimeSeries], title: &str) -> Result<Chart, ChartError> {
    let years = year_domain(series);
    if years.is_empty() {
        return Ok(Chart::NoData);
    }
    ensure_font()?;

    let (width, height) = LINE_SIZE;
    let x_min = years[0] - 1;
    let x_max = years[years.len() - 1] + 1;
    let y_max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, count)| *count))
        .max()
        .unwrap_or(0)
        .max(1)
        + 1;

    let mut buf = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(45)
            .build_cartesian_2d(x_min..x_max, 0u32..y_max)
            .map_err(backend_err)?;

        chart
            .configure_mesh()
            .x_labels(years.len() + 2)
            .x_label_formatter(&|year| year.to_string())
            .x_desc("Year")
            .y_desc("Count")
            .draw()
            .map_err(backend_err)?;

        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points: Vec<(i32, u32)> = years
                .iter()
                .map(|year| {
                    let count = s
                        .points
                        .iter()
                        .find(|(y, _)| y == year)
                        .map(|(_, c)| *c)
                        .unwrap_or(0);
                    (*year, count)
                })
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                .map_err(backend_err)?
                .label(s.name.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                });

            chart
                .draw_series(
                    points
                        .iter()
                        .map(|(x, y)| Circle::new((*x, *y), 4, color.filled())),
                )
                .map_err(backend_err)?;
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(backend_err)?;
        root.present().map_err(backend_err)?;
    }

    encode_png(&buf, width, height).map(Chart::Image)
}
