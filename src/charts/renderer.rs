//! Static Chart Renderer
//! Draws the dashboard views off-screen with plotters and encodes them as PNG.

use crate::charts::{coolwarm, short_label, ChartKind};
use crate::stats::{CategoryTrend, CorrelationMatrix, DashboardData, ScatterPairs};
use crate::stats::Histogram as BinnedCounts;
use anyhow::{anyhow, Result};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const BAR: RGBColor = RGBColor(52, 152, 219);
const DENSITY: RGBColor = RGBColor(231, 76, 60);
const CAPTION_SIZE: u32 = 28;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one dashboard panel to PNG bytes.
    pub fn render_png(
        kind: ChartKind,
        data: &DashboardData,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            Self::draw(&root, kind, data)?;
            root.present()?;
        }

        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| anyhow!("bitmap buffer does not match {width}x{height}"))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn draw(root: &Area, kind: ChartKind, data: &DashboardData) -> Result<()> {
        let caption = kind.caption();
        match kind {
            ChartKind::YearlyTrend => {
                let (labels, values): (Vec<String>, Vec<usize>) = data
                    .yearly_counts
                    .entries
                    .iter()
                    .map(|(year, count)| (year.to_string(), *count))
                    .unzip();
                let y_desc = "Number of Offenses";
                Self::draw_bars(root, caption, "Year", y_desc, &labels, &values, false)
            }
            ChartKind::TopDescriptions => {
                let (labels, values): (Vec<String>, Vec<usize>) = data
                    .top_descriptions
                    .entries
                    .iter()
                    .map(|(label, count)| (short_label(label, 24), *count))
                    .unzip();
                Self::draw_bars(root, caption, "Offense Type", "Frequency", &labels, &values, true)
            }
            ChartKind::AgeDistribution => {
                let dist = &data.age_distribution;
                Self::draw_histogram(root, caption, &dist.histogram, &dist.density)
            }
            ChartKind::CorrelationHeatmap => Self::draw_heatmap(root, caption, &data.correlation),
            ChartKind::AgeVsArea => Self::draw_scatter(root, caption, &data.age_vs_area),
            ChartKind::CategoryTrend => Self::draw_trend(root, caption, &data.category_trend),
        }
    }

    fn draw_empty(root: &Area, caption: &str) -> Result<()> {
        let (w, h) = root.dim_in_pixel();
        root.draw(&Text::new(
            format!("{caption}: no data"),
            (w as i32 / 2, h as i32 / 2),
            ("sans-serif", 24)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        Ok(())
    }

    fn draw_bars(
        root: &Area,
        caption: &str,
        x_desc: &str,
        y_desc: &str,
        labels: &[String],
        values: &[usize],
        rotate_labels: bool,
    ) -> Result<()> {
        if labels.is_empty() {
            return Self::draw_empty(root, caption);
        }
        let max = values.iter().copied().max().unwrap_or(0) as u32;
        let y_max = max + max / 10 + 1;

        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", CAPTION_SIZE))
            .margin(15)
            .x_label_area_size(if rotate_labels { 220 } else { 40 })
            .y_label_area_size(70)
            .build_cartesian_2d((0..labels.len() as i32 - 1).into_segmented(), 0u32..y_max)?;

        let label_style = if rotate_labels {
            ("sans-serif", 14).into_font().transform(FontTransform::Rotate90)
        } else {
            ("sans-serif", 14).into_font()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_style(label_style)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR.filled())
                .margin(6)
                .data(values.iter().enumerate().map(|(i, &v)| (i as i32, v as u32))),
        )?;
        Ok(())
    }

    fn draw_histogram(
        root: &Area,
        caption: &str,
        hist: &BinnedCounts,
        density: &[[f64; 2]],
    ) -> Result<()> {
        let (Some(&lo), Some(&hi)) = (hist.edges.first(), hist.edges.last()) else {
            return Self::draw_empty(root, caption);
        };
        let peak = hist
            .counts
            .iter()
            .map(|&c| c as f64)
            .chain(density.iter().map(|p| p[1]))
            .fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", CAPTION_SIZE))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(lo..hi, 0.0..(peak * 1.1).max(1.0))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Age")
            .y_desc("Count")
            .draw()?;

        chart.draw_series(hist.counts.iter().zip(hist.edges.windows(2)).map(|(&count, edge)| {
            Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], BAR.mix(0.7).filled())
        }))?;
        if !density.is_empty() {
            chart.draw_series(LineSeries::new(
                density.iter().map(|p| (p[0], p[1])),
                DENSITY.stroke_width(2),
            ))?;
        }
        Ok(())
    }

    fn draw_heatmap(root: &Area, caption: &str, matrix: &CorrelationMatrix) -> Result<()> {
        let n = matrix.labels.len() as i32;
        if n == 0 {
            return Self::draw_empty(root, caption);
        }

        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", CAPTION_SIZE))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(190)
            .build_cartesian_2d((0..n - 1).into_segmented(), (0..n - 1).into_segmented())?;

        // row 0 sits at the top, as in a printed matrix
        let labels = &matrix.labels;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(labels.len())
            .y_labels(labels.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels
                    .get((n - 1 - *i) as usize)
                    .cloned()
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        for (row, values) in matrix.values.iter().enumerate() {
            let y = n - 1 - row as i32;
            for (col, &value) in values.iter().enumerate() {
                let x = col as i32;
                let [r, g, b] = coolwarm(value);
                chart.draw_series(std::iter::once(Rectangle::new(
                    [
                        (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                    ],
                    RGBColor(r, g, b).filled(),
                )))?;

                let annotation = if value.is_nan() {
                    "nan".to_string()
                } else {
                    format!("{value:.2}")
                };
                chart.draw_series(std::iter::once(Text::new(
                    annotation,
                    (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                    ("sans-serif", 26)
                        .into_font()
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                )))?;
            }
        }
        Ok(())
    }

    fn draw_scatter(root: &Area, caption: &str, pairs: &ScatterPairs) -> Result<()> {
        if pairs.points.is_empty() {
            return Self::draw_empty(root, caption);
        }
        let bounds = |axis: usize| {
            let (lo, hi) = pairs
                .points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p[axis]), hi.max(p[axis]))
                });
            let pad = ((hi - lo) * 0.05).max(0.5);
            (lo - pad)..(hi + pad)
        };

        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", CAPTION_SIZE))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(bounds(0), bounds(1))?;
        chart
            .configure_mesh()
            .x_desc("Age")
            .y_desc("Reporting Area")
            .draw()?;

        chart.draw_series(
            pairs
                .points
                .iter()
                .map(|p| Circle::new((p[0], p[1]), 3, BAR.mix(0.5).filled())),
        )?;
        Ok(())
    }

    fn draw_trend(root: &Area, caption: &str, trend: &CategoryTrend) -> Result<()> {
        let (Some(&first), Some(&last)) = (trend.years.first(), trend.years.last()) else {
            return Self::draw_empty(root, caption);
        };
        let peak = trend.counts.iter().flatten().copied().max().unwrap_or(0) as f64;

        let mut chart = ChartBuilder::on(root)
            .caption(caption, ("sans-serif", CAPTION_SIZE))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d((first - 1)..(last + 1), 0.0..(peak * 1.1).max(1.0))?;
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Number of Offenses")
            .draw()?;

        for (idx, (category, counts)) in trend.categories.iter().zip(&trend.counts).enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    trend
                        .years
                        .iter()
                        .zip(counts)
                        .map(|(&year, &count)| (year, count as f64)),
                    color.stroke_width(2),
                ))?
                .label(category.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CategoryFilter;
    use crate::stats::{AgeDistribution, DescriptionCounts, YearlyCounts};

    fn sample() -> DashboardData {
        DashboardData {
            selection: CategoryFilter::All,
            row_count: 3,
            yearly_counts: YearlyCounts {
                entries: vec![(2014, 2), (2015, 1)],
            },
            top_descriptions: DescriptionCounts {
                entries: vec![("THEFT FROM AUTO".to_string(), 2), ("ASSAULT".to_string(), 1)],
            },
            age_distribution: AgeDistribution {
                ages: vec![20.0, 30.0, 40.0],
                histogram: BinnedCounts {
                    edges: vec![20.0, 30.0, 40.0],
                    counts: vec![1, 2],
                },
                density: vec![[20.0, 0.5], [30.0, 1.0], [40.0, 0.5]],
            },
            correlation: CorrelationMatrix {
                labels: vec!["offensereportingarea".to_string(), "offenseage".to_string()],
                values: vec![vec![1.0, 0.25], vec![0.25, 1.0]],
            },
            age_vs_area: ScatterPairs {
                points: vec![[20.0, 100.0], [30.0, 200.0], [40.0, 300.0]],
            },
            category_trend: CategoryTrend {
                years: vec![2014, 2015],
                categories: vec!["Burglary".to_string(), "Theft".to_string()],
                counts: vec![vec![1, 0], vec![1, 1]],
            },
        }
    }

    #[test]
    #[ignore = "requires a system sans-serif font"]
    fn test_render_every_panel_as_png() {
        let data = sample();
        for kind in ChartKind::ALL {
            let bytes = StaticChartRenderer::render_png(kind, &data, 640, 480).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (640, 480));
        }
    }

    #[test]
    #[ignore = "requires a system sans-serif font"]
    fn test_render_empty_views() {
        let mut data = sample();
        data.yearly_counts = YearlyCounts::default();
        data.age_distribution = AgeDistribution::default();
        data.age_vs_area = ScatterPairs::default();
        data.category_trend = CategoryTrend::default();
        for kind in ChartKind::ALL {
            assert!(StaticChartRenderer::render_png(kind, &data, 320, 240).is_ok());
        }
    }
}
