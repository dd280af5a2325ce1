use crate::core::aggregate::{Crosstab, EcosystemReport, Share, StageSplit};
use crate::utils::error::{EtlError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;
type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const PALETTE: [RGBColor; 8] = [
    RGBColor(0x2E, 0x86, 0xAB),
    RGBColor(0xF1, 0x8F, 0x01),
    RGBColor(0x06, 0xA7, 0x7D),
    RGBColor(0xD6, 0x22, 0x46),
    RGBColor(0xA2, 0x3B, 0x72),
    RGBColor(0x8B, 0x5A, 0x3C),
    RGBColor(0x6C, 0x4B, 0x5E),
    RGBColor(0x99, 0x99, 0x99),
];
const STAGE_COLORS: [RGBColor; 8] = [
    RGBColor(0xA2, 0x3B, 0x72),
    RGBColor(0xF1, 0x8F, 0x01),
    RGBColor(0x2E, 0x86, 0xAB),
    RGBColor(0x06, 0xA7, 0x7D),
    RGBColor(0xD6, 0x22, 0x46),
    RGBColor(0x8B, 0x5A, 0x3C),
    RGBColor(0x6C, 0x4B, 0x5E),
    RGBColor(0x99, 0x99, 0x99),
];
const EARLY_COLOR: RGBColor = RGBColor(0xA8, 0xDA, 0xDC);
const GROWTH_COLOR: RGBColor = RGBColor(0xE6, 0x39, 0x46);
const NAVY: RGBColor = RGBColor(0x00, 0x00, 0x80);

/// The ten report charts. File names are stable; downstream docs link them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    TopIndustries,
    FundingStages,
    RegionalDistribution,
    IndustryStageHeatmap,
    VerificationAwards,
    MaturityFunnel,
    IndustryMaturity,
    TechVsNonTech,
    EarlyVsGrowth,
    KeyMetrics,
}

impl ChartKind {
    pub const ALL: [ChartKind; 10] = [
        ChartKind::TopIndustries,
        ChartKind::FundingStages,
        ChartKind::RegionalDistribution,
        ChartKind::IndustryStageHeatmap,
        ChartKind::VerificationAwards,
        ChartKind::MaturityFunnel,
        ChartKind::IndustryMaturity,
        ChartKind::TechVsNonTech,
        ChartKind::EarlyVsGrowth,
        ChartKind::KeyMetrics,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::TopIndustries => "01_top_industries.png",
            ChartKind::FundingStages => "02_funding_stages.png",
            ChartKind::RegionalDistribution => "03_regional_distribution.png",
            ChartKind::IndustryStageHeatmap => "04_industry_stage_heatmap.png",
            ChartKind::VerificationAwards => "05_verification_awards.png",
            ChartKind::MaturityFunnel => "06_maturity_funnel.png",
            ChartKind::IndustryMaturity => "07_industry_maturity.png",
            ChartKind::TechVsNonTech => "08_tech_vs_nontech.png",
            ChartKind::EarlyVsGrowth => "09_early_vs_growth.png",
            ChartKind::KeyMetrics => "10_key_metrics.png",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChartKind::TopIndustries => "Top industries distribution",
            ChartKind::FundingStages => "Startup distribution by funding stage",
            ChartKind::RegionalDistribution => "Top regions by startup count",
            ChartKind::IndustryStageHeatmap => "Industry vs funding stage heatmap",
            ChartKind::VerificationAwards => "Verification and recognition status",
            ChartKind::MaturityFunnel => "Startup maturity funnel",
            ChartKind::IndustryMaturity => "Industry maturity index",
            ChartKind::TechVsNonTech => "Tech vs non-tech industries comparison",
            ChartKind::EarlyVsGrowth => "Early stage vs growth stage by industry",
            ChartKind::KeyMetrics => "Key ecosystem metrics overview",
        }
    }

    fn size(self) -> (u32, u32) {
        match self {
            ChartKind::IndustryStageHeatmap => (1400, 800),
            ChartKind::MaturityFunnel => (1400, 1000),
            ChartKind::VerificationAwards => (1000, 600),
            _ => (1400, 700),
        }
    }
}

/// Draws one chart of `report` and returns it PNG-encoded.
pub fn render(kind: ChartKind, report: &EcosystemReport) -> Result<Vec<u8>> {
    let size = kind.size();
    let drawn = match kind {
        ChartKind::TopIndustries => {
            let bars = counts(report.top_industries.iter().map(|c| (&c.label, c.count)));
            render_png(size, |root| {
                let title = format!("Top {} Industries", bars.len());
                draw_columns(
                    root,
                    &title,
                    "Industry",
                    "Number of Startups",
                    &bars,
                    &PALETTE[..1],
                    |_, v| format!("{}", v as usize),
                )
            })
        }
        ChartKind::FundingStages => {
            let bars: Vec<(String, f64)> = report
                .stages
                .iter()
                .map(|s| (s.stage.label().to_string(), s.count as f64))
                .collect();
            render_png(size, |root| {
                draw_columns(
                    root,
                    "Startup Distribution by Funding Stage",
                    "Funding Stage",
                    "Number of Startups",
                    &bars,
                    &STAGE_COLORS,
                    |_, v| format!("{}", v as usize),
                )
            })
        }
        ChartKind::RegionalDistribution => {
            let bars = counts(report.top_regions.iter().map(|c| (&c.label, c.count)));
            render_png(size, |root| {
                let title = format!("Top {} Regions by Startup Count", bars.len());
                draw_rows(root, &title, "Number of Startups", &bars, PALETTE[2], |v| {
                    format!("{}", v as usize)
                })
            })
        }
        ChartKind::IndustryStageHeatmap => render_png(size, |root| {
            draw_heatmap(root, "Top Industries by Funding Stage", &report.industry_stage)
        }),
        ChartKind::VerificationAwards => {
            let bars = shares(&report.status_flags);
            let flags = &report.status_flags;
            render_png(size, |root| {
                draw_columns(
                    root,
                    "Startup Verification and Recognition Status",
                    "Status Category",
                    "Number of Startups",
                    &bars,
                    &PALETTE[..4],
                    |i, v| format!("{} ({:.1}%)", v as usize, flags[i].percent),
                )
            })
        }
        ChartKind::MaturityFunnel => render_png(size, |root| {
            draw_funnel(
                root,
                "Startup Maturity Funnel: From Idea to Expansion",
                &report.funnel,
            )
        }),
        ChartKind::IndustryMaturity => {
            let bars: Vec<(String, f64)> = report
                .maturity
                .iter()
                .map(|m| (m.industry.clone(), m.average))
                .collect();
            render_png(size, |root| {
                draw_rows(
                    root,
                    "Industry Maturity Index (Higher = More Mature Startups)",
                    "Average Maturity Score",
                    &bars,
                    PALETTE[4],
                    |v| format!("{:.2}", v),
                )
            })
        }
        ChartKind::TechVsNonTech => render_png(size, |root| {
            let split = &report.tech_split;
            let panels = root.split_evenly((1, 2));
            let names = ["Tech Industries".to_string(), "Non-Tech Industries".to_string()];
            let count_bars = [
                (names[0].clone(), split.tech.count as f64),
                (names[1].clone(), split.non_tech.count as f64),
            ];
            let shares = [split.tech.percent, split.non_tech.percent];
            draw_columns(
                &panels[0],
                "Startup Count: Tech vs Non-Tech",
                "",
                "Number of Startups",
                &count_bars,
                &PALETTE[..2],
                |i, v| format!("{} ({:.1}%)", v as usize, shares[i]),
            )?;
            let maturity_bars = [
                (names[0].clone(), split.tech.average_maturity),
                (names[1].clone(), split.non_tech.average_maturity),
            ];
            draw_columns(
                &panels[1],
                "Average Maturity: Tech vs Non-Tech",
                "",
                "Average Maturity Score",
                &maturity_bars,
                &PALETTE[..2],
                |_, v| format!("{:.2}", v),
            )
        }),
        ChartKind::EarlyVsGrowth => render_png(size, |root| {
            draw_stage_split(
                root,
                "Top Industries: Early Stage vs Growth Stage Startups",
                &report.early_vs_growth,
            )
        }),
        ChartKind::KeyMetrics => {
            let bars = counts(report.key_metrics.iter().map(|c| (&c.label, c.count)));
            render_png(size, |root| {
                draw_columns(
                    root,
                    "Startup Ecosystem: Key Metrics Overview",
                    "",
                    "Count",
                    &bars,
                    &PALETTE[..6],
                    |_, v| format!("{}", v as usize),
                )
            })
        }
    };

    drawn.map_err(|e| EtlError::chart(kind.file_name(), e))
}

/// Whether a sans-serif font can be loaded. Every chart needs one for its text.
pub fn fonts_available() -> bool {
    std::panic::catch_unwind(|| ("sans-serif", 12).into_font().box_size("Ag").is_ok())
        .unwrap_or(false)
}

fn counts<'a>(items: impl Iterator<Item = (&'a String, usize)>) -> Vec<(String, f64)> {
    items.map(|(label, n)| (label.clone(), n as f64)).collect()
}

fn shares(items: &[Share]) -> Vec<(String, f64)> {
    items
        .iter()
        .map(|s| (s.label.clone(), s.count as f64))
        .collect()
}

fn render_png<F>(size: (u32, u32), draw: F) -> DrawResult<Vec<u8>>
where
    F: FnOnce(&Canvas<'_>) -> DrawResult<()>,
{
    let (width, height) = size;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }

    let image = image::RgbImage::from_raw(width, height, pixels)
        .ok_or("pixel buffer does not match chart size")?;
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image).write_to(&mut png, image::ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// Label of the category centred on `position`, blank between categories.
fn label_at(labels: &[String], position: f64) -> String {
    let nearest = position.round();
    if (position - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}

/// Rows are drawn top-down, so row `i` sits at `rows - 1 - i` on the y axis.
fn row_position(rows: usize, index: usize) -> f64 {
    (rows - 1 - index) as f64
}

fn label_at_row(labels: &[String], position: f64) -> String {
    let nearest = position.round();
    if (position - nearest).abs() > 1e-6 || nearest < 0.0 || nearest as usize >= labels.len() {
        return String::new();
    }
    labels[labels.len() - 1 - nearest as usize].clone()
}

fn headroom(values: impl Iterator<Item = f64>) -> f64 {
    let top = values.fold(0.0, f64::max);
    if top > 0.0 {
        top * 1.15
    } else {
        1.0
    }
}

fn draw_columns(
    root: &Canvas<'_>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    bars: &[(String, f64)],
    colors: &[RGBColor],
    annotate: impl Fn(usize, f64) -> String,
) -> DrawResult<()> {
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
    let slots = bars.len().max(1);
    let y_max = headroom(bars.iter().map(|(_, v)| *v));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(slots as f64 - 0.5), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&|x: &f64| label_at(&labels, *x))
        .x_label_style(("sans-serif", 13))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        let x = i as f64;
        let color = colors[i % colors.len()];
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *value)], color.filled())
    }))?;

    let value_style =
        TextStyle::from(("sans-serif", 15).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        Text::new(annotate(i, *value), (i as f64, *value), value_style.clone())
    }))?;

    Ok(())
}

fn draw_rows(
    root: &Canvas<'_>,
    title: &str,
    x_desc: &str,
    bars: &[(String, f64)],
    color: RGBColor,
    annotate: impl Fn(f64) -> String,
) -> DrawResult<()> {
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
    let rows = bars.len();
    let slots = rows.max(1);
    let x_max = headroom(bars.iter().map(|(_, v)| *v));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(220)
        .build_cartesian_2d(0f64..x_max, -0.5f64..(slots as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(slots)
        .y_label_formatter(&|y: &f64| label_at_row(&labels, *y))
        .y_label_style(("sans-serif", 13))
        .x_desc(x_desc)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        let y = row_position(rows, i);
        Rectangle::new([(0.0, y - 0.35), (*value, y + 0.35)], color.filled())
    }))?;

    let value_style =
        TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        Text::new(
            format!(" {}", annotate(*value)),
            (*value, row_position(rows, i)),
            value_style.clone(),
        )
    }))?;

    Ok(())
}

/// Yellow → orange → red ramp for `t` in `0..=1`.
fn heat_color(t: f64) -> RGBColor {
    let lerp =
        |a: u8, b: u8, t: f64| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    let t = t.clamp(0.0, 1.0);
    let (from, to, t) = if t < 0.5 {
        ((255, 255, 204), (253, 141, 60), t * 2.0)
    } else {
        ((253, 141, 60), (189, 0, 38), (t - 0.5) * 2.0)
    };
    RGBColor(lerp(from.0, to.0, t), lerp(from.1, to.1, t), lerp(from.2, to.2, t))
}

fn draw_heatmap(root: &Canvas<'_>, title: &str, table: &Crosstab) -> DrawResult<()> {
    let column_labels: Vec<String> = table
        .columns
        .iter()
        .map(|stage| stage.label().to_string())
        .collect();
    let rows = table.rows.len();
    let columns = table.columns.len().max(1);
    let peak = table.max_cell().max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(220)
        .build_cartesian_2d(
            -0.5f64..(columns as f64 - 0.5),
            -0.5f64..(rows.max(1) as f64 - 0.5),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns)
        .y_labels(rows.max(1))
        .x_label_formatter(&|x: &f64| label_at(&column_labels, *x))
        .y_label_formatter(&|y: &f64| label_at_row(&table.rows, *y))
        .x_desc("Funding Stage")
        .y_desc("Industry")
        .draw()?;

    let cells: Vec<(f64, f64, usize)> = table
        .cells
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            let y = row_position(rows, r);
            row.iter()
                .enumerate()
                .map(move |(c, count)| (c as f64, y, *count))
        })
        .collect();

    chart.draw_series(cells.iter().map(|(x, y, count)| {
        Rectangle::new(
            [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
            heat_color(*count as f64 / peak).filled(),
        )
    }))?;

    chart.draw_series(cells.iter().map(|(x, y, count)| {
        let ink = if (*count as f64 / peak) > 0.6 { WHITE } else { BLACK };
        Text::new(
            count.to_string(),
            (*x, *y),
            ("sans-serif", 14)
                .into_font()
                .color(&ink)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        )
    }))?;

    Ok(())
}

fn blues(index: usize, steps: usize) -> RGBColor {
    let t = if steps > 1 {
        index as f64 / (steps - 1) as f64
    } else {
        0.0
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(107.0, 8.0), lerp(174.0, 48.0), lerp(214.0, 107.0))
}

fn draw_funnel(root: &Canvas<'_>, title: &str, steps: &[Share]) -> DrawResult<()> {
    let rows = steps.len();
    let widest = steps.iter().map(|s| s.count).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .build_cartesian_2d(0f64..1.15f64, -0.5f64..(rows.max(1) as f64 - 0.5))?;

    for (i, step) in steps.iter().enumerate() {
        let y = row_position(rows, i);
        let width = step.count as f64 / widest * 0.85;
        let left = (1.0 - width) / 2.0;
        let ink = if i > 2 { WHITE } else { NAVY };

        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, y - 0.4), (left + width, y + 0.4)],
            blues(i, rows).filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            step.label.clone(),
            (0.5, y),
            ("sans-serif", 18)
                .into_font()
                .color(&ink)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{} ({:.1}%)", step.count, step.percent),
            (left + width + 0.02, y),
            ("sans-serif", 15)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        )))?;
    }

    Ok(())
}

fn draw_stage_split(root: &Canvas<'_>, title: &str, splits: &[StageSplit]) -> DrawResult<()> {
    let labels: Vec<String> = splits.iter().map(|s| s.industry.clone()).collect();
    let rows = splits.len();
    let x_max = headroom(splits.iter().map(|s| s.early.max(s.growth) as f64));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(220)
        .build_cartesian_2d(0f64..x_max, -0.5f64..(rows.max(1) as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.max(1))
        .y_label_formatter(&|y: &f64| label_at_row(&labels, *y))
        .x_desc("Number of Startups")
        .y_desc("Industry")
        .draw()?;

    chart
        .draw_series(splits.iter().enumerate().map(|(i, split)| {
            let y = row_position(rows, i);
            Rectangle::new([(0.0, y), (split.early as f64, y + 0.35)], EARLY_COLOR.filled())
        }))?
        .label("Early Stage (Idea, Pre-Seed, Seed)")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], EARLY_COLOR.filled()));

    chart
        .draw_series(splits.iter().enumerate().map(|(i, split)| {
            let y = row_position(rows, i);
            Rectangle::new([(0.0, y - 0.35), (split.growth as f64, y)], GROWTH_COLOR.filled())
        }))?
        .label("Growth Stage (Early A, Series A+)")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], GROWTH_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::{analyze, ReportSettings};
    use crate::domain::model::StartupRecord;
    use std::collections::HashSet;

    #[test]
    fn test_chart_file_names_are_unique_and_numbered() {
        let names: HashSet<&str> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(names.len(), 10);
        for (i, kind) in ChartKind::ALL.iter().enumerate() {
            assert!(kind.file_name().starts_with(&format!("{:02}_", i + 1)));
            assert!(kind.file_name().ends_with(".png"));
        }
    }

    #[test]
    fn test_row_labels_read_top_down() {
        let labels = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        assert_eq!(label_at_row(&labels, 2.0), "first");
        assert_eq!(label_at_row(&labels, 0.0), "third");
        assert_eq!(label_at_row(&labels, 0.5), "");
        assert_eq!(label_at_row(&labels, 3.0), "");
        assert_eq!(label_at(&labels, 1.0), "second");
        assert_eq!(label_at(&labels, -1.0), "");
    }

    #[test]
    fn test_heat_color_ramp_ends() {
        assert_eq!(heat_color(0.0), RGBColor(255, 255, 204));
        assert_eq!(heat_color(1.0), RGBColor(189, 0, 38));
        assert_eq!(heat_color(7.0), heat_color(1.0));
    }

    #[test]
    fn test_every_chart_renders_png() {
        if !fonts_available() {
            eprintln!("skipping chart rendering check: no usable sans-serif font");
            return;
        }

        let records: Vec<StartupRecord> = serde_json::from_value(serde_json::json!([
            {"industry": {"id": 1, "name": "FinTech"}, "stage": "seed_", "is_member": true},
            {"industry": {"id": 2, "name": "EdTech"}, "stage": "early_a",
             "region": {"id": 1, "name": "Tashkent"}},
            {"industry": null, "stage": null}
        ]))
        .unwrap();
        let report = analyze(&records, &ReportSettings::default());

        for kind in ChartKind::ALL {
            let png = render(kind, &report).unwrap();
            assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n", "{}", kind.file_name());
        }
    }
}
