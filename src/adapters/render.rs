//! Dashboard presentation: aligned plain-text tables, JSON, or CSV sections.

use crate::domain::model::{AggregateResult, DashboardReport};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;

const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["text", "json", "csv"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

pub fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Csv => Box::new(CsvRenderer),
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&self, report: &DashboardReport) -> Result<String> {
        (**self).render(report)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, report: &DashboardReport) -> Result<String> {
        let mut out = String::new();
        push_heading(&mut out, DashboardReport::TITLE, '=');
        out.push_str(&format!("{} cleaned open houses\n", report.total_records));

        for result in &report.results {
            out.push('\n');
            push_heading(&mut out, result.kind().title(), '-');
            push_table(&mut out, result);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, report: &DashboardReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// One CSV table per query, each preceded by a `# <title>` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render(&self, report: &DashboardReport) -> Result<String> {
        let mut out = String::new();
        for (i, result) in report.results.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("# {}\n", result.kind().title()));
            out.push_str(&csv_table(result)?);
        }
        Ok(out)
    }
}

fn csv_table(result: &AggregateResult) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(result.kind().columns())?;
        for row in result.cells() {
            writer.write_record(&row)?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn push_heading(out: &mut String, title: &str, underline: char) {
    out.push_str(title);
    out.push('\n');
    out.extend(std::iter::repeat(underline).take(title.chars().count()));
    out.push('\n');
}

fn push_table(out: &mut String, result: &AggregateResult) {
    let rows = result.cells();
    if rows.is_empty() {
        out.push_str("(no open houses)\n");
        return;
    }

    let columns = result.kind().columns();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rows.iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    push_row(out, columns.iter().copied(), &widths);
    for row in &rows {
        push_row(out, row.iter().map(String::as_str), &widths);
    }

    // The cumulative series doubles as a line chart: x = date, y = running total.
    if let AggregateResult::DailyCumulativeTotal(points) = result {
        let max = points
            .last()
            .map(|p| p.daily_cumulative_total)
            .unwrap_or(0)
            .max(1);
        out.push('\n');
        for point in points {
            let bar = (point.daily_cumulative_total as usize * CHART_WIDTH) / max as usize;
            out.push_str(&format!(
                "{} | {} {}\n",
                point.open_house_date,
                "#".repeat(bar.max(1)),
                point.daily_cumulative_total
            ));
        }
    }
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
