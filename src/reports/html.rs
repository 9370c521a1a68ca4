use crate::Result;
use crate::store::{DailyRow, TrendRow};
use core::fmt::Write;

/// Generate the static HTML chart document for a week's report.
///
/// The chart is a Google Charts column chart of weekly attack counts, with
/// the daily breakdown of the most recent week rendered as a table below it.
/// An empty trend produces an explicit error placeholder instead of a chart.
pub fn generate<W: Write>(trend: &[TrendRow], daily: &[DailyRow], title: &str, writer: &mut W) -> Result<()> {
    let mut generator = HtmlGenerator::new(writer, title);

    if trend.is_empty() {
        generator.generate_placeholder()
    } else {
        generator.generate(trend, daily)
    }
}

struct HtmlGenerator<'a, W: Write> {
    writer: &'a mut W,
    title: &'a str,
}

impl<'a, W: Write> HtmlGenerator<'a, W> {
    const fn new(writer: &'a mut W, title: &'a str) -> Self {
        Self { writer, title }
    }

    fn generate(&mut self, trend: &[TrendRow], daily: &[DailyRow]) -> Result<()> {
        self.write_header()?;
        self.write_chart_script(trend)?;
        self.write_styles()?;
        self.write_body_start()?;

        writeln!(self.writer, "<div id=\"weekly_chart\" class=\"chart\"></div>")?;

        if !daily.is_empty() {
            self.write_daily_table(daily)?;
        }

        self.write_footer()?;
        Ok(())
    }

    /// A document stating that there is nothing to chart, written in place of
    /// the report when no trend rows exist.
    fn generate_placeholder(&mut self) -> Result<()> {
        self.write_header()?;
        self.write_styles()?;
        self.write_body_start()?;
        writeln!(self.writer, "<h2>Error: no weekly trend data available</h2>")?;
        self.write_footer()?;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        writeln!(self.writer, "<!DOCTYPE html>")?;
        writeln!(self.writer, "<html lang=\"en\">")?;
        writeln!(self.writer, "<head>")?;
        writeln!(self.writer, "<meta charset=\"UTF-8\">")?;
        writeln!(self.writer, "<title>{}</title>", html_escape(self.title))?;
        Ok(())
    }

    fn write_chart_script(&mut self, trend: &[TrendRow]) -> Result<()> {
        writeln!(
            self.writer,
            "<script type=\"text/javascript\" src=\"https://www.gstatic.com/charts/loader.js\"></script>"
        )?;
        writeln!(self.writer, "<script type=\"text/javascript\">")?;
        writeln!(self.writer, "google.charts.load('current', {{'packages':['corechart']}});")?;
        writeln!(self.writer, "google.charts.setOnLoadCallback(drawChart);")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "function drawChart() {{")?;
        writeln!(self.writer, "  var data = google.visualization.arrayToDataTable([")?;
        writeln!(self.writer, "    ['Week End Date', 'Attacks'],")?;

        for row in trend {
            writeln!(self.writer, "    ['{}', {}],", row.week_end.format("%m/%d/%y"), row.attacks_count)?;
        }

        writeln!(self.writer, "  ]);")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "  var options = {{")?;
        writeln!(self.writer, "    title: '{}',", js_escape(self.title))?;
        writeln!(self.writer, "    titleTextStyle: {{ fontSize: 18, bold: true }},")?;
        writeln!(self.writer, "    hAxis: {{ title: 'Week End-Date', titleTextStyle: {{ fontSize: 14, bold: true }} }},")?;
        writeln!(
            self.writer,
            "    vAxis: {{ title: 'Number of Attacks', titleTextStyle: {{ fontSize: 14, bold: true }}, format: '#,###' }},"
        )?;
        writeln!(self.writer, "    legend: {{ position: 'none' }},")?;
        writeln!(self.writer, "    backgroundColor: '#f8f9fa',")?;
        writeln!(self.writer, "    chartArea: {{ left: 80, top: 80, width: '75%', height: '70%' }},")?;
        writeln!(self.writer, "    colors: ['#007bff'],")?;
        writeln!(self.writer, "    bar: {{ groupWidth: '60%' }}")?;
        writeln!(self.writer, "  }};")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "  var chart = new google.visualization.ColumnChart(document.getElementById('weekly_chart'));"
        )?;
        writeln!(self.writer, "  chart.draw(data, options);")?;
        writeln!(self.writer, "}}")?;
        writeln!(self.writer, "</script>")?;
        Ok(())
    }

    fn write_styles(&mut self) -> Result<()> {
        writeln!(self.writer, "<style>")?;
        writeln!(
            self.writer,
            "body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; margin: 20px; text-align: center; }}"
        )?;
        writeln!(self.writer, ".chart {{ width: 100%; height: 500px; }}")?;
        writeln!(self.writer, "table {{ margin: 30px auto; border-collapse: collapse; }}")?;
        writeln!(self.writer, "th, td {{ border: 1px solid #dee2e6; padding: 8px 16px; }}")?;
        writeln!(self.writer, "th {{ background: #f8f9fa; }}")?;
        writeln!(self.writer, "td.count {{ text-align: right; }}")?;
        writeln!(self.writer, "</style>")?;
        Ok(())
    }

    fn write_body_start(&mut self) -> Result<()> {
        writeln!(self.writer, "</head>")?;
        writeln!(self.writer, "<body>")?;
        Ok(())
    }

    fn write_daily_table(&mut self, daily: &[DailyRow]) -> Result<()> {
        writeln!(self.writer, "<h2>Most Recent Week by Day</h2>")?;
        writeln!(self.writer, "<table>")?;
        writeln!(self.writer, "<tr><th>Date</th><th>Day</th><th>Attacks</th></tr>")?;

        for row in daily {
            writeln!(
                self.writer,
                "<tr><td>{}</td><td>{}</td><td class=\"count\">{}</td></tr>",
                row.date,
                html_escape(&row.day_name),
                row.attacks_count
            )?;
        }

        writeln!(self.writer, "</table>")?;
        Ok(())
    }

    fn write_footer(&mut self) -> Result<()> {
        writeln!(self.writer, "</body>")?;
        writeln!(self.writer, "</html>")?;
        Ok(())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
