use crate::Result;
use crate::store::{DailyRow, TrendRow};
use core::fmt::Write;
use owo_colors::OwoColorize;

const COUNT_WIDTH: usize = 10;

/// Generate the console summary printed after a successful report run.
pub fn generate<W: Write>(trend: &[TrendRow], daily: &[DailyRow], use_color: bool, writer: &mut W) -> Result<()> {
    ConsoleReporter::new(writer, use_color).generate_report(trend, daily)
}

struct ConsoleReporter<'a, W: Write> {
    writer: &'a mut W,
    use_color: bool,
}

impl<'a, W: Write> ConsoleReporter<'a, W> {
    const fn new(writer: &'a mut W, use_color: bool) -> Self {
        Self { writer, use_color }
    }

    fn generate_report(&mut self, trend: &[TrendRow], daily: &[DailyRow]) -> Result<()> {
        self.write_heading("Weekly Attack Trends")?;
        self.write_trend_table(trend)?;

        if !daily.is_empty() {
            writeln!(self.writer)?;
            self.write_heading("Most Recent Week by Day")?;
            self.write_daily_table(daily)?;
        }

        Ok(())
    }

    fn write_heading(&mut self, text: &str) -> Result<()> {
        if self.use_color {
            writeln!(self.writer, "{}", text.bold())?;
        } else {
            writeln!(self.writer, "{text}")?;
        }

        Ok(())
    }

    fn write_trend_table(&mut self, trend: &[TrendRow]) -> Result<()> {
        writeln!(self.writer, "  {:<12}  {:<12}  {:>COUNT_WIDTH$}", "Week Start", "Week End", "Attacks")?;

        let mut previous: Option<u64> = None;
        for row in trend {
            write!(self.writer, "  {:<12}  {:<12}  ", row.week_start, row.week_end)?;
            self.write_count(row.attacks_count, previous)?;
            writeln!(self.writer)?;
            previous = Some(row.attacks_count);
        }

        let total: u64 = trend.iter().map(|row| row.attacks_count).sum();
        writeln!(self.writer, "  Total: {total} attacks over {} weeks", trend.len())?;
        Ok(())
    }

    /// Rising counts are highlighted red, falling counts green; the first row
    /// and unchanged counts stay plain.
    fn write_count(&mut self, count: u64, previous: Option<u64>) -> Result<()> {
        if !self.use_color {
            write!(self.writer, "{count:>COUNT_WIDTH$}")?;
            return Ok(());
        }

        match previous {
            Some(prev) if count > prev => write!(self.writer, "{:>COUNT_WIDTH$}", count.red())?,
            Some(prev) if count < prev => write!(self.writer, "{:>COUNT_WIDTH$}", count.green())?,
            _ => write!(self.writer, "{count:>COUNT_WIDTH$}")?,
        }

        Ok(())
    }

    fn write_daily_table(&mut self, daily: &[DailyRow]) -> Result<()> {
        for row in daily {
            writeln!(self.writer, "  {:<12}  {:<10}  {:>COUNT_WIDTH$}", row.date, row.day_name, row.attacks_count)?;
        }

        Ok(())
    }
}
