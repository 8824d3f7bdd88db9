//! Training summary report generation

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{EvaluationMetrics, ForestParams};

/// Summary of one training run
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Training-split rows per class (good, bad)
    pub train_class_counts: [usize; 2],
    pub configs_evaluated: usize,
    pub best_params: Option<ForestParams>,
    pub cv_recall: Option<f64>,
    pub metrics: Option<EvaluationMetrics>,
    step_times: Vec<(String, Duration)>,
}

/// Colour for a score in [0, 1]
fn score_color(value: f64) -> Color {
    if value >= 0.75 {
        Color::Green
    } else if value >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

impl TrainingSummary {
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Default::default()
        }
    }

    pub fn record_step(&mut self, name: &str, elapsed: Duration) {
        self.step_times.push((name.to_string(), elapsed));
    }

    pub fn total_time(&self) -> Duration {
        self.step_times.iter().map(|(_, d)| *d).sum()
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows Loaded"), Cell::new(self.total_rows)]);
        table.add_row(vec![
            Cell::new("🏋️  Train / Test"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows)),
        ]);
        table.add_row(vec![
            Cell::new("⚖️  Train Good / Bad"),
            Cell::new(format!(
                "{} / {}",
                self.train_class_counts[0], self.train_class_counts[1]
            )),
        ]);
        table.add_row(vec![
            Cell::new("🧮 Configs Evaluated"),
            Cell::new(self.configs_evaluated),
        ]);

        if let Some(params) = &self.best_params {
            table.add_row(vec![
                Cell::new("🏆 Best Params"),
                Cell::new(params.to_string()).fg(Color::Cyan),
            ]);
        }
        if let Some(recall) = self.cv_recall {
            table.add_row(vec![
                Cell::new("🎯 CV Recall (bad)"),
                Cell::new(format!("{:.4}", recall))
                    .fg(score_color(recall))
                    .add_attribute(Attribute::Bold),
            ]);
        }
        if let Some(metrics) = &self.metrics {
            table.add_row(vec![
                Cell::new("✅ Test Accuracy"),
                Cell::new(format!("{:.4}", metrics.accuracy)).fg(score_color(metrics.accuracy)),
            ]);
            table.add_row(vec![
                Cell::new("📈 Test ROC-AUC"),
                Cell::new(format!("{:.4}", metrics.roc_auc))
                    .fg(score_color(metrics.roc_auc))
                    .add_attribute(Attribute::Bold),
            ]);
        }

        print_indented(&table);

        if !self.step_times.is_empty() {
            println!();
            let mut timings = Table::new();
            timings.load_preset(UTF8_FULL_CONDENSED);
            timings.set_header(vec![
                Cell::new("Step").add_attribute(Attribute::Bold),
                Cell::new("Time").add_attribute(Attribute::Bold),
            ]);
            for (name, elapsed) in &self.step_times {
                timings.add_row(vec![
                    Cell::new(name),
                    Cell::new(format!("{:.2}s", elapsed.as_secs_f64())),
                ]);
            }
            timings.add_row(vec![
                Cell::new("Total").add_attribute(Attribute::Bold),
                Cell::new(format!("{:.2}s", self.total_time().as_secs_f64()))
                    .add_attribute(Attribute::Bold),
            ]);
            print_indented(&timings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_time_sums_steps() {
        let mut summary = TrainingSummary::new(1000);
        summary.record_step("Load", Duration::from_millis(250));
        summary.record_step("Train", Duration::from_millis(750));
        assert_eq!(summary.total_time(), Duration::from_secs(1));
    }

    #[test]
    fn test_score_color_bands() {
        assert_eq!(score_color(0.9), Color::Green);
        assert_eq!(score_color(0.65), Color::Yellow);
        assert_eq!(score_color(0.3), Color::Red);
    }
}
