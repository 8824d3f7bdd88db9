//! Console tables for evaluation results and the CV leaderboard

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::evaluate::ClassMetrics;
use crate::pipeline::trainer::CvResult;
use crate::pipeline::{ClassificationReport, EvaluationMetrics};

fn metric_row(name: &str, m: &ClassMetrics) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(format!("{:.2}", m.precision)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}", m.recall)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}", m.f1)).set_alignment(CellAlignment::Right),
        Cell::new(m.support).set_alignment(CellAlignment::Right),
    ]
}

/// Per-class precision/recall/F1 table
pub fn classification_table(report: &ClassificationReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Class").add_attribute(Attribute::Bold),
        Cell::new("Precision").add_attribute(Attribute::Bold),
        Cell::new("Recall").add_attribute(Attribute::Bold),
        Cell::new("F1").add_attribute(Attribute::Bold),
        Cell::new("Support").add_attribute(Attribute::Bold),
    ]);

    for (class, metrics) in report.classes.iter().enumerate() {
        let name = format!("{} ({})", class, ClassificationReport::class_name(class));
        table.add_row(metric_row(&name, metrics));
    }
    table.add_row(vec![
        Cell::new("accuracy"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{:.2}", report.accuracy)).set_alignment(CellAlignment::Right),
        Cell::new(report.macro_avg.support).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(metric_row("macro avg", &report.macro_avg));
    table.add_row(metric_row("weighted avg", &report.weighted_avg));
    table
}

/// Print accuracy, ROC-AUC and the classification report
pub fn display_evaluation(metrics: &EvaluationMetrics) {
    println!();
    println!(
        "    {} {}",
        style("🧪").cyan(),
        style("EVALUATION").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!("      Accuracy: {}", style(format!("{:.4}", metrics.accuracy)).yellow());
    println!("      ROC-AUC:  {}", style(format!("{:.4}", metrics.roc_auc)).yellow());
    println!();

    for line in classification_table(&metrics.report).to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the `top` best configurations by mean CV recall
pub fn display_leaderboard(results: &[CvResult], top: usize) {
    let mut ranked: Vec<&CvResult> = results.iter().collect();
    ranked.sort_by_key(|r| r.rank);

    println!();
    println!(
        "    {} {}",
        style("🏆").cyan(),
        style("GRID SEARCH LEADERBOARD").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Configuration").add_attribute(Attribute::Bold),
        Cell::new("Mean Recall").add_attribute(Attribute::Bold),
        Cell::new("Std").add_attribute(Attribute::Bold),
    ]);

    for result in ranked.into_iter().take(top) {
        let rank = Cell::new(result.rank);
        let rank = if result.rank == 1 {
            rank.fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            rank
        };
        table.add_row(vec![
            rank,
            Cell::new(result.params.to_string()),
            Cell::new(format!("{:.4}", result.mean_recall)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", result.std_recall)).set_alignment(CellAlignment::Right),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
