//! Output formatters for analysis summaries

use anyhow::Result;
use colored::*;
use marksheet_core::Analysis;
use std::path::Path;

/// Print the summary in human-readable format with colors
pub fn print_human(file_path: &Path, analysis: &Analysis, output: Option<&Path>) {
    println!("{}", format!("Analyzing: {}", file_path.display()).bold());
    println!();

    println!(
        "{} {} students, {} subjects",
        "Extracted:".bold(),
        analysis.students.len(),
        analysis.catalog.len()
    );
    println!();

    println!("{}", "Subjects:".bold().underline());
    for subject in &analysis.statistics.subjects {
        let pct = format!("{:.2}%", subject.pass_percentage);
        let pct = if subject.fail_count > 0 {
            pct.yellow()
        } else {
            pct.green()
        };
        println!(
            "  {} {}  appeared {}  pass {}  fail {}  {}  avg {:.2}  max {}  min {}",
            subject.code.cyan().bold(),
            subject.name,
            subject.appeared,
            subject.pass_count,
            subject.fail_count,
            pct,
            subject.average,
            subject.max,
            subject.min
        );
    }
    println!();

    let cohort = &analysis.statistics.cohort;
    println!("{}", "Cohort:".bold().underline());
    for grade in &cohort.grade_counts {
        println!("  {} {}", format!("{}:", grade.label).bold(), grade.count);
    }
    println!("  {} {}", "Students:".bold(), cohort.total_students);
    println!("  {} {}", "Appeared:".bold(), cohort.appeared);
    println!("  {} {}", "Pass:".green().bold(), cohort.pass_count);
    println!("  {} {}", "Fail:".red().bold(), cohort.fail_count);
    println!("  {} {}", "Absentees:".yellow().bold(), cohort.absentees);
    println!(
        "  {} {:.2}%",
        "Passing percentage:".bold(),
        cohort.pass_percentage
    );

    if let Some(output) = output {
        println!();
        println!("{}", "✓ Analysis workbook written".green().bold());
        println!("Output: {}", output.display());
    }
}

/// Print the summary in JSON format
pub fn print_json(file_path: &Path, analysis: &Analysis, output: Option<&Path>) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "output": output.map(|p| p.display().to_string()),
        "subjects": analysis.catalog,
        "students": analysis.students,
        "statistics": analysis.statistics,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
