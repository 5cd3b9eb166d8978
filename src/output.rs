use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde_json::json;

use crate::error::Result;
use crate::model::{CategoryEntry, CategoryKind, DailySummary, StreakState, Task};
use crate::store::categories::kind_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

fn paint_category(name: &str, kind: CategoryKind) -> ColoredString {
    match kind {
        CategoryKind::Default => name.blue(),
        CategoryKind::Custom => name.magenta(),
    }
}

fn check_mark(task: &Task) -> ColoredString {
    if task.completed {
        "[x]".green()
    } else {
        "[ ]".normal()
    }
}

pub fn print_task(task: &Task, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(&task)?),
        Format::Pretty => {
            println!(
                "{} {} ({})",
                check_mark(task),
                task.title.bold(),
                paint_category(&task.category, kind_of(&task.category))
            );
            println!("  id: {}", task.id);
            if let Some(ref desc) = task.description {
                println!("  {desc}");
            }
            if let Some(due) = task.due_date {
                println!("  due: {due}");
            }
            if let Some(time) = task.time {
                println!("  time: {}", time.format("%H:%M"));
            }
            match task.completion_time {
                Some(at) => println!("  completed at {}", at.format("%Y-%m-%d %H:%M")),
                None => println!("  pending"),
            }
        }
        Format::Minimal => println!("{}", minimal_line(task)),
    }
    Ok(())
}

fn minimal_line(task: &Task) -> String {
    let short_id: String = task.id.to_hex().chars().take(8).collect();
    let due = task
        .due_date
        .map_or_else(|| "-".to_string(), |d| d.to_string());
    format!(
        "{short_id} {} {:12} {:10} {}",
        if task.completed { "x" } else { " " },
        truncate_title(&task.category, 12),
        due,
        task.title
    )
}

pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() > max_len {
        let truncated: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    } else {
        title.to_string()
    }
}

pub fn print_tasks(tasks: &[&Task], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(tasks)?),
        Format::Pretty => {
            if tasks.is_empty() {
                println!("No tasks yet. Add your first task!");
            }
            for task in tasks {
                print_task(task, Format::Pretty)?;
                println!();
            }
        }
        Format::Minimal => {
            println!("{:8} D {:12} {:10} TITLE", "ID", "CATEGORY", "DUE");
            println!("{}", "-".repeat(50));
            for task in tasks {
                println!("{}", minimal_line(task));
            }
        }
    }
    Ok(())
}

pub fn print_categories(entries: &[CategoryEntry], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(entries)?),
        Format::Pretty => {
            for entry in entries {
                println!("{} ({})", paint_category(&entry.name, entry.kind), entry.kind);
            }
        }
        Format::Minimal => {
            for entry in entries {
                println!("{}", entry.name);
            }
        }
    }
    Ok(())
}

pub fn print_category_change(name: &str, action: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", json!({ "category": name, "action": action })),
        Format::Pretty => println!("{action} category {}", name.bold()),
        Format::Minimal => println!("{name}"),
    }
    Ok(())
}

pub fn print_streak(state: &StreakState, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(state)?),
        Format::Pretty => {
            println!("{} day streak", state.current_streak.to_string().yellow().bold());
            if let Some(last) = state.last_completion_date {
                println!("  last completion: {last}");
            }
        }
        Format::Minimal => println!("{}", state.current_streak),
    }
    Ok(())
}

pub fn print_summary(summary: &DailySummary, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(summary)?),
        Format::Pretty => {
            println!("{} ({}% done)", "Daily Goals".bold(), summary.percent);
            println!(
                "  {}/{} tasks completed, {} today",
                summary.completed, summary.total, summary.completed_today
            );
            println!("  {} day streak", summary.streak.to_string().yellow());
        }
        Format::Minimal => println!(
            "{}/{} {}% streak={}",
            summary.completed, summary.total, summary.percent, summary.streak
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_id::TaskId;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn truncate_long_titles() {
        assert_eq!(truncate_title("Shopping", 12), "Shopping");
        assert_eq!(truncate_title("Groceries and errands", 12), "Groceries...");
    }

    #[test]
    fn minimal_line_layout() {
        let task = Task {
            id: "67e5504410b1426f9247bb680e5fe0c8".parse::<TaskId>().unwrap(),
            title: "Buy milk".into(),
            description: None,
            category: "Shopping".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            time: None,
            completed: false,
            completion_time: None,
            created_at: Utc::now(),
        };
        assert_eq!(
            minimal_line(&task),
            "67e55044   Shopping     2024-03-01 Buy milk"
        );
    }
}
