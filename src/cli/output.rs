use ansi_term::Colour;

use crate::{
    tracker::{
        entities::{DailySummary, Recipe},
        goal::GoalStatus,
        TodaySummary,
    },
    utils::time::date_to_record_name,
};

pub fn status_colour(status: GoalStatus) -> Colour {
    match status {
        GoalStatus::Ok => Colour::Green,
        GoalStatus::Warning => Colour::Yellow,
        GoalStatus::Over => Colour::Red,
    }
}

pub fn print_recipes<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) {
    for recipe in recipes {
        println!("{}\t{} P\t{}", recipe.id, recipe.points, recipe.name);
    }
}

pub fn print_today(summary: &TodaySummary) {
    println!("Daily Log ({})", date_to_record_name(summary.date));
    if summary.entries.is_empty() {
        println!("No entries...please have some food.");
    }
    for (index, entry) in summary.entries.iter().enumerate() {
        println!("{index}\t{} P\t{}", entry.points, entry.name);
    }
    println!();
    println!(
        "Total Points Today: {}",
        status_colour(summary.status).paint(summary.total_points.to_string())
    );
    println!("Daily Goal: {}", goal_text(summary.raw_goal.as_deref()));
}

pub fn print_history(history: &[DailySummary]) {
    if history.is_empty() {
        return;
    }
    println!();
    println!("Previous Logs");
    for day in history {
        println!(
            "{}\tTotal Points: {}",
            date_to_record_name(day.date),
            day.total_points
        );
    }
}

pub fn print_goal(raw: Option<&str>) {
    println!("Daily Goal: {}", goal_text(raw));
}

/// The goal is shown as it was entered, not as it's interpreted.
fn goal_text(raw: Option<&str>) -> &str {
    raw.unwrap_or("Not Set")
}
