//! Report formatting.
//!
//! Turns the structured results of [`crate::core::stats`] into plain text the
//! bot layer can send as-is. Amounts are whole VND, formatted as `35.000 ₫`.

use crate::{
    core::stats::{DebtSummary, ExpenseSummary, MonthlyOverview, WeeklySpend},
    models::{DebtRecord, Employee, SystemLog},
};
use std::fmt::Write;

/// Formats an amount in VND style: dot thousands separators and a trailing `₫`.
///
/// # Returns
/// Formatted string like "35.000 ₫" or "-1.250.000 ₫"
#[must_use]
pub fn format_vnd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{grouped} ₫")
    } else {
        format!("{grouped} ₫")
    }
}

/// Formats a balance with an explicit sign: credit is `+`, debt is `-`.
#[must_use]
pub fn format_balance(balance: i64) -> String {
    if balance > 0 {
        format!("+{}", format_vnd(balance))
    } else {
        format_vnd(balance)
    }
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `paid` - Amount repaid so far
/// * `total` - Principal
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(paid: i64, total: i64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    #[allow(clippy::cast_precision_loss)]
    let percent = if total <= 0 {
        100.0
    } else {
        (paid as f64 / total as f64) * 100.0
    };
    let clamped = percent.clamp(0.0, 100.0);

    // Cast safety: clamped ∈ [0, 100] and length is small, so the result is in [0, length].
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("[{}{}] {percent:.1}%", "█".repeat(filled), "░".repeat(empty))
}

fn employee_name<'a>(employees: &'a [Employee], employee_id: &'a str) -> &'a str {
    employees
        .iter()
        .find(|employee| employee.id == employee_id)
        .map_or(employee_id, |employee| employee.name.as_str())
}

/// Formats the employee overview and weekly breakdown of a month.
///
/// # Errors
/// Only fails if writing into the `String` buffer fails.
pub fn format_monthly_stats(
    overview: &MonthlyOverview,
    weeks: &[WeeklySpend],
    employees: &[Employee],
) -> Result<String, std::fmt::Error> {
    let mut out = format!(
        "**Lunch statistics {}** - total {}\n",
        overview.month,
        format_vnd(overview.total_spent)
    );

    for entry in &overview.employees {
        writeln!(
            out,
            "• {} - {} meals, {} (balance {})",
            entry.employee.name,
            entry.meal_count,
            format_vnd(entry.total_meal_cost),
            format_balance(entry.employee.balance)
        )?;
    }

    if weeks.is_empty() {
        out.push_str("\nNo weekly data for this month.\n");
        return Ok(out);
    }

    out.push_str("\n**Weekly breakdown**\n");
    for week in weeks {
        writeln!(
            out,
            "Week {} ({}): {}",
            week.week.index,
            week.week.label(),
            format_vnd(week.total())
        )?;
        for (employee_id, amount) in &week.employee_spending {
            writeln!(
                out,
                "  {} {}",
                employee_name(employees, employee_id),
                format_vnd(*amount)
            )?;
        }
    }

    Ok(out)
}

/// Formats a monthly expense summary.
///
/// # Errors
/// Only fails if writing into the `String` buffer fails.
pub fn format_expense_summary(summary: &ExpenseSummary) -> Result<String, std::fmt::Error> {
    let mut out = format!(
        "**Fund {}** - total {}\n",
        summary.month,
        format_vnd(summary.total)
    );
    if summary.weeks.is_empty() {
        out.push_str("No expenses this month.\n");
        return Ok(out);
    }

    for week in &summary.weeks {
        writeln!(out, "Week {}: {}", week.week, format_vnd(week.total))?;
        for item in &week.items {
            writeln!(
                out,
                "  {} {} {} `{}`",
                item.date.format("%d/%m"),
                item.title,
                format_vnd(item.amount),
                item.id
            )?;
        }
    }
    Ok(out)
}

/// One debt entry as a single line.
#[must_use]
pub fn format_debt_line(debt: &DebtRecord) -> String {
    let status = if debt.is_finished { "✅" } else { "⏳" };
    let due = debt
        .due_date
        .map(|due| format!(" due {}", due.format("%d/%m/%Y")))
        .unwrap_or_default();
    format!(
        "{status} {} {} {}{due} `{}`",
        debt.person_name,
        format_vnd(debt.amount),
        format_progress_bar(debt.paid_amount, debt.amount, None),
        debt.id
    )
}

/// Formats a debt summary with totals.
///
/// # Errors
/// Only fails if writing into the `String` buffer fails.
pub fn format_debt_summary(summary: &DebtSummary) -> Result<String, std::fmt::Error> {
    let mut out = format!(
        "**{}** - total {}, paid {}, remaining {}\n",
        summary.kind.as_str(),
        format_vnd(summary.total_amount),
        format_vnd(summary.total_paid),
        format_vnd(summary.remaining())
    );
    for debt in &summary.records {
        writeln!(out, "{}", format_debt_line(debt))?;
    }
    Ok(out)
}

/// One activity log entry as a single line.
#[must_use]
pub fn format_log_line(log: &SystemLog) -> String {
    format!(
        "`{}` **{}** {}",
        log.timestamp.format("%Y-%m-%d %H:%M"),
        log.action,
        log.details
    )
}
