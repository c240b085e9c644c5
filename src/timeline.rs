use crate::schedule::Schedule;

const MAX_LABEL_WIDTH: usize = 32;

/// Plain-text Gantt view: one row per activity, first activity on top, bars
/// scaled so the whole schedule spans `width` columns.
pub fn render_timeline(schedule: &Schedule, width: usize) -> String {
    let Some(summary) = schedule.summary() else {
        return String::from("(empty schedule)\n");
    };
    let width = width.max(1);
    let total_days = summary.total_days.max(1) as usize;

    let label_width = schedule
        .entries()
        .iter()
        .map(|entry| entry.activity.name().chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_WIDTH);

    let mut out = String::new();
    out.push_str(&format!(
        "{:label_width$}  {} .. {} ({} days)\n",
        "", summary.start, summary.finish, summary.total_days
    ));

    for entry in schedule {
        let offset_days = (entry.start - summary.start).num_days().max(0) as usize;
        let span_days = entry.calendar_days().max(0) as usize;
        let offset = (offset_days * width / total_days).min(width - 1);
        let length = (span_days * width).div_ceil(total_days).clamp(1, width - offset);

        let label: String = entry.activity.name().chars().take(label_width).collect();
        out.push_str(&format!("{label:<label_width$} |"));
        out.push_str(&" ".repeat(offset));
        out.push_str(&"#".repeat(length));
        out.push_str(&" ".repeat(width - offset - length));
        out.push_str(&format!("| {} -> {}\n", entry.start, entry.finish));
    }
    out
}
