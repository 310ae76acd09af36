use crate::models::{Base, Table, Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

pub const GANTT_DAYS_SHOWN: i64 = 14;
pub const CALENDAR_VISIBLE_PER_CELL: usize = 2;

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

/// Visible date window of the gantt timeline: `days` consecutive days starting
/// at `start` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GanttWindow {
    pub start: NaiveDate,
    pub days: i64,
}

impl GanttWindow {
    /// Two-week window aligned to the Sunday-start week containing `day`.
    pub fn for_week_of(day: NaiveDate) -> Self {
        Self {
            start: week_start(day),
            days: GANTT_DAYS_SHOWN,
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        self.start + Duration::days(self.days - 1)
    }

    pub fn prev_week(&self) -> Self {
        Self {
            start: self.start - Duration::days(7),
            ..*self
        }
    }

    pub fn next_week(&self) -> Self {
        Self {
            start: self.start + Duration::days(7),
            ..*self
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.days)
            .map(|offset| self.start + Duration::days(offset))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GanttBar {
    pub task_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub progress: f64,
    /// Day index of the bar's first visible column within the window.
    pub start_offset: i64,
    /// Visible width in day columns, always >= 1.
    pub width: i64,
    /// Synthetic full duration in days, before clipping.
    pub duration: i64,
}

impl GanttBar {
    pub fn left_percent(&self, window: &GanttWindow) -> f64 {
        self.start_offset as f64 / window.days as f64 * 100.0
    }

    pub fn width_percent(&self, window: &GanttWindow) -> f64 {
        self.width as f64 / window.days as f64 * 100.0
    }
}

/// Horizontal bar placement from due dates. Duration is synthesized from the
/// remaining progress, `(100 - progress) / 25` days with a one-day floor. Bars
/// fully outside the window are dropped, partial overlaps are clipped.
pub fn plan_bars(tasks: &[Task], window: &GanttWindow) -> Vec<GanttBar> {
    tasks
        .iter()
        .filter_map(|task| {
            let start = NaiveDate::parse_from_str(&task.due_date, "%Y-%m-%d")
                .unwrap_or(window.start);
            let progress = task.progress.unwrap_or(0.0);
            let duration = (((100.0 - progress) / 25.0).ceil() as i64).max(1);
            let end = start + Duration::days(duration);

            if end < window.start || start > window.last_day() {
                return None;
            }
            let visible_start = start.max(window.start);
            let visible_end = end.min(window.last_day());

            Some(GanttBar {
                task_id: task.id.clone(),
                title: task.title.clone(),
                status: task.status,
                priority: task.priority,
                progress,
                start_offset: (visible_start - window.start).num_days(),
                width: (visible_end - visible_start).num_days() + 1,
                duration,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub visible: Vec<CalendarEvent>,
    pub overflow: usize,
}

impl DayCell {
    pub fn overflow_label(&self) -> Option<String> {
        if self.overflow > 0 {
            Some(format!("+{} more", self.overflow))
        } else {
            None
        }
    }
}

/// Tasks become calendar events on their due date; unparsable dates are
/// skipped rather than bucketed arbitrarily.
pub fn events_from_tasks(tasks: &[Task]) -> Vec<CalendarEvent> {
    tasks
        .iter()
        .filter_map(|task| {
            let date = NaiveDate::parse_from_str(&task.due_date, "%Y-%m-%d").ok()?;
            Some(CalendarEvent {
                id: task.id.clone(),
                title: task.title.clone(),
                date,
            })
        })
        .collect()
}

/// Month grid from the Sunday-start week of the 1st through the Saturday-end
/// week of the last day. Events land in the cell whose date matches exactly;
/// each cell shows at most two plus an overflow count.
pub fn month_cells(year: i32, month: u32, events: &[CalendarEvent]) -> Vec<DayCell> {
    let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let month_end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .map(|first_of_next| first_of_next - Duration::days(1))
    .unwrap_or(month_start);

    let grid_start = week_start(month_start);
    let grid_end = week_start(month_end) + Duration::days(6);

    let mut cells = Vec::new();
    let mut day = grid_start;
    while day <= grid_end {
        let mut matching = events
            .iter()
            .filter(|event| event.date == day)
            .cloned()
            .collect::<Vec<_>>();
        let total = matching.len();
        matching.truncate(CALENDAR_VISIBLE_PER_CELL);
        cells.push(DayCell {
            date: day,
            in_month: day.month() == month && day.year() == year,
            overflow: total.saturating_sub(matching.len()),
            visible: matching,
        });
        day = day + Duration::days(1);
    }
    cells
}

/// Text lines of the export header; rendering to PDF is the caller's concern.
pub fn export_summary(base: &Base, table: &Table, generated_at: DateTime<Utc>) -> Vec<String> {
    vec![
        "GridBlock Export".to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        format!("Base: {}", base.name),
        format!("Table: {}", table.name),
        format!("View: {}", table.active_view.as_str()),
    ]
}
