use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::calendar::MonthGrid;
use crate::datetime::is_same_day;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub title: String,
    pub time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTasks {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

pub trait TaskSource {
    fn day_tasks(&self) -> &[DayTasks];

    fn tasks_on(&self, date: NaiveDate) -> Option<&DayTasks> {
        self.day_tasks()
            .iter()
            .find(|entry| is_same_day(&entry.date, &date))
    }

    fn has_tasks(&self, date: NaiveDate) -> bool {
        self.tasks_on(date).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTasks {
    entries: Vec<DayTasks>,
}

impl InMemoryTasks {
    #[must_use]
    pub fn new(entries: Vec<DayTasks>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: DayTasks) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn sample(today: NaiveDate) -> Self {
        let plan: [(i64, &[&str]); 7] = [
            (1, &["Call the printer", "Review cover draft", "Evening workout"]),
            (-3, &["Lunch with the editor"]),
            (-8, &["Quarterly planning meeting"]),
            (10, &["Ship the next release"]),
            (-22, &["Evening workout"]),
            (15, &["Review cover draft"]),
            (2, &["Publish app update"]),
        ];

        let entries = plan
            .iter()
            .filter_map(|(offset, titles)| {
                let date = offset_days(today, *offset)?;
                let time = date.and_time(NaiveTime::MIN);
                Some(DayTasks {
                    date,
                    tasks: titles
                        .iter()
                        .map(|title| Task {
                            title: (*title).to_string(),
                            time,
                        })
                        .collect(),
                })
            })
            .collect();

        Self { entries }
    }
}

impl TaskSource for InMemoryTasks {
    fn day_tasks(&self) -> &[DayTasks] {
        &self.entries
    }
}

// pad cells are never marked
pub fn mark_cells<S: TaskSource + ?Sized>(grid: &MonthGrid, source: &S) -> Vec<bool> {
    grid.cells
        .iter()
        .map(|cell| !cell.is_pad() && source.has_tasks(cell.date))
        .collect()
}

fn offset_days(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    let step = Days::new(offset.unsigned_abs());
    if offset >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    }
}
