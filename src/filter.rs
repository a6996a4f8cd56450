use crate::model::project::ProjectScope;
use crate::model::work_item::WorkItem;

/// Current list filters. Not persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub project: ProjectScope,
    pub item_type: Option<String>,
    pub iteration: Option<String>,
    pub search: String,
}

impl FilterState {
    pub fn has_list_filters(&self) -> bool {
        self.item_type.is_some() || self.iteration.is_some() || !self.search.is_empty()
    }

    pub fn clear_list_filters(&mut self) {
        self.item_type = None;
        self.iteration = None;
        self.search.clear();
    }

    fn matches(&self, item: &WorkItem, query: &str) -> bool {
        if !query.is_empty()
            && !item.id.to_string().contains(query)
            && !item.title.to_lowercase().contains(query)
        {
            return false;
        }
        if let ProjectScope::Project(id) = &self.project {
            if &item.project_id != id {
                return false;
            }
        }
        if let Some(t) = &self.item_type {
            if &item.work_item_type != t {
                return false;
            }
        }
        if let Some(it) = &self.iteration {
            if &item.iteration_path != it {
                return false;
            }
        }
        true
    }
}

/// Effort totals over a filtered list. Missing values count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub original_estimate: f64,
    pub remaining_work: f64,
    pub completed_work: f64,
}

impl Summary {
    pub fn of(items: &[&WorkItem]) -> Self {
        items.iter().fold(
            Summary {
                count: items.len(),
                ..Summary::default()
            },
            |mut s, item| {
                s.original_estimate += item.original_estimate.unwrap_or(0.0);
                s.remaining_work += item.remaining_work.unwrap_or(0.0);
                s.completed_work += item.completed_work.unwrap_or(0.0);
                s
            },
        )
    }

    pub fn line(&self) -> String {
        format!(
            "{} items | Est: {} | Rem: {} | Done: {}",
            self.count,
            format_hours(Some(self.original_estimate)),
            format_hours(Some(self.remaining_work)),
            format_hours(Some(self.completed_work)),
        )
    }
}

/// Items passing every active filter, in their original order.
pub fn apply<'a>(items: &'a [WorkItem], filter: &FilterState) -> Vec<&'a WorkItem> {
    let query = filter.search.trim().to_lowercase();
    items
        .iter()
        .filter(|item| filter.matches(item, &query))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursStatus {
    Overrun,
    Done,
    Low,
    OnTrack,
}

impl HoursStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HoursStatus::Overrun => "overrun",
            HoursStatus::Done => "done",
            HoursStatus::Low => "low",
            HoursStatus::OnTrack => "on-track",
        }
    }
}

/// Classify an item's effort numbers. First match wins:
/// overrun, done, low, on-track.
pub fn hours_status(
    original: Option<f64>,
    remaining: Option<f64>,
    completed: Option<f64>,
) -> Option<HoursStatus> {
    let set = |v: Option<f64>| v.filter(|v| *v != 0.0);
    let original = set(original)?;

    if completed.is_some_and(|c| c > original) {
        return Some(HoursStatus::Overrun);
    }
    let remaining = remaining?;
    if remaining == 0.0 {
        return Some(HoursStatus::Done);
    }
    if remaining > 0.0 && remaining <= original * 0.25 {
        return Some(HoursStatus::Low);
    }
    if remaining > 0.0 {
        return Some(HoursStatus::OnTrack);
    }
    None
}

pub fn item_hours_status(item: &WorkItem) -> Option<HoursStatus> {
    hours_status(
        item.original_estimate,
        item.remaining_work,
        item.completed_work,
    )
}

/// One decimal place, `-` when unset.
pub fn format_hours(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "-".into(),
    }
}
