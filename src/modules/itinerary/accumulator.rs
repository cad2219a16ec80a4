use serde::Serialize;

/// Upper bound on activity inputs offered per day.
pub const MAX_ACTIVITIES: usize = 10;
const ACTIVITY_BULLET: &str = "\u{2022}";

/// One day of a trip. Distance and duration are free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub route: String,
    pub distance: String,
    pub duration: String,
    pub description: String,
}

/// Raw values submitted through the entry form.
#[derive(Clone, Debug, Default)]
pub struct DayInput {
    pub route: String,
    pub distance: String,
    pub duration: String,
    pub description: String,
    pub activities: Vec<String>,
}

impl DayInput {
    pub fn new(
        route: impl Into<String>,
        distance: impl Into<String>,
        duration: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            route: route.into(),
            distance: distance.into(),
            duration: duration.into(),
            description: description.into(),
            activities: Vec::new(),
        }
    }

    pub fn with_activities<I, S>(mut self, activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.activities = activities.into_iter().map(Into::into).collect();
        self
    }
}

/// Ordered, session-scoped list of days. Entries are appended or removed,
/// never edited in place; insertion order is display and export order.
#[derive(Clone, Debug, Default)]
pub struct Itinerary {
    entries: Vec<DayEntry>,
}

impl Itinerary {
    /// Appends a day. A blank route is ignored and `false` is returned.
    pub fn add_day(&mut self, input: DayInput) -> bool {
        let route = input.route.trim();
        if route.is_empty() {
            return false;
        }

        self.entries.push(DayEntry {
            route: route.to_string(),
            distance: input.distance.trim().to_string(),
            duration: input.duration.trim().to_string(),
            description: compose_description(&input.description, &input.activities),
        });
        true
    }

    /// Removes the entry at `index`; later entries shift down by one.
    /// Out-of-range indexes are a no-op.
    pub fn remove_day(&mut self, index: usize) -> Option<DayEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Detached copy for the exporters.
    pub fn snapshot(&self) -> Vec<DayEntry> {
        self.entries.clone()
    }

    pub fn entries(&self) -> &[DayEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bulleted activities first, then the free-text body.
pub fn compose_description<S: AsRef<str>>(description: &str, activities: &[S]) -> String {
    let mut lines: Vec<String> = activities
        .iter()
        .take(MAX_ACTIVITIES)
        .map(|activity| activity.as_ref().trim())
        .filter(|activity| !activity.is_empty())
        .map(|activity| format!("{ACTIVITY_BULLET} {activity}"))
        .collect();

    let body = description.trim();
    if !body.is_empty() {
        lines.push(body.to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(route: &str) -> DayInput {
        DayInput::new(route, "", "", "")
    }

    #[test]
    fn blank_route_is_ignored() {
        let mut itinerary = Itinerary::default();
        assert!(!itinerary.add_day(day("")));
        assert!(!itinerary.add_day(day("   \t")));
        assert!(itinerary.is_empty());
    }

    #[test]
    fn two_day_scenario_keeps_order_and_activities() {
        let mut itinerary = Itinerary::default();
        assert!(itinerary.add_day(DayInput::new(
            "Airport -> Negombo",
            "35 KM",
            "45 Mins",
            "Transfer and check-in",
        )));
        assert!(itinerary.add_day(
            DayInput::new("City Tour", "10 KM", "2 Hrs", "Museum visit")
                .with_activities(["Fort walk", "", "Lunch"]),
        ));

        let entries = itinerary.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].route, "Airport -> Negombo");
        assert_eq!(entries[0].description, "Transfer and check-in");
        assert_eq!(entries[1].route, "City Tour");
        assert_eq!(
            entries[1].description,
            "\u{2022} Fort walk\n\u{2022} Lunch\nMuseum visit"
        );
    }

    #[test]
    fn activities_are_capped() {
        let activities: Vec<String> = (1..=12).map(|n| format!("stop {n}")).collect();
        let description = compose_description("", &activities);
        assert_eq!(description.lines().count(), MAX_ACTIVITIES);
        assert!(!description.contains("stop 11"));
    }

    #[test]
    fn remove_shifts_later_entries_and_ignores_out_of_range() {
        let mut itinerary = Itinerary::default();
        for route in ["A", "B", "C"] {
            itinerary.add_day(day(route));
        }

        assert!(itinerary.remove_day(7).is_none());
        assert_eq!(itinerary.remove_day(1).map(|entry| entry.route), Some("B".to_string()));
        let routes: Vec<_> = itinerary.entries().iter().map(|e| e.route.as_str()).collect();
        assert_eq!(routes, vec!["A", "C"]);
    }

    #[test]
    fn removing_from_the_end_empties_the_list() {
        let mut itinerary = Itinerary::default();
        for route in ["A", "B", "C"] {
            itinerary.add_day(day(route));
        }
        while !itinerary.is_empty() {
            let last = itinerary.len() - 1;
            assert!(itinerary.remove_day(last).is_some());
        }
        assert!(itinerary.remove_day(0).is_none());
    }

    #[test]
    fn clear_all_always_leaves_nothing() {
        let mut itinerary = Itinerary::default();
        itinerary.add_day(day("A"));
        itinerary.add_day(day("B"));
        itinerary.remove_day(0);
        itinerary.add_day(day(""));
        itinerary.clear_all();
        assert_eq!(itinerary.len(), 0);
        itinerary.clear_all();
        assert_eq!(itinerary.len(), 0);
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let mut itinerary = Itinerary::default();
        itinerary.add_day(day("A"));
        let snapshot = itinerary.snapshot();

        itinerary.add_day(day("B"));
        itinerary.remove_day(0);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].route, "A");
    }
}
