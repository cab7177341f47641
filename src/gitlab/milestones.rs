use chrono::{NaiveDate, Utc};

use super::client::GitLabClient;
use super::types::{Issue, Milestone, MilestoneRecord, MilestoneState};

/// How many recent milestones the dashboard shows.
const MILESTONE_WINDOW: usize = 5;

impl GitLabClient {
    /// The most recent milestones matching the title filter, each with its
    /// issue list attached.
    ///
    /// Keeps only milestones that are active today or already closed, sorts
    /// by title, and takes the greatest [`MILESTONE_WINDOW`] in that order.
    /// Milestones without any issues are dropped.
    pub async fn milestones(&self, group_id: u64, filter: &str) -> Vec<MilestoneRecord> {
        let all: Vec<Milestone> = self
            .get_all_pages(&format!("/groups/{group_id}/milestones?search={filter}"))
            .await;

        let selected = select_recent(all, Utc::now().date_naive());

        let mut records = Vec::with_capacity(selected.len());
        for milestone in selected {
            let issues: Vec<Issue> = self
                .get_all_pages(&format!(
                    "/groups/{group_id}/milestones/{}/issues",
                    milestone.id
                ))
                .await;
            if !issues.is_empty() {
                records.push(MilestoneRecord { milestone, issues });
            }
        }
        records
    }
}

/// Milestone selection: retain active-today or closed milestones, order by
/// title, keep the lexicographically greatest [`MILESTONE_WINDOW`].
///
/// The title sort stands in for chronological sprint ordering; it holds only
/// while the naming convention sorts monotonically (zero-padded numbering).
pub(crate) fn select_recent(milestones: Vec<Milestone>, today: NaiveDate) -> Vec<Milestone> {
    let mut kept: Vec<Milestone> = milestones
        .into_iter()
        .filter(|milestone| is_current_or_closed(milestone, today))
        .collect();
    kept.sort_by(|a, b| a.title.cmp(&b.title));

    let skip = kept.len().saturating_sub(MILESTONE_WINDOW);
    kept.split_off(skip)
}

fn is_current_or_closed(milestone: &Milestone, today: NaiveDate) -> bool {
    if milestone.state == MilestoneState::Closed {
        return true;
    }
    // Missing dates make a milestone neither startable nor due; skip it
    match (milestone.start_date, milestone.due_date) {
        (Some(start), Some(due)) => start <= today && today <= due,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::super::client::tests::test_client;
    use super::*;
    use serde_json::json;

    fn milestone(id: u64, title: &str, state: MilestoneState, window: Option<(&str, &str)>) -> Milestone {
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        Milestone {
            id,
            title: title.to_string(),
            state,
            start_date: window.map(|(start, _)| parse(start)),
            due_date: window.map(|(_, due)| parse(due)),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2026-08-24", "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_select_drops_upcoming_milestones() {
        let milestones = vec![
            milestone(1, "Sprint 01", MilestoneState::Closed, Some(("2026-06-01", "2026-06-14"))),
            milestone(2, "Sprint 02", MilestoneState::Active, Some(("2026-08-17", "2026-08-30"))),
            milestone(3, "Sprint 03", MilestoneState::Active, Some(("2026-09-01", "2026-09-14"))),
        ];

        let selected = select_recent(milestones, today());
        let titles: Vec<&str> = selected.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Sprint 01", "Sprint 02"]);
    }

    #[test]
    fn test_select_keeps_greatest_five_in_sorted_order() {
        let mut milestones: Vec<Milestone> = (1..=8)
            .map(|n| {
                milestone(n, &format!("Sprint {n:02}"), MilestoneState::Closed, None)
            })
            .collect();
        // Shuffle the input ordering a little
        milestones.reverse();

        let selected = select_recent(milestones, today());
        let titles: Vec<&str> = selected.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Sprint 04", "Sprint 05", "Sprint 06", "Sprint 07", "Sprint 08"]
        );
    }

    #[test]
    fn test_select_active_without_dates_is_dropped() {
        let milestones = vec![
            milestone(1, "Sprint 01", MilestoneState::Active, None),
            milestone(2, "Sprint 02", MilestoneState::Closed, None),
        ];

        let selected = select_recent(milestones, today());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].title, "Sprint 02");
    }

    #[tokio::test]
    async fn test_milestones_attach_issues_and_drop_empty() {
        let mut server = mockito::Server::new_async().await;
        let client = test_client(&mut server, "16.0.1").await;

        server
            .mock("GET", "/groups/7/milestones?search=Sprint&page=1&per_page=100")
            .with_status(200)
            .with_body(
                json!([
                    {"id": 11, "title": "Sprint 11", "state": "closed",
                     "start_date": "2026-07-20", "due_date": "2026-08-02"},
                    {"id": 12, "title": "Sprint 12", "state": "active",
                     "start_date": "2000-01-01", "due_date": "2099-12-31"}
                ])
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/groups/7/milestones/11/issues?page=1&per_page=100")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        server
            .mock("GET", "/groups/7/milestones/12/issues?page=1&per_page=100")
            .with_status(200)
            .with_body(
                json!([
                    {"id": 900, "state": "closed", "weight": 3, "labels": []},
                    {"id": 901, "state": "opened", "weight": null, "labels": ["Bug::major"]}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let records = client.milestones(7, "Sprint").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].milestone.title, "Sprint 12");
        assert_eq!(records[0].issues.len(), 2);
    }
}
