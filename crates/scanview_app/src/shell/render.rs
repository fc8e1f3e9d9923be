use scanview_core::{AppViewModel, BackendJobRow, Match, Mode, PollStatus};

/// One-line summary written to stderr whenever the view changes.
pub fn status_line(view: &AppViewModel) -> String {
    match view.mode {
        Mode::Composing => {
            let mut line = format!("Composing | taints: {}", view.available_taints.len());
            if let Some(error) = &view.query_error {
                line.push_str(&format!(" | error: {error}"));
            } else if view.query_plan.is_some() {
                line.push_str(" | compiled");
            }
            line
        }
        Mode::Viewing => {
            let hash = view
                .job_hash
                .as_ref()
                .map(|hash| hash.as_str())
                .unwrap_or("?");
            let status = view
                .job
                .as_ref()
                .map(|job| job.status.as_str())
                .unwrap_or("loading");
            let mut line = format!(
                "Job {hash} [{status}] | matches: {}",
                format_with_commas(view.match_count as u64)
            );
            if let Some(job) = &view.job {
                if let (Some(done), Some(estimated)) = (job.work_done, job.work_estimated) {
                    line.push_str(&format!(
                        " | progress: {} / {}",
                        format_with_commas(done),
                        format_with_commas(estimated)
                    ));
                }
            }
            line.push_str(" | ");
            line.push_str(&poll_label(&view.poll));
            line
        }
    }
}

pub fn poll_label(poll: &PollStatus) -> String {
    match poll {
        PollStatus::Idle => "idle".to_string(),
        PollStatus::Polling => "polling".to_string(),
        PollStatus::Finished => "finished".to_string(),
        PollStatus::Stalled { reason } => format!("stalled ({reason})"),
    }
}

/// Matches as compact JSON, one per line, in arrival order.
pub fn match_lines(matches: &[Match]) -> Vec<String> {
    matches.iter().map(|item| item.0.to_string()).collect()
}

pub fn backend_table(rows: &[BackendJobRow]) -> String {
    let headers = ["id", "conn", "request", "progress"];
    let cells: Vec<[&str; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.id.as_str(),
                row.connection.as_str(),
                row.request.as_str(),
                row.progress.as_str(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&headers, &widths));
    for row in &cells {
        out.push('\n');
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(cells: &[&str; 4], widths: &[usize; 4]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use scanview_core::{JobHash, JobRecord, JobStatus};
    use serde_json::json;

    use super::*;

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1234567), "1,234,567");
    }

    #[test]
    fn viewing_status_shows_progress_and_poll_state() {
        let mut job = JobRecord::with_status(JobStatus::Processing);
        job.work_done = Some(1500);
        job.work_estimated = Some(3000);
        let view = AppViewModel {
            mode: Mode::Viewing,
            job_hash: Some(JobHash::new("abc123")),
            match_count: 60,
            job: Some(job),
            poll: PollStatus::Polling,
            ..AppViewModel::default()
        };
        assert_eq!(
            status_line(&view),
            "Job abc123 [processing] | matches: 60 | progress: 1,500 / 3,000 | polling"
        );
    }

    #[test]
    fn stalled_poll_is_visible() {
        let view = AppViewModel {
            mode: Mode::Viewing,
            job_hash: Some(JobHash::new("abc123")),
            poll: PollStatus::Stalled {
                reason: "timeout".to_string(),
            },
            ..AppViewModel::default()
        };
        assert_eq!(
            status_line(&view),
            "Job abc123 [loading] | matches: 0 | stalled (timeout)"
        );
    }

    #[test]
    fn composing_status_shows_error() {
        let view = AppViewModel {
            query_error: Some("syntax error".to_string()),
            available_taints: vec!["a".to_string()],
            ..AppViewModel::default()
        };
        assert_eq!(status_line(&view), "Composing | taints: 1 | error: syntax error");
    }

    #[test]
    fn matches_render_as_json_lines() {
        let lines = match_lines(&[Match(json!({"file": "a"})), Match(json!({"file": "b"}))]);
        assert_eq!(lines, vec![r#"{"file":"a"}"#, r#"{"file":"b"}"#]);
    }

    #[test]
    fn backend_table_aligns_columns() {
        let rows = vec![BackendJobRow {
            id: "12".to_string(),
            connection: "c0ffee".to_string(),
            request: "select \"abc\";".to_string(),
            progress: "3 / 10".to_string(),
        }];
        let table = backend_table(&rows);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "id  conn    request        progress");
        assert_eq!(lines[1], "12  c0ffee  select \"abc\";  3 / 10");
    }
}
