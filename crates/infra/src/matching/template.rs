//! Skill-match email rendering.

use jobboard_core::JobId;

use super::NotificationTask;

pub const FALLBACK_PUBLIC_HOST_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    pub subject: String,
    pub html_body: String,
}

/// `{host}/jobs/{id}`; a blank host falls back to [`FALLBACK_PUBLIC_HOST_URL`].
pub fn job_link(public_host_url: &str, job_id: JobId) -> String {
    let host = public_host_url.trim().trim_end_matches('/');
    let host = if host.is_empty() {
        FALLBACK_PUBLIC_HOST_URL
    } else {
        host
    };
    format!("{host}/jobs/{job_id}")
}

pub fn render(task: &NotificationTask, public_host_url: &str) -> RenderedNotification {
    let name = escape_html(&task.candidate.name);
    let title = escape_html(&task.job.title);
    let link = job_link(public_host_url, task.job.id);

    RenderedNotification {
        subject: format!("New job matching your skills: {}", task.job.title),
        html_body: format!(
            "<p>Hi {name},</p>\
             <p>A new position that matches your skills was just posted: <strong>{title}</strong>.</p>\
             <p><a href=\"{link}\">View the job</a></p>"
        ),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
