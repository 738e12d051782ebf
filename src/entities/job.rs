// Job Entity - a service request from intake through completion
// Status is a linear lifecycle; every change is recorded as an event in the
// audit trail (see db::insert_event).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// JOB STATUS
// ============================================================================

/// Linear job lifecycle: Pending -> Scheduled -> InProgress -> Completed.
/// Cancelled is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "scheduled" => Some(JobStatus::Scheduled),
            "in_progress" => Some(JobStatus::InProgress),
            "completed" => Some(JobStatus::Completed),
            "cancelled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// Legal forward moves only; no skipping stages, no reopening
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Pending, JobStatus::Scheduled) => true,
            (JobStatus::Scheduled, JobStatus::InProgress) => true,
            (JobStatus::InProgress, JobStatus::Completed) => true,
            (current, JobStatus::Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

// ============================================================================
// JOB PRIORITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Low,
    Normal,
    High,
    Emergency,
}

impl JobPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Low => "low",
            JobPriority::Normal => "normal",
            JobPriority::High => "high",
            JobPriority::Emergency => "emergency",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(JobPriority::Low),
            "normal" => Some(JobPriority::Normal),
            "high" => Some(JobPriority::High),
            "emergency" => Some(JobPriority::Emergency),
            _ => None,
        }
    }
}

// ============================================================================
// JOB ENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Stable identity (UUID) - never changes
    pub id: String,

    /// Human-facing job number, unique (e.g. "JOB-2025-0142")
    pub job_number: String,

    pub title: String,
    pub description: String,

    /// Customer UUID
    pub customer_id: String,

    pub status: JobStatus,
    pub priority: JobPriority,

    // Scheduling
    pub scheduled_date: Option<NaiveDate>,
    pub assigned_technician: Option<String>,

    // Financial
    pub estimated_cost: Option<f64>,
    pub final_cost: Option<f64>,

    pub customer_notes: String,
    pub internal_notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        job_number: impl Into<String>,
        title: impl Into<String>,
        customer_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Job {
            id: uuid::Uuid::new_v4().to_string(),
            job_number: job_number.into(),
            title: title.into(),
            description: String::new(),
            customer_id: customer_id.into(),
            status: JobStatus::Pending,
            priority: JobPriority::Normal,
            scheduled_date: None,
            assigned_technician: None,
            estimated_cost: None,
            final_cost: None,
            customer_notes: String::new(),
            internal_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the job to a new status, rejecting illegal transitions.
    /// Returns the old status so the caller can log the change.
    pub fn transition_to(&mut self, next: JobStatus) -> Result<JobStatus, String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "illegal status transition: {} -> {}",
                self.status.as_str(),
                next.as_str()
            ));
        }

        let old = self.status;
        self.status = next;
        self.updated_at = Utc::now();
        Ok(old)
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_lifecycle() {
        let mut job = Job::new("JOB-2025-0001", "Panel upgrade", "cust-1");
        assert_eq!(job.status, JobStatus::Pending);

        assert_eq!(job.transition_to(JobStatus::Scheduled), Ok(JobStatus::Pending));
        assert_eq!(
            job.transition_to(JobStatus::InProgress),
            Ok(JobStatus::Scheduled)
        );
        assert_eq!(
            job.transition_to(JobStatus::Completed),
            Ok(JobStatus::InProgress)
        );
        assert!(!job.is_open());
    }

    #[test]
    fn test_no_stage_skipping() {
        let mut job = Job::new("JOB-2025-0002", "Outlet repair", "cust-1");

        assert!(job.transition_to(JobStatus::InProgress).is_err());
        assert!(job.transition_to(JobStatus::Completed).is_err());
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[test]
    fn test_cancel_from_any_open_state() {
        let mut pending = Job::new("JOB-2025-0003", "a", "cust-1");
        assert!(pending.transition_to(JobStatus::Cancelled).is_ok());

        let mut in_progress = Job::new("JOB-2025-0004", "b", "cust-1");
        in_progress.transition_to(JobStatus::Scheduled).unwrap();
        in_progress.transition_to(JobStatus::InProgress).unwrap();
        assert!(in_progress.transition_to(JobStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = Job::new("JOB-2025-0005", "c", "cust-1");
        job.transition_to(JobStatus::Cancelled).unwrap();

        assert!(job.transition_to(JobStatus::Scheduled).is_err());
        assert!(job.transition_to(JobStatus::Cancelled).is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Scheduled,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("on_hold"), None);
    }
}
