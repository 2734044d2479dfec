//! The per-subject course record and its day navigation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Study level chosen when a course is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Beginner => write!(f, "Beginner"),
            Level::Intermediate => write!(f, "Intermediate"),
            Level::Advanced => write!(f, "Advanced"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(format!("'{s}' is not a valid level")),
        }
    }
}

/// Plan and progress for one subject, persisted as `<subject>_session.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub study_plan: Vec<String>,
    pub start_date: NaiveDate,
    /// 1-based.
    pub current_day: u32,
    pub max_day: u32,
    pub level: Level,
}

impl CourseRecord {
    /// A fresh course starting on `start_date` at day 1.
    pub fn new(study_plan: Vec<String>, start_date: NaiveDate, max_day: u32, level: Level) -> Self {
        Self {
            study_plan,
            start_date,
            current_day: 1,
            max_day,
            level,
        }
    }

    /// Today's topic, or `None` once the current day is past the plan.
    pub fn current_topic(&self) -> Option<&str> {
        let index = (self.current_day as usize).checked_sub(1)?;
        self.study_plan.get(index).map(String::as_str)
    }

    /// Up to three topics ending with today's.
    pub fn recent_topics(&self) -> &[String] {
        let end = (self.current_day as usize).min(self.study_plan.len());
        let start = end.saturating_sub(3);
        &self.study_plan[start..end]
    }

    pub fn can_advance(&self) -> bool {
        self.current_day < self.max_day
    }

    pub fn can_retreat(&self) -> bool {
        self.current_day > 1
    }

    /// Moves to the next day. Returns the day that was left, if any.
    pub fn advance(&mut self) -> Option<u32> {
        if !self.can_advance() {
            return None;
        }
        let left = self.current_day;
        self.current_day += 1;
        Some(left)
    }

    /// Moves back one day. Returns whether the day changed.
    pub fn retreat(&mut self) -> bool {
        if !self.can_retreat() {
            return false;
        }
        self.current_day -= 1;
        true
    }

    /// Share of the course already behind the learner, in percent.
    pub fn progress_percent(&self) -> f64 {
        if self.max_day == 0 {
            return 0.0;
        }
        f64::from(self.current_day.saturating_sub(1)) / f64::from(self.max_day) * 100.0
    }
}
