use serde::{Deserialize, Serialize};

/// A job posting, as loaded from the record store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub description: String,
    pub required_skills: Vec<String>,
}

impl JobPosting {
    /// Posting header (title, company, salary, skills) without the description.
    /// The description is budgeted separately by callers.
    pub fn header_text(&self) -> String {
        let mut out = format!("Title: {}\nCompany: {}\n", self.title, self.company);
        if let Some(location) = &self.location {
            out.push_str(&format!("Location: {location}\n"));
        }
        if let Some(job_type) = &self.job_type {
            out.push_str(&format!("Type: {job_type}\n"));
        }
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => out.push_str(&format!("Salary: {min}–{max}\n")),
            (Some(min), None) => out.push_str(&format!("Salary: from {min}\n")),
            (None, Some(max)) => out.push_str(&format!("Salary: up to {max}\n")),
            (None, None) => {}
        }
        if !self.required_skills.is_empty() {
            out.push_str(&format!(
                "Required skills: {}\n",
                self.required_skills.join(", ")
            ));
        }
        out
    }
}
