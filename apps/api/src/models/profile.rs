use serde::{Deserialize, Serialize};

/// A candidate's stored profile, as loaded from the record store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<u32>,
    pub skills: Vec<String>,
    pub experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: Option<String>,
    /// `None` means current position.
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub accomplishments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub field: Option<String>,
    pub school: String,
    pub graduation_year: Option<String>,
}

impl CandidateProfile {
    /// Plain-text rendering used as prompt input. Budgeting happens at the call site.
    pub fn to_prompt_text(&self) -> String {
        let mut out = format!("Name: {}\n", self.full_name);
        if let Some(headline) = &self.headline {
            out.push_str(&format!("Headline: {headline}\n"));
        }
        if let Some(location) = &self.location {
            out.push_str(&format!("Location: {location}\n"));
        }
        if let Some(years) = self.years_experience {
            out.push_str(&format!("Years of experience: {years}\n"));
        }
        if let Some(summary) = &self.summary {
            out.push_str(&format!("Summary: {summary}\n"));
        }
        if !self.skills.is_empty() {
            out.push_str(&format!("Skills: {}\n", self.skills.join(", ")));
        }

        if !self.experience.is_empty() {
            out.push_str("\nExperience:\n");
            for exp in &self.experience {
                out.push_str(&format!(
                    "- {} at {} ({} – {})\n",
                    exp.title,
                    exp.company,
                    exp.start_date.as_deref().unwrap_or("?"),
                    exp.end_date.as_deref().unwrap_or("Present"),
                ));
                if let Some(desc) = &exp.description {
                    out.push_str(&format!("  {desc}\n"));
                }
                for acc in &exp.accomplishments {
                    out.push_str(&format!("  * {acc}\n"));
                }
            }
        }

        if !self.education.is_empty() {
            out.push_str("\nEducation:\n");
            for edu in &self.education {
                let field = edu
                    .field
                    .as_deref()
                    .map(|f| format!(" in {f}"))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "- {}{} — {} {}\n",
                    edu.degree,
                    field,
                    edu.school,
                    edu.graduation_year.as_deref().unwrap_or("")
                ));
            }
        }
        out
    }
}
