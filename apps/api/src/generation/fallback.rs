//! Fallback synthesis — deterministic variants assembled from stored profile fields.
//!
//! Used for every strategy whose model call failed or timed out. Nothing here
//! is invented: bullets, skills and education are copied from the profile, and
//! the only job fields used are the posting's title and company, in the cover
//! letter salutation. The strategy still shapes ordering and length.

use crate::generation::models::{
    ApplicationVariant, ResumeContent, ResumeEducation, ResumeExperience,
};
use crate::generation::strategy::Strategy;
use crate::models::{CandidateProfile, JobPosting, WorkExperience};

/// Rationale entry that identifies a synthesized variant.
pub const FALLBACK_MARKER: &str = "Fallback generation used: the language model was unavailable, \
    so this variant was assembled from your stored profile.";

const CONCISE_MAX_BULLETS: usize = 3;

pub fn synthesize_fallback(
    strategy: Strategy,
    profile: &CandidateProfile,
    job: &JobPosting,
) -> ApplicationVariant {
    let resume = ResumeContent {
        summary: summary(profile),
        experience: profile
            .experience
            .iter()
            .map(|exp| experience_entry(strategy, exp))
            .collect(),
        skills: ordered_skills(strategy, profile, job),
        education: profile
            .education
            .iter()
            .map(|edu| ResumeEducation {
                degree: edu.degree.clone(),
                school: edu.school.clone(),
                field: edu.field.clone(),
                graduation_year: edu.graduation_year.clone(),
            })
            .collect(),
    };

    ApplicationVariant::new(
        strategy,
        resume,
        cover_letter(profile, job),
        vec![FALLBACK_MARKER.to_string()],
    )
}

fn summary(profile: &CandidateProfile) -> String {
    if let Some(summary) = profile.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        return summary.trim().to_string();
    }
    let role = profile
        .headline
        .as_deref()
        .or_else(|| profile.experience.first().map(|e| e.title.as_str()))
        .unwrap_or("Professional");
    if profile.skills.is_empty() {
        return format!("{role}.");
    }
    format!(
        "{role} with experience in {}.",
        profile.skills.iter().take(5).cloned().collect::<Vec<_>>().join(", ")
    )
}

fn experience_entry(strategy: Strategy, exp: &WorkExperience) -> ResumeExperience {
    // Accomplishments carry outcomes; the description is the fallback bullet.
    let mut bullets = exp.accomplishments.clone();
    if bullets.is_empty() {
        bullets.extend(exp.description.clone());
    }
    if strategy == Strategy::Concise {
        bullets.truncate(CONCISE_MAX_BULLETS);
    }
    ResumeExperience {
        title: exp.title.clone(),
        company: exp.company.clone(),
        location: exp.location.clone(),
        start_date: exp.start_date.clone(),
        end_date: exp.end_date.clone(),
        bullets,
    }
}

/// Profile skills only. Keyword-optimized puts the posting's required skills first.
fn ordered_skills(strategy: Strategy, profile: &CandidateProfile, job: &JobPosting) -> Vec<String> {
    if strategy != Strategy::KeywordOptimized {
        return profile.skills.clone();
    }
    let required: Vec<String> = job.required_skills.iter().map(|s| s.to_lowercase()).collect();
    let (mut wanted, rest): (Vec<String>, Vec<String>) = profile
        .skills
        .iter()
        .cloned()
        .partition(|s| required.contains(&s.to_lowercase()));
    wanted.extend(rest);
    wanted
}

fn cover_letter(profile: &CandidateProfile, job: &JobPosting) -> String {
    let mut letter = format!("Dear {} hiring team,\n\n", job.company);
    letter.push_str(&format!(
        "I am writing to apply for the {} position.",
        job.title
    ));
    if let Some(current) = profile.experience.first() {
        letter.push_str(&format!(
            " I am currently working as {} at {}.",
            current.title, current.company
        ));
    }
    if !profile.skills.is_empty() {
        letter.push_str(&format!(
            " My skills include {}.",
            profile.skills.join(", ")
        ));
    }
    letter.push_str("\n\nThank you for your consideration.\n\n");
    letter.push_str(&profile.full_name);
    letter
}
