//! Heuristic analysis — pure-Rust, deterministic, no LLM call.
//!
//! Used when the model-backed analysis fails. Only skill coverage, role title
//! overlap, location and education carry real signal; every other dimension
//! gets a neutral 5 with a justification saying it was not assessed.
//!
//! Skill coverage:
//! 1. For each required skill of the posting (or, when the posting lists none,
//!    each profile skill mentioned in the description):
//!    - profile skill exact match → strength 1.0
//!    - mentioned in an experience entry's text → strength 0.6
//!    - no match → strength 0.0
//! 2. coverage = mean strength; skill score = 1 + round(9 × coverage)
//! 3. Classify: strong (≥0.8) → strengths, gap (<0.4) → gaps

use std::collections::HashSet;

use crate::analysis::models::{CompatibilityAnalysis, Dimension, DimensionScore, Dimensions};
use crate::models::{CandidateProfile, JobPosting};

const NEUTRAL_SCORE: u8 = 5;

/// Per-skill coverage result.
#[derive(Debug, Clone, PartialEq)]
struct SkillMatch {
    skill: String,
    strength: f32,
}

pub fn analyze(profile: &CandidateProfile, job: &JobPosting) -> CompatibilityAnalysis {
    let matches = skill_matches(profile, job);
    let coverage = if matches.is_empty() {
        0.5
    } else {
        matches.iter().map(|m| m.strength).sum::<f32>() / matches.len() as f32
    };

    let mut strengths = Vec::new();
    let mut gaps = Vec::new();
    for m in &matches {
        if m.strength >= 0.8 {
            strengths.push(format!("Lists {} as a skill", m.skill));
        } else if m.strength < 0.4 {
            gaps.push(format!("No evidence of {}", m.skill));
        }
    }

    let skill_score = 1 + (9.0 * coverage).round() as u8;
    let skill_note = if matches.is_empty() {
        "The posting names no skills to compare against.".to_string()
    } else {
        format!(
            "Covers {:.0}% of the {} skills named in the posting.",
            coverage * 100.0,
            matches.len()
        )
    };

    let (role_score, role_note) = role_alignment(profile, job);
    let (location_score, location_note) = location_fit(profile, job);
    let (education_score, education_note) = education_match(profile);

    let dimensions = Dimensions::from_fn(|d| match d {
        Dimension::SkillMatch => DimensionScore::new(skill_score, skill_note.clone()),
        Dimension::RoleAlignment => DimensionScore::new(role_score, role_note.clone()),
        Dimension::LocationFit => DimensionScore::new(location_score, location_note.clone()),
        Dimension::EducationMatch => DimensionScore::new(education_score, education_note.clone()),
        other => DimensionScore::new(
            NEUTRAL_SCORE,
            format!(
                "{} not assessed: detailed analysis is temporarily unavailable.",
                other.label()
            ),
        ),
    });

    CompatibilityAnalysis::new(dimensions, strengths, gaps, Vec::new())
}

fn skill_matches(profile: &CandidateProfile, job: &JobPosting) -> Vec<SkillMatch> {
    let profile_skills: HashSet<String> =
        profile.skills.iter().map(|s| s.trim().to_lowercase()).collect();
    let experience_text = profile
        .experience
        .iter()
        .flat_map(|e| {
            std::iter::once(e.title.as_str())
                .chain(e.description.as_deref())
                .chain(e.accomplishments.iter().map(String::as_str))
        })
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    // Blank entries would match any text.
    let required: Vec<&String> = job
        .required_skills
        .iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    let wanted: Vec<String> = if required.is_empty() {
        let description = job.description.to_lowercase();
        profile
            .skills
            .iter()
            .filter(|s| !s.trim().is_empty())
            .filter(|s| description.contains(&s.trim().to_lowercase()))
            .cloned()
            .collect()
    } else {
        required.into_iter().cloned().collect()
    };

    wanted
        .into_iter()
        .map(|skill| {
            let lower = skill.trim().to_lowercase();
            let strength = if profile_skills.contains(&lower) {
                1.0
            } else if experience_text.contains(&lower) {
                0.6
            } else {
                0.0
            };
            SkillMatch { skill, strength }
        })
        .collect()
}

fn role_alignment(profile: &CandidateProfile, job: &JobPosting) -> (u8, String) {
    let job_words = title_words(&job.title);
    let overlapping = profile
        .experience
        .iter()
        .find(|e| !title_words(&e.title).is_disjoint(&job_words));
    match overlapping {
        Some(exp) => (8, format!("Has held a similar role: {}.", exp.title)),
        None if profile.experience.is_empty() => {
            (NEUTRAL_SCORE, "No work history on file.".to_string())
        }
        None => (4, "No previous role closely matches this title.".to_string()),
    }
}

/// Lowercased title words, ignoring short filler like "of" or "a".
fn title_words(title: &str) -> HashSet<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn location_fit(profile: &CandidateProfile, job: &JobPosting) -> (u8, String) {
    let job_location = job.location.as_deref().map(str::to_lowercase);
    let remote = job_location.as_deref().is_some_and(|l| l.contains("remote"))
        || job
            .job_type
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains("remote"));
    if remote {
        return (9, "Role is remote.".to_string());
    }
    match (profile.location.as_deref(), job_location) {
        (Some(mine), Some(theirs)) if theirs.contains(&mine.to_lowercase()) => {
            (9, "Candidate is based in the job's location.".to_string())
        }
        (Some(_), Some(_)) => (4, "Role is in a different location.".to_string()),
        _ => (NEUTRAL_SCORE, "Location not specified.".to_string()),
    }
}

fn education_match(profile: &CandidateProfile) -> (u8, String) {
    match profile.education.first() {
        Some(edu) => (6, format!("Holds {} from {}.", edu.degree, edu.school)),
        None => (4, "No education listed.".to_string()),
    }
}
