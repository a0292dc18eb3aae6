use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::analysis::models::CompatibilityAnalysis;
use crate::generation::models::ApplicationVariant;
use crate::models::{CandidateProfile, Education, JobPosting, WorkExperience};
use crate::records::{AnalysisLedger, RecordError, RecordStore};

#[derive(Debug, Clone, FromRow)]
struct ProfileRow {
    candidate_id: String,
    full_name: String,
    email: Option<String>,
    headline: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    years_experience: Option<i32>,
    skills: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
struct ExperienceRow {
    title: String,
    company: String,
    location: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    description: Option<String>,
    accomplishments: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
struct EducationRow {
    degree: String,
    field: Option<String>,
    school: String,
    graduation_year: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct JobRow {
    job_id: String,
    title: String,
    company: String,
    location: Option<String>,
    job_type: Option<String>,
    salary_min: Option<i32>,
    salary_max: Option<i32>,
    description: String,
    required_skills: Vec<String>,
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn load_profile(
        &self,
        candidate_id: &str,
    ) -> Result<Option<CandidateProfile>, RecordError> {
        let Some(row) = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT candidate_id, full_name, email, headline, summary, location,
                   years_experience, skills
            FROM candidate_profiles
            WHERE candidate_id = $1
            "#,
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let experience = sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT title, company, location, start_date, end_date, description, accomplishments
            FROM work_experience
            WHERE candidate_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        let education = sqlx::query_as::<_, EducationRow>(
            r#"
            SELECT degree, field, school, graduation_year
            FROM education
            WHERE candidate_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(CandidateProfile {
            candidate_id: row.candidate_id,
            full_name: row.full_name,
            email: row.email,
            headline: row.headline,
            summary: row.summary,
            location: row.location,
            years_experience: row.years_experience.and_then(|y| u32::try_from(y).ok()),
            skills: row.skills,
            experience: experience
                .into_iter()
                .map(|e| WorkExperience {
                    title: e.title,
                    company: e.company,
                    location: e.location,
                    start_date: e.start_date,
                    end_date: e.end_date,
                    description: e.description,
                    accomplishments: e.accomplishments,
                })
                .collect(),
            education: education
                .into_iter()
                .map(|e| Education {
                    degree: e.degree,
                    field: e.field,
                    school: e.school,
                    graduation_year: e.graduation_year,
                })
                .collect(),
        }))
    }

    async fn load_job(&self, job_id: &str) -> Result<Option<JobPosting>, RecordError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT job_id, title, company, location, job_type, salary_min, salary_max,
                   description, required_skills
            FROM job_postings
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| JobPosting {
            job_id: r.job_id,
            title: r.title,
            company: r.company,
            location: r.location,
            job_type: r.job_type,
            salary_min: r.salary_min,
            salary_max: r.salary_max,
            description: r.description,
            required_skills: r.required_skills,
        }))
    }

    async fn save_variants(
        &self,
        candidate_id: &str,
        job_id: &str,
        variants: &[ApplicationVariant],
    ) -> Result<(), RecordError> {
        let mut tx = self.pool.begin().await?;
        for variant in variants {
            let resume = serde_json::to_value(&variant.resume)?;
            sqlx::query(
                r#"
                INSERT INTO application_variants
                    (id, candidate_id, job_id, strategy, resume, cover_letter, rationale)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&variant.id)
            .bind(candidate_id)
            .bind(job_id)
            .bind(variant.strategy.id())
            .bind(&resume)
            .bind(&variant.cover_letter)
            .bind(&variant.rationale)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(
            "Stored {} application variants for candidate {candidate_id}, job {job_id}",
            variants.len()
        );
        Ok(())
    }
}

#[async_trait]
impl AnalysisLedger for PgRecordStore {
    async fn append_analysis(
        &self,
        candidate_id: &str,
        job_id: &str,
        analysis: &CompatibilityAnalysis,
    ) -> Result<(), RecordError> {
        let payload = serde_json::to_value(analysis)?;
        // Append-only: every analysis run is a new audit row.
        sqlx::query(
            r#"
            INSERT INTO compatibility_analyses
                (candidate_id, job_id, overall_score, recommendation, analysis)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(candidate_id)
        .bind(job_id)
        .bind(i16::from(analysis.overall_score()))
        .bind(analysis.recommendation().as_str())
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
