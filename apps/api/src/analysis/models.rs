//! Compatibility analysis value objects.
//!
//! A `CompatibilityAnalysis` is only ever built through `CompatibilityAnalysis::new`,
//! which clamps sub-scores, bounds the lists and derives `overall_score` and
//! `recommendation` from the dimension table. Deserialization goes through the
//! same constructor, so a cached payload can never carry an inconsistent score.

use serde::{Deserialize, Serialize};

/// Maximum entries kept in `strengths`, `gaps` and `red_flags`.
pub const MAX_LIST_ITEMS: usize = 5;
/// Maximum characters per list entry.
pub const MAX_ITEM_CHARS: usize = 200;

pub const MIN_DIMENSION_SCORE: u8 = 1;
pub const MAX_DIMENSION_SCORE: u8 = 10;

/// The fixed set of scored dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    SkillMatch,
    ExperienceLevel,
    RoleAlignment,
    IndustryMatch,
    LocationFit,
    SalaryAlignment,
    CultureFit,
    GrowthPotential,
    EducationMatch,
    CompanyStability,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Dimension::SkillMatch,
        Dimension::ExperienceLevel,
        Dimension::RoleAlignment,
        Dimension::IndustryMatch,
        Dimension::LocationFit,
        Dimension::SalaryAlignment,
        Dimension::CultureFit,
        Dimension::GrowthPotential,
        Dimension::EducationMatch,
        Dimension::CompanyStability,
    ];

    /// Relative weight in whole percent. The table sums to exactly 100.
    pub const fn weight_percent(self) -> u32 {
        match self {
            Dimension::SkillMatch => 20,
            Dimension::ExperienceLevel => 15,
            Dimension::RoleAlignment => 15,
            Dimension::IndustryMatch => 10,
            Dimension::LocationFit => 10,
            Dimension::SalaryAlignment => 10,
            Dimension::CultureFit => 5,
            Dimension::GrowthPotential => 5,
            Dimension::EducationMatch => 5,
            Dimension::CompanyStability => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::SkillMatch => "Skill match",
            Dimension::ExperienceLevel => "Experience level",
            Dimension::RoleAlignment => "Role alignment",
            Dimension::IndustryMatch => "Industry match",
            Dimension::LocationFit => "Location fit",
            Dimension::SalaryAlignment => "Salary alignment",
            Dimension::CultureFit => "Culture fit",
            Dimension::GrowthPotential => "Growth potential",
            Dimension::EducationMatch => "Education match",
            Dimension::CompanyStability => "Company stability",
        }
    }
}

/// One 1–10 sub-score with its justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: u8,
    pub justification: String,
}

impl DimensionScore {
    pub fn new(score: u8, justification: impl Into<String>) -> Self {
        Self {
            score: score.clamp(MIN_DIMENSION_SCORE, MAX_DIMENSION_SCORE),
            justification: justification.into(),
        }
    }
}

/// All ten sub-scores. Field names match `Dimension`'s wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub skill_match: DimensionScore,
    pub experience_level: DimensionScore,
    pub role_alignment: DimensionScore,
    pub industry_match: DimensionScore,
    pub location_fit: DimensionScore,
    pub salary_alignment: DimensionScore,
    pub culture_fit: DimensionScore,
    pub growth_potential: DimensionScore,
    pub education_match: DimensionScore,
    pub company_stability: DimensionScore,
}

impl Dimensions {
    /// Builds the table from a per-dimension function.
    pub fn from_fn(mut f: impl FnMut(Dimension) -> DimensionScore) -> Self {
        Self {
            skill_match: f(Dimension::SkillMatch),
            experience_level: f(Dimension::ExperienceLevel),
            role_alignment: f(Dimension::RoleAlignment),
            industry_match: f(Dimension::IndustryMatch),
            location_fit: f(Dimension::LocationFit),
            salary_alignment: f(Dimension::SalaryAlignment),
            culture_fit: f(Dimension::CultureFit),
            growth_potential: f(Dimension::GrowthPotential),
            education_match: f(Dimension::EducationMatch),
            company_stability: f(Dimension::CompanyStability),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::SkillMatch => &self.skill_match,
            Dimension::ExperienceLevel => &self.experience_level,
            Dimension::RoleAlignment => &self.role_alignment,
            Dimension::IndustryMatch => &self.industry_match,
            Dimension::LocationFit => &self.location_fit,
            Dimension::SalaryAlignment => &self.salary_alignment,
            Dimension::CultureFit => &self.culture_fit,
            Dimension::GrowthPotential => &self.growth_potential,
            Dimension::EducationMatch => &self.education_match,
            Dimension::CompanyStability => &self.company_stability,
        }
    }

    /// Re-clamps every score into 1–10.
    fn clamped(self) -> Self {
        Self::from_fn(|d| {
            let s = self.get(d);
            DimensionScore::new(s.score, s.justification.clone())
        })
    }

    /// Weighted sum mapped onto 0–100, rounded half up.
    ///
    /// Computed in integers: Σ score × weight% lies in 100..=1000.
    pub fn overall_score(&self) -> u8 {
        let weighted: u32 = Dimension::ALL
            .iter()
            .map(|&d| u32::from(self.get(d).score) * d.weight_percent())
            .sum();
        ((weighted + 5) / 10).min(100) as u8
    }
}

/// Five ordered recommendation bands, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Poor Match")]
    PoorMatch,
    #[serde(rename = "Weak Match")]
    WeakMatch,
    #[serde(rename = "Fair Match")]
    FairMatch,
    #[serde(rename = "Good Match")]
    GoodMatch,
    #[serde(rename = "Strong Match")]
    StrongMatch,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::PoorMatch => "Poor Match",
            Recommendation::WeakMatch => "Weak Match",
            Recommendation::FairMatch => "Fair Match",
            Recommendation::GoodMatch => "Good Match",
            Recommendation::StrongMatch => "Strong Match",
        }
    }

    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => Recommendation::StrongMatch,
            70..=84 => Recommendation::GoodMatch,
            55..=69 => Recommendation::FairMatch,
            40..=54 => Recommendation::WeakMatch,
            _ => Recommendation::PoorMatch,
        }
    }
}

/// Immutable, self-consistent compatibility analysis for one (candidate, job) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AnalysisParts")]
pub struct CompatibilityAnalysis {
    overall_score: u8,
    recommendation: Recommendation,
    dimensions: Dimensions,
    strengths: Vec<String>,
    gaps: Vec<String>,
    red_flags: Vec<String>,
}

/// The free inputs of an analysis; everything else is derived.
#[derive(Deserialize)]
struct AnalysisParts {
    dimensions: Dimensions,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    gaps: Vec<String>,
    #[serde(default)]
    red_flags: Vec<String>,
}

impl From<AnalysisParts> for CompatibilityAnalysis {
    fn from(parts: AnalysisParts) -> Self {
        CompatibilityAnalysis::new(parts.dimensions, parts.strengths, parts.gaps, parts.red_flags)
    }
}

impl CompatibilityAnalysis {
    pub fn new(
        dimensions: Dimensions,
        strengths: Vec<String>,
        gaps: Vec<String>,
        red_flags: Vec<String>,
    ) -> Self {
        let dimensions = dimensions.clamped();
        let overall_score = dimensions.overall_score();
        Self {
            overall_score,
            recommendation: Recommendation::from_score(overall_score),
            dimensions,
            strengths: bound_list(strengths),
            gaps: bound_list(gaps),
            red_flags: bound_list(red_flags),
        }
    }

    pub fn overall_score(&self) -> u8 {
        self.overall_score
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    pub fn gaps(&self) -> &[String] {
        &self.gaps
    }

    pub fn red_flags(&self) -> &[String] {
        &self.red_flags
    }
}

/// Trims, drops blanks, caps count and per-item length (on a char boundary).
fn bound_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_LIST_ITEMS)
        .map(|s| match s.char_indices().nth(MAX_ITEM_CHARS) {
            Some((idx, _)) => s[..idx].to_string(),
            None => s,
        })
        .collect()
}
