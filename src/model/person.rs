//! Person: an individual member of a family, and match records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{ConnectionPath, Family, FamilyId};

/// Minimum and maximum age for marriage eligibility.
pub const MIN_ELIGIBLE_AGE: u32 = 18;
pub const MAX_ELIGIBLE_AGE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    /// e.g. `High School`, `Graduate`, `Doctorate`.
    pub highest_degree: String,
    pub field_of_study: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profession {
    pub job_title: String,
    pub industry: String,
    pub annual_income: i64,
}

/// What a person is looking for in a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarriagePreferences {
    /// Inclusive age range.
    pub age_range: (u32, u32),
    pub education: Vec<String>,
    pub industries: Vec<String>,
    /// Inclusive income range; `None` means no income preference.
    pub income_range: Option<(i64, i64)>,
    /// When set, unmet preferences do not exclude a candidate.
    pub flexible: bool,
}

impl Default for MarriagePreferences {
    fn default() -> Self {
        Self {
            age_range: (MIN_ELIGIBLE_AGE, MAX_ELIGIBLE_AGE),
            education: Vec::new(),
            industries: Vec::new(),
            income_range: None,
            flexible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub family_id: FamilyId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub age: u32,
    pub marital_status: MaritalStatus,
    pub eligible_for_marriage: bool,
    pub education: Education,
    pub profession: Profession,
    pub preferences: MarriagePreferences,
}

impl Person {
    pub fn new(
        id: impl Into<String>,
        family_id: impl Into<FamilyId>,
        gender: Gender,
        age: u32,
    ) -> Self {
        Self {
            id: id.into(),
            family_id: family_id.into(),
            first_name: String::new(),
            last_name: String::new(),
            gender,
            age,
            marital_status: MaritalStatus::Single,
            eligible_for_marriage: (MIN_ELIGIBLE_AGE..=MAX_ELIGIBLE_AGE).contains(&age),
            education: Education::default(),
            profession: Profession::default(),
            preferences: MarriagePreferences {
                age_range: (age.saturating_sub(5), age.saturating_add(5)),
                ..MarriagePreferences::default()
            },
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn with_education(mut self, degree: impl Into<String>) -> Self {
        self.education.highest_degree = degree.into();
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.profession.industry = industry.into();
        self
    }

    pub fn with_income(mut self, income: i64) -> Self {
        self.profession.annual_income = income;
        self
    }

    pub fn with_preferences(mut self, preferences: MarriagePreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Flagged eligible, single, and within the eligible age window.
    pub fn is_eligible_for_marriage(&self) -> bool {
        self.eligible_for_marriage
            && self.marital_status == MaritalStatus::Single
            && (MIN_ELIGIBLE_AGE..=MAX_ELIGIBLE_AGE).contains(&self.age)
    }

    /// Does `other` satisfy this person's preferences?
    ///
    /// A flexible person accepts every candidate; preferences then only
    /// influence scoring.
    pub fn matches_preferences(&self, other: &Person) -> bool {
        let prefs = &self.preferences;
        if prefs.flexible {
            return true;
        }

        let (min_age, max_age) = prefs.age_range;
        if other.age < min_age || other.age > max_age {
            return false;
        }
        if !prefs.education.is_empty()
            && !prefs.education.iter().any(|e| *e == other.education.highest_degree)
        {
            return false;
        }
        if !prefs.industries.is_empty()
            && !prefs.industries.iter().any(|i| *i == other.profession.industry)
        {
            return false;
        }
        if let Some((min_income, max_income)) = prefs.income_range {
            let income = other.profession.annual_income;
            if min_income > 0 && (income < min_income || income > max_income) {
                return false;
            }
        }
        true
    }

    /// Can `candidate` be proposed to this person at all?
    pub fn is_eligible_candidate(&self, candidate: &Person) -> bool {
        candidate.is_eligible_for_marriage()
            && candidate.gender != self.gender
            && candidate.family_id != self.family_id
            && self.matches_preferences(candidate)
    }
}

/// A scored match proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleMatch {
    pub person: Person,
    pub family: Family,
    pub connection_path: Option<ConnectionPath>,
    /// In [0, 100].
    pub compatibility_score: f64,
    pub match_reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl EligibleMatch {
    pub fn new(person: Person, family: Family, connection_path: Option<ConnectionPath>) -> Self {
        Self {
            person,
            family,
            connection_path,
            compatibility_score: 0.0,
            match_reasons: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
