//! # Match Scoring
//!
//! Weighted compatibility between a seeker and a candidate on a 100-point
//! scale. Five factors, each with a fixed ceiling:
//!
//! | Factor | Max | Full credit | Partial |
//! |--------|-----|-------------|---------|
//! | Age | 20 | ≤2 years apart | ≤5 → 70%, ≤10 → 30% |
//! | Education | 25 | same level | adjacent level → 80% |
//! | Industry | 20 | same industry | compatible group → 60% |
//! | Family trust | 15 | trust / 10 | |
//! | Connection | 20 | path strength | |

use crate::model::{ConnectionPath, EligibleMatch, Family, Person};

pub const AGE_WEIGHT: f64 = 20.0;
pub const EDUCATION_WEIGHT: f64 = 25.0;
pub const INDUSTRY_WEIGHT: f64 = 20.0;
pub const TRUST_WEIGHT: f64 = 15.0;
pub const CONNECTION_WEIGHT: f64 = 20.0;

/// Trust score at or above which the family earns a reason line.
pub const HIGH_TRUST_SCORE: f64 = 8.0;

/// Ordinal rank of a degree name, `None` for unknown names.
pub fn education_rank(degree: &str) -> Option<u8> {
    match degree {
        "High School" => Some(1),
        "Diploma" => Some(2),
        "Graduate" => Some(3),
        "Post-Graduate" => Some(4),
        "Doctorate" => Some(5),
        _ => None,
    }
}

/// Industries considered compatible with `industry`, itself included.
pub fn compatible_industries(industry: &str) -> &'static [&'static str] {
    match industry {
        "Technology" => &["Technology", "Engineering", "Finance"],
        "Engineering" => &["Engineering", "Technology", "Manufacturing"],
        "Finance" => &["Finance", "Banking", "Technology"],
        "Medicine" => &["Medicine", "Healthcare", "Research"],
        "Education" => &["Education", "Research", "Government"],
        "Business" => &["Business", "Finance", "Marketing"],
        _ => &[],
    }
}

/// Stateless multi-factor scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchScorer;

impl MatchScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score `candidate` for `seeker`. `path` is the resolved connection
    /// between their families, if any.
    pub fn score(
        &self,
        seeker: &Person,
        candidate: &Person,
        family: &Family,
        path: Option<ConnectionPath>,
    ) -> EligibleMatch {
        let mut reasons = Vec::new();
        let mut earned = 0.0;

        earned += age_points(seeker.age, candidate.age, &mut reasons);
        earned += education_points(
            &seeker.education.highest_degree,
            &candidate.education.highest_degree,
            &mut reasons,
        );
        earned += industry_points(&candidate.profession.industry, &seeker.profession.industry, &mut reasons);

        earned += family.normalized_trust() * TRUST_WEIGHT;
        if family.trust_score >= HIGH_TRUST_SCORE {
            reasons.push("High family trust score".to_string());
        }

        if let Some(path) = &path {
            earned += path.path_strength * CONNECTION_WEIGHT;
            reasons.push(if path.degree <= 2 {
                "Close family connection".to_string()
            } else {
                "Family connection exists".to_string()
            });
        }

        let mut record = EligibleMatch::new(candidate.clone(), family.clone(), path);
        record.compatibility_score = earned / Self::max_points() * 100.0;
        record.match_reasons = reasons;
        record
    }

    pub fn max_points() -> f64 {
        AGE_WEIGHT + EDUCATION_WEIGHT + INDUSTRY_WEIGHT + TRUST_WEIGHT + CONNECTION_WEIGHT
    }

    /// Highest compatibility first; equal scores keep their input order.
    pub fn rank(&self, matches: &mut [EligibleMatch]) {
        matches.sort_by(|a, b| b.compatibility_score.total_cmp(&a.compatibility_score));
    }
}

fn age_points(a: u32, b: u32, reasons: &mut Vec<String>) -> f64 {
    match a.abs_diff(b) {
        0..=2 => {
            reasons.push("Similar age".to_string());
            AGE_WEIGHT
        }
        3..=5 => {
            reasons.push("Compatible age range".to_string());
            AGE_WEIGHT * 0.7
        }
        6..=10 => AGE_WEIGHT * 0.3,
        _ => 0.0,
    }
}

fn education_points(a: &str, b: &str, reasons: &mut Vec<String>) -> f64 {
    if a == b {
        reasons.push("Same education level".to_string());
        return EDUCATION_WEIGHT;
    }
    match (education_rank(a), education_rank(b)) {
        (Some(x), Some(y)) if x.abs_diff(y) == 1 => {
            reasons.push("Compatible education".to_string());
            EDUCATION_WEIGHT * 0.8
        }
        _ => 0.0,
    }
}

/// The candidate's industry picks the group; the seeker's must be in it.
/// Groups are not symmetric: Finance lists Banking, Banking lists nothing.
fn industry_points(candidate: &str, seeker: &str, reasons: &mut Vec<String>) -> f64 {
    if candidate == seeker {
        reasons.push("Same profession field".to_string());
        return INDUSTRY_WEIGHT;
    }
    if compatible_industries(candidate).contains(&seeker) {
        reasons.push("Compatible profession".to_string());
        return INDUSTRY_WEIGHT * 0.6;
    }
    0.0
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FamilyId, Gender};

    fn person(id: &str, family: &str, gender: Gender, age: u32) -> Person {
        Person::new(id, family, gender, age)
    }

    fn path_with_strength(hops: usize, strength: f64) -> ConnectionPath {
        let nodes = (0..=hops).map(|i| FamilyId::new(format!("F{i}"))).collect();
        let mut path = ConnectionPath::from_nodes(nodes).unwrap();
        path.path_strength = strength;
        path
    }

    #[test]
    fn test_perfect_match() {
        let seeker = person("p1", "F1", Gender::Male, 28)
            .with_education("Graduate")
            .with_industry("Technology");
        let candidate = person("p2", "F2", Gender::Female, 27)
            .with_education("Graduate")
            .with_industry("Technology");
        let family = Family::new("F2", "Iyer").with_trust_score(10.0);

        let m = MatchScorer::new().score(&seeker, &candidate, &family, Some(path_with_strength(1, 1.0)));
        assert!((m.compatibility_score - 100.0).abs() < 1e-9);
        assert_eq!(
            m.match_reasons,
            vec![
                "Similar age",
                "Same education level",
                "Same profession field",
                "High family trust score",
                "Close family connection",
            ]
        );
    }

    #[test]
    fn test_partial_factors() {
        let seeker = person("p1", "F1", Gender::Male, 30)
            .with_education("Graduate")
            .with_industry("Technology");
        let candidate = person("p2", "F2", Gender::Female, 26)
            .with_education("Post-Graduate")
            .with_industry("Finance");
        let family = Family::new("F2", "Iyer").with_trust_score(5.0);

        let m = MatchScorer::new().score(&seeker, &candidate, &family, Some(path_with_strength(3, 0.5)));
        // 14 + 20 + 12 + 7.5 + 10
        assert!((m.compatibility_score - 63.5).abs() < 1e-9);
        assert!(m.match_reasons.contains(&"Compatible age range".to_string()));
        assert!(m.match_reasons.contains(&"Compatible education".to_string()));
        assert!(m.match_reasons.contains(&"Compatible profession".to_string()));
        assert!(m.match_reasons.contains(&"Family connection exists".to_string()));
    }

    #[test]
    fn test_industry_group_is_chosen_by_candidate() {
        let scorer = MatchScorer::new();
        let family = Family::new("F2", "Iyer").with_trust_score(0.0);
        let banker = |id: &str, family: &str, gender: Gender| person(id, family, gender, 30).with_industry("Banking");
        let financier = |id: &str, family: &str, gender: Gender| person(id, family, gender, 30).with_industry("Finance");

        // Finance lists Banking: a banking seeker gets credit for a finance candidate
        let m = scorer.score(&banker("s", "F1", Gender::Male), &financier("c", "F2", Gender::Female), &family, None);
        assert!(m.match_reasons.contains(&"Compatible profession".to_string()));
        // 20 + 25 + 12
        assert!((m.compatibility_score - 57.0).abs() < 1e-9);

        // Banking lists nothing: the reverse pairing earns no industry points
        let m = scorer.score(&financier("s", "F1", Gender::Male), &banker("c", "F2", Gender::Female), &family, None);
        assert!(!m.match_reasons.contains(&"Compatible profession".to_string()));
        assert!((m.compatibility_score - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_path_scores_zero_connection_points() {
        let seeker = person("p1", "F1", Gender::Male, 30);
        let candidate = person("p2", "F2", Gender::Female, 45);
        let family = Family::new("F2", "Iyer").with_trust_score(0.0);

        let m = MatchScorer::new().score(&seeker, &candidate, &family, None);
        // only the empty education/industry strings compare equal
        assert!((m.compatibility_score - 45.0).abs() < 1e-9);
        assert!(m.connection_path.is_none());
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let family = Family::new("F2", "Iyer");
        let mk = |id: &str, score: f64| {
            let mut m = EligibleMatch::new(person(id, "F2", Gender::Female, 25), family.clone(), None);
            m.compatibility_score = score;
            m
        };
        let mut matches = vec![mk("a", 40.0), mk("b", 70.0), mk("c", 40.0), mk("d", 90.0)];
        MatchScorer::new().rank(&mut matches);

        let order: Vec<&str> = matches.iter().map(|m| m.person.id.as_str()).collect();
        assert_eq!(order, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_education_and_industry_tables() {
        assert_eq!(education_rank("Doctorate"), Some(5));
        assert_eq!(education_rank("PhD"), None);
        assert!(compatible_industries("Medicine").contains(&"Research"));
        assert!(compatible_industries("Arts").is_empty());
    }
}
