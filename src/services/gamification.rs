//! Contributor points, levels and badges

use serde::Serialize;

/// One step of the level ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: u32,
    pub min_score: i64,
    pub title: &'static str,
}

/// Level ladder, ascending by `min_score`
pub const LEVELS: [Level; 7] = [
    Level { level: 1, min_score: 0, title: "Novice Explorer" },
    Level { level: 2, min_score: 100, title: "Novice Explorer II" },
    Level { level: 3, min_score: 300, title: "Novice Explorer III" },
    Level { level: 4, min_score: 600, title: "Trail Companion" },
    Level { level: 5, min_score: 1000, title: "Trail Companion II" },
    Level { level: 6, min_score: 1500, title: "Neighborhood Sheriff" },
    Level { level: 10, min_score: 5000, title: "Tomorrow's Artisan" },
];

/// Actions that earn points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Report,
    Update,
    Validate,
    Login,
}

impl Action {
    pub fn points(&self) -> i64 {
        match self {
            Action::Report => 50,
            Action::Update => 30,
            Action::Validate => 10,
            Action::Login => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Report => "report",
            Action::Update => "update",
            Action::Validate => "validate",
            Action::Login => "login",
        }
    }
}

/// Highest level whose minimum score is reached (level 1 below zero)
pub fn calculate_level(score: i64) -> &'static Level {
    LEVELS.iter().rev().find(|l| score >= l.min_score).unwrap_or(&LEVELS[0])
}

/// Tier shown on the profile page, driven by the number of places authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContributorTier {
    Starter,
    Explorer,
    Mapper,
}

impl ContributorTier {
    pub fn from_place_count(count: usize) -> Self {
        if count >= 20 {
            ContributorTier::Mapper
        } else if count >= 5 {
            ContributorTier::Explorer
        } else {
            ContributorTier::Starter
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContributorTier::Starter => "Starter",
            ContributorTier::Explorer => "Explorer",
            ContributorTier::Mapper => "Mapper",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            ContributorTier::Starter => "🌱",
            ContributorTier::Explorer => "🚀",
            ContributorTier::Mapper => "🏆",
        }
    }

    /// Place count needed for the next tier (0 once at the top)
    pub fn next_level_count(&self) -> usize {
        match self {
            ContributorTier::Starter => 5,
            ContributorTier::Explorer => 20,
            ContributorTier::Mapper => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ascending() {
        assert!(LEVELS.windows(2).all(|w| w[0].min_score < w[1].min_score));
    }

    #[test]
    fn test_calculate_level() {
        assert_eq!(calculate_level(0).level, 1);
        assert_eq!(calculate_level(99).level, 1);
        assert_eq!(calculate_level(100).level, 2);
        assert_eq!(calculate_level(650).title, "Trail Companion");
        assert_eq!(calculate_level(4999).level, 6);
        assert_eq!(calculate_level(5000).level, 10);
        assert_eq!(calculate_level(1_000_000).level, 10);
    }

    #[test]
    fn test_negative_score_is_level_one() {
        assert_eq!(calculate_level(-10).level, 1);
    }

    #[test]
    fn test_action_points() {
        assert_eq!(Action::Report.points(), 50);
        assert_eq!(Action::Update.points(), 30);
        assert_eq!(Action::Validate.points(), 10);
        assert_eq!(Action::Login.points(), 5);
    }

    #[test]
    fn test_contributor_tier() {
        assert_eq!(ContributorTier::from_place_count(0), ContributorTier::Starter);
        assert_eq!(ContributorTier::from_place_count(4), ContributorTier::Starter);
        assert_eq!(ContributorTier::from_place_count(5), ContributorTier::Explorer);
        assert_eq!(ContributorTier::from_place_count(19), ContributorTier::Explorer);
        assert_eq!(ContributorTier::from_place_count(20), ContributorTier::Mapper);

        assert_eq!(ContributorTier::Mapper.next_level_count(), 0);
        assert_eq!(ContributorTier::Explorer.badge(), "🚀");
    }
}
