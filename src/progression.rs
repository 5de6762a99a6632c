//! # Progression — Levels and Ranks
//!
//! Every 100 XP is one level. Ranks bucket levels into coarse tiers:
//!
//! | Rank | Levels |
//! |------|--------|
//! | E-Rank (Beginner) | 0–10 |
//! | D-Rank (Intermediate) | 11–25 |
//! | C-Rank (Advanced) | 26–50 |
//! | B-Rank (Skilled) | 51–75 |
//! | A-Rank (Elite) | 76–100 |
//! | S-Rank (Mastery) | 101+ |
//!
//! Stored XP is never negative; the derivations below treat a negative input
//! as zero so they stay total.

use std::fmt;
use std::str::FromStr;

pub const XP_PER_LEVEL: i32 = 100;

/// The fixed set of life categories tracked by the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Health,
    Finance,
    Deen,
    Intellect,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Health,
        Category::Finance,
        Category::Deen,
        Category::Intellect,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Health => "Health",
            Category::Finance => "Finance",
            Category::Deen => "Deen",
            Category::Intellect => "Intellect",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Health => "❤️",
            Category::Finance => "💰",
            Category::Deen => "🕌",
            Category::Intellect => "🧠",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "health" => Ok(Category::Health),
            "finance" => Ok(Category::Finance),
            "deen" => Ok(Category::Deen),
            "intellect" => Ok(Category::Intellect),
            other => Err(format!(
                "unknown category '{}' (expected health, finance, deen or intellect)",
                other
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Rank {
    pub fn for_level(level: i32) -> Rank {
        match level {
            l if l >= 101 => Rank::S,
            l if l >= 76 => Rank::A,
            l if l >= 51 => Rank::B,
            l if l >= 26 => Rank::C,
            l if l >= 11 => Rank::D,
            _ => Rank::E,
        }
    }

    /// Short label, e.g. "S-Rank".
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::E => "E-Rank",
            Rank::D => "D-Rank",
            Rank::C => "C-Rank",
            Rank::B => "B-Rank",
            Rank::A => "A-Rank",
            Rank::S => "S-Rank",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Rank::E => "Beginner",
            Rank::D => "Intermediate",
            Rank::C => "Advanced",
            Rank::B => "Skilled",
            Rank::A => "Elite",
            Rank::S => "Mastery",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.title())
    }
}

pub fn level(xp: i32) -> i32 {
    xp.max(0) / XP_PER_LEVEL
}

/// XP earned inside the current level, `0..100`.
pub fn progress(xp: i32) -> i32 {
    xp.max(0) % XP_PER_LEVEL
}

pub fn rank(xp: i32) -> Rank {
    Rank::for_level(level(xp))
}

/// Everything a stat card shows for one category.
#[derive(Clone, Debug, PartialEq)]
pub struct StatCard {
    pub category: Category,
    pub xp: i32,
    pub level: i32,
    pub progress: i32,
    pub rank: Rank,
}

impl StatCard {
    pub fn new(category: Category, xp: i32) -> Self {
        StatCard {
            category,
            xp,
            level: level(xp),
            progress: progress(xp),
            rank: rank(xp),
        }
    }

    /// Text progress bar, `width` cells wide.
    pub fn bar(&self, width: usize) -> String {
        let filled = (self.progress as usize * width) / XP_PER_LEVEL as usize;
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }
}

impl fmt::Display for StatCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<10} Level {:<4} {:<22} {} {}/{} XP",
            self.category.icon(),
            self.category.title(),
            self.level,
            self.rank.to_string(),
            self.bar(20),
            self.progress,
            XP_PER_LEVEL
        )
    }
}
