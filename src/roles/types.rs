//! Role labels and assignments.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Subject track of a volunteer.
///
/// Variants are declared in label order, so `Ord` matches the alphabetical
/// order of the stored labels (`volunteer_adlo` < `volunteer_ela` <
/// `volunteer_math`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VolunteerTrack {
    Adlo,
    Ela,
    Math,
}

impl VolunteerTrack {
    pub const ALL: [Self; 3] = [Self::Adlo, Self::Ela, Self::Math];

    /// Suffix after `volunteer_`, as exposed to clients (`"math"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adlo => "adlo",
            Self::Ela => "ela",
            Self::Math => "math",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "adlo" => Some(Self::Adlo),
            "ela" => Some(Self::Ela),
            "math" => Some(Self::Math),
            _ => None,
        }
    }
}

impl Serialize for VolunteerTrack {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Capability tag attached to an account.
///
/// The closed set stored as `admin`, `volunteer_math`, `volunteer_ela`,
/// `volunteer_adlo` and `user`. Volunteer membership is a match on the
/// variant, never a prefix test on the stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleLabel {
    Admin,
    Volunteer(VolunteerTrack),
    User,
}

impl RoleLabel {
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::Volunteer(VolunteerTrack::Adlo),
        Self::Volunteer(VolunteerTrack::Ela),
        Self::Volunteer(VolunteerTrack::Math),
        Self::User,
    ];

    /// Stored form of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Volunteer(VolunteerTrack::Adlo) => "volunteer_adlo",
            Self::Volunteer(VolunteerTrack::Ela) => "volunteer_ela",
            Self::Volunteer(VolunteerTrack::Math) => "volunteer_math",
            Self::User => "user",
        }
    }

    /// Parses a stored label. Unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            other => other
                .strip_prefix("volunteer_")
                .and_then(VolunteerTrack::parse)
                .map(Self::Volunteer),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Volunteer(VolunteerTrack::Adlo) => "ADLO Volunteer",
            Self::Volunteer(VolunteerTrack::Ela) => "ELA Volunteer",
            Self::Volunteer(VolunteerTrack::Math) => "Math Volunteer",
            Self::User => "User",
        }
    }

    pub fn volunteer_track(&self) -> Option<VolunteerTrack> {
        match self {
            Self::Volunteer(track) => Some(*track),
            Self::Admin | Self::User => None,
        }
    }
}

impl fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RoleLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoleLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown role: {s}")))
    }
}

/// The volunteer track reported for an account holding several.
///
/// Lowest label wins, so an account with `volunteer_math` and
/// `volunteer_ela` reports `ela` no matter what order the rows come back in.
pub fn chosen_volunteer_track(labels: &[RoleLabel]) -> Option<VolunteerTrack> {
    labels.iter().filter_map(RoleLabel::volunteer_track).min()
}

/// Single label shown for an account in admin listings.
pub fn primary_role(labels: &[RoleLabel]) -> RoleLabel {
    if labels.contains(&RoleLabel::Admin) {
        return RoleLabel::Admin;
    }
    chosen_volunteer_track(labels).map_or(RoleLabel::User, RoleLabel::Volunteer)
}

/// One (account, label) row of the role store.
#[derive(Debug, Clone, Serialize)]
pub struct RoleAssignment {
    pub user_id: i64,
    pub role: RoleLabel,
    pub created_at: DateTime<Utc>,
}
