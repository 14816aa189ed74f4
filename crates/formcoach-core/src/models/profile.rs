// ABOUTME: Client profile sections (general, functional, morphology, ROM, lifestyle, medical)
// ABOUTME: Each section is a validated field-to-value map persisted as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Profile section identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProfileSection {
    /// Personal and plan data
    General,
    /// Functional assessment results
    Functional,
    /// Body composition and measurements
    Morphological,
    /// Range of motion per joint
    RangeOfMotion,
    /// Training habits
    LifeStyle,
    /// Injuries and medical limitations
    Medical,
}

impl ProfileSection {
    /// All sections in display order
    pub const ALL: [Self; 6] = [
        Self::General,
        Self::Functional,
        Self::Morphological,
        Self::RangeOfMotion,
        Self::LifeStyle,
        Self::Medical,
    ];

    /// Known field names; an empty slice accepts any field
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::General => &[
                "Qualification",
                "Level",
                "Language",
                "Notifications",
                "Units",
                "Age",
                "Gender",
                "Weight",
                "Height",
                "Plan",
            ],
            Self::Functional => &[
                "StaticPosture",
                "HipMobility",
                "AnkleMobility",
                "ShoulderMobilityLevel",
                "SquatStrength",
                "BalanceTest",
            ],
            Self::Morphological => &[
                "FatPercentage",
                "MuscleMass",
                "BMI",
                "VO2Max",
                "HeartRate",
                "TorsoLength",
                "LegLength",
                "ArmLength",
                "ForearmLength",
                "ThighCircumference",
                "WaistCircumference",
            ],
            Self::RangeOfMotion => &[],
            Self::LifeStyle => &["TrainingFrequency", "TypeOfTraining", "PreviousSports"],
            Self::Medical => &["PreviousInjuries", "MedicalLimitations", "PainZones"],
        }
    }

    /// Storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Functional => "Functional",
            Self::Morphological => "Morphological",
            Self::RangeOfMotion => "RangeOfMotion",
            Self::LifeStyle => "LifeStyle",
            Self::Medical => "Medical",
        }
    }
}

impl fmt::Display for ProfileSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileSection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::invalid_input(format!("Unknown profile section '{s}'")))
    }
}

/// Client profile: one field map per section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    sections: BTreeMap<ProfileSection, BTreeMap<String, String>>,
}

impl ClientProfile {
    /// Set a field, validating its name against the section
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the field is unknown for the section or empty
    pub fn set(
        &mut self,
        section: ProfileSection,
        field: &str,
        value: impl Into<String>,
    ) -> AppResult<()> {
        let field = field.trim();
        if field.is_empty() {
            return Err(AppError::invalid_input("Profile field name is empty"));
        }
        let known = section.fields();
        if !known.is_empty() && !known.contains(&field) {
            return Err(AppError::invalid_input(format!(
                "Unknown field '{field}' for profile section {section}"
            )));
        }
        self.sections
            .entry(section)
            .or_default()
            .insert(field.to_owned(), value.into());
        Ok(())
    }

    /// Get a field value
    #[must_use]
    pub fn get(&self, section: ProfileSection, field: &str) -> Option<&str> {
        self.sections
            .get(&section)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// All fields of a section
    #[must_use]
    pub fn section(&self, section: ProfileSection) -> Option<&BTreeMap<String, String>> {
        self.sections.get(&section)
    }

    /// Whether no field has been set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_fields_are_accepted() {
        let mut profile = ClientProfile::default();
        profile
            .set(ProfileSection::Morphological, "BMI", "22.5")
            .unwrap();
        profile
            .set(ProfileSection::RangeOfMotion, "KneeFlexion", "135")
            .unwrap();
        assert_eq!(profile.get(ProfileSection::Morphological, "BMI"), Some("22.5"));
        assert_eq!(
            profile.get(ProfileSection::RangeOfMotion, "KneeFlexion"),
            Some("135")
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut profile = ClientProfile::default();
        assert!(profile.set(ProfileSection::Medical, "Favorite", "x").is_err());
        assert!(profile.is_empty());
    }
}
