//! Core data models for the risk assessment pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SoraError;

/// Lowest ground risk class a mitigated operation can reach.
pub const MIN_GRC: u8 = 1;

fn normalize(value: &str) -> String {
    value.trim().to_lowercase().replace(['-', ' '], "_")
}

// ========== GROUND RISK ==========

/// Population density of the operational (or adjacent) area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationCategory {
    /// Controlled ground area, no uninvolved people
    ControlledGroundArea,
    /// Fewer than 5 people per km²
    Remote,
    /// Fewer than 50 people per km²
    LightlyPopulated,
    /// Fewer than 500 people per km²
    SparselyPopulated,
    /// Fewer than 5 000 people per km²
    Suburban,
    /// Fewer than 50 000 people per km²
    HighDensityMetropolitan,
    /// Gatherings and assemblies of people
    #[serde(alias = "gathering_of_people")]
    AssembliesOfPeople,
}

impl PopulationCategory {
    pub const ALL: [Self; 7] = [
        Self::ControlledGroundArea,
        Self::Remote,
        Self::LightlyPopulated,
        Self::SparselyPopulated,
        Self::Suburban,
        Self::HighDensityMetropolitan,
        Self::AssembliesOfPeople,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ControlledGroundArea => "Controlled ground area",
            Self::Remote => "Remote (< 5 ppl/km²)",
            Self::LightlyPopulated => "Lightly populated (< 50 ppl/km²)",
            Self::SparselyPopulated => "Sparsely populated (< 500 ppl/km²)",
            Self::Suburban => "Suburban / low density metropolitan (< 5 000 ppl/km²)",
            Self::HighDensityMetropolitan => "High density metropolitan (< 50 000 ppl/km²)",
            Self::AssembliesOfPeople => "Assemblies of people (> 50 000 ppl/km²)",
        }
    }

    /// Urban environments drive the air encounter category for
    /// uncontrolled airspace.
    pub fn is_urban(self) -> bool {
        matches!(
            self,
            Self::Suburban | Self::HighDensityMetropolitan | Self::AssembliesOfPeople
        )
    }
}

impl FromStr for PopulationCategory {
    type Err = SoraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "controlled_ground_area" | "controlled" | "controlled_ground_access" => {
                Ok(Self::ControlledGroundArea)
            }
            "remote" => Ok(Self::Remote),
            "lightly_populated" => Ok(Self::LightlyPopulated),
            "sparsely_populated" => Ok(Self::SparselyPopulated),
            "suburban" | "populated" | "populated_area" => Ok(Self::Suburban),
            "high_density_metropolitan" | "metropolitan" => Ok(Self::HighDensityMetropolitan),
            "assemblies_of_people" | "gathering_of_people" | "gathering" => {
                Ok(Self::AssembliesOfPeople)
            }
            _ => Err(SoraError::invalid("population", value)),
        }
    }
}

/// UA size/energy class by maximum characteristic dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UaCharacteristic {
    /// Up to 1 m, typical speed up to 25 m/s
    #[serde(rename = "up_to_1m", alias = "up_to1m")]
    UpTo1m,
    /// 1 to 3 m, up to 35 m/s
    #[serde(rename = "up_to_3m", alias = "up_to3m")]
    UpTo3m,
    /// 3 to 8 m, up to 75 m/s
    #[serde(rename = "up_to_8m", alias = "up_to8m")]
    UpTo8m,
    /// 8 to 20 m, up to 120 m/s
    #[serde(rename = "up_to_20m", alias = "up_to20m")]
    UpTo20m,
    /// 20 to 40 m, up to 200 m/s
    #[serde(rename = "up_to_40m", alias = "up_to40m")]
    UpTo40m,
}

impl UaCharacteristic {
    pub const ALL: [Self; 5] = [
        Self::UpTo1m,
        Self::UpTo3m,
        Self::UpTo8m,
        Self::UpTo20m,
        Self::UpTo40m,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::UpTo1m => "≤ 1 m / 25 m/s",
            Self::UpTo3m => "1–3 m / 35 m/s",
            Self::UpTo8m => "3–8 m / 75 m/s",
            Self::UpTo20m => "8–20 m / 120 m/s",
            Self::UpTo40m => "20–40 m / 200 m/s",
        }
    }
}

impl FromStr for UaCharacteristic {
    type Err = SoraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "up_to1m" | "up_to_1m" | "1m" => Ok(Self::UpTo1m),
            "up_to3m" | "up_to_3m" | "3m" => Ok(Self::UpTo3m),
            "up_to8m" | "up_to_8m" | "8m" => Ok(Self::UpTo8m),
            "up_to20m" | "up_to_20m" | "20m" => Ok(Self::UpTo20m),
            "up_to40m" | "up_to_40m" | "40m" => Ok(Self::UpTo40m),
            _ => Err(SoraError::invalid("ua_characteristic", value)),
        }
    }
}

/// A ground risk class, or the sentinel for combinations the framework
/// does not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrcValue {
    Class(u8),
    OutOfScope,
}

impl GrcValue {
    pub fn class(self) -> Option<u8> {
        match self {
            Self::Class(value) => Some(value),
            Self::OutOfScope => None,
        }
    }

    pub fn is_out_of_scope(self) -> bool {
        matches!(self, Self::OutOfScope)
    }
}

impl fmt::Display for GrcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(value) => write!(f, "{value}"),
            Self::OutOfScope => f.write_str("out of scope"),
        }
    }
}

/// Robustness level for mitigations, containment and OSOs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Robustness {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Robustness {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Robustness {
    type Err = SoraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "none" | "" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(SoraError::invalid("robustness", value)),
        }
    }
}

impl fmt::Display for Robustness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ground risk mitigations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mitigation {
    /// M1(A) sheltering
    Sheltering,
    /// M1(B) operational restrictions
    OperationalRestrictions,
    /// M1(C) ground observation
    GroundObservation,
    /// M2 effects of UA impact dynamics are reduced
    ImpactDynamics,
}

impl Mitigation {
    pub const ALL: [Self; 4] = [
        Self::Sheltering,
        Self::OperationalRestrictions,
        Self::GroundObservation,
        Self::ImpactDynamics,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Sheltering => "M1(A)",
            Self::OperationalRestrictions => "M1(B)",
            Self::GroundObservation => "M1(C)",
            Self::ImpactDynamics => "M2",
        }
    }
}

impl FromStr for Mitigation {
    type Err = SoraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "sheltering" | "m1a" | "m1(a)" => Ok(Self::Sheltering),
            "operational_restrictions" | "m1b" | "m1(b)" => Ok(Self::OperationalRestrictions),
            "ground_observation" | "m1c" | "m1(c)" => Ok(Self::GroundObservation),
            "impact_dynamics" | "impact_dynamics_reduction" | "m2" => Ok(Self::ImpactDynamics),
            _ => Err(SoraError::invalid("mitigation", value)),
        }
    }
}

/// One mitigation selector as chosen by the assessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationSelection {
    pub mitigation: Mitigation,
    pub robustness: Robustness,
}

impl MitigationSelection {
    pub fn new(mitigation: Mitigation, robustness: Robustness) -> Self {
        Self {
            mitigation,
            robustness,
        }
    }
}

// ========== AIR RISK ==========

/// Air risk class, ordered by increasing collision risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AirRiskClass {
    #[serde(rename = "a", alias = "arc_a")]
    A,
    #[serde(rename = "b", alias = "arc_b")]
    B,
    #[serde(rename = "c", alias = "arc_c")]
    C,
    #[serde(rename = "d", alias = "arc_d")]
    D,
}

impl AirRiskClass {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Zero-based column index into the SAIL matrix.
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// Lower the class by `steps`, stopping at ARC-a.
    pub fn step_down(self, steps: u32) -> Self {
        let index = (self.index() as u32).saturating_sub(steps) as usize;
        Self::ALL[index]
    }
}

impl fmt::Display for AirRiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        };
        write!(f, "ARC-{letter}")
    }
}

impl FromStr for AirRiskClass {
    type Err = SoraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(value);
        match normalized.strip_prefix("arc_").unwrap_or(&normalized) {
            "a" => Ok(Self::A),
            "b" => Ok(Self::B),
            "c" => Ok(Self::C),
            "d" => Ok(Self::D),
            _ => Err(SoraError::invalid("arc", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirspaceClass {
    /// Class A to E controlled airspace
    Controlled,
    /// Class F/G uncontrolled airspace
    Uncontrolled,
    /// Mode-S veil or transponder mandatory zone
    ModeSVeilOrTmz,
    /// Atypical or segregated airspace
    Atypical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeBand {
    /// Below 500 ft AGL
    #[serde(rename = "below_500_ft", alias = "below500_ft")]
    Below500Ft,
    /// Above 500 ft AGL but below FL600
    #[serde(rename = "above_500_ft", alias = "above500_ft")]
    Above500Ft,
    /// Above FL600
    #[serde(rename = "above_fl_600", alias = "above_fl600")]
    AboveFl600,
}

/// Airspace inputs used for the initial air risk class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirspaceInput {
    pub airspace_class: AirspaceClass,
    pub altitude_band: AltitudeBand,
    /// Operation within an airport or heliport environment
    #[serde(default)]
    pub airport_environment: bool,
}

/// Tactical mitigation performance requirement options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tmpr {
    Vlos,
    Evlos,
    #[serde(alias = "daa")]
    DetectAndAvoid,
}

impl FromStr for Tmpr {
    type Err = SoraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "vlos" => Ok(Self::Vlos),
            "evlos" => Ok(Self::Evlos),
            "daa" | "detect_and_avoid" => Ok(Self::DetectAndAvoid),
            _ => Err(SoraError::invalid("tmpr", value)),
        }
    }
}

// ========== SAIL ==========

/// Specific assurance and integrity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sail {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl Sail {
    pub const ALL: [Self; 6] = [Self::I, Self::II, Self::III, Self::IV, Self::V, Self::VI];

    /// Position in the fixed ordering I < II < ... < VI, starting at 1.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::I => 1,
            Self::II => 2,
            Self::III => 3,
            Self::IV => 4,
            Self::V => 5,
            Self::VI => 6,
        }
    }

    pub fn roman(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
            Self::VI => "VI",
        }
    }
}

impl fmt::Display for Sail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SAIL {}", self.roman())
    }
}

impl FromStr for Sail {
    type Err = SoraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let upper = value.trim().to_uppercase();
        let roman = upper.strip_prefix("SAIL").map(str::trim).unwrap_or(&upper);
        match roman {
            "I" | "1" => Ok(Self::I),
            "II" | "2" => Ok(Self::II),
            "III" | "3" => Ok(Self::III),
            "IV" | "4" => Ok(Self::IV),
            "V" | "5" => Ok(Self::V),
            "VI" | "6" => Ok(Self::VI),
            _ => Err(SoraError::invalid("sail", value)),
        }
    }
}

/// An operational safety objective and the robustness it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsoRequirement {
    pub number: u8,
    pub title: String,
    pub robustness: Robustness,
}

// ========== ASSESSMENTS ==========

/// Assessor selections for one operating site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInput {
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub population: PopulationCategory,
    pub ua_characteristic: UaCharacteristic,
    #[serde(default)]
    pub mitigations: Vec<MitigationSelection>,
    pub airspace: AirspaceInput,
    #[serde(default)]
    pub tmpr: Vec<Tmpr>,
    /// Population of the adjacent area; containment falls back to the
    /// table default when absent.
    #[serde(default)]
    pub adjacent_population: Option<PopulationCategory>,
}

/// Fully derived classification for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAssessment {
    pub input: SiteInput,
    pub intrinsic_grc: GrcValue,
    pub final_grc: GrcValue,
    pub initial_arc: AirRiskClass,
    /// Air encounter category of the rule that set the initial ARC
    pub aec: u8,
    pub residual_arc: AirRiskClass,
    pub tmpr_robustness: Robustness,
    pub sail: Option<Sail>,
    pub containment: Option<Robustness>,
    pub required_osos: Vec<OsoRequirement>,
    pub within_scope: bool,
}

/// Project-level summary over its sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAssessment {
    pub governing_sail: Option<Sail>,
    pub overall_within_scope: bool,
    pub site_count: usize,
    pub sites: Vec<SiteAssessment>,
}
