//! Reference tables for the risk classification pipeline.
//!
//! Tables are plain data so that a different regulatory edition can be
//! supplied as JSON without touching the lookup functions. The built-in set
//! follows SORA 2.5.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SoraError};
use crate::models::{
    AirRiskClass, AirspaceClass, AltitudeBand, Mitigation, PopulationCategory, Robustness, Sail,
    Tmpr, UaCharacteristic,
};

/// One top-down rule of the initial ARC rule set.
///
/// Empty condition lists and `None` flags match anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRule {
    /// Air encounter category this rule represents
    pub aec: u8,
    pub description: String,
    #[serde(default)]
    pub airspace: Vec<AirspaceClass>,
    #[serde(default)]
    pub altitude: Vec<AltitudeBand>,
    #[serde(default)]
    pub airport_environment: Option<bool>,
    #[serde(default)]
    pub urban: Option<bool>,
    pub arc: AirRiskClass,
}

impl ArcRule {
    fn new(aec: u8, description: &str, arc: AirRiskClass) -> Self {
        Self {
            aec,
            description: description.to_string(),
            airspace: Vec::new(),
            altitude: Vec::new(),
            airport_environment: None,
            urban: None,
            arc,
        }
    }

    fn airspace(mut self, classes: &[AirspaceClass]) -> Self {
        self.airspace = classes.to_vec();
        self
    }

    fn altitude(mut self, bands: &[AltitudeBand]) -> Self {
        self.altitude = bands.to_vec();
        self
    }

    fn airport(mut self, airport_environment: bool) -> Self {
        self.airport_environment = Some(airport_environment);
        self
    }

    fn urban(mut self, urban: bool) -> Self {
        self.urban = Some(urban);
        self
    }

    pub fn matches(
        &self,
        airspace: AirspaceClass,
        altitude: AltitudeBand,
        airport_environment: bool,
        urban: bool,
    ) -> bool {
        (self.airspace.is_empty() || self.airspace.contains(&airspace))
            && (self.altitude.is_empty() || self.altitude.contains(&altitude))
            && self
                .airport_environment
                .map_or(true, |expected| expected == airport_environment)
            && self.urban.map_or(true, |expected| expected == urban)
    }
}

/// An OSO with its robustness per SAIL (index 0 is SAIL I).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsoDefinition {
    pub number: u8,
    pub title: String,
    pub robustness: [Robustness; 6],
}

/// Complete set of reference tables for one regulatory edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoraTables {
    pub edition: String,
    /// iGRC per population row and UA column; `None` marks out of scope
    pub intrinsic_grc: BTreeMap<PopulationCategory, BTreeMap<UaCharacteristic, Option<u8>>>,
    /// GRC point reduction per mitigation and robustness. Levels a
    /// mitigation does not offer are absent.
    pub mitigations: BTreeMap<Mitigation, BTreeMap<Robustness, u8>>,
    /// Initial ARC rules, evaluated top-down, first match wins
    pub arc_rules: Vec<ArcRule>,
    /// ARC steps credited per TMPR option
    pub tmpr_credits: BTreeMap<Tmpr, u8>,
    /// SAIL per final GRC row, columns ARC-a..ARC-d
    pub sail_matrix: BTreeMap<u8, [Sail; 4]>,
    pub containment: BTreeMap<Sail, BTreeMap<PopulationCategory, Robustness>>,
    /// Containment robustness when the adjacent population is unspecified
    pub default_containment: Robustness,
    pub osos: Vec<OsoDefinition>,
}

impl Default for SoraTables {
    fn default() -> Self {
        Self::sora_2_5()
    }
}

impl SoraTables {
    /// Built-in SORA 2.5 tables.
    pub fn sora_2_5() -> Self {
        Self {
            edition: "SORA 2.5".to_string(),
            intrinsic_grc: default_intrinsic_grc(),
            mitigations: default_mitigations(),
            arc_rules: default_arc_rules(),
            tmpr_credits: BTreeMap::from([
                (Tmpr::Vlos, 1),
                (Tmpr::Evlos, 1),
                (Tmpr::DetectAndAvoid, 2),
            ]),
            sail_matrix: default_sail_matrix(),
            containment: default_containment(),
            default_containment: Robustness::Low,
            osos: default_osos(),
        }
    }

    /// Parse tables from JSON and reject them unless they validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: Self = serde_json::from_str(json)
            .map_err(|err| SoraError::InvalidTables(vec![err.to_string()]))?;
        let errors = tables.validate();
        if errors.is_empty() {
            Ok(tables)
        } else {
            Err(SoraError::InvalidTables(errors))
        }
    }

    /// Highest final GRC the SAIL matrix covers.
    pub fn max_sail_grc(&self) -> Option<u8> {
        self.sail_matrix.keys().next_back().copied()
    }

    /// Validate table consistency.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        // iGRC: complete and non-decreasing along both axes. Out of scope
        // ranks above every class.
        let rank = |cell: Option<u8>| cell.map_or(u16::MAX, u16::from);
        for population in PopulationCategory::ALL {
            let Some(row) = self.intrinsic_grc.get(&population) else {
                errors.push(format!("iGRC row missing for {population:?}"));
                continue;
            };
            let mut previous: Option<u16> = None;
            for ua in UaCharacteristic::ALL {
                let Some(cell) = row.get(&ua) else {
                    errors.push(format!("iGRC cell missing for {population:?} / {ua:?}"));
                    continue;
                };
                if *cell == Some(0) {
                    errors.push(format!("iGRC for {population:?} / {ua:?} must be at least 1"));
                }
                let current = rank(*cell);
                if previous.is_some_and(|prev| current < prev) {
                    errors.push(format!("iGRC decreases with UA size at {population:?} / {ua:?}"));
                }
                previous = Some(current);
            }
        }
        for ua in UaCharacteristic::ALL {
            let mut previous: Option<u16> = None;
            for population in PopulationCategory::ALL {
                let Some(cell) = self.intrinsic_grc.get(&population).and_then(|row| row.get(&ua))
                else {
                    continue;
                };
                let current = rank(*cell);
                if previous.is_some_and(|prev| current < prev) {
                    errors.push(format!(
                        "iGRC decreases with population density at {population:?} / {ua:?}"
                    ));
                }
                previous = Some(current);
            }
        }

        for (mitigation, reductions) in &self.mitigations {
            if reductions.get(&Robustness::None).is_some_and(|points| *points != 0) {
                errors.push(format!("{mitigation:?} must not reduce GRC at robustness none"));
            }
            let mut previous = 0;
            for points in reductions.values() {
                if *points < previous {
                    errors.push(format!("{mitigation:?} reduction decreases with robustness"));
                }
                previous = *points;
            }
        }

        if self.arc_rules.is_empty() {
            errors.push("ARC rule set is empty".to_string());
        }

        for option in [Tmpr::Vlos, Tmpr::Evlos, Tmpr::DetectAndAvoid] {
            if !self.tmpr_credits.contains_key(&option) {
                errors.push(format!("TMPR credit missing for {option:?}"));
            }
        }

        // SAIL rows must start at 1, be contiguous, and be monotonic in
        // both GRC and ARC.
        let mut expected_grc = 1u8;
        let mut previous_row: Option<&[Sail; 4]> = None;
        for (grc, row) in &self.sail_matrix {
            if *grc != expected_grc {
                errors.push(format!("SAIL matrix row {expected_grc} missing"));
            }
            expected_grc = grc.saturating_add(1);
            if row.windows(2).any(|pair| pair[1] < pair[0]) {
                errors.push(format!("SAIL decreases with ARC in GRC row {grc}"));
            }
            if let Some(previous) = previous_row {
                if previous.iter().zip(row.iter()).any(|(low, high)| high < low) {
                    errors.push(format!("SAIL decreases with GRC at row {grc}"));
                }
            }
            previous_row = Some(row);
        }
        if self.sail_matrix.is_empty() {
            errors.push("SAIL matrix is empty".to_string());
        }

        for sail in Sail::ALL {
            let Some(row) = self.containment.get(&sail) else {
                errors.push(format!("containment row missing for SAIL {}", sail.roman()));
                continue;
            };
            let mut previous = Robustness::None;
            for population in PopulationCategory::ALL {
                if let Some(level) = row.get(&population) {
                    if *level < previous {
                        errors.push(format!(
                            "containment decreases with adjacent population at SAIL {} / {population:?}",
                            sail.roman()
                        ));
                    }
                    previous = *level;
                }
            }
        }

        let mut numbers = BTreeSet::new();
        for oso in &self.osos {
            if !numbers.insert(oso.number) {
                errors.push(format!("OSO #{:02} defined twice", oso.number));
            }
        }

        errors
    }

    /// Check if tables are consistent.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn default_intrinsic_grc() -> BTreeMap<PopulationCategory, BTreeMap<UaCharacteristic, Option<u8>>> {
    use PopulationCategory::*;

    let rows: [(PopulationCategory, [Option<u8>; 5]); 7] = [
        (ControlledGroundArea, [Some(1), Some(1), Some(2), Some(3), Some(3)]),
        (Remote, [Some(2), Some(3), Some(4), Some(5), Some(6)]),
        (LightlyPopulated, [Some(3), Some(4), Some(5), Some(6), Some(7)]),
        (SparselyPopulated, [Some(4), Some(5), Some(6), Some(7), Some(8)]),
        (Suburban, [Some(5), Some(6), Some(7), Some(8), Some(9)]),
        (HighDensityMetropolitan, [Some(6), Some(7), Some(8), Some(9), Some(10)]),
        (AssembliesOfPeople, [Some(7), Some(8), None, None, None]),
    ];

    rows.into_iter()
        .map(|(population, cells)| {
            let row: BTreeMap<UaCharacteristic, Option<u8>> =
                UaCharacteristic::ALL.into_iter().zip(cells).collect();
            (population, row)
        })
        .collect()
}

fn default_mitigations() -> BTreeMap<Mitigation, BTreeMap<Robustness, u8>> {
    BTreeMap::from([
        (
            Mitigation::Sheltering,
            BTreeMap::from([(Robustness::None, 0), (Robustness::Low, 1), (Robustness::Medium, 2)]),
        ),
        (
            Mitigation::OperationalRestrictions,
            BTreeMap::from([(Robustness::None, 0), (Robustness::Medium, 1), (Robustness::High, 2)]),
        ),
        (
            Mitigation::GroundObservation,
            BTreeMap::from([(Robustness::None, 0), (Robustness::Low, 1)]),
        ),
        (
            Mitigation::ImpactDynamics,
            BTreeMap::from([(Robustness::None, 0), (Robustness::Medium, 1), (Robustness::High, 2)]),
        ),
    ])
}

fn default_arc_rules() -> Vec<ArcRule> {
    use AirRiskClass::*;
    use AirspaceClass::*;
    use AltitudeBand::*;

    vec![
        ArcRule::new(12, "Atypical or segregated airspace", A).airspace(&[Atypical]),
        ArcRule::new(11, "Above FL600", B).altitude(&[AboveFl600]),
        ArcRule::new(1, "Airport/heliport environment in controlled airspace", D)
            .airport(true)
            .airspace(&[Controlled]),
        ArcRule::new(6, "Airport/heliport environment outside controlled airspace", C)
            .airport(true),
        ArcRule::new(2, "Above 500 ft AGL in a Mode-S veil or TMZ", D)
            .altitude(&[Above500Ft])
            .airspace(&[ModeSVeilOrTmz]),
        ArcRule::new(3, "Above 500 ft AGL in controlled airspace", D)
            .altitude(&[Above500Ft])
            .airspace(&[Controlled]),
        ArcRule::new(4, "Above 500 ft AGL in uncontrolled airspace over urban area", C)
            .altitude(&[Above500Ft])
            .airspace(&[Uncontrolled])
            .urban(true),
        ArcRule::new(5, "Above 500 ft AGL in uncontrolled airspace over rural area", C)
            .altitude(&[Above500Ft])
            .airspace(&[Uncontrolled])
            .urban(false),
        ArcRule::new(7, "Below 500 ft AGL in a Mode-S veil or TMZ", C)
            .altitude(&[Below500Ft])
            .airspace(&[ModeSVeilOrTmz]),
        ArcRule::new(8, "Below 500 ft AGL in controlled airspace", C)
            .altitude(&[Below500Ft])
            .airspace(&[Controlled]),
        ArcRule::new(9, "Below 500 ft AGL in uncontrolled airspace over urban area", C)
            .altitude(&[Below500Ft])
            .airspace(&[Uncontrolled])
            .urban(true),
        ArcRule::new(10, "Below 500 ft AGL in uncontrolled airspace over rural area", B)
            .altitude(&[Below500Ft])
            .airspace(&[Uncontrolled])
            .urban(false),
    ]
}

fn default_sail_matrix() -> BTreeMap<u8, [Sail; 4]> {
    use Sail::*;

    BTreeMap::from([
        (1, [I, II, IV, VI]),
        (2, [I, II, IV, VI]),
        (3, [II, II, IV, VI]),
        (4, [III, III, IV, VI]),
        (5, [IV, IV, IV, VI]),
        (6, [V, V, V, VI]),
        (7, [VI, VI, VI, VI]),
    ])
}

fn default_containment() -> BTreeMap<Sail, BTreeMap<PopulationCategory, Robustness>> {
    use PopulationCategory::*;
    use Robustness::{High, Low, Medium};

    let low_sail = [Low, Low, Low, Low, Medium, High, High];
    let mid_sail = [Low, Low, Low, Medium, Medium, High, High];
    let high_sail = [Low, Low, Medium, Medium, High, High, High];
    let row = |levels: [Robustness; 7]| -> BTreeMap<PopulationCategory, Robustness> {
        [
            ControlledGroundArea,
            Remote,
            LightlyPopulated,
            SparselyPopulated,
            Suburban,
            HighDensityMetropolitan,
            AssembliesOfPeople,
        ]
        .into_iter()
        .zip(levels)
        .collect()
    };

    BTreeMap::from([
        (Sail::I, row(low_sail)),
        (Sail::II, row(low_sail)),
        (Sail::III, row(mid_sail)),
        (Sail::IV, row(mid_sail)),
        (Sail::V, row(high_sail)),
        (Sail::VI, row(high_sail)),
    ])
}

fn default_osos() -> Vec<OsoDefinition> {
    use Robustness::{High as H, Low as L, Medium as M, None as O};

    let oso = |number: u8, title: &str, robustness: [Robustness; 6]| OsoDefinition {
        number,
        title: title.to_string(),
        robustness,
    };

    vec![
        oso(1, "Ensure the UAS operator is competent and/or proven", [O, L, M, H, H, H]),
        oso(2, "UAS manufactured by competent and/or proven entity", [O, O, L, M, H, H]),
        oso(3, "UAS maintained by competent and/or proven entity", [L, L, M, M, H, H]),
        oso(4, "UAS components essential to safe operations are designed to an airworthiness design standard", [O, O, O, L, M, H]),
        oso(5, "UAS is designed considering system safety and reliability", [O, O, L, M, H, H]),
        oso(6, "C3 link characteristics are appropriate for the operation", [O, L, L, M, H, H]),
        oso(7, "Conformity check of the UAS configuration", [L, L, M, M, H, H]),
        oso(8, "Operational procedures are defined, validated and adhered to", [L, M, H, H, H, H]),
        oso(9, "Remote crew trained and current", [L, L, M, M, H, H]),
        oso(13, "External services supporting UAS operations are adequate to the operation", [L, L, M, H, H, H]),
        oso(16, "Multi-crew coordination", [L, L, M, M, H, H]),
        oso(17, "Remote crew is fit to operate", [L, L, M, M, H, H]),
        oso(18, "Automatic protection of the flight envelope from human errors", [O, O, L, M, H, H]),
        oso(19, "Safe recovery from human error", [O, O, L, M, M, H]),
        oso(20, "A human factors evaluation has been performed and the HMI found appropriate", [O, L, L, M, M, H]),
        oso(23, "Environmental conditions for safe operations defined, measurable and adhered to", [L, L, M, M, H, H]),
        oso(24, "UAS designed and qualified for adverse environmental conditions", [O, O, M, H, H, H]),
    ]
}
