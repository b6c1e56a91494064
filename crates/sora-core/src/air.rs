//! Air risk: initial ARC from the encounter rule set and residual ARC
//! after tactical mitigation credit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Result, SoraError};
use crate::models::{AirRiskClass, AirspaceInput, PopulationCategory, Robustness, Tmpr};
use crate::tables::SoraTables;

/// Initial ARC together with the encounter category that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRuleMatch {
    pub aec: u8,
    pub arc: AirRiskClass,
}

/// Evaluate the ARC rules top-down and return the first match.
pub fn initial_arc(
    tables: &SoraTables,
    airspace: &AirspaceInput,
    population: PopulationCategory,
) -> Result<ArcRuleMatch> {
    let urban = population.is_urban();
    tables
        .arc_rules
        .iter()
        .find(|rule| {
            rule.matches(
                airspace.airspace_class,
                airspace.altitude_band,
                airspace.airport_environment,
                urban,
            )
        })
        .map(|rule| ArcRuleMatch {
            aec: rule.aec,
            arc: rule.arc,
        })
        .ok_or_else(|| {
            SoraError::invalid(
                "airspace",
                format!(
                    "{:?} / {:?} (airport: {}, urban: {})",
                    airspace.airspace_class,
                    airspace.altitude_band,
                    airspace.airport_environment,
                    urban
                ),
            )
        })
}

/// Reduce the initial ARC by the credit of each distinct TMPR option.
///
/// Clamps at ARC-a; never wraps.
pub fn residual_arc(tables: &SoraTables, initial: AirRiskClass, tmpr: &[Tmpr]) -> Result<AirRiskClass> {
    let mut steps: u32 = 0;
    for option in tmpr.iter().collect::<BTreeSet<_>>() {
        let credit = tables
            .tmpr_credits
            .get(option)
            .ok_or_else(|| SoraError::invalid("tmpr", format!("{option:?}")))?;
        steps += u32::from(*credit);
    }
    Ok(initial.step_down(steps))
}

/// TMPR robustness the residual ARC demands.
pub fn tmpr_robustness(residual: AirRiskClass) -> Robustness {
    match residual {
        AirRiskClass::A => Robustness::None,
        AirRiskClass::B => Robustness::Low,
        AirRiskClass::C => Robustness::Medium,
        AirRiskClass::D => Robustness::High,
    }
}
