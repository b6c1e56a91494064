//! Ground risk: intrinsic class lookup and mitigation credit.

use std::collections::BTreeMap;

use crate::error::{Result, SoraError};
use crate::models::{
    GrcValue, Mitigation, MitigationSelection, PopulationCategory, Robustness, UaCharacteristic,
    MIN_GRC,
};
use crate::tables::SoraTables;

/// Look up the intrinsic GRC for a population and UA class.
///
/// Returns [`GrcValue::OutOfScope`] for cells the framework excludes. A
/// missing cell means the active tables do not know the combination and is
/// reported as invalid input.
pub fn intrinsic_grc(
    tables: &SoraTables,
    population: PopulationCategory,
    ua: UaCharacteristic,
) -> Result<GrcValue> {
    let row = tables
        .intrinsic_grc
        .get(&population)
        .ok_or_else(|| SoraError::invalid("population", format!("{population:?}")))?;
    let cell = row
        .get(&ua)
        .ok_or_else(|| SoraError::invalid("ua_characteristic", format!("{ua:?}")))?;

    Ok(match cell {
        Some(class) => GrcValue::Class(*class),
        None => GrcValue::OutOfScope,
    })
}

/// Collapse selections to one robustness per mitigation; the last one wins.
pub fn dedupe_mitigations(selections: &[MitigationSelection]) -> BTreeMap<Mitigation, Robustness> {
    selections
        .iter()
        .map(|selection| (selection.mitigation, selection.robustness))
        .collect()
}

/// GRC points removed by one mitigation at the given robustness.
pub fn mitigation_reduction(
    tables: &SoraTables,
    mitigation: Mitigation,
    robustness: Robustness,
) -> Result<u8> {
    if robustness == Robustness::None {
        return Ok(0);
    }
    tables
        .mitigations
        .get(&mitigation)
        .and_then(|levels| levels.get(&robustness))
        .copied()
        .ok_or_else(|| {
            SoraError::invalid(
                "mitigation",
                format!("{} at {} robustness", mitigation.code(), robustness),
            )
        })
}

/// Apply ground risk mitigations to a base GRC.
///
/// Final GRC is floored at [`MIN_GRC`]. An out-of-scope base stays out of
/// scope whatever is applied.
pub fn apply_mitigations(
    tables: &SoraTables,
    base: GrcValue,
    selections: &[MitigationSelection],
) -> Result<GrcValue> {
    let mut total: u32 = 0;
    for (mitigation, robustness) in dedupe_mitigations(selections) {
        total += u32::from(mitigation_reduction(tables, mitigation, robustness)?);
    }

    let GrcValue::Class(class) = base else {
        return Ok(GrcValue::OutOfScope);
    };

    let reduced = u32::from(class).saturating_sub(total).max(u32::from(MIN_GRC));
    Ok(GrcValue::Class(reduced as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(mitigation: Mitigation, robustness: Robustness) -> MitigationSelection {
        MitigationSelection::new(mitigation, robustness)
    }

    #[test]
    fn igrc_matches_reference_table() {
        let tables = SoraTables::sora_2_5();
        for population in PopulationCategory::ALL {
            for ua in UaCharacteristic::ALL {
                let expected = match tables.intrinsic_grc[&population][&ua] {
                    Some(class) => GrcValue::Class(class),
                    None => GrcValue::OutOfScope,
                };
                assert_eq!(intrinsic_grc(&tables, population, ua).unwrap(), expected);
            }
        }
    }

    #[test]
    fn sparsely_populated_three_metre_class_is_five() {
        let tables = SoraTables::sora_2_5();
        let grc = intrinsic_grc(
            &tables,
            PopulationCategory::SparselyPopulated,
            UaCharacteristic::UpTo3m,
        )
        .unwrap();
        assert_eq!(grc, GrcValue::Class(5));
    }

    #[test]
    fn assemblies_with_large_ua_are_out_of_scope() {
        let tables = SoraTables::sora_2_5();
        let grc = intrinsic_grc(
            &tables,
            PopulationCategory::AssembliesOfPeople,
            UaCharacteristic::UpTo40m,
        )
        .unwrap();
        assert_eq!(grc, GrcValue::OutOfScope);

        let all = [
            select(Mitigation::Sheltering, Robustness::Medium),
            select(Mitigation::OperationalRestrictions, Robustness::High),
            select(Mitigation::ImpactDynamics, Robustness::High),
        ];
        assert_eq!(
            apply_mitigations(&tables, grc, &all).unwrap(),
            GrcValue::OutOfScope
        );
    }

    #[test]
    fn missing_cell_is_invalid_input() {
        let mut tables = SoraTables::sora_2_5();
        tables.intrinsic_grc.remove(&PopulationCategory::Remote);
        let err = intrinsic_grc(&tables, PopulationCategory::Remote, UaCharacteristic::UpTo1m)
            .unwrap_err();
        assert!(matches!(err, SoraError::InvalidInput { field: "population", .. }));
    }

    #[test]
    fn sheltering_medium_reduces_by_two() {
        let tables = SoraTables::sora_2_5();
        let result = apply_mitigations(
            &tables,
            GrcValue::Class(5),
            &[select(Mitigation::Sheltering, Robustness::Medium)],
        )
        .unwrap();
        assert_eq!(result, GrcValue::Class(3));
    }

    #[test]
    fn final_grc_never_drops_below_one() {
        let tables = SoraTables::sora_2_5();
        let result = apply_mitigations(
            &tables,
            GrcValue::Class(2),
            &[
                select(Mitigation::Sheltering, Robustness::Medium),
                select(Mitigation::OperationalRestrictions, Robustness::High),
                select(Mitigation::ImpactDynamics, Robustness::High),
            ],
        )
        .unwrap();
        assert_eq!(result, GrcValue::Class(MIN_GRC));
    }

    #[test]
    fn adding_a_mitigation_never_increases_grc() {
        let tables = SoraTables::sora_2_5();
        let mut applied = Vec::new();
        let mut previous = 8u8;
        for mitigation in Mitigation::ALL {
            for (robustness, points) in &tables.mitigations[&mitigation] {
                if *points == 0 {
                    continue;
                }
                applied.push(select(mitigation, *robustness));
                let current = apply_mitigations(&tables, GrcValue::Class(8), &applied)
                    .unwrap()
                    .class()
                    .unwrap();
                assert!(current <= previous);
                assert!(current >= MIN_GRC);
                previous = current;
            }
        }
    }

    #[test]
    fn reselection_does_not_double_count() {
        let tables = SoraTables::sora_2_5();
        let once = [select(Mitigation::Sheltering, Robustness::Medium)];
        let twice = [
            select(Mitigation::Sheltering, Robustness::Medium),
            select(Mitigation::Sheltering, Robustness::Medium),
        ];
        assert_eq!(
            apply_mitigations(&tables, GrcValue::Class(6), &once).unwrap(),
            apply_mitigations(&tables, GrcValue::Class(6), &twice).unwrap()
        );
    }

    #[test]
    fn last_selected_robustness_wins() {
        let tables = SoraTables::sora_2_5();
        let selections = [
            select(Mitigation::Sheltering, Robustness::Medium),
            select(Mitigation::Sheltering, Robustness::Low),
        ];
        assert_eq!(
            apply_mitigations(&tables, GrcValue::Class(6), &selections).unwrap(),
            GrcValue::Class(5)
        );
    }

    #[test]
    fn unavailable_robustness_is_invalid_input() {
        let tables = SoraTables::sora_2_5();
        let err = apply_mitigations(
            &tables,
            GrcValue::Class(6),
            &[select(Mitigation::Sheltering, Robustness::High)],
        )
        .unwrap_err();
        assert!(matches!(err, SoraError::InvalidInput { field: "mitigation", .. }));
    }

    #[test]
    fn robustness_none_is_free() {
        let tables = SoraTables::sora_2_5();
        assert_eq!(
            mitigation_reduction(&tables, Mitigation::GroundObservation, Robustness::None)
                .unwrap(),
            0
        );
    }
}
