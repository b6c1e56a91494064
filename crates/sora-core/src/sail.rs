//! SAIL determination and the requirements that follow from it.

use crate::error::{Result, SoraError};
use crate::models::{AirRiskClass, GrcValue, OsoRequirement, PopulationCategory, Robustness, Sail};
use crate::tables::SoraTables;

/// Look up the SAIL for a final GRC and residual ARC.
///
/// Returns `None` when the final GRC is out of scope or beyond the last
/// tabulated row; callers must check scope before using the SAIL.
pub fn sail_for(tables: &SoraTables, final_grc: GrcValue, residual: AirRiskClass) -> Option<Sail> {
    let grc = final_grc.class()?;
    tables
        .sail_matrix
        .get(&grc)
        .map(|row| row[residual.index()])
}

/// Whether a final GRC falls inside the assessable envelope.
pub fn within_scope(tables: &SoraTables, final_grc: GrcValue) -> bool {
    match (final_grc, tables.max_sail_grc()) {
        (GrcValue::Class(grc), Some(max)) => grc <= max,
        _ => false,
    }
}

/// Containment robustness for a SAIL and the adjacent area population.
pub fn containment_for(
    tables: &SoraTables,
    sail: Sail,
    adjacent: Option<PopulationCategory>,
) -> Result<Robustness> {
    let Some(adjacent) = adjacent else {
        return Ok(tables.default_containment);
    };
    tables
        .containment
        .get(&sail)
        .and_then(|row| row.get(&adjacent))
        .copied()
        .ok_or_else(|| {
            SoraError::invalid(
                "adjacent_population",
                format!("{adjacent:?} at SAIL {}", sail.roman()),
            )
        })
}

/// Full OSO row for a SAIL, including optional objectives.
pub fn oso_matrix(tables: &SoraTables, sail: Sail) -> Vec<OsoRequirement> {
    let column = usize::from(sail.ordinal() - 1);
    let mut row: Vec<OsoRequirement> = tables
        .osos
        .iter()
        .map(|oso| OsoRequirement {
            number: oso.number,
            title: oso.title.clone(),
            robustness: oso.robustness[column],
        })
        .collect();
    row.sort_by_key(|oso| oso.number);
    row
}

/// OSOs a SAIL requires, ordered by number. Optional ones are left out.
pub fn required_osos(tables: &SoraTables, sail: Sail) -> Vec<OsoRequirement> {
    oso_matrix(tables, sail)
        .into_iter()
        .filter(|oso| oso.robustness != Robustness::None)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grc_three_arc_a_is_sail_two() {
        let tables = SoraTables::sora_2_5();
        assert_eq!(sail_for(&tables, GrcValue::Class(3), AirRiskClass::A), Some(Sail::II));
    }

    #[test]
    fn sail_is_monotonic_in_grc_and_arc() {
        let tables = SoraTables::sora_2_5();
        let max = tables.max_sail_grc().unwrap();
        for grc in 1..=max {
            for pair in AirRiskClass::ALL.windows(2) {
                let low = sail_for(&tables, GrcValue::Class(grc), pair[0]).unwrap();
                let high = sail_for(&tables, GrcValue::Class(grc), pair[1]).unwrap();
                assert!(low <= high, "ARC ordering broken at GRC {grc}");
            }
        }
        for arc in AirRiskClass::ALL {
            for grc in 1..max {
                let low = sail_for(&tables, GrcValue::Class(grc), arc).unwrap();
                let high = sail_for(&tables, GrcValue::Class(grc + 1), arc).unwrap();
                assert!(low <= high, "GRC ordering broken at {arc}");
            }
        }
    }

    #[test]
    fn grc_beyond_matrix_has_no_sail() {
        let tables = SoraTables::sora_2_5();
        assert_eq!(sail_for(&tables, GrcValue::Class(8), AirRiskClass::A), None);
        assert_eq!(sail_for(&tables, GrcValue::OutOfScope, AirRiskClass::A), None);
        assert!(!within_scope(&tables, GrcValue::Class(8)));
        assert!(!within_scope(&tables, GrcValue::OutOfScope));
        assert!(within_scope(&tables, GrcValue::Class(7)));
    }

    #[test]
    fn arc_d_is_always_sail_six() {
        let tables = SoraTables::sora_2_5();
        for grc in 1..=7 {
            assert_eq!(sail_for(&tables, GrcValue::Class(grc), AirRiskClass::D), Some(Sail::VI));
        }
    }

    #[test]
    fn containment_uses_adjacent_population() {
        let tables = SoraTables::sora_2_5();
        assert_eq!(
            containment_for(&tables, Sail::II, Some(PopulationCategory::SparselyPopulated))
                .unwrap(),
            Robustness::Low
        );
        assert_eq!(
            containment_for(&tables, Sail::V, Some(PopulationCategory::Suburban)).unwrap(),
            Robustness::High
        );
    }

    #[test]
    fn containment_defaults_to_low() {
        let tables = SoraTables::sora_2_5();
        for sail in Sail::ALL {
            assert_eq!(containment_for(&tables, sail, None).unwrap(), Robustness::Low);
        }
    }

    #[test]
    fn containment_missing_row_is_invalid_input() {
        let mut tables = SoraTables::sora_2_5();
        tables.containment.remove(&Sail::III);
        assert!(containment_for(&tables, Sail::III, Some(PopulationCategory::Remote)).is_err());
    }

    #[test]
    fn required_osos_grow_with_sail() {
        let tables = SoraTables::sora_2_5();
        let sail_one = required_osos(&tables, Sail::I);
        let sail_six = required_osos(&tables, Sail::VI);
        assert!(sail_one.len() < sail_six.len());
        assert_eq!(sail_six.len(), tables.osos.len());
        assert!(sail_six.iter().all(|oso| oso.robustness == Robustness::High));
        assert!(sail_one.iter().all(|oso| oso.robustness != Robustness::None));
        assert!(sail_one.windows(2).all(|pair| pair[0].number < pair[1].number));
    }

    #[test]
    fn oso_matrix_keeps_optional_entries() {
        let tables = SoraTables::sora_2_5();
        let row = oso_matrix(&tables, Sail::I);
        assert_eq!(row.len(), tables.osos.len());
        let oso_one = row.iter().find(|oso| oso.number == 1).unwrap();
        assert_eq!(oso_one.robustness, Robustness::None);
    }
}
