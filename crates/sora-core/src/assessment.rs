//! Per-site assessment and project aggregation.

use crate::air::{initial_arc, residual_arc, tmpr_robustness};
use crate::error::Result;
use crate::ground::{apply_mitigations, intrinsic_grc};
use crate::models::{ProjectAssessment, SiteAssessment, SiteInput};
use crate::sail::{containment_for, required_osos, sail_for, within_scope};
use crate::tables::SoraTables;

/// Run the full pipeline for one site.
///
/// Invalid input aborts without a partial result. Out-of-scope operations
/// come back with `within_scope == false` and no SAIL, containment or OSOs.
pub fn assess_site(tables: &SoraTables, input: &SiteInput) -> Result<SiteAssessment> {
    let intrinsic = intrinsic_grc(tables, input.population, input.ua_characteristic)?;
    let final_grc = apply_mitigations(tables, intrinsic, &input.mitigations)?;
    let initial = initial_arc(tables, &input.airspace, input.population)?;
    let residual = residual_arc(tables, initial.arc, &input.tmpr)?;

    let in_scope = within_scope(tables, final_grc);
    let sail = if in_scope {
        sail_for(tables, final_grc, residual)
    } else {
        None
    };

    let (containment, required) = match sail {
        Some(sail) => (
            Some(containment_for(tables, sail, input.adjacent_population)?),
            required_osos(tables, sail),
        ),
        None => (None, Vec::new()),
    };

    Ok(SiteAssessment {
        input: input.clone(),
        intrinsic_grc: intrinsic,
        final_grc,
        initial_arc: initial.arc,
        aec: initial.aec,
        residual_arc: residual,
        tmpr_robustness: tmpr_robustness(residual),
        within_scope: in_scope && sail.is_some(),
        sail,
        containment,
        required_osos: required,
    })
}

/// Combine site results into a project summary.
///
/// The governing SAIL is the highest site SAIL; with no sites there is none
/// and the project is vacuously within scope.
pub fn aggregate(sites: Vec<SiteAssessment>) -> ProjectAssessment {
    let governing_sail = sites
        .iter()
        .filter_map(|site| site.sail)
        .max_by_key(|sail| sail.ordinal());
    let overall_within_scope = sites.iter().all(|site| site.within_scope);

    ProjectAssessment {
        governing_sail,
        overall_within_scope,
        site_count: sites.len(),
        sites,
    }
}

/// Assess every site and aggregate; the first invalid site aborts.
pub fn assess_project(tables: &SoraTables, inputs: &[SiteInput]) -> Result<ProjectAssessment> {
    let sites = inputs
        .iter()
        .map(|input| assess_site(tables, input))
        .collect::<Result<Vec<_>>>()?;
    Ok(aggregate(sites))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AirRiskClass, AirspaceClass, AirspaceInput, AltitudeBand, GrcValue, Mitigation,
        MitigationSelection, PopulationCategory, Robustness, Sail, Tmpr, UaCharacteristic,
    };
    use crate::SoraError;

    fn site(
        site_id: &str,
        population: PopulationCategory,
        ua: UaCharacteristic,
    ) -> SiteInput {
        SiteInput {
            site_id: site_id.to_string(),
            name: None,
            population,
            ua_characteristic: ua,
            mitigations: Vec::new(),
            airspace: AirspaceInput {
                airspace_class: AirspaceClass::Uncontrolled,
                altitude_band: AltitudeBand::Below500Ft,
                airport_environment: false,
            },
            tmpr: Vec::new(),
            adjacent_population: None,
        }
    }

    #[test]
    fn worked_example_end_to_end() {
        let tables = SoraTables::sora_2_5();
        let mut input = site(
            "field-a",
            PopulationCategory::SparselyPopulated,
            UaCharacteristic::UpTo3m,
        );
        input.mitigations = vec![MitigationSelection::new(
            Mitigation::Sheltering,
            Robustness::Medium,
        )];
        input.tmpr = vec![Tmpr::Vlos];
        input.adjacent_population = Some(PopulationCategory::SparselyPopulated);

        let result = assess_site(&tables, &input).unwrap();
        assert_eq!(result.intrinsic_grc, GrcValue::Class(5));
        assert_eq!(result.final_grc, GrcValue::Class(3));
        assert_eq!(result.initial_arc, AirRiskClass::B);
        assert_eq!(result.residual_arc, AirRiskClass::A);
        assert_eq!(result.sail, Some(Sail::II));
        assert_eq!(result.containment, Some(Robustness::Low));
        assert_eq!(result.tmpr_robustness, Robustness::None);
        assert!(result.within_scope);
        assert!(!result.required_osos.is_empty());
    }

    #[test]
    fn gathering_with_largest_ua_is_out_of_scope() {
        let tables = SoraTables::sora_2_5();
        let mut input = site(
            "stadium",
            PopulationCategory::AssembliesOfPeople,
            UaCharacteristic::UpTo40m,
        );
        input.mitigations = vec![
            MitigationSelection::new(Mitigation::OperationalRestrictions, Robustness::High),
            MitigationSelection::new(Mitigation::ImpactDynamics, Robustness::High),
        ];

        let result = assess_site(&tables, &input).unwrap();
        assert_eq!(result.intrinsic_grc, GrcValue::OutOfScope);
        assert_eq!(result.final_grc, GrcValue::OutOfScope);
        assert!(!result.within_scope);
        assert_eq!(result.sail, None);
        assert_eq!(result.containment, None);
        assert!(result.required_osos.is_empty());
    }

    #[test]
    fn final_grc_above_matrix_is_out_of_scope() {
        let tables = SoraTables::sora_2_5();
        let input = site(
            "downtown",
            PopulationCategory::HighDensityMetropolitan,
            UaCharacteristic::UpTo20m,
        );
        let result = assess_site(&tables, &input).unwrap();
        assert_eq!(result.final_grc, GrcValue::Class(9));
        assert!(!result.within_scope);
        assert_eq!(result.sail, None);
    }

    #[test]
    fn invalid_mitigation_produces_no_result() {
        let tables = SoraTables::sora_2_5();
        let mut input = site("x", PopulationCategory::Remote, UaCharacteristic::UpTo1m);
        input.mitigations = vec![MitigationSelection::new(
            Mitigation::GroundObservation,
            Robustness::High,
        )];
        assert!(matches!(
            assess_site(&tables, &input),
            Err(SoraError::InvalidInput { .. })
        ));
    }

    #[test]
    fn reassessing_is_idempotent() {
        let tables = SoraTables::sora_2_5();
        let input = site("a", PopulationCategory::LightlyPopulated, UaCharacteristic::UpTo8m);
        assert_eq!(
            assess_site(&tables, &input).unwrap(),
            assess_site(&tables, &input).unwrap()
        );
    }

    #[test]
    fn empty_project_has_no_governing_sail() {
        let project = aggregate(Vec::new());
        assert_eq!(project.governing_sail, None);
        assert!(project.overall_within_scope);
        assert_eq!(project.site_count, 0);
    }

    #[test]
    fn single_site_governs_project() {
        let tables = SoraTables::sora_2_5();
        let input = site("a", PopulationCategory::Remote, UaCharacteristic::UpTo1m);
        let only = assess_site(&tables, &input).unwrap();
        let project = aggregate(vec![only.clone()]);
        assert_eq!(project.governing_sail, only.sail);
        assert!(project.overall_within_scope);
    }

    #[test]
    fn governing_sail_is_the_maximum() {
        let tables = SoraTables::sora_2_5();
        let inputs = vec![
            site("rural", PopulationCategory::Remote, UaCharacteristic::UpTo1m),
            site("town", PopulationCategory::Suburban, UaCharacteristic::UpTo1m),
            site("lake", PopulationCategory::ControlledGroundArea, UaCharacteristic::UpTo1m),
        ];
        let project = assess_project(&tables, &inputs).unwrap();
        let expected = project.sites.iter().filter_map(|s| s.sail).max();
        assert_eq!(project.governing_sail, expected);
        // Suburban is urban: iGRC 5 with ARC-c gives SAIL IV.
        assert_eq!(project.governing_sail, Some(Sail::IV));
        assert_eq!(project.site_count, 3);
        assert!(project.overall_within_scope);
    }

    #[test]
    fn one_out_of_scope_site_clears_project_scope() {
        let tables = SoraTables::sora_2_5();
        let inputs = vec![
            site("rural", PopulationCategory::Remote, UaCharacteristic::UpTo1m),
            site(
                "festival",
                PopulationCategory::AssembliesOfPeople,
                UaCharacteristic::UpTo8m,
            ),
        ];
        let project = assess_project(&tables, &inputs).unwrap();
        assert!(!project.overall_within_scope);
        assert_eq!(project.governing_sail, project.sites[0].sail);
    }
}
