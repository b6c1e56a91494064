//! Plain-text rendering of assessments for terminal output.

use sora_core::{ProjectAssessment, SiteAssessment};
use std::fmt::Write;

pub fn site_summary(assessment: &SiteAssessment) -> String {
    let input = &assessment.input;
    let mut out = String::new();

    let title = input.name.as_deref().unwrap_or(&input.site_id);
    let _ = writeln!(out, "Site {} ({})", input.site_id, title);
    let _ = writeln!(
        out,
        "  Ground:  {} / {} -> iGRC {} -> final GRC {}",
        input.population.label(),
        input.ua_characteristic.label(),
        assessment.intrinsic_grc,
        assessment.final_grc
    );
    let _ = writeln!(
        out,
        "  Air:     AEC {} -> {} -> residual {} (TMPR {})",
        assessment.aec, assessment.initial_arc, assessment.residual_arc, assessment.tmpr_robustness
    );

    match assessment.sail {
        Some(sail) if assessment.within_scope => {
            let containment = assessment
                .containment
                .map(|level| level.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "  Result:  {} (containment {})", sail, containment);
            for oso in &assessment.required_osos {
                let _ = writeln!(
                    out,
                    "    OSO#{:02} {:<6} {}",
                    oso.number,
                    oso.robustness.label(),
                    oso.title
                );
            }
        }
        _ => {
            let _ = writeln!(out, "  Result:  outside the scope of SORA");
        }
    }
    out
}

pub fn project_summary(assessment: &ProjectAssessment) -> String {
    let mut out = String::new();
    for site in &assessment.sites {
        out.push_str(&site_summary(site));
    }

    let governing = assessment
        .governing_sail
        .map(|sail| sail.to_string())
        .unwrap_or_else(|| "none".to_string());
    let _ = writeln!(
        out,
        "Project: {} site(s), governing {}{}",
        assessment.site_count,
        governing,
        if assessment.overall_within_scope {
            ""
        } else {
            " (some sites out of scope)"
        }
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sora_core::{
        assess_project, AirspaceClass, AirspaceInput, AltitudeBand, PopulationCategory, SiteInput,
        SoraTables, UaCharacteristic,
    };

    fn site(site_id: &str, population: PopulationCategory, ua: UaCharacteristic) -> SiteInput {
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
    fn project_summary_names_governing_sail() {
        let tables = SoraTables::sora_2_5();
        let assessment = assess_project(
            &tables,
            &[site("a", PopulationCategory::Remote, UaCharacteristic::UpTo1m)],
        )
        .unwrap();
        let text = project_summary(&assessment);
        assert!(text.contains("Site a"));
        assert!(text.contains("governing SAIL"));
        assert!(!text.contains("out of scope"));
    }

    #[test]
    fn out_of_scope_site_is_flagged() {
        let tables = SoraTables::sora_2_5();
        let assessment = assess_project(
            &tables,
            &[site(
                "crowd",
                PopulationCategory::AssembliesOfPeople,
                UaCharacteristic::UpTo40m,
            )],
        )
        .unwrap();
        let text = project_summary(&assessment);
        assert!(text.contains("outside the scope"));
        assert!(text.contains("governing none"));
    }
}
