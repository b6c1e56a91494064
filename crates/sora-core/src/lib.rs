pub mod air;
pub mod assessment;
pub mod error;
pub mod ground;
pub mod models;
pub mod sail;
pub mod tables;

pub use air::{initial_arc, residual_arc, tmpr_robustness, ArcRuleMatch};
pub use assessment::{aggregate, assess_project, assess_site};
pub use error::{Result, SoraError};
pub use ground::{apply_mitigations, intrinsic_grc, mitigation_reduction};
pub use models::{
    AirRiskClass, AirspaceClass, AirspaceInput, AltitudeBand, GrcValue, Mitigation,
    MitigationSelection, OsoRequirement, PopulationCategory, ProjectAssessment, Robustness, Sail,
    SiteAssessment, SiteInput, Tmpr, UaCharacteristic, MIN_GRC,
};
pub use sail::{containment_for, oso_matrix, required_osos, sail_for, within_scope};
pub use tables::{ArcRule, OsoDefinition, SoraTables};
