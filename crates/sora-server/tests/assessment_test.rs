//! Assessment API integration tests.
//!
//! Run with: cargo test --test assessment_test -- --ignored
//!
//! Note: Requires a running SORA server at http://localhost:3000
//! or set SORA_TEST_URL environment variable.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("SORA_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn rural_site(site_id: &str) -> Value {
    json!({
        "site_id": site_id,
        "population": "sparsely_populated",
        "ua_characteristic": "up_to_3m",
        "mitigations": [
            { "mitigation": "operational_restrictions", "robustness": "medium" },
            { "mitigation": "impact_dynamics", "robustness": "medium" }
        ],
        "airspace": { "airspace_class": "uncontrolled", "altitude_band": "below_500_ft" },
        "tmpr": ["vlos"]
    })
}

#[tokio::test]
#[ignore] // Run only when server is running
async fn test_assess_site() {
    let client = Client::new();
    let resp = client
        .post(format!("{}/v1/assess/site", base_url()))
        .json(&rural_site("IT-SITE-1"))
        .send()
        .await
        .expect("Failed to assess site");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["final_grc"], json!({ "class": 3 }));
    assert_eq!(body["sail"], "II");
}

#[tokio::test]
#[ignore]
async fn test_project_round_trip() {
    let client = Client::new();
    let base = base_url();

    let resp = client
        .post(format!("{}/v1/projects", base))
        .json(&json!({ "name": "Integration survey" }))
        .send()
        .await
        .expect("Failed to create project");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let project: Value = resp.json().await.unwrap();
    let project_id = project["project_id"].as_str().unwrap().to_string();

    for site_id in ["north", "south"] {
        let resp = client
            .put(format!("{}/v1/projects/{}/sites/{}", base, project_id, site_id))
            .json(&rural_site(site_id))
            .send()
            .await
            .expect("Failed to store site");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let view: Value = client
        .get(format!("{}/v1/projects/{}", base, project_id))
        .send()
        .await
        .expect("Failed to fetch project")
        .json()
        .await
        .unwrap();
    assert_eq!(view["assessment"]["site_count"], 2);
    assert_eq!(view["assessment"]["governing_sail"], "II");

    let resp = client
        .delete(format!("{}/v1/projects/{}", base, project_id))
        .send()
        .await
        .expect("Failed to delete project");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
