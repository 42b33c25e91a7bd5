use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Success,
    PartialSuccess,
    Delay,
    Failure,
    Underfunded,
}

impl ScenarioKind {
    /// Fixed display order for scenario comparisons, regardless of the
    /// order the server's response map iterates in.
    pub const CANONICAL_ORDER: [ScenarioKind; 5] = [
        ScenarioKind::Success,
        ScenarioKind::PartialSuccess,
        ScenarioKind::Delay,
        ScenarioKind::Failure,
        ScenarioKind::Underfunded,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            ScenarioKind::Success => "success",
            ScenarioKind::PartialSuccess => "partial_success",
            ScenarioKind::Delay => "delay",
            ScenarioKind::Failure => "failure",
            ScenarioKind::Underfunded => "underfunded",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ScenarioKind::Success => "Success",
            ScenarioKind::PartialSuccess => "Partial Success",
            ScenarioKind::Delay => "Delayed",
            ScenarioKind::Failure => "Failure",
            ScenarioKind::Underfunded => "Underfunded",
        }
    }

    /// Human-readable run label: wire name upper-cased with separators
    /// replaced by spaces, suffixed with "Scenario".
    pub fn simulation_label(self) -> String {
        format!("{} Scenario", self.wire_name().replace('_', " ").to_uppercase())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScenarioParameters {
    pub scenario: ScenarioKind,
    pub funding_percentage: f64,
    pub timeline_years: u32,
    pub delay_months: u32,
    pub scale_factor: f64,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::Success,
            funding_percentage: 100.0,
            timeline_years: 5,
            delay_months: 0,
            scale_factor: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GoalCatalog {
    pub goals: BTreeMap<u32, String>,
}

impl GoalCatalog {
    pub fn name(&self, goal: u32) -> Option<&str> {
        self.goals.get(&goal).map(String::as_str)
    }

    pub fn contains(&self, goal: u32) -> bool {
        self.goals.contains_key(&goal)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TwinSummary {
    pub id: u64,
    pub name: String,
    pub region: String,
    pub country: String,
    pub population: u64,
    pub area_km2: f64,
    #[serde(default)]
    pub baseline_year: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BaselineIndicator {
    pub sdg_number: u32,
    pub sdg_name: String,
    pub baseline_value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub target_value: Option<f64>,
}

/// `GET /digital-twins/{id}` wraps the twin in an envelope alongside its
/// baseline indicator list.
#[derive(Clone, Debug, Deserialize)]
pub struct TwinDetail {
    pub twin: TwinSummary,
    #[serde(default)]
    pub indicators: Vec<BaselineIndicator>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationRequest {
    pub digital_twin_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    pub scenario_type: ScenarioKind,
    pub simulation_name: String,
    pub target_sdgs: Vec<u32>,
    pub funding_percentage: f64,
    pub timeline_years: u32,
    pub delay_months: u32,
    pub scale_factor: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompareRequest {
    pub digital_twin_id: u64,
    pub target_sdgs: Vec<u32>,
    pub scenarios: Vec<ScenarioKind>,
    pub funding_percentage: f64,
    pub timeline_years: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TimelinePoint {
    pub year: u32,
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GoalOutcome {
    pub sdg_name: String,
    pub baseline: f64,
    #[serde(rename = "final")]
    pub final_value: f64,
    pub change: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub is_secondary: bool,
    #[serde(default)]
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SimulationResult {
    pub simulation_name: String,
    pub timeline_years: u32,
    pub confidence_score: f64,
    pub affected_population: u64,
    pub explanation: String,
    pub policy_insight: String,
    #[serde(default)]
    pub risk_warning: Option<String>,
    #[serde(deserialize_with = "ordered_outcomes")]
    pub predicted_outcomes: Vec<(u32, GoalOutcome)>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioOutcome {
    #[serde(deserialize_with = "ordered_outcomes")]
    pub outcomes: Vec<(u32, GoalOutcome)>,
    pub affected_population: u64,
    pub confidence: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct ComparisonSet {
    pub scenarios: BTreeMap<ScenarioKind, ScenarioOutcome>,
}

/// Outcome maps are keyed by goal number but the key order carries meaning
/// (targeted goals first, ripple effects after), so they are decoded into a
/// vector instead of a sorted map.
fn ordered_outcomes<'de, D>(deserializer: D) -> Result<Vec<(u32, GoalOutcome)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OutcomeMapVisitor;

    impl<'de> Visitor<'de> for OutcomeMapVisitor {
        type Value = Vec<(u32, GoalOutcome)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of goal numbers to outcomes")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut outcomes = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(key) = access.next_key::<String>()? {
                let goal: u32 = key
                    .parse()
                    .map_err(|_| de::Error::custom(format!("invalid goal number key: {key}")))?;
                outcomes.push((goal, access.next_value()?));
            }
            Ok(outcomes)
        }
    }

    deserializer.deserialize_map(OutcomeMapVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_kind_wire_names_round_trip() {
        for kind in ScenarioKind::CANONICAL_ORDER {
            let json = serde_json::to_string(&kind).expect("kind should serialize");
            assert_eq!(json, format!("\"{}\"", kind.wire_name()));
            let parsed: ScenarioKind =
                serde_json::from_str(&json).expect("kind should deserialize");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn simulation_label_is_upper_cased_with_spaces() {
        assert_eq!(
            ScenarioKind::PartialSuccess.simulation_label(),
            "PARTIAL SUCCESS Scenario"
        );
        assert_eq!(ScenarioKind::Success.simulation_label(), "SUCCESS Scenario");
    }

    #[test]
    fn goal_catalog_parses_numeric_keys() {
        let json = r#"{"goals": {"1": "No Poverty", "13": "Climate Action"}, "indicators": {}}"#;
        let catalog: GoalCatalog = serde_json::from_str(json).expect("catalog should parse");
        assert_eq!(catalog.name(1), Some("No Poverty"));
        assert_eq!(catalog.name(13), Some("Climate Action"));
        assert!(!catalog.contains(2));
    }

    #[test]
    fn outcome_map_preserves_insertion_order() {
        let json = r#"{
            "simulation_name": "SUCCESS Scenario",
            "timeline_years": 5,
            "confidence_score": 0.75,
            "affected_population": 40000,
            "explanation": "e",
            "policy_insight": "p",
            "predicted_outcomes": {
                "3": {"sdg_name": "Good Health and Well-being", "baseline": 60.0, "final": 70.0, "change": 10.0},
                "1": {"sdg_name": "No Poverty", "baseline": 30.0, "final": 22.0, "change": -8.0},
                "2": {"sdg_name": "Zero Hunger", "baseline": 20.0, "final": 21.0, "change": 1.0, "is_secondary": true}
            }
        }"#;
        let result: SimulationResult = serde_json::from_str(json).expect("result should parse");
        let order: Vec<u32> = result.predicted_outcomes.iter().map(|(n, _)| *n).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert!(result.predicted_outcomes[2].1.is_secondary);
        assert!(result.risk_warning.is_none());
    }

    #[test]
    fn outcome_map_rejects_non_numeric_keys() {
        let json = r#"{
            "outcomes": {"first": {"sdg_name": "x", "baseline": 1.0, "final": 2.0, "change": 1.0}},
            "affected_population": 10,
            "confidence": 0.5
        }"#;
        let err = serde_json::from_str::<ScenarioOutcome>(json).expect_err("must reject key");
        assert!(err.to_string().contains("invalid goal number key"));
    }

    #[test]
    fn comparison_set_parses_scenario_keys() {
        let json = r#"{
            "failure": {"outcomes": {}, "affected_population": 100, "confidence": 0.35},
            "success": {"outcomes": {}, "affected_population": 900, "confidence": 0.9}
        }"#;
        let set: ComparisonSet = serde_json::from_str(json).expect("set should parse");
        assert_eq!(set.scenarios.len(), 2);
        assert_eq!(
            set.scenarios[&ScenarioKind::Success].affected_population,
            900
        );
    }

    #[test]
    fn simulation_request_wire_shape() {
        let request = SimulationRequest {
            digital_twin_id: 7,
            project_id: None,
            scenario_type: ScenarioKind::Underfunded,
            simulation_name: ScenarioKind::Underfunded.simulation_label(),
            target_sdgs: vec![1, 3],
            funding_percentage: 80.0,
            timeline_years: 5,
            delay_months: 0,
            scale_factor: 1.0,
        };
        let value = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(value["digital_twin_id"], 7);
        assert_eq!(value["scenario_type"], "underfunded");
        assert_eq!(value["simulation_name"], "UNDERFUNDED Scenario");
        assert_eq!(value["target_sdgs"], serde_json::json!([1, 3]));
        assert!(value.get("project_id").is_none());
    }

    #[test]
    fn twin_detail_parses_envelope() {
        let json = r#"{
            "twin": {"id": 4, "name": "Coastal Province", "region": "South", "country": "Kenya",
                     "population": 50000, "area_km2": 1200.5, "baseline_year": 2024},
            "indicators": [
                {"sdg_number": 1, "sdg_name": "No Poverty", "baseline_value": 30.0, "unit": "%"}
            ]
        }"#;
        let detail: TwinDetail = serde_json::from_str(json).expect("detail should parse");
        assert_eq!(detail.twin.population, 50_000);
        assert_eq!(detail.indicators.len(), 1);
        assert_eq!(detail.indicators[0].sdg_number, 1);
    }
}
