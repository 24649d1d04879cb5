//! Saved scenarios for side-by-side comparison.
//!
//! A [`ScenarioBook`] is owned by the caller. Each [`Scenario`] is an
//! immutable snapshot of the inputs of one run plus its headline figures,
//! addressed by an opaque [`ScenarioId`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisInput, AnalysisOutput};
use crate::error::PayPlanError;
use crate::types::Money;
use crate::PayPlanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(Uuid);

impl ScenarioId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ScenarioId {
    type Err = PayPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| PayPlanError::InvalidInput {
                field: "scenario_id".into(),
                reason: e.to_string(),
            })
    }
}

/// The three figures a comparison needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub total_paid: Money,
    pub total_interest: Money,
    pub npv: Money,
}

impl From<&AnalysisOutput> for ScenarioSummary {
    fn from(out: &AnalysisOutput) -> Self {
        Self {
            total_paid: out.total_paid,
            total_interest: out.total_interest,
            npv: out.npv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    id: ScenarioId,
    name: String,
    inputs: AnalysisInput,
    summary: ScenarioSummary,
}

impl Scenario {
    /// `"{project} (HH:MM:SS)"`, the label used when saving a snapshot.
    pub fn default_name(project_name: &str, saved_at: NaiveTime) -> String {
        format!("{project_name} ({})", saved_at.format("%H:%M:%S"))
    }

    pub fn id(&self) -> ScenarioId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &AnalysisInput {
        &self.inputs
    }

    pub fn summary(&self) -> &ScenarioSummary {
        &self.summary
    }

    /// NPV magnitude as shown to users; the sign convention makes raw NPVs negative.
    pub fn adjusted_npv(&self) -> Money {
        self.summary.npv.abs()
    }

    pub fn currency_symbol(&self) -> &str {
        self.inputs.currency.symbol()
    }
}

/// One row of the comparison board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub scenario: String,
    pub total_cost: Money,
    pub total_interest: Money,
    pub npv: Money,
    pub currency_symbol: String,
}

/// Caller-owned, insertion-ordered collection of saved scenarios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBook {
    scenarios: Vec<Scenario>,
}

impl ScenarioBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(
        &mut self,
        name: impl Into<String>,
        inputs: AnalysisInput,
        summary: ScenarioSummary,
    ) -> ScenarioId {
        let id = ScenarioId::generate();
        self.scenarios.push(Scenario {
            id,
            name: name.into(),
            inputs,
            summary,
        });
        id
    }

    /// Snapshot a finished run.
    pub fn save_analysis(
        &mut self,
        name: impl Into<String>,
        inputs: &AnalysisInput,
        output: &AnalysisOutput,
    ) -> ScenarioId {
        self.save(name, inputs.clone(), ScenarioSummary::from(output))
    }

    pub fn get(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Inputs of a saved scenario, ready to be edited and run again.
    pub fn restore_inputs(&self, id: ScenarioId) -> PayPlanResult<AnalysisInput> {
        self.get(id)
            .map(|s| s.inputs.clone())
            .ok_or(PayPlanError::ScenarioNotFound(id))
    }

    pub fn remove(&mut self, id: ScenarioId) -> PayPlanResult<Scenario> {
        let pos = self
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or(PayPlanError::ScenarioNotFound(id))?;
        Ok(self.scenarios.remove(pos))
    }

    pub fn clear(&mut self) {
        self.scenarios.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn comparison(&self) -> Vec<ComparisonRow> {
        self.scenarios
            .iter()
            .map(|s| ComparisonRow {
                scenario: s.name.clone(),
                total_cost: s.summary.total_paid,
                total_interest: s.summary.total_interest,
                npv: s.adjusted_npv(),
                currency_symbol: s.currency_symbol().to_string(),
            })
            .collect()
    }
}
