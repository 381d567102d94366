//! Constrained-instruction template for the reasoning service
//!
//! The instruction enumerates exactly the supplied facts and the grounding
//! rules the validator later enforces. Keeping both sides of the contract in
//! one place means a rule added here gets a matching check in
//! `validator.rs`.

use crate::facts::FactPackage;
use equirank_core::{Error, Result};
use minijinja::Environment;
use serde_json::json;

const INSTRUCTION_TEMPLATE: &str = r#"You are assessing a single trading catalyst for {{ instrument }}.

You are given a closed fact package. These are the ONLY facts that exist for
this task:
{% for fact in facts %}- {{ fact.field }}: {{ fact.value }}
{% endfor %}
Rules:
1. Use only the facts above. Do not bring in outside knowledge about the
   company, its sector, or market history.
2. Every number in your reasoning must come from a fact you cite.
3. List each fact you rely on in cited_facts, with its exact value.
4. If the facts are insufficient to judge the catalyst, say so with a
   neutral sentiment and low certainty instead of guessing.

Respond with a single JSON object:
{"score": 0-100, "sentiment": "bullish"|"bearish"|"neutral",
 "catalysts": [..], "risks": [..], "certainty": 0-100,
 "recommendation": "BUY"|"SELL"|"HOLD",
 "cited_facts": [{"field": .., "value": ..}], "reasoning": ".."}
"#;

/// Render the constrained instruction for a fact package
pub fn instruction_for(instrument_id: &str, facts: &FactPackage) -> Result<String> {
    let fact_list: Vec<_> = facts
        .fields()
        .map(|(field, value)| json!({ "field": field, "value": value }))
        .collect();

    let env = Environment::new();
    env.render_str(
        INSTRUCTION_TEMPLATE,
        json!({ "instrument": instrument_id, "facts": fact_list }),
    )
    .map_err(|e| Error::TemplateError(e.to_string()))
}
