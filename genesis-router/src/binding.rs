//! Builds the deterministic tool binding map `B: name -> {kind, target, schema}`
//! from the current `(F, A, L)` triple.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use genesis_types::{AgentCapability, FunctionCapability, ToolBinding, ToolSchema, ToolTarget};
use sha2::{Digest, Sha256};

use crate::local::LocalTool;

const MESSAGE_SCHEMA: &str = r#"{"type":"object","properties":{"message":{"type":"string"}},"required":["message"]}"#;

/// Builds `B` from the current Function/Agent capability snapshots and the
/// agent's own registered local tools. Deterministic given `(F, A, L)`.
pub fn build_bindings(
    functions: &[FunctionCapability],
    agents: &[AgentCapability],
    locals: &[Arc<dyn LocalTool>],
) -> HashMap<String, ToolBinding> {
    let mut bindings = HashMap::new();
    let mut used = HashSet::new();

    let mut functions = functions.to_vec();
    functions.sort_by(|a, b| a.function_id.cmp(&b.function_id));
    for f in &functions {
        let candidates = vec![f.name.clone()];
        let name = claim_name(&candidates, &mut used, &f.function_id);
        let schema = ToolSchema {
            name: name.clone(),
            description: f.description.clone(),
            parameters: f.parameter_schema.clone(),
        };
        let target = ToolTarget::Function {
            function_id: f.function_id.clone(),
            provider_service_id: f.provider_service_id,
            service_endpoint: f.service_endpoint.clone(),
        };
        bindings.insert(name.clone(), ToolBinding { name, target, schema });
    }

    let mut agents = agents.to_vec();
    agents.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
    for a in &agents {
        let candidates = agent_candidates(a);
        let name = claim_name(&candidates, &mut used, &a.agent_id.to_string());
        let description = if a.specializations.is_empty() {
            format!("Delegate to agent {}", a.display_name)
        } else {
            format!("Specialist for: {}", a.specializations.join(", "))
        };
        let schema = ToolSchema {
            name: name.clone(),
            description,
            parameters: serde_json::from_str(MESSAGE_SCHEMA).unwrap(),
        };
        let target = ToolTarget::Agent {
            agent_id: a.agent_id,
            service_endpoint: a.service_endpoint.clone(),
        };
        bindings.insert(name.clone(), ToolBinding { name, target, schema });
    }

    for local in locals {
        let candidates = vec![local.name().to_string()];
        let name = claim_name(&candidates, &mut used, local.name());
        let mut schema = local.schema();
        schema.name = name.clone();
        bindings.insert(
            name.clone(),
            ToolBinding {
                name,
                target: ToolTarget::Local { tool_name: local.name().to_string() },
                schema,
            },
        );
    }

    bindings
}

fn agent_candidates(agent: &AgentCapability) -> Vec<String> {
    let mut candidates: Vec<String> = agent
        .specializations
        .iter()
        .map(|s| format!("get_{}_info", sanitize(s)))
        .collect();
    candidates.push(format!("use_{}", sanitize(&agent.service_endpoint)));
    candidates.push(format!("ask_{}", sanitize(&agent.display_name)));
    candidates
}

fn sanitize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Claims the first candidate not already in `used`; if every candidate
/// conflicts, appends a short stable hash suffix derived from `seed`.
fn claim_name(candidates: &[String], used: &mut HashSet<String>, seed: &str) -> String {
    for candidate in candidates {
        if !used.contains(candidate) {
            used.insert(candidate.clone());
            return candidate.clone();
        }
    }
    let base = candidates.first().cloned().unwrap_or_default();
    let mut name = format!("{base}_{}", stable_suffix(seed));
    while used.contains(&name) {
        name = format!("{name}_{}", stable_suffix(&name));
    }
    used.insert(name.clone());
    name
}

fn stable_suffix(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    digest[..3].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_types::AgentKind;
    use uuid::Uuid;

    fn function(id: &str, name: &str) -> FunctionCapability {
        FunctionCapability {
            function_id: id.to_string(),
            name: name.to_string(),
            description: "desc".to_string(),
            parameter_schema: serde_json::json!({"type": "object"}),
            provider_service_id: Uuid::new_v4(),
            service_endpoint: format!("svc-{id}"),
        }
    }

    #[test]
    fn colliding_function_names_fall_back_to_hash_suffix() {
        let f1 = function("fn-1", "add");
        let f2 = function("fn-2", "add");
        let bindings = build_bindings(&[f1, f2], &[], &[]);
        assert_eq!(bindings.len(), 2);
        assert!(bindings.contains_key("add"));
        let other = bindings.keys().find(|k| *k != "add").unwrap();
        assert!(other.starts_with("add_"));
    }

    #[test]
    fn agent_candidate_list_is_tried_in_order() {
        let agent = AgentCapability {
            agent_id: Uuid::new_v4(),
            service_endpoint: "weather-svc".to_string(),
            display_name: "Weatherbot".to_string(),
            agent_type: AgentKind::Specialist,
            specializations: vec!["weather".to_string()],
            capability_tags: vec![],
            classification_tags: vec![],
            default_capable: false,
            model_info: None,
            performance_metrics: None,
        };
        let bindings = build_bindings(&[], &[agent], &[]);
        assert!(bindings.contains_key("get_weather_info"));
    }

    #[test]
    fn binding_is_deterministic_given_same_inputs() {
        let f = function("fn-1", "add");
        let a = AgentCapability {
            agent_id: Uuid::new_v4(),
            service_endpoint: "weather-svc".to_string(),
            display_name: "Weatherbot".to_string(),
            agent_type: AgentKind::Specialist,
            specializations: vec![],
            capability_tags: vec![],
            classification_tags: vec![],
            default_capable: false,
            model_info: None,
            performance_metrics: None,
        };
        let b1 = build_bindings(&[f.clone()], &[a.clone()], &[]);
        let b2 = build_bindings(&[f], &[a], &[]);
        let mut names1: Vec<_> = b1.keys().cloned().collect();
        let mut names2: Vec<_> = b2.keys().cloned().collect();
        names1.sort();
        names2.sort();
        assert_eq!(names1, names2);
    }
}
