//! `max_hops` enforcement for agent→agent call chains.

use genesis_types::AgentAgentRequest;

use crate::error::RpcError;

/// Returns the next request with `hop_count` incremented, or
/// `MaxHopsExceeded` if forwarding would exceed `max_hops`.
pub fn next_hop(request: &AgentAgentRequest, max_hops: u32) -> Result<u32, RpcError> {
    let next = request.hop_count + 1;
    if next > max_hops {
        return Err(RpcError::MaxHopsExceeded);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request_at_hop(hop_count: u32) -> AgentAgentRequest {
        AgentAgentRequest {
            correlation_id: Uuid::new_v4(),
            target_endpoint_id: "agent-b".to_string(),
            conversation_id: None,
            message: "hi".to_string(),
            chain_id: Uuid::new_v4(),
            parent_call_id: Uuid::new_v4(),
            hop_count,
        }
    }

    #[test]
    fn allows_hops_within_bound() {
        let req = request_at_hop(2);
        assert_eq!(next_hop(&req, 5).unwrap(), 3);
    }

    #[test]
    fn rejects_hop_exceeding_bound() {
        let req = request_at_hop(5);
        assert!(matches!(next_hop(&req, 5), Err(RpcError::MaxHopsExceeded)));
    }
}
