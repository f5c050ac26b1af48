//! RPC Layer: three correlated request/reply channels
//! (Interface↔Agent, Agent↔Agent, Agent→Function) layered on
//! `genesis-transport`, each with a client-side pending-call table,
//! timeout/cancellation, and instance targeting via content-filtered
//! readers.

mod channel;
mod client;
mod error;
mod hop;
mod server;
mod wait;

pub use channel::{
    AgentAgentChannel, FunctionChannel, InterfaceAgentChannel, AGENT_AGENT_REPLY_TOPIC,
    AGENT_AGENT_REQUEST_TOPIC, FUNCTION_REPLY_TOPIC, FUNCTION_REQUEST_TOPIC,
    INTERFACE_AGENT_REPLY_TOPIC, INTERFACE_AGENT_REQUEST_TOPIC,
};
pub use client::RpcClient;
pub use error::RpcError;
pub use hop::next_hop;
pub use server::RpcServer;
pub use wait::wait_for_service;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use genesis_transport::create_participant;
    use genesis_types::rpc::status;
    use genesis_types::{FunctionReply, FunctionRequest, Role};

    use super::*;

    #[tokio::test]
    async fn round_trip_reply_reaches_matching_caller() {
        let client_participant = create_participant(200, "caller", Role::Agent).unwrap();
        let server_participant = create_participant(200, "calc", Role::Service).unwrap();

        let client = FunctionChannel::client(&client_participant).unwrap();
        let mut server = FunctionChannel::server(&server_participant, "calc-1").unwrap();

        let serve = tokio::spawn(async move {
            let request = server.recv().await.unwrap();
            let reply = FunctionReply {
                correlation_id: request.correlation_id,
                status: status::OK,
                result_json: Some("3".to_string()),
                error_message: None,
            };
            server.reply(&reply).unwrap();
        });

        let correlation_id = uuid::Uuid::new_v4();
        let request = FunctionRequest {
            correlation_id,
            target_endpoint_id: "calc-1".to_string(),
            function_name: "add".to_string(),
            arguments_json: r#"{"a":1,"b":2}"#.to_string(),
        };
        let reply = client
            .call("calc-1", correlation_id, &request, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply.result_json.as_deref(), Some("3"));
        serve.await.unwrap();
    }

    #[tokio::test]
    async fn unanswered_call_times_out_and_late_reply_is_discarded() {
        let client_participant = create_participant(201, "caller", Role::Agent).unwrap();
        let server_participant = create_participant(201, "calc", Role::Service).unwrap();

        let client = FunctionChannel::client(&client_participant).unwrap();
        let mut server = FunctionChannel::server(&server_participant, "calc-1").unwrap();

        let correlation_id = uuid::Uuid::new_v4();
        let request = FunctionRequest {
            correlation_id,
            target_endpoint_id: "calc-1".to_string(),
            function_name: "add".to_string(),
            arguments_json: "{}".to_string(),
        };

        let result = client
            .call("calc-1", correlation_id, &request, Duration::from_millis(30))
            .await;
        assert!(matches!(result, Err(RpcError::RpcTimeout)));

        // Server replies after the caller already gave up.
        let received = server.recv().await.unwrap();
        server
            .reply(&FunctionReply {
                correlation_id: received.correlation_id,
                status: status::OK,
                result_json: Some("late".to_string()),
                error_message: None,
            })
                .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(client.late_reply_count.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn instance_targeted_request_is_invisible_to_other_instances() {
        let client_participant = create_participant(202, "caller", Role::Agent).unwrap();
        let calc_a = create_participant(202, "calc-a", Role::Service).unwrap();
        let calc_b = create_participant(202, "calc-b", Role::Service).unwrap();

        let client = FunctionChannel::client(&client_participant).unwrap();
        let mut server_a = FunctionChannel::server(&calc_a, "calc-a").unwrap();
        let mut server_b = FunctionChannel::server(&calc_b, "calc-b").unwrap();

        let correlation_id = uuid::Uuid::new_v4();
        let request = FunctionRequest {
            correlation_id,
            target_endpoint_id: "calc-b".to_string(),
            function_name: "add".to_string(),
            arguments_json: "{}".to_string(),
        };
        // Fire the request without waiting for a reply; nothing answers it
        // in this test, so the call would eventually time out on its own.
        let call = tokio::spawn(async move {
            let _ = client
                .call("calc-b", correlation_id, &request, Duration::from_secs(5))
                .await;
        });

        let got = tokio::time::timeout(Duration::from_millis(100), server_b.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.correlation_id, correlation_id);

        let nothing = tokio::time::timeout(Duration::from_millis(50), server_a.recv()).await;
        assert!(nothing.is_err(), "calc-a must not observe calc-b's request");
        call.abort();
    }

    #[tokio::test]
    async fn broadcast_request_is_claimed_by_exactly_one_of_several_instances() {
        let client_participant = create_participant(203, "caller", Role::Agent).unwrap();
        let calc_a = create_participant(203, "calc-a", Role::Service).unwrap();
        let calc_b = create_participant(203, "calc-b", Role::Service).unwrap();
        let calc_c = create_participant(203, "calc-c", Role::Service).unwrap();

        let client = FunctionChannel::client(&client_participant).unwrap();
        let mut server_a = FunctionChannel::server(&calc_a, "calc-a").unwrap();
        let mut server_b = FunctionChannel::server(&calc_b, "calc-b").unwrap();
        let mut server_c = FunctionChannel::server(&calc_c, "calc-c").unwrap();

        let correlation_id = uuid::Uuid::new_v4();
        let request = FunctionRequest {
            correlation_id,
            target_endpoint_id: String::new(),
            function_name: "add".to_string(),
            arguments_json: "{}".to_string(),
        };

        let call = tokio::spawn(async move {
            let _ = client
                .call("", correlation_id, &request, Duration::from_secs(5))
                .await;
        });

        let window = Duration::from_millis(100);
        let a = tokio::time::timeout(window, server_a.recv()).await;
        let b = tokio::time::timeout(window, server_b.recv()).await;
        let c = tokio::time::timeout(window, server_c.recv()).await;
        let claimers = [a, b, c].into_iter().filter(|r| r.is_ok()).count();
        assert_eq!(claimers, 1, "exactly one instance must claim a broadcast request");
        call.abort();
    }
}
