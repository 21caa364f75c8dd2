//! # Bootstrap Flows
//!
//! `join_as_authority` / `join_as_replica` over the in-memory router.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{config, join};
    use autopub_bus::{BusError, InMemoryRouter};
    use autopub_sync::{JoinState, SyncConfigBuilder, SyncError, SyncMap, SyncSequence};
    use autopub_types::Topic;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_snapshot_procedure_returns_current_state() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);
        let (_peer_link, peer_session) = join(&router);

        let authority = SyncMap::with_entries(
            [("a".to_string(), json!(1)), ("b".to_string(), json!([1, 2]))],
            config("scores"),
        )
        .unwrap();
        authority.join_as_authority(&a_session).await.unwrap();
        authority.set("c", &json!({"nested": true})).await.unwrap();

        let expected = authority.to_snapshot().unwrap();
        let served = peer_session
            .call(&Topic::new("com.scores.snapshot").unwrap(), vec![])
            .await
            .unwrap();

        assert_eq!(served, Value::String(expected));
    }

    #[tokio::test]
    async fn test_replica_starts_from_authority_state() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);
        let (_b_link, b_session) = join(&router);

        let authority =
            SyncSequence::with_items(vec![json!(3), json!(1), json!(2)], config("list")).unwrap();
        authority.join_as_authority(&a_session).await.unwrap();

        let replica = SyncSequence::new(config("list")).unwrap();
        replica.join_as_replica(&b_session).await.unwrap();

        assert_eq!(replica.state(), JoinState::Attached);
        assert_eq!(replica.to_vec(), vec![json!(3), json!(1), json!(2)]);
        assert_eq!(replica.subscribers(), vec![b_session.peer_id()]);
    }

    #[tokio::test]
    async fn test_second_authority_conflicts() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);
        let (_b_link, b_session) = join(&router);

        let first = SyncMap::new(config("scores")).unwrap();
        first.join_as_authority(&a_session).await.unwrap();

        let second = SyncMap::new(config("scores")).unwrap();
        let err = second.join_as_authority(&b_session).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::Bus(BusError::ProcedureAlreadyRegistered { .. })
        ));
        assert_eq!(second.state(), JoinState::Failed);
        // A failed instance cannot be joined again
        assert!(matches!(
            second.join_as_replica(&b_session).await,
            Err(SyncError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_replica_without_authority_fails() {
        let router = InMemoryRouter::new();
        let (_b_link, b_session) = join(&router);

        let replica = SyncMap::new(config("scores")).unwrap();
        let err = replica.join_as_replica(&b_session).await.unwrap_err();

        assert!(matches!(err, SyncError::Bus(BusError::NoSuchProcedure { .. })));
        assert!(!replica.is_connected());
    }

    #[tokio::test]
    async fn test_closed_session_fails_join() {
        let router = InMemoryRouter::new();
        let (a_link, a_session) = join(&router);
        a_link.close();

        let authority = SyncMap::new(config("scores")).unwrap();
        let err = authority.join_as_authority(&a_session).await.unwrap_err();
        assert!(matches!(err, SyncError::Bus(BusError::TransportLost)));
    }

    #[tokio::test]
    async fn test_topic_fixed_after_join() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);

        let authority = SyncMap::new(config("scores")).unwrap();
        authority.set_base_uri("org.example").unwrap();
        authority.join_as_authority(&a_session).await.unwrap();

        assert_eq!(authority.topic().as_str(), "org.example.scores");
        assert!(matches!(
            authority.set_base_uri("net.other"),
            Err(SyncError::InvalidState {
                state: JoinState::Attached,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_custom_snapshot_method() {
        let router = InMemoryRouter::new();
        let (_a_link, a_session) = join(&router);
        let (_b_link, b_session) = join(&router);
        let config = SyncConfigBuilder::new()
            .base_uri("com.example")
            .name("scores")
            .snapshot_method("as_json")
            .build()
            .unwrap();

        let authority = SyncMap::new(config.clone()).unwrap();
        authority.set("k", "v").await.unwrap();
        authority.join_as_authority(&a_session).await.unwrap();

        let replica = SyncMap::new(config).unwrap();
        replica.join_as_replica(&b_session).await.unwrap();

        assert_eq!(replica.get("k"), Some(json!("v")));
        assert_eq!(router.procedure_count(), 1);
    }
}
