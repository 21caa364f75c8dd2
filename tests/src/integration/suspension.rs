//! # Scoped Suspension and Failed Mutations

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{config, recording};
    use autopub_sync::{SyncError, SyncSequence};
    use serde_json::json;

    #[tokio::test]
    async fn test_nested_suspension_restores_prior_state() {
        let list = SyncSequence::new(config("list")).unwrap();
        let (link, session) = recording();
        list.subscribe(&session);

        let outer = list.block_propagation();
        {
            let inner = list.block_propagation();
            assert!(!inner.prior());
            list.push("quiet").await.unwrap();
        }
        // Leaving the inner scope must not reopen the gate
        assert!(!list.is_propagating());
        list.push("still quiet").await.unwrap();
        drop(outer);

        assert!(list.is_propagating());
        list.push("loud").await.unwrap();
        assert_eq!(link.publish_count(), 1);
        assert_eq!(list.len(), 3);
    }

    #[tokio::test]
    async fn test_out_of_range_leaves_everything_untouched() {
        let list =
            SyncSequence::with_items(vec![json!(1), json!(2), json!(3)], config("list")).unwrap();
        let (link, session) = recording();
        list.subscribe(&session);

        assert!(matches!(
            list.set_at(5, "x").await,
            Err(SyncError::IndexOutOfRange { index: 5, len: 3 })
        ));
        assert!(matches!(
            list.delete_at(5).await,
            Err(SyncError::IndexOutOfRange { index: 5, len: 3 })
        ));

        assert_eq!(list.to_vec(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(list.subscribers(), vec![session.peer_id()]);
        assert_eq!(link.publish_count(), 0);
    }

    #[test]
    fn test_with_suspended_runs_closure_gate_closed() {
        let list = SyncSequence::new(config("list")).unwrap();
        let observed = list.with_suspended(|| list.is_propagating());
        assert!(!observed);
        assert!(list.is_propagating());
    }
}
