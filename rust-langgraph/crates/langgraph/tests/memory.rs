//! Tests for memory: RunnableConfig, Checkpoint, MemorySaver.

use std::collections::HashMap;

use langgraph::memory::{
    Checkpoint, CheckpointError, CheckpointMetadata, CheckpointSource, Checkpointer, MemorySaver,
    RunnableConfig,
};

#[derive(Debug, Clone, Default)]
struct TestState {
    value: String,
}

fn checkpoint(id: &str, value: &str, step: u64) -> Checkpoint<TestState> {
    Checkpoint {
        id: id.into(),
        ts: "123".into(),
        channel_values: TestState {
            value: value.into(),
        },
        channel_versions: HashMap::new(),
        metadata: CheckpointMetadata {
            source: CheckpointSource::Update,
            step,
            created_at: None,
        },
    }
}

#[tokio::test]
async fn memory_saver_put_and_get_tuple() {
    let saver: MemorySaver<TestState> = MemorySaver::new();
    let config = RunnableConfig::for_thread("t1");
    let id = saver.put(&config, &checkpoint("c1", "hello", 0)).await.unwrap();
    assert_eq!(id, "c1");

    let (cp, meta) = saver.get_tuple(&config).await.unwrap().unwrap();
    assert_eq!(cp.id, "c1");
    assert_eq!(cp.channel_values.value, "hello");
    assert_eq!(meta.source, CheckpointSource::Update);
}

#[tokio::test]
async fn memory_saver_returns_latest_or_selected_checkpoint() {
    let saver: MemorySaver<TestState> = MemorySaver::new();
    let config = RunnableConfig::for_thread("t1");
    saver.put(&config, &checkpoint("c1", "first", 0)).await.unwrap();
    saver.put(&config, &checkpoint("c2", "second", 1)).await.unwrap();

    let (latest, _) = saver.get_tuple(&config).await.unwrap().unwrap();
    assert_eq!(latest.channel_values.value, "second");

    let pinned = RunnableConfig {
        checkpoint_id: Some("c1".into()),
        ..config.clone()
    };
    let (old, _) = saver.get_tuple(&pinned).await.unwrap().unwrap();
    assert_eq!(old.channel_values.value, "first");

    let missing = RunnableConfig {
        checkpoint_id: Some("nope".into()),
        ..config
    };
    assert!(matches!(
        saver.get_tuple(&missing).await,
        Err(CheckpointError::NotFound(_))
    ));
}

#[tokio::test]
async fn memory_saver_isolates_threads() {
    let saver: MemorySaver<TestState> = MemorySaver::new();
    let a = RunnableConfig::for_thread("a");
    let b = RunnableConfig::for_thread("b");
    saver.put(&a, &checkpoint("ca", "A", 0)).await.unwrap();

    assert!(saver.get_tuple(&b).await.unwrap().is_none());
    assert!(saver.list(&b, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_saver_list_newest_first_with_limit() {
    let saver: MemorySaver<TestState> = MemorySaver::new();
    let config = RunnableConfig::for_thread("t3");
    for i in 0..3 {
        saver
            .put(&config, &checkpoint(&format!("c{i}"), "v", i))
            .await
            .unwrap();
    }
    let list = saver.list(&config, Some(2)).await.unwrap();
    let ids: Vec<_> = list.iter().map(|i| i.checkpoint_id.as_str()).collect();
    assert_eq!(ids, vec!["c2", "c1"]);
}

#[tokio::test]
async fn memory_saver_requires_thread_id() {
    let saver: MemorySaver<TestState> = MemorySaver::new();
    let err = saver
        .put(&RunnableConfig::default(), &checkpoint("c", "v", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckpointError::ThreadIdRequired));
}

#[test]
fn checkpoint_from_state_has_unique_ids() {
    let a = Checkpoint::from_state(TestState::default(), CheckpointSource::Loop, 1);
    let b = Checkpoint::from_state(TestState::default(), CheckpointSource::Loop, 1);
    assert_ne!(a.id, b.id);
    assert!(!a.ts.is_empty());
    assert_eq!(a.metadata.step, 1);
    assert!(a.channel_versions.is_empty());
}

#[tokio::test]
async fn memory_saver_keeps_only_the_newest_checkpoints_when_capped() {
    let saver: MemorySaver<TestState> = MemorySaver::new().with_max_checkpoints(2);
    let config = RunnableConfig::for_thread("t1");
    for (i, id) in ["c1", "c2", "c3"].iter().enumerate() {
        saver.put(&config, &checkpoint(id, id, i as u64)).await.unwrap();
    }

    let ids: Vec<String> = saver
        .list(&config, None)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.checkpoint_id)
        .collect();
    assert_eq!(ids, ["c3", "c2"]);

    let (latest, _) = saver.get_tuple(&config).await.unwrap().unwrap();
    assert_eq!(latest.channel_values.value, "c3");

    let evicted = RunnableConfig {
        checkpoint_id: Some("c1".into()),
        ..config
    };
    assert!(matches!(
        saver.get_tuple(&evicted).await,
        Err(CheckpointError::NotFound(id)) if id == "c1"
    ));
}
