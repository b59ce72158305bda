//! Integration tests for [`storage::ProfileRepository`].
//!
//! Covers lazy row creation through the pending category, metric upserts, and that the two
//! kinds of writes never clobber each other.

use storage::{ProfileMetrics, ProfileRepository, ProfileStore};

async fn repo() -> ProfileRepository {
    ProfileRepository::new("sqlite::memory:")
        .await
        .expect("Failed to create repository")
}

/// **Test: Unknown user has no profile and no pending category.**
#[tokio::test]
async fn test_unknown_user_is_idle() {
    let repo = repo().await;

    assert!(repo.find_profile("nobody").await.unwrap().is_none());
    assert!(repo.pending_category("nobody").await.unwrap().is_none());
}

/// **Test: Setting a pending category creates the row lazily with null metrics.**
///
/// **Setup:** Empty in-memory DB.
/// **Action:** `set_pending_category("u1", Some("睡眠"))`.
/// **Expected:** Row exists, metrics are `None`, pending is "睡眠"; clearing returns to `None`.
#[tokio::test]
async fn test_pending_category_lazily_creates_row_and_clears() {
    let repo = repo().await;

    repo.set_pending_category("u1", Some("睡眠")).await.unwrap();

    let profile = repo.find_profile("u1").await.unwrap().expect("row created");
    assert_eq!(profile.current_state.as_deref(), Some("睡眠"));
    assert!(profile.age.is_none());
    assert!(profile.height.is_none());
    assert_eq!(repo.pending_category("u1").await.unwrap().as_deref(), Some("睡眠"));

    repo.set_pending_category("u1", None).await.unwrap();
    assert!(repo.pending_category("u1").await.unwrap().is_none());
}

/// **Test: Metric upsert keeps the pending category and overwrites previous metrics.**
#[tokio::test]
async fn test_upsert_metrics_preserves_pending_category() {
    let repo = repo().await;

    repo.set_pending_category("u1", Some("飲食")).await.unwrap();
    repo.upsert_metrics(
        "u1",
        &ProfileMetrics {
            age: Some(25),
            height: Some(165.0),
            weight: Some(50.0),
            gender: Some("女".to_string()),
        },
    )
    .await
    .unwrap();
    repo.upsert_metrics(
        "u1",
        &ProfileMetrics {
            age: Some(26),
            height: Some(165.0),
            weight: Some(52.5),
            gender: Some("女".to_string()),
        },
    )
    .await
    .unwrap();

    let profile = repo.find_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.age, Some(26));
    assert_eq!(profile.weight, Some(52.5));
    assert_eq!(profile.current_state.as_deref(), Some("飲食"));
    assert!(profile.updated_at.is_some());
}
