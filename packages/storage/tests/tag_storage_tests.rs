// ABOUTME: Integration tests for tag storage operations
// ABOUTME: Tests CRUD, case-insensitive uniqueness and detaching deleted tags from tasks

use tasklane_core::{TagCreateInput, TagUpdateInput, TaskCreateInput};
use tasklane_storage::{Database, StorageError};

fn tag_input(name: &str) -> TagCreateInput {
    TagCreateInput {
        name: name.to_string(),
        color: None,
    }
}

#[tokio::test]
async fn test_create_and_list_sorted_by_name() {
    let db = Database::open_in_memory().await.unwrap();

    let work = db
        .tags
        .create(
            TagCreateInput {
                name: "Work".to_string(),
                color: Some("#ff0000".to_string()),
            },
            None,
        )
        .await
        .unwrap();
    db.tags.create(tag_input("errands"), None).await.unwrap();
    db.tags.create(tag_input("Books"), None).await.unwrap();

    assert!(work.id.starts_with("tag-"));
    assert_eq!(work.color.as_deref(), Some("#ff0000"));

    let names: Vec<String> = db
        .tags
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Books", "errands", "Work"]);
}

#[tokio::test]
async fn test_duplicate_names_are_rejected_case_insensitively() {
    let db = Database::open_in_memory().await.unwrap();
    db.tags.create(tag_input("Home"), Some("u1")).await.unwrap();

    let err = db.tags.create(tag_input("home"), Some("u1")).await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateName(name) if name == "home"));

    // Another owner may reuse the name
    assert!(db.tags.create(tag_input("HOME"), Some("u2")).await.is_ok());

    let found = db.tags.get_by_name("hOmE", Some("u1")).await.unwrap();
    assert_eq!(found.map(|t| t.name), Some("Home".to_string()));
}

#[tokio::test]
async fn test_update_renames_and_guards_duplicates() {
    let db = Database::open_in_memory().await.unwrap();
    let a = db.tags.create(tag_input("alpha"), None).await.unwrap();
    db.tags.create(tag_input("beta"), None).await.unwrap();

    let renamed = db
        .tags
        .update(
            &a.id,
            TagUpdateInput {
                name: Some("Alpha".to_string()),
                color: Some(Some("#abc".to_string())),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Alpha");
    assert_eq!(renamed.color.as_deref(), Some("#abc"));

    let clash = db
        .tags
        .update(
            &a.id,
            TagUpdateInput {
                name: Some("BETA".to_string()),
                color: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(clash, StorageError::DuplicateName(_)));

    let missing = db
        .tags
        .update("tag-missing", TagUpdateInput::default())
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn test_delete_detaches_tag_from_every_task() {
    let db = Database::open_in_memory().await.unwrap();
    let tag = db.tags.create(tag_input("shared"), None).await.unwrap();
    let keep = db.tags.create(tag_input("keep"), None).await.unwrap();

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let task = db
            .tasks
            .create(
                TaskCreateInput {
                    tag_ids: vec![tag.id.clone(), keep.id.clone()],
                    ..TaskCreateInput::new(title)
                },
                None,
            )
            .await
            .unwrap();
        ids.push((task.id, task.updated_at));
    }
    let untagged = db.tasks.create(TaskCreateInput::new("plain"), None).await.unwrap();

    let detached = db.tags.delete(&tag.id).await.unwrap();
    assert_eq!(detached, 3);

    for (id, updated_at) in &ids {
        let task = db.tasks.get(id).await.unwrap().unwrap();
        assert_eq!(task.tag_ids, vec![keep.id.clone()]);
        assert_eq!(&task.updated_at, updated_at);
    }
    assert!(db.tasks.get(&untagged.id).await.unwrap().is_some());
    assert!(db.tags.get(&tag.id).await.unwrap().is_none());
    assert!(db.tasks.list_by_tags(&[tag.id.clone()]).await.unwrap().is_empty());
}
