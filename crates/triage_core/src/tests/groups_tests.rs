use super::*;
use shared::domain::{ArticleStatus, COMBINE_GROUP, DEFAULT_GROUP, IGNORE_GROUP};

fn article(id: &str, status: ArticleStatus) -> Article {
    Article::new(id, status)
}

fn mixed_cluster() -> Cluster {
    Cluster::new(
        "c1",
        "Storm coverage",
        vec![
            article("a1", ArticleStatus::Default),
            article("a2", ArticleStatus::Default),
            article("a3", ArticleStatus::Combined),
            article("a4", ArticleStatus::Ignored),
            article("a5", ArticleStatus::Default),
        ],
    )
}

fn article_ids(groups: &Groups, name: &str) -> Vec<String> {
    groups
        .get(name)
        .unwrap_or_default()
        .iter()
        .map(|article| article.id.to_string())
        .collect()
}

fn id(raw: &str) -> ArticleId {
    ArticleId::from(raw)
}

#[test]
fn construction_partitions_every_article_once() {
    let manager = GroupManager::new(&mixed_cluster());
    let groups = manager.grouping();

    assert_eq!(groups.names(), vec!["default", "combine", "ignore"]);
    assert_eq!(article_ids(&groups, DEFAULT_GROUP), vec!["a1", "a2", "a5"]);
    assert_eq!(article_ids(&groups, COMBINE_GROUP), vec!["a3"]);
    assert_eq!(article_ids(&groups, IGNORE_GROUP), vec!["a4"]);
    assert_eq!(groups.article_count(), 5);
}

#[test]
fn custom_statuses_seed_custom_groups() {
    let cluster = Cluster::new(
        "c2",
        "Finals",
        vec![
            article("a1", ArticleStatus::Custom("sports".into())),
            article("a2", ArticleStatus::Default),
            article("a3", ArticleStatus::Custom("sports".into())),
            article("a4", ArticleStatus::Custom("results".into())),
        ],
    );
    let groups = GroupManager::new(&cluster).grouping();

    assert_eq!(
        groups.names(),
        vec!["default", "combine", "ignore", "sports", "results"]
    );
    assert_eq!(article_ids(&groups, "sports"), vec!["a1", "a3"]);
    assert!(groups.get(COMBINE_GROUP).expect("reserved").is_empty());
}

#[test]
fn empty_cluster_still_has_reserved_groups() {
    let groups = GroupManager::new(&Cluster::new("c3", "Empty", Vec::new())).grouping();
    assert_eq!(groups.names(), vec!["default", "combine", "ignore"]);
    assert_eq!(groups.article_count(), 0);
}

#[test]
fn assign_moves_article_between_groups() {
    let manager = GroupManager::new(&mixed_cluster());

    assert!(manager.assign_article(&id("a1"), COMBINE_GROUP));

    let groups = manager.grouping();
    assert_eq!(article_ids(&groups, DEFAULT_GROUP), vec!["a2", "a5"]);
    assert_eq!(article_ids(&groups, COMBINE_GROUP), vec!["a3", "a1"]);
    assert_eq!(manager.find_article_group_name(&id("a1")), "combine");
    assert_eq!(groups.article_count(), 5);
}

#[test]
fn assign_creates_missing_target_group() {
    let manager = GroupManager::new(&mixed_cluster());

    assert!(manager.assign_article(&id("a4"), "sub-group-1"));

    let groups = manager.grouping();
    assert_eq!(article_ids(&groups, "sub-group-1"), vec!["a4"]);
    assert!(groups.get(IGNORE_GROUP).expect("reserved").is_empty());
    assert_eq!(groups.names().last().map(String::as_str), Some("sub-group-1"));
}

#[test]
fn empty_target_is_a_no_op() {
    let manager = GroupManager::new(&mixed_cluster());
    let before = manager.grouping();
    let mut view = manager.observe_grouping();
    view.borrow_and_update();

    assert!(!manager.assign_article(&id("a1"), ""));

    assert!(Arc::ptr_eq(&before, &manager.grouping()));
    assert!(!view.has_changed().expect("sender alive"));
}

#[test]
fn unknown_article_creates_nothing() {
    let manager = GroupManager::new(&mixed_cluster());
    let before = manager.grouping();

    assert!(!manager.assign_article(&id("unknown-id"), "brand-new"));

    assert_eq!(*manager.grouping(), *before);
    assert!(manager.grouping().get("brand-new").is_none());
}

#[test]
fn assigning_to_current_group_is_a_no_op() {
    let manager = GroupManager::new(&mixed_cluster());

    assert!(!manager.assign_article(&id("a3"), COMBINE_GROUP));
    assert_eq!(article_ids(&manager.grouping(), COMBINE_GROUP), vec!["a3"]);
}

#[test]
fn earlier_snapshots_are_not_mutated() {
    let manager = GroupManager::new(&mixed_cluster());
    let before = manager.grouping();

    manager.assign_article(&id("a2"), IGNORE_GROUP);

    assert_eq!(article_ids(&before, DEFAULT_GROUP), vec!["a1", "a2", "a5"]);
    assert_eq!(article_ids(&manager.grouping(), IGNORE_GROUP), vec!["a4", "a2"]);
}

#[test]
fn unknown_article_reports_default_status() {
    let manager = GroupManager::new(&mixed_cluster());
    let missing = manager.find_article_group_name(&id("missing"));
    assert_eq!(missing, String::from(ArticleStatus::Default));
    assert_eq!(missing, "");
    assert_ne!(missing, manager.find_article_group_name(&id("a1")));
}

#[test]
fn addable_names_exclude_combine_and_ignore() {
    let cluster = Cluster::new(
        "c4",
        "Match report",
        vec![article("a1", ArticleStatus::Custom("sports".into()))],
    );
    let manager = GroupManager::new(&cluster);
    let addable = manager.observe_addable_group_names();

    assert_eq!(*addable.borrow(), vec!["default", "sports"]);
}

#[tokio::test]
async fn addable_names_update_only_when_group_set_changes() {
    let manager = GroupManager::new(&mixed_cluster());
    let mut addable = manager.observe_addable_group_names();
    assert_eq!(*addable.borrow_and_update(), vec!["default"]);

    manager.assign_article(&id("a1"), IGNORE_GROUP);
    assert!(!addable.has_changed().expect("sender alive"));

    manager.assign_article(&id("a2"), "follow-ups");
    addable.changed().await.expect("new group");
    assert_eq!(*addable.borrow_and_update(), vec!["default", "follow-ups"]);

    manager.assign_article(&id("a5"), COMBINE_GROUP);
    assert!(!addable.has_changed().expect("sender alive"));
}

#[tokio::test]
async fn grouping_observers_see_every_reassignment() {
    let manager = GroupManager::new(&mixed_cluster());
    let mut view = manager.observe_grouping();
    assert_eq!(view.borrow_and_update().article_count(), 5);

    manager.assign_article(&id("a1"), COMBINE_GROUP);
    view.changed().await.expect("first move");
    assert_eq!(view.borrow_and_update().group_of(&id("a1")), Some("combine"));

    manager.assign_article(&id("a1"), DEFAULT_GROUP);
    view.changed().await.expect("second move");
    let groups = view.borrow_and_update().clone();
    assert_eq!(article_ids(&groups, DEFAULT_GROUP), vec!["a2", "a5", "a1"]);
}

#[tokio::test]
async fn article_group_name_emits_only_on_change() {
    let manager = GroupManager::new(&mixed_cluster());
    let mut name = manager.observe_article_group_name(&id("a1"));
    assert_eq!(*name.borrow_and_update(), "default");

    manager.assign_article(&id("a2"), IGNORE_GROUP);
    assert!(!name.has_changed().expect("sender alive"));

    manager.assign_article(&id("a1"), "sports");
    name.changed().await.expect("a1 moved");
    assert_eq!(*name.borrow_and_update(), "sports");

    let second = manager.observe_article_group_name(&id("a1"));
    assert_eq!(*second.borrow(), "sports");
}
