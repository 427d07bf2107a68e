//! Moderation and changes log handler tests

use gentree_lib::app::{
    change_create, change_get, location_make, log_search, tree_create, user_create,
    user_set_preference, user_set_tree_preference, ChangeCreateReq, UserCreateReq,
};
use gentree_lib::domain::{preference, ChangeStatus, GedcomRecord, Tree};
use gentree_lib::error::AppError;
use gentree_lib::handlers::pending_changes::{pending_change_accept, pending_change_reject};
use gentree_lib::handlers::pending_changes_log::{
    pending_changes_log_data, pending_changes_log_page, ChangesLogParams, TITLE, VIEW,
};
use gentree_lib::handlers::{RequestContext, ADMINISTRATION_LAYOUT};
use gentree_lib::infra::{init_test_db, ArrayCache, DbPool};

// ──────────────────────── Helper ────────────────────────

fn make_user(pool: &DbPool, name: &str, real_name: &str) -> i64 {
    user_create(
        pool,
        UserCreateReq {
            user_name: name.into(),
            real_name: real_name.into(),
            email: format!("{}@example.com", name),
            password: "pw".into(),
        },
    )
    .unwrap()
    .id
}

struct World {
    pool: DbPool,
    tree: Tree,
    editor: i64,
    moderator: i64,
    manager: i64,
    admin: i64,
}

fn world() -> World {
    let pool = init_test_db();
    let tree = tree_create(&pool, "demo", "Demo tree").unwrap();
    let editor = make_user(&pool, "editor", "Erin Editor");
    let moderator = make_user(&pool, "moderator", "Mo Moderator");
    let manager = make_user(&pool, "manager", "Max Manager");
    let admin = make_user(&pool, "admin", "Ada Admin");
    user_set_tree_preference(&pool, moderator, tree.id, preference::TREE_ROLE, preference::ROLE_MODERATOR).unwrap();
    user_set_tree_preference(&pool, manager, tree.id, preference::TREE_ROLE, preference::ROLE_MANAGER).unwrap();
    user_set_preference(&pool, admin, preference::IS_ADMINISTRATOR, "1").unwrap();
    World {
        pool,
        tree,
        editor,
        moderator,
        manager,
        admin,
    }
}

fn propose(w: &World, xref: &str, new: &str) -> i64 {
    change_create(
        &w.pool,
        ChangeCreateReq {
            tree_id: w.tree.id,
            xref: xref.into(),
            old_gedcom: String::new(),
            new_gedcom: new.into(),
            user_id: w.editor,
        },
    )
    .unwrap()
    .id
}

fn set_change_time(pool: &DbPool, change_id: i64, time: &str) {
    let conn = pool.0.lock().unwrap();
    conn.execute(
        "UPDATE change SET change_time = ?1 WHERE change_id = ?2",
        rusqlite::params![time, change_id],
    )
    .unwrap();
}

fn ctx(user_id: i64) -> RequestContext {
    RequestContext::new(Some(user_id), Some("demo"))
}

// ══════════════════════════════════════════════════════════
//  Accept / reject
// ══════════════════════════════════════════════════════════

#[test]
fn moderator_accepts_and_cache_is_refreshed() {
    let w = world();
    let id = propose(&w, "L1", "0 @L1@ _LOC\n1 NAME Paris");
    let cache = ArrayCache::new();

    let before = location_make(&w.pool, &cache, w.tree.id, "L1", None).unwrap().unwrap();
    assert!(before.is_pending_addition());

    let accepted = pending_change_accept(&w.pool, &cache, &ctx(w.moderator), id).unwrap();
    assert_eq!(accepted.status, ChangeStatus::Accepted);

    let after = location_make(&w.pool, &cache, w.tree.id, "L1", None).unwrap().unwrap();
    assert_eq!(after.pending(), None);
    assert_eq!(after.gedcom(), "0 @L1@ _LOC\n1 NAME Paris");

    let entries = log_search(&w.pool, &format!("Accepted change {}", id)).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_type, "edit");
    assert_eq!(entries[0].user_id, Some(w.moderator));
    assert_eq!(entries[0].tree_id, Some(w.tree.id));
}

#[test]
fn administrator_rejects() {
    let w = world();
    let id = propose(&w, "L2", "0 @L2@ _LOC\n1 NAME Rome");
    let cache = ArrayCache::new();
    let rejected = pending_change_reject(&w.pool, &cache, &ctx(w.admin), id).unwrap();
    assert_eq!(rejected.status, ChangeStatus::Rejected);
    assert!(location_make(&w.pool, &cache, w.tree.id, "L2", None).unwrap().is_none());
    assert_eq!(log_search(&w.pool, "Rejected change").unwrap().len(), 1);
}

#[test]
fn editors_and_visitors_cannot_moderate() {
    let w = world();
    let id = propose(&w, "L3", "0 @L3@ _LOC\n1 NAME Bern");
    let cache = ArrayCache::new();
    let err = pending_change_accept(&w.pool, &cache, &ctx(w.editor), id).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let visitor = RequestContext::new(None, Some("demo"));
    let err = pending_change_reject(&w.pool, &cache, &visitor, id).unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");
    assert_eq!(change_get(&w.pool, id).unwrap().status, ChangeStatus::Pending);
}

#[test]
fn moderator_of_another_tree_is_forbidden() {
    let w = world();
    let other = tree_create(&w.pool, "other", "Other").unwrap();
    let id = change_create(
        &w.pool,
        ChangeCreateReq {
            tree_id: other.id,
            xref: "L1".into(),
            old_gedcom: String::new(),
            new_gedcom: "0 @L1@ _LOC\n1 NAME Oslo".into(),
            user_id: w.editor,
        },
    )
    .unwrap()
    .id;
    let cache = ArrayCache::new();
    let err = pending_change_accept(&w.pool, &cache, &ctx(w.moderator), id).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn unknown_change_is_not_found() {
    let w = world();
    let cache = ArrayCache::new();
    let err = pending_change_accept(&w.pool, &cache, &ctx(w.admin), 4242).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ══════════════════════════════════════════════════════════
//  Changes log page
// ══════════════════════════════════════════════════════════

#[test]
fn page_defaults_with_no_changes() {
    let w = world();
    let cache = ArrayCache::new();
    let page = pending_changes_log_page(&w.pool, &cache, &ctx(w.manager), ChangesLogParams::default()).unwrap();
    assert_eq!(page.layout, ADMINISTRATION_LAYOUT);
    assert_eq!(page.view, VIEW);
    let data = page.data;
    assert_eq!(data.title, TITLE);
    assert_eq!(data.tree.name, "demo");
    // Both ends fall back to today
    assert_eq!(data.earliest, data.latest);
    assert_eq!(data.from, data.earliest);
    assert_eq!(data.to, data.latest);
    assert_eq!(data.status, "");
    assert_eq!(data.xref, "");
    assert_eq!(data.statuses.len(), 4);
    assert_eq!(data.trees, vec![("demo".to_string(), "Demo tree".to_string())]);
}

#[test]
fn page_lists_users_by_real_name() {
    let w = world();
    let cache = ArrayCache::new();
    let data = pending_changes_log_page(&w.pool, &cache, &ctx(w.admin), ChangesLogParams::default())
        .unwrap()
        .data;
    let names: Vec<&str> = data.users.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["", "admin", "editor", "manager", "moderator"]);
}

#[test]
fn page_dates_use_the_user_time_zone() {
    let w = world();
    let first = propose(&w, "L1", "0 @L1@ _LOC\n1 NAME Paris");
    let last = propose(&w, "L2", "0 @L2@ _LOC\n1 NAME Rome");
    set_change_time(&w.pool, first, "2024-01-10 08:00:00");
    set_change_time(&w.pool, last, "2024-03-01 22:30:00");
    user_set_preference(&w.pool, w.manager, preference::TIME_ZONE, "Europe/Moscow").unwrap();

    let cache = ArrayCache::new();
    let data = pending_changes_log_page(&w.pool, &cache, &ctx(w.manager), ChangesLogParams::default())
        .unwrap()
        .data;
    assert_eq!(data.earliest, "2024-01-10");
    assert_eq!(data.latest, "2024-03-02");

    let params = ChangesLogParams {
        from: Some("2024-02-01".into()),
        status: Some("pending".into()),
        username: Some("editor".into()),
        ..Default::default()
    };
    let data = pending_changes_log_page(&w.pool, &cache, &ctx(w.manager), params)
        .unwrap()
        .data;
    assert_eq!(data.from, "2024-02-01");
    assert_eq!(data.to, "2024-03-02");
    assert_eq!(data.status, "pending");
    assert_eq!(data.username, "editor");
}

#[test]
fn page_dates_follow_a_named_zone() {
    let w = world();
    let id = propose(&w, "L1", "0 @L1@ _LOC\n1 NAME Kyoto");
    set_change_time(&w.pool, id, "2024-03-01 20:00:00");
    user_set_preference(&w.pool, w.manager, preference::TIME_ZONE, "Asia/Tokyo").unwrap();

    let cache = ArrayCache::new();
    let data = pending_changes_log_page(&w.pool, &cache, &ctx(w.manager), ChangesLogParams::default())
        .unwrap()
        .data;
    assert_eq!(data.earliest, "2024-03-02");
    assert_eq!(data.latest, "2024-03-02");

    // Unknown zone names read as UTC
    user_set_preference(&w.pool, w.manager, preference::TIME_ZONE, "Nowhere/Special").unwrap();
    let data = pending_changes_log_page(&w.pool, &cache, &ctx(w.manager), ChangesLogParams::default())
        .unwrap()
        .data;
    assert_eq!(data.latest, "2024-03-01");
}

#[test]
fn page_default_range_returns_every_change() {
    let w = world();
    let early = propose(&w, "L1", "0 @L1@ _LOC\n1 NAME Boston");
    let late = propose(&w, "L2", "0 @L2@ _LOC\n1 NAME Albany");
    set_change_time(&w.pool, early, "2024-03-01 05:00:00");
    set_change_time(&w.pool, late, "2024-03-02 02:00:00");
    user_set_preference(&w.pool, w.manager, preference::TIME_ZONE, "America/New_York").unwrap();

    let cache = ArrayCache::new();
    let page = pending_changes_log_page(&w.pool, &cache, &ctx(w.manager), ChangesLogParams::default())
        .unwrap()
        .data;
    assert_eq!((page.from.as_str(), page.to.as_str()), ("2024-03-01", "2024-03-01"));

    let params = ChangesLogParams {
        from: Some(page.from),
        to: Some(page.to),
        ..Default::default()
    };
    let rows = pending_changes_log_data(&w.pool, &cache, &ctx(w.manager), params).unwrap();
    let xrefs: Vec<&str> = rows.iter().map(|r| r.xref.as_str()).collect();
    assert_eq!(xrefs, vec!["L2", "L1"]);

    // The day before in New York holds nothing
    let params = ChangesLogParams {
        from: Some("2024-02-29".into()),
        to: Some("2024-02-29".into()),
        ..Default::default()
    };
    assert!(pending_changes_log_data(&w.pool, &cache, &ctx(w.manager), params).unwrap().is_empty());
}

#[test]
fn page_requires_manager() {
    let w = world();
    let cache = ArrayCache::new();
    for user in [w.editor, w.moderator] {
        let err = pending_changes_log_page(&w.pool, &cache, &ctx(user), ChangesLogParams::default()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
    let visitor = RequestContext::new(None, Some("demo"));
    let err = pending_changes_log_page(&w.pool, &cache, &visitor, ChangesLogParams::default()).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn page_needs_a_known_tree() {
    let w = world();
    let cache = ArrayCache::new();
    let no_tree = RequestContext::new(Some(w.admin), None);
    let err = pending_changes_log_page(&w.pool, &cache, &no_tree, ChangesLogParams::default()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let unknown = RequestContext::new(Some(w.admin), Some("missing"));
    let err = pending_changes_log_page(&w.pool, &cache, &unknown, ChangesLogParams::default()).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    // The placeholder tree is never addressable
    let default_tree = RequestContext::new(Some(w.admin), Some("DEFAULT_TREE"));
    let err = pending_changes_log_page(&w.pool, &cache, &default_tree, ChangesLogParams::default()).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn data_is_limited_to_the_current_tree() {
    let w = world();
    propose(&w, "L1", "0 @L1@ _LOC\n1 NAME Paris");
    let other = tree_create(&w.pool, "other", "Other").unwrap();
    change_create(
        &w.pool,
        ChangeCreateReq {
            tree_id: other.id,
            xref: "L1".into(),
            old_gedcom: String::new(),
            new_gedcom: "0 @L1@ _LOC\n1 NAME Oslo".into(),
            user_id: w.editor,
        },
    )
    .unwrap();

    let cache = ArrayCache::new();
    let rows = pending_changes_log_data(&w.pool, &cache, &ctx(w.manager), ChangesLogParams::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tree_name, "demo");

    let params = ChangesLogParams {
        newged: Some("Oslo".into()),
        ..Default::default()
    };
    assert!(pending_changes_log_data(&w.pool, &cache, &ctx(w.manager), params).unwrap().is_empty());
}
