//! Seeding, tree, session and audit log integration tests

use gentree_lib::app::{
    log_add, log_search, session_close, session_open, tree_all, tree_create, tree_find,
    tree_find_by_name, tree_preference, tree_set_preference, tree_titles, user_all_logged_in,
    user_create, LogType, UserCreateReq,
};
use gentree_lib::error::AppError;
use gentree_lib::infra::seed::{seed_database, DEFAULT_TREE_ID, DEFAULT_TREE_NAME, DEFAULT_USER_ID};
use gentree_lib::infra::{init_test_db, DbPool};

fn count(pool: &DbPool, sql: &str) -> i64 {
    let conn = pool.0.lock().unwrap();
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}

// ══════════════════════════════════════════════════════════
//  Seeding
// ══════════════════════════════════════════════════════════

#[test]
fn default_rows_exist_once() {
    let pool = init_test_db();
    {
        let conn = pool.0.lock().unwrap();
        seed_database(&conn).unwrap();
        seed_database(&conn).unwrap();
    }
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM gedcom WHERE gedcom_id = -1"), 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM user WHERE user_id = -1"), 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM gedcom"), 1);

    let tree = tree_find(&pool, DEFAULT_TREE_ID).unwrap().unwrap();
    assert_eq!(tree.name, DEFAULT_TREE_NAME);
    assert_eq!(DEFAULT_USER_ID, -1);
}

#[test]
fn seeding_restores_renamed_defaults() {
    let pool = init_test_db();
    let conn = pool.0.lock().unwrap();
    conn.execute("UPDATE gedcom SET gedcom_name = 'renamed' WHERE gedcom_id = -1", [])
        .unwrap();
    seed_database(&conn).unwrap();
    let name: String = conn
        .query_row("SELECT gedcom_name FROM gedcom WHERE gedcom_id = -1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(name, DEFAULT_TREE_NAME);
}

// ══════════════════════════════════════════════════════════
//  Trees
// ══════════════════════════════════════════════════════════

#[test]
fn listings_skip_the_default_tree() {
    let pool = init_test_db();
    assert!(tree_all(&pool).unwrap().is_empty());
    tree_create(&pool, "zeta", "Zeta family").unwrap();
    tree_create(&pool, "alpha", "").unwrap();
    let names: Vec<String> = tree_all(&pool).unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(
        tree_titles(&pool).unwrap(),
        vec![
            ("alpha".to_string(), "alpha".to_string()),
            ("zeta".to_string(), "Zeta family".to_string()),
        ]
    );
    assert!(tree_find_by_name(&pool, DEFAULT_TREE_NAME).unwrap().is_none());
}

#[test]
fn duplicate_or_blank_names_are_rejected() {
    let pool = init_test_db();
    tree_create(&pool, "demo", "Demo").unwrap();
    assert!(matches!(tree_create(&pool, "demo", "Again").unwrap_err(), AppError::Conflict(_)));
    assert!(matches!(tree_create(&pool, "  ", "x").unwrap_err(), AppError::Validation(_)));
}

#[test]
fn tree_preferences_round_trip() {
    let pool = init_test_db();
    let tree = tree_create(&pool, "demo", "Demo").unwrap();
    assert_eq!(tree_preference(&pool, tree.id, "LANGUAGE", "en-US").unwrap(), "en-US");
    tree_set_preference(&pool, tree.id, "LANGUAGE", "fr").unwrap();
    tree_set_preference(&pool, tree.id, "LANGUAGE", "de").unwrap();
    assert_eq!(tree_preference(&pool, tree.id, "LANGUAGE", "en-US").unwrap(), "de");

    tree_set_preference(&pool, tree.id, "title", "Renamed").unwrap();
    assert_eq!(tree_find(&pool, tree.id).unwrap().unwrap().title, "Renamed");
}

// ══════════════════════════════════════════════════════════
//  Sessions and audit log
// ══════════════════════════════════════════════════════════

#[test]
fn sessions_drive_logged_in_listing() {
    let pool = init_test_db();
    let user = user_create(
        &pool,
        UserCreateReq {
            user_name: "sam".into(),
            real_name: "Sam".into(),
            email: "sam@example.com".into(),
            password: "pw".into(),
        },
    )
    .unwrap();
    session_open(&pool, "s1", user.id, "127.0.0.1").unwrap();
    session_open(&pool, "s2", user.id, "10.0.0.2").unwrap();
    session_open(&pool, "s1", user.id, "10.0.0.3").unwrap();
    assert_eq!(user_all_logged_in(&pool).unwrap().len(), 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM session"), 2);

    assert!(session_close(&pool, "s1").unwrap());
    assert!(!session_close(&pool, "s1").unwrap());
    assert!(session_close(&pool, "s2").unwrap());
    assert!(user_all_logged_in(&pool).unwrap().is_empty());

    assert!(matches!(session_open(&pool, " ", user.id, "").unwrap_err(), AppError::Validation(_)));
}

#[test]
fn audit_entries_are_searchable() {
    let pool = init_test_db();
    let tree = tree_create(&pool, "demo", "Demo").unwrap();
    log_add(&pool, LogType::Auth, "Login failed for sam", "10.0.0.1", None, None).unwrap();
    log_add(&pool, LogType::Config, "Tree demo updated", "", None, Some(tree.id)).unwrap();

    let entries = log_search(&pool, "Login").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].log_type, "auth");
    assert_eq!(entries[0].ip_address, "10.0.0.1");
    assert_eq!(entries[0].user_id, None);

    let entries = log_search(&pool, "demo").unwrap();
    assert_eq!(entries[0].tree_id, Some(tree.id));
    assert_eq!(log_search(&pool, "").unwrap().len(), 2);
}
