use std::path::PathBuf;

use chrono::NaiveDate;
use versus::error::StoreError;
use versus::store::{StatsDb, StatsStore, StatsUpdate};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn update(won: bool, score: u32, max_combo: u32, date: NaiveDate) -> StatsUpdate {
    StatsUpdate { won, score, max_combo, date }
}

fn scratch_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("versus-store-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("stats.json")
}

#[test]
fn short_usernames_are_refused() {
    let mut db = StatsDb::in_memory();
    assert!(matches!(db.create_user("abc", "password1"), Err(StoreError::InvalidCredentials)));
    assert!(db.find_user("abc").is_none());
}

#[test]
fn usernames_are_unique() {
    let mut db = StatsDb::in_memory();
    let id = db.create_user("ryuu", "hadouken1").unwrap();
    assert!(matches!(db.create_user("ryuu", "shoryuken1"), Err(StoreError::UserExists(_))));
    assert_eq!(db.find_user("ryuu").map(|u| u.id), Some(id));
}

#[test]
fn authentication_needs_the_matching_password() {
    let mut db = StatsDb::in_memory();
    let id = db.create_user("ryuu", "hadouken1").unwrap();
    assert_eq!(db.authenticate("ryuu", "hadouken1"), Some(id));
    assert_eq!(db.authenticate("ryuu", "hadouken2"), None);
    assert_eq!(db.authenticate("ken", "hadouken1"), None);
}

#[test]
fn new_users_start_with_empty_stats() {
    let mut db = StatsDb::in_memory();
    let id = db.create_user("ryuu", "hadouken1").unwrap();
    let stats = db.get_stats(id).unwrap();
    assert_eq!(stats.username, "ryuu");
    assert_eq!(stats.games_played, 0);
    assert_eq!(stats.high_score_date, None);
    assert!(matches!(db.get_stats(id + 1), Err(StoreError::UnknownUser(_))));
}

#[test]
fn match_results_accumulate() {
    let mut db = StatsDb::in_memory();
    let id = db.create_user("ryuu", "hadouken1").unwrap();
    db.update_stats(id, &update(true, 40, 3, day(1))).unwrap();
    db.update_stats(id, &update(false, 10, 4, day(2))).unwrap();
    db.update_stats(id, &update(true, 55, 2, day(3))).unwrap();

    let stats = db.get_stats(id).unwrap();
    assert_eq!((stats.wins, stats.losses, stats.games_played), (2, 1, 3));
    assert_eq!(stats.high_score, 55);
    assert_eq!(stats.high_score_date, Some(day(3)));
    assert_eq!(stats.max_combo, 4);
}

#[test]
fn lower_scores_keep_the_old_high_score_date() {
    let mut db = StatsDb::in_memory();
    let id = db.create_user("ryuu", "hadouken1").unwrap();
    db.update_stats(id, &update(true, 40, 0, day(1))).unwrap();
    db.update_stats(id, &update(true, 40, 0, day(2))).unwrap();
    assert_eq!(db.get_stats(id).unwrap().high_score_date, Some(day(1)));
}

#[test]
fn leaderboard_lists_best_scores_first() {
    let mut db = StatsDb::in_memory();
    let ryuu = db.create_user("ryuu", "hadouken1").unwrap();
    let ken = db.create_user("kenm", "shoryuken1").unwrap();
    db.create_user("chun", "kikouken1").unwrap();
    db.update_stats(ryuu, &update(true, 20, 0, day(1))).unwrap();
    db.update_stats(ken, &update(true, 90, 0, day(2))).unwrap();

    let board = db.get_leaderboard();
    let names: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(names, ["kenm", "ryuu", "chun"]);
    assert_eq!(board[0].date, Some(day(2)));
    assert_eq!(board[2].date, None);
}

#[test]
fn password_changes_are_validated() {
    let mut db = StatsDb::in_memory();
    db.create_user("ryuu", "hadouken1").unwrap();
    assert!(matches!(db.update_password("ryuu", "short"), Err(StoreError::InvalidCredentials)));
    assert!(matches!(db.update_password("kenm", "shoryuken1"), Err(StoreError::UnknownUsername(_))));
    db.update_password("ryuu", "tatsumaki1").unwrap();
    assert!(db.authenticate("ryuu", "tatsumaki1").is_some());
}

#[test]
fn file_store_survives_reopening() {
    let path = scratch_file("reopen");
    let id = {
        let mut db = StatsDb::open(&path).unwrap();
        let id = db.create_user("ryuu", "hadouken1").unwrap();
        db.update_stats(id, &update(true, 33, 2, day(4))).unwrap();
        id
    };
    assert!(path.exists());

    let db = StatsDb::open(&path).unwrap();
    assert_eq!(db.path(), Some(path.as_path()));
    assert_eq!(db.authenticate("ryuu", "hadouken1"), Some(id));
    assert_eq!(db.get_stats(id).unwrap().high_score, 33);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn malformed_store_is_an_error() {
    let path = scratch_file("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"{ not json").unwrap();
    assert!(matches!(StatsDb::open(&path), Err(StoreError::Json(_))));
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
