mod common;

use std::fs;

use chrono::NaiveDate;
use claude_switch::backup::BackupManager;
use claude_switch::settings::SettingsStore;
use claude_switch::SwitchError;

use common::{read_settings_bytes, temp_paths, write_settings};

fn manager(paths: &claude_switch::settings::SwitchPaths) -> BackupManager {
    BackupManager::new(paths.backup_dir.clone(), SettingsStore::new(paths))
}

#[test]
fn backup_without_settings_writes_empty_document() {
    let (_dir, paths) = temp_paths();
    let backups = manager(&paths);

    let path = backups.create_backup().unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.trim(), "{}");
}

#[test]
fn restore_reproduces_backed_up_bytes() {
    let (_dir, paths) = temp_paths();
    let original = "{\n  \"theme\": \"dark\",\n  \"env\": {\"FOO\": \"1\"}\n}\n";
    write_settings(&paths, original);
    let backups = manager(&paths);

    let backup = backups.create_backup().unwrap();
    write_settings(&paths, r#"{"theme": "light"}"#);

    backups.restore_backup(&backup).unwrap();
    assert_eq!(read_settings_bytes(&paths), original.as_bytes());

    // Restoring again changes nothing.
    backups.restore_backup(&backup).unwrap();
    assert_eq!(read_settings_bytes(&paths), original.as_bytes());
}

#[test]
fn restore_missing_backup_fails() {
    let (dir, paths) = temp_paths();
    let backups = manager(&paths);
    let err = backups
        .restore_backup(&dir.path().join("settings-nope.json"))
        .unwrap_err();
    assert!(matches!(err, SwitchError::BackupNotFound { .. }));
}

#[test]
fn restore_rejects_invalid_content() {
    let (dir, paths) = temp_paths();
    write_settings(&paths, r#"{"keep": true}"#);
    let bad = dir.path().join("broken.json");
    fs::write(&bad, "[1, 2, 3]").unwrap();

    let err = manager(&paths).restore_backup(&bad).unwrap_err();
    assert!(matches!(err, SwitchError::InvalidBackupContent { .. }));
    assert_eq!(read_settings_bytes(&paths), br#"{"keep": true}"#);
}

#[test]
fn same_second_backups_do_not_collide() {
    let (_dir, paths) = temp_paths();
    let backups = manager(&paths);
    let now = NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();

    write_settings(&paths, r#"{"n": 1}"#);
    let first = backups.create_backup_at(now).unwrap();
    write_settings(&paths, r#"{"n": 2}"#);
    let second = backups.create_backup_at(now).unwrap();
    write_settings(&paths, r#"{"n": 3}"#);
    let third = backups.create_backup_at(now).unwrap();

    assert_ne!(first, second);
    assert_ne!(second, third);
    assert_eq!(fs::read(&first).unwrap(), br#"{"n": 1}"#);

    let listed = backups.list_backups().unwrap();
    let names: Vec<_> = listed.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "settings-2026-10-16T09-30-00_02.json",
            "settings-2026-10-16T09-30-00_01.json",
            "settings-2026-10-16T09-30-00.json",
        ]
    );
    assert!(listed.iter().all(|b| b.timestamp == now));
}

#[test]
fn list_is_newest_first_and_ignores_foreign_files() {
    let (_dir, paths) = temp_paths();
    let backups = manager(&paths);
    let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();

    backups.create_backup_at(day.and_hms_opt(8, 0, 0).unwrap()).unwrap();
    backups.create_backup_at(day.and_hms_opt(23, 59, 59).unwrap()).unwrap();
    backups.create_backup_at(day.and_hms_opt(12, 0, 0).unwrap()).unwrap();
    fs::write(paths.backup_dir.join("notes.txt"), "hi").unwrap();
    fs::write(paths.backup_dir.join("settings-garbage.json"), "{}").unwrap();

    let listed = backups.list_backups().unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].timestamp, day.and_hms_opt(23, 59, 59).unwrap());
    assert_eq!(listed[2].timestamp, day.and_hms_opt(8, 0, 0).unwrap());
}

#[test]
fn list_without_directory_is_empty() {
    let (_dir, paths) = temp_paths();
    assert!(manager(&paths).list_backups().unwrap().is_empty());
}

#[test]
fn prune_keeps_newest() {
    let (_dir, paths) = temp_paths();
    let backups = manager(&paths);
    let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    for hour in 0..5 {
        backups.create_backup_at(day.and_hms_opt(hour, 0, 0).unwrap()).unwrap();
    }

    let removed = backups.prune(2).unwrap();
    assert_eq!(removed.len(), 3);

    let left = backups.list_backups().unwrap();
    assert_eq!(left.len(), 2);
    assert_eq!(left[0].timestamp, day.and_hms_opt(4, 0, 0).unwrap());
    assert_eq!(left[1].timestamp, day.and_hms_opt(3, 0, 0).unwrap());
}

#[test]
fn resolve_accepts_bare_names() {
    let (_dir, paths) = temp_paths();
    let backups = manager(&paths);
    assert_eq!(
        backups.resolve("settings-2026-01-01T00-00-00.json"),
        paths.backup_dir.join("settings-2026-01-01T00-00-00.json")
    );
    let absolute = paths.backup_dir.join("x.json");
    assert_eq!(backups.resolve(absolute.to_str().unwrap()), absolute);
}
