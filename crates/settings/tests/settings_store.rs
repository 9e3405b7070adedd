use notespanel_settings::{PanelSettings, PanelSettingsStore, SETTINGS_KEY};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let store = PanelSettingsStore::new(temp.path().join(SETTINGS_KEY));

    let settings = store.load().expect("load defaults");
    assert_eq!(settings.last_file_path(), None);
    assert!(!settings.auto_save_enabled);
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join(SETTINGS_KEY);
    let notes = temp.path().join("notes.txt");

    PanelSettingsStore::new(&path)
        .save(&PanelSettings::new(Some(notes.clone()), true))
        .expect("save");

    let reloaded = PanelSettingsStore::new(&path).load().expect("reload");
    assert_eq!(reloaded.last_file_path(), Some(notes.as_path()));
    assert!(reloaded.auto_save_enabled);

    let raw = fs::read_to_string(&path).expect("raw settings");
    assert_eq!(raw.lines().nth(1), Some("True"));
}

#[test]
fn hand_written_file_with_windows_path_is_read() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join(SETTINGS_KEY);
    fs::write(&path, "C:\\notes.txt\r\nTrue\r\n").expect("write settings");

    let settings = PanelSettingsStore::new(&path).load().expect("load");
    assert_eq!(settings.last_file_path(), Some(Path::new("C:\\notes.txt")));
    assert!(
        settings.auto_save_enabled,
        "flag on the second line should be honoured"
    );
}

#[test]
fn garbage_flag_is_silently_disabled() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join(SETTINGS_KEY);
    fs::write(&path, "/tmp/notes.txt\nmaybe\nextra\n").expect("write settings");

    let settings = PanelSettingsStore::new(&path).load().expect("load");
    assert_eq!(settings.last_file_path(), Some(Path::new("/tmp/notes.txt")));
    assert!(
        !settings.auto_save_enabled,
        "unparsable flag should fall back to disabled"
    );
}

#[test]
fn invalid_utf8_in_flag_line_keeps_path_and_disables_auto_save() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join(SETTINGS_KEY);
    let notes = temp.path().join("notes.txt");
    let mut payload = notes.to_str().expect("utf-8 temp path").as_bytes().to_vec();
    payload.extend_from_slice(b"\nTr\xFFue\n");
    fs::write(&path, payload).expect("write settings");

    let settings = PanelSettingsStore::new(&path).load().expect("load");
    assert_eq!(settings.last_file_path(), Some(notes.as_path()));
    assert!(!settings.auto_save_enabled);
}

#[cfg(unix)]
#[test]
fn non_utf8_file_name_survives_reload() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = tempdir().expect("tempdir");
    let path = temp.path().join(SETTINGS_KEY);
    let notes = temp.path().join(OsStr::from_bytes(b"n\xE9.txt"));

    PanelSettingsStore::new(&path)
        .save(&PanelSettings::new(Some(notes.clone()), true))
        .expect("save");

    let reloaded = PanelSettingsStore::new(&path).load().expect("reload");
    assert_eq!(reloaded.last_file_path(), Some(notes.as_path()));
    assert!(reloaded.auto_save_enabled);
}
