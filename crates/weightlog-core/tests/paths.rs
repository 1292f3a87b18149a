use std::path::PathBuf;

use weightlog_core::{
    default_database_path, resolve_weightlog_data_dir, DATABASE_FILE_NAME, ENV_WEIGHTLOG_DATA_DIR,
    ENV_WEIGHTLOG_DB_PATH,
};

// Environment mutation is process-wide, so every case lives in one test.
#[test]
fn data_dir_and_database_path_resolution_order() {
    std::env::remove_var(ENV_WEIGHTLOG_DB_PATH);
    std::env::set_var(ENV_WEIGHTLOG_DATA_DIR, "/srv/weightlog");
    assert_eq!(resolve_weightlog_data_dir(), PathBuf::from("/srv/weightlog"));
    assert_eq!(
        default_database_path(),
        PathBuf::from("/srv/weightlog").join(DATABASE_FILE_NAME)
    );

    std::env::set_var(ENV_WEIGHTLOG_DATA_DIR, "   ");
    std::env::set_var("XDG_DATA_HOME", "/xdg");
    assert_eq!(resolve_weightlog_data_dir(), PathBuf::from("/xdg/weightlog"));

    std::env::set_var(ENV_WEIGHTLOG_DB_PATH, "/tmp/explicit.sqlite");
    assert_eq!(default_database_path(), PathBuf::from("/tmp/explicit.sqlite"));

    std::env::remove_var(ENV_WEIGHTLOG_DB_PATH);
    std::env::remove_var(ENV_WEIGHTLOG_DATA_DIR);
}
