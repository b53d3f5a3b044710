use qcm_generator::config::{Settings, DEFAULT_PORT};
use serial_test::serial;
use std::path::PathBuf;

fn clear_env() {
    for var in ["QCM_QUESTIONS_FILE", "QCM_HOST", "QCM_PORT"] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_without_env() {
    clear_env();
    assert_eq!(Settings::from_env(), Settings::default());
    assert_eq!(Settings::default().questions_path, PathBuf::from("questions.csv"));
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    std::env::set_var("QCM_QUESTIONS_FILE", "/srv/qcm/questions.csv");
    std::env::set_var("QCM_HOST", "127.0.0.1");
    std::env::set_var("QCM_PORT", "9090");
    let s = Settings::from_env();
    assert_eq!(s.questions_path, PathBuf::from("/srv/qcm/questions.csv"));
    assert_eq!(s.host, "127.0.0.1");
    assert_eq!(s.port, 9090);
    clear_env();
}

#[test]
#[serial]
fn invalid_port_falls_back() {
    clear_env();
    std::env::set_var("QCM_PORT", "not-a-port");
    assert_eq!(Settings::from_env().port, DEFAULT_PORT);
    clear_env();
}
