use super::*;

#[test]
fn missing_program_reports_spawn_failure_after_retries() {
    let cmd = ToolCommand::new(
        "slidereel-definitely-not-a-real-tool",
        Duration::from_secs(1),
        1,
    );
    match run_tool(&cmd) {
        Err(ToolFailure::Spawn { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("expected spawn failure, got {other:?}"),
    }
}

#[test]
fn display_quotes_arguments_with_spaces() {
    let cmd = ToolCommand::new("ffmpeg", Duration::from_secs(1), 0)
        .args(["-i", "my file.png"])
        .arg("-y");
    assert_eq!(cmd.display(), "ffmpeg -i 'my file.png' -y");
}

#[cfg(unix)]
#[test]
fn captures_output_and_status() {
    let cmd = ToolCommand::new("sh", Duration::from_secs(5), 0)
        .args(["-c", "printf out; printf err >&2; exit 3"]);
    let out = run_tool(&cmd).unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert_eq!(out.stdout, b"out");
    assert_eq!(out.stderr_lossy(), "err");
}

#[cfg(unix)]
#[test]
fn long_running_process_times_out() {
    let cmd = ToolCommand::new("sh", Duration::from_millis(200), 0).args(["-c", "exec sleep 5"]);
    let started = Instant::now();
    match run_tool(&cmd) {
        Err(ToolFailure::TimedOut { .. }) => {}
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(4));
}
