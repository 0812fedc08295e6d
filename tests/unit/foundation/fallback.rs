use super::*;

#[test]
fn first_strategy_success_is_not_degraded() {
    let out = first_success(
        Stage::Background,
        "a.png",
        vec![
            Strategy::new("smart", || Ok(1)),
            Strategy::new("original", || Ok(2)),
        ],
    )
    .unwrap();
    assert_eq!(out.value, 1);
    assert_eq!(out.strategy, "smart");
    assert!(!out.is_degraded());
}

#[test]
fn later_success_records_each_earlier_failure() {
    let out = first_success(
        Stage::Audio,
        "background music",
        vec![
            Strategy::new("library", || Err(ReelError::validation("empty pool"))),
            Strategy::new("other", || Err(ReelError::validation("also empty"))),
            Strategy::new("none", || Ok(None::<u32>)),
        ],
    )
    .unwrap();
    assert_eq!(out.value, None);
    assert_eq!(out.strategy, "none");
    assert_eq!(out.degradations.len(), 2);
    assert_eq!(out.degradations[0].stage, Stage::Audio);
    assert_eq!(out.degradations[0].subject, "background music");
    assert!(out.degradations[0].reason.starts_with("library failed:"));
}

#[test]
fn all_failures_return_last_error() {
    let err = first_success::<()>(
        Stage::Background,
        "x",
        vec![
            Strategy::new("a", || Err(ReelError::validation("first"))),
            Strategy::new("b", || Err(ReelError::validation("second"))),
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("second"));
}

#[test]
fn strategies_after_success_are_not_run() {
    let mut ran_second = false;
    let out = first_success(
        Stage::Background,
        "x",
        vec![
            Strategy::new("a", || Ok(())),
            Strategy::new("b", || {
                ran_second = true;
                Ok(())
            }),
        ],
    )
    .unwrap();
    assert_eq!(out.strategy, "a");
    assert!(!ran_second);
}

#[test]
fn empty_chain_is_an_error() {
    assert!(first_success::<()>(Stage::Background, "x", Vec::new()).is_err());
}
