use super::*;
use std::time::Duration;

#[tokio::test]
async fn a_raised_sigterm_resolves_with_the_sigterm_exit_code() {
    let waiter = tokio::spawn(wait_for_signal());
    tokio::time::sleep(Duration::from_millis(200)).await;

    let pid = nix::unistd::Pid::this();
    nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM).unwrap();

    let code = tokio::time::timeout(Duration::from_secs(2), waiter).await.unwrap().unwrap();
    assert_eq!(code, EXIT_SIGTERM);
}
