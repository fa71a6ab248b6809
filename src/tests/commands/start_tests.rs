use super::*;

#[test]
fn services_default_to_their_own_binary_and_port() {
    assert_eq!(Service::Controller.default_binary(), "opsicle-controller");
    assert_eq!(
        Service::HttpReceiver.default_binary(),
        "opsicle-helper-httpreceiver"
    );
    assert_eq!(Service::Controller.default_listen_addr(), "0.0.0.0:54321");
}

#[test]
fn only_dependent_services_are_told_the_controller_url() {
    assert_eq!(
        Service::Controller.args("0.0.0.0:1", "http://c"),
        ["--listen-addr", "0.0.0.0:1"]
    );
    assert_eq!(
        Service::Coordinator.args("0.0.0.0:2", "http://c"),
        ["--listen-addr", "0.0.0.0:2", "--controller-url", "http://c"]
    );
}

#[cfg(unix)]
#[test]
fn wait_returns_the_exit_status() {
    let child = Command::new("sh").args(["-c", "exit 3"]).spawn().unwrap();
    let status = wait(&Mutex::new(child)).unwrap();
    assert_eq!(status.code(), Some(3));
}

#[cfg(unix)]
#[test]
fn wait_returns_once_another_thread_kills_the_child() {
    let child = Arc::new(Mutex::new(Command::new("sleep").arg("30").spawn().unwrap()));
    let killer = child.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        killer.lock().unwrap().kill().unwrap();
    });
    let status = wait(&child).unwrap();
    handle.join().unwrap();
    assert!(!status.success());
}
