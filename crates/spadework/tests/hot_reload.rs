//! End-to-end hot-reload tests against the real QuickJS engine.

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use spadework::reload::ReloadReport;
use spadework::{Host, HostConfig, NativeRegistry};
use spadework_types::ConnectionDecision;

const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn host_in(dir: &Path, simulate: bool) -> Host {
    let mut config = HostConfig::for_dir(dir);
    config.simulate_connect = simulate;
    Host::new(config, Arc::new(NativeRegistry::loopback()))
}

#[tokio::test]
async fn test_reload_then_break_keeps_old_handlers_callable() {
    let temp = TempDir::new().unwrap();
    let host = host_in(temp.path(), true);

    let path = write_script(
        temp.path(),
        "gate.js",
        r#"
        ({
            connection: {
                preConnect(address) { return true; },
            },
        })
        "#,
    );

    assert_eq!(host.orchestrator().scan_existing().await, 1);
    assert_eq!(host.events().connection_count(), 1);
    assert_eq!(
        host.events().fire_pre_connect(LOOPBACK),
        ConnectionDecision::Allow
    );

    // Broken edit: the previously loaded handlers must stay callable and
    // the cache must keep the good unit.
    write_script(temp.path(), "gate.js", "({ connection: { preConnect(");
    let report = host.orchestrator().reload_file(&path).await;
    assert!(matches!(report, ReloadReport::CompileFailed(_)));

    assert_eq!(
        host.events().fire_pre_connect(LOOPBACK),
        ConnectionDecision::Allow
    );
    assert_eq!(
        host.orchestrator().cache().previous(&path).unwrap().generation(),
        0
    );

    // Fixed edit flips the verdict; the chained unit replaces the old one.
    write_script(
        temp.path(),
        "gate.js",
        r#"
        ({
            connection: {
                preConnect(address) { return false; },
            },
        })
        "#,
    );
    let report = host.orchestrator().reload_file(&path).await;
    match report {
        ReloadReport::Loaded { simulation } => {
            let simulation = simulation.unwrap();
            assert_eq!(simulation.decision, ConnectionDecision::Deny);
            assert!(!simulation.allowed);
        }
        other => panic!("expected Loaded, got {other:?}"),
    }

    assert_eq!(
        host.events().fire_pre_connect(LOOPBACK),
        ConnectionDecision::Deny
    );
    assert_eq!(
        host.orchestrator().cache().previous(&path).unwrap().generation(),
        1
    );
}

#[tokio::test]
async fn test_top_level_state_survives_edits() {
    let temp = TempDir::new().unwrap();
    // Simulation off so only explicit fires touch the counter.
    let host = host_in(temp.path(), false);

    let path = write_script(
        temp.path(),
        "counter.js",
        r#"
        var joins = 0;
        ({
            connection: {
                preConnect(address) { joins += 1; return true; },
            },
        })
        "#,
    );

    host.orchestrator().scan_existing().await;
    host.events().fire_pre_connect(LOOPBACK);
    host.events().fire_pre_connect(LOOPBACK);

    // The edit drops the declaration but keeps reading the binding; the
    // chained compilation still resolves it, count intact.
    write_script(
        temp.path(),
        "counter.js",
        r#"
        ({
            connection: {
                preConnect(address) {
                    joins += 1;
                    return joins > 3 ? false : true;
                },
            },
        })
        "#,
    );
    let report = host.orchestrator().reload_file(&path).await;
    assert!(matches!(report, ReloadReport::Loaded { .. }));

    // Two joins carried over: the third passes, the fourth trips the cap.
    assert_eq!(
        host.events().fire_pre_connect(LOOPBACK),
        ConnectionDecision::Allow
    );
    assert_eq!(
        host.events().fire_pre_connect(LOOPBACK),
        ConnectionDecision::Deny
    );
}

#[tokio::test]
async fn test_startup_scan_isolates_broken_scripts() {
    let temp = TempDir::new().unwrap();
    let host = host_in(temp.path(), false);

    write_script(
        temp.path(),
        "good.js",
        "({ connection: { preConnect(a) { return true; } } })",
    );
    write_script(temp.path(), "broken.js", "this is not javascript ===");
    write_script(temp.path(), "notes.txt", "ignored");

    let attempted = host.orchestrator().scan_existing().await;
    assert_eq!(attempted, 2);

    assert_eq!(host.events().connection_count(), 1);
    assert!(host.orchestrator().cache().contains(&temp.path().join("good.js")));
    assert!(!host.orchestrator().cache().contains(&temp.path().join("broken.js")));
    assert_eq!(
        host.orchestrator()
            .cache()
            .diagnostics(&temp.path().join("broken.js"))
            .len(),
        1
    );
}

#[tokio::test]
async fn test_post_connect_override_reaches_simulation() {
    let temp = TempDir::new().unwrap();
    let host = host_in(temp.path(), true);

    let path = write_script(
        temp.path(),
        "veto.js",
        r#"
        ({
            connection: {
                preConnect(address) { return true; },
                postConnect(decision, address, id) { decision.allow = false; },
            },
        })
        "#,
    );

    let report = host.orchestrator().reload_file(&path).await;
    match report {
        ReloadReport::Loaded { simulation } => {
            let simulation = simulation.unwrap();
            assert_eq!(simulation.decision, ConnectionDecision::Allow);
            assert!(!simulation.allowed);
        }
        other => panic!("expected Loaded, got {other:?}"),
    }
}
