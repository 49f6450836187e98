//! Tests for deadline enforcement and worker escalation.

use std::time::Instant;

use openregex_core::{Match, Span};
use openregex_engines::{EngineKind, PreparedEngine};
use rstest::{fixture, rstest};

use super::*;
use crate::tests::support::{Script, ScriptedLauncher, report};

#[fixture]
fn settings() -> CoordinatorSettings {
    CoordinatorSettings {
        timeout: Duration::from_secs(1),
        grace: Duration::from_millis(100),
        poll_interval: Duration::from_millis(5),
        log_filter: String::from("off"),
        log_format: LogFormat::Compact,
    }
}

/// The in-process engines; preparing them runs no external commands.
fn in_process_engines() -> Arc<PreparedEngines> {
    let settings = EngineSettings::new(std::env::temp_dir().join("openregex-coordinator-tests"));
    Arc::new(
        PreparedEngines::prepare_only(&settings, [EngineKind::RustRegex, EngineKind::FancyRegex])
            .expect("distinct engines"),
    )
}

fn hello() -> Match {
    Match::new("Hello", Span::new(0, 5), Vec::new())
}

// ----------------------------------------------------------------------------
// Scripted workers
// ----------------------------------------------------------------------------

#[rstest]
fn completed_worker_returns_its_matches(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Finishes {
        after: Duration::from_millis(10),
        report: Some(report(vec![hello()], "")),
    });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());
    let result = coordinator.execute_default("Rust - regex", "[A-Z]\\w+", "Hello", 0);

    assert_eq!(result.termination(), Termination::Completed);
    assert_eq!(result.matches(), [hello()]);
    assert_eq!(result.error(), "");
    assert!(result.elapsed() >= Duration::from_millis(10));
    assert_eq!(coordinator.launcher.events(), ["launch"]);
}

#[rstest]
fn engine_errors_pass_through(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Finishes {
        after: Duration::ZERO,
        report: Some(report(Vec::new(), "Engine 'Python' not found")),
    });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());
    let result = coordinator.execute_default("Python", "a", "a", 0);

    assert_eq!(result.termination(), Termination::Completed);
    assert!(result.matches().is_empty());
    assert_eq!(result.error(), "Engine 'Python' not found");
}

#[rstest]
fn request_carries_call_and_prepared_state(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Finishes {
        after: Duration::ZERO,
        report: Some(report(Vec::new(), "")),
    });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());
    let result = coordinator.execute_default("Rust - fancy-regex", "a+", "aaa", 3);
    assert_eq!(result.termination(), Termination::Completed);

    let requests = coordinator.launcher.requests();
    let [request] = requests.as_slice() else {
        panic!("expected exactly one request, got {requests:?}");
    };
    assert_eq!(request.engine, "Rust - fancy-regex");
    assert_eq!(request.pattern, "a+");
    assert_eq!(request.text, "aaa");
    assert_eq!(request.flags, 3);
    assert_eq!(request.prepared, Some(PreparedEngine::FancyRegex));
    assert_eq!(request.log_filter, "off");
}

#[rstest]
fn cooperative_worker_is_terminated_at_the_deadline(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Hangs { cooperative: true });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());
    let deadline = Duration::from_millis(50);
    let result = coordinator.execute("Rust - fancy-regex", "(a|(?=a)a)+$", "aaa!", 0, deadline);

    assert_eq!(result.termination(), Termination::TimedOut);
    assert_eq!(result.error(), "Timeout exceeded: 0.05 seconds");
    assert!(result.matches().is_empty());
    assert!(result.elapsed() >= deadline);
    assert_eq!(
        coordinator.launcher.events(),
        ["launch", "terminate"]
    );
}

#[rstest]
fn stubborn_worker_is_killed_after_the_grace_window(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Hangs { cooperative: false });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());
    let started = Instant::now();
    let result = coordinator.execute("C++", "a", "a", 0, Duration::from_millis(20));

    assert_eq!(result.termination(), Termination::TimedOut);
    assert_eq!(result.error(), "Timeout exceeded: 0.02 seconds");
    assert!(started.elapsed() >= Duration::from_millis(120));
    assert_eq!(
        coordinator.launcher.events(),
        ["launch", "terminate", "kill", "wait"]
    );
}

#[rstest]
fn silent_exit_is_a_crash(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Finishes {
        after: Duration::ZERO,
        report: None,
    });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());
    let result = coordinator.execute_default("C++", "a", "a", 0);

    assert_eq!(result.termination(), Termination::Crashed);
    assert_eq!(result.error(), NO_RESULT_MESSAGE);
    assert!(result.matches().is_empty());
}

#[rstest]
fn launch_failure_is_a_crash(settings: CoordinatorSettings) {
    let coordinator = Coordinator::with_launcher(
        ScriptedLauncher::new(Script::FailsToLaunch),
        settings,
        in_process_engines(),
    );
    let result = coordinator.execute_default("Java", "a", "a", 0);

    assert_eq!(result.termination(), Termination::Crashed);
    assert!(
        result
            .error()
            .starts_with("Failed to start worker for engine 'Java': failed to spawn 'scripted'"),
        "unexpected error: {}",
        result.error()
    );
}

#[rstest]
fn sequential_calls_use_fresh_workers(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Finishes {
        after: Duration::ZERO,
        report: Some(report(Vec::new(), "")),
    });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());
    for _ in 0..3 {
        let result = coordinator.execute_default("Rust - regex", "a", "b", 0);
        assert_eq!(result.termination(), Termination::Completed);
    }
    assert_eq!(
        coordinator.launcher.events(),
        ["launch", "launch", "launch"]
    );
}

#[rstest]
fn unregistered_engines_are_still_dispatched(settings: CoordinatorSettings) {
    let launcher = ScriptedLauncher::new(Script::Finishes {
        after: Duration::ZERO,
        report: Some(report(Vec::new(), "Engine 'missing' not found")),
    });
    let coordinator = Coordinator::with_launcher(launcher, settings, in_process_engines());

    let result = coordinator.execute_default("missing", "a", "a", 0);
    assert_eq!(result.error(), "Engine 'missing' not found");
    assert_eq!(coordinator.launcher.events(), ["launch"]);
    let requests = coordinator.launcher.requests();
    let [request] = requests.as_slice() else {
        panic!("expected exactly one request, got {requests:?}");
    };
    assert_eq!(request.prepared, None);
}

#[rstest]
#[case("Rust - regex", true)]
#[case("Rust - fancy-regex", true)]
#[case("JavaScript", false)]
#[case("Python", false)]
fn only_prepared_engines_are_known(
    settings: CoordinatorSettings,
    #[case] engine: &str,
    #[case] known: bool,
) {
    let coordinator = Coordinator::with_launcher(
        ScriptedLauncher::new(Script::FailsToLaunch),
        settings,
        in_process_engines(),
    );
    assert_eq!(coordinator.knows(engine), known);
    assert_eq!(coordinator.registry().list(), ["Rust - regex", "Rust - fancy-regex"]);
}

#[rstest]
#[case::whole(Duration::from_secs(5), "Timeout exceeded: 5 seconds")]
#[case::fraction(Duration::from_millis(2_500), "Timeout exceeded: 2.5 seconds")]
#[case::sub_second(Duration::from_millis(100), "Timeout exceeded: 0.1 seconds")]
fn timeout_messages(#[case] deadline: Duration, #[case] expected: &str) {
    assert_eq!(timeout_message(deadline), expected);
}

#[test]
fn settings_follow_configuration() {
    let config = Config {
        timeout_secs: 2.5,
        grace_ms: 250,
        poll_interval_ms: 0,
        node_binary: String::from("nodejs"),
        ..Config::default()
    };
    let settings = CoordinatorSettings::from_config(&config);
    assert_eq!(settings.timeout, Duration::from_millis(2_500));
    assert_eq!(settings.grace, Duration::from_millis(250));
    assert_eq!(settings.poll_interval, Duration::from_millis(1));
    assert_eq!(engine_settings(&config).node_binary(), "nodejs");
}

// ----------------------------------------------------------------------------
// Real child processes
// ----------------------------------------------------------------------------

#[cfg(unix)]
mod processes {
    use std::ffi::OsString;

    use super::*;

    fn shell(script: &str) -> ProcessLauncher {
        ProcessLauncher::new("sh", ["-c", script])
    }

    #[rstest]
    fn report_line_completes_the_call(settings: CoordinatorSettings) {
        let launcher = shell(
            r#"read request; printf '%s\n' '{"matches":[],"error":"","elapsed_seconds":0.0}'"#,
        );
        let result = Coordinator::with_launcher(launcher, settings, in_process_engines())
            .execute_default("Rust - regex", "a", "b", 0);
        assert_eq!(result.termination(), Termination::Completed);
        assert_eq!(result.error(), "");
    }

    #[rstest]
    fn exit_without_report_is_a_crash(settings: CoordinatorSettings) {
        let result = Coordinator::with_launcher(
            shell("read request; exit 3"),
            settings,
            in_process_engines(),
        )
        .execute_default("Rust - regex", "a", "b", 0);
        assert_eq!(result.termination(), Termination::Crashed);
        assert_eq!(result.error(), NO_RESULT_MESSAGE);
    }

    #[rstest]
    fn sleeping_worker_is_cancelled(settings: CoordinatorSettings) {
        let coordinator = Coordinator::with_launcher(
            shell("read request; sleep 30"),
            settings,
            in_process_engines(),
        );
        let started = Instant::now();
        let result = coordinator.execute("C++", "a", "b", 0, Duration::from_millis(200));
        assert_eq!(result.termination(), Termination::TimedOut);
        assert_eq!(result.error(), "Timeout exceeded: 0.2 seconds");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[rstest]
    fn worker_ignoring_sigterm_is_killed(settings: CoordinatorSettings) {
        let coordinator = Coordinator::with_launcher(
            shell("trap '' TERM; read request; sleep 30"),
            settings,
            in_process_engines(),
        );
        let started = Instant::now();
        let result = coordinator.execute("Java", "a", "b", 0, Duration::from_millis(200));
        assert_eq!(result.termination(), Termination::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[rstest]
    fn missing_program_cannot_launch(settings: CoordinatorSettings) {
        let launcher = ProcessLauncher::new(
            "/nonexistent/openregex-worker",
            Vec::<OsString>::new(),
        );
        let result = Coordinator::with_launcher(launcher, settings, in_process_engines())
            .execute_default("Java", "a", "b", 0);
        assert_eq!(result.termination(), Termination::Crashed);
        assert!(
            result
                .error()
                .starts_with("Failed to start worker for engine 'Java': failed to spawn"),
            "unexpected error: {}",
            result.error()
        );
    }
}
