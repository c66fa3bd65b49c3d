// ABOUTME: Integration tests for the ordered rollout and rollback executor.
// ABOUTME: Uses in-memory components that record every call into a shared log.

use async_trait::async_trait;
use marshal::component::{Component, ComponentError, ComponentErrorKind, Phase};
use marshal::diagnostics::{Diagnostics, WarningKind};
use marshal::rollout::{ordered_rollout, ordered_rollout_with, rollback_components};
use marshal::types::ComponentName;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

type CallLog = Arc<Mutex<Vec<String>>>;

/// Component that records calls and fails on demand.
struct FakeComponent {
    name: ComponentName,
    log: CallLog,
    fail_deploy: Option<&'static str>,
    fail_verify: Option<&'static str>,
    fail_undo: Option<&'static str>,
}

impl FakeComponent {
    fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: ComponentName::new(name).unwrap(),
            log: Arc::clone(log),
            fail_deploy: None,
            fail_verify: None,
            fail_undo: None,
        }
    }

    fn call(&self, phase: Phase, failure: Option<&'static str>) -> Result<(), ComponentError> {
        self.log.lock().push(format!("{}:{}", phase, self.name));
        match failure {
            Some(message) => Err(ComponentError::failed(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Component for FakeComponent {
    fn name(&self) -> &ComponentName {
        &self.name
    }

    async fn deploy(&self) -> Result<(), ComponentError> {
        self.call(Phase::Deploy, self.fail_deploy)
    }

    async fn verify(&self) -> Result<(), ComponentError> {
        self.call(Phase::Verify, self.fail_verify)
    }

    async fn undo(&self) -> Result<(), ComponentError> {
        self.call(Phase::Undo, self.fail_undo)
    }
}

fn fakes(names: &[&str], log: &CallLog) -> Vec<FakeComponent> {
    names.iter().map(|n| FakeComponent::new(n, log)).collect()
}

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().clone()
}

mod orchestrator {
    use super::*;

    /// Test: every component is deployed then verified, in order, never undone.
    #[tokio::test]
    async fn happy_path_deploys_and_verifies_in_order() {
        let log = CallLog::default();
        let components = fakes(&["a", "b", "c"], &log);

        ordered_rollout(&components).await.unwrap();

        assert_eq!(
            calls(&log),
            vec![
                "deploy:a", "verify:a", "deploy:b", "verify:b", "deploy:c", "verify:c"
            ]
        );
    }

    /// Test: an empty sequence succeeds without calling anything.
    #[tokio::test]
    async fn empty_sequence_succeeds() {
        let log = CallLog::default();
        let components: Vec<FakeComponent> = Vec::new();

        ordered_rollout(&components).await.unwrap();

        assert!(calls(&log).is_empty());
    }

    /// Test: a first-component deploy failure with a clean rollback is absorbed
    /// and the rollout carries on, verifying the failed component first.
    #[tokio::test]
    async fn first_deploy_failure_is_absorbed_after_clean_rollback() {
        let log = CallLog::default();
        let mut components = fakes(&["a", "b", "c"], &log);
        components[0].fail_deploy = Some("image missing");

        let mut diag = Diagnostics::default();
        ordered_rollout_with(&components, &mut diag).await.unwrap();

        assert_eq!(
            calls(&log),
            vec![
                "deploy:a", "undo:a", "verify:a", "deploy:b", "verify:b", "deploy:c", "verify:c"
            ]
        );

        let absorbed: Vec<_> = diag.absorbed_failures().collect();
        assert_eq!(absorbed.len(), 1);
        assert_eq!(absorbed[0].kind, WarningKind::DeployAbsorbed);
        assert_eq!(absorbed[0].component.as_ref().unwrap().as_str(), "a");
        assert!(absorbed[0].message.contains("image missing"));
    }

    /// Test: a mid-sequence verify failure rolls back completed components
    /// first and the failing one last.
    #[tokio::test]
    async fn verify_failure_rolls_back_completed_then_failing() {
        let log = CallLog::default();
        let mut components = fakes(&["a", "b", "c"], &log);
        components[2].fail_verify = Some("unhealthy");

        let mut diag = Diagnostics::default();
        ordered_rollout_with(&components, &mut diag).await.unwrap();

        assert_eq!(
            calls(&log),
            vec![
                "deploy:a", "verify:a", "deploy:b", "verify:b", "deploy:c", "verify:c", "undo:a",
                "undo:b", "undo:c"
            ]
        );
        assert_eq!(
            diag.absorbed_failures().next().unwrap().kind,
            WarningKind::VerifyAbsorbed
        );
    }

    /// Test: a rolled-back component still joins the completed set, so a later
    /// failure undoes it again.
    #[tokio::test]
    async fn absorbed_component_is_rolled_back_again_by_later_failure() {
        let log = CallLog::default();
        let mut components = fakes(&["a", "b"], &log);
        components[0].fail_deploy = Some("flaky");
        components[1].fail_verify = Some("unhealthy");

        let mut diag = Diagnostics::default();
        ordered_rollout_with(&components, &mut diag).await.unwrap();

        assert_eq!(
            calls(&log),
            vec![
                "deploy:a", "undo:a", "verify:a", "deploy:b", "verify:b", "undo:a", "undo:b"
            ]
        );
        assert_eq!(diag.absorbed_failures().count(), 2);
    }

    /// Test: a deploy failure and a verify failure on the same component each
    /// trigger their own rollback.
    #[tokio::test]
    async fn deploy_and_verify_failure_on_same_component() {
        let log = CallLog::default();
        let mut components = fakes(&["a"], &log);
        components[0].fail_deploy = Some("deploy broke");
        components[0].fail_verify = Some("verify broke");

        ordered_rollout(&components).await.unwrap();

        assert_eq!(
            calls(&log),
            vec!["deploy:a", "undo:a", "verify:a", "undo:a"]
        );
    }

    /// Test: an undo failure stops the rollback immediately and the error is
    /// attributed to the component whose failure triggered the rollback.
    #[tokio::test]
    async fn rollback_failure_halts_and_names_triggering_component() {
        let log = CallLog::default();
        let mut components = fakes(&["a", "b"], &log);
        components[1].fail_deploy = Some("b deploy broke");
        components[0].fail_undo = Some("a undo broke");

        let err = ordered_rollout(&components).await.unwrap_err();

        assert_eq!(calls(&log), vec!["deploy:a", "verify:a", "deploy:b", "undo:a"]);
        assert_eq!(err.component().as_str(), "b");
        assert_eq!(err.message(), "a undo broke");
        assert_eq!(err.to_string(), "a undo broke");
        assert_eq!(err.phase(), Phase::Deploy);
        assert_eq!(err.kind(), ComponentErrorKind::Failed);
    }

    /// Test: a rollback failure after a verify failure stops the whole rollout.
    #[tokio::test]
    async fn rollback_failure_stops_remaining_components() {
        let log = CallLog::default();
        let mut components = fakes(&["a", "b", "c"], &log);
        components[1].fail_verify = Some("unhealthy");
        components[1].fail_undo = Some("b undo broke");

        let err = ordered_rollout(&components).await.unwrap_err();

        assert_eq!(
            calls(&log),
            vec!["deploy:a", "verify:a", "deploy:b", "verify:b", "undo:a", "undo:b"]
        );
        assert_eq!(err.component().as_str(), "b");
        assert_eq!(err.message(), "b undo broke");
        assert_eq!(err.phase(), Phase::Verify);
    }

    /// Test: a rollback failure on the first component's deploy returns before verify.
    #[tokio::test]
    async fn rollback_failure_skips_verify() {
        let log = CallLog::default();
        let mut components = fakes(&["a", "b"], &log);
        components[0].fail_deploy = Some("no disk");
        components[0].fail_undo = Some("still no disk");

        let err = ordered_rollout(&components).await.unwrap_err();

        assert_eq!(calls(&log), vec!["deploy:a", "undo:a"]);
        assert_eq!(err.component().as_str(), "a");
    }

    /// Test: heterogeneous boxed components work through the trait object impls.
    #[tokio::test]
    async fn boxed_trait_objects() {
        let log = CallLog::default();
        let components: Vec<Box<dyn Component>> = vec![
            Box::new(FakeComponent::new("a", &log)),
            Box::new(FakeComponent::new("b", &log)),
        ];

        ordered_rollout(&components).await.unwrap();

        assert_eq!(calls(&log), vec!["deploy:a", "verify:a", "deploy:b", "verify:b"]);
    }
}

mod rollback_executor {
    use super::*;

    /// Test: undo runs in exactly the given order.
    #[tokio::test]
    async fn undoes_in_given_order() {
        let log = CallLog::default();
        let components = fakes(&["a", "b", "c"], &log);

        rollback_components(&components).await.unwrap();

        assert_eq!(calls(&log), vec!["undo:a", "undo:b", "undo:c"]);
    }

    /// Test: the first undo failure is returned verbatim and later components
    /// are left alone.
    #[tokio::test]
    async fn stops_at_first_failure() {
        let log = CallLog::default();
        let mut components = fakes(&["a", "b", "c"], &log);
        components[1].fail_undo = Some("locked table");

        let err = rollback_components(&components).await.unwrap_err();

        assert_eq!(calls(&log), vec!["undo:a", "undo:b"]);
        assert_eq!(err.to_string(), "locked table");
        assert_eq!(err.kind(), ComponentErrorKind::Failed);
    }

    /// Test: each call undoes its entries once; separate calls undo again.
    #[tokio::test]
    async fn each_call_undoes_entries_once() {
        let log = CallLog::default();
        let components = fakes(&["a", "b"], &log);

        rollback_components(&components).await.unwrap();
        rollback_components(&components[..1]).await.unwrap();

        assert_eq!(calls(&log), vec!["undo:a", "undo:b", "undo:a"]);
    }

    /// Test: an empty list is a successful no-op.
    #[tokio::test]
    async fn empty_list_succeeds() {
        let components: Vec<FakeComponent> = Vec::new();
        rollback_components(&components).await.unwrap();
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("c{i}")).collect()
}

proptest! {
    #[test]
    fn all_healthy_never_undoes(n in 0usize..12) {
        let log = CallLog::default();
        let names = names(n);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let components = fakes(&refs, &log);

        prop_assert!(block_on(ordered_rollout(&components)).is_ok());

        let expected: Vec<String> = names
            .iter()
            .flat_map(|n| [format!("deploy:{n}"), format!("verify:{n}")])
            .collect();
        prop_assert_eq!(calls(&log), expected);
    }

    #[test]
    fn verify_failure_undoes_prefix_in_order(n in 1usize..10, k in 0usize..10) {
        let k = k % n;
        let log = CallLog::default();
        let names = names(n);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut components = fakes(&refs, &log);
        components[k].fail_verify = Some("unhealthy");

        prop_assert!(block_on(ordered_rollout(&components)).is_ok());

        let log = calls(&log);
        let pos = log.iter().position(|c| c == &format!("verify:c{k}")).unwrap();
        let undos: Vec<String> = names[..=k].iter().map(|n| format!("undo:{n}")).collect();
        prop_assert_eq!(&log[pos + 1..pos + 2 + k], &undos[..]);
        prop_assert_eq!(log.iter().filter(|c| c.starts_with("deploy:")).count(), n);
    }
}
