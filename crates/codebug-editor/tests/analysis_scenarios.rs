use codebug_editor::{
    AnalysisController, AnalysisRequest, AnalysisService, CodeEditor, PollSummary, Presentation,
    RequestId, ServiceError, SourceText, UiState, present, submit_enabled,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// A service whose answers are released one at a time by the test.
struct GatedService {
    gate: Mutex<Receiver<Result<Value, ServiceError>>>,
    seen: Mutex<Vec<Value>>,
}

impl GatedService {
    fn new() -> (Arc<Self>, Sender<Result<Value, ServiceError>>) {
        let (tx, rx) = mpsc::channel();
        let service = Arc::new(Self {
            gate: Mutex::new(rx),
            seen: Mutex::new(Vec::new()),
        });
        (service, tx)
    }
}

impl AnalysisService for GatedService {
    fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ServiceError> {
        self.seen.lock().unwrap().push(request.to_json());
        self.gate
            .lock()
            .unwrap()
            .recv()
            .unwrap_or_else(|_| Err(ServiceError::Transport("gate closed".into())))
    }
}

fn poll_until_delivered(controller: &mut AnalysisController) -> PollSummary {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let summary = controller.poll();
        if !summary.is_empty() {
            return summary;
        }
        assert!(Instant::now() < deadline, "completion never arrived");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn scenario_success_is_displayed_as_indented_json() {
    let (service, gate) = GatedService::new();
    let mut controller = AnalysisController::new(service.clone());
    let editor = CodeEditor::plain("def f():\n    pass");

    assert!(submit_enabled(controller.state(), editor.text()));
    let request = controller.analyze(editor.text()).unwrap();
    assert_eq!(controller.state(), &UiState::Pending { request });
    assert!(!submit_enabled(controller.state(), editor.text()));
    assert!(matches!(present(controller.state()), Presentation::Busy { .. }));

    gate.send(Ok(json!({ "issues": [] }))).unwrap();
    let summary = poll_until_delivered(&mut controller);
    assert_eq!(summary, PollSummary { applied: 1, stale: 0 });

    assert_eq!(
        present(controller.state()),
        Presentation::Success {
            body: "{\n  \"issues\": []\n}".to_string()
        }
    );
    assert_eq!(
        service.seen.lock().unwrap().as_slice(),
        &[json!({ "code": "def f():\n    pass", "apply_fix": false })]
    );
}

#[test]
fn scenario_transport_failure_is_wrapped() {
    let (service, gate) = GatedService::new();
    let mut controller = AnalysisController::new(service);

    controller.analyze(&SourceText::from("print(1)")).unwrap();
    gate.send(Err(ServiceError::Transport("Network Error".into())))
        .unwrap();
    poll_until_delivered(&mut controller);

    let Presentation::Failure { body } = present(controller.state()) else {
        panic!("expected a failure presentation");
    };
    let shown: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(shown, json!({ "error": "Network Error" }));
}

#[test]
fn scenario_service_error_body_shown_verbatim() {
    let (service, gate) = GatedService::new();
    let mut controller = AnalysisController::new(service);

    controller.analyze(&SourceText::from("print(1)")).unwrap();
    gate.send(Err(ServiceError::Rejected {
        status: 500,
        body: json!({ "error": "model crashed", "trace": ["a", "b"] }),
    }))
    .unwrap();
    poll_until_delivered(&mut controller);

    let shown: Value = serde_json::from_str(present(controller.state()).text()).unwrap();
    assert_eq!(shown, json!({ "error": "model crashed", "trace": ["a", "b"] }));
}

#[test]
fn scenario_response_after_clear_is_dropped() {
    let (service, gate) = GatedService::new();
    let mut controller = AnalysisController::new(service);

    let request = controller.analyze(&SourceText::from("x = 1")).unwrap();
    assert_eq!(request, RequestId(1));
    controller.clear();
    assert_eq!(controller.state(), &UiState::Idle);

    gate.send(Ok(json!({ "issues": ["late"] }))).unwrap();
    let summary = poll_until_delivered(&mut controller);
    assert_eq!(summary, PollSummary { applied: 0, stale: 1 });
    assert_eq!(controller.state(), &UiState::Idle);
    assert!(matches!(present(controller.state()), Presentation::Empty { .. }));
}

#[test]
fn slower_earlier_request_never_overwrites_newer_one() {
    let (service, gate) = GatedService::new();
    let mut controller = AnalysisController::new(service);
    let code = SourceText::from("x = 1");

    controller.analyze(&code).unwrap();
    controller.clear();
    let newer = controller.analyze(&code).unwrap();

    // Both calls block on the same gate; whichever worker takes the first answer, the state
    // may only reflect the completion tagged with `newer`.
    gate.send(Ok(json!({ "from": "first" }))).unwrap();
    gate.send(Ok(json!({ "from": "second" }))).unwrap();

    let mut total = PollSummary::default();
    let deadline = Instant::now() + Duration::from_secs(5);
    while total.applied + total.stale < 2 {
        assert!(Instant::now() < deadline, "completions never arrived");
        let summary = controller.poll();
        total.applied += summary.applied;
        total.stale += summary.stale;
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(total, PollSummary { applied: 1, stale: 1 });
    let UiState::Resolved { request, .. } = controller.state() else {
        panic!("expected resolved state");
    };
    assert_eq!(*request, newer);
}

#[test]
fn analyze_while_pending_does_not_issue_a_second_call() {
    let (service, gate) = GatedService::new();
    let mut controller = AnalysisController::new(service.clone());
    let code = SourceText::from("x = 1");

    let request = controller.analyze(&code).unwrap();
    assert!(controller.analyze(&code).is_err());
    assert_eq!(controller.state(), &UiState::Pending { request });

    gate.send(Ok(json!({}))).unwrap();
    poll_until_delivered(&mut controller);
    assert_eq!(service.seen.lock().unwrap().len(), 1);
}

struct Crashing;

impl AnalysisService for Crashing {
    fn analyze(&self, _request: &AnalysisRequest) -> Result<Value, ServiceError> {
        panic!("service bug");
    }
}

#[test]
fn panicking_service_resolves_to_a_failure() {
    let mut controller = AnalysisController::new(Arc::new(Crashing));
    let code = SourceText::from("x = 1");

    let request = controller.analyze(&code).unwrap();
    let summary = poll_until_delivered(&mut controller);
    assert_eq!(summary, PollSummary { applied: 1, stale: 0 });
    assert!(!controller.state().is_pending());
    assert!(submit_enabled(controller.state(), &code));

    let shown: Value = serde_json::from_str(present(controller.state()).text()).unwrap();
    assert_eq!(shown, json!({ "error": "analysis service panicked" }));

    // The controller stays usable.
    let next = controller.analyze(&code).unwrap();
    assert_eq!(next, RequestId(request.0 + 1));
}
