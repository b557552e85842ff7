use super::*;
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use shared::{domain::PlayerTurn, protocol::GameStateSnapshot};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{error::TransportError, ports::Emphasis, transport::ActionKind};

type Outcome = Result<GameStateSnapshot, TransportError>;

enum Scripted {
    Ready(Outcome),
    Held(oneshot::Receiver<()>, Outcome),
}

#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<HashMap<ActionKind, VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<Action>>>,
}

impl ScriptedTransport {
    fn then(self, kind: ActionKind, outcome: Outcome) -> Self {
        self.push(kind, Scripted::Ready(outcome));
        self
    }

    fn then_held(self, kind: ActionKind, outcome: Outcome) -> (Self, oneshot::Sender<()>) {
        let (release, gate) = oneshot::channel();
        self.push(kind, Scripted::Held(gate, outcome));
        (self, release)
    }

    fn push(&self, kind: ActionKind, step: Scripted) {
        self.script
            .lock()
            .expect("script")
            .entry(kind)
            .or_default()
            .push_back(step);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, action: &Action) -> Outcome {
        self.calls.lock().expect("calls").push(action.clone());
        let step = self
            .script
            .lock()
            .expect("script")
            .get_mut(&action.kind())
            .and_then(VecDeque::pop_front);
        match step {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Held(gate, outcome)) => {
                let _ = gate.await;
                outcome
            }
            None => Err(TransportError::Network(format!(
                "no scripted response for {}",
                action.name()
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Screen {
    current_word: String,
    opponent_word: String,
    message: String,
    emphasis: Option<Emphasis>,
    used_words: Vec<String>,
    input_enabled: bool,
    opponent_error: Option<String>,
    error: Option<String>,
    writes: usize,
}

#[derive(Clone, Default)]
struct RecordingPresentation {
    screen: Arc<Mutex<Screen>>,
}

impl RecordingPresentation {
    fn write(&self, update: impl FnOnce(&mut Screen)) {
        let mut screen = self.screen.lock().expect("screen");
        update(&mut screen);
        screen.writes += 1;
    }
}

impl PresentationPort for RecordingPresentation {
    fn set_current_word(&mut self, word: &str) {
        self.write(|screen| screen.current_word = word.to_string());
    }

    fn set_opponent_word(&mut self, word: &str) {
        self.write(|screen| screen.opponent_word = word.to_string());
    }

    fn set_message(&mut self, text: &str, emphasis: Emphasis) {
        self.write(|screen| {
            screen.message = text.to_string();
            screen.emphasis = Some(emphasis);
        });
    }

    fn set_used_words(&mut self, words: &[String]) {
        self.write(|screen| screen.used_words = words.to_vec());
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.write(|screen| screen.input_enabled = enabled);
    }

    fn set_opponent_error_banner(&mut self, text: Option<&str>) {
        self.write(|screen| screen.opponent_error = text.map(str::to_string));
    }

    fn set_error_banner(&mut self, text: Option<&str>) {
        self.write(|screen| screen.error = text.map(str::to_string));
    }
}

#[derive(Clone, Default)]
struct RecordingNavigation {
    visits: Arc<Mutex<u32>>,
}

impl NavigationPort for RecordingNavigation {
    fn go_to_results(&mut self) {
        *self.visits.lock().expect("visits") += 1;
    }
}

struct Harness {
    input: mpsc::Sender<InputEvent>,
    screen: Arc<Mutex<Screen>>,
    visits: Arc<Mutex<u32>>,
    calls: Arc<Mutex<Vec<Action>>>,
    session: JoinHandle<SessionExit>,
}

impl Harness {
    fn start(transport: ScriptedTransport) -> Self {
        let presentation = RecordingPresentation::default();
        let navigation = RecordingNavigation::default();
        let screen = presentation.screen.clone();
        let visits = navigation.visits.clone();
        let calls = transport.calls.clone();
        let controller = SessionController::new(
            ControllerSettings::default(),
            Arc::new(transport),
            Box::new(presentation),
            Box::new(navigation),
        );
        let (input, input_rx) = mpsc::channel(8);
        let session = tokio::spawn(controller.run(input_rx));
        Self {
            input,
            screen,
            visits,
            calls,
            session,
        }
    }

    async fn send(&self, event: InputEvent) {
        self.input.send(event).await.expect("controller alive");
        settle().await;
    }

    fn screen(&self) -> Screen {
        self.screen.lock().expect("screen").clone()
    }

    fn visits(&self) -> u32 {
        *self.visits.lock().expect("visits")
    }

    fn calls_of(&self, kind: ActionKind) -> usize {
        self.calls
            .lock()
            .expect("calls")
            .iter()
            .filter(|action| action.kind() == kind)
            .count()
    }
}

// Lets every task that is ready run to completion without reaching any
// session timer.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn snapshot(current: &str, used: &[&str], turn: PlayerTurn, game_over: bool, message: &str) -> Outcome {
    Ok(GameStateSnapshot {
        current_word: (!current.is_empty()).then(|| current.to_string()),
        used_words: used.iter().map(|word| word.to_string()).collect(),
        message: message.to_string(),
        player_turn: turn,
        game_over,
        opponent_error_message: None,
    })
}

fn empty_start() -> Outcome {
    snapshot("", &[], PlayerTurn::User, false, "始めてください")
}

#[tokio::test(start_paused = true)]
async fn bootstrap_renders_start_screen() {
    let harness = Harness::start(ScriptedTransport::default().then(ActionKind::Bootstrap, empty_start()));
    settle().await;

    let screen = harness.screen();
    assert!(screen.input_enabled);
    assert_eq!(screen.current_word, "しりとり");
    assert_eq!(screen.message, "始めてください");
    assert_eq!(screen.emphasis, Some(Emphasis::Normal));
    assert!(screen.used_words.is_empty());
    assert_eq!(harness.calls_of(ActionKind::Bootstrap), 1);
}

#[tokio::test(start_paused = true)]
async fn opponent_moves_after_delay_and_hands_turn_back() {
    let transport = ScriptedTransport::default()
        .then(ActionKind::Bootstrap, empty_start())
        .then(
            ActionKind::SubmitMove,
            snapshot("しりとり", &["しりとり"], PlayerTurn::Opponent, false, "受け付けました"),
        )
        .then(
            ActionKind::RequestOpponentMove,
            snapshot("りんご", &["しりとり", "りんご"], PlayerTurn::User, false, "あなたの番です"),
        );
    let harness = Harness::start(transport);
    settle().await;

    harness.send(InputEvent::Submit("しりとり".to_string())).await;
    let screen = harness.screen();
    assert!(!screen.input_enabled);
    assert_eq!(screen.used_words, vec!["しりとり".to_string()]);
    assert_eq!(screen.message, "Geminiが単語を考え中...");

    harness.send(InputEvent::Submit("ごりら".to_string())).await;
    assert_eq!(harness.calls_of(ActionKind::SubmitMove), 1);

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(harness.calls_of(ActionKind::RequestOpponentMove), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.calls_of(ActionKind::RequestOpponentMove), 1);
    let screen = harness.screen();
    assert_eq!(screen.opponent_word, "りんご");
    assert_eq!(screen.current_word, "しりとり");
    assert_eq!(screen.message, "あなたの番です");
    assert!(screen.input_enabled);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(harness.calls_of(ActionKind::RequestOpponentMove), 1);
}

#[tokio::test(start_paused = true)]
async fn game_over_navigates_after_results_delay() {
    let transport = ScriptedTransport::default()
        .then(ActionKind::Bootstrap, empty_start())
        .then(
            ActionKind::SubmitMove,
            snapshot("しりとりん", &["しりとりん"], PlayerTurn::User, true, "負けました"),
        );
    let harness = Harness::start(transport);
    settle().await;

    harness.send(InputEvent::Submit("しりとりん".to_string())).await;
    let screen = harness.screen();
    assert_eq!(screen.message, "負けました");
    assert_eq!(screen.emphasis, Some(Emphasis::Terminal));
    assert!(!screen.input_enabled);

    tokio::time::sleep(Duration::from_millis(9_900)).await;
    assert_eq!(harness.visits(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(harness.visits(), 1);

    let exit = harness.session.await.expect("session task");
    assert_eq!(exit, SessionExit::Results);
    assert_eq!(*harness.visits.lock().expect("visits"), 1);
}

#[tokio::test(start_paused = true)]
async fn network_fault_stops_all_automatic_calls() {
    let transport = ScriptedTransport::default()
        .then(ActionKind::Bootstrap, empty_start())
        .then(
            ActionKind::SubmitMove,
            Err(TransportError::Network("connection reset".to_string())),
        );
    let harness = Harness::start(transport);
    settle().await;

    harness.send(InputEvent::Submit("しりとり".to_string())).await;
    let screen = harness.screen();
    assert_eq!(screen.error.as_deref(), Some("通信エラーが発生しました。"));
    assert_eq!(screen.message, "エラー");
    assert!(!screen.input_enabled);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(harness.calls.lock().expect("calls").len(), 2);
    assert_eq!(harness.visits(), 0);

    let Harness { input, session, .. } = harness;
    drop(input);
    assert_eq!(session.await.expect("session task"), SessionExit::InputClosed);
}

#[tokio::test(start_paused = true)]
async fn reset_recovers_from_fault() {
    let transport = ScriptedTransport::default()
        .then(
            ActionKind::Bootstrap,
            Err(TransportError::Status { status: 503 }),
        )
        .then(ActionKind::Reset, empty_start());
    let harness = Harness::start(transport);
    settle().await;
    assert!(harness.screen().error.is_some());

    harness.send(InputEvent::Reset).await;

    let screen = harness.screen();
    assert_eq!(screen.error, None);
    assert!(screen.input_enabled);
    assert_eq!(screen.message, "始めてください");
}

#[tokio::test(start_paused = true)]
async fn late_opponent_reply_after_reset_leaves_screen_untouched() {
    let (transport, release) = ScriptedTransport::default()
        .then(ActionKind::Bootstrap, empty_start())
        .then(
            ActionKind::SubmitMove,
            snapshot("しりとり", &["しりとり"], PlayerTurn::Opponent, false, "受け付けました"),
        )
        .then(
            ActionKind::Reset,
            snapshot("", &[], PlayerTurn::User, false, "リセットしました"),
        )
        .then_held(
            ActionKind::RequestOpponentMove,
            snapshot("りんご", &["しりとり", "りんご"], PlayerTurn::User, false, "あなたの番です"),
        );
    let harness = Harness::start(transport);
    settle().await;

    harness.send(InputEvent::Submit("しりとり".to_string())).await;
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(harness.calls_of(ActionKind::RequestOpponentMove), 1);

    harness.send(InputEvent::Reset).await;
    let after_reset = harness.screen();
    assert_eq!(after_reset.message, "リセットしました");
    assert!(after_reset.used_words.is_empty());
    assert!(after_reset.input_enabled);

    release.send(()).expect("release held reply");
    settle().await;

    assert_eq!(harness.screen(), after_reset);
}

#[tokio::test(start_paused = true)]
async fn closing_input_ends_session() {
    let harness = Harness::start(ScriptedTransport::default().then(ActionKind::Bootstrap, empty_start()));
    settle().await;

    let Harness { input, session, .. } = harness;
    drop(input);

    assert_eq!(session.await.expect("session task"), SessionExit::InputClosed);
}

#[tokio::test(start_paused = true)]
async fn closed_input_after_game_over_still_reaches_results() {
    let transport = ScriptedTransport::default()
        .then(ActionKind::Bootstrap, empty_start())
        .then(
            ActionKind::SubmitMove,
            snapshot("しりとりん", &["しりとりん"], PlayerTurn::User, true, "負けました"),
        );
    let harness = Harness::start(transport);
    settle().await;
    harness.send(InputEvent::Submit("しりとりん".to_string())).await;

    let Harness {
        input,
        session,
        visits,
        ..
    } = harness;
    drop(input);
    settle().await;
    assert!(!session.is_finished());
    assert_eq!(*visits.lock().expect("visits"), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(session.await.expect("session task"), SessionExit::Results);
    assert_eq!(*visits.lock().expect("visits"), 1);
}
