//! Interaction coordinator
//!
//! Turns input events into controller decisions and drives the display
//! and the audio engine from the results. All mutation happens on the one
//! task running [`InteractionCoordinator::run`].

use rand::RngCore;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::audio::{AudioBackend, AudioEngineAdapter, NoiseState};
use crate::display::{DisplaySurface, Palette, StyledText};
use crate::events::SessionEvent;
use crate::input::{InputEvent, UserGesture};
use crate::replies::{ANGRY_REPLY, RECOVERY_REPLY};
use crate::state::{Decision, EscalationController, Fired};

/// Glues input, conversation state, display and audio together
pub struct InteractionCoordinator<B: AudioBackend, D: DisplaySurface> {
    controller: EscalationController,
    audio: AudioEngineAdapter<B>,
    display: D,
    /// Highlight colors; separate from the reply source
    palette_rng: Box<dyn RngCore + Send>,
    event_tx: broadcast::Sender<SessionEvent>,
    /// Cleared once audio activation has succeeded
    awaiting_gesture: bool,
}

impl<B: AudioBackend, D: DisplaySurface> InteractionCoordinator<B, D> {
    pub fn new(
        controller: EscalationController,
        audio: AudioEngineAdapter<B>,
        display: D,
        palette_rng: Box<dyn RngCore + Send>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            controller,
            audio,
            display,
            palette_rng,
            event_tx,
            awaiting_gesture: true,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &EscalationController {
        &self.controller
    }

    #[cfg(test)]
    pub fn audio(&self) -> &AudioEngineAdapter<B> {
        &self.audio
    }

    /// Run the session until input ends and no timer is pending
    pub async fn run(&mut self, mut input_rx: mpsc::Receiver<InputEvent>) {
        info!("counselor session started");
        self.display.focus_input();

        let mut input_open = true;
        loop {
            let deadline = self.controller.next_deadline();
            if !input_open && deadline.is_none() {
                break;
            }

            tokio::select! {
                event = input_rx.recv(), if input_open => match event {
                    Some(event) => self.handle_input(event, Instant::now()),
                    None => {
                        debug!(pending = deadline.is_some(), "input closed");
                        input_open = false;
                    }
                },
                _ = wait_for(deadline) => {
                    self.on_timer(Instant::now());
                }
            }
        }

        info!("counselor session stopped");
    }

    /// Dispatch one input event
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::Gesture(gesture) => self.on_gesture(&gesture),
            InputEvent::Submit(text) => {
                self.on_submit(&text, now);
            }
        }
    }

    /// Activate audio on the first gesture that succeeds
    pub fn on_gesture(&mut self, gesture: &UserGesture) {
        if !self.awaiting_gesture {
            return;
        }
        if self.audio.ensure_started(gesture) {
            self.awaiting_gesture = false;
            self.emit(SessionEvent::AudioStarted);
        }
    }

    /// Classify a submission and apply its immediate effects
    pub fn on_submit(&mut self, raw_input: &str, now: Instant) -> Decision {
        let decision = self.controller.classify(raw_input, now);

        match &decision {
            Decision::Reject => {
                let state = self.controller.state();
                debug!(
                    mode = %state.mode,
                    repeat_count = state.repeat_count,
                    "submission rejected"
                );
                self.emit(SessionEvent::SubmissionRejected);
            }
            Decision::NormalReply(_) | Decision::EchoReply(_) => {
                self.display.show_pending();
                self.display.set_input_enabled(false);
                self.display.clear_input();
                self.emit(SessionEvent::ReplyPending);
            }
            Decision::AngryEscalation => {
                self.audio.start_noise();
                self.display.set_angry_mode(true);
                self.display.show_text(&StyledText::plain(ANGRY_REPLY));
                self.display.set_input_enabled(false);
                self.display.clear_input();
                self.emit(SessionEvent::AngryEntered);
                if self.audio.state().noise == NoiseState::On {
                    self.emit(SessionEvent::NoiseStarted);
                }
            }
        }

        decision
    }

    /// Apply the pending timer's transition if it is due
    pub fn on_timer(&mut self, now: Instant) {
        let Some(fired) = self.controller.poll(now) else {
            return;
        };

        match fired {
            Fired::Revealed(reply) => {
                let color = Palette::pick(&mut self.palette_rng);
                let styled = StyledText::highlighted(&reply.text, color);
                debug!(
                    spans = styled.highlight_count(),
                    html = %styled.to_html(),
                    "reply revealed"
                );
                self.display.show_text(&styled);
                self.display.set_input_enabled(true);
                self.display.focus_input();
                self.emit(SessionEvent::ReplyRevealed {
                    kind: reply.kind,
                    text: reply.text,
                    color,
                });
            }
            Fired::Recovered { duration_ms } => {
                let noise_was_on = self.audio.state().noise == NoiseState::On;
                self.audio.stop_noise();
                self.display.set_angry_mode(false);
                self.display.show_text(&StyledText::plain(RECOVERY_REPLY));
                self.display.set_input_enabled(true);
                self.display.focus_input();
                if noise_was_on {
                    self.emit(SessionEvent::NoiseStopped);
                }
                self.emit(SessionEvent::AngryRecovered { duration_ms });
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "emitting session event");
        let _ = self.event_tx.send(event);
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use tokio::time::Duration;

    use super::*;
    use crate::audio::testing::{AudioCall, RecordingBackend};
    use crate::display::testing::{DisplayOp, RecordingDisplay};
    use crate::display::Segment;
    use crate::input::Gesture;
    use crate::replies::{CATALOG, ECHO_REPLY};
    use crate::state::{Mode, ReplyKind, Timings};

    const REPLY: Duration = Duration::from_secs(3);
    const RECOVERY: Duration = Duration::from_secs(5);

    type TestCoordinator = InteractionCoordinator<RecordingBackend, RecordingDisplay>;

    struct Harness {
        coordinator: TestCoordinator,
        display: RecordingDisplay,
        backend: RecordingBackend,
        events: broadcast::Receiver<SessionEvent>,
    }

    fn harness_with(backend: RecordingBackend) -> Harness {
        let display = RecordingDisplay::default();
        let (event_tx, events) = broadcast::channel(64);
        let controller =
            EscalationController::new(Timings::default(), Box::new(StepRng::new(0, 0)));
        let coordinator = InteractionCoordinator::new(
            controller,
            AudioEngineAdapter::new(backend.clone()),
            display.clone(),
            Box::new(StepRng::new(0, 0)),
            event_tx,
        );
        Harness {
            coordinator,
            display,
            backend,
            events,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingBackend::default())
    }

    fn drain(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }
        drained
    }

    fn revealed_text(ops: &[DisplayOp]) -> Option<StyledText> {
        ops.iter().rev().find_map(|op| match op {
            DisplayOp::Text(text) => Some(text.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_normal_reply_scenario() {
        let mut h = harness();
        let now = Instant::now();

        let decision = h.coordinator.on_submit("What is love?", now);
        assert!(matches!(decision, Decision::NormalReply(_)));
        assert_eq!(
            h.display.take(),
            vec![DisplayOp::Pending, DisplayOp::InputEnabled(false), DisplayOp::ClearInput]
        );
        assert!(h.coordinator.controller().state().input_locked());

        h.coordinator.on_timer(now + Duration::from_secs(2));
        assert!(h.display.ops().is_empty());

        h.coordinator.on_timer(now + REPLY);
        let ops = h.display.take();
        let text = revealed_text(&ops).unwrap();
        assert!(CATALOG.contains(&text.to_string().as_str()));
        assert_eq!(&ops[1..], &[DisplayOp::InputEnabled(true), DisplayOp::Focus]);
        assert!(!h.coordinator.controller().state().input_locked());

        assert_eq!(
            drain(&mut h.events),
            vec![
                SessionEvent::ReplyPending,
                SessionEvent::ReplyRevealed {
                    kind: ReplyKind::Normal,
                    text: CATALOG[0].to_string(),
                    color: Palette::Red,
                },
            ]
        );
    }

    #[test]
    fn test_reveal_highlights_every_why_in_one_color() {
        let mut h = harness();
        let now = Instant::now();
        h.coordinator.on_submit("why", now);
        h.coordinator.on_timer(now + REPLY);

        let text = revealed_text(&h.display.ops()).unwrap();
        assert_eq!(text.to_string(), ECHO_REPLY);
        assert_eq!(text.highlight_count(), 1);
        assert_eq!(
            text.segments()[0],
            Segment::Highlight {
                text: "Why".to_string(),
                color: Palette::Red,
            }
        );
    }

    #[test]
    fn test_rejected_submission_has_no_visible_effect() {
        let mut h = harness();
        let now = Instant::now();
        assert_eq!(h.coordinator.on_submit("   ", now), Decision::Reject);
        assert!(h.display.ops().is_empty());

        h.coordinator.on_submit("hello", now);
        h.display.take();
        let later = now + Duration::from_secs(1);
        assert_eq!(h.coordinator.on_submit("again", later), Decision::Reject);
        assert!(h.display.ops().is_empty());
    }

    #[test]
    fn test_angry_scenario() {
        let mut h = harness();
        let mut now = Instant::now();
        h.coordinator.on_gesture(&UserGesture::new(Gesture::KeyPress));
        let activation = h.backend.calls().len();

        for _ in 0..2 {
            let decision = h.coordinator.on_submit("why", now);
            assert_eq!(decision, Decision::EchoReply(ECHO_REPLY.to_string()));
            now += REPLY;
            h.coordinator.on_timer(now);
            assert_eq!(revealed_text(&h.display.ops()).unwrap().to_string(), ECHO_REPLY);
        }
        h.display.take();
        drain(&mut h.events);

        assert_eq!(h.coordinator.on_submit("why", now), Decision::AngryEscalation);
        assert_eq!(
            h.display.take(),
            vec![
                DisplayOp::AngryMode(true),
                DisplayOp::Text(StyledText::plain(ANGRY_REPLY)),
                DisplayOp::InputEnabled(false),
                DisplayOp::ClearInput,
            ]
        );
        assert_eq!(h.coordinator.audio().state().noise, NoiseState::On);
        assert_eq!(h.coordinator.controller().state().mode, Mode::Angry);

        // Nothing happens at the reply delay
        h.coordinator.on_timer(now + REPLY);
        assert!(h.display.ops().is_empty());

        h.coordinator.on_timer(now + RECOVERY);
        assert_eq!(
            h.display.take(),
            vec![
                DisplayOp::AngryMode(false),
                DisplayOp::Text(StyledText::plain(RECOVERY_REPLY)),
                DisplayOp::InputEnabled(true),
                DisplayOp::Focus,
            ]
        );
        assert_eq!(h.coordinator.audio().state().noise, NoiseState::Off);
        assert_eq!(h.coordinator.controller().state().repeat_count, 0);
        assert_eq!(
            &h.backend.calls()[activation..],
            &[AudioCall::StartNoise, AudioCall::StopNoise]
        );

        assert_eq!(
            drain(&mut h.events),
            vec![
                SessionEvent::AngryEntered,
                SessionEvent::NoiseStarted,
                SessionEvent::NoiseStopped,
                SessionEvent::AngryRecovered { duration_ms: 5000 },
            ]
        );
    }

    #[test]
    fn test_angry_episode_before_any_gesture_stays_silent() {
        let mut h = harness();
        let mut now = Instant::now();
        for _ in 0..2 {
            h.coordinator.on_submit("why", now);
            now += REPLY;
            h.coordinator.on_timer(now);
        }

        assert_eq!(h.coordinator.on_submit("why", now), Decision::AngryEscalation);
        assert_eq!(h.coordinator.audio().state().noise, NoiseState::On);
        h.coordinator.on_timer(now + RECOVERY);
        assert_eq!(h.coordinator.audio().state().noise, NoiseState::Off);
        assert!(h.backend.calls().is_empty());

        let events = drain(&mut h.events);
        assert!(events.contains(&SessionEvent::NoiseStarted));
        assert!(events.contains(&SessionEvent::NoiseStopped));
    }

    #[test]
    fn test_why_then_elephants() {
        let mut h = harness();
        let now = Instant::now();

        let echo = Decision::EchoReply(ECHO_REPLY.to_string());
        assert_eq!(h.coordinator.on_submit("why", now), echo);
        h.coordinator.on_timer(now + REPLY);
        assert_eq!(h.coordinator.controller().state().repeat_count, 1);

        let decision = h.coordinator.on_submit("elephants", now + REPLY);
        assert_eq!(decision, Decision::NormalReply(CATALOG[0].to_string()));
        assert_eq!(h.coordinator.controller().state().repeat_count, 0);
    }

    #[test]
    fn test_audio_activation_is_one_shot() {
        let mut h = harness();
        for _ in 0..3 {
            h.coordinator.on_gesture(&UserGesture::new(Gesture::Click));
        }
        assert_eq!(h.backend.count(&AudioCall::ResumeContext), 1);
        assert_eq!(h.backend.count(&AudioCall::StartLoop), 1);
        assert_eq!(drain(&mut h.events), vec![SessionEvent::AudioStarted]);
    }

    #[test]
    fn test_refused_activation_does_not_touch_conversation() {
        let mut h = harness_with(RecordingBackend::refusing(1));
        let now = Instant::now();

        let key_press = InputEvent::Gesture(UserGesture::new(Gesture::KeyPress));
        h.coordinator.handle_input(key_press.clone(), now);
        h.coordinator.handle_input(InputEvent::Submit("hello".to_string()), now);
        assert!(!h.coordinator.audio().is_running());
        assert_eq!(h.coordinator.controller().state().mode, Mode::AwaitingReply);

        h.coordinator.handle_input(key_press, now);
        assert!(h.coordinator.audio().is_running());
        assert_eq!(h.backend.count(&AudioCall::ResumeContext), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_with_virtual_time() {
        let h = harness();
        let display = h.display.clone();
        let backend = h.backend.clone();
        let mut coordinator = h.coordinator;
        let (input_tx, input_rx) = mpsc::channel(32);

        let session = tokio::spawn(async move {
            coordinator.run(input_rx).await;
            coordinator
        });

        for _ in 0..3 {
            input_tx
                .send(InputEvent::Gesture(UserGesture::new(Gesture::KeyPress)))
                .await
                .unwrap();
            input_tx.send(InputEvent::Submit("why".to_string())).await.unwrap();
            // Submitted while locked; ignored
            input_tx.send(InputEvent::Submit("why".to_string())).await.unwrap();
            tokio::time::sleep(REPLY + Duration::from_millis(10)).await;
        }

        // Input ends mid-episode; the recovery still runs
        drop(input_tx);
        let coordinator = session.await.unwrap();

        assert_eq!(coordinator.controller().state().mode, Mode::Idle);
        assert_eq!(coordinator.controller().state().repeat_count, 0);
        assert_eq!(coordinator.audio().state().noise, NoiseState::Off);
        assert!(coordinator.audio().is_running());
        assert_eq!(backend.count(&AudioCall::ResumeContext), 1);
        assert_eq!(backend.count(&AudioCall::StopNoise), 1);

        let texts: Vec<String> = display
            .ops()
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Text(text) => Some(text.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![ECHO_REPLY, ECHO_REPLY, ANGRY_REPLY, RECOVERY_REPLY]);
    }
}
