//! End-to-end tests for the switch stack.
//!
//! Each test wires the real controller and ticker to the virtual actuator
//! and publisher, then drives commands and the clock. Time is paused, so a
//! one-minute timeout elapses instantly.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use gpioswitch_adapter_virtual::{VirtualActuator, VirtualPublisher};
use gpioswitch_app::controller::SwitchController;
use gpioswitch_app::ticker::Ticker;
use gpioswitch_domain::announcement::Announcement;
use gpioswitch_domain::command::Action;
use gpioswitch_domain::id::SwitchId;
use gpioswitch_domain::switch::{Switch, SwitchState};

const LIGHTS: SwitchId = SwitchId::new(17);
const BELL: SwitchId = SwitchId::new(27);
const TIMEOUT: Duration = Duration::from_secs(60);

struct Stack {
    controller: Arc<SwitchController<Arc<VirtualActuator>>>,
    actuator: Arc<VirtualActuator>,
    publisher: Arc<VirtualPublisher>,
    cancel: CancellationToken,
    ticker: JoinHandle<()>,
}

impl Stack {
    /// Build the full stack with two idle switches and start ticking.
    fn start() -> Self {
        let actuator = Arc::new(VirtualActuator::new([LIGHTS, BELL]));
        let publisher = Arc::new(VirtualPublisher::default());
        let controller = Arc::new(
            SwitchController::new(
                vec![
                    Switch::new(LIGHTS, "lights").unwrap(),
                    Switch::new(BELL, "bell").unwrap(),
                ],
                TIMEOUT,
                actuator.clone(),
            )
            .expect("two distinct switches should be accepted"),
        );
        let cancel = CancellationToken::new();
        let ticker = Ticker::new(controller.clone(), publisher.clone(), Duration::from_secs(1));
        let ticker = tokio::spawn(ticker.run(cancel.clone()));

        Self {
            controller,
            actuator,
            publisher,
            cancel,
            ticker,
        }
    }

    fn send(&self, switch_id: SwitchId, action: Action) {
        let outcome = self
            .controller
            .handle_command(switch_id, action, Instant::now().into_std());
        assert!(outcome.is_applied());
    }

    async fn stop(self) {
        self.cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), self.ticker)
            .await
            .expect("ticker should stop promptly")
            .unwrap();
    }
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

// ---------------------------------------------------------------------------
// Auto-off
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_turn_switch_off_after_timeout_and_announce_once() {
    let stack = Stack::start();

    stack.send(LIGHTS, Action::Activate);
    assert_eq!(stack.actuator.level(LIGHTS), Some(true));

    advance(59).await;
    assert_eq!(stack.actuator.level(LIGHTS), Some(true));
    assert!(stack.publisher.sent().is_empty());

    advance(2).await;
    assert_eq!(stack.actuator.level(LIGHTS), Some(false));
    assert_eq!(stack.publisher.sent(), vec![Announcement::off(LIGHTS)]);

    advance(120).await;
    assert_eq!(stack.publisher.sent().len(), 1);

    stack.stop().await;
}

#[tokio::test(start_paused = true)]
async fn should_restart_timeout_on_repeated_activate() {
    let stack = Stack::start();

    stack.send(LIGHTS, Action::Activate);
    advance(30).await;
    stack.send(LIGHTS, Action::Activate);

    advance(40).await;
    assert_eq!(stack.actuator.level(LIGHTS), Some(true));
    assert!(stack.publisher.sent().is_empty());

    advance(21).await;
    assert_eq!(stack.actuator.level(LIGHTS), Some(false));
    assert_eq!(stack.publisher.sent(), vec![Announcement::off(LIGHTS)]);

    stack.stop().await;
}

#[tokio::test(start_paused = true)]
async fn should_not_announce_after_manual_deactivate() {
    let stack = Stack::start();

    stack.send(BELL, Action::Activate);
    advance(10).await;
    stack.send(BELL, Action::Deactivate);
    assert_eq!(stack.actuator.level(BELL), Some(false));

    advance(120).await;
    assert!(stack.publisher.sent().is_empty());
    assert_eq!(stack.controller.state_of(BELL), Some(SwitchState::Idle));

    stack.stop().await;
}

#[tokio::test(start_paused = true)]
async fn should_expire_switches_independently() {
    let stack = Stack::start();

    stack.send(LIGHTS, Action::Activate);
    advance(20).await;
    stack.send(BELL, Action::Activate);

    advance(41).await;
    assert_eq!(stack.actuator.level(LIGHTS), Some(false));
    assert_eq!(stack.actuator.level(BELL), Some(true));

    advance(20).await;
    assert_eq!(stack.actuator.level(BELL), Some(false));
    assert_eq!(
        stack.publisher.sent(),
        vec![Announcement::off(LIGHTS), Announcement::off(BELL)]
    );

    stack.stop().await;
}

// ---------------------------------------------------------------------------
// Failures and edge cases
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_ignore_unknown_switch() {
    let stack = Stack::start();

    let outcome = stack.controller.handle_command(
        SwitchId::new(5),
        Action::Activate,
        Instant::now().into_std(),
    );

    assert!(!outcome.is_applied());
    assert_eq!(stack.actuator.write_count(), 0);
    stack.stop().await;
}

#[tokio::test(start_paused = true)]
async fn should_still_announce_when_output_write_fails_on_expiry() {
    let stack = Stack::start();

    stack.send(LIGHTS, Action::Activate);
    stack.actuator.set_failing(LIGHTS, true);

    advance(61).await;
    assert_eq!(stack.publisher.sent(), vec![Announcement::off(LIGHTS)]);
    assert_eq!(stack.controller.state_of(LIGHTS), Some(SwitchState::Idle));
    // The failed write left the output high.
    assert_eq!(stack.actuator.level(LIGHTS), Some(true));

    stack.stop().await;
}

#[tokio::test(start_paused = true)]
async fn should_rearm_after_off_then_on() {
    let stack = Stack::start();

    stack.send(BELL, Action::Activate);
    stack.send(BELL, Action::Deactivate);
    stack.send(BELL, Action::Activate);

    advance(30).await;
    assert_eq!(stack.actuator.level(BELL), Some(true));
    advance(31).await;
    assert_eq!(stack.actuator.level(BELL), Some(false));
    assert_eq!(stack.publisher.sent(), vec![Announcement::off(BELL)]);

    stack.stop().await;
}
