//! Command handling once the board is connected.

mod common;

use common::{FakeNetwork, HidCall, Rig, rig};
use embassy_futures::block_on;
use vision_core::status::palette;
use vision_core::{
    CommandKind, ConnectionState, CursorPosition, HidStatus, Incoming, MouseButton, Step,
};

fn connected(bytes: &[u8]) -> Rig {
    let mut network = FakeNetwork::default();
    network.push_bytes(bytes);
    let mut rig = rig(network);
    assert_eq!(block_on(rig.start()), ConnectionState::Connected);
    rig
}

fn connected_with(events: &[Incoming]) -> Rig {
    let mut network = FakeNetwork::default();
    network.incoming.extend(events.iter().copied());
    let mut rig = rig(network);
    assert_eq!(block_on(rig.start()), ConnectionState::Connected);
    rig
}

fn drain(rig: &mut Rig, count: usize) -> Vec<Step> {
    (0..count).map(|_| block_on(rig.step())).collect()
}

// ── Test: motion ──

#[test]
fn three_lefts_move_cursor_three_steps() {
    let mut rig = connected(b"LLL");
    let before = rig.indicator().strip().shows();

    let steps = drain(&mut rig, 3);

    assert_eq!(steps, vec![Step::Executed(CommandKind::MoveLeft); 3]);
    assert_eq!(rig.session().cursor(), CursorPosition::new(-15, 0));
    assert_eq!(rig.hid().calls, vec![HidCall::Move(-5, 0); 3]);

    let frames = &rig.indicator().strip().hid_frames[before..];
    let cycle = [palette::PINK, palette::CYAN, palette::WHITE];
    assert_eq!(frames, cycle.repeat(3).as_slice());
    assert_eq!(rig.session().hid_status(), HidStatus::Idle);
}

#[test]
fn up_is_negative_y() {
    let mut rig = connected(b"UUD");
    drain(&mut rig, 3);

    assert_eq!(rig.session().cursor(), CursorPosition::new(0, -5));
    assert_eq!(
        rig.hid().calls,
        vec![HidCall::Move(0, -5), HidCall::Move(0, -5), HidCall::Move(0, 5)]
    );
}

#[test]
fn motion_is_not_clamped() {
    let bytes = vec![b'R'; 1000];
    let mut rig = connected(&bytes);
    drain(&mut rig, bytes.len());

    assert_eq!(rig.session().cursor(), CursorPosition::new(5000, 0));
}

#[test]
fn pause_only_changes_status() {
    let mut rig = connected(b"P");
    let before = rig.indicator().strip().shows();

    assert_eq!(block_on(rig.step()), Step::Executed(CommandKind::Pause));

    assert!(rig.hid().calls.is_empty());
    assert_eq!(rig.session().cursor(), CursorPosition::default());
    assert_eq!(
        &rig.indicator().strip().hid_frames[before..],
        &[palette::PINK, palette::BLUE[1], palette::WHITE]
    );
}

// ── Test: buttons ──

#[test]
fn click_presses_then_releases() {
    let mut rig = connected(b"l");
    let before = rig.indicator().strip().shows();

    block_on(rig.step());

    assert_eq!(
        rig.hid().calls,
        vec![
            HidCall::Button(MouseButton::Left, true),
            HidCall::Button(MouseButton::Left, false)
        ]
    );
    assert!(!rig.session().buttons().is_held(MouseButton::Left));
    assert_eq!(
        &rig.indicator().strip().hid_frames[before..],
        &[palette::PINK, palette::PURPLE[0], palette::WHITE]
    );
}

#[test]
fn press_then_release() {
    let mut rig = connected(b"kQ");

    block_on(rig.step());
    assert!(rig.session().buttons().is_held(MouseButton::Left));
    assert_eq!(rig.session().hid_status(), HidStatus::PressLeft);

    block_on(rig.step());
    assert!(!rig.session().buttons().is_held(MouseButton::Left));
    assert_eq!(rig.session().hid_status(), HidStatus::Idle);
    assert_eq!(
        rig.hid().calls,
        vec![
            HidCall::Button(MouseButton::Left, true),
            HidCall::Button(MouseButton::Left, false)
        ]
    );
}

#[test]
fn press_is_held_across_other_commands() {
    let mut rig = connected(b"nLPU");
    drain(&mut rig, 4);

    assert!(rig.session().buttons().is_held(MouseButton::Right));
    assert_eq!(rig.session().hid_status(), HidStatus::PressRight);
    assert_eq!(rig.hid().calls[0], HidCall::Button(MouseButton::Right, true));
    assert!(
        rig.hid().calls[1..]
            .iter()
            .all(|c| matches!(c, HidCall::Move(..)))
    );
}

#[test]
fn second_press_sends_nothing() {
    let mut rig = connected(b"ee");
    drain(&mut rig, 2);

    assert_eq!(rig.hid().calls, vec![HidCall::Button(MouseButton::Middle, true)]);
    assert!(rig.session().buttons().is_held(MouseButton::Middle));
}

#[test]
fn click_while_held_leaves_button_released() {
    let mut rig = connected(b"kl");
    drain(&mut rig, 2);

    assert!(!rig.session().buttons().is_held(MouseButton::Left));
    assert_eq!(rig.session().hid_status(), HidStatus::Idle);
}

#[test]
fn release_without_held_buttons_is_silent() {
    let mut rig = connected(b"QQ");
    let steps = drain(&mut rig, 2);

    assert_eq!(steps, vec![Step::Executed(CommandKind::Release); 2]);
    assert!(rig.hid().calls.is_empty());
}

#[test]
fn release_lets_go_of_every_button() {
    let mut rig = connected(b"kenQ");
    drain(&mut rig, 4);

    assert!(!rig.session().buttons().any_held());
    assert_eq!(
        &rig.hid().calls[3..],
        &[
            HidCall::Button(MouseButton::Left, false),
            HidCall::Button(MouseButton::Middle, false),
            HidCall::Button(MouseButton::Right, false),
        ]
    );
}

// ── Test: unknown bytes ──

#[test]
fn unknown_byte_changes_nothing() {
    let mut rig = connected(b"Z");
    let shows = rig.indicator().strip().shows();
    let elapsed = rig.delay().elapsed_ms();
    let status = rig.session().hid_status();

    assert_eq!(block_on(rig.step()), Step::Dropped(b'Z'));

    assert!(rig.hid().calls.is_empty());
    assert_eq!(rig.session().cursor(), CursorPosition::default());
    assert!(!rig.session().buttons().any_held());
    assert_eq!(rig.session().hid_status(), status);
    assert_eq!(rig.indicator().strip().shows(), shows);
    assert_eq!(rig.delay().elapsed_ms(), elapsed);
}

#[test]
fn unknown_bytes_between_commands_are_skipped() {
    let mut rig = connected(b"\r\nL\0R");
    let steps = drain(&mut rig, 5);

    assert_eq!(
        steps,
        vec![
            Step::Dropped(b'\r'),
            Step::Dropped(b'\n'),
            Step::Executed(CommandKind::MoveLeft),
            Step::Dropped(0),
            Step::Executed(CommandKind::MoveRight),
        ]
    );
    assert_eq!(rig.session().cursor(), CursorPosition::default());
}

// ── Test: pacing ──

#[test]
fn every_executed_command_pauses() {
    let mut rig = connected(b"LPkQ");
    let elapsed = rig.delay().elapsed_ms();

    drain(&mut rig, 4);

    assert_eq!(rig.delay().elapsed_ms(), elapsed + 4 * 25);
}

#[test]
fn empty_poll_is_idle() {
    let mut rig = connected(b"");
    assert_eq!(block_on(rig.step()), Step::Idle);
    assert_eq!(rig.network().polls, 1);
}

// ── Test: client lifecycle ──

#[test]
fn client_connect_shows_connected_idle() {
    let mut rig = connected_with(&[Incoming::ClientConnected]);

    assert_eq!(block_on(rig.step()), Step::ClientConnected);
    assert!(rig.session().client_attached());
    assert_eq!(rig.session().hid_status(), HidStatus::IdleConnected);
    assert_eq!(rig.indicator().strip().pixels[0], palette::GREEN);
}

#[test]
fn attached_client_rests_on_connected_idle() {
    let mut rig = connected_with(&[
        Incoming::ClientConnected,
        Incoming::Byte(b'L'),
        Incoming::Byte(b'k'),
        Incoming::Byte(b'n'),
    ]);

    let steps = drain(&mut rig, 2);
    assert_eq!(steps[1], Step::Executed(CommandKind::MoveLeft));
    assert!(rig.session().client_attached());
    assert_eq!(rig.session().hid_status(), HidStatus::IdleConnected);
    assert_eq!(rig.indicator().strip().pixels[0], palette::GREEN);

    block_on(rig.step());
    assert_eq!(rig.session().hid_status(), HidStatus::PressLeft);

    block_on(rig.step());
    assert_eq!(rig.session().hid_status(), HidStatus::IdleConnected);
}

#[test]
fn disconnect_releases_held_buttons() {
    let mut rig = connected_with(&[
        Incoming::ClientConnected,
        Incoming::Byte(b'k'),
        Incoming::Byte(b'n'),
        Incoming::ClientDisconnected,
    ]);

    let steps = drain(&mut rig, 4);

    assert_eq!(steps[3], Step::ClientDisconnected);
    assert!(!rig.session().client_attached());
    assert!(!rig.session().buttons().any_held());
    assert_eq!(rig.session().hid_status(), HidStatus::Idle);
    assert_eq!(
        &rig.hid().calls[2..],
        &[
            HidCall::Button(MouseButton::Left, false),
            HidCall::Button(MouseButton::Right, false),
        ]
    );
}

#[test]
fn next_client_is_accepted_after_disconnect() {
    let mut rig = connected_with(&[
        Incoming::ClientConnected,
        Incoming::ClientDisconnected,
        Incoming::ClientConnected,
        Incoming::Byte(b'L'),
    ]);

    let steps = drain(&mut rig, 4);

    assert_eq!(steps[2], Step::ClientConnected);
    assert_eq!(steps[3], Step::Executed(CommandKind::MoveLeft));
    assert_eq!(rig.session().cursor(), CursorPosition::new(-5, 0));
}

// ── Test: activity switch ──

#[test]
fn disabled_switch_suppresses_commands() {
    let mut rig = connected(b"Lk");
    rig.switch_mut().enabled = false;
    let shows = rig.indicator().strip().shows();

    let steps = drain(&mut rig, 2);

    assert_eq!(
        steps,
        vec![
            Step::Suppressed(CommandKind::MoveLeft),
            Step::Suppressed(CommandKind::PressLeft)
        ]
    );
    assert!(rig.hid().calls.is_empty());
    assert_eq!(rig.session().cursor(), CursorPosition::default());
    assert_eq!(rig.indicator().strip().shows(), shows);
}

#[test]
fn switch_is_read_per_command() {
    let mut rig = connected(b"LL");
    block_on(rig.step());
    rig.switch_mut().enabled = false;
    block_on(rig.step());

    assert_eq!(rig.session().cursor(), CursorPosition::new(-5, 0));
}

// ── Test: before connection ──

#[test]
fn nothing_is_polled_before_start() {
    let mut network = FakeNetwork::default();
    network.push_bytes(b"L");
    let mut rig = rig(network);

    assert_eq!(block_on(rig.step()), Step::NotConnected);
    assert_eq!(rig.network().polls, 0);
    assert!(rig.hid().calls.is_empty());
}

#[test]
fn halted_loop_ignores_queued_commands() {
    let mut network = FakeNetwork::failing(5, 0);
    network.push_bytes(b"LLk");
    let mut rig = rig(network);
    block_on(rig.start());

    let steps = drain(&mut rig, 3);

    assert_eq!(steps, vec![Step::Halted; 3]);
    assert_eq!(rig.network().polls, 0);
    assert!(rig.hid().calls.is_empty());
    assert_eq!(rig.network().incoming.len(), 3);
}
