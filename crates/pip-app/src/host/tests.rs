use std::time::Duration;

use pip_agent::MediaElement;
use pip_common::{ChannelError, TabId, WindowId};
use pip_config::PipConfig;
use pip_coordinator::{Coordinator, HostEvent, HostRuntime, MemoryStore, PipState, ToggleOutcome};
use pip_protocol::{AgentReport, AgentRequest, AgentResponse};
use tokio::sync::mpsc;

use super::*;
use crate::scenario::Scenario;

fn builtin() -> (Arc<LocalHost>, mpsc::UnboundedReceiver<HostEvent>) {
    LocalHost::new(Scenario::builtin(), PipConfig::default())
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<HostEvent>) -> HostEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no host event in time")
        .expect("host event channel closed")
}

/// Skip events until a report of `kind` from `tab` shows up.
async fn wait_for_report(
    rx: &mut mpsc::UnboundedReceiver<HostEvent>,
    tab: TabId,
    kind: AgentReport,
) -> HostEvent {
    loop {
        let event = next_event(rx).await;
        if let HostEvent::Report { origin, report } = &event {
            if origin.tab == tab && *report == kind {
                return event;
            }
        }
    }
}

#[tokio::test]
async fn query_round_trips_through_the_port() {
    let (host, _rx) = builtin();
    let response = host.send(TabId(1), AgentRequest::QueryPipState).await.unwrap();
    assert_eq!(response, AgentResponse::State { active: false });

    let response = host
        .send(TabId(2), AgentRequest::QueryUserActivation)
        .await
        .unwrap();
    assert_eq!(response, AgentResponse::State { active: false });
}

#[tokio::test]
async fn unscriptable_and_unknown_tabs_are_unreachable() {
    let (host, _rx) = builtin();
    assert_eq!(
        host.send(TabId(4), AgentRequest::QueryPipState).await,
        Err(ChannelError::Unreachable(TabId(4)))
    );
    assert_eq!(
        host.send(TabId(99), AgentRequest::QueryPipState).await,
        Err(ChannelError::Unreachable(TabId(99)))
    );

    let tabs: Vec<TabId> = host.tabs().await.iter().map(|t| t.id).collect();
    assert_eq!(tabs, vec![TabId(1), TabId(2), TabId(3)]);
}

#[tokio::test]
async fn activation_is_reported_from_the_foreground_tab() {
    let (host, mut rx) = builtin();
    let response = host.send(TabId(1), AgentRequest::ActivatePip).await.unwrap();
    assert_eq!(response, AgentResponse::ok());

    let event = wait_for_report(&mut rx, TabId(1), AgentReport::PipEntered).await;
    let HostEvent::Report { origin, .. } = event else {
        unreachable!()
    };
    assert!(origin.tab_active);

    let summary = host
        .summaries()
        .into_iter()
        .find(|s| s.info.id == TabId(1))
        .unwrap();
    assert!(summary.pip.is_some());
}

#[tokio::test]
async fn background_tab_reports_are_not_active() {
    let (host, mut rx) = builtin();
    host.play(TabId(2)).await.unwrap();

    let event = wait_for_report(&mut rx, TabId(2), AgentReport::VideoPlaying).await;
    let HostEvent::Report { origin, .. } = event else {
        unreachable!()
    };
    assert!(!origin.tab_active);
}

#[tokio::test]
async fn focus_changes_emit_events() {
    let (host, mut rx) = builtin();
    assert_eq!(host.focused(), Some(TabId(1)));

    host.activate_tab(TabId(2)).unwrap();
    assert_eq!(
        next_event(&mut rx).await,
        HostEvent::TabActivated {
            tab: TabId(2),
            window: WindowId(1)
        }
    );
    assert_eq!(host.focused(), Some(TabId(2)));

    host.focus_window(Some(WindowId(2))).unwrap();
    assert_eq!(
        next_event(&mut rx).await,
        HostEvent::WindowFocusChanged(Some(WindowId(2)))
    );
    assert_eq!(host.focused(), Some(TabId(3)));

    host.focus_window(None).unwrap();
    assert_eq!(next_event(&mut rx).await, HostEvent::WindowFocusChanged(None));
    assert_eq!(host.focused(), None);

    assert!(matches!(
        host.focus_window(Some(WindowId(7))),
        Err(HostError::UnknownWindow(WindowId(7)))
    ));
}

#[tokio::test]
async fn closing_the_foreground_tab_promotes_a_neighbour() {
    let (host, mut rx) = builtin();
    host.close_tab(TabId(1)).unwrap();

    assert_eq!(next_event(&mut rx).await, HostEvent::TabClosed(TabId(1)));
    assert_eq!(
        next_event(&mut rx).await,
        HostEvent::TabActivated {
            tab: TabId(2),
            window: WindowId(1)
        }
    );
    assert_eq!(
        host.send(TabId(1), AgentRequest::QueryPipState).await,
        Err(ChannelError::Unreachable(TabId(1)))
    );
    assert!(matches!(host.close_tab(TabId(1)), Err(HostError::UnknownTab(_))));
}

#[tokio::test]
async fn navigation_reloads_the_page() {
    let (host, mut rx) = builtin();
    host.send(TabId(1), AgentRequest::ActivatePip).await.unwrap();
    wait_for_report(&mut rx, TabId(1), AgentReport::PipEntered).await;

    host.navigate(TabId(1)).unwrap();
    assert_eq!(next_event(&mut rx).await, HostEvent::TabNavigated(TabId(1)));
    // Nothing from the unloaded page follows the navigation.
    let trailing = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(
        !matches!(trailing, Ok(Some(HostEvent::Report { ref origin, .. })) if origin.tab == TabId(1)),
        "unexpected {trailing:?}"
    );

    let response = host.send(TabId(1), AgentRequest::QueryPipState).await.unwrap();
    assert_eq!(response, AgentResponse::State { active: false });
    assert_eq!(host.focused(), Some(TabId(1)));
}

#[tokio::test]
async fn play_counts_as_a_gesture() {
    let (host, _rx) = builtin();
    // Unmuted, so it needs the gesture `play` grants.
    host.play(TabId(2)).await.unwrap();
    let response = host
        .send(TabId(2), AgentRequest::QueryUserActivation)
        .await
        .unwrap();
    assert_eq!(response, AgentResponse::State { active: true });

    assert_eq!(host.pause(TabId(2)).unwrap(), 1);
    assert_eq!(host.pause(TabId(2)).unwrap(), 0);
    assert!(matches!(host.play(TabId(3)).await, Err(HostError::NoVideo(_))));
}

#[tokio::test]
async fn badge_is_stored() {
    let (host, _rx) = builtin();
    let badge = Badge::new(
        pip_common::BadgeKind::NoVideo,
        "-",
        "#F44336",
        Duration::from_secs(1),
    );
    host.set_badge(Some(&badge));
    assert_eq!(host.badge().map(|b| b.text), Some("-".to_string()));
    host.set_badge(None);
    assert!(host.badge().is_none());
}

// =============================================================================
// With a coordinator
// =============================================================================

fn coordinator(host: &Arc<LocalHost>) -> Coordinator {
    Coordinator::new(
        host.clone(),
        Box::new(MemoryStore::new()),
        &PipConfig::default(),
    )
}

#[tokio::test]
async fn toggle_opens_and_native_close_releases() {
    let (host, mut rx) = builtin();
    let coordinator = coordinator(&host);

    assert_eq!(
        coordinator.toggle(None).await,
        ToggleOutcome::Activated(TabId(1))
    );
    assert_eq!(coordinator.pip_state(), PipState::Owned(TabId(1)));

    host.native_exit(TabId(1)).unwrap();
    let event = wait_for_report(&mut rx, TabId(1), AgentReport::PipExited).await;
    coordinator.dispatch(event);
    assert_eq!(coordinator.pip_state(), PipState::Idle);
}

#[tokio::test]
async fn toggle_in_a_videoless_tab_fails_with_badge() {
    let (host, _rx) = builtin();
    let coordinator = coordinator(&host);

    let outcome = coordinator.toggle(Some(TabId(3))).await;
    assert!(matches!(outcome, ToggleOutcome::Failed { tab: TabId(3), .. }));
    assert_eq!(coordinator.pip_state(), PipState::Idle);
    assert!(host.badge().is_some());
}

#[tokio::test]
async fn closing_the_owner_resets_ownership() {
    let (host, mut rx) = builtin();
    let coordinator = coordinator(&host);
    coordinator.toggle(Some(TabId(1))).await;

    host.close_tab(TabId(1)).unwrap();
    loop {
        let event = next_event(&mut rx).await;
        let closed = event == HostEvent::TabClosed(TabId(1));
        coordinator.dispatch(event);
        if closed {
            break;
        }
    }
    assert_eq!(coordinator.owner(), None);
}

#[tokio::test]
async fn second_toggle_closes_the_window() {
    let (host, _rx) = builtin();
    let coordinator = coordinator(&host);
    coordinator.toggle(Some(TabId(1))).await;

    assert_eq!(
        coordinator.toggle(Some(TabId(2))).await,
        ToggleOutcome::Deactivated(TabId(1))
    );
    // Deactivation is fire-and-forget; give the spawned request a moment.
    for _ in 0..50 {
        if host.summaries().iter().all(|s| s.pip.is_none()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(host.summaries().iter().all(|s| s.pip.is_none()));
    assert_eq!(coordinator.owner(), None);
}

#[tokio::test]
async fn playing_video_reports_through_summary() {
    let (host, _rx) = builtin();
    host.play(TabId(2)).await.unwrap();
    let video = host.document(TabId(2)).unwrap().videos().remove(0);
    assert!(video.is_playing());
    assert!(host
        .summaries()
        .iter()
        .any(|s| s.info.id == TabId(2) && s.playing));
}
