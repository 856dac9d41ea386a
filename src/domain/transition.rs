//! The vend session transition table.
//!
//! Every input a running session can receive goes through [`transition`],
//! which returns the next state and the side effects the controller must
//! carry out. Inputs that have no meaning in the current state return `None`
//! and are ignored.

use super::event::{ProcessStatus, TransportEvent};
use super::outcome::{Outcome, VendError};
use super::session::SessionState;
use rust_decimal::Decimal;

#[derive(Debug, PartialEq, Clone)]
pub enum Input {
    Transport(TransportEvent),
    /// External authorization approval carrying an opaque payload.
    Approved(String),
    CountdownExpired,
    Abandon,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Effect {
    StartCountdown,
    StopCountdown,
    RecordAuthorization(Decimal),
    SendKeepAlive,
    ForwardApproval(String),
    NotifyInvalidSelection,
    CloseTransport,
    Finish(Outcome),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Step {
    pub next: SessionState,
    pub effects: Vec<Effect>,
}

impl Step {
    fn to(next: SessionState, effects: Vec<Effect>) -> Option<Self> {
        Some(Self { next, effects })
    }

    fn fail(reason: VendError, mut effects: Vec<Effect>) -> Option<Self> {
        effects.push(Effect::Finish(Outcome::Failed(reason)));
        Self::to(SessionState::Failed, effects)
    }
}

/// Computes the transition for `input` in `state`.
pub fn transition(state: SessionState, input: &Input) -> Option<Step> {
    use SessionState::*;

    match (state, input) {
        (Connecting, Input::Transport(TransportEvent::Connected)) => {
            Step::to(AwaitingSelection, vec![Effect::StartCountdown])
        }

        (
            Connecting | AwaitingSelection | Authorizing | Settling,
            Input::Transport(TransportEvent::Disconnected(reason)),
        ) => Step::fail((*reason).into(), vec![Effect::StopCountdown]),

        (AwaitingSelection, Input::Transport(TransportEvent::AuthRequested { amount, .. })) => {
            Step::to(
                Authorizing,
                vec![Effect::StopCountdown, Effect::RecordAuthorization(*amount)],
            )
        }

        (AwaitingSelection, Input::CountdownExpired) => Step::fail(
            VendError::SelectionTimedOut,
            vec![Effect::StopCountdown, Effect::CloseTransport],
        ),

        (AwaitingSelection, Input::Transport(TransportEvent::InvalidProduct)) => {
            Step::to(AwaitingSelection, vec![Effect::NotifyInvalidSelection])
        }

        // The device keeps its link open for as long as the session is connected.
        (
            AwaitingSelection | Authorizing | Settling,
            Input::Transport(TransportEvent::TimeoutWarning),
        ) => Step::to(state, vec![Effect::SendKeepAlive]),

        (Authorizing, Input::Approved(payload)) => {
            Step::to(Settling, vec![Effect::ForwardApproval(payload.clone())])
        }

        (Settling, Input::Transport(TransportEvent::ProcessStarted)) => Step::to(Settling, vec![]),

        (
            Settling,
            Input::Transport(TransportEvent::ProcessCompleted {
                amount,
                status,
                payload,
            }),
        ) => match status {
            ProcessStatus::Success => Step::to(
                Completed,
                vec![
                    Effect::CloseTransport,
                    Effect::Finish(Outcome::Completed {
                        amount: *amount,
                        payload: payload.clone(),
                    }),
                ],
            ),
            ProcessStatus::Failure => {
                Step::fail(VendError::SettlementFailed, vec![Effect::CloseTransport])
            }
        },

        (Connecting | AwaitingSelection | Authorizing | Settling, Input::Abandon) => Step::fail(
            VendError::Abandoned,
            vec![Effect::StopCountdown, Effect::CloseTransport],
        ),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::DisconnectReason;
    use rust_decimal_macros::dec;

    fn event(e: TransportEvent) -> Input {
        Input::Transport(e)
    }

    fn completed(status: ProcessStatus) -> Input {
        event(TransportEvent::ProcessCompleted {
            amount: dec!(1.00),
            status,
            payload: "p".to_string(),
        })
    }

    #[test]
    fn test_connected_starts_countdown() {
        let step = transition(SessionState::Connecting, &event(TransportEvent::Connected)).unwrap();
        assert_eq!(step.next, SessionState::AwaitingSelection);
        assert_eq!(step.effects, vec![Effect::StartCountdown]);
    }

    #[test]
    fn test_auth_request_stops_countdown() {
        let input = event(TransportEvent::AuthRequested {
            amount: dec!(2.50),
            token: None,
        });
        let step = transition(SessionState::AwaitingSelection, &input).unwrap();
        assert_eq!(step.next, SessionState::Authorizing);
        assert_eq!(
            step.effects,
            vec![Effect::StopCountdown, Effect::RecordAuthorization(dec!(2.50))]
        );
    }

    #[test]
    fn test_disconnect_classified_in_every_active_state() {
        for state in [
            SessionState::Connecting,
            SessionState::AwaitingSelection,
            SessionState::Authorizing,
            SessionState::Settling,
        ] {
            let input = event(TransportEvent::Disconnected(DisconnectReason::ConnectionTimedOut));
            let step = transition(state, &input).unwrap();
            assert_eq!(step.next, SessionState::Failed);
            assert_eq!(
                step.effects.last(),
                Some(&Effect::Finish(Outcome::Failed(VendError::ConnectionTimedOut)))
            );
        }
    }

    #[test]
    fn test_countdown_expiry_closes_transport() {
        let step = transition(SessionState::AwaitingSelection, &Input::CountdownExpired).unwrap();
        assert_eq!(step.next, SessionState::Failed);
        assert!(step.effects.contains(&Effect::CloseTransport));
        assert!(
            step.effects
                .contains(&Effect::Finish(Outcome::Failed(VendError::SelectionTimedOut)))
        );
    }

    #[test]
    fn test_non_fatal_events_keep_state() {
        let step =
            transition(SessionState::AwaitingSelection, &event(TransportEvent::InvalidProduct))
                .unwrap();
        assert_eq!(step.next, SessionState::AwaitingSelection);
        assert_eq!(step.effects, vec![Effect::NotifyInvalidSelection]);

        let step =
            transition(SessionState::AwaitingSelection, &event(TransportEvent::TimeoutWarning))
                .unwrap();
        assert_eq!(step.next, SessionState::AwaitingSelection);
        assert_eq!(step.effects, vec![Effect::SendKeepAlive]);
    }

    #[test]
    fn test_keep_alive_while_waiting_for_settlement() {
        for state in [SessionState::Authorizing, SessionState::Settling] {
            let step = transition(state, &event(TransportEvent::TimeoutWarning)).unwrap();
            assert_eq!(step.next, state);
            assert_eq!(step.effects, vec![Effect::SendKeepAlive]);
        }

        assert_eq!(
            transition(SessionState::Connecting, &event(TransportEvent::TimeoutWarning)),
            None
        );
        assert_eq!(
            transition(SessionState::Completed, &event(TransportEvent::TimeoutWarning)),
            None
        );
    }

    #[test]
    fn test_single_approval() {
        let approve = Input::Approved("payload".to_string());
        let step = transition(SessionState::Authorizing, &approve).unwrap();
        assert_eq!(step.next, SessionState::Settling);
        assert_eq!(
            step.effects,
            vec![Effect::ForwardApproval("payload".to_string())]
        );

        assert_eq!(transition(SessionState::Settling, &approve), None);
    }

    #[test]
    fn test_settlement_classification() {
        let step = transition(SessionState::Settling, &completed(ProcessStatus::Success)).unwrap();
        assert_eq!(step.next, SessionState::Completed);

        let step = transition(SessionState::Settling, &completed(ProcessStatus::Failure)).unwrap();
        assert_eq!(step.next, SessionState::Failed);
        assert_eq!(
            step.effects.last(),
            Some(&Effect::Finish(Outcome::Failed(VendError::SettlementFailed)))
        );
    }

    #[test]
    fn test_process_completed_outside_settling_is_ignored() {
        for state in [
            SessionState::Idle,
            SessionState::Connecting,
            SessionState::AwaitingSelection,
            SessionState::Authorizing,
            SessionState::Completed,
            SessionState::Failed,
        ] {
            assert_eq!(transition(state, &completed(ProcessStatus::Success)), None);
        }
    }

    #[test]
    fn test_terminal_states_ignore_everything() {
        for state in [SessionState::Completed, SessionState::Failed] {
            assert_eq!(transition(state, &Input::Abandon), None);
            assert_eq!(
                transition(
                    state,
                    &event(TransportEvent::AuthRequested {
                        amount: dec!(1),
                        token: None
                    })
                ),
                None
            );
        }
    }

    #[test]
    fn test_abandon_from_authorizing() {
        let step = transition(SessionState::Authorizing, &Input::Abandon).unwrap();
        assert_eq!(step.next, SessionState::Failed);
        assert_eq!(
            step.effects,
            vec![
                Effect::StopCountdown,
                Effect::CloseTransport,
                Effect::Finish(Outcome::Failed(VendError::Abandoned)),
            ]
        );
    }
}
