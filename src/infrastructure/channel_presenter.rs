use crate::domain::outcome::Outcome;
use crate::domain::ports::{Notification, Presenter};
use crate::domain::session::SessionState;
use tokio::sync::mpsc::UnboundedSender;

/// Forwards every notification over a channel.
///
/// Notifications are sent in the order the controller produces them. Once the
/// receiver is dropped they are discarded.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    sender: UnboundedSender<Notification>,
}

impl ChannelPresenter {
    pub fn new(sender: UnboundedSender<Notification>) -> Self {
        Self { sender }
    }

    fn send(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

impl Presenter for ChannelPresenter {
    fn on_state_changed(&mut self, state: SessionState) {
        self.send(Notification::StateChanged(state));
    }

    fn on_countdown_tick(&mut self, remaining: u32) {
        self.send(Notification::CountdownTick(remaining));
    }

    fn on_outcome(&mut self, outcome: &Outcome) {
        self.send(Notification::Outcome(outcome.clone()));
    }

    fn on_invalid_selection(&mut self) {
        self.send(Notification::InvalidSelection);
    }
}
