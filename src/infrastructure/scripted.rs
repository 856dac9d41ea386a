use crate::domain::event::TransportEvent;
use crate::domain::ports::{DeviceTransport, SessionSink, TransportBox, TransportConnector};
use crate::domain::settings::TransportSpec;
use crate::error::TransportError;
use std::sync::{Arc, Mutex};

/// A call made against a scripted transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Open(TransportSpec),
    Connect,
    Disconnect,
    KeepAlive,
    Approve(String),
}

/// Shared record of every transport call, across all opened transports.
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl CallLog {
    fn record(&self, call: TransportCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, predicate: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }
}

/// Opens transports that only do what they are told.
///
/// Used to replay event scripts, where the script itself plays the role of
/// the device, and to observe exactly which transport calls a session makes.
/// Every transport spec is accepted, real or simulated.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConnector {
    log: CallLog,
    on_connect: Vec<TransportEvent>,
    on_approve: Vec<TransportEvent>,
    refuse: Option<TransportError>,
    fail_connect: Option<TransportError>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events every transport emits when connected.
    pub fn on_connect(mut self, events: Vec<TransportEvent>) -> Self {
        self.on_connect = events;
        self
    }

    /// Events every transport emits when an approval is forwarded.
    pub fn on_approve(mut self, events: Vec<TransportEvent>) -> Self {
        self.on_approve = events;
        self
    }

    /// Makes every `open` fail with `error`.
    pub fn refuse(mut self, error: TransportError) -> Self {
        self.refuse = Some(error);
        self
    }

    /// Opens transports whose `connect` fails with `error`.
    pub fn fail_connect(mut self, error: TransportError) -> Self {
        self.fail_connect = Some(error);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl TransportConnector for ScriptedConnector {
    fn open(
        &mut self,
        spec: &TransportSpec,
        sink: SessionSink,
    ) -> Result<TransportBox, TransportError> {
        self.log.record(TransportCall::Open(spec.clone()));
        if let Some(error) = &self.refuse {
            return Err(error.clone());
        }

        Ok(Box::new(ScriptedTransport {
            log: self.log.clone(),
            sink,
            on_connect: self.on_connect.clone(),
            on_approve: self.on_approve.clone(),
            fail_connect: self.fail_connect.clone(),
        }))
    }
}

struct ScriptedTransport {
    log: CallLog,
    sink: SessionSink,
    on_connect: Vec<TransportEvent>,
    on_approve: Vec<TransportEvent>,
    fail_connect: Option<TransportError>,
}

impl DeviceTransport for ScriptedTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.log.record(TransportCall::Connect);
        if let Some(error) = &self.fail_connect {
            return Err(error.clone());
        }
        for event in &self.on_connect {
            self.sink.emit(event.clone());
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.log.record(TransportCall::Disconnect);
    }

    fn send_keep_alive(&mut self) {
        self.log.record(TransportCall::KeepAlive);
    }

    fn approve_authorization(&mut self, payload: &str) {
        self.log.record(TransportCall::Approve(payload.to_string()));
        for event in &self.on_approve {
            self.sink.emit(event.clone());
        }
    }
}
