use crate::domain::outcome::Outcome;
use crate::domain::ports::Notification;
use crate::domain::receipt::Receipt;
use crate::error::Result;
use std::io::Write;

/// Writes presenter notifications as `kind,detail` CSV rows.
///
/// ```text
/// kind,detail
/// state,connecting
/// countdown,30
/// invalid_selection,
/// outcome,completed:1.00
/// receipt,Demo Vending Machine x1 USD 1.00 **** 4567
/// ```
pub struct NotificationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> NotificationWriter<W> {
    /// Creates a writer and emits the header row.
    pub fn new(sink: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(["kind", "detail"])?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, notification: &Notification) -> Result<()> {
        let (kind, detail) = match notification {
            Notification::StateChanged(state) => ("state", state.as_str().to_string()),
            Notification::CountdownTick(remaining) => ("countdown", remaining.to_string()),
            Notification::InvalidSelection => ("invalid_selection", String::new()),
            Notification::Outcome(outcome) => ("outcome", describe(outcome)),
        };
        self.writer.write_record([kind, detail.as_str()])?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_receipt(&mut self, receipt: &Receipt) -> Result<()> {
        self.writer
            .write_record(["receipt", receipt.to_string().as_str()])?;
        self.writer.flush()?;
        Ok(())
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Completed { amount, .. } => format!("completed:{:.2}", amount),
        Outcome::Failed(error) => format!("failed:{}", error.code()),
    }
}
