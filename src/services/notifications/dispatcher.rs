// File: src/services/notifications/dispatcher.rs
use super::sink::{DispatchCause, NotificationSink, ReplyKeyboard};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
#[error("delivery to {recipient} failed: {cause}")]
pub struct DispatchError {
    pub recipient: String,
    #[source]
    pub cause: DispatchCause,
}

/// Per-recipient result of one [`NotificationDispatcher::send`] call.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    pub failed: Vec<DispatchError>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Best-effort fan-out. Failures are logged and reported, never raised.
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub async fn send(
        &self,
        recipients: &[String],
        text: &str,
        keyboard: Option<ReplyKeyboard>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for recipient in recipients {
            match self.sink.send_message(recipient, text, keyboard.clone()).await {
                Ok(()) => report.delivered.push(recipient.clone()),
                Err(cause) => {
                    let failure = DispatchError {
                        recipient: recipient.clone(),
                        cause,
                    };
                    error!("{}", failure);
                    report.failed.push(failure);
                }
            }
        }

        if recipients.len() > 1 {
            info!(
                "Dispatched message to {} recipients: {} delivered, {} failed",
                report.attempted(),
                report.delivered.len(),
                report.failed.len()
            );
        }

        report
    }

    pub async fn send_one(
        &self,
        recipient: &str,
        text: &str,
        keyboard: Option<ReplyKeyboard>,
    ) -> DispatchReport {
        self.send(&[recipient.to_string()], text, keyboard).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockSink;
    use mockall::Sequence;

    fn recipients(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failure_in_the_middle_does_not_stop_delivery() {
        let mut sink = MockSink::new();
        let mut seq = Sequence::new();

        sink.expect_send_message()
            .withf(|chat_id, _, _| chat_id == "1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        sink.expect_send_message()
            .withf(|chat_id, _, _| chat_id == "2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(DispatchCause::InvalidChatId));
        sink.expect_send_message()
            .withf(|chat_id, _, _| chat_id == "3")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let report = NotificationDispatcher::new(Arc::new(sink))
            .send(&recipients(&["1", "2", "3"]), "rates", None)
            .await;

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered, vec!["1".to_string(), "3".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].recipient, "2");
        assert_eq!(report.failed[0].to_string(), "delivery to 2 failed: invalid chat id");
    }

    #[tokio::test]
    async fn test_same_text_and_keyboard_for_every_recipient() {
        let mut sink = MockSink::new();
        sink.expect_send_message()
            .withf(|_, text, keyboard| {
                text == "hello" && keyboard.as_ref().map(|k| k.rows.len()) == Some(1)
            })
            .times(2)
            .returning(|_, _, _| Ok(()));

        let report = NotificationDispatcher::new(Arc::new(sink))
            .send(
                &recipients(&["10", "20"]),
                "hello",
                Some(ReplyKeyboard::single_button("ok")),
            )
            .await;

        assert_eq!(report.delivered.len(), 2);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_no_recipients_sends_nothing() {
        let mut sink = MockSink::new();
        sink.expect_send_message().never();

        let report = NotificationDispatcher::new(Arc::new(sink))
            .send(&[], "hello", None)
            .await;

        assert_eq!(report.attempted(), 0);
    }
}
