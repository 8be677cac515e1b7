use crate::domain::account::BankCode;

/// Prefix shared by every per-bank outbound topic.
pub const BANK_TOPIC_PREFIX: &str = "bank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic {
    Creation,
    Confirmation,
    Unknown,
}

/// Classifies inbound topic names against the two configured channels.
#[derive(Debug, Clone)]
pub struct TopicRouter {
    creation: String,
    confirmation: String,
}

impl TopicRouter {
    pub fn new(creation: impl Into<String>, confirmation: impl Into<String>) -> Self {
        Self {
            creation: creation.into(),
            confirmation: confirmation.into(),
        }
    }

    pub fn classify(&self, topic: &str) -> InboundTopic {
        if topic == self.creation {
            InboundTopic::Creation
        } else if topic == self.confirmation {
            InboundTopic::Confirmation
        } else {
            InboundTopic::Unknown
        }
    }

    /// Topics the consumer must subscribe to.
    pub fn subscriptions(&self) -> [&str; 2] {
        [self.creation.as_str(), self.confirmation.as_str()]
    }
}

/// Outbound topic of the institution identified by `code`.
pub fn bank_topic(code: &BankCode) -> String {
    format!("{BANK_TOPIC_PREFIX}{code}")
}
