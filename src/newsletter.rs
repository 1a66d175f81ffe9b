use std::sync::Arc;

use serde::Serialize;
use spdlog::{error, info};

use crate::error::StoreError;
use crate::store::SubscriberStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
    InvalidEmail,
    Failed,
}

impl SubscribeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubscribeOutcome::Subscribed => "You have subscribed to Outlier Alpha Ventures Newsletter",
            SubscribeOutcome::AlreadySubscribed => "You are already subscribed to our newsletter!",
            SubscribeOutcome::InvalidEmail => "Please enter a valid email address",
            SubscribeOutcome::Failed => "Something went wrong. Please try again.",
        }
    }

    pub fn is_success(&self) -> bool {
        *self == SubscribeOutcome::Subscribed
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: &'static str,
}

impl From<SubscribeOutcome> for SubscribeResponse {
    fn from(outcome: SubscribeOutcome) -> Self {
        SubscribeResponse {
            success: outcome.is_success(),
            message: outcome.message(),
        }
    }
}

pub struct Newsletter {
    store: Arc<dyn SubscriberStore>,
}

impl Newsletter {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Newsletter { store }
    }

    pub async fn subscribe(&self, email: &str) -> SubscribeOutcome {
        let email = email.trim();
        if email.is_empty() {
            return SubscribeOutcome::InvalidEmail;
        }

        match self.store.add_subscriber(email).await {
            Ok(subscriber) => {
                info!("New newsletter subscriber {}", subscriber.email);
                SubscribeOutcome::Subscribed
            }
            Err(StoreError::Duplicate { .. }) => SubscribeOutcome::AlreadySubscribed,
            Err(e) => {
                error!("Error subscribing {} to the newsletter: {}", email, e);
                SubscribeOutcome::Failed
            }
        }
    }
}
