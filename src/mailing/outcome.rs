use derive_getters::Getters;
use serde::Serialize;

/// Result of a batch which went through the send loop.
/// Every attempted recipient is either counted as a success or listed as a failure.
#[derive(Debug, Getters, Serialize, PartialEq, Clone, Default)]
pub struct SendOutcome {
    attempted: usize,
    succeeded: usize,
    failed_recipients: Vec<String>,
}

impl SendOutcome {
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, recipient: String) {
        self.attempted += 1;
        self.failed_recipients.push(recipient);
    }

    pub fn classify(&self) -> OutcomeClass {
        if self.succeeded == 0 {
            OutcomeClass::TotalFailure
        } else if self.failed_recipients.is_empty() {
            OutcomeClass::FullSuccess {
                sent: self.succeeded,
            }
        } else {
            OutcomeClass::PartialSuccess {
                sent: self.succeeded,
                attempted: self.attempted,
                failed_recipients: self.failed_recipients.clone(),
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum OutcomeClass {
    FullSuccess {
        sent: usize,
    },
    PartialSuccess {
        sent: usize,
        attempted: usize,
        failed_recipients: Vec<String>,
    },
    TotalFailure,
}

#[cfg(test)]
impl SendOutcome {
    pub fn new(attempted: usize, succeeded: usize, failed_recipients: Vec<String>) -> Self {
        Self {
            attempted,
            succeeded,
            failed_recipients,
        }
    }
}
