/// Where the contact form is in its submission lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionEvent {
    /// A validated submission is about to be sent.
    Send,
    /// The honeypot was filled in.
    BotDetected,
    /// The relay endpoint answered with a 2xx status.
    Delivered,
    /// The relay endpoint answered with an error or could not be reached.
    Failed,
    /// The delay after a success or an error has elapsed.
    ResetElapsed,
    /// The visitor asked to send another message.
    Dismiss,
}

impl SubmissionStatus {
    /// Returns the status after `event`, or `None` if the event does not apply
    /// in the current status and must be ignored.
    ///
    /// While a submission is in flight, only its completion is accepted.
    pub fn transition(self, event: SubmissionEvent) -> Option<Self> {
        use SubmissionEvent as E;
        use SubmissionStatus as S;

        match (self, event) {
            (S::Submitting, E::Delivered) => Some(S::Success),
            (S::Submitting, E::Failed) => Some(S::Error),
            (S::Submitting, _) => None,

            (_, E::Send) => Some(S::Submitting),
            (_, E::BotDetected) => Some(S::Success),
            (_, E::Delivered | E::Failed) => None,

            (S::Success | S::Error, E::ResetElapsed | E::Dismiss) => Some(S::Idle),
            (S::Idle, E::ResetElapsed | E::Dismiss) => None,
        }
    }

    /// Whether the submit control should be disabled.
    pub fn is_busy(self) -> bool {
        self == Self::Submitting
    }
}
