use crate::models::{IdeaId, CAPTCHA_FIELD};

/// Where a server-reported error message is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorTarget {
    /// Inline help block of the named form field.
    Field(String),
    /// The dedicated captcha help block.
    Captcha,
}

impl ErrorTarget {
    pub fn for_field(field: &str) -> Self {
        if field == CAPTCHA_FIELD {
            ErrorTarget::Captcha
        } else {
            ErrorTarget::Field(field.to_string())
        }
    }
}

/// A counted vote: the idea's new tally, its vote control hidden and its
/// already-voted indicator shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyUpdate {
    pub idea_id: IdeaId,
    pub tally: u64,
}

/// Presentation capabilities the vote client and the poller drive.
pub trait View {
    /// Hides error text left over from a previous attempt.
    fn clear_errors(&mut self);

    fn render_tally_update(&mut self, update: &TallyUpdate);

    fn render_field_errors(&mut self, target: &ErrorTarget, message: &str);

    /// A vote that never got a usable answer (timeout, HTTP failure).
    fn render_submission_failure(&mut self, message: &str);

    fn reset_captcha(&mut self);

    fn close_dialog(&mut self);

    /// Full reload so the page picks up the new session state.
    fn reload_page(&mut self);

    fn mark_already_voted(&mut self, idea_id: &IdeaId);

    fn has_activity_region(&self) -> bool {
        true
    }

    fn replace_activity_fragment(&mut self, html: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    ErrorsCleared,
    TallyUpdated(TallyUpdate),
    FieldErrors(ErrorTarget, String),
    SubmissionFailed(String),
    CaptchaReset,
    DialogClosed,
    PageReloaded,
    AlreadyVoted(IdeaId),
    ActivityReplaced(String),
}

/// Records every call, for asserting on what a flow displayed.
#[derive(Debug, Clone)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    pub activity_region: bool,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            activity_region: true,
        }
    }

    pub fn without_activity_region() -> Self {
        Self {
            events: Vec::new(),
            activity_region: false,
        }
    }

    pub fn count(&self, predicate: impl Fn(&ViewEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }

    /// Most recent activity fragment, if any was rendered.
    pub fn activity(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            ViewEvent::ActivityReplaced(html) => Some(html.as_str()),
            _ => None,
        })
    }
}

impl View for RecordingView {
    fn clear_errors(&mut self) {
        self.events.push(ViewEvent::ErrorsCleared);
    }

    fn render_tally_update(&mut self, update: &TallyUpdate) {
        self.events.push(ViewEvent::TallyUpdated(update.clone()));
    }

    fn render_field_errors(&mut self, target: &ErrorTarget, message: &str) {
        self.events
            .push(ViewEvent::FieldErrors(target.clone(), message.to_string()));
    }

    fn render_submission_failure(&mut self, message: &str) {
        self.events
            .push(ViewEvent::SubmissionFailed(message.to_string()));
    }

    fn reset_captcha(&mut self) {
        self.events.push(ViewEvent::CaptchaReset);
    }

    fn close_dialog(&mut self) {
        self.events.push(ViewEvent::DialogClosed);
    }

    fn reload_page(&mut self) {
        self.events.push(ViewEvent::PageReloaded);
    }

    fn mark_already_voted(&mut self, idea_id: &IdeaId) {
        self.events.push(ViewEvent::AlreadyVoted(idea_id.clone()));
    }

    fn has_activity_region(&self) -> bool {
        self.activity_region
    }

    fn replace_activity_fragment(&mut self, html: &str) {
        self.events
            .push(ViewEvent::ActivityReplaced(html.to_string()));
    }
}

/// Renders to stdout for the command line.
#[derive(Debug, Default)]
pub struct ConsoleView;

impl View for ConsoleView {
    fn clear_errors(&mut self) {}

    fn render_tally_update(&mut self, update: &TallyUpdate) {
        println!("Idea {} now has {} votes (voted)", update.idea_id, update.tally);
    }

    fn render_field_errors(&mut self, target: &ErrorTarget, message: &str) {
        match target {
            ErrorTarget::Field(field) => println!("{}: {}", field, message),
            ErrorTarget::Captcha => println!("captcha: {}", message),
        }
    }

    fn render_submission_failure(&mut self, message: &str) {
        println!("Vote not submitted: {}", message);
    }

    fn reset_captcha(&mut self) {
        println!("Captcha expired, solve a new challenge before retrying");
    }

    fn close_dialog(&mut self) {}

    fn reload_page(&mut self) {
        println!("Session updated, reload to see your votes");
    }

    fn mark_already_voted(&mut self, idea_id: &IdeaId) {
        println!("Already voted for idea {}", idea_id);
    }

    fn replace_activity_fragment(&mut self, html: &str) {
        println!("{}", html);
    }
}
