use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api_client::ApiClient;
use crate::error::{ApiError, VoteError};
use crate::models::{FieldErrors, PageContext, VoteRequest, VoterFields};
use crate::view::{ErrorTarget, TallyUpdate, View};

const MISSING_CAPTCHA_MESSAGE: &str = "Please complete the captcha.";

/// How a submission was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Known voter opened the dialog; it was skipped.
    Implicit,
    /// Voter filled in and submitted the dialog form.
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Counted(TallyUpdate),
    Rejected(FieldErrors),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The dialog has to be shown and filled in.
    ShowDialog,
    /// The dialog was skipped and the vote submitted with the known identity.
    Voted(VoteOutcome),
}

/// Submits votes and reconciles the page with the server's answer.
pub struct VoteClient {
    api: ApiClient,
    context: PageContext,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a submission ends, including when its
/// future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl VoteClient {
    pub fn new(api: ApiClient, context: PageContext) -> Self {
        Self {
            api,
            context,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Marks ideas from the embedded votes-cast blob. Only applies to a known
    /// voter; returns how many ideas were marked.
    pub fn restore_votes_cast<V: View>(&self, view: &mut V) -> usize {
        if self.context.voter.is_none() {
            return 0;
        }
        let mut marked = 0;
        for idea_id in self.context.votes_cast.iter() {
            view.mark_already_voted(idea_id);
            marked += 1;
        }
        marked
    }

    /// Entry point when the vote dialog is about to open for an idea.
    pub async fn open_vote_dialog<V: View>(
        &self,
        view: &mut V,
        vote_url: &str,
    ) -> Result<DialogOutcome, VoteError> {
        let voter = match &self.context.voter {
            Some(voter) if self.context.can_vote_implicitly() => voter.clone(),
            _ => return Ok(DialogOutcome::ShowDialog),
        };

        let fields = VoterFields::new(voter.email, voter.zip);
        let outcome = self
            .submit_vote(view, vote_url, fields, Trigger::Implicit)
            .await?;
        Ok(DialogOutcome::Voted(outcome))
    }

    /// Entry point for the dialog's submit control.
    pub async fn submit_dialog<V: View>(
        &self,
        view: &mut V,
        vote_url: &str,
        fields: VoterFields,
    ) -> Result<VoteOutcome, VoteError> {
        self.submit_vote(view, vote_url, fields, Trigger::Explicit)
            .await
    }

    pub async fn submit_vote<V: View>(
        &self,
        view: &mut V,
        vote_url: &str,
        fields: VoterFields,
        trigger: Trigger,
    ) -> Result<VoteOutcome, VoteError> {
        let _guard = self.begin_submission()?;

        if trigger == Trigger::Explicit {
            view.clear_errors();
        }

        let request = match VoteRequest::build(
            fields,
            &self.context.csrf_token,
            self.context.captcha_required,
        ) {
            Ok(request) => request,
            Err(e) => {
                view.render_field_errors(&ErrorTarget::Captcha, MISSING_CAPTCHA_MESSAGE);
                return Err(e);
            }
        };

        let response = match self
            .api
            .post_vote(vote_url, &request, self.context.source.as_deref())
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(self.fail(view, e)),
        };

        if !response.is_success() {
            info!(
                "Vote rejected with status {} ({} field errors)",
                response.status,
                response.errors.len()
            );
            if response.errors.is_empty() {
                view.render_submission_failure(&format!(
                    "Vote rejected with status {}",
                    response.status
                ));
            }
            for (field, messages) in response.errors.iter() {
                view.render_field_errors(&ErrorTarget::for_field(field), &messages.join(" "));
            }
            // Tokens are single use; a retry needs a fresh challenge.
            if self.context.captcha_required {
                view.reset_captcha();
            }
            return Ok(VoteOutcome::Rejected(response.errors));
        }

        let update = match (response.id, response.tally) {
            (Some(idea_id), Some(tally)) => TallyUpdate { idea_id, tally },
            _ => {
                let e = ApiError::MalformedResponse("success without id or tally".to_string());
                return Err(self.fail(view, e));
            }
        };

        info!("Vote counted for idea {}, tally {}", update.idea_id, update.tally);
        view.render_tally_update(&update);

        if trigger == Trigger::Explicit {
            view.close_dialog();
            if self.context.voter.is_none() {
                view.reload_page();
            }
        }

        Ok(VoteOutcome::Counted(update))
    }

    fn begin_submission(&self) -> Result<InFlight<'_>, VoteError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| VoteError::SubmissionInFlight)
    }

    fn fail<V: View>(&self, view: &mut V, e: ApiError) -> VoteError {
        warn!("Vote submission failed: {}", e);
        view.render_submission_failure(&e.to_string());
        if self.context.captcha_required {
            view.reset_captcha();
        }
        VoteError::Api(e)
    }
}
