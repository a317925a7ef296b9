//! Improvement request orchestration.
//!
//! Sequences one "improve this game" request:
//!
//! 0. hold the game's lock (see [`GameLocks`])
//! 1. load metadata (fatal if missing or unreadable)
//! 2. decide resume/fresh and prepare the working record
//! 3. re-protect reference files
//! 4. invoke the agent and accumulate its usage signals
//! 5. reconcile and persist the record
//! 6. type check the edited sources
//! 7. report a single `{success, message}`
//!
//! Nothing in here returns an error to the caller of [`ImprovementService::improve`];
//! every failure becomes an [`ImprovementResult`].

use chrono::Utc;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    validate_game_id, AgentConfig, AgentRequest, GameMetadata, GameSessionSummary,
    ImprovementResult, InvocationOutcome, SessionInfo, SessionPolicyConfig, VerificationOutcome,
};
use crate::domain::ports::{AgentSubstrate, MetadataStore, PostEditVerifier};
use crate::services::game_locks::GameLocks;
use crate::services::handler_registry::GameRegistry;
use crate::services::reference_guard::ReferenceGuard;
use crate::services::session_policy::SessionPolicy;
use crate::services::usage_accumulator::UsageAccumulator;

/// Longest slice of checker output echoed back in a response message.
const MAX_DIAGNOSTIC_CHARS: usize = 2_000;

/// Coordinates the metadata store, session policy, agent and verifier.
pub struct ImprovementService {
    store: Arc<dyn MetadataStore>,
    substrate: Arc<dyn AgentSubstrate>,
    verifier: Option<Arc<dyn PostEditVerifier>>,
    registry: GameRegistry,
    policy: SessionPolicy,
    locks: GameLocks,
    reference_guard: ReferenceGuard,
    agent: AgentConfig,
}

impl ImprovementService {
    /// Create a service with the given collaborators.
    ///
    /// `verifier` may be `None` to skip post-edit checks entirely.
    pub fn new(
        store: Arc<dyn MetadataStore>,
        substrate: Arc<dyn AgentSubstrate>,
        verifier: Option<Arc<dyn PostEditVerifier>>,
        registry: GameRegistry,
        policy: SessionPolicyConfig,
        agent: AgentConfig,
    ) -> Self {
        let reference_guard = ReferenceGuard::new(agent.readonly_paths.clone());
        Self {
            store,
            substrate,
            verifier,
            registry,
            policy: SessionPolicy::new(policy),
            locks: GameLocks::new(),
            reference_guard,
            agent,
        }
    }

    /// Share a lock table with other services touching the same games.
    pub fn with_locks(mut self, locks: GameLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Apply one improvement instruction to a game.
    #[instrument(skip(self, instruction))]
    pub async fn improve(&self, game_id: &str, instruction: &str) -> ImprovementResult {
        if instruction.trim().is_empty() {
            return ImprovementResult::failure("Instruction cannot be empty");
        }

        let _lock = match self
            .store
            .working_dir(game_id)
            .and_then(|dir| self.locks.try_acquire(game_id, &dir))
        {
            Ok(lock) => lock,
            Err(e @ DomainError::ImprovementInProgress(_)) => {
                warn!(error = %e, "rejecting overlapping improvement");
                return ImprovementResult::failure(e.to_string());
            }
            Err(e) => {
                warn!(error = %e, "improvement aborted before invoking agent");
                return ImprovementResult::failure(e.to_string());
            }
        };

        let (metadata, working_dir) = match self.load(game_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "improvement aborted before invoking agent");
                return ImprovementResult::failure(e.to_string());
            }
        };

        let decision = self.policy.decide(&metadata, Utc::now());
        info!(
            directive = decision.directive.as_str(),
            reason = decision.reason.code(),
            improvement_count = metadata.improvement_count,
            session_improvement_count = metadata.session_improvement_count,
            context_size = metadata.context_size,
            last_improvement_cost = metadata.last_improvement_cost,
            "session decision"
        );
        let prepared = self.policy.prepare(&metadata, &decision);

        self.reference_guard.protect(&working_dir).await;

        let request = AgentRequest::new(instruction, &working_dir)
            .with_max_turns(self.agent.max_turns)
            .with_allowed_tools(self.agent.allowed_tools.clone())
            .with_model(self.agent.model.clone())
            .with_resume(decision.directive.resume_token().map(str::to_string));

        let outcome = match self.run_agent(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "agent invocation failed; session state left unchanged");
                return ImprovementResult::failure(format!("Improvement failed: {e}"));
            }
        };

        info!(
            substrate = self.substrate.name(),
            turns = outcome.turns,
            input_tokens = outcome.input_tokens,
            output_tokens = outcome.output_tokens,
            cost_usd = outcome.cost_usd(),
            cache_read_tokens = ?outcome.last_cache_read_tokens,
            subtype = outcome.subtype.as_ref().map(|s| s.as_str()),
            "agent invocation finished"
        );

        let updated = self
            .policy
            .reconcile(&prepared, &decision, &outcome, Utc::now());
        if let Err(e) = self.store.save(game_id, &updated).await {
            error!(error = %e, "failed to persist session state");
            return ImprovementResult::failure(format!(
                "Improvement applied but session state could not be saved: {e}"
            ));
        }

        if let Err(e) = self.registry.refresh(game_id, &updated).await {
            warn!(error = %e, "handler registry not updated");
        }

        let verification = self.verify(&working_dir).await;
        ImprovementResult::success(compose_message(&outcome, verification))
    }

    /// Current session fields of a game and the decision it would get now.
    pub async fn session_info(&self, game_id: &str) -> DomainResult<SessionInfo> {
        let (metadata, _) = self.load(game_id).await?;
        let next = self.policy.decide(&metadata, Utc::now());
        Ok(SessionInfo::project(game_id, &metadata, next))
    }

    /// Session summary for every game.
    pub async fn list_with_sessions(&self) -> DomainResult<Vec<GameSessionSummary>> {
        let games = self.store.list().await?;
        Ok(games
            .iter()
            .map(|(id, metadata)| GameSessionSummary::from_metadata(id, metadata))
            .collect())
    }

    /// Create the metadata record for a newly scaffolded game.
    pub async fn register_game(&self, game_id: &str, metadata: &GameMetadata) -> DomainResult<()> {
        validate_game_id(game_id)?;
        self.store.create(game_id, metadata).await?;
        if metadata.handler.is_some() {
            self.registry.refresh(game_id, metadata).await?;
        }
        info!(game_id, "game registered");
        Ok(())
    }

    async fn load(&self, game_id: &str) -> DomainResult<(GameMetadata, std::path::PathBuf)> {
        validate_game_id(game_id)?;
        let metadata = self.store.load(game_id).await?;
        let working_dir = self.store.working_dir(game_id)?;
        Ok((metadata, working_dir))
    }

    async fn run_agent(&self, request: AgentRequest) -> DomainResult<InvocationOutcome> {
        debug!(
            resume = request.resume_token.is_some(),
            max_turns = request.max_turns,
            "invoking agent"
        );
        let mut events = self.substrate.invoke(request).await?;
        let mut usage = UsageAccumulator::new();

        while let Some(event) = events.next().await {
            let event = event?;
            trace!(kind = event.kind(), "agent event");
            usage.observe(&event);
        }

        Ok(usage.finish())
    }

    async fn verify(&self, working_dir: &Path) -> DomainResult<VerificationOutcome> {
        let Some(verifier) = &self.verifier else {
            return Ok(VerificationOutcome::Skipped);
        };

        let outcome = verifier.verify(working_dir).await;
        match &outcome {
            Ok(VerificationOutcome::Warnings { output }) => {
                warn!(verifier = verifier.name(), output = %output, "type check passed with warnings");
            }
            Ok(VerificationOutcome::Errors { error_count, .. }) => {
                warn!(verifier = verifier.name(), error_count, "type check reported errors");
            }
            Ok(_) => debug!(verifier = verifier.name(), "type check clean"),
            Err(e) => warn!(verifier = verifier.name(), error = %e, "type check could not run"),
        }
        outcome
    }
}

/// Build the user-facing message for an applied improvement.
///
/// Verification only shapes the wording; the improvement already happened.
fn compose_message(
    outcome: &InvocationOutcome,
    verification: DomainResult<VerificationOutcome>,
) -> String {
    let turn_note = if outcome.hit_max_turns() {
        " (the agent stopped at its turn limit)"
    } else {
        ""
    };

    match verification {
        Ok(VerificationOutcome::Clean | VerificationOutcome::Skipped) => {
            format!("Game improved successfully{turn_note}")
        }
        Ok(VerificationOutcome::Warnings { .. }) => {
            format!("Game improved successfully{turn_note}. TypeScript reported warnings.")
        }
        Ok(VerificationOutcome::Errors {
            error_count,
            output,
        }) => format!(
            "Game improved{turn_note}, but TypeScript errors were detected ({error_count} error(s)); \
             the game may be broken.\n{}",
            clip(&output, MAX_DIAGNOSTIC_CHARS)
        ),
        Err(DomainError::VerifierUnavailable(reason)) => {
            format!("Game improved successfully{turn_note}, but the type check could not run: {reason}")
        }
        Err(e) => format!("Game improved successfully{turn_note}, but the type check failed: {e}"),
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\u{2026}", &text[..idx]),
        None => text.to_string(),
    }
}
