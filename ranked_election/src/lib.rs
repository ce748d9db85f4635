mod ballot;
pub mod builder;
mod config;
pub mod manual;
mod registry;
mod tally;

use log::{debug, info};
use snafu::prelude::*;

use crate::registry::Registry;

pub use crate::config::*;

/// A ranked-choice election, from the registration of the participants to
/// the designation of a winner.
///
/// Every operation is applied completely or not at all. Operations that
/// change the election take the identity of the caller, which is trusted as
/// given.
#[derive(Debug, Clone)]
pub struct Election {
    config: ElectionConfig,
    phase: ElectionPhase,
    last_transition: u64,
    registry: Registry,
    round: RoundId,
    outcome: Outcome,
    total_votes_at_close: u64,
    rounds: Vec<RoundStats>,
    events: Vec<ElectionEvent>,
}

impl Election {
    pub fn new(config: ElectionConfig) -> Election {
        info!(
            "Election created, administrator: {}, upkeep interval: {}s",
            config.administrator, config.upkeep_interval
        );
        Election {
            last_transition: config.start_time,
            config,
            phase: ElectionPhase::Registration,
            registry: Registry::new(),
            round: 1,
            outcome: Outcome::Undecided,
            total_votes_at_close: 0,
            rounds: Vec::new(),
            events: Vec::new(),
        }
    }

    // **** Queries ****

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub fn administrator(&self) -> Address {
        self.config.administrator
    }

    pub fn phase(&self) -> ElectionPhase {
        self.phase
    }

    /// Timestamp of the last phase change (or of the creation).
    pub fn last_transition(&self) -> u64 {
        self.last_transition
    }

    /// The current counting round, starting at 1.
    pub fn round(&self) -> RoundId {
        self.round
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The statistics of all the rounds counted so far.
    pub fn rounds(&self) -> &[RoundStats] {
        &self.rounds
    }

    pub fn events(&self) -> &[ElectionEvent] {
        &self.events
    }

    /// Removes and returns the events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<ElectionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn candidate(&self, address: &Address) -> Result<&Candidate, ElectionError> {
        self.registry
            .candidate(address)
            .context(CandidateDoesNotExistSnafu {
                candidate: *address,
            })
    }

    pub fn voter(&self, address: &Address) -> Result<&Voter, ElectionError> {
        self.registry
            .voter(address)
            .context(VoterDoesNotExistSnafu { voter: *address })
    }

    pub fn is_candidate(&self, address: &Address) -> bool {
        self.registry.candidate(address).is_some()
    }

    pub fn is_voter(&self, address: &Address) -> bool {
        self.registry.voter(address).is_some()
    }

    /// The entered candidates, in registration order.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.registry.candidates()
    }

    pub fn number_of_candidates(&self) -> usize {
        self.registry.number_of_candidates()
    }

    pub fn number_of_voters(&self) -> usize {
        self.registry.number_of_voters()
    }

    pub fn number_of_voters_voted(&self) -> u64 {
        self.registry.number_of_voters_voted()
    }

    /// The active votes when the voting phase closed.
    pub fn total_votes_at_close(&self) -> u64 {
        self.total_votes_at_close
    }

    pub fn exhausted_ballots(&self) -> u64 {
        self.registry.exhausted_ballots()
    }

    // **** Registration ****

    pub fn enter_candidate(&mut self, caller: Address, name: &str) -> Result<(), ElectionError> {
        self.require_phase(ElectionPhase::Registration)?;
        let new_voter = self.registry.enter_candidate(caller, name)?;
        info!("enter_candidate: {} entered as {:?}", caller, name);
        self.events.push(ElectionEvent::CandidateCreated {
            candidate: caller,
            name: name.to_string(),
        });
        if new_voter {
            self.events
                .push(ElectionEvent::VoterRegistered { voter: caller });
        }
        Ok(())
    }

    pub fn register_to_vote(&mut self, caller: Address) -> Result<(), ElectionError> {
        self.require_phase(ElectionPhase::Registration)?;
        self.registry.register_to_vote(caller)?;
        debug!("register_to_vote: {}", caller);
        self.events
            .push(ElectionEvent::VoterRegistered { voter: caller });
        Ok(())
    }

    pub fn withdraw_candidate(&mut self, caller: Address) -> Result<(), ElectionError> {
        self.require_phase(ElectionPhase::Registration)?;
        self.registry.withdraw_candidate(caller)?;
        info!("withdraw_candidate: {}", caller);
        self.events
            .push(ElectionEvent::CandidateWithdrawn { candidate: caller });
        Ok(())
    }

    // **** Phases ****

    /// Closes the registration and opens the vote.
    pub fn begin_phase_two(&mut self, caller: Address, now: u64) -> Result<(), ElectionError> {
        self.require_administrator(caller)?;
        self.require_phase(ElectionPhase::Registration)?;
        self.advance(Some(now));
        Ok(())
    }

    /// Closes the vote and opens the count.
    pub fn begin_phase_three(&mut self, caller: Address, now: u64) -> Result<(), ElectionError> {
        self.require_administrator(caller)?;
        self.require_phase(ElectionPhase::Voting)?;
        self.advance(Some(now));
        Ok(())
    }

    /// True when enough time passed since the last transition for an
    /// automated trigger to move the election forward.
    ///
    /// Only registration and voting are closed this way: the count is driven
    /// by `count_votes`.
    pub fn check_upkeep(&self, now: u64) -> bool {
        let open = matches!(
            self.phase,
            ElectionPhase::Registration | ElectionPhase::Voting
        );
        open && now.saturating_sub(self.last_transition) > self.config.upkeep_interval
    }

    /// Moves to the next phase if `check_upkeep` allows it. Returns the new phase.
    pub fn perform_upkeep(&mut self, now: u64) -> Result<ElectionPhase, ElectionError> {
        ensure!(
            self.check_upkeep(now),
            UpkeepNotNeededSnafu {
                phase: self.phase,
                elapsed: now.saturating_sub(self.last_transition),
            }
        );
        self.advance(Some(now));
        Ok(self.phase)
    }

    // **** Voting ****

    pub fn vote(
        &mut self,
        caller: Address,
        first: Address,
        second: Address,
        third: Address,
    ) -> Result<(), ElectionError> {
        self.require_phase(ElectionPhase::Voting)?;
        let choices = [first, second, third];
        self.registry.record_ballot(caller, choices)?;
        self.events.push(ElectionEvent::Voted {
            voter: caller,
            choices,
        });
        Ok(())
    }

    // **** Counting ****

    /// Counts one round. Call again until the election is complete.
    pub fn count_votes(&mut self) -> Result<RoundStats, ElectionError> {
        self.require_phase(ElectionPhase::Counting)?;
        let stats = self.registry.count_round(self.round, &mut self.events)?;
        match stats.outcome {
            RoundOutcome::Continuing => {
                self.round += 1;
            }
            RoundOutcome::Elected { candidate, reason } => {
                let votes = stats
                    .tally
                    .iter()
                    .find(|(cid, _)| *cid == candidate)
                    .map(|(_, vc)| *vc)
                    .unwrap_or(0);
                self.outcome = Outcome::Winner {
                    candidate,
                    votes,
                    round: self.round,
                    reason,
                };
                self.advance(None);
            }
            RoundOutcome::Tied => {
                self.outcome = Outcome::Tied { round: self.round };
                self.advance(None);
            }
        }
        self.rounds.push(stats.clone());
        Ok(stats)
    }

    pub fn get_winner(&self) -> Result<Address, ElectionError> {
        match self.outcome {
            Outcome::Winner { candidate, .. } => Ok(candidate),
            _ => NoWinnerYetSnafu {}.fail(),
        }
    }

    // **** Internals ****

    fn require_phase(&self, required: ElectionPhase) -> Result<(), ElectionError> {
        ensure!(
            self.phase == required,
            ActionNotAllowedAtThisStageSnafu {
                current: self.phase,
                required,
            }
        );
        Ok(())
    }

    fn require_administrator(&self, caller: Address) -> Result<(), ElectionError> {
        ensure!(
            caller == self.config.administrator,
            NotAdministratorSnafu { caller }
        );
        Ok(())
    }

    /// The only place where the phase changes.
    fn advance(&mut self, now: Option<u64>) {
        let next = match self.phase.successor() {
            Some(next) => next,
            None => return,
        };
        if next == ElectionPhase::Counting {
            self.total_votes_at_close = self
                .registry
                .running_candidates()
                .map(|c| c.active_votes)
                .sum();
        }
        info!("Election moves from {} to {}", self.phase, next);
        self.events.push(ElectionEvent::PhaseChanged {
            from: self.phase,
            to: next,
        });
        self.phase = next;
        if let Some(now) = now {
            self.last_transition = now;
        }
    }
}
