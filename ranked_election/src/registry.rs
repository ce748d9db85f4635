use log::debug;
use snafu::prelude::*;
use std::collections::HashMap;

use crate::config::*;

/// Arena of candidate and voter records, keyed by address.
///
/// Records are never removed: a withdrawn candidate keeps its slot with
/// `exists == false`, and entering again reuses the slot. Iteration follows
/// the order of first registration, which is also the order in which ballots
/// are redistributed.
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    candidates: Vec<Candidate>,
    candidate_slots: HashMap<Address, usize>,
    voters: Vec<Voter>,
    voter_slots: HashMap<Address, usize>,
    num_voted: u64,
}

impl Registry {
    pub(crate) fn new() -> Registry {
        Registry::default()
    }

    // **** Lookups ****

    /// The candidate record, only if the candidate has not withdrawn.
    pub(crate) fn candidate(&self, address: &Address) -> Option<&Candidate> {
        self.candidate_slots
            .get(address)
            .map(|idx| &self.candidates[*idx])
            .filter(|c| c.exists)
    }

    pub(crate) fn candidate_mut(&mut self, address: &Address) -> Option<&mut Candidate> {
        match self.candidate_slots.get(address) {
            Some(idx) if self.candidates[*idx].exists => Some(&mut self.candidates[*idx]),
            _ => None,
        }
    }

    pub(crate) fn voter(&self, address: &Address) -> Option<&Voter> {
        self.voter_slots
            .get(address)
            .map(|idx| &self.voters[*idx])
            .filter(|v| v.registered)
    }

    pub(crate) fn voter_mut(&mut self, address: &Address) -> Option<&mut Voter> {
        match self.voter_slots.get(address) {
            Some(idx) if self.voters[*idx].registered => Some(&mut self.voters[*idx]),
            _ => None,
        }
    }

    /// The entered candidates, in registration order.
    pub(crate) fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.exists)
    }

    /// The candidates that are neither withdrawn nor eliminated.
    pub(crate) fn running_candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_running())
    }

    pub(crate) fn voters(&self) -> impl Iterator<Item = &Voter> {
        self.voters.iter().filter(|v| v.registered)
    }

    pub(crate) fn voters_mut(&mut self) -> impl Iterator<Item = &mut Voter> {
        self.voters.iter_mut().filter(|v| v.registered)
    }

    pub(crate) fn number_of_candidates(&self) -> usize {
        self.candidates().count()
    }

    pub(crate) fn number_of_voters(&self) -> usize {
        self.voters().count()
    }

    pub(crate) fn number_of_voters_voted(&self) -> u64 {
        self.num_voted
    }

    pub(crate) fn mark_voted(&mut self) {
        self.num_voted += 1;
    }

    // **** Registration ****

    /// Enters `address` as a candidate. Returns true if the address was also
    /// registered as a new voter.
    pub(crate) fn enter_candidate(
        &mut self,
        address: Address,
        name: &str,
    ) -> Result<bool, ElectionError> {
        ensure!(
            self.candidate(&address).is_none(),
            CandidateAlreadyExistsSnafu { candidate: address }
        );
        // A voter that registered on its own cannot become a candidate. A
        // voter registered by a previous candidacy can enter again.
        let existing_voter = self.voter(&address).map(|v| v.via_candidacy);
        ensure!(
            existing_voter != Some(false),
            VoterAlreadyRegisteredSnafu { voter: address }
        );

        match self.candidate_slots.get(&address) {
            Some(idx) => {
                debug!("enter_candidate: {} reuses slot {}", address, idx);
                self.candidates[*idx] = Candidate::new(address, name);
            }
            None => {
                self.candidate_slots.insert(address, self.candidates.len());
                self.candidates.push(Candidate::new(address, name));
            }
        }

        if existing_voter.is_none() {
            self.insert_voter(address, true);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn register_to_vote(&mut self, address: Address) -> Result<(), ElectionError> {
        ensure!(
            self.voter(&address).is_none(),
            VoterAlreadyRegisteredSnafu { voter: address }
        );
        self.insert_voter(address, false);
        Ok(())
    }

    /// Withdraws the candidate. Its voter registration is kept.
    pub(crate) fn withdraw_candidate(&mut self, address: Address) -> Result<(), ElectionError> {
        let candidate = self
            .candidate_mut(&address)
            .context(CandidateDoesNotExistSnafu { candidate: address })?;
        candidate.exists = false;
        Ok(())
    }

    /// Voters are never unregistered, so a new voter always gets a new slot.
    fn insert_voter(&mut self, address: Address, via_candidacy: bool) {
        debug_assert!(!self.voter_slots.contains_key(&address));
        self.voter_slots.insert(address, self.voters.len());
        self.voters.push(Voter::new(address, via_candidacy));
    }
}
