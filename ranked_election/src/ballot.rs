use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::registry::Registry;

impl Registry {
    /// Validates the ballot of `voter` and records it.
    ///
    /// Nothing is written before all the checks passed, so a rejected
    /// ballot leaves every counter untouched.
    pub(crate) fn record_ballot(
        &mut self,
        voter: Address,
        choices: [Address; MAX_RANKS],
    ) -> Result<(), ElectionError> {
        let v = self.voter(&voter).context(VoterDoesNotExistSnafu { voter })?;
        ensure!(!v.has_voted, AlreadyVotedSnafu { voter });

        for choice in choices.iter() {
            ensure!(
                self.candidate(choice).is_some(),
                CandidateDoesNotExistSnafu { candidate: *choice }
            );
        }
        for (idx, choice) in choices.iter().enumerate() {
            ensure!(
                !choices[..idx].contains(choice),
                DuplicateCandidateInBallotSnafu { candidate: *choice }
            );
        }

        for (rank, choice) in choices.iter().enumerate() {
            if let Some(c) = self.candidate_mut(choice) {
                match rank {
                    0 => {
                        c.first_votes += 1;
                        c.active_votes += 1;
                    }
                    1 => c.second_votes += 1,
                    _ => c.third_votes += 1,
                }
            }
        }

        if let Some(v) = self.voter_mut(&voter) {
            v.choices = choices.to_vec();
            v.next_choice_index = 0;
            v.has_voted = true;
        }
        self.mark_voted();
        debug!("record_ballot: {} -> {:?}", voter, choices);
        Ok(())
    }
}
