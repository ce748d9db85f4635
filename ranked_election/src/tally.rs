use log::{debug, info};
use snafu::prelude::*;
use std::collections::HashSet;

use crate::config::*;
use crate::registry::Registry;

impl Registry {
    /// Runs a single counting round.
    ///
    /// The order of the checks matters: a majority wins before any
    /// elimination, zero-vote candidates are always removed before looking
    /// for a tie or a minimum, and all the candidates sharing the minimum are
    /// eliminated together before a single redistribution pass.
    pub(crate) fn count_round(
        &mut self,
        round: RoundId,
        events: &mut Vec<ElectionEvent>,
    ) -> Result<RoundStats, ElectionError> {
        // The tally of the running candidates, in registration order.
        let tally: Vec<(Address, u64)> = self
            .running_candidates()
            .map(|c| (c.address, c.active_votes))
            .collect();
        ensure!(!tally.is_empty(), EmptyElectionSnafu {});

        let total: u64 = tally.iter().map(|(_, vc)| *vc).sum();
        info!(
            "count_round: round {} total active votes: {} tally: {:?}",
            round, total, tally
        );

        let mut stats = RoundStats {
            round,
            tally: tally.clone(),
            eliminated: Vec::new(),
            outcome: RoundOutcome::Continuing,
        };

        // Strict majority, compared without fractions.
        if let Some((cid, votes)) = tally.iter().find(|(_, vc)| 2 * *vc > total) {
            info!(
                "count_round: round {}: {} reached the threshold with {} votes",
                round, cid, votes
            );
            events.push(ElectionEvent::CandidateWinsThresholdReached {
                candidate: *cid,
                votes: *votes,
                round,
            });
            stats.outcome = RoundOutcome::Elected {
                candidate: *cid,
                reason: WinReason::Majority,
            };
            return Ok(stats);
        }

        if let [(cid, votes)] = tally.as_slice() {
            info!(
                "count_round: round {}: {} is the only candidate left",
                round, cid
            );
            events.push(ElectionEvent::CandidateWinsOnlyCandidateLeft {
                candidate: *cid,
                votes: *votes,
                round,
            });
            stats.outcome = RoundOutcome::Elected {
                candidate: *cid,
                reason: WinReason::LastCandidate,
            };
            return Ok(stats);
        }

        let survivors: Vec<(Address, u64)> =
            tally.iter().filter(|(_, vc)| *vc > 0).cloned().collect();

        // Nobody holds a vote: removing the zero-vote candidates would remove
        // everyone, so this is a tie between all of them.
        if survivors.is_empty() {
            return Ok(self.declare_tie(stats, events));
        }

        let zero_votes: Vec<Address> = tally
            .iter()
            .filter(|(_, vc)| *vc == 0)
            .map(|(cid, _)| *cid)
            .collect();
        for cid in zero_votes.iter() {
            self.eliminate(*cid);
            events.push(ElectionEvent::DeletedReceivedZeroFirstChoiceVotes {
                candidate: *cid,
                votes: 0,
                round,
            });
            stats.eliminated.push(EliminationStats {
                candidate: *cid,
                votes: 0,
                reason: EliminationReason::ZeroVotes,
                transfers: Vec::new(),
                exhausted: 0,
            });
        }
        if !zero_votes.is_empty() {
            info!(
                "count_round: round {}: eliminated without votes: {:?}",
                round, zero_votes
            );
        }

        let all_tied = survivors.windows(2).all(|w| w[0].1 == w[1].1);
        if survivors.len() >= 2 && all_tied {
            return Ok(self.declare_tie(stats, events));
        }

        if survivors.len() >= 2 {
            let min_count = survivors.iter().map(|(_, vc)| *vc).min().unwrap_or(0);
            let lowest: Vec<Address> = survivors
                .iter()
                .filter(|(_, vc)| *vc == min_count)
                .map(|(cid, _)| *cid)
                .collect();
            info!(
                "count_round: round {}: eliminating lowest vote count {}: {:?}",
                round, min_count, lowest
            );
            for cid in lowest.iter() {
                self.eliminate(*cid);
                events.push(ElectionEvent::CandidateEliminatedLowestVoteCount {
                    candidate: *cid,
                    votes: min_count,
                    round,
                });
                stats.eliminated.push(EliminationStats {
                    candidate: *cid,
                    votes: min_count,
                    reason: EliminationReason::LowestVoteCount,
                    transfers: Vec::new(),
                    exhausted: 0,
                });
            }
        }

        self.redistribute(round, &mut stats, events);
        Ok(stats)
    }

    fn declare_tie(&self, mut stats: RoundStats, events: &mut Vec<ElectionEvent>) -> RoundStats {
        info!(
            "count_round: round {}: all candidates are tied: {:?}",
            stats.round, stats.tally
        );
        events.push(ElectionEvent::AllCandidatesAreTiedAfterCount { round: stats.round });
        stats.outcome = RoundOutcome::Tied;
        stats
    }

    fn eliminate(&mut self, cid: Address) {
        if let Some(c) = self.candidate_mut(&cid) {
            c.eliminated = true;
        }
    }

    /// Moves every ballot held by a candidate eliminated in this round to the
    /// next running choice of its voter, or exhausts it.
    fn redistribute(
        &mut self,
        round: RoundId,
        stats: &mut RoundStats,
        events: &mut Vec<ElectionEvent>,
    ) {
        let just_eliminated: HashSet<Address> =
            stats.eliminated.iter().map(|es| es.candidate).collect();
        let running: HashSet<Address> = self.running_candidates().map(|c| c.address).collect();

        let mut landed: Vec<Address> = Vec::new();
        for voter in self.voters_mut() {
            let from = match voter.current_choice() {
                Some(cid) if just_eliminated.contains(&cid) => cid,
                _ => continue,
            };
            let start = voter.next_choice_index + 1;
            let next: Option<(usize, Address)> = voter
                .choices
                .iter()
                .enumerate()
                .skip(start)
                .find(|(_, cid)| running.contains(*cid))
                .map(|(idx, cid)| (idx, *cid));
            let es = stats.eliminated.iter_mut().find(|es| es.candidate == from);

            match next {
                Some((idx, to)) => {
                    voter.next_choice_index = idx;
                    if idx == start {
                        debug!(
                            "redistribute: round {}: {} moves from {} to {}",
                            round, voter.address, from, to
                        );
                        events.push(ElectionEvent::VoteTransferred {
                            from,
                            voter: voter.address,
                            to,
                            round,
                        });
                    } else {
                        debug!(
                            "redistribute: round {}: {} skips eliminated choices from {} to {}",
                            round, voter.address, from, to
                        );
                        events.push(ElectionEvent::SecondChoiceIsEliminated {
                            voter: voter.address,
                            candidate: to,
                            round,
                        });
                    }
                    if let Some(es) = es {
                        add_transfer(es, to);
                    }
                    landed.push(to);
                }
                None => {
                    debug!(
                        "redistribute: round {}: ballot of {} is exhausted",
                        round, voter.address
                    );
                    voter.next_choice_index = voter.choices.len();
                    voter.exhausted = true;
                    events.push(ElectionEvent::ExhaustedVoterChoices {
                        voter: voter.address,
                        round,
                    });
                    if let Some(es) = es {
                        es.exhausted += 1;
                    }
                }
            }
        }

        for cid in landed {
            if let Some(c) = self.candidate_mut(&cid) {
                c.active_votes += 1;
            }
        }
    }

    /// The number of ballots that do not count anymore.
    pub(crate) fn exhausted_ballots(&self) -> u64 {
        self.voters().filter(|v| v.exhausted).count() as u64
    }
}

fn add_transfer(es: &mut EliminationStats, to: Address) {
    match es.transfers.iter_mut().find(|(cid, _)| *cid == to) {
        Some((_, count)) => *count += 1,
        None => es.transfers.push((to, 1)),
    }
}
