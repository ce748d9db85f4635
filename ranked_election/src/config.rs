// ********* Identities ***********

use snafu::prelude::*;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// The number of ranks on a ballot.
pub const MAX_RANKS: usize = 3;

pub type RoundId = u32;

/// The identity of a participant (candidate, voter or administrator).
///
/// The election never authenticates an address: it is supplied by the caller
/// of each operation, as the sender of a transaction would be.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0; 20]);

    /// Derives a stable address from a human-readable label.
    ///
    /// The address is made of the first 20 bytes of the SHA-256 digest of the label,
    /// so that scripted elections can refer to `"alice"` instead of an hex string.
    pub fn from_seed(seed: &str) -> Address {
        let digest: String = sha256::digest(seed);
        // sha256 digests are always 64 hex characters.
        decode_address(&digest[..40]).unwrap_or(Address::ZERO)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Address {
        Address(bytes)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.as_bytes()))
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Address, ParseAddressError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        decode_address(digits).context(ParseAddressSnafu { input: s })
    }
}

/// None for bad characters or a length other than 20 bytes.
fn decode_address(digits: &str) -> Option<Address> {
    let bytes: [u8; 20] = hex::decode(digits).ok()?.try_into().ok()?;
    Some(Address::from(bytes))
}

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(display("Not a 20-byte hex address: {input:?}"))]
pub struct ParseAddressError {
    input: String,
}

// ********* Registry records ***********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub address: Address,
    pub name: String,
    /// False once the candidate withdrew. The record is kept so that the
    /// address can enter again later with fresh counters.
    pub exists: bool,
    pub first_votes: u64,
    pub second_votes: u64,
    pub third_votes: u64,
    /// The continuing tally for the current counting round.
    pub active_votes: u64,
    pub eliminated: bool,
}

impl Candidate {
    pub(crate) fn new(address: Address, name: &str) -> Candidate {
        Candidate {
            address,
            name: name.to_string(),
            exists: true,
            first_votes: 0,
            second_votes: 0,
            third_votes: 0,
            active_votes: 0,
            eliminated: false,
        }
    }

    /// Still in the race: entered, not withdrawn and not eliminated.
    pub fn is_running(&self) -> bool {
        self.exists && !self.eliminated
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Voter {
    pub address: Address,
    pub registered: bool,
    /// The registration happened as a side effect of entering as a candidate.
    pub via_candidacy: bool,
    pub has_voted: bool,
    /// The ranked choices, most preferred first.
    pub choices: Vec<Address>,
    /// Index in `choices` of the candidate currently holding this ballot.
    /// Only moves forward.
    pub next_choice_index: usize,
    pub exhausted: bool,
}

impl Voter {
    pub(crate) fn new(address: Address, via_candidacy: bool) -> Voter {
        Voter {
            address,
            registered: true,
            via_candidacy,
            has_voted: false,
            choices: Vec::new(),
            next_choice_index: 0,
            exhausted: false,
        }
    }

    /// The candidate this ballot currently counts for, if any.
    pub fn current_choice(&self) -> Option<Address> {
        if !self.has_voted || self.exhausted {
            return None;
        }
        self.choices.get(self.next_choice_index).cloned()
    }
}

// ********* Phases and outcome ***********

/// The stages of an election. Transitions only go forward.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ElectionPhase {
    Registration,
    Voting,
    Counting,
    Complete,
}

impl ElectionPhase {
    /// The only phase this one may move to.
    pub fn successor(self) -> Option<ElectionPhase> {
        match self {
            ElectionPhase::Registration => Some(ElectionPhase::Voting),
            ElectionPhase::Voting => Some(ElectionPhase::Counting),
            ElectionPhase::Counting => Some(ElectionPhase::Complete),
            ElectionPhase::Complete => None,
        }
    }
}

impl Display for ElectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ElectionPhase::Registration => "registration",
            ElectionPhase::Voting => "voting",
            ElectionPhase::Counting => "counting",
            ElectionPhase::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum WinReason {
    /// Strictly more than half of the active votes.
    Majority,
    LastCandidate,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Outcome {
    Undecided,
    Winner {
        candidate: Address,
        votes: u64,
        round: RoundId,
        reason: WinReason,
    },
    /// All the remaining candidates hold the same number of votes. The count
    /// stops there and the tie has to be resolved outside of the election.
    Tied { round: RoundId },
}

// ********* Events ***********

/// Observable side effects, in the order they happened.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ElectionEvent {
    CandidateCreated {
        candidate: Address,
        name: String,
    },
    VoterRegistered {
        voter: Address,
    },
    CandidateWithdrawn {
        candidate: Address,
    },
    PhaseChanged {
        from: ElectionPhase,
        to: ElectionPhase,
    },
    Voted {
        voter: Address,
        choices: [Address; MAX_RANKS],
    },
    CandidateWinsThresholdReached {
        candidate: Address,
        votes: u64,
        round: RoundId,
    },
    CandidateWinsOnlyCandidateLeft {
        candidate: Address,
        votes: u64,
        round: RoundId,
    },
    DeletedReceivedZeroFirstChoiceVotes {
        candidate: Address,
        votes: u64,
        round: RoundId,
    },
    CandidateEliminatedLowestVoteCount {
        candidate: Address,
        votes: u64,
        round: RoundId,
    },
    /// A ballot moved from an eliminated candidate to the next choice of the voter.
    VoteTransferred {
        from: Address,
        voter: Address,
        to: Address,
        round: RoundId,
    },
    /// The next choice of the voter was already out, the ballot landed further down.
    SecondChoiceIsEliminated {
        voter: Address,
        candidate: Address,
        round: RoundId,
    },
    ExhaustedVoterChoices {
        voter: Address,
        round: RoundId,
    },
    AllCandidatesAreTiedAfterCount {
        round: RoundId,
    },
}

// ******** Round statistics *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum EliminationReason {
    ZeroVotes,
    LowestVoteCount,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub candidate: Address,
    pub votes: u64,
    pub reason: EliminationReason,
    /// Ballots moved to each candidate, in the order they were first seen.
    pub transfers: Vec<(Address, u64)>,
    pub exhausted: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RoundOutcome {
    Continuing,
    Elected {
        candidate: Address,
        reason: WinReason,
    },
    Tied,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: RoundId,
    /// The active votes of the running candidates at the start of the round,
    /// in registration order.
    pub tally: Vec<(Address, u64)>,
    pub eliminated: Vec<EliminationStats>,
    pub outcome: RoundOutcome,
}

impl RoundStats {
    pub fn exhausted(&self) -> u64 {
        self.eliminated.iter().map(|es| es.exhausted).sum()
    }
}

// ********* Errors **********

/// Errors returned by the election operations. A failed operation leaves the
/// election untouched.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ElectionError {
    #[snafu(display("Candidate {candidate} already exists"))]
    CandidateAlreadyExists { candidate: Address },

    #[snafu(display("Voter {voter} is already registered"))]
    VoterAlreadyRegistered { voter: Address },

    #[snafu(display("Candidate {candidate} does not exist"))]
    CandidateDoesNotExist { candidate: Address },

    #[snafu(display("Voter {voter} does not exist"))]
    VoterDoesNotExist { voter: Address },

    #[snafu(display("Action not allowed during {current} phase, requires {required} phase"))]
    ActionNotAllowedAtThisStage {
        current: ElectionPhase,
        required: ElectionPhase,
    },

    #[snafu(display("{caller} is not the administrator of this election"))]
    NotAdministrator { caller: Address },

    #[snafu(display("Voter {voter} has already voted"))]
    AlreadyVoted { voter: Address },

    #[snafu(display("Candidate {candidate} appears more than once in the ballot"))]
    DuplicateCandidateInBallot { candidate: Address },

    #[snafu(display("The election has no winner yet"))]
    NoWinnerYet {},

    #[snafu(display("No upkeep needed during {phase} phase ({elapsed} seconds elapsed)"))]
    UpkeepNotNeeded { phase: ElectionPhase, elapsed: u64 },

    #[snafu(display("No candidate left to count"))]
    EmptyElection {},
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionConfig {
    /// The only identity allowed to move the election to the next phase by hand.
    pub administrator: Address,
    /// Seconds that must elapse since the last transition before an upkeep
    /// moves the election forward.
    pub upkeep_interval: u64,
    /// Timestamp of the creation of the election.
    pub start_time: u64,
}

impl ElectionConfig {
    pub const DEFAULT_UPKEEP_INTERVAL: u64 = 3600;

    pub fn new(administrator: Address) -> ElectionConfig {
        ElectionConfig {
            administrator,
            upkeep_interval: ElectionConfig::DEFAULT_UPKEEP_INTERVAL,
            start_time: 0,
        }
    }
}
