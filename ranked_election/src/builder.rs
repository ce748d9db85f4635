pub use crate::config::*;
use crate::Election;

/// A builder for elections whose participants and ballots are known upfront.
///
/// Candidates are named, and their address is derived from their name with
/// [`Address::from_seed`]. The built election has gone through registration
/// and voting and is ready to be counted.
///
/// ```
/// pub use ranked_election::builder::Builder;
/// pub use ranked_election::{Address, ElectionConfig};
/// # use ranked_election::ElectionError;
///
/// let admin = Address::from_seed("admin");
/// let mut builder = Builder::new(&ElectionConfig::new(admin))?
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_vote_simple(["Anna", "Clara", "Bob"])?;
///
/// let mut election = builder.build()?;
/// election.count_votes()?;
/// assert_eq!(election.get_winner()?, Address::from_seed("Anna"));
///
/// # Ok::<(), ElectionError>(())
/// ```
pub struct Builder {
    pub(crate) _config: ElectionConfig,
    pub(crate) _candidates: Vec<(Address, String)>,
    pub(crate) _votes: Vec<(Address, [Address; MAX_RANKS])>,
}

impl Builder {
    pub fn new(config: &ElectionConfig) -> Result<Builder, ElectionError> {
        Ok(Builder {
            _config: config.clone(),
            _candidates: Vec::new(),
            _votes: Vec::new(),
        })
    }

    pub fn candidates(self, cands: &[String]) -> Result<Builder, ElectionError> {
        Ok(Builder {
            _config: self._config,
            _candidates: cands
                .iter()
                .map(|name| (Address::from_seed(name), name.clone()))
                .collect(),
            _votes: Vec::new(),
        })
    }

    /// Adds an anonymous ballot, ranking candidates by name.
    ///
    /// Each call registers a new voter.
    pub fn add_vote_simple(&mut self, names: [&str; MAX_RANKS]) -> Result<(), ElectionError> {
        let voter = Address::from_seed(&format!("voter-{}", self._votes.len() + 1));
        self.add_vote(voter, names.map(Address::from_seed))
    }

    /// Adds the ballot of a given voter. Candidates vote with their own address.
    pub fn add_vote(
        &mut self,
        voter: Address,
        choices: [Address; MAX_RANKS],
    ) -> Result<(), ElectionError> {
        self._votes.push((voter, choices));
        Ok(())
    }

    /// Registers everyone, casts the ballots and closes the vote.
    pub fn build(&self) -> Result<Election, ElectionError> {
        let admin = self._config.administrator;
        let now = self._config.start_time;
        let mut election = Election::new(self._config.clone());
        for (cid, name) in self._candidates.iter() {
            election.enter_candidate(*cid, name)?;
        }
        for (voter, _) in self._votes.iter() {
            if !election.is_voter(voter) {
                election.register_to_vote(*voter)?;
            }
        }
        election.begin_phase_two(admin, now)?;
        for (voter, [first, second, third]) in self._votes.iter() {
            election.vote(*voter, *first, *second, *third)?;
        }
        election.begin_phase_three(admin, now)?;
        Ok(election)
    }
}
