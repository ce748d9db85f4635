use log::{debug, info, warn};

use ranked_election::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::scenario::config_reader::*;

mod io_xlsx;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ScenarioError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Unexpected cell content at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number"))]
    ParsingJsonNumber {},
    #[snafu(display("The scenario file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Invalid participant {participant:?}"))]
    InvalidParticipant {
        source: ParseAddressError,
        participant: String,
    },
    #[snafu(display("Election step failed: {step}"))]
    ElectionStep {
        source: ElectionError,
        step: String,
    },
    #[snafu(display("No decision after {rounds} rounds"))]
    NoConvergence { rounds: usize },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

pub mod config_reader {
    use crate::scenario::*;

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct OutputSettings {
        #[serde(rename = "contestName")]
        pub contest_name: String,
        #[serde(rename = "contestDate")]
        pub contest_date: Option<String>,
        #[serde(rename = "contestJurisdiction")]
        pub contest_jurisdiction: Option<String>,
        #[serde(rename = "contestOffice")]
        pub contest_office: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct OutputConfig {
        pub contest: String,
        pub date: Option<String>,
        pub jurisdiction: Option<String>,
        pub office: Option<String>,
        pub administrator: String,
        pub winner: Option<String>,
    }

    /// How the registration and the voting phases are closed.
    #[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum PhaseAdvance {
        /// The administrator closes each phase.
        Administrator,
        /// The clock is moved past the upkeep interval and the upkeep is performed.
        Upkeep,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct ScenarioCandidate {
        pub participant: String,
        pub name: String,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct ScenarioBallot {
        pub voter: String,
        pub choices: Vec<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct FileSource {
        pub provider: String,
        #[serde(rename = "filePath")]
        pub file_path: String,
        #[serde(rename = "firstVoteColumnIndex")]
        _first_vote_column_index: Option<JSValue>,
        #[serde(rename = "voterColumnIndex")]
        _voter_column_index: Option<JSValue>,
        #[serde(rename = "worksheetName")]
        pub worksheet_name: Option<String>,
    }

    impl FileSource {
        /// Zero-based. The file uses spreadsheet conventions and starts at 1.
        pub fn first_vote_column_index(&self) -> ScenarioResult<usize> {
            let x = read_js_int(&self._first_vote_column_index)?;
            x.checked_sub(1).context(ParsingJsonNumberSnafu {})
        }

        /// Zero-based, the first column when not specified.
        pub fn voter_column_index(&self) -> ScenarioResult<usize> {
            if self._voter_column_index.is_none() {
                return Ok(0);
            }
            let x = read_js_int(&self._voter_column_index)?;
            x.checked_sub(1).context(ParsingJsonNumberSnafu {})
        }
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct ScenarioConfig {
        #[serde(rename = "outputSettings")]
        pub output_settings: OutputSettings,
        pub administrator: String,
        #[serde(rename = "upkeepIntervalSeconds")]
        pub upkeep_interval_seconds: Option<u64>,
        #[serde(rename = "startTime")]
        pub start_time: Option<u64>,
        #[serde(rename = "phaseAdvance")]
        pub phase_advance: Option<PhaseAdvance>,
        pub candidates: Vec<ScenarioCandidate>,
        #[serde(default)]
        pub voters: Vec<String>,
        #[serde(default)]
        pub withdrawals: Vec<String>,
        #[serde(default)]
        pub ballots: Vec<ScenarioBallot>,
        #[serde(rename = "ballotSources", default)]
        pub ballot_sources: Vec<FileSource>,
    }

    pub fn read_scenario(path: &str) -> ScenarioResult<ScenarioConfig> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
        debug!("read content: {:?}", contents);
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
    }

    pub fn read_summary(path: &str) -> ScenarioResult<JSValue> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
        debug!("read content: {:?}", contents);
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
    }

    fn read_js_int(x: &Option<JSValue>) -> ScenarioResult<usize> {
        match x {
            Some(JSValue::Number(n)) => n
                .as_u64()
                .map(|x| x as usize)
                .context(ParsingJsonNumberSnafu {}),
            Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
            _ => None.context(ParsingJsonNumberSnafu {}),
        }
    }
}

/// A ballot, as read from the scenario or from a spreadsheet.
/// The participants are not resolved yet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub voter: String,
    pub choices: Vec<String>,
    /// Position of the ballot in its source, for error messages.
    pub lineno: usize,
}

/// Hex addresses are taken as is, anything else is a label.
fn participant_address(participant: &str) -> ScenarioResult<Address> {
    if participant.starts_with("0x") || participant.starts_with("0X") {
        participant
            .parse::<Address>()
            .context(InvalidParticipantSnafu { participant })
    } else {
        Ok(Address::from_seed(participant))
    }
}

fn collect_ballots(config: &ScenarioConfig, root_p: &Path) -> ScenarioResult<Vec<ParsedBallot>> {
    let mut res: Vec<ParsedBallot> = config
        .ballots
        .iter()
        .enumerate()
        .map(|(idx, b)| ParsedBallot {
            voter: b.voter.clone(),
            choices: b.choices.clone(),
            lineno: idx + 1,
        })
        .collect();
    for cfs in config.ballot_sources.iter() {
        let p = root_p.join(&cfs.file_path).display().to_string();
        info!("Attempting to read ballot file {:?}", p);
        let mut file_ballots = match cfs.provider.as_str() {
            "xlsx" => io_xlsx::read_xlsx_ballots(p, cfs)?,
            x => whatever!("Provider not implemented {:?}", x),
        };
        res.append(&mut file_ballots);
    }
    Ok(res)
}

fn cast_ballot(election: &mut Election, pb: &ParsedBallot) -> ScenarioResult<()> {
    let voter = participant_address(&pb.voter)?;
    let choices: Vec<Address> = pb
        .choices
        .iter()
        .map(|c| participant_address(c))
        .collect::<ScenarioResult<Vec<Address>>>()?;
    let (first, second, third) = match choices.as_slice() {
        [first, second, third] => (*first, *second, *third),
        _ => whatever!(
            "Ballot #{} of {} has {} choices, expected {}",
            pb.lineno,
            pb.voter,
            choices.len(),
            MAX_RANKS
        ),
    };
    election
        .vote(voter, first, second, third)
        .context(ElectionStepSnafu {
            step: format!("ballot #{} of {}", pb.lineno, pb.voter),
        })
}

/// Closes the current phase, either as the administrator or through an upkeep.
fn advance_phase(election: &mut Election, mode: PhaseAdvance) -> ScenarioResult<ElectionPhase> {
    let from = election.phase();
    match mode {
        PhaseAdvance::Administrator => {
            let admin = election.administrator();
            let now = election.last_transition();
            let res = if from == ElectionPhase::Registration {
                election.begin_phase_two(admin, now)
            } else {
                election.begin_phase_three(admin, now)
            };
            res.context(ElectionStepSnafu {
                step: format!("closing the {} phase", from),
            })?;
        }
        PhaseAdvance::Upkeep => {
            let now = match election
                .last_transition()
                .checked_add(election.config().upkeep_interval)
                .and_then(|t| t.checked_add(1))
            {
                Some(now) => now,
                None => whatever!(
                    "Upkeep interval {} cannot elapse after timestamp {}",
                    election.config().upkeep_interval,
                    election.last_transition()
                ),
            };
            debug!("advance_phase: moving the clock to {}", now);
            election.perform_upkeep(now).context(ElectionStepSnafu {
                step: format!("upkeep during the {} phase", from),
            })?;
        }
    }
    info!("Phase: {} -> {}", from, election.phase());
    Ok(election.phase())
}

/// Plays the scenario and counts the votes until the election is complete.
pub fn run_scenario_config(config: &ScenarioConfig, root_p: &Path) -> ScenarioResult<Election> {
    let administrator = participant_address(&config.administrator)?;
    let mode = config.phase_advance.unwrap_or(PhaseAdvance::Administrator);
    let mut election_config = ElectionConfig::new(administrator);
    if let Some(interval) = config.upkeep_interval_seconds {
        election_config.upkeep_interval = interval;
    }
    election_config.start_time = config.start_time.unwrap_or(0);
    let mut election = Election::new(election_config);

    for c in config.candidates.iter() {
        let cid = participant_address(&c.participant)?;
        election
            .enter_candidate(cid, &c.name)
            .context(ElectionStepSnafu {
                step: format!("candidacy of {}", c.participant),
            })?;
    }
    for v in config.voters.iter() {
        let voter = participant_address(v)?;
        election
            .register_to_vote(voter)
            .context(ElectionStepSnafu {
                step: format!("registration of {}", v),
            })?;
    }
    for w in config.withdrawals.iter() {
        let cid = participant_address(w)?;
        election
            .withdraw_candidate(cid)
            .context(ElectionStepSnafu {
                step: format!("withdrawal of {}", w),
            })?;
    }
    info!(
        "Registered {} candidates and {} voters",
        election.number_of_candidates(),
        election.number_of_voters()
    );

    advance_phase(&mut election, mode)?;

    let ballots = collect_ballots(config, root_p)?;
    info!("Processing {:?} ballots", ballots.len());
    for pb in ballots.iter() {
        cast_ballot(&mut election, pb)?;
    }

    advance_phase(&mut election, mode)?;

    // Every round that does not end the count eliminates at least one candidate.
    let max_rounds = election.number_of_candidates() + 1;
    for _ in 0..max_rounds {
        if election.phase() == ElectionPhase::Complete {
            break;
        }
        let round = election.round();
        let stats = election.count_votes().context(ElectionStepSnafu {
            step: format!("count of round {}", round),
        })?;
        info!("Round {} tally: {:?}", stats.round, stats.tally);
        for es in stats.eliminated.iter() {
            info!(
                "      {} {} -> eliminated: {:?}, {} exhausted",
                es.votes, es.candidate, es.transfers, es.exhausted
            );
        }
    }
    ensure!(
        election.phase() == ElectionPhase::Complete,
        NoConvergenceSnafu { rounds: max_rounds }
    );

    match election.outcome() {
        Outcome::Winner {
            candidate, round, ..
        } => info!("Winner: {} in round {}", candidate, round),
        Outcome::Tied { round } => warn!("All the candidates are tied in round {}", round),
        Outcome::Undecided => warn!("No outcome"),
    }
    Ok(election)
}

/// The label of each candidate in the summary: its name, made unique with
/// its address when several candidates share it.
fn display_names(election: &Election) -> HashMap<Address, String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for c in election.candidates() {
        *counts.entry(c.name.as_str()).or_insert(0) += 1;
    }
    election
        .candidates()
        .map(|c| {
            let label = if counts.get(c.name.as_str()) == Some(&1) {
                c.name.clone()
            } else {
                format!("{} ({})", c.name, c.address)
            };
            (c.address, label)
        })
        .collect()
}

fn name_of(names: &HashMap<Address, String>, cid: &Address) -> String {
    names.get(cid).cloned().unwrap_or_else(|| cid.to_string())
}

fn result_stats_to_json(election: &Election) -> Vec<JSValue> {
    let names = display_names(election);
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in election.rounds() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (cid, count) in round_stat.tally.iter() {
            tally.insert(name_of(&names, cid), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round_stat.eliminated.iter() {
            let mut transfers: JSMap<String, JSValue> = JSMap::new();
            for (cid, count) in elim_stats.transfers.iter() {
                transfers.insert(name_of(&names, cid), json!(count.to_string()));
            }
            if elim_stats.exhausted > 0 {
                transfers.insert(
                    "exhausted".to_string(),
                    json!(elim_stats.exhausted.to_string()),
                );
            }
            tally_results.push(json!({
                "eliminated": name_of(&names, &elim_stats.candidate),
                "transfers": transfers
            }));
        }
        match round_stat.outcome {
            RoundOutcome::Elected { candidate, .. } => {
                tally_results.push(json!({
                    "elected": name_of(&names, &candidate),
                    "transfers": {}
                }));
            }
            RoundOutcome::Tied => {
                let tied: Vec<String> = round_stat
                    .tally
                    .iter()
                    .filter(|(cid, _)| !round_stat.eliminated.iter().any(|es| es.candidate == *cid))
                    .map(|(cid, _)| name_of(&names, cid))
                    .collect();
                tally_results.push(json!({ "tied": tied }));
            }
            RoundOutcome::Continuing => {}
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

pub fn build_summary_js(config: &ScenarioConfig, election: &Election) -> JSValue {
    let names = display_names(election);
    let winner = election.get_winner().ok().map(|cid| name_of(&names, &cid));
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        office: config.output_settings.contest_office.clone(),
        administrator: election.administrator().to_string(),
        winner,
    };
    let outcome = match election.outcome() {
        Outcome::Winner { .. } => "winner",
        Outcome::Tied { .. } => "tied",
        Outcome::Undecided => "undecided",
    };
    json!({
        "config": c,
        "outcome": outcome,
        "results": result_stats_to_json(election) })
}

pub fn run_scenario(
    config_path: String,
    out: Option<String>,
    check_summary_path: Option<String>,
) -> ScenarioResult<()> {
    let config_p = Path::new(config_path.as_str());
    let config = read_scenario(&config_path)?;
    info!("config: {:?}", config);
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;

    let election = run_scenario_config(&config, root_p)?;

    // Assemble the final json
    let result_js = build_summary_js(&config, &election);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out.as_deref() {
        None | Some("stdout") | Some("") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            info!("Writing summary to {}", path);
            fs::write(path, &pretty_js_stats).context(WritingSummarySnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn demo_path(name: &str) -> String {
        format!("{}/demos/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn scenario(js: &str) -> ScenarioConfig {
        serde_json::from_str(js).unwrap()
    }

    fn run(config: &ScenarioConfig) -> ScenarioResult<Election> {
        run_scenario_config(config, Path::new("."))
    }

    const ROTATION: &str = r#"{
        "outputSettings": { "contestName": "Rotation" },
        "administrator": "admin",
        "candidates": [
            { "participant": "a", "name": "A" },
            { "participant": "b", "name": "B" },
            { "participant": "c", "name": "C" }
        ],
        "ballots": [
            { "voter": "a", "choices": ["a", "b", "c"] },
            { "voter": "b", "choices": ["b", "c", "a"] },
            { "voter": "c", "choices": ["c", "a", "b"] }
        ]
    }"#;

    #[test]
    fn mock_election() {
        init_logs();
        let config = read_scenario(&demo_path("mock_election.json")).unwrap();
        assert_eq!(config.phase_advance, Some(PhaseAdvance::Upkeep));
        let election = run(&config).unwrap();
        assert_eq!(election.get_winner(), Ok(Address::from_seed("user1")));
        // Two upkeeps, each one past the interval.
        assert_eq!(election.last_transition(), 2 * 3_601);

        let summary = build_summary_js(&config, &election);
        assert_eq!(summary["outcome"], "winner");
        assert_eq!(summary["config"]["winner"], "Candidate 1");
        let results = summary["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["tally"]["Candidate 1"], "2");
        assert_eq!(results[0]["tally"]["Candidate 2"], "0");
        assert_eq!(results[1]["tally"]["Candidate 1"], "3");
        assert_eq!(results[1]["tally"]["Candidate 3"], "2");

        let round_one = results[0]["tallyResults"].as_array().unwrap();
        let eliminated: Vec<&str> = round_one
            .iter()
            .filter_map(|r| r["eliminated"].as_str())
            .collect();
        assert_eq!(
            eliminated,
            vec!["Candidate 2", "Candidate 6", "Candidate 4", "Candidate 5"]
        );
        assert_eq!(round_one[2]["transfers"]["exhausted"], "1");
        assert_eq!(round_one[3]["transfers"]["Candidate 1"], "1");
        assert_eq!(results[1]["tallyResults"][0]["elected"], "Candidate 1");
    }

    #[test]
    fn spreadsheet_ballots() {
        init_logs();
        let config = read_scenario(&demo_path("mock_election.json")).unwrap();
        let from_json = run(&config).unwrap();

        let xlsx_path = demo_path("mock_election_xlsx.json");
        let xlsx_config = read_scenario(&xlsx_path).unwrap();
        let root_p = Path::new(&xlsx_path).parent().unwrap();
        let from_xlsx = run_scenario_config(&xlsx_config, root_p).unwrap();

        assert_eq!(from_xlsx.number_of_voters_voted(), 6);
        assert_eq!(from_xlsx.last_transition(), 0);
        assert_eq!(
            build_summary_js(&xlsx_config, &from_xlsx),
            build_summary_js(&config, &from_json)
        );
    }

    #[test]
    fn missing_spreadsheet() {
        let mut config = read_scenario(&demo_path("mock_election_xlsx.json")).unwrap();
        config.ballot_sources[0].file_path = "no_such_file.xlsx".to_string();
        assert!(matches!(
            run(&config),
            Err(ScenarioError::OpeningExcel { .. })
        ));

        config.ballot_sources[0].provider = "csv".to_string();
        assert!(matches!(run(&config), Err(ScenarioError::Whatever { .. })));
    }

    #[test]
    fn rotation_is_tied() {
        init_logs();
        let config = scenario(ROTATION);
        let election = run(&config).unwrap();
        let summary = build_summary_js(&config, &election);
        assert_eq!(summary["outcome"], "tied");
        assert_eq!(summary["config"]["winner"], JSValue::Null);
        assert_eq!(
            summary["results"][0]["tallyResults"][0]["tied"],
            json!(["A", "B", "C"])
        );
    }

    #[test]
    fn both_ways_of_closing_phases_agree() {
        let mut by_admin = scenario(ROTATION);
        by_admin.ballots[2].choices = vec!["a".to_string(), "c".to_string(), "b".to_string()];
        let mut by_upkeep = by_admin.clone();
        by_upkeep.phase_advance = Some(PhaseAdvance::Upkeep);
        by_upkeep.upkeep_interval_seconds = Some(60);

        let e1 = run(&by_admin).unwrap();
        let e2 = run(&by_upkeep).unwrap();
        assert_eq!(e1.get_winner(), Ok(Address::from_seed("a")));
        assert_eq!(e1.outcome(), e2.outcome());
        assert_eq!(e1.last_transition(), 0);
        assert_eq!(e2.last_transition(), 122);
    }

    #[test]
    fn upkeep_interval_beyond_the_clock() {
        let mut config = scenario(ROTATION);
        config.phase_advance = Some(PhaseAdvance::Upkeep);
        config.upkeep_interval_seconds = Some(u64::MAX);
        assert!(matches!(run(&config), Err(ScenarioError::Whatever { .. })));

        let mut config = scenario(ROTATION);
        config.phase_advance = Some(PhaseAdvance::Upkeep);
        config.start_time = Some(u64::MAX - 3_600);
        assert!(matches!(run(&config), Err(ScenarioError::Whatever { .. })));
    }

    #[test]
    fn duplicated_names_are_made_unique() {
        let mut config = scenario(ROTATION);
        for c in config.candidates.iter_mut() {
            c.name = "Test1".to_string();
        }
        let election = run(&config).unwrap();
        let summary = build_summary_js(&config, &election);
        let tally = summary["results"][0]["tally"].as_object().unwrap();
        assert_eq!(tally.len(), 3);
        let label = format!("Test1 ({})", Address::from_seed("a"));
        assert_eq!(tally[&label], "1");
    }

    #[test]
    fn hex_participants_are_accepted() {
        let hex = Address::from_seed("a").to_string();
        let mut config = scenario(ROTATION);
        config.candidates[0].participant = hex.clone();
        config.ballots[0].voter = hex;
        let election = run(&config).unwrap();
        assert!(election.is_candidate(&Address::from_seed("a")));

        config.voters = vec!["0xnothex".to_string()];
        assert!(matches!(
            run(&config),
            Err(ScenarioError::InvalidParticipant { .. })
        ));
    }

    #[test]
    fn invalid_steps_are_reported() {
        let mut config = scenario(ROTATION);
        config.ballots[0].choices.pop();
        assert!(matches!(run(&config), Err(ScenarioError::Whatever { .. })));

        let mut config = scenario(ROTATION);
        config.ballots[1].voter = "a".to_string();
        match run(&config) {
            Err(ScenarioError::ElectionStep { source, .. }) => assert_eq!(
                source,
                ElectionError::AlreadyVoted {
                    voter: Address::from_seed("a")
                }
            ),
            x => panic!("unexpected result {:?}", x.map(|e| e.outcome())),
        }

        let mut config = scenario(ROTATION);
        config.voters = vec!["a".to_string()];
        assert!(matches!(
            run(&config),
            Err(ScenarioError::ElectionStep { .. })
        ));
    }

    #[test]
    fn withdrawn_candidates_are_not_counted() {
        let config = scenario(
            r#"{
            "outputSettings": { "contestName": "Withdrawal" },
            "administrator": "admin",
            "candidates": [
                { "participant": "a", "name": "A" },
                { "participant": "b", "name": "B" },
                { "participant": "c", "name": "C" },
                { "participant": "d", "name": "D" }
            ],
            "voters": ["v"],
            "withdrawals": ["d"],
            "ballots": [
                { "voter": "a", "choices": ["a", "b", "c"] },
                { "voter": "b", "choices": ["b", "a", "c"] },
                { "voter": "v", "choices": ["a", "c", "b"] }
            ]
        }"#,
        );
        let election = run(&config).unwrap();
        assert_eq!(election.number_of_candidates(), 3);
        assert_eq!(election.number_of_voters(), 5);
        assert_eq!(election.get_winner(), Ok(Address::from_seed("a")));
        let summary = build_summary_js(&config, &election);
        assert_eq!(summary["results"][0]["tally"]["D"], JSValue::Null);
    }

    #[test]
    fn summary_matches_reference() {
        init_logs();
        let config_path = demo_path("mock_election.json");
        let dir = std::env::temp_dir();
        let out = dir.join("rcelect_mock_summary.json").display().to_string();
        run_scenario(config_path.clone(), Some(out.clone()), None).unwrap();

        // The summary just written is its own reference.
        run_scenario(config_path.clone(), Some(out.clone()), Some(out.clone())).unwrap();

        let reference = dir.join("rcelect_other_summary.json").display().to_string();
        fs::write(&reference, "{\"results\": []}").unwrap();
        assert!(run_scenario(config_path, Some(out), Some(reference)).is_err());
    }
}
