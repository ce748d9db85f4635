use clap::Parser;

/// Replays a ranked-choice election described in a scenario file and summarizes its rounds.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The scenario of the election in JSON format: participants, ballots and
    /// how the phases are closed. See the manual of the ranked_election crate for the format.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing the summary of the election in JSON format. If provided,
    /// rcelect will check that the counted summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) Where the summary of the election is written in JSON format.
    /// Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
