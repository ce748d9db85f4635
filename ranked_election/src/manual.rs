/*!

This is the long-form manual for `ranked_election` and `rcelect`.

## Lifecycle of an election

An election goes through four phases, always in this order:

* `Registration`: participants enter as candidates (which also registers
  them as voters) or register to vote. A candidate can withdraw, and enter
  again later with fresh counters. A participant that registered to vote on
  its own cannot become a candidate.
* `Voting`: every registered voter casts exactly one ballot ranking three
  distinct, entered candidates.
* `Counting`: the votes are counted, one round per call to `count_votes`.
* `Complete`: a winner was found, or the remaining candidates are tied.

The administrator given in the `ElectionConfig` moves the election from
`Registration` to `Voting` (`begin_phase_two`) and from `Voting` to
`Counting` (`begin_phase_three`). The same transitions can be triggered by an
external scheduler: `check_upkeep(now)` tells whether more than
`upkeep_interval` seconds passed since the last transition, and
`perform_upkeep(now)` then moves the election forward.

## Counting rules

Each round looks at the active votes of the candidates still running:

1. a candidate holding strictly more than half of the active votes wins;
2. a candidate left alone wins;
3. all the candidates without any active vote are eliminated;
4. if all the remaining candidates hold the same number of votes, the count
   stops with a tie. The election does not break ties;
5. otherwise all the candidates holding the lowest number of votes are
   eliminated together;
6. every ballot held by a candidate eliminated in this round moves to the next
   choice of its voter that is still running. A ballot whose choices are all
   eliminated is exhausted and does not count anymore.

The statistics of each round (tally, eliminations, transfers, exhausted
ballots) are kept by the election and every step is also recorded as an
`ElectionEvent`.

## Scenario files

`rcelect` replays an election described in a JSON file:

```text
{
  "outputSettings": { "contestName": "Mock election" },
  "administrator": "deployer",
  "upkeepIntervalSeconds": 3600,
  "phaseAdvance": "upkeep",
  "candidates": [
    { "participant": "user1", "name": "Candidate 1" },
    { "participant": "user2", "name": "Candidate 2" },
    { "participant": "user3", "name": "Candidate 3" }
  ],
  "voters": ["user4"],
  "withdrawals": [],
  "ballots": [
    { "voter": "user1", "choices": ["user1", "user2", "user3"] },
    { "voter": "user4", "choices": ["user3", "user2", "user1"] }
  ]
}
```

Participants are either `0x`-prefixed hex addresses or labels, in which case
the address is derived from the label.

`phaseAdvance` is either `administrator` (the default) or `upkeep`, in which
case the clock is moved past the upkeep interval before each transition.

Ballots can also be read from Excel spreadsheets with the `ballotSources`
entry:

```text
"ballotSources": [
  { "provider": "xlsx", "filePath": "ballots.xlsx",
    "voterColumnIndex": 1, "firstVoteColumnIndex": 2 }
]
```

The first row is a header. Each following row holds the voter in the voter
column and the three choices starting at the first vote column. Indexes start
at 1, as in spreadsheets. The path is relative to the scenario file.

## Output

The summary is written in JSON, one entry per round with the tally and the
eliminated candidates and their transfers. If a reference summary is passed
with `--reference`, the two are compared and the differences are printed.

 */
