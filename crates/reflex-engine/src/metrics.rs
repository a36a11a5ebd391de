//! Session-level aggregation over round records.
//!
//! A pure function of the completed records; the session computes it
//! exactly once, at the transition to the finished phase. Empty subsets
//! (no predator rounds, no recorded reaction times, no successful
//! escapes) default to zero rather than poisoning the result with NaN.

use reflex_types::{Role, RoundRecord, SessionResult};

/// Derive the session summary from the completed rounds, in order.
pub fn aggregate(records: &[RoundRecord]) -> SessionResult {
    let mut predator_rounds: u32 = 0;
    let mut prey_rounds: u32 = 0;
    let mut predator_wins: u32 = 0;
    let mut prey_wins: u32 = 0;
    let mut total_stimulations: u32 = 0;
    let mut total_path_length = 0.0;
    let mut reaction_sum = 0.0;
    let mut reaction_count: u32 = 0;
    let mut escape_duration_sum = 0.0;
    let mut escape_count: u32 = 0;
    let mut catch_duration_sum = 0.0;
    let mut catch_count: u32 = 0;

    for record in records {
        match record.role {
            Role::Predator => {
                predator_rounds = predator_rounds.saturating_add(1);
                if record.success {
                    predator_wins = predator_wins.saturating_add(1);
                    catch_duration_sum += record.duration_s;
                    catch_count = catch_count.saturating_add(1);
                }
            }
            Role::Prey => {
                prey_rounds = prey_rounds.saturating_add(1);
                if record.success {
                    prey_wins = prey_wins.saturating_add(1);
                    escape_duration_sum += record.duration_s;
                    escape_count = escape_count.saturating_add(1);
                }
            }
        }
        total_stimulations = total_stimulations.saturating_add(record.stimulation_count);
        total_path_length += record.path_length;
        if let Some(reaction) = record.reaction_time_s {
            reaction_sum += reaction;
            reaction_count = reaction_count.saturating_add(1);
        }
    }

    SessionResult {
        predator_rounds,
        prey_rounds,
        predator_success_rate: rate(predator_wins, predator_rounds),
        prey_success_rate: rate(prey_wins, prey_rounds),
        mean_reaction_time_s: mean(reaction_sum, reaction_count),
        total_stimulations,
        total_path_length,
        mean_escape_duration_s: mean(escape_duration_sum, escape_count),
        mean_catch_duration_s: mean(catch_duration_sum, catch_count),
        adaptation_rate: adaptation_rate(records),
    }
}

/// Relative drop in mean stimulation count from the first half of the
/// session to the second. Positive values mean the participant drew
/// fewer stimuli as the session progressed; zero when the session is
/// too short or the first half saw no stimuli.
fn adaptation_rate(records: &[RoundRecord]) -> f64 {
    if records.len() < 2 {
        return 0.0;
    }
    let (first, second) = records.split_at(records.len() / 2);
    let first_mean = mean_stimulations(first);
    let second_mean = mean_stimulations(second);
    if first_mean <= f64::EPSILON {
        return 0.0;
    }
    (first_mean - second_mean) / first_mean
}

fn mean_stimulations(records: &[RoundRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: f64 = records
        .iter()
        .map(|r| f64::from(r.stimulation_count))
        .sum();
    let count = u32::try_from(records.len()).unwrap_or(u32::MAX);
    sum / f64::from(count)
}

fn rate(wins: u32, rounds: u32) -> f64 {
    if rounds == 0 {
        0.0
    } else {
        f64::from(wins) / f64::from(rounds)
    }
}

fn mean(sum: f64, count: u32) -> f64 {
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}
