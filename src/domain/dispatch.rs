//! Dispatch mission efficiency comparator.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_MISSIONS: usize = 20;

const TIME_WEIGHT: f64 = 0.4;
const ACTIVITY_WEIGHT: f64 = 0.4;
const REWARD_WEIGHT: f64 = 0.2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub reward: Option<f64>,
    #[serde(default)]
    pub activity: Option<f64>,
    #[serde(default)]
    pub time: Option<f64>,
}

impl Mission {
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            reward: None,
            activity: None,
            time: None,
        }
    }

    pub fn new(reward: f64, activity: f64, time: f64) -> Self {
        Self {
            reward: Some(reward),
            activity: Some(activity),
            time: Some(time),
            ..Self::blank()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.reward.is_some() && self.activity.is_some() && self.time.is_some()
    }

    fn ratios(&self) -> Option<(f64, f64, f64)> {
        let (reward, activity, time) = (self.reward?, self.activity?, self.time?);
        let per_time = if time > 0.0 { reward / time } else { 0.0 };
        let per_activity = if activity > 0.0 { reward / activity } else { 0.0 };
        Some((reward, per_time, per_activity))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissionSort {
    #[default]
    #[serde(alias = "sealsPerTime")]
    RewardPerTime,
    #[serde(alias = "sealsPerActivity")]
    RewardPerActivity,
    Overall,
}

impl MissionSort {
    pub fn label(&self) -> &'static str {
        match self {
            Self::RewardPerTime => "Seals/time",
            Self::RewardPerActivity => "Seals/activity",
            Self::Overall => "Overall",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionMetrics {
    pub reward_per_time: f64,
    pub reward_per_activity: f64,
    pub overall_score: f64,
    pub rank_by_time: usize,
    pub rank_by_activity: usize,
    pub rank_by_overall: usize,
}

impl MissionMetrics {
    fn key(&self, sort: MissionSort) -> f64 {
        match sort {
            MissionSort::RewardPerTime => self.reward_per_time,
            MissionSort::RewardPerActivity => self.reward_per_activity,
            MissionSort::Overall => self.overall_score,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMission {
    #[serde(flatten)]
    pub mission: Mission,
    /// `None` for incomplete missions.
    pub metrics: Option<MissionMetrics>,
}

/// Complete missions sorted by `sort` (best first), then incomplete ones in
/// their original order.
pub fn rank_missions(missions: &[Mission], sort: MissionSort) -> Vec<RankedMission> {
    let scored: Vec<(usize, f64, f64, f64)> = missions
        .iter()
        .enumerate()
        .filter_map(|(idx, m)| m.ratios().map(|(r, t, a)| (idx, r, t, a)))
        .collect();

    let max_of = |pick: fn(&(usize, f64, f64, f64)) -> f64| {
        scored.iter().map(pick).fold(0.0_f64, f64::max)
    };
    let max_reward = max_of(|s| s.1);
    let max_per_time = max_of(|s| s.2);
    let max_per_activity = max_of(|s| s.3);
    let normalize = |value: f64, max: f64| if max > 0.0 { value / max * 100.0 } else { 0.0 };

    let mut metrics: Vec<(usize, MissionMetrics)> = scored
        .iter()
        .map(|&(idx, reward, per_time, per_activity)| {
            let overall_score = normalize(per_time, max_per_time) * TIME_WEIGHT
                + normalize(per_activity, max_per_activity) * ACTIVITY_WEIGHT
                + normalize(reward, max_reward) * REWARD_WEIGHT;
            (
                idx,
                MissionMetrics {
                    reward_per_time: per_time,
                    reward_per_activity: per_activity,
                    overall_score,
                    rank_by_time: 0,
                    rank_by_activity: 0,
                    rank_by_overall: 0,
                },
            )
        })
        .collect();

    assign_ranks(&mut metrics, MissionSort::RewardPerTime, |m, r| m.rank_by_time = r);
    assign_ranks(&mut metrics, MissionSort::RewardPerActivity, |m, r| {
        m.rank_by_activity = r
    });
    assign_ranks(&mut metrics, MissionSort::Overall, |m, r| m.rank_by_overall = r);

    metrics.sort_by(|a, b| descending(a.1.key(sort), b.1.key(sort)).then(a.0.cmp(&b.0)));

    let mut ranked: Vec<RankedMission> = metrics
        .into_iter()
        .map(|(idx, m)| RankedMission {
            mission: missions[idx].clone(),
            metrics: Some(m),
        })
        .collect();
    ranked.extend(
        missions
            .iter()
            .filter(|m| !m.is_complete())
            .map(|m| RankedMission {
                mission: m.clone(),
                metrics: None,
            }),
    );
    ranked
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// 1-based rank per criterion; ties keep input order.
fn assign_ranks(
    metrics: &mut [(usize, MissionMetrics)],
    sort: MissionSort,
    set: impl Fn(&mut MissionMetrics, usize),
) {
    let mut order: Vec<usize> = (0..metrics.len()).collect();
    order.sort_by(|&a, &b| {
        descending(metrics[a].1.key(sort), metrics[b].1.key(sort))
            .then(metrics[a].0.cmp(&metrics[b].0))
    });
    for (rank, pos) in order.into_iter().enumerate() {
        set(&mut metrics[pos].1, rank + 1);
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("mission board is full")]
    Full,
}

/// Editable list of missions, capped at [`MAX_MISSIONS`]. Never empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionBoard {
    missions: Vec<Mission>,
}

impl Default for MissionBoard {
    fn default() -> Self {
        Self {
            missions: vec![Mission::blank()],
        }
    }
}

impl MissionBoard {
    /// Keeps the first [`MAX_MISSIONS`] entries.
    pub fn from_missions(missions: Vec<Mission>) -> Self {
        let offered = missions.len();
        let mut board = Self {
            missions: Vec::with_capacity(offered.min(MAX_MISSIONS)),
        };
        for mission in missions {
            if let Err(err) = board.add(mission) {
                tracing::warn!(
                    target: "dispatch",
                    dropped = offered - MAX_MISSIONS,
                    "{err}"
                );
                break;
            }
        }
        if board.missions.is_empty() {
            return Self::default();
        }
        board
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn add(&mut self, mission: Mission) -> Result<(), BoardError> {
        if self.missions.len() >= MAX_MISSIONS {
            return Err(BoardError::Full);
        }
        self.missions.push(mission);
        Ok(())
    }

    /// Removing the last mission leaves a single blank row.
    pub fn remove(&mut self, id: Uuid) {
        if self.missions.len() > 1 {
            self.missions.retain(|m| m.id != id);
        } else {
            self.missions = vec![Mission::blank()];
        }
    }

    pub fn complete_count(&self) -> usize {
        self.missions.iter().filter(|m| m.is_complete()).count()
    }

    pub fn ranked(&self, sort: MissionSort) -> Vec<RankedMission> {
        rank_missions(&self.missions, sort)
    }
}
