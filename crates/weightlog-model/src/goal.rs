// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{UserId, WeightKg};

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub user_id: UserId,
    pub goal_weight_kg: WeightKg,
    pub start_weight_kg: WeightKg,
    pub goal_set_at: DateTime<Utc>,
}

impl Goal {
    #[must_use]
    pub fn new(
        user_id: UserId,
        goal_weight_kg: WeightKg,
        start_weight_kg: WeightKg,
        goal_set_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            goal_weight_kg,
            start_weight_kg,
            goal_set_at: crate::truncate_to_millis(goal_set_at),
        }
    }

    #[must_use]
    pub fn progress(&self, latest: Option<WeightKg>) -> Option<GoalProgress> {
        latest.map(|latest| GoalProgress::compute(self.start_weight_kg, self.goal_weight_kg, latest))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalDirection {
    Lose,
    Gain,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    /// Share of the start-to-goal distance covered, clamped to `[0, 100]`.
    pub percent_complete: f64,
    pub remaining_kg: f64,
    pub direction: GoalDirection,
}

impl GoalProgress {
    #[must_use]
    pub fn compute(start: WeightKg, goal: WeightKg, latest: WeightKg) -> Self {
        let (start, goal, latest) = (start.get(), goal.get(), latest.get());
        let percent_complete = if start == goal {
            0.0
        } else {
            ((start - latest) / (start - goal) * 100.0).clamp(0.0, 100.0)
        };
        Self {
            percent_complete,
            remaining_kg: (latest - goal).abs(),
            direction: if latest > goal {
                GoalDirection::Lose
            } else {
                GoalDirection::Gain
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kg(v: f64) -> WeightKg {
        WeightKg::parse(v).expect("weight")
    }

    #[test]
    fn halfway_to_a_loss_goal() {
        let p = GoalProgress::compute(kg(90.0), kg(80.0), kg(85.0));
        assert_eq!(p.percent_complete, 50.0);
        assert_eq!(p.remaining_kg, 5.0);
        assert_eq!(p.direction, GoalDirection::Lose);
    }

    #[test]
    fn gain_goals_measure_in_the_other_direction() {
        let p = GoalProgress::compute(kg(60.0), kg(65.0), kg(61.0));
        assert_eq!(p.percent_complete, 20.0);
        assert_eq!(p.remaining_kg, 4.0);
        assert_eq!(p.direction, GoalDirection::Gain);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(GoalProgress::compute(kg(90.0), kg(80.0), kg(95.0)).percent_complete, 0.0);
        assert_eq!(GoalProgress::compute(kg(90.0), kg(80.0), kg(75.0)).percent_complete, 100.0);
    }

    #[test]
    fn start_equal_to_goal_reports_zero() {
        assert_eq!(GoalProgress::compute(kg(70.0), kg(70.0), kg(71.0)).percent_complete, 0.0);
    }
}
