use serde::{Deserialize, Serialize};

/// The player's garden: a level that rises with experience from completed
/// habits and unlocks additional tree slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garden {
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub experience: u64,
    pub experience_required: u64,
}

impl Garden {
    pub fn new(experience_required: u64) -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_required,
        }
    }

    /// Add experience, levelling up as many times as it allows. Each level
    /// needs `increase_percent` more experience than the last, rounded to the
    /// nearest ten with ties going to the even ten. Returns the number of
    /// levels gained.
    pub fn add_experience(&mut self, amount: u64, increase_percent: u64) -> u32 {
        let mut gained = 0;
        self.experience = self.experience.saturating_add(amount);
        while self.experience_required > 0 && self.experience >= self.experience_required {
            self.experience -= self.experience_required;
            self.level = self.level.saturating_add(1);
            let increase = percent_rounded_to_tens(self.experience_required, increase_percent);
            self.experience_required = self.experience_required.saturating_add(increase);
            gained += 1;
        }
        gained
    }

    /// Number of leading slots whose level requirement is met.
    pub fn unlocked_slots(&self, slot_levels: &[u32]) -> usize {
        slot_levels
            .iter()
            .take_while(|required| self.level >= **required)
            .count()
    }
}

/// `value * percent / 100`, rounded to the nearest ten, ties to even.
fn percent_rounded_to_tens(value: u64, percent: u64) -> u64 {
    let scaled = value.saturating_mul(percent);
    let (tens, rest) = (scaled / 1000, scaled % 1000);
    let round_up = rest > 500 || (rest == 500 && tens % 2 == 1);
    (tens + u64::from(round_up)).saturating_mul(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_below_requirement_keeps_level() {
        let mut garden = Garden::new(100);
        assert_eq!(garden.add_experience(99, 50), 0);
        assert_eq!(garden.level, 1);
        assert_eq!(garden.experience, 99);
    }

    #[test]
    fn experience_carries_over_multiple_levels() {
        let mut garden = Garden::new(100);
        // 100 for level 2, then 150 for level 3, leaving 50.
        assert_eq!(garden.add_experience(300, 50), 2);
        assert_eq!(garden.level, 3);
        assert_eq!(garden.experience, 50);
        // 150 + 75 rounds to 150 + 80.
        assert_eq!(garden.experience_required, 230);
    }

    #[test]
    fn level_step_rounds_ties_to_even() {
        let mut garden = Garden::new(50);
        // 50 + 25 rounds down to 50 + 20.
        assert_eq!(garden.add_experience(50, 50), 1);
        assert_eq!(garden.level, 2);
        assert_eq!(garden.experience, 0);
        assert_eq!(garden.experience_required, 70);

        assert_eq!(percent_rounded_to_tens(70, 50), 40);
        assert_eq!(percent_rounded_to_tens(30, 50), 20);
        assert_eq!(percent_rounded_to_tens(110, 50), 60);
    }

    #[test]
    fn unlocked_slots_follow_level() {
        let mut garden = Garden::new(100);
        let levels = [1, 2, 3];
        assert_eq!(garden.unlocked_slots(&levels), 1);
        garden.level = 3;
        assert_eq!(garden.unlocked_slots(&levels), 3);
    }
}
