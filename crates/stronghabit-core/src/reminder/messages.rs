//! Fixed notification content: titles, tags, message pools, milestones.

use rand::Rng;

pub const REMINDER_TITLE: &str = "Workout Reminder 🏋️‍♂️";
pub const REMINDER_TAG: &str = "smart-reminder";

pub const COMPLETION_TITLE: &str = "All Exercises Complete! 🎉";
pub const COMPLETION_TAG: &str = "completion-celebration";

pub const ENCOURAGEMENT_TITLE: &str = "Ready for a Fresh Start? 🌟";
pub const ENCOURAGEMENT_TAG: &str = "encouragement";

pub const MILESTONE_TAG: &str = "streak-milestone";

// Reminder bodies. `{count}` carries the incomplete-exercise count.
const REMINDER_MESSAGES: [&str; 5] = [
    "{count} exercises waiting for you! 💪",
    "Time to crush those {count} remaining exercises! 🔥",
    "Your strength journey continues - {count} exercises to go! ⚡",
    "Ready to complete your {count} exercises? Let's go! 🚀",
    "{count} exercises left - you've got this! 💎",
];

const ENCOURAGEMENTS: [&str; 5] = [
    "Every champion has off days. Let's get back to it! 🏆",
    "Progress isn't always linear. You've got this! 💪",
    "One step back, two steps forward. Keep going! 🚀",
    "Your comeback story starts now! ⚡",
    "Consistency beats perfection. Let's restart! 🔥",
];

/// A streak milestone with its celebratory flair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub days: u32,
    pub emoji: &'static str,
    pub message: &'static str,
}

const MILESTONES: [Milestone; 6] = [
    Milestone { days: 3, emoji: "🔥", message: "You're on fire!" },
    Milestone { days: 7, emoji: "⚡", message: "One week strong!" },
    Milestone { days: 14, emoji: "💎", message: "Two weeks of dedication!" },
    Milestone { days: 30, emoji: "🏆", message: "One month champion!" },
    Milestone { days: 50, emoji: "🚀", message: "Unstoppable force!" },
    Milestone { days: 100, emoji: "👑", message: "Century club member!" },
];

/// Pick a reminder body at random and fill in the incomplete count.
pub fn reminder_message<R: Rng>(rng: &mut R, incomplete: u32) -> String {
    let template = REMINDER_MESSAGES[rng.gen_range(0..REMINDER_MESSAGES.len())];
    template.replace("{count}", &incomplete.to_string())
}

/// Pick an encouragement body at random.
pub fn encouragement_message<R: Rng>(rng: &mut R) -> String {
    ENCOURAGEMENTS[rng.gen_range(0..ENCOURAGEMENTS.len())].to_string()
}

/// Completion celebration body.
pub fn completion_message(exercises_done: usize, total_reps: u32) -> String {
    format!("Amazing! You completed {exercises_done} exercises with {total_reps} total reps!")
}

/// Milestone title, e.g. "7-Day Streak! ⚡".
pub fn milestone_title(milestone: &Milestone) -> String {
    format!("{}-Day Streak! {}", milestone.days, milestone.emoji)
}

/// The milestone matching an exact streak value, if any.
pub fn milestone_for(streak: u32) -> Option<Milestone> {
    MILESTONES.iter().copied().find(|m| m.days == streak)
}
