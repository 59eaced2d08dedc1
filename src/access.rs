use std::collections::HashSet;

use serde::Deserialize;

use crate::config::GuildConfig;

/// Who sent a command, and where
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: u64,
    pub channel_id: u64,
}

/// Permission class of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Creating, editing or deleting problems and test cases
    Instruct,
    /// Judging a submission against a problem
    Check,
    /// Everything else
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    teachers: HashSet<u64>,
    student_channels: HashSet<u64>,
}

impl AccessPolicy {
    pub fn new(teachers: HashSet<u64>, student_channels: HashSet<u64>) -> Self {
        Self {
            teachers,
            student_channels,
        }
    }

    pub fn is_teacher(&self, caller: &Caller) -> bool {
        self.teachers.contains(&caller.user_id)
    }

    pub fn authorize(&self, caller: &Caller, action: Action) -> Access {
        let allowed = match action {
            Action::Instruct => self.is_teacher(caller),
            Action::Check => {
                self.student_channels.contains(&caller.channel_id) || self.is_teacher(caller)
            }
            Action::Open => true,
        };

        if allowed { Access::Allow } else { Access::Deny }
    }
}

impl From<GuildConfig> for AccessPolicy {
    fn from(config: GuildConfig) -> Self {
        Self::new(config.teachers, config.student_channels)
    }
}
