use crate::config::WaveConfig;

/// Enemies in wave `wave` (1-based): the base count plus one per two waves.
pub fn enemies_for_wave(config: &WaveConfig, wave: u32) -> u32 {
    config.base_enemies + wave / 2
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaveState {
    /// Last wave started; 0 before the first.
    pub number: u32,
    pub in_progress: bool,
    /// Enemies the current wave will spawn in total.
    pub total: u32,
    pub spawned: u32,
    pub killed: u32,
}

impl WaveState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advances to the next wave and returns its number.
    pub fn begin_next(&mut self, config: &WaveConfig) -> u32 {
        self.number += 1;
        self.in_progress = true;
        self.total = enemies_for_wave(config, self.number);
        self.spawned = 0;
        self.killed = 0;
        self.number
    }

    pub fn record_spawn(&mut self) {
        self.spawned = (self.spawned + 1).min(self.total);
    }

    pub fn record_kill(&mut self) {
        self.killed = (self.killed + 1).min(self.spawned);
    }

    pub fn pending_spawns(&self) -> u32 {
        self.total - self.spawned
    }

    /// Enemies still to be dealt with: alive plus not yet spawned.
    pub fn remaining(&self) -> u32 {
        self.total - self.killed
    }

    /// The wave is over once everything was spawned and nothing is alive.
    pub fn is_cleared(&self, alive: usize) -> bool {
        self.in_progress && self.pending_spawns() == 0 && alive == 0
    }

    pub fn finish(&mut self) {
        self.in_progress = false;
    }
}
