//! Frozen lake grid world.
mod config;
pub use config::FrozenLakeConfig;

use anyhow::Result;
use gauntlet_core::{Env, GauntletError, Session, Space, Step};
use log::info;
use rand::Rng;

const ACTION_NAMES: [&str; 4] = ["Left", "Down", "Right", "Up"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Cell {
    fn parse(c: char) -> Option<Self> {
        match c {
            'S' => Some(Self::Start),
            'F' => Some(Self::Frozen),
            'H' => Some(Self::Hole),
            'G' => Some(Self::Goal),
            _ => None,
        }
    }

    fn symbol(&self) -> char {
        match self {
            Self::Start => 'S',
            Self::Frozen => 'F',
            Self::Hole => 'H',
            Self::Goal => 'G',
        }
    }
}

/// The frozen lake grid world.
///
/// The agent walks from `S` to `G` on a grid of frozen cells without falling
/// into a hole. Observations are cell indices `row * n_cols + col` and
/// actions are `0: left`, `1: down`, `2: right` and `3: up`. Moving against
/// an edge leaves the agent in place.
///
/// On a slippery lake the direction actually taken is drawn from the session
/// random number generator.
pub struct FrozenLake {
    config: FrozenLakeConfig,
    cells: Vec<Cell>,
    n_rows: usize,
    n_cols: usize,
    start: usize,
    pos: usize,
    last_act: Option<usize>,
}

impl FrozenLake {
    /// Number of rows of the map.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns of the map.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Index of the cell the agent stands on.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` if the episode ends on the given cell.
    pub fn is_terminal(&self, pos: usize) -> bool {
        matches!(self.cells.get(pos), Some(Cell::Hole) | Some(Cell::Goal))
    }

    /// Cell reached by moving from `pos` in direction `act`.
    fn moved(&self, pos: usize, act: usize) -> usize {
        let (row, col) = (pos / self.n_cols, pos % self.n_cols);
        let (row, col) = match act {
            0 => (row, col.saturating_sub(1)),
            1 => ((row + 1).min(self.n_rows - 1), col),
            2 => (row, (col + 1).min(self.n_cols - 1)),
            _ => (row.saturating_sub(1), col),
        };
        row * self.n_cols + col
    }

    fn parse_map(map: &[String]) -> Result<(Vec<Cell>, usize, usize, usize)> {
        let invalid = |msg: String| GauntletError::InvalidConfig(msg);
        let n_rows = map.len();
        let n_cols = map.first().map(|r| r.chars().count()).unwrap_or(0);
        if n_rows == 0 || n_cols == 0 {
            return Err(invalid("the frozen lake map is empty".into()).into());
        }

        let mut cells = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in map.iter().enumerate() {
            if row.chars().count() != n_cols {
                return Err(invalid(format!(
                    "row {} of the frozen lake map has {} cells, expected {}",
                    i,
                    row.chars().count(),
                    n_cols
                ))
                .into());
            }
            for c in row.chars() {
                let cell = Cell::parse(c)
                    .ok_or_else(|| invalid(format!("unknown cell {:?} in the frozen lake map", c)))?;
                cells.push(cell);
            }
        }

        let starts = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Start)
            .map(|(ix, _)| ix)
            .collect::<Vec<_>>();
        match starts.as_slice() {
            [start] => Ok((cells, n_rows, n_cols, *start)),
            _ => Err(invalid(format!(
                "the frozen lake map needs exactly one start cell, found {}",
                starts.len()
            ))
            .into()),
        }
    }
}

impl Env for FrozenLake {
    type Config = FrozenLakeConfig;
    type Obs = usize;
    type Act = usize;

    /// Randomness comes from the session, so the seed is unused.
    fn build(config: &Self::Config, _seed: u64) -> Result<Self> {
        let (cells, n_rows, n_cols, start) = Self::parse_map(&config.map)?;
        Ok(Self {
            config: config.clone(),
            cells,
            n_rows,
            n_cols,
            start,
            pos: start,
            last_act: None,
        })
    }

    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    fn initialize(&mut self, _session: &mut Session) {
        self.pos = self.start;
        self.last_act = None;
    }

    fn reset(&mut self, _session: &mut Session) -> Result<usize> {
        self.pos = self.start;
        self.last_act = None;
        Ok(self.pos)
    }

    fn step(&mut self, a: &usize, session: &mut Session) -> Step<Self> {
        let act = *a % 4;
        let dir = if self.config.is_slippery {
            // Intended direction or one of its two perpendiculars.
            (act + 3 + session.rng().gen_range(0..3)) % 4
        } else {
            act
        };
        self.pos = self.moved(self.pos, dir);
        self.last_act = Some(act);

        let reward = if self.cells[self.pos] == Cell::Goal {
            1.0
        } else {
            0.0
        };
        Step::new(self.pos, *a, reward, self.is_terminal(self.pos))
    }

    fn render(&mut self, _session: &mut Session) {
        if let Some(act) = self.last_act {
            info!("({})", ACTION_NAMES[act]);
        }
        for row in 0..self.n_rows {
            let line = (0..self.n_cols)
                .map(|col| {
                    let ix = row * self.n_cols + col;
                    if ix == self.pos {
                        '*'
                    } else {
                        self.cells[ix].symbol()
                    }
                })
                .collect::<String>();
            info!("{}", line);
        }
    }

    fn observation_space(&self) -> Space {
        Space::discrete(self.n_rows * self.n_cols)
    }

    fn action_space(&self) -> Space {
        Space::discrete(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::record::NullRecorder;
    use tempdir::TempDir;

    fn lake(is_slippery: bool) -> Result<FrozenLake> {
        FrozenLake::build(&FrozenLakeConfig::default().is_slippery(is_slippery), 0)
    }

    #[test]
    fn test_spaces() -> Result<()> {
        let env = lake(true)?;
        assert_eq!(env.observation_space(), Space::discrete(16));
        assert_eq!(env.action_space(), Space::discrete(4));
        assert_eq!((env.n_rows(), env.n_cols()), (4, 4));
        Ok(())
    }

    #[test]
    fn test_shortest_path_reaches_the_goal() -> Result<()> {
        let mut env = lake(false)?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        assert_eq!(env.reset(&mut session)?, 0);

        // down, down, right, down, right, right
        let path = [1, 1, 2, 1, 2, 2];
        let expected = [4, 8, 9, 13, 14, 15];
        for (i, (a, o)) in path.iter().zip(expected.iter()).enumerate() {
            let step = env.step(a, &mut session);
            assert_eq!(step.obs, *o);
            assert_eq!(step.is_terminated, i == path.len() - 1);
            assert_eq!(step.reward, if i == path.len() - 1 { 1.0 } else { 0.0 });
        }
        Ok(())
    }

    #[test]
    fn test_holes_are_terminal_without_reward() -> Result<()> {
        let mut env = lake(false)?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        env.reset(&mut session)?;
        env.step(&2, &mut session);
        let step = env.step(&1, &mut session);
        assert_eq!(step.obs, 5);
        assert!(step.is_terminated);
        assert_eq!(step.reward, 0.0);
        Ok(())
    }

    #[test]
    fn test_edges_block_moves() -> Result<()> {
        let mut env = lake(false)?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        env.reset(&mut session)?;
        assert_eq!(env.step(&0, &mut session).obs, 0);
        assert_eq!(env.step(&3, &mut session).obs, 0);
        Ok(())
    }

    #[test]
    fn test_slippery_moves_never_go_backwards() -> Result<()> {
        let mut env = lake(true)?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        let mut counts = [0usize; 16];
        for _ in 0..3000 {
            env.reset(&mut session)?;
            // From the start, "right" slips to "down" or "up".
            let step = env.step(&2, &mut session);
            counts[step.obs] += 1;
        }
        // right -> 1, down -> 4, up -> stays at 0
        assert_eq!(counts.iter().sum::<usize>(), 3000);
        for ix in [0, 1, 4] {
            assert!(counts[ix] > 850 && counts[ix] < 1150, "{:?}", counts);
        }
        Ok(())
    }

    #[test]
    fn test_render_keeps_the_state() -> Result<()> {
        let mut env = lake(false)?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        env.reset(&mut session)?;
        env.step(&2, &mut session);
        env.render(&mut session);
        assert_eq!(env.position(), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_maps_are_rejected() {
        for map in [
            vec![],
            vec!["SFF", "FG"],
            vec!["SFX", "FFG"],
            vec!["FFF", "FFG"],
            vec!["SFS", "FFG"],
        ] {
            let config = FrozenLakeConfig::default().map(&map);
            let err = FrozenLake::build(&config, 0).err();
            assert!(
                matches!(
                    err.as_ref().and_then(|e| e.downcast_ref::<GauntletError>()),
                    Some(GauntletError::InvalidConfig(_))
                ),
                "{:?}",
                map
            );
        }
    }

    #[test]
    fn test_custom_map() -> Result<()> {
        let config = FrozenLakeConfig::default()
            .map(&["FSG"])
            .is_slippery(false);
        let mut env = FrozenLake::build(&config, 0)?;
        let mut recorder = NullRecorder::default();
        let mut session = Session::new("test", 0, &mut recorder);
        assert_eq!(env.reset(&mut session)?, 1);
        let step = env.step(&2, &mut session);
        assert_eq!((step.obs, step.reward, step.is_terminated), (2, 1.0, true));
        Ok(())
    }

    #[test]
    fn test_serde_frozen_lake_config() -> Result<()> {
        let config = FrozenLakeConfig::default()
            .map(&["SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF", "FFFHFFFG"])
            .is_slippery(false);
        let dir = TempDir::new("frozen_lake_config")?;
        let path = dir.path().join("frozen_lake.yaml");
        config.save(&path)?;
        assert_eq!(FrozenLakeConfig::load(&path)?, config);
        Ok(())
    }
}
