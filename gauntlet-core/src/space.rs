//! Observation and action spaces.
use serde::{Deserialize, Serialize};

/// Type of an observation or action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceType {
    /// A finite set of elements indexed by `0..n`.
    Discrete,

    /// A real-valued tensor of a fixed shape.
    Continuous,
}

/// Descriptor of an observation or action space.
///
/// A discrete space of size `n` has shape `[n]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    kind: SpaceType,
    shape: Vec<usize>,
}

impl Space {
    /// A discrete space with `n` elements.
    pub fn discrete(n: usize) -> Self {
        Self {
            kind: SpaceType::Discrete,
            shape: vec![n],
        }
    }

    /// A continuous space of the given shape.
    pub fn continuous(shape: &[usize]) -> Self {
        Self {
            kind: SpaceType::Continuous,
            shape: shape.to_vec(),
        }
    }

    /// Type of the space.
    pub fn kind(&self) -> SpaceType {
        self.kind
    }

    /// Shape of the space.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements of a discrete space, or the number of scalars
    /// in an element of a continuous space.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns `true` if the space has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for discrete spaces.
    pub fn is_discrete(&self) -> bool {
        self.kind == SpaceType::Discrete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_len() {
        assert_eq!(Space::discrete(16).len(), 16);
        assert_eq!(Space::continuous(&[3, 2]).len(), 6);
        assert!(Space::discrete(4).is_discrete());
        assert!(!Space::continuous(&[4]).is_discrete());
        assert_eq!(Space::continuous(&[4]).shape(), &[4]);
    }
}
