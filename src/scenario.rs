//! Mode selector and the canned word-problem catalogue.
//!
//! In [`Mode::Explore`] the user picks mass, force and duration freely. In
//! [`Mode::WordProblem`] a problem from the catalogue fixes the observation
//! time (which is also the simulated duration) and supplies default mass and
//! force that the user may still override.

use serde::{Deserialize, Serialize};

/// Which computation path a pass takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Free inputs, velocity chart only
    #[default]
    Explore,
    /// Canned problem, velocity and position charts plus the answer
    WordProblem,
}

impl Mode {
    /// Whether the position-vs-time chart is drawn in this mode.
    pub fn shows_position_chart(&self) -> bool {
        matches!(self, Mode::WordProblem)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Explore => "Explore",
            Mode::WordProblem => "Word problem",
        }
    }
}

/// A canned physics exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordProblem {
    /// Short identifier used on the command line (e.g. "sled")
    pub id: &'static str,
    pub title: &'static str,
    /// Problem statement shown to the student
    pub statement: &'static str,
    /// Default mass (kg)
    pub mass: f64,
    /// Default force (N)
    pub force: f64,
    /// Fixed observation time (s)
    pub observation_time: f64,
}

const CATALOGUE: &[WordProblem] = &[
    WordProblem {
        id: "sled",
        title: "Sled on ice",
        statement: "A 10 kg sled resting on frictionless ice is pulled with a constant \
                    horizontal force of 50 N. How far has it travelled after 5 seconds?",
        mass: 10.0,
        force: 50.0,
        observation_time: 5.0,
    },
    WordProblem {
        id: "cart",
        title: "Shopping cart",
        statement: "A 20 kg shopping cart starts at rest and is pushed with a steady 30 N. \
                    What distance does it cover in 4 seconds?",
        mass: 20.0,
        force: 30.0,
        observation_time: 4.0,
    },
    WordProblem {
        id: "car",
        title: "Car pulling away",
        statement: "A 1200 kg car leaves a traffic light with a net driving force of 3600 N. \
                    How far is it from the light after 8 seconds, and how fast is it going?",
        mass: 1200.0,
        force: 3600.0,
        observation_time: 8.0,
    },
    WordProblem {
        id: "rocket-sled",
        title: "Rocket sled",
        statement: "A 500 kg rocket sled fires a 10 000 N thruster from a standstill. \
                    What distance does it cover during the 3 second burn?",
        mass: 500.0,
        force: 10_000.0,
        observation_time: 3.0,
    },
];

/// All built-in word problems, in presentation order.
pub fn catalogue() -> &'static [WordProblem] {
    CATALOGUE
}

/// Look up a word problem by id (case-insensitive).
pub fn find(id: &str) -> Option<&'static WordProblem> {
    CATALOGUE.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}
