//! Level templates and enemy layouts
//!
//! Templates are read-only; every attempt gets a fresh [`Grid`] copy.

use serde::Serialize;
use thiserror::Error;

use super::enemy::{FireGate, FireRule};
use super::grid::{Grid, GridError, material::*};
use super::state::EnemyKind;

/// Visual/behavioral theme of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Theme {
    Classic,
    /// The figure floats sideways
    Swamp,
    Metal,
}

/// One enemy in a level's spawn layout
#[derive(Debug, Clone, Copy)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    /// Spawn position as fractions of the playfield
    pub x: f32,
    pub y: f32,
    /// Sprite cell size
    pub scale: f32,
    /// Per-tick velocity
    pub vx: f32,
    pub vy: f32,
    /// Finite health for heavy enemies
    pub health: Option<u32>,
}

impl EnemySpawn {
    const fn ghost(x: f32, y: f32, scale: f32, vx: f32, vy: f32) -> Self {
        Self { kind: EnemyKind::Ghost, x, y, scale, vx, vy, health: None }
    }

    const fn firefly(x: f32, y: f32, scale: f32, vx: f32, vy: f32) -> Self {
        Self { kind: EnemyKind::Firefly, x, y, scale, vx, vy, health: None }
    }

    const fn ogre(x: f32, y: f32, scale: f32, vx: f32, vy: f32, health: u32) -> Self {
        Self { kind: EnemyKind::Ogre, x, y, scale, vx, vy, health: Some(health) }
    }
}

/// Static description of a level
#[derive(Debug)]
pub struct LevelDef {
    /// 1-based level number
    pub number: u32,
    pub name: &'static str,
    pub theme: Theme,
    /// Ball integration sub-steps (4 where figure detail risks tunneling)
    pub substeps: u32,
    pub fire_rule: FireRule,
    pub fire_gate: FireGate,
    pub spawns: &'static [EnemySpawn],
    template: fn() -> Vec<Vec<u8>>,
}

impl LevelDef {
    /// Fresh working copy of this level's figure
    pub fn grid(&self) -> Result<Grid, LevelError> {
        Grid::from_rows(&(self.template)()).map_err(|source| LevelError::Template {
            level: self.number,
            source,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level {0} does not exist")]
    Unknown(u32),
    #[error("level {level} template is malformed: {source}")]
    Template {
        level: u32,
        #[source]
        source: GridError,
    },
}

/// Total number of levels
pub const LEVEL_COUNT: u32 = 7;

static LEVELS: [LevelDef; LEVEL_COUNT as usize] = [
    LevelDef {
        number: 1,
        name: "The Wizard",
        theme: Theme::Classic,
        substeps: 1,
        fire_rule: FireRule::None,
        fire_gate: FireGate::TwoBalls,
        spawns: &[
            EnemySpawn::ghost(0.15, 0.55, 2.0, 1.2, 0.8),
            EnemySpawn::ghost(0.5, 0.5, 3.0, -1.0, 0.6),
            EnemySpawn::ghost(0.8, 0.6, 4.0, 0.8, -0.7),
        ],
        template: wizard,
    },
    LevelDef {
        number: 2,
        name: "The Spider",
        theme: Theme::Classic,
        substeps: 1,
        fire_rule: FireRule::Largest,
        fire_gate: FireGate::TwoBalls,
        spawns: &[
            EnemySpawn::ghost(0.1, 0.5, 2.0, 1.4, 0.9),
            EnemySpawn::ghost(0.45, 0.6, 3.0, -1.1, 0.7),
            EnemySpawn::ghost(0.85, 0.55, 4.0, 0.9, -0.8),
        ],
        template: spider,
    },
    LevelDef {
        number: 3,
        name: "The Toad",
        theme: Theme::Classic,
        substeps: 1,
        fire_rule: FireRule::Extremes,
        fire_gate: FireGate::TwoBalls,
        spawns: &[
            EnemySpawn::firefly(0.1, 0.45, 2.0, 1.6, 1.0),
            EnemySpawn::firefly(0.35, 0.6, 2.5, -1.3, 0.9),
            EnemySpawn::firefly(0.65, 0.5, 3.0, 1.1, -1.0),
            EnemySpawn::firefly(0.9, 0.55, 3.5, -0.9, 0.8),
        ],
        template: toad,
    },
    LevelDef {
        number: 4,
        name: "The Ogre",
        theme: Theme::Classic,
        substeps: 4,
        fire_rule: FireRule::Heavy,
        fire_gate: FireGate::TwoBalls,
        spawns: &[
            EnemySpawn::ghost(0.5, 0.6, 2.0, 1.3, 0.9),
            EnemySpawn::ogre(0.15, 0.5, 4.0, 0.7, 0.5, 3),
            EnemySpawn::ogre(0.8, 0.55, 4.0, -0.7, 0.6, 3),
        ],
        template: ogre_head,
    },
    LevelDef {
        number: 5,
        name: "The Swamp Rat",
        theme: Theme::Swamp,
        substeps: 4,
        fire_rule: FireRule::All,
        fire_gate: FireGate::TwoBalls,
        spawns: &[
            EnemySpawn::firefly(0.1, 0.5, 2.0, 1.5, 1.1),
            EnemySpawn::firefly(0.9, 0.5, 2.5, -1.4, 0.9),
            EnemySpawn::ogre(0.5, 0.6, 4.5, 0.6, 0.5, 4),
        ],
        template: swamp_rat,
    },
    LevelDef {
        number: 6,
        name: "The Metal Labyrinth",
        theme: Theme::Metal,
        substeps: 4,
        fire_rule: FireRule::Largest,
        fire_gate: FireGate::Always,
        spawns: &[
            EnemySpawn::ghost(0.1, 0.6, 2.0, 1.5, 1.0),
            EnemySpawn::ghost(0.5, 0.55, 3.0, -1.2, 0.8),
            EnemySpawn::ghost(0.9, 0.6, 4.0, 1.0, -0.9),
        ],
        template: labyrinth,
    },
    LevelDef {
        number: 7,
        name: "The Bottle Labyrinth",
        theme: Theme::Metal,
        substeps: 4,
        fire_rule: FireRule::Extremes,
        fire_gate: FireGate::Always,
        spawns: &[
            EnemySpawn::ghost(0.1, 0.55, 2.0, 1.6, 1.1),
            EnemySpawn::firefly(0.4, 0.6, 2.5, -1.3, 0.9),
            EnemySpawn::ogre(0.8, 0.5, 5.0, -0.6, 0.5, 5),
        ],
        template: bottle_labyrinth,
    },
];

/// Look up a level by its 1-based number
pub fn level(number: u32) -> Result<&'static LevelDef, LevelError> {
    number
        .checked_sub(1)
        .and_then(|i| LEVELS.get(i as usize))
        .ok_or(LevelError::Unknown(number))
}

/// All levels in order
pub fn all() -> &'static [LevelDef] {
    &LEVELS
}

// ─── templates ───────────────────────────────────────────────

const WIZARD_ART: [&str; 33] = [
    ".............CCCCCCC............",
    "............CCCCCCCCC...........",
    "...........CCCCCCCCCCC..........",
    "..........CCCCCCCCCCCCC.........",
    ".........CCCCCCCCCCCCCCC........",
    "........CCCCCCCCCCCCCCCCCCC.....",
    "......CCCCCCCCCCCCCCCCCCCCCC....",
    "....CCCCCCCCCCCCCCCCCCCCCCCCC...",
    "..CCCCCCCCCCCCCCCCCCCCCCCCCCCC..",
    "..CCCCCCCCCCCCCCCCCCCCCCCCCCCC..",
    "...CCCCCCCCCCCCCCCCCCCCCCCCCC...",
    "......CSSSSSSSSSSSSSCCCCCCC.....",
    "......CSSSSSSSSSSSSSBBBCC.......",
    "......CSSKKSSSSKKSSSBBBSS.......",
    "......CSSKKSSSSKKSSSBBBSS.......",
    "......CSSSSSSSSSSSSSBBBSS.......",
    "......CSSSSSSSSSSSSSBBBCC.......",
    "......BBBBBBBBBBBBBBBBBCC.......",
    "......BBBBBBBBBBBBBBBBBCCC......",
    "..SSS.CBBBBBBBBBBBBBBBCCCCC.....",
    ".SSSSSCBBBBBBBBBBBBBCCCCCCCC....",
    ".SSSSSCCBBBBBBBBBBCCCCSSSCCC....",
    ".SSSSSCCCBBBBBBBCCCCCSSSSSCCC...",
    ".SSSSSCCCBBBBBBBCCCCCSSSSSCCC...",
    "..SSS.CCCCCCCCCCCCCCCSSSSSCCCC..",
    "......CCCCCCCCCCCCCCCCSSSCCCCC..",
    "......WWWWWKKKKKKWWWWWWCCCCCCC..",
    "......WWWWWKKKKKKWWWWWWCCCCCCC..",
    "......CCCCCKKKKKKCCCCCCCCCCCCC..",
    "......CCCCCKKKKKKCCCCCCCCCCCCC..",
    "......CCCCCKKKKKKCCCCCCC........",
    ".....WWWWWWWWWWWWWWWWWW.........",
    "....WWWWWWWWWWWWWWWWWWW.........",
];

fn wizard() -> Vec<Vec<u8>> {
    WIZARD_ART
        .iter()
        .map(|row| {
            row.bytes()
                .map(|b| match b {
                    b'C' => WIZARD_CLOAK,
                    b'B' => WIZARD_BEARD,
                    b'S' => WIZARD_SKIN,
                    b'W' => WIZARD_BROWN,
                    b'K' => WIZARD_BLACK,
                    _ => EMPTY,
                })
                .collect()
        })
        .collect()
}

/// Build a `cols` x `rows` template from a per-cell function
fn paint(cols: usize, rows: usize, f: impl Fn(i32, i32) -> u8) -> Vec<Vec<u8>> {
    (0..rows as i32)
        .map(|y| (0..cols as i32).map(|x| f(x, y)).collect())
        .collect()
}

fn spider() -> Vec<Vec<u8>> {
    paint(32, 32, |x, y| {
        let (dx, dy) = (x - 16, y - 16);
        let dist = ((dx * dx + dy * dy) as f32).sqrt();
        if dist < 3.0 {
            SPIDER_BODY_GREEN
        } else if dist < 6.0 {
            SPIDER_BODY_DARK
        } else if dist < 8.0 {
            SPIDER_BODY_LIME
        } else if (dx.abs() > 6 && dy.abs() < 2) || (dy.abs() > 6 && dx.abs() < 2) {
            SPIDER_LEGS
        } else if dx.abs() == dy.abs() && dist < 15.0 {
            SPIDER_LEGS
        } else {
            EMPTY
        }
    })
}

fn toad() -> Vec<Vec<u8>> {
    paint(32, 28, |x, y| {
        let (dx, dy) = (x as f32 - 15.5, y as f32 - 17.0);
        // Eyes bulge above the body
        for ex in [9.0f32, 22.0] {
            let (ox, oy) = (x as f32 - ex, y as f32 - 6.0);
            let d = (ox * ox + oy * oy).sqrt();
            if d < 2.0 {
                return TOAD_EYE;
            }
            if d < 4.5 {
                return TOAD_BODY;
            }
        }
        let body = (dx / 15.0).powi(2) + (dy / 10.0).powi(2);
        if body > 1.0 {
            return EMPTY;
        }
        let belly = (dx / 9.0).powi(2) + ((dy - 3.0) / 6.0).powi(2);
        if belly <= 1.0 { TOAD_BELLY } else { TOAD_BODY }
    })
}

fn ogre_head() -> Vec<Vec<u8>> {
    paint(40, 40, |x, y| {
        let (dx, dy) = (x - 20, y - 20);
        let dist = ((dx * dx + dy * dy) as f32).sqrt();
        // Ears
        if (dy - 2).abs() < 3 && dx.abs() - 16 > 0 && dx.abs() - 16 < 4 {
            return OGRE_FACE_DARK;
        }
        if (dy - 2).abs() < 5 && dx.abs() > 17 && dx.abs() < 21 {
            return OGRE_OUTLINE;
        }
        if dist >= 15.0 {
            return EMPTY;
        }
        if dist > 14.0 {
            return OGRE_OUTLINE;
        }
        // Eyes
        if (dy + 4).abs() < 2 && (dx.abs() - 6).abs() <= 2 {
            return OGRE_OUTLINE;
        }
        // Nose
        if dx.abs() < 3 && dy > -2 && dy < 3 {
            return OGRE_FACE_DARK;
        }
        // Mouth
        if dy > 6 && dy < 12 && dx.abs() < 12 {
            if dy > 8 && dy < 10 && dx.abs() < 8 {
                return OGRE_TEETH;
            }
            return OGRE_OUTLINE;
        }
        if (x + y) % 7 == 0 && dist < 12.0 {
            return OGRE_SPOT;
        }
        if dy < -6 && dx.abs() < 8 {
            return OGRE_FACE_LIGHT;
        }
        OGRE_FACE_MAIN
    })
}

fn swamp_rat() -> Vec<Vec<u8>> {
    paint(40, 24, |x, y| {
        let (fx, fy) = (x as f32, y as f32);
        // Eye and nose
        if (fx - 32.0).abs() < 1.0 && (fy - 9.0).abs() < 1.0 {
            return RAT_EYE;
        }
        if fx >= 37.0 && fx <= 38.0 && (fy - 12.0).abs() < 1.5 {
            return RAT_PINK;
        }
        // Ear
        let ear = ((fx - 28.0).powi(2) + (fy - 5.0).powi(2)).sqrt();
        if ear < 2.0 {
            return RAT_PINK;
        }
        if ear < 3.2 {
            return RAT_OUTLINE;
        }
        // Head
        let head = ((fx - 31.0) / 7.0).powi(2) + ((fy - 11.0) / 5.0).powi(2);
        if head <= 1.0 {
            return if head > 0.8 { RAT_OUTLINE } else { RAT_FUR_MID };
        }
        // Body
        let body = ((fx - 17.0) / 12.0).powi(2) + ((fy - 14.0) / 7.0).powi(2);
        if body <= 1.0 {
            if body > 0.85 {
                return RAT_OUTLINE;
            }
            if fy > 16.0 {
                return RAT_BELLY;
            }
            return if fy < 11.0 { RAT_FUR_DARK } else { RAT_FUR_MID };
        }
        // Tail curling back from the rump
        let tail_y = 18.0 + ((fx - 1.0) * 0.5).sin() * 2.0;
        if fx < 6.0 && (fy - tail_y).abs() < 0.8 {
            return RAT_PINK;
        }
        // Feet
        if (fy - 21.0).abs() < 1.0 && ((fx - 10.0).abs() < 1.5 || (fx - 24.0).abs() < 1.5) {
            return RAT_FUR_DARK;
        }
        EMPTY
    })
}

/// Metal frame with openings at the top and bottom center
fn labyrinth_frame(x: i32, y: i32) -> Option<u8> {
    let border = y <= 2 || y >= 37 || x <= 2 || x >= 37;
    if !border {
        return None;
    }
    let entrance = (17..=22).contains(&x) && (y <= 2 || y >= 37);
    Some(if entrance { EMPTY } else { METAL })
}

fn labyrinth() -> Vec<Vec<u8>> {
    paint(40, 40, |x, y| labyrinth_frame(x, y).unwrap_or(LAB_BLUE))
}

fn bottle_labyrinth() -> Vec<Vec<u8>> {
    paint(40, 40, |x, y| {
        if let Some(code) = labyrinth_frame(x, y) {
            return code;
        }
        let cap = y == 6 && (18..=22).contains(&x);
        let neck = (6..=15).contains(&y) && (x == 18 || x == 22);
        let shoulders = (15..=19).contains(&y) && (x == 18 - (y - 15) || x == 22 + (y - 15));
        let sides = (19..=34).contains(&y) && (x == 14 || x == 26);
        let bottom = y == 34 && (14..=26).contains(&x);
        if cap || neck || shoulders || sides || bottom {
            WIZARD_BLACK
        } else {
            LAB_BLUE
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::{Behavior, behavior};

    #[test]
    fn test_levels_numbered_in_order() {
        for (i, def) in all().iter().enumerate() {
            assert_eq!(def.number, i as u32 + 1);
        }
        assert_eq!(all().len(), LEVEL_COUNT as usize);
    }

    #[test]
    fn test_unknown_levels() {
        assert_eq!(level(0).unwrap_err(), LevelError::Unknown(0));
        assert_eq!(level(LEVEL_COUNT + 1).unwrap_err(), LevelError::Unknown(8));
    }

    #[test]
    fn test_every_template_is_rectangular_and_clearable() {
        for def in all() {
            let grid = def.grid().unwrap();
            assert!(!grid.is_degenerate(), "{} is empty", def.name);
            assert!(grid.remaining_destructible() > 0, "{} has nothing to break", def.name);
        }
    }

    #[test]
    fn test_wizard_dimensions() {
        let grid = level(1).unwrap().grid().unwrap();
        assert_eq!((grid.cols(), grid.rows()), (32, 33));
    }

    #[test]
    fn test_labyrinth_has_metal_border_with_entrances() {
        let grid = level(6).unwrap().grid().unwrap();
        assert_eq!(behavior(grid.get(0, 0).unwrap()), Behavior::Indestructible);
        assert_eq!(grid.get(20, 0), Some(EMPTY));
        assert_eq!(grid.get(20, 39), Some(EMPTY));
        assert_eq!(grid.get(20, 20), Some(LAB_BLUE));
    }

    #[test]
    fn test_templates_are_copied() {
        let def = level(1).unwrap();
        let mut a = def.grid().unwrap();
        let b = def.grid().unwrap();
        a.clear(13, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_every_level_has_one_spawner() {
        for def in all() {
            let field = crate::sim::Playfield::new(800.0, 600.0, 540.0);
            let world = crate::sim::World::new(def, def.grid().unwrap(), field, 1.0, 5);
            let spawners = world.enemies.iter().filter(|e| e.is_smallest).count();
            assert_eq!(spawners, 1, "{} has {} spawners", def.name, spawners);
        }
    }
}
