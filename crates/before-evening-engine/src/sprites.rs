//! Sprite sheet and background atlas coordinates
//!
//! `sprites.png` holds roadside decorations, traffic and the six player car
//! poses; `background.png` stacks the three parallax layers vertically.

/// A source rectangle inside one of the two atlas images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl SpriteRect {
    const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Footprint in road half-widths
    pub fn road_width(&self) -> f64 {
        self.w as f64 * SCALE
    }
}

pub const PALM_TREE: SpriteRect = SpriteRect::new(5, 5, 215, 540);
pub const BILLBOARD08: SpriteRect = SpriteRect::new(230, 5, 385, 265);
pub const TREE1: SpriteRect = SpriteRect::new(625, 5, 360, 360);
pub const DEAD_TREE1: SpriteRect = SpriteRect::new(5, 555, 135, 332);
pub const BILLBOARD09: SpriteRect = SpriteRect::new(150, 555, 328, 282);
pub const BOULDER3: SpriteRect = SpriteRect::new(230, 280, 320, 220);
pub const COLUMN: SpriteRect = SpriteRect::new(995, 5, 200, 315);
pub const BILLBOARD01: SpriteRect = SpriteRect::new(625, 375, 300, 170);
pub const BILLBOARD06: SpriteRect = SpriteRect::new(488, 555, 298, 190);
pub const BILLBOARD05: SpriteRect = SpriteRect::new(5, 897, 298, 190);
pub const BILLBOARD07: SpriteRect = SpriteRect::new(313, 897, 298, 190);
pub const BOULDER2: SpriteRect = SpriteRect::new(621, 897, 298, 140);
pub const TREE2: SpriteRect = SpriteRect::new(1205, 5, 282, 295);
pub const BILLBOARD04: SpriteRect = SpriteRect::new(1205, 310, 268, 170);
pub const DEAD_TREE2: SpriteRect = SpriteRect::new(1205, 490, 150, 260);
pub const BOULDER1: SpriteRect = SpriteRect::new(1205, 760, 168, 248);
pub const BUSH1: SpriteRect = SpriteRect::new(5, 1097, 240, 155);
pub const CACTUS: SpriteRect = SpriteRect::new(929, 897, 235, 118);
pub const BUSH2: SpriteRect = SpriteRect::new(255, 1097, 232, 152);
pub const BILLBOARD03: SpriteRect = SpriteRect::new(5, 1262, 230, 220);
pub const BILLBOARD02: SpriteRect = SpriteRect::new(245, 1262, 215, 220);
pub const STUMP: SpriteRect = SpriteRect::new(995, 330, 195, 140);
pub const SEMI: SpriteRect = SpriteRect::new(1365, 490, 122, 144);
pub const TRUCK: SpriteRect = SpriteRect::new(1365, 644, 100, 78);
pub const CAR03: SpriteRect = SpriteRect::new(1383, 760, 88, 55);
pub const CAR02: SpriteRect = SpriteRect::new(1383, 825, 80, 59);
pub const CAR04: SpriteRect = SpriteRect::new(1383, 894, 80, 57);
pub const CAR01: SpriteRect = SpriteRect::new(1205, 1018, 80, 56);
pub const PLAYER_UPHILL_LEFT: SpriteRect = SpriteRect::new(1383, 961, 80, 45);
pub const PLAYER_UPHILL_STRAIGHT: SpriteRect = SpriteRect::new(1295, 1018, 80, 45);
pub const PLAYER_UPHILL_RIGHT: SpriteRect = SpriteRect::new(1385, 1018, 80, 45);
pub const PLAYER_LEFT: SpriteRect = SpriteRect::new(995, 480, 80, 41);
pub const PLAYER_STRAIGHT: SpriteRect = SpriteRect::new(1085, 480, 80, 41);
pub const PLAYER_RIGHT: SpriteRect = SpriteRect::new(995, 531, 80, 41);

/// The player car is a third of the road half-width wide
pub const SCALE: f64 = 0.3 * (1.0 / PLAYER_STRAIGHT.w as f64);

pub const BILLBOARDS: [SpriteRect; 9] = [
    BILLBOARD01, BILLBOARD02, BILLBOARD03, BILLBOARD04, BILLBOARD05,
    BILLBOARD06, BILLBOARD07, BILLBOARD08, BILLBOARD09,
];

pub const PLANTS: [SpriteRect; 12] = [
    TREE1, TREE2, DEAD_TREE1, DEAD_TREE2, PALM_TREE, BUSH1, BUSH2, CACTUS,
    STUMP, BOULDER1, BOULDER2, BOULDER3,
];

pub const CARS: [SpriteRect; 6] = [CAR01, CAR02, CAR03, CAR04, SEMI, TRUCK];

/// Parallax layers in `background.png`
pub mod background {
    use super::SpriteRect;

    pub const HILLS: SpriteRect = SpriteRect::new(5, 5, 1280, 480);
    pub const SKY: SpriteRect = SpriteRect::new(5, 495, 1280, 480);
    pub const TREES: SpriteRect = SpriteRect::new(5, 985, 1280, 480);
}

/// Player pose for the current steering input and slope
pub fn player_sprite(steer: f64, updown: f64) -> SpriteRect {
    let uphill = updown > 0.0;
    if steer < 0.0 {
        if uphill { PLAYER_UPHILL_LEFT } else { PLAYER_LEFT }
    } else if steer > 0.0 {
        if uphill { PLAYER_UPHILL_RIGHT } else { PLAYER_RIGHT }
    } else if uphill {
        PLAYER_UPHILL_STRAIGHT
    } else {
        PLAYER_STRAIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_is_a_third_of_half_road() {
        assert!((PLAYER_STRAIGHT.road_width() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn six_player_poses() {
        assert_eq!(player_sprite(-1.0, 0.0), PLAYER_LEFT);
        assert_eq!(player_sprite(-1.0, 5.0), PLAYER_UPHILL_LEFT);
        assert_eq!(player_sprite(1.0, -5.0), PLAYER_RIGHT);
        assert_eq!(player_sprite(1.0, 5.0), PLAYER_UPHILL_RIGHT);
        assert_eq!(player_sprite(0.0, 0.0), PLAYER_STRAIGHT);
        assert_eq!(player_sprite(0.0, 1.0), PLAYER_UPHILL_STRAIGHT);
    }
}
